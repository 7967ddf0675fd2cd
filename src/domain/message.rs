//! Outbound message entity: the per-recipient unit of delivery tracking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::campaign::Campaign;
use super::customer::Customer;

/// Maximum number of gateway attempts per message.
pub const MAX_RETRIES: i32 = 3;

/// The `last_error` written when a message runs out of attempts.
pub const RETRY_EXHAUSTED_ERROR: &str = "Exceeded maximum retry attempts (3)";

/// Delivery status of an outbound message.
///
/// `sent` is terminal. `failed` is terminal only once `retry_count` has
/// reached [`MAX_RETRIES`]; intermediate `failed` rows mean "last attempt
/// failed, another delivery is planned".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Sent,
    Failed,
}

impl MessageStatus {
    /// Stored string form of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    /// Parse the stored string form. Returns `None` outside the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-recipient materialization of a campaign dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OutboundMessage {
    pub id: i32,
    pub campaign_id: i32,
    pub customer_id: i32,
    pub status: MessageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    pub retry_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OutboundMessage {
    /// Whether the message has exhausted its gateway attempts.
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count >= MAX_RETRIES
    }
}

/// Message joined with its owning campaign and recipient, as loaded by the
/// delivery worker in a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageDetails {
    pub message: OutboundMessage,
    pub campaign: Campaign,
    pub customer: Customer,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn message(retry_count: i32) -> OutboundMessage {
        OutboundMessage {
            id: 1,
            campaign_id: 1,
            customer_id: 1,
            status: MessageStatus::Pending,
            rendered_content: None,
            last_error: None,
            retry_count,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(0, false)]
    #[case(2, false)]
    #[case(3, true)]
    #[case(4, true)]
    fn retries_exhaust_at_the_limit(#[case] count: i32, #[case] exhausted: bool) {
        assert_eq!(message(count).retries_exhausted(), exhausted);
    }

    #[test]
    fn status_parse_is_closed() {
        assert_eq!(MessageStatus::parse("pending"), Some(MessageStatus::Pending));
        assert_eq!(MessageStatus::parse("sent"), Some(MessageStatus::Sent));
        assert_eq!(MessageStatus::parse("failed"), Some(MessageStatus::Failed));
        assert_eq!(MessageStatus::parse("queued"), None);
    }
}

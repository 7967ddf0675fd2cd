//! Campaign entity and its closed channel/status sets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Outbound messaging channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    #[serde(rename = "whatsapp")]
    WhatsApp,
}

impl Channel {
    /// Stored string form of the channel.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sms => "sms",
            Self::WhatsApp => "whatsapp",
        }
    }

    /// Parse the stored string form. Returns `None` outside the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sms" => Some(Self::Sms),
            "whatsapp" => Some(Self::WhatsApp),
            _ => None,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Campaign lifecycle status.
///
/// The transition graph is monotone:
/// `{draft, scheduled} → sending → {sent, failed}`. Dispatch is permitted
/// only from `draft` or `scheduled`; `sent` and `failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Sending,
    Sent,
    Failed,
}

impl CampaignStatus {
    /// Stored string form of the status.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    /// Parse the stored string form. Returns `None` outside the closed set.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(Self::Draft),
            "scheduled" => Some(Self::Scheduled),
            "sending" => Some(Self::Sending),
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator-defined messaging job: a name, a channel, a template, and a
/// lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Campaign {
    pub id: i32,
    pub name: String,
    pub channel: Channel,
    pub status: CampaignStatus,
    pub base_template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// Whether the campaign carries a firing time in the future.
    pub fn is_scheduled(&self) -> bool {
        self.scheduled_at.is_some_and(|at| at > Utc::now())
    }

    /// Dispatch is permitted only before the campaign has started sending.
    pub fn can_send(&self) -> bool {
        matches!(
            self.status,
            CampaignStatus::Draft | CampaignStatus::Scheduled
        )
    }
}

/// Per-campaign aggregate message counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CampaignStats {
    pub total: i64,
    pub pending: i64,
    pub sent: i64,
    pub failed: i64,
}

/// Campaign joined with its aggregate counters.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CampaignWithStats {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub stats: CampaignStats,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rstest::rstest;

    fn campaign(status: CampaignStatus) -> Campaign {
        Campaign {
            id: 1,
            name: "Welcome".into(),
            channel: Channel::Sms,
            status,
            base_template: "Hi {first_name}!".into(),
            scheduled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    #[case(CampaignStatus::Draft, true)]
    #[case(CampaignStatus::Scheduled, true)]
    #[case(CampaignStatus::Sending, false)]
    #[case(CampaignStatus::Sent, false)]
    #[case(CampaignStatus::Failed, false)]
    fn can_send_only_before_sending(#[case] status: CampaignStatus, #[case] expected: bool) {
        assert_eq!(campaign(status).can_send(), expected);
    }

    #[test]
    fn is_scheduled_requires_future_firing_time() {
        let mut c = campaign(CampaignStatus::Draft);
        assert!(!c.is_scheduled());

        c.scheduled_at = Some(Utc::now() + Duration::hours(1));
        assert!(c.is_scheduled());

        c.scheduled_at = Some(Utc::now() - Duration::hours(1));
        assert!(!c.is_scheduled());
    }

    #[rstest]
    #[case("sms", Some(Channel::Sms))]
    #[case("whatsapp", Some(Channel::WhatsApp))]
    #[case("email", None)]
    #[case("", None)]
    fn channel_parse_is_closed(#[case] input: &str, #[case] expected: Option<Channel>) {
        assert_eq!(Channel::parse(input), expected);
    }

    #[rstest]
    #[case("draft")]
    #[case("scheduled")]
    #[case("sending")]
    #[case("sent")]
    #[case("failed")]
    fn status_round_trips_through_strings(#[case] raw: &str) {
        let status = CampaignStatus::parse(raw).expect("in the closed set");
        assert_eq!(status.as_str(), raw);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(CampaignStatus::Sending).expect("serializes");
        assert_eq!(json, serde_json::json!("sending"));
    }
}

//! Port for the outbound SMS/WhatsApp gateway.

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Channel;

/// Outcome of one gateway attempt.
///
/// The gateway never raises: success or failure is carried in the receipt,
/// with the failure reason as an operator-readable string. The call is
/// bounded in time by the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub success: bool,
    pub latency: Duration,
    pub error: Option<String>,
}

impl DeliveryReceipt {
    /// Successful delivery.
    pub fn delivered(latency: Duration) -> Self {
        Self {
            success: true,
            latency,
            error: None,
        }
    }

    /// Failed delivery with a reason.
    pub fn rejected(latency: Duration, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            latency,
            error: Some(reason.into()),
        }
    }
}

/// Port for handing a rendered message to the outbound channel.
///
/// Implementations must be replaceable behind this interface; the default
/// is a latency-simulating mock (see `outbound::gateway`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Deliver `body` to `phone` over `channel`, blocking until a bounded
    /// outcome is known.
    async fn send(&self, channel: Channel, phone: String, body: String) -> DeliveryReceipt;
}

/// Fixture gateway that reports instant success for every send.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMessageGateway;

#[async_trait]
impl MessageGateway for FixtureMessageGateway {
    async fn send(&self, _channel: Channel, _phone: String, _body: String) -> DeliveryReceipt {
        DeliveryReceipt::delivered(Duration::ZERO)
    }
}

//! Port describing queue publish semantics for send jobs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the queue publisher adapter.
    pub enum PublishError {
        /// Queue infrastructure is unavailable.
        Unavailable { message: String } => "send queue is unavailable: {message}",
        /// The job could not be confirmed by the broker.
        Rejected { message: String } => "send job was rejected: {message}",
    }
}

/// Transient wake-up record referring to a message by identifier.
///
/// Jobs carry no business state; the store remains the single source of
/// truth. The extra identifiers spare the worker a lookup round-trip at
/// the queue layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendJob {
    pub message_id: i32,
    pub campaign_id: i32,
    pub customer_id: i32,
}

/// Port for publishing send jobs to the queue substrate.
///
/// Publishes are persistent: a job that arrived at the substrate is durable
/// before `publish` returns.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobPublisher: Send + Sync {
    /// Publish one job for downstream delivery.
    async fn publish(&self, job: SendJob) -> Result<(), PublishError>;
}

/// Fixture implementation that discards all jobs.
///
/// Use in unit tests where publish behaviour is not under test.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureJobPublisher;

#[async_trait]
impl JobPublisher for FixtureJobPublisher {
    async fn publish(&self, _job: SendJob) -> Result<(), PublishError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_wire_format_uses_snake_case_integers() {
        let job = SendJob {
            message_id: 10,
            campaign_id: 2,
            customer_id: 7,
        };
        let json = serde_json::to_value(job).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!({"message_id": 10, "campaign_id": 2, "customer_id": 7})
        );
    }

    #[tokio::test]
    async fn fixture_publisher_accepts_jobs() {
        let publisher = FixtureJobPublisher;
        let job = SendJob {
            message_id: 1,
            campaign_id: 1,
            customer_id: 1,
        };
        publisher.publish(job).await.expect("fixture publish succeeds");
    }
}

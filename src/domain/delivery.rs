//! Delivery processor: the per-job state machine run by the worker.
//!
//! Each delivered job resolves to exactly one [`JobDisposition`]. The
//! retry-exhaustion check runs before any send attempt, so a message
//! observed after its third failure is terminalized without a fourth
//! gateway call; terminalization therefore happens on the delivery after
//! the final failed attempt.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::domain::message::{MessageStatus, RETRY_EXHAUSTED_ERROR};
use crate::domain::ports::{MessageGateway, MessageRepository, SendJob};
use crate::domain::template;

/// What the consumer should do with the delivery once processing ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobDisposition {
    /// Remove the job from the queue.
    Ack,
    /// Negative-acknowledge with requeue so the substrate redelivers.
    Requeue,
}

/// Per-job delivery state machine.
#[derive(Clone)]
pub struct DeliveryProcessor<M, G> {
    messages: Arc<M>,
    gateway: Arc<G>,
}

impl<M, G> DeliveryProcessor<M, G> {
    /// Create a processor over the given store and gateway.
    pub fn new(messages: Arc<M>, gateway: Arc<G>) -> Self {
        Self { messages, gateway }
    }
}

impl<M, G> DeliveryProcessor<M, G>
where
    M: MessageRepository,
    G: MessageGateway,
{
    /// Process one delivered job to a disposition.
    ///
    /// Never returns an error: every failure mode maps to either `Ack`
    /// (no progress is possible) or `Requeue` (a later delivery may
    /// succeed).
    pub async fn process(&self, job: SendJob) -> JobDisposition {
        let details = match self.messages.find_with_details(job.message_id).await {
            Ok(Some(details)) => details,
            Ok(None) => {
                warn!(
                    message_id = job.message_id,
                    "message not found; dropping job"
                );
                return JobDisposition::Ack;
            }
            Err(err) => {
                // Requeueing would only retry the same failing load.
                error!(message_id = job.message_id, error = %err, "failed to load message; dropping job");
                return JobDisposition::Ack;
            }
        };
        let message = details.message;

        if message.status == MessageStatus::Sent {
            debug!(message_id = message.id, "already sent; duplicate delivery");
            return JobDisposition::Ack;
        }

        if message.retries_exhausted() {
            warn!(
                message_id = message.id,
                retry_count = message.retry_count,
                "retry limit reached; terminalizing"
            );
            if let Err(err) = self
                .messages
                .update_status(
                    message.id,
                    MessageStatus::Failed,
                    Some(RETRY_EXHAUSTED_ERROR.to_owned()),
                )
                .await
            {
                error!(message_id = message.id, error = %err, "failed to record retry exhaustion");
            }
            return JobDisposition::Ack;
        }

        let rendered = match template::render(&details.campaign.base_template, &details.customer)
        {
            Ok(rendered) => rendered,
            Err(err) => {
                // Only reachable on an empty template slipping past
                // campaign validation; treated as a failed attempt.
                error!(message_id = message.id, error = %err, "template rendering failed");
                if let Err(db_err) = self
                    .messages
                    .record_failed_attempt(message.id, err.to_string())
                    .await
                {
                    error!(message_id = message.id, error = %db_err, "failed to record render failure");
                }
                return JobDisposition::Requeue;
            }
        };

        let receipt = self
            .gateway
            .send(
                details.campaign.channel,
                details.customer.phone.clone(),
                rendered.clone(),
            )
            .await;

        if receipt.success {
            info!(
                message_id = message.id,
                phone = %details.customer.phone,
                latency_ms = receipt.latency.as_millis() as u64,
                "message delivered"
            );
            match self.messages.mark_sent(message.id, rendered).await {
                Ok(()) => JobDisposition::Ack,
                Err(err) => {
                    // The send happened but the write did not; redelivery
                    // reconciles the row. A duplicate gateway call in this
                    // window is accepted.
                    error!(message_id = message.id, error = %err, "failed to record delivery");
                    JobDisposition::Requeue
                }
            }
        } else {
            let reason = receipt
                .error
                .unwrap_or_else(|| "unknown gateway failure".to_owned());
            warn!(
                message_id = message.id,
                phone = %details.customer.phone,
                retry_count = message.retry_count + 1,
                reason = %reason,
                "delivery attempt failed"
            );
            if let Err(err) = self
                .messages
                .record_failed_attempt(message.id, reason)
                .await
            {
                error!(message_id = message.id, error = %err, "failed to record delivery failure");
            }
            JobDisposition::Requeue
        }
    }
}

//! RabbitMQ consumer driving the delivery processor.
//!
//! The consumer declares a prefetch window of exactly one unacknowledged
//! message, so each consumer processes at most one job at a time. Scaling
//! delivery throughput means running more consumers, not widening the
//! window.

use std::future::Future;

use futures_util::StreamExt;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, BasicNackOptions, BasicQosOptions};
use lapin::types::FieldTable;
use lapin::Connection;
use tracing::{error, info, warn};

use crate::domain::ports::{MessageGateway, MessageRepository, SendJob};
use crate::domain::{DeliveryProcessor, JobDisposition};

use super::connection::{declare_queue, QUEUE_NAME};

/// Consumes send jobs from the work queue, one at a time.
pub struct JobConsumer {
    #[expect(
        dead_code,
        reason = "holds the AMQP channel open for the consumer's lifetime"
    )]
    channel: lapin::Channel,
    consumer: lapin::Consumer,
}

impl JobConsumer {
    /// Create a consumer over a fresh channel with prefetch 1.
    pub async fn new(connection: &Connection, consumer_tag: &str) -> Result<Self, lapin::Error> {
        let channel = connection.create_channel().await?;
        declare_queue(&channel).await?;
        channel.basic_qos(1, BasicQosOptions::default()).await?;

        let consumer = channel
            .basic_consume(
                QUEUE_NAME,
                consumer_tag,
                BasicConsumeOptions::default(),
                FieldTable::default(),
            )
            .await?;

        Ok(Self { channel, consumer })
    }

    /// Consume deliveries until `shutdown` resolves or the stream closes.
    ///
    /// The in-flight job always runs to completion: the shutdown signal is
    /// only observed between deliveries, so the final ack or nack reaches
    /// the broker before this returns.
    pub async fn run<M, G>(
        mut self,
        processor: DeliveryProcessor<M, G>,
        shutdown: impl Future<Output = ()>,
    ) -> Result<(), lapin::Error>
    where
        M: MessageRepository,
        G: MessageGateway,
    {
        info!(queue = QUEUE_NAME, "consumer started");
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                () = &mut shutdown => {
                    info!("shutdown signal received; stopping consumer");
                    break;
                }
                delivery = self.consumer.next() => {
                    let Some(delivery) = delivery else {
                        warn!("delivery stream closed by the broker");
                        break;
                    };
                    let delivery = delivery?;
                    handle_delivery(&processor, delivery).await;
                }
            }
        }

        Ok(())
    }
}

/// Resolve one delivery: parse, process, ack or nack-with-requeue.
async fn handle_delivery<M, G>(processor: &DeliveryProcessor<M, G>, delivery: Delivery)
where
    M: MessageRepository,
    G: MessageGateway,
{
    let job: SendJob = match serde_json::from_slice(&delivery.data) {
        Ok(job) => job,
        Err(err) => {
            // A malformed job can never succeed; requeueing would loop it
            // forever at the head of the queue.
            error!(error = %err, "unparseable job payload; dropping");
            if let Err(ack_err) = delivery.ack(BasicAckOptions::default()).await {
                error!(error = %ack_err, "failed to ack malformed job");
            }
            return;
        }
    };

    match processor.process(job).await {
        JobDisposition::Ack => {
            if let Err(err) = delivery.ack(BasicAckOptions::default()).await {
                error!(message_id = job.message_id, error = %err, "failed to ack job");
            }
        }
        JobDisposition::Requeue => {
            let options = BasicNackOptions {
                requeue: true,
                ..BasicNackOptions::default()
            };
            if let Err(err) = delivery.nack(options).await {
                error!(message_id = job.message_id, error = %err, "failed to nack job");
            }
        }
    }
}

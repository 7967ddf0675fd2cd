//! RabbitMQ-backed implementation of the `JobPublisher` port.

use std::sync::Arc;

use async_trait::async_trait;
use lapin::options::{BasicPublishOptions, ConfirmSelectOptions};
use lapin::{BasicProperties, Connection};
use tokio::sync::Mutex;

use crate::domain::ports::{JobPublisher, PublishError, SendJob};

use super::connection::{declare_queue, QUEUE_NAME};

/// AMQP delivery mode marking a message persistent.
const DELIVERY_MODE_PERSISTENT: u8 = 2;

/// Publishes send jobs to the work queue.
///
/// Jobs are published to the default exchange with the queue name as the
/// routing key, persistent delivery mode, and publisher confirms enabled:
/// `publish` resolves only after the broker has confirmed the message.
///
/// The channel is wrapped in `Arc<Mutex<_>>` because `lapin::Channel` is
/// not `Sync` and `publish` may be called concurrently from HTTP workers.
#[derive(Clone)]
pub struct AmqpJobPublisher {
    channel: Arc<Mutex<lapin::Channel>>,
}

impl AmqpJobPublisher {
    /// Create a publisher over a fresh channel, declaring the queue.
    pub async fn new(connection: &Connection) -> Result<Self, lapin::Error> {
        let channel = connection.create_channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions::default())
            .await?;
        declare_queue(&channel).await?;
        Ok(Self {
            channel: Arc::new(Mutex::new(channel)),
        })
    }
}

#[async_trait]
impl JobPublisher for AmqpJobPublisher {
    async fn publish(&self, job: SendJob) -> Result<(), PublishError> {
        let body =
            serde_json::to_vec(&job).map_err(|err| PublishError::rejected(err.to_string()))?;

        let properties = BasicProperties::default()
            .with_content_type("application/json".into())
            .with_delivery_mode(DELIVERY_MODE_PERSISTENT);

        let channel = self.channel.lock().await;
        channel
            .basic_publish(
                "",
                QUEUE_NAME,
                BasicPublishOptions::default(),
                &body,
                properties,
            )
            .await
            .map_err(|err| PublishError::unavailable(err.to_string()))?
            .await
            .map_err(|err| PublishError::rejected(err.to_string()))?;

        Ok(())
    }
}

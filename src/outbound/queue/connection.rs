//! Shared AMQP connection helpers.
//!
//! Publisher and consumer both declare the queue with identical parameters
//! so either side can start first.

use lapin::options::QueueDeclareOptions;
use lapin::types::FieldTable;
use lapin::{Channel, Connection, ConnectionProperties, Queue};

/// The single work queue carrying send jobs.
pub const QUEUE_NAME: &str = "campaign_sends";

/// Open an AMQP connection to the broker.
pub async fn connect(uri: &str) -> Result<Connection, lapin::Error> {
    Connection::connect(uri, ConnectionProperties::default()).await
}

/// Declare the send queue: durable, non-auto-delete, non-exclusive, no
/// arguments.
pub async fn declare_queue(channel: &Channel) -> Result<Queue, lapin::Error> {
    channel
        .queue_declare(
            QUEUE_NAME,
            QueueDeclareOptions {
                durable: true,
                ..QueueDeclareOptions::default()
            },
            FieldTable::default(),
        )
        .await
}

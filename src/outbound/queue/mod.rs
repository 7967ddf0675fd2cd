//! RabbitMQ adapters for the queue substrate.

pub mod connection;
mod consumer;
mod publisher;

pub use connection::{connect, declare_queue, QUEUE_NAME};
pub use consumer::JobConsumer;
pub use publisher::AmqpJobPublisher;

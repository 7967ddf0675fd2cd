//! Outbound adapters: PostgreSQL persistence, RabbitMQ queue, and the
//! message gateway.

pub mod gateway;
pub mod persistence;
pub mod queue;

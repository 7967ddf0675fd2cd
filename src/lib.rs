//! Campaign dispatch service library.
//!
//! Operators author message templates with `{placeholder}` fields, target a
//! set of customers, and trigger dispatch. The service renders one
//! personalized message per recipient and hands it to an outbound gateway,
//! tracking per-recipient delivery outcome with bounded retry.
//!
//! The crate is split along a hexagonal boundary: `domain` holds entities,
//! the template engine, the dispatch and delivery services, and the ports
//! they depend on; `inbound` and `outbound` hold the HTTP, PostgreSQL,
//! RabbitMQ, and gateway adapters.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

pub use middleware::RequestId;

//! PostgreSQL persistence adapters backing the repository ports.

mod diesel_campaign_repository;
mod diesel_customer_repository;
mod diesel_error_mapping;
mod diesel_message_repository;
mod models;
mod pool;
pub mod schema;

pub use diesel_campaign_repository::DieselCampaignRepository;
pub use diesel_customer_repository::DieselCustomerRepository;
pub use diesel_message_repository::DieselMessageRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

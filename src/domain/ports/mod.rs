//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod campaign_repository;
mod customer_repository;
mod gateway;
mod job_publisher;
mod message_repository;

#[cfg(test)]
pub use campaign_repository::MockCampaignRepository;
pub use campaign_repository::{
    CampaignDraft, CampaignFilters, CampaignPage, CampaignRepository, CampaignRepositoryError,
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE,
};
#[cfg(test)]
pub use customer_repository::MockCustomerRepository;
pub use customer_repository::{CustomerDraft, CustomerRepository, CustomerRepositoryError};
#[cfg(test)]
pub use gateway::MockMessageGateway;
pub use gateway::{DeliveryReceipt, FixtureMessageGateway, MessageGateway};
#[cfg(test)]
pub use job_publisher::MockJobPublisher;
pub use job_publisher::{FixtureJobPublisher, JobPublisher, PublishError, SendJob};
#[cfg(test)]
pub use message_repository::MockMessageRepository;
pub use message_repository::{MessageRepository, MessageRepositoryError};

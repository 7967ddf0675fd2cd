//! Domain layer: entities, template engine, services, and ports.

mod campaign;
mod customer;
pub mod delivery;
pub mod dispatch;
mod error;
mod message;
pub mod ports;
pub mod template;

pub use campaign::{Campaign, CampaignStats, CampaignStatus, CampaignWithStats, Channel};
pub use customer::Customer;
pub use delivery::{DeliveryProcessor, JobDisposition};
pub use dispatch::{
    CampaignService, CreateCampaignRequest, PaginationInfo, PreviewCustomer, PreviewResult,
    SendCampaignResult,
};
pub use error::{Error, ErrorCode};
pub use message::{
    MessageDetails, MessageStatus, OutboundMessage, MAX_RETRIES, RETRY_EXHAUSTED_ERROR,
};
pub use template::TemplateError;

#[cfg(test)]
mod delivery_tests;

//! Shared HTTP adapter state.
//!
//! Handlers receive the campaign service via `actix_web::web::Data`. The
//! service is instantiated over the production adapters here; handler logic
//! itself is exercised through the service's port-level tests.

use crate::domain::CampaignService;
use crate::outbound::persistence::{
    DieselCampaignRepository, DieselCustomerRepository, DieselMessageRepository,
};
use crate::outbound::queue::AmqpJobPublisher;

/// The campaign service as wired in the API binary.
pub type AppCampaignService = CampaignService<
    DieselCampaignRepository,
    DieselCustomerRepository,
    DieselMessageRepository,
    AmqpJobPublisher,
>;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub campaigns: AppCampaignService,
}

impl HttpState {
    /// Construct state from the wired campaign service.
    pub fn new(campaigns: AppCampaignService) -> Self {
        Self { campaigns }
    }
}

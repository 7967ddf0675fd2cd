//! Inbound HTTP adapter: handlers, error mapping, shared state.

pub mod campaigns;
mod error;
pub mod health;
pub mod preview;
mod state;

use actix_web::web;

pub use error::{json_error_handler, path_error_handler, query_error_handler, ApiResult};
pub use state::{AppCampaignService, HttpState};

/// Register every route exposed by the request-handler process.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(campaigns::create_campaign)
        .service(campaigns::list_campaigns)
        .service(campaigns::get_campaign)
        .service(campaigns::send_campaign)
        .service(preview::preview_message)
        .service(health::health);
}

//! OpenAPI document aggregate served by Swagger UI in debug builds.

use utoipa::OpenApi;

/// Public OpenAPI surface for the request-handler process.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::campaigns::create_campaign,
        crate::inbound::http::campaigns::list_campaigns,
        crate::inbound::http::campaigns::get_campaign,
        crate::inbound::http::campaigns::send_campaign,
        crate::inbound::http::preview::preview_message,
        crate::inbound::http::health::health,
    ),
    components(schemas(
        crate::domain::Campaign,
        crate::domain::CampaignStats,
        crate::domain::CampaignStatus,
        crate::domain::Channel,
        crate::domain::Customer,
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::PaginationInfo,
        crate::domain::PreviewCustomer,
        crate::domain::PreviewResult,
        crate::domain::SendCampaignResult,
        crate::inbound::http::campaigns::CreateCampaignPayload,
        crate::inbound::http::campaigns::ListCampaignsResponse,
        crate::inbound::http::campaigns::SendCampaignPayload,
        crate::inbound::http::preview::PreviewPayload,
        crate::inbound::http::health::HealthLevel,
        crate::inbound::http::health::HealthReport,
        crate::inbound::http::health::ServiceStatus,
        crate::inbound::http::health::ServicesReport,
    )),
    tags(
        (name = "campaigns", description = "Campaign CRUD, dispatch, and preview"),
        (name = "health", description = "Readiness probes"),
    )
)]
pub struct ApiDoc;

//! Campaign HTTP handlers.
//!
//! ```text
//! POST /campaigns
//! GET  /campaigns
//! GET  /campaigns/{id}
//! POST /campaigns/{id}/send
//! ```

use actix_web::{get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CampaignFilters, DEFAULT_PAGE_SIZE};
use crate::domain::{
    Campaign, CampaignStatus, Channel, CreateCampaignRequest, Error, PaginationInfo,
};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload for creating a campaign.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCampaignPayload {
    pub name: Option<String>,
    pub channel: Option<String>,
    pub base_template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Request payload for dispatching a campaign.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SendCampaignPayload {
    pub customer_ids: Option<Vec<i32>>,
}

/// Listing query parameters.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListCampaignsQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
    pub channel: Option<String>,
    pub status: Option<String>,
}

/// Response payload for the campaign listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct ListCampaignsResponse {
    pub campaigns: Vec<Campaign>,
    pub pagination: PaginationInfo,
}

fn missing_field_error(field: &str) -> Error {
    Error::validation(format!("{field} is required"))
}

fn parse_channel(value: &str) -> Result<Channel, Error> {
    Channel::parse(value)
        .ok_or_else(|| Error::validation("invalid channel: must be 'sms' or 'whatsapp'"))
}

fn parse_status(value: &str) -> Result<CampaignStatus, Error> {
    CampaignStatus::parse(value).ok_or_else(|| {
        Error::validation("invalid status: must be one of draft, scheduled, sending, sent, failed")
    })
}

pub(crate) fn positive_id(id: i32, field: &str) -> Result<i32, Error> {
    if id <= 0 {
        return Err(Error::validation(format!("{field} must be positive")));
    }
    Ok(id)
}

/// Create a campaign.
#[utoipa::path(
    post,
    path = "/campaigns",
    request_body = CreateCampaignPayload,
    responses(
        (status = 201, description = "Campaign created", body = Campaign),
        (status = 400, description = "Validation failure"),
    ),
    tags = ["campaigns"],
    operation_id = "createCampaign"
)]
#[post("/campaigns")]
pub async fn create_campaign(
    state: web::Data<HttpState>,
    payload: web::Json<CreateCampaignPayload>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let name = payload.name.ok_or_else(|| missing_field_error("name"))?;
    let channel = payload
        .channel
        .ok_or_else(|| missing_field_error("channel"))?;
    let base_template = payload
        .base_template
        .ok_or_else(|| missing_field_error("base_template"))?;

    let campaign = state
        .campaigns
        .create_campaign(CreateCampaignRequest {
            name,
            channel: parse_channel(&channel)?,
            base_template,
            scheduled_at: payload.scheduled_at,
        })
        .await?;

    Ok(HttpResponse::Created().json(campaign))
}

/// List campaigns with filters and pagination.
#[utoipa::path(
    get,
    path = "/campaigns",
    params(
        ("page" = Option<i64>, Query, description = "One-indexed page number"),
        ("page_size" = Option<i64>, Query, description = "Page size, clamped to [1, 100]"),
        ("channel" = Option<String>, Query, description = "Channel filter"),
        ("status" = Option<String>, Query, description = "Status filter"),
    ),
    responses(
        (status = 200, description = "One page of campaigns", body = ListCampaignsResponse),
        (status = 400, description = "Unknown channel or status value"),
    ),
    tags = ["campaigns"],
    operation_id = "listCampaigns"
)]
#[get("/campaigns")]
pub async fn list_campaigns(
    state: web::Data<HttpState>,
    query: web::Query<ListCampaignsQuery>,
) -> ApiResult<HttpResponse> {
    let query = query.into_inner();

    let channel = query.channel.as_deref().map(parse_channel).transpose()?;
    let status = query.status.as_deref().map(parse_status).transpose()?;

    let filters = CampaignFilters::new(
        query.page.unwrap_or(1),
        query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        channel,
        status,
    );

    let (campaigns, pagination) = state.campaigns.list_campaigns(filters).await?;

    Ok(HttpResponse::Ok().json(ListCampaignsResponse {
        campaigns,
        pagination,
    }))
}

/// Fetch one campaign with its aggregate counters.
#[utoipa::path(
    get,
    path = "/campaigns/{id}",
    params(("id" = i32, Path, description = "Campaign identifier")),
    responses(
        (status = 200, description = "Campaign with stats"),
        (status = 404, description = "Campaign not found"),
    ),
    tags = ["campaigns"],
    operation_id = "getCampaign"
)]
#[get("/campaigns/{id}")]
pub async fn get_campaign(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
) -> ApiResult<HttpResponse> {
    let id = positive_id(path.into_inner(), "campaign ID")?;
    let campaign = state.campaigns.get_campaign_with_stats(id).await?;
    Ok(HttpResponse::Ok().json(campaign))
}

/// Dispatch a campaign to the supplied customers.
#[utoipa::path(
    post,
    path = "/campaigns/{id}/send",
    params(("id" = i32, Path, description = "Campaign identifier")),
    request_body = SendCampaignPayload,
    responses(
        (status = 200, description = "Messages queued", body = crate::domain::SendCampaignResult),
        (status = 400, description = "Empty recipient set"),
        (status = 404, description = "Campaign not found"),
        (status = 422, description = "Campaign is not dispatchable"),
    ),
    tags = ["campaigns"],
    operation_id = "sendCampaign"
)]
#[post("/campaigns/{id}/send")]
pub async fn send_campaign(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<SendCampaignPayload>,
) -> ApiResult<HttpResponse> {
    let id = positive_id(path.into_inner(), "campaign ID")?;
    let customer_ids = payload.into_inner().customer_ids.unwrap_or_default();
    if customer_ids.is_empty() {
        return Err(Error::validation("customer_ids cannot be empty"));
    }

    let result = state.campaigns.send_campaign(id, customer_ids).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_parsing_rejects_unknown_values() {
        assert!(parse_channel("sms").is_ok());
        assert!(parse_channel("whatsapp").is_ok());
        let error = parse_channel("email").expect_err("outside the closed set");
        assert_eq!(error.code(), crate::domain::ErrorCode::ValidationError);
    }

    #[test]
    fn status_parsing_rejects_unknown_values() {
        assert!(parse_status("draft").is_ok());
        let error = parse_status("archived").expect_err("outside the closed set");
        assert_eq!(error.code(), crate::domain::ErrorCode::ValidationError);
    }

    #[test]
    fn non_positive_identifiers_are_rejected() {
        assert!(positive_id(1, "campaign ID").is_ok());
        assert!(positive_id(0, "campaign ID").is_err());
        assert!(positive_id(-4, "campaign ID").is_err());
    }
}

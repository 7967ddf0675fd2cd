//! Personalized preview handler.
//!
//! Pure read/compute: renders a campaign's template (or an override) for
//! one customer without touching the queue or writing anything.

use actix_web::{post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Error, PreviewResult};
use crate::inbound::http::campaigns::positive_id;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Request payload for a personalized preview.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct PreviewPayload {
    pub customer_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_template: Option<String>,
}

/// Render a campaign's message for one customer.
#[utoipa::path(
    post,
    path = "/campaigns/{id}/personalized-preview",
    params(("id" = i32, Path, description = "Campaign identifier")),
    request_body = PreviewPayload,
    responses(
        (status = 200, description = "Rendered preview", body = PreviewResult),
        (status = 404, description = "Campaign or customer not found"),
    ),
    tags = ["campaigns"],
    operation_id = "previewMessage"
)]
#[post("/campaigns/{id}/personalized-preview")]
pub async fn preview_message(
    state: web::Data<HttpState>,
    path: web::Path<i32>,
    payload: web::Json<PreviewPayload>,
) -> ApiResult<HttpResponse> {
    let campaign_id = positive_id(path.into_inner(), "campaign ID")?;
    let payload = payload.into_inner();
    let customer_id = payload
        .customer_id
        .ok_or_else(|| Error::validation("customer_id is required and must be positive"))?;
    let customer_id = positive_id(customer_id, "customer_id")?;

    let preview = state
        .campaigns
        .preview_message(campaign_id, customer_id, payload.override_template)
        .await?;

    Ok(HttpResponse::Ok().json(preview))
}

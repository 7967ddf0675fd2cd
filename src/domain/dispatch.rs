//! Campaign service: creation, listing, preview, and the dispatch path.
//!
//! `send_campaign` is the transactional enqueue path: it validates campaign
//! state, persists one pending message per recipient together with the
//! `sending` transition (all-or-nothing), and publishes one job per message
//! after the commit. Publishing is best-effort: a failed publish is logged
//! and the message stays `pending` for out-of-band recovery.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::ports::{
    CampaignDraft, CampaignFilters, CampaignRepository, CampaignRepositoryError, CustomerRepository,
    CustomerRepositoryError, JobPublisher, MessageRepository, MessageRepositoryError, SendJob,
};
use crate::domain::{
    template, Campaign, CampaignStatus, CampaignWithStats, Channel, Error,
};

/// Request payload for creating a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCampaignRequest {
    pub name: String,
    pub channel: Channel,
    pub base_template: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Result of a dispatch: the campaign moved to `sending` with N jobs queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SendCampaignResult {
    pub campaign_id: i32,
    pub messages_queued: usize,
    pub status: CampaignStatus,
}

/// Pagination metadata returned alongside a campaign listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationInfo {
    pub page: i64,
    pub page_size: i64,
    pub total_count: i64,
    pub total_pages: i64,
}

/// Recipient summary embedded in a preview response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PreviewCustomer {
    pub id: i32,
    /// Full-name summary: first + last, either alone, or "Customer".
    pub first_name: String,
}

/// Result of a preview: the rendered body and the inputs that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PreviewResult {
    pub rendered_message: String,
    pub used_template: String,
    pub customer: PreviewCustomer,
}

/// Campaign service implementing the operator-facing operations.
#[derive(Clone)]
pub struct CampaignService<C, U, M, P> {
    campaigns: Arc<C>,
    customers: Arc<U>,
    messages: Arc<M>,
    publisher: Arc<P>,
}

fn map_campaign_error(error: CampaignRepositoryError) -> Error {
    Error::internal(format!("campaign repository error: {error}"))
}

fn map_customer_error(error: CustomerRepositoryError) -> Error {
    Error::internal(format!("customer repository error: {error}"))
}

fn map_message_error(error: MessageRepositoryError) -> Error {
    Error::internal(format!("message repository error: {error}"))
}

impl<C, U, M, P> CampaignService<C, U, M, P> {
    /// Create a new service with the given port implementations.
    pub fn new(campaigns: Arc<C>, customers: Arc<U>, messages: Arc<M>, publisher: Arc<P>) -> Self {
        Self {
            campaigns,
            customers,
            messages,
            publisher,
        }
    }
}

impl<C, U, M, P> CampaignService<C, U, M, P>
where
    C: CampaignRepository,
    U: CustomerRepository,
    M: MessageRepository,
    P: JobPublisher,
{
    /// Create a campaign in `draft`, or `scheduled` when the firing time is
    /// in the future. The template is validated here, once, so rendering at
    /// dispatch time cannot fail on syntax.
    pub async fn create_campaign(&self, request: CreateCampaignRequest) -> Result<Campaign, Error> {
        if request.name.trim().is_empty() {
            return Err(Error::validation("name is required"));
        }
        template::validate(&request.base_template)
            .map_err(|err| Error::validation(format!("invalid template: {err}")))?;

        let scheduled = request
            .scheduled_at
            .is_some_and(|at| at > Utc::now());
        let draft = CampaignDraft {
            name: request.name,
            channel: request.channel,
            status: if scheduled {
                CampaignStatus::Scheduled
            } else {
                CampaignStatus::Draft
            },
            base_template: request.base_template,
            scheduled_at: request.scheduled_at,
        };

        self.campaigns
            .create(draft)
            .await
            .map_err(map_campaign_error)
    }

    /// Fetch one campaign.
    pub async fn get_campaign(&self, id: i32) -> Result<Campaign, Error> {
        self.campaigns
            .find_by_id(id)
            .await
            .map_err(map_campaign_error)?
            .ok_or_else(|| Error::not_found("Campaign", id))
    }

    /// Fetch one campaign with its aggregate message counters.
    pub async fn get_campaign_with_stats(&self, id: i32) -> Result<CampaignWithStats, Error> {
        self.campaigns
            .find_with_stats(id)
            .await
            .map_err(map_campaign_error)?
            .ok_or_else(|| Error::not_found("Campaign", id))
    }

    /// List campaigns under the given filters, newest-first, with
    /// pagination metadata.
    pub async fn list_campaigns(
        &self,
        filters: CampaignFilters,
    ) -> Result<(Vec<Campaign>, PaginationInfo), Error> {
        let page = self
            .campaigns
            .list(filters)
            .await
            .map_err(map_campaign_error)?;

        let page_size = filters.page_size();
        let pagination = PaginationInfo {
            page: filters.page(),
            page_size,
            total_count: page.total_count,
            total_pages: (page.total_count + page_size - 1) / page_size,
        };
        Ok((page.campaigns, pagination))
    }

    /// Dispatch a campaign to the given customers.
    ///
    /// Unknown customer identifiers are silently dropped (callers may pass
    /// a superset); an empty surviving set is a validation error. Jobs are
    /// published only after the message rows and the `sending` transition
    /// have committed.
    pub async fn send_campaign(
        &self,
        campaign_id: i32,
        customer_ids: Vec<i32>,
    ) -> Result<SendCampaignResult, Error> {
        let campaign = self.get_campaign(campaign_id).await?;

        if !campaign.can_send() {
            return Err(Error::business(format!(
                "campaign cannot be sent: status is {}",
                campaign.status
            )));
        }

        if customer_ids.is_empty() {
            return Err(Error::validation("at least one customer ID required"));
        }

        let customers = self
            .customers
            .find_by_ids(customer_ids)
            .await
            .map_err(map_customer_error)?;
        if customers.is_empty() {
            return Err(Error::validation("no valid customers found"));
        }

        let recipient_ids: Vec<i32> = customers.iter().map(|c| c.id).collect();
        let messages = self
            .messages
            .create_for_dispatch(campaign.id, recipient_ids)
            .await
            .map_err(map_message_error)?;

        // Post-commit, best-effort: a failed publish leaves the message
        // `pending` until an out-of-band sweeper requeues it.
        for message in &messages {
            let job = SendJob {
                message_id: message.id,
                campaign_id: campaign.id,
                customer_id: message.customer_id,
            };
            if let Err(error) = self.publisher.publish(job).await {
                warn!(
                    message_id = message.id,
                    campaign_id = campaign.id,
                    %error,
                    "failed to publish send job"
                );
            }
        }

        info!(
            campaign_id = campaign.id,
            messages_queued = messages.len(),
            "campaign dispatched"
        );

        Ok(SendCampaignResult {
            campaign_id: campaign.id,
            messages_queued: messages.len(),
            status: CampaignStatus::Sending,
        })
    }

    /// Render a campaign's template (or a non-empty override) for one
    /// customer without persisting or dispatching anything.
    pub async fn preview_message(
        &self,
        campaign_id: i32,
        customer_id: i32,
        override_template: Option<String>,
    ) -> Result<PreviewResult, Error> {
        let campaign = self.get_campaign(campaign_id).await?;

        let customer = self
            .customers
            .find_by_id(customer_id)
            .await
            .map_err(map_customer_error)?
            .ok_or_else(|| Error::not_found("Customer", customer_id))?;

        let used_template = match override_template {
            Some(template) if !template.is_empty() => template,
            _ => campaign.base_template,
        };

        let rendered_message = template::render(&used_template, &customer)
            .map_err(|err| Error::internal(format!("failed to render template: {err}")))?;

        Ok(PreviewResult {
            rendered_message,
            used_template,
            customer: PreviewCustomer {
                id: customer.id,
                first_name: customer.full_name(),
            },
        })
    }
}

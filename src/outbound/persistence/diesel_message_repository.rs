//! PostgreSQL-backed `MessageRepository` implementation using Diesel.
//!
//! `create_for_dispatch` performs the coordinator's atomic write: the batch
//! insert and the campaign's `sending` transition share one transaction, so
//! readers never observe a half-dispatched campaign.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{MessageRepository, MessageRepositoryError};
use crate::domain::{
    Campaign, CampaignStatus, Customer, MessageDetails, MessageStatus, OutboundMessage,
    MAX_RETRIES,
};

use super::diesel_error_mapping::{map_closed_set_violation, map_diesel_error, map_pool_error};
use super::models::{CampaignRow, CustomerRow, NewOutboundMessageRow, OutboundMessageRow};
use super::pool::{DbPool, PoolError};
use super::schema::{campaigns, customers, outbound_messages};

/// Diesel-backed implementation of the `MessageRepository` port.
#[derive(Clone)]
pub struct DieselMessageRepository {
    pool: DbPool,
}

impl DieselMessageRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> MessageRepositoryError {
    map_pool_error(error, MessageRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> MessageRepositoryError {
    map_diesel_error(
        error,
        MessageRepositoryError::query,
        MessageRepositoryError::connection,
    )
}

fn row_to_message(row: OutboundMessageRow) -> Result<OutboundMessage, MessageRepositoryError> {
    OutboundMessage::try_from(row)
        .map_err(|violation| map_closed_set_violation(violation, MessageRepositoryError::query))
}

#[async_trait]
impl MessageRepository for DieselMessageRepository {
    async fn create_for_dispatch(
        &self,
        campaign_id: i32,
        customer_ids: Vec<i32>,
    ) -> Result<Vec<OutboundMessage>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_rows: Vec<NewOutboundMessageRow> = customer_ids
            .iter()
            .map(|&customer_id| NewOutboundMessageRow {
                campaign_id,
                customer_id,
                status: MessageStatus::Pending.as_str(),
            })
            .collect();

        let rows = conn
            .transaction(|conn| {
                async move {
                    let rows: Vec<OutboundMessageRow> =
                        diesel::insert_into(outbound_messages::table)
                            .values(&new_rows)
                            .returning(OutboundMessageRow::as_returning())
                            .get_results(conn)
                            .await?;

                    diesel::update(campaigns::table.find(campaign_id))
                        .set((
                            campaigns::status.eq(CampaignStatus::Sending.as_str()),
                            campaigns::updated_at.eq(diesel::dsl::now),
                        ))
                        .execute(conn)
                        .await?;

                    Ok::<_, diesel::result::Error>(rows)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn find_by_id(
        &self,
        id: i32,
    ) -> Result<Option<OutboundMessage>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<OutboundMessageRow> = outbound_messages::table
            .find(id)
            .select(OutboundMessageRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_message).transpose()
    }

    async fn find_with_details(
        &self,
        id: i32,
    ) -> Result<Option<MessageDetails>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let joined: Option<(OutboundMessageRow, CampaignRow, CustomerRow)> =
            outbound_messages::table
                .inner_join(campaigns::table)
                .inner_join(customers::table)
                .filter(outbound_messages::id.eq(id))
                .select((
                    OutboundMessageRow::as_select(),
                    CampaignRow::as_select(),
                    CustomerRow::as_select(),
                ))
                .first(&mut conn)
                .await
                .optional()
                .map_err(map_diesel)?;

        let Some((message_row, campaign_row, customer_row)) = joined else {
            return Ok(None);
        };

        let message = row_to_message(message_row)?;
        let campaign = Campaign::try_from(campaign_row)
            .map_err(|violation| map_closed_set_violation(violation, MessageRepositoryError::query))?;
        let customer = Customer::from(customer_row);

        Ok(Some(MessageDetails {
            message,
            campaign,
            customer,
        }))
    }

    async fn update_status(
        &self,
        id: i32,
        status: MessageStatus,
        last_error: Option<String>,
    ) -> Result<(), MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::update(outbound_messages::table.find(id))
            .set((
                outbound_messages::status.eq(status.as_str()),
                outbound_messages::last_error.eq(last_error),
                outbound_messages::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(())
    }

    async fn mark_sent(
        &self,
        id: i32,
        rendered_content: String,
    ) -> Result<(), MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::update(outbound_messages::table.find(id))
            .set((
                outbound_messages::status.eq(MessageStatus::Sent.as_str()),
                outbound_messages::rendered_content.eq(Some(rendered_content)),
                outbound_messages::last_error.eq(None::<String>),
                outbound_messages::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(())
    }

    async fn record_failed_attempt(
        &self,
        id: i32,
        error: String,
    ) -> Result<(), MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::update(outbound_messages::table.find(id))
            .set((
                outbound_messages::status.eq(MessageStatus::Failed.as_str()),
                outbound_messages::retry_count.eq(outbound_messages::retry_count + 1),
                outbound_messages::last_error.eq(Some(error)),
                outbound_messages::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(())
    }

    async fn find_pending_below_retry_limit(
        &self,
        limit: i64,
    ) -> Result<Vec<OutboundMessage>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<OutboundMessageRow> = outbound_messages::table
            .filter(outbound_messages::status.eq(MessageStatus::Pending.as_str()))
            .filter(outbound_messages::retry_count.lt(MAX_RETRIES))
            .order(outbound_messages::created_at.asc())
            .limit(limit)
            .select(OutboundMessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_message).collect()
    }

    async fn list_by_campaign(
        &self,
        campaign_id: i32,
    ) -> Result<Vec<OutboundMessage>, MessageRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<OutboundMessageRow> = outbound_messages::table
            .filter(outbound_messages::campaign_id.eq(campaign_id))
            .order(outbound_messages::created_at.desc())
            .select(OutboundMessageRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        rows.into_iter().map(row_to_message).collect()
    }
}

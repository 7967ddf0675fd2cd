//! PostgreSQL-backed `CampaignRepository` implementation using Diesel.
//!
//! Listing sorts on the append-only primary key, descending, so page
//! membership is stable under concurrent inserts and status transitions.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    CampaignDraft, CampaignFilters, CampaignPage, CampaignRepository, CampaignRepositoryError,
};
use crate::domain::{Campaign, CampaignStats, CampaignStatus, CampaignWithStats};

use super::diesel_error_mapping::{map_closed_set_violation, map_diesel_error, map_pool_error};
use super::models::{CampaignRow, NewCampaignRow};
use super::pool::{DbPool, PoolError};
use super::schema::{campaigns, outbound_messages};

/// Diesel-backed implementation of the `CampaignRepository` port.
#[derive(Clone)]
pub struct DieselCampaignRepository {
    pool: DbPool,
}

impl DieselCampaignRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> CampaignRepositoryError {
    map_pool_error(error, CampaignRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> CampaignRepositoryError {
    map_diesel_error(
        error,
        CampaignRepositoryError::query,
        CampaignRepositoryError::connection,
    )
}

fn row_to_campaign(row: CampaignRow) -> Result<Campaign, CampaignRepositoryError> {
    Campaign::try_from(row)
        .map_err(|violation| map_closed_set_violation(violation, CampaignRepositoryError::query))
}

fn fold_status_counts(counts: Vec<(String, i64)>) -> CampaignStats {
    let mut stats = CampaignStats::default();
    for (status, count) in counts {
        stats.total += count;
        match status.as_str() {
            "pending" => stats.pending = count,
            "sent" => stats.sent = count,
            "failed" => stats.failed = count,
            _ => {}
        }
    }
    stats
}

#[async_trait]
impl CampaignRepository for DieselCampaignRepository {
    async fn create(&self, draft: CampaignDraft) -> Result<Campaign, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewCampaignRow {
            name: &draft.name,
            channel: draft.channel.as_str(),
            status: draft.status.as_str(),
            base_template: &draft.base_template,
            scheduled_at: draft.scheduled_at,
        };

        let row: CampaignRow = diesel::insert_into(campaigns::table)
            .values(&new_row)
            .returning(CampaignRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        row_to_campaign(row)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Campaign>, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<CampaignRow> = campaigns::table
            .find(id)
            .select(CampaignRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        row.map(row_to_campaign).transpose()
    }

    async fn find_with_stats(
        &self,
        id: i32,
    ) -> Result<Option<CampaignWithStats>, CampaignRepositoryError> {
        let Some(campaign) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let counts: Vec<(String, i64)> = outbound_messages::table
            .filter(outbound_messages::campaign_id.eq(id))
            .group_by(outbound_messages::status)
            .select((outbound_messages::status, diesel::dsl::count_star()))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(Some(CampaignWithStats {
            campaign,
            stats: fold_status_counts(counts),
        }))
    }

    async fn list(
        &self,
        filters: CampaignFilters,
    ) -> Result<CampaignPage, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let mut query = campaigns::table
            .select(CampaignRow::as_select())
            .into_boxed();
        let mut count_query = campaigns::table.count().into_boxed();
        if let Some(channel) = filters.channel {
            query = query.filter(campaigns::channel.eq(channel.as_str()));
            count_query = count_query.filter(campaigns::channel.eq(channel.as_str()));
        }
        if let Some(status) = filters.status {
            query = query.filter(campaigns::status.eq(status.as_str()));
            count_query = count_query.filter(campaigns::status.eq(status.as_str()));
        }

        let rows: Vec<CampaignRow> = query
            .order(campaigns::id.desc())
            .limit(filters.page_size())
            .offset(filters.offset())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let total_count: i64 = count_query
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let campaigns = rows
            .into_iter()
            .map(row_to_campaign)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CampaignPage {
            campaigns,
            total_count,
        })
    }

    async fn update_status(
        &self,
        id: i32,
        status: CampaignStatus,
    ) -> Result<bool, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let affected = diesel::update(campaigns::table.find(id))
            .set((
                campaigns::status.eq(status.as_str()),
                campaigns::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(affected > 0)
    }

    async fn delete(&self, id: i32) -> Result<bool, CampaignRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let affected = diesel::delete(campaigns::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(affected > 0)
    }
}

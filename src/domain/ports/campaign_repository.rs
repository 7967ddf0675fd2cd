//! Port for campaign persistence, listing, and aggregate counters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Campaign, CampaignStatus, CampaignWithStats, Channel};

use super::define_port_error;

define_port_error! {
    /// Errors raised by campaign repository adapters.
    pub enum CampaignRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "campaign repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "campaign repository query failed: {message}",
    }
}

/// Default page size when the caller supplies none (or a non-positive one).
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on the page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Listing filters and pagination window.
///
/// Construct through [`CampaignFilters::new`], which clamps the window to
/// the documented bounds: page is one-indexed and at least 1; page size
/// defaults to [`DEFAULT_PAGE_SIZE`] when non-positive and is capped at
/// [`MAX_PAGE_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignFilters {
    page: i64,
    page_size: i64,
    pub channel: Option<Channel>,
    pub status: Option<CampaignStatus>,
}

impl CampaignFilters {
    /// Build filters with a clamped pagination window.
    pub fn new(
        page: i64,
        page_size: i64,
        channel: Option<Channel>,
        status: Option<CampaignStatus>,
    ) -> Self {
        let page = page.max(1);
        let page_size = if page_size <= 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };
        Self {
            page,
            page_size,
            channel,
            status,
        }
    }

    /// One-indexed page number, always ≥ 1.
    pub fn page(&self) -> i64 {
        self.page
    }

    /// Page size, always in `[1, MAX_PAGE_SIZE]`.
    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Row offset for the window.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }
}

/// One page of campaigns plus the total count under the same filters.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignPage {
    pub campaigns: Vec<Campaign>,
    pub total_count: i64,
}

/// Draft values for creating a campaign.
#[derive(Debug, Clone, PartialEq)]
pub struct CampaignDraft {
    pub name: String,
    pub channel: Channel,
    pub status: CampaignStatus,
    pub base_template: String,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Port for campaign storage and retrieval.
///
/// Listing orders by the primary identifier descending. The identifier is
/// append-only, so the relative order of any two rows is stable across
/// calls regardless of concurrent inserts or status transitions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CampaignRepository: Send + Sync {
    /// Persist a new campaign and return it with its assigned identifier.
    async fn create(&self, draft: CampaignDraft) -> Result<Campaign, CampaignRepositoryError>;

    /// Fetch one campaign. Returns `None` when absent.
    async fn find_by_id(&self, id: i32) -> Result<Option<Campaign>, CampaignRepositoryError>;

    /// Fetch one campaign together with its aggregate message counters.
    async fn find_with_stats(
        &self,
        id: i32,
    ) -> Result<Option<CampaignWithStats>, CampaignRepositoryError>;

    /// List campaigns under the given filters, newest-first.
    async fn list(&self, filters: CampaignFilters)
        -> Result<CampaignPage, CampaignRepositoryError>;

    /// Transition a campaign's status. Returns `false` when absent.
    async fn update_status(
        &self,
        id: i32,
        status: CampaignStatus,
    ) -> Result<bool, CampaignRepositoryError>;

    /// Delete a campaign (messages cascade). Returns `false` when absent.
    async fn delete(&self, id: i32) -> Result<bool, CampaignRepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 20, 1, 20)]
    #[case(0, 20, 1, 20)]
    #[case(-3, 20, 1, 20)]
    #[case(2, 0, 2, DEFAULT_PAGE_SIZE)]
    #[case(2, -5, 2, DEFAULT_PAGE_SIZE)]
    #[case(1, 500, 1, MAX_PAGE_SIZE)]
    #[case(1, 100, 1, 100)]
    #[case(1, 1, 1, 1)]
    fn filters_clamp_the_window(
        #[case] page: i64,
        #[case] page_size: i64,
        #[case] expected_page: i64,
        #[case] expected_size: i64,
    ) {
        let filters = CampaignFilters::new(page, page_size, None, None);
        assert_eq!(filters.page(), expected_page);
        assert_eq!(filters.page_size(), expected_size);
    }

    #[test]
    fn offset_derives_from_the_window() {
        let filters = CampaignFilters::new(3, 20, None, None);
        assert_eq!(filters.offset(), 40);
    }
}

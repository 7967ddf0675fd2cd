//! Port for outbound message persistence.

use async_trait::async_trait;

use crate::domain::{MessageDetails, MessageStatus, OutboundMessage};

use super::define_port_error;

define_port_error! {
    /// Errors raised by message repository adapters.
    pub enum MessageRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "message repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "message repository query failed: {message}",
    }
}

/// Port for outbound message storage.
///
/// `create_for_dispatch` is the coordinator's atomic write: it inserts one
/// `pending` row per customer AND transitions the owning campaign to
/// `sending` inside a single transaction, so no reader ever observes one
/// without the other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Insert one pending message per customer and move the campaign to
    /// `sending`, all-or-nothing. Returns the created rows in input order.
    ///
    /// Duplicate customer identifiers each get their own row.
    async fn create_for_dispatch(
        &self,
        campaign_id: i32,
        customer_ids: Vec<i32>,
    ) -> Result<Vec<OutboundMessage>, MessageRepositoryError>;

    /// Fetch one message. Returns `None` when absent.
    async fn find_by_id(&self, id: i32)
        -> Result<Option<OutboundMessage>, MessageRepositoryError>;

    /// Fetch one message joined with its campaign and customer.
    async fn find_with_details(
        &self,
        id: i32,
    ) -> Result<Option<MessageDetails>, MessageRepositoryError>;

    /// Overwrite a message's status and error string.
    async fn update_status(
        &self,
        id: i32,
        status: MessageStatus,
        last_error: Option<String>,
    ) -> Result<(), MessageRepositoryError>;

    /// Record a successful delivery: status `sent`, rendered body persisted,
    /// error cleared.
    async fn mark_sent(
        &self,
        id: i32,
        rendered_content: String,
    ) -> Result<(), MessageRepositoryError>;

    /// Record a failed attempt: status `failed`, retry count incremented,
    /// error recorded.
    async fn record_failed_attempt(
        &self,
        id: i32,
        error: String,
    ) -> Result<(), MessageRepositoryError>;

    /// Fetch messages still `pending` with retries remaining, oldest first.
    /// Extension point for an out-of-band republisher.
    async fn find_pending_below_retry_limit(
        &self,
        limit: i64,
    ) -> Result<Vec<OutboundMessage>, MessageRepositoryError>;

    /// Fetch every message belonging to a campaign, newest first.
    async fn list_by_campaign(
        &self,
        campaign_id: i32,
    ) -> Result<Vec<OutboundMessage>, MessageRepositoryError>;
}

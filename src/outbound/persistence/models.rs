//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Repositories convert between them and
//! domain entities, keeping Diesel confined to this adapter.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    Campaign, CampaignStatus, Channel, Customer, MessageStatus, OutboundMessage,
};

use super::schema::{campaigns, customers, outbound_messages};

/// Raised when a stored enum string falls outside its closed set.
///
/// The schema enforces the sets with CHECK constraints, so hitting this in
/// practice means the database was modified out-of-band.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("stored {column} value {value:?} is outside the closed set")]
pub(crate) struct ClosedSetViolation {
    pub column: &'static str,
    pub value: String,
}

/// Row struct for reading from the customers table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = customers)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CustomerRow {
    pub id: i32,
    pub phone: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub location: Option<String>,
    pub preferred_product: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            id: row.id,
            phone: row.phone,
            first_name: row.first_name,
            last_name: row.last_name,
            location: row.location,
            preferred_product: row.preferred_product,
            created_at: row.created_at,
        }
    }
}

/// Insertable struct for creating customer records; the identifier and
/// timestamp default in the database.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = customers)]
pub(crate) struct NewCustomerRow<'a> {
    pub phone: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub location: Option<&'a str>,
    pub preferred_product: Option<&'a str>,
}

/// Changeset struct for updating customer records. `None` personalization
/// fields clear the stored value rather than being skipped.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = customers)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct CustomerUpdate<'a> {
    pub phone: &'a str,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub location: Option<&'a str>,
    pub preferred_product: Option<&'a str>,
}

/// Row struct for reading from the campaigns table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = campaigns)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CampaignRow {
    pub id: i32,
    pub name: String,
    pub channel: String,
    pub status: String,
    pub base_template: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CampaignRow> for Campaign {
    type Error = ClosedSetViolation;

    fn try_from(row: CampaignRow) -> Result<Self, Self::Error> {
        let channel = Channel::parse(&row.channel).ok_or_else(|| ClosedSetViolation {
            column: "campaigns.channel",
            value: row.channel.clone(),
        })?;
        let status = CampaignStatus::parse(&row.status).ok_or_else(|| ClosedSetViolation {
            column: "campaigns.status",
            value: row.status.clone(),
        })?;
        Ok(Self {
            id: row.id,
            name: row.name,
            channel,
            status,
            base_template: row.base_template,
            scheduled_at: row.scheduled_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for creating campaign records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = campaigns)]
pub(crate) struct NewCampaignRow<'a> {
    pub name: &'a str,
    pub channel: &'a str,
    pub status: &'a str,
    pub base_template: &'a str,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Row struct for reading from the outbound_messages table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = outbound_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct OutboundMessageRow {
    pub id: i32,
    pub campaign_id: i32,
    pub customer_id: i32,
    pub status: String,
    pub rendered_content: Option<String>,
    pub last_error: Option<String>,
    pub retry_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<OutboundMessageRow> for OutboundMessage {
    type Error = ClosedSetViolation;

    fn try_from(row: OutboundMessageRow) -> Result<Self, Self::Error> {
        let status = MessageStatus::parse(&row.status).ok_or_else(|| ClosedSetViolation {
            column: "outbound_messages.status",
            value: row.status.clone(),
        })?;
        Ok(Self {
            id: row.id,
            campaign_id: row.campaign_id,
            customer_id: row.customer_id,
            status,
            rendered_content: row.rendered_content,
            last_error: row.last_error,
            retry_count: row.retry_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insertable struct for the coordinator's batch creation.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = outbound_messages)]
pub(crate) struct NewOutboundMessageRow {
    pub campaign_id: i32,
    pub customer_id: i32,
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign_row() -> CampaignRow {
        CampaignRow {
            id: 1,
            name: "Welcome".into(),
            channel: "sms".into(),
            status: "draft".into(),
            base_template: "Hi".into(),
            scheduled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn campaign_row_converts_closed_set_strings() {
        let campaign = Campaign::try_from(campaign_row()).expect("converts");
        assert_eq!(campaign.channel, Channel::Sms);
        assert_eq!(campaign.status, CampaignStatus::Draft);
    }

    #[test]
    fn out_of_band_channel_value_is_an_error() {
        let mut row = campaign_row();
        row.channel = "carrier-pigeon".into();
        let error = Campaign::try_from(row).expect_err("outside the closed set");
        assert_eq!(error.column, "campaigns.channel");
    }

    #[test]
    fn out_of_band_message_status_is_an_error() {
        let row = OutboundMessageRow {
            id: 1,
            campaign_id: 1,
            customer_id: 1,
            status: "queued".into(),
            rendered_content: None,
            last_error: None,
            retry_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let error = OutboundMessage::try_from(row).expect_err("outside the closed set");
        assert_eq!(error.column, "outbound_messages.status");
    }
}

//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations exactly; regenerate with
//! `diesel print-schema` after schema changes.

diesel::table! {
    /// Addressable message recipients with optional personalization fields.
    customers (id) {
        id -> Int4,
        phone -> Varchar,
        first_name -> Nullable<Varchar>,
        last_name -> Nullable<Varchar>,
        location -> Nullable<Varchar>,
        preferred_product -> Nullable<Varchar>,
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Operator-defined messaging jobs.
    campaigns (id) {
        id -> Int4,
        name -> Varchar,
        channel -> Varchar,
        status -> Varchar,
        base_template -> Text,
        scheduled_at -> Nullable<Timestamptz>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Per-recipient outbound messages; rows cascade with their campaign
    /// and customer.
    outbound_messages (id) {
        id -> Int4,
        campaign_id -> Int4,
        customer_id -> Int4,
        status -> Varchar,
        rendered_content -> Nullable<Text>,
        last_error -> Nullable<Text>,
        retry_count -> Int4,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(outbound_messages -> campaigns (campaign_id));
diesel::joinable!(outbound_messages -> customers (customer_id));

diesel::allow_tables_to_appear_in_same_query!(campaigns, customers, outbound_messages);

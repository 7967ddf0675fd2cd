//! PostgreSQL-backed `CustomerRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CustomerDraft, CustomerRepository, CustomerRepositoryError};
use crate::domain::Customer;

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CustomerRow, CustomerUpdate, NewCustomerRow};
use super::pool::{DbPool, PoolError};
use super::schema::customers;

/// Diesel-backed implementation of the `CustomerRepository` port.
#[derive(Clone)]
pub struct DieselCustomerRepository {
    pool: DbPool,
}

impl DieselCustomerRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> CustomerRepositoryError {
    map_pool_error(error, CustomerRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> CustomerRepositoryError {
    map_diesel_error(
        error,
        CustomerRepositoryError::query,
        CustomerRepositoryError::connection,
    )
}

#[async_trait]
impl CustomerRepository for DieselCustomerRepository {
    async fn create(&self, draft: CustomerDraft) -> Result<Customer, CustomerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewCustomerRow {
            phone: &draft.phone,
            first_name: draft.first_name.as_deref(),
            last_name: draft.last_name.as_deref(),
            location: draft.location.as_deref(),
            preferred_product: draft.preferred_product.as_deref(),
        };

        let row: CustomerRow = diesel::insert_into(customers::table)
            .values(&new_row)
            .returning(CustomerRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Customer>, CustomerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<CustomerRow> = customers::table
            .find(id)
            .select(CustomerRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;

        Ok(row.map(Customer::from))
    }

    async fn find_by_ids(&self, ids: Vec<i32>) -> Result<Vec<Customer>, CustomerRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<CustomerRow> = customers::table
            .filter(customers::id.eq_any(ids))
            .order(customers::id.asc())
            .select(CustomerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Customer>, CustomerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<CustomerRow> = customers::table
            .order(customers::id.desc())
            .limit(limit)
            .offset(offset)
            .select(CustomerRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn update(
        &self,
        id: i32,
        draft: CustomerDraft,
    ) -> Result<bool, CustomerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let changes = CustomerUpdate {
            phone: &draft.phone,
            first_name: draft.first_name.as_deref(),
            last_name: draft.last_name.as_deref(),
            location: draft.location.as_deref(),
            preferred_product: draft.preferred_product.as_deref(),
        };

        let affected = diesel::update(customers::table.find(id))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(affected > 0)
    }

    async fn delete(&self, id: i32) -> Result<bool, CustomerRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let affected = diesel::delete(customers::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(affected > 0)
    }
}

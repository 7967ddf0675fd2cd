//! Port for customer persistence.

use async_trait::async_trait;

use crate::domain::Customer;

use super::define_port_error;

define_port_error! {
    /// Errors raised by customer repository adapters.
    pub enum CustomerRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "customer repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "customer repository query failed: {message}",
    }
}

/// Draft values for creating or updating a customer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CustomerDraft {
    pub phone: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub location: Option<String>,
    pub preferred_product: Option<String>,
}

/// Port for customer storage and retrieval.
///
/// The dispatch core only reads customers; the write operations back the
/// operator CRUD surface and the test fixtures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Persist a new customer and return it with its assigned identifier.
    async fn create(&self, draft: CustomerDraft) -> Result<Customer, CustomerRepositoryError>;

    /// Fetch one customer. Returns `None` when absent.
    async fn find_by_id(&self, id: i32) -> Result<Option<Customer>, CustomerRepositoryError>;

    /// Fetch every customer in the identifier set. Identifiers with no
    /// matching row are silently dropped from the result.
    async fn find_by_ids(&self, ids: Vec<i32>) -> Result<Vec<Customer>, CustomerRepositoryError>;

    /// List customers newest-first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Customer>, CustomerRepositoryError>;

    /// Overwrite a customer's attributes. Returns `false` when absent.
    async fn update(&self, id: i32, draft: CustomerDraft)
        -> Result<bool, CustomerRepositoryError>;

    /// Delete a customer. Returns `false` when absent.
    async fn delete(&self, id: i32) -> Result<bool, CustomerRepositoryError>;
}

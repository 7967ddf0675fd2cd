//! Domain error representation shared across adapters.
//!
//! Keep this module free from HTTP or framework concerns so the same error
//! shape can be mapped by any adapter (HTTP handlers, the delivery worker,
//! future surfaces).

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Stable machine-readable error code.
///
/// The set is closed: adapters rely on an exhaustive mapping from code to
/// transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The request body is not parseable JSON.
    InvalidJson,
    /// The request is well-formed but fails validation.
    ValidationError,
    /// The referenced entity does not exist.
    ResourceNotFound,
    /// A state-machine rule forbids the operation.
    BusinessLogicError,
    /// Reserved for duplicate-by-unique-key scenarios.
    Conflict,
    /// Store, queue, or unexpected failure.
    InternalError,
}

/// Domain error payload consumed by adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema, Error)]
#[error("{message}")]
pub struct Error {
    #[schema(example = "VALIDATION_ERROR")]
    code: ErrorCode,
    #[schema(example = "name is required")]
    message: String,
}

impl Error {
    /// Create a new error with an explicit code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Malformed request body.
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidJson, message)
    }

    /// Validation failure on otherwise well-formed input.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Entity lookup failure, phrased consistently across resources.
    pub fn not_found(resource: &str, id: i32) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{resource} with ID {id} not found"),
        )
    }

    /// State-machine violation.
    pub fn business(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BusinessLogicError, message)
    }

    /// Duplicate-key style conflict.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }

    /// Unexpected failure. The message is logged by adapters and replaced
    /// with a generic one before leaving the process.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

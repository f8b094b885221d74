//! Domain error kinds
//!
//! Every lifecycle and oversight operation fails with one of five kinds.
//! Business-rule failures (validation, not found, forbidden, conflict) are
//! raised locally and never retried. Store failures become `Internal` and
//! are logged once, with the operation, caller and target, at the point
//! where they are converted.

use std::fmt;

use uuid::Uuid;

use crate::auth::authorization::AuthzError;
use crate::auth::principal::Principal;
use crate::store::StoreError;

/// Result alias for domain operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error kinds surfaced by the core
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Missing or malformed required input
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Referenced project, task or user does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Role-class, membership or ownership check failed
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Uniqueness violation (duplicate email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Persistence failure or other unexpected condition
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Discriminant of [`ServiceError`], handy for assertions and metrics labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Forbidden,
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ServiceError {
    /// Returns the kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Forbidden(_) => ErrorKind::Forbidden,
            ServiceError::Conflict(_) => ErrorKind::Conflict,
            ServiceError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Converts a store failure into `Internal`, logging the context needed
    /// to diagnose it. The returned message carries only the operation name.
    pub fn store_failure(
        operation: &'static str,
        caller: &Principal,
        target: Option<Uuid>,
        err: StoreError,
    ) -> Self {
        tracing::error!(
            operation,
            caller = %caller,
            target = ?target,
            error = %err,
            "Store operation failed"
        );
        ServiceError::Internal(format!("{} failed", operation))
    }
}

/// Builds a `map_err` adapter that routes store errors through
/// [`ServiceError::store_failure`].
pub(crate) fn store_err<'a>(
    operation: &'static str,
    caller: &'a Principal,
    target: Option<Uuid>,
) -> impl FnOnce(StoreError) -> ServiceError + 'a {
    move |err| ServiceError::store_failure(operation, caller, target, err)
}

/// Rejects text longer than a column allows, counted in characters
pub(crate) fn check_max_len(field: &str, value: &str, max: usize) -> ServiceResult<()> {
    if value.chars().count() > max {
        return Err(ServiceError::Validation(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        ServiceError::Forbidden(err.to_string())
    }
}

//! Shared Diesel-to-port error mapping.
//!
//! Each adapter owns a distinct port error type, but the classification of a
//! Diesel failure is the same everywhere: closed connections are connection
//! errors, everything else is a query error. Adapters pass their error
//! constructors in so the classification lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// Classified store failure, ready to be lifted into a port error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    /// The connection itself failed.
    Connection(String),
    /// The statement failed; internals are logged, not propagated.
    Query(String),
}

impl DbFailure {
    /// Lift into a concrete port error via its constructor pair.
    pub(crate) fn lift<E>(
        self,
        connection: impl FnOnce(String) -> E,
        query: impl FnOnce(String) -> E,
    ) -> E {
        match self {
            Self::Connection(message) => connection(message),
            Self::Query(message) => query(message),
        }
    }
}

/// Classify a Diesel error, logging the adapter-level detail.
pub(crate) fn classify_diesel_error(error: DieselError) -> DbFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => {
            debug!(error = %other, "diesel operation failed");
        }
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DbFailure::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => DbFailure::Query("record not found".to_owned()),
        _ => DbFailure::Query("database error".to_owned()),
    }
}

/// True when the error is a unique-constraint violation, used to detect
/// duplicate registrations without racing a pre-check.
pub(crate) fn is_unique_violation(error: &DieselError) -> bool {
    matches!(
        error,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)
    )
}

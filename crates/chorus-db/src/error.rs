//! Database error types for chorus-db.

use chorus_core::errors::CoreError;
use thiserror::Error;

/// Errors from audit log and catalog operations.
///
/// Any of these raised on a write path aborts the enclosing transaction: the
/// catalog change and its audit rows commit together or not at all.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// The subject of a lookup does not exist at all.
    #[error("Not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Operation conflicts with current state (e.g. duplicate link).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Validation failure from the core types.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub(crate) fn not_found(entity_type: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }
}

//! Cross-cutting error types for chorus.
//!
//! Storage errors (`DatabaseError`) live in `chorus-db`, configuration errors
//! in `chorus-config`. The CLI converges everything into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any chorus crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Entity lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// Data failed validation (range, format, consistency).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

//! Write side of change capture.
//!
//! Turns a lifecycle transition into mutations with the pure diffing in
//! `chorus_core::capture` and appends them through the audit repo on the
//! caller's open transaction.

use chrono::{DateTime, Utc};

use chorus_core::audit::Mutation;
use chorus_core::capture::{Transition, mutations};
use chorus_core::tracked::Tracked;

use crate::error::DatabaseError;
use crate::repos::audit;

/// Capture one transition. Returns the number of audit rows written.
///
/// # Errors
///
/// Returns `DatabaseError` if diffing or any audit INSERT fails. The caller
/// must then let its transaction roll back.
pub async fn capture<T: Tracked>(
    conn: &libsql::Connection,
    at: DateTime<Utc>,
    transition: &Transition<'_, T>,
) -> Result<usize, DatabaseError> {
    let batch = mutations(transition)?;
    append_all(conn, at, &batch).await
}

/// Append precomputed mutations in order.
///
/// # Errors
///
/// Returns `DatabaseError` on the first failed INSERT.
pub async fn append_all(
    conn: &libsql::Connection,
    at: DateTime<Utc>,
    batch: &[Mutation],
) -> Result<usize, DatabaseError> {
    let mut written = 0;
    for mutation in batch {
        let rows = audit::append(conn, at, mutation).await?;
        tracing::debug!(
            table = %mutation.table,
            record_id = mutation.record_id,
            fields = rows,
            "captured mutation"
        );
        written += rows;
    }
    Ok(written)
}

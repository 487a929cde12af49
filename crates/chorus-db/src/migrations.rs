//! Database migration runner.
//!
//! Embeds the SQL schema at compile time and executes it on open. All
//! statements use `IF NOT EXISTS` so re-running is a no-op.

use crate::ChorusDb;
use crate::error::DatabaseError;

/// Audit log (with append-only triggers) and catalog tables.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl ChorusDb {
    /// Run all embedded migrations in sequence.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}

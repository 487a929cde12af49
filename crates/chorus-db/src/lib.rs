//! # chorus-db
//!
//! libSQL storage for the chorus music catalog and its change-audit log.
//!
//! - `repos::audit` is the append-only audit log: `record_mutation` writes
//!   field-level deltas, `AuditFilter` queries them.
//! - `repos::*` is the catalog persistence layer. Every mutation runs in one
//!   transaction and calls change capture explicitly at post-create,
//!   post-update and pre-delete points.
//! - `history` replays the audit log into a user's timeline.

pub mod capture;
pub mod error;
pub mod helpers;
pub mod history;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Database handle: one libSQL database and one connection.
pub struct ChorusDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl ChorusDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Must be set per connection in SQLite.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let chorus_db = Self { db, conn };
        chorus_db.run_migrations().await?;
        tracing::debug!(path, "opened chorus database");
        Ok(chorus_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> ChorusDb {
        ChorusDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "audit_records",
            "users",
            "artists",
            "songs",
            "artist_song",
            "playlists",
            "playlist_song",
            "ratings",
            "comments",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn audit_rows_cannot_be_updated_or_deleted() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO audit_records (created_at, table_name, record_id, column_name, old_value, new_value)
                 VALUES ('2026-01-01T00:00:00.000000Z', 'song', 1, 'title', NULL, 'Alpha')",
                (),
            )
            .await
            .unwrap();

        let update = db
            .conn()
            .execute("UPDATE audit_records SET new_value = 'Beta'", ())
            .await;
        assert!(update.is_err(), "UPDATE should be rejected by trigger");

        let delete = db.conn().execute("DELETE FROM audit_records", ()).await;
        assert!(delete.is_err(), "DELETE should be rejected by trigger");
    }

    #[tokio::test]
    async fn audit_row_needs_a_value() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO audit_records (created_at, table_name, record_id, column_name, old_value, new_value)
                 VALUES ('2026-01-01T00:00:00.000000Z', 'song', 1, 'title', NULL, NULL)",
                (),
            )
            .await;
        assert!(result.is_err(), "CHECK constraint should reject valueless rows");
    }
}

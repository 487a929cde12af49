//! Service layer orchestrating catalog mutations with change capture.
//!
//! `CatalogService` wraps `ChorusDb` (raw database access) and a `Clock`
//! (audit timestamps). All repo methods are implemented as
//! `impl CatalogService`.
//!
//! The service owns a single libSQL connection, so it serializes access to
//! it: mutations hold the write gate from `BEGIN` until commit or rollback,
//! reads share the read gate and only ever see committed rows.

use std::ops::Deref;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chorus_core::clock::{Clock, SystemClock};

use crate::ChorusDb;
use crate::error::DatabaseError;

/// Orchestrates catalog mutations with the audit log.
///
/// Every mutation method follows this protocol:
/// 1. Take the write gate and begin the transaction
/// 2. Take one timestamp from the clock
/// 3. Load the before-snapshot (updates and deletes)
/// 4. Execute SQL
/// 5. Capture the transition into `audit_records` (inside the transaction)
/// 6. Commit
///
/// Any error between 1 and 6 drops the transaction, which rolls it back
/// before the gate is released.
pub struct CatalogService {
    db: ChorusDb,
    clock: Arc<dyn Clock>,
    gate: RwLock<()>,
}

/// A mutation's transaction, holding the write gate until it ends.
///
/// Fields drop in order, so an uncommitted transaction rolls back while the
/// gate is still held.
pub struct WriteTx<'a> {
    tx: libsql::Transaction,
    _gate: RwLockWriteGuard<'a, ()>,
}

impl WriteTx<'_> {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the commit fails.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }
}

impl Deref for WriteTx<'_> {
    type Target = libsql::Transaction;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

/// Shared read access to the connection between mutations.
pub struct ReadConn<'a> {
    conn: &'a libsql::Connection,
    _gate: RwLockReadGuard<'a, ()>,
}

impl Deref for ReadConn<'_> {
    type Target = libsql::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn
    }
}

impl CatalogService {
    /// Create a new service wrapping a local database and the system clock.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = ChorusDb::open_local(db_path).await?;
        Ok(Self::from_db(db))
    }

    /// Create from an existing `ChorusDb` with the system clock.
    #[must_use]
    pub fn from_db(db: ChorusDb) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            gate: RwLock::new(()),
        }
    }

    /// Replace the clock (tests use `ManualClock`).
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ChorusDb {
        &self.db
    }

    /// Wait for exclusive access and begin a transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `BEGIN` fails.
    pub async fn begin_write(&self) -> Result<WriteTx<'_>, DatabaseError> {
        let gate = self.gate.write().await;
        let tx = self.db.conn().transaction().await?;
        Ok(WriteTx { tx, _gate: gate })
    }

    /// Wait until no mutation is in flight and borrow the connection.
    pub async fn reader(&self) -> ReadConn<'_> {
        ReadConn {
            conn: self.db.conn(),
            _gate: self.gate.read().await,
        }
    }

    /// The instant every audit row of the next mutation is stamped with.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

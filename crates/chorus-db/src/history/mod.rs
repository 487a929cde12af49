//! History Reconstruction Engine.
//!
//! Replays the audit log into a user's timeline. Each category module finds
//! its originating records with a windowed query, then resolves titles and
//! artist names through unwindowed lookups (`resolve`). Events are merged and
//! ordered by `(created_at, originating record id)`.
//!
//! Reconstruction is read-only and runs outside any transaction.

mod comments;
mod playlists;
mod ratings;
mod resolve;
mod songs;

use chorus_core::audit::{AuditRecord, Polarity};
use chorus_core::entities::User;
use chorus_core::timeline::{EventKind, TimeWindow, TimelineEvent};
use chorus_core::tracked::Tracked;

use crate::error::DatabaseError;
use crate::repos::audit::AuditFilter;
use crate::service::CatalogService;

use resolve::Resolver;

/// An event plus the id of the audit record it came from, for tie-breaks.
#[derive(Debug)]
struct Collected {
    origin: i64,
    event: TimelineEvent,
}

impl Collected {
    fn new(record: &AuditRecord, kind: &EventKind) -> Self {
        Self {
            origin: record.id,
            event: TimelineEvent::new(record.created_at, kind),
        }
    }
}

/// Record ids of the rows a user created, found through an ownership
/// column. Unwindowed: a row created before the window can still change
/// inside it.
async fn owned_records(
    svc: &CatalogService,
    table: &str,
    owner_column: &str,
    user_id: i64,
) -> Result<Vec<i64>, DatabaseError> {
    let created = svc
        .query_audit(
            &AuditFilter::column(table, owner_column)
                .polarity(Polarity::Creation)
                .value(user_id),
        )
        .await?;
    let mut ids: Vec<i64> = created.iter().map(|r| r.record_id).collect();
    ids.dedup();
    Ok(ids)
}

impl CatalogService {
    /// Reconstruct a user's timeline, optionally bounded by a window on the
    /// originating records' `created_at`.
    ///
    /// Every audit query takes the read gate on its own, so mutations commit
    /// between them and each query sees only committed rows.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the log holds no signup record for
    /// the user at all. A user with nothing inside the window gets `Ok(vec![])`.
    /// Any storage error aborts the whole reconstruction.
    pub async fn reconstruct_history(
        &self,
        user_id: i64,
        window: &TimeWindow,
    ) -> Result<Vec<TimelineEvent>, DatabaseError> {
        let signup = AuditFilter::column(User::TABLE, "id")
            .record(user_id)
            .polarity(Polarity::Creation);
        if self.query_audit(&signup).await?.is_empty() {
            return Err(DatabaseError::not_found("user", user_id));
        }

        let resolver = Resolver::new(self);
        let mut collected: Vec<Collected> = self
            .query_audit(&signup.within(*window))
            .await?
            .iter()
            .map(|record| Collected::new(record, &EventKind::SignedUp))
            .collect();

        let songs = songs::collect(self, &resolver, user_id, window).await?;
        tracing::debug!(user_id, events = songs.len(), "song events");
        collected.extend(songs);

        let playlists = playlists::collect(self, &resolver, user_id, window).await?;
        tracing::debug!(user_id, events = playlists.len(), "playlist events");
        collected.extend(playlists);

        let ratings = ratings::collect(self, &resolver, user_id, window).await?;
        tracing::debug!(user_id, events = ratings.len(), "rating events");
        collected.extend(ratings);

        let comments = comments::collect(self, &resolver, user_id, window).await?;
        tracing::debug!(user_id, events = comments.len(), "comment events");
        collected.extend(comments);

        collected.sort_by_key(|c| (c.event.timestamp, c.origin));
        tracing::info!(user_id, events = collected.len(), "reconstructed history");

        Ok(collected.into_iter().map(|c| c.event).collect())
    }
}

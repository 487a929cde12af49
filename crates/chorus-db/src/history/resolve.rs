//! Cross-table attribute resolution by null-polarity correlation.
//!
//! Every lookup here reads the audit log unwindowed: an event inside the
//! window may need a title written long before it. Values are taken as of
//! the event's own timestamp, so a song renamed later still shows the title
//! it had when it was rated. Missing attributes degrade to empty strings.

use chrono::{DateTime, Utc};

use chorus_core::audit::{AuditRecord, Polarity};
use chorus_core::entities::{Artist, Playlist, SONG_ARTISTS, Song};
use chorus_core::timeline::SongLabel;
use chorus_core::tracked::Tracked;

use crate::error::DatabaseError;
use crate::helpers::parse_id;
use crate::repos::audit::AuditFilter;
use crate::service::CatalogService;

/// One link row of an association, reassembled from its audit records.
#[derive(Debug)]
struct LinkSpan {
    row_id: i64,
    added: Option<DateTime<Utc>>,
    removed: Option<DateTime<Utc>>,
}

impl LinkSpan {
    /// Linked at `at`. A removal stamped exactly `at` still counts, so a
    /// deletion event sees the links it is removing.
    fn live_at(&self, at: DateTime<Utc>) -> bool {
        self.added.is_some_and(|added| added <= at)
            && self.removed.is_none_or(|removed| removed >= at)
    }
}

pub(super) struct Resolver<'a> {
    svc: &'a CatalogService,
}

impl<'a> Resolver<'a> {
    pub(super) const fn new(svc: &'a CatalogService) -> Self {
        Self { svc }
    }

    /// Value of `table.column` for one row as of `at`.
    ///
    /// Falls back to the earliest known value when nothing was recorded
    /// before `at`.
    async fn value_at(
        &self,
        table: &str,
        record_id: i64,
        column: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<String>, DatabaseError> {
        let history = self
            .svc
            .query_audit(&AuditFilter::column(table, column).record(record_id))
            .await?;
        let chosen = history
            .iter()
            .rev()
            .find(|r| r.created_at <= at)
            .or_else(|| history.first());
        Ok(chosen.and_then(AuditRecord::carried_value).map(str::to_string))
    }

    async fn text_at(
        &self,
        table: &str,
        record_id: i64,
        column: &str,
        at: DateTime<Utc>,
    ) -> Result<String, DatabaseError> {
        if let Some(value) = self.value_at(table, record_id, column, at).await? {
            return Ok(value);
        }
        tracing::warn!(table, record_id, column, "no audit rows to resolve attribute, using empty value");
        Ok(String::new())
    }

    /// Foreign key stored on a row. Keys never change, so any record of the
    /// column carries it.
    pub(super) async fn foreign_key(
        &self,
        table: &str,
        record_id: i64,
        column: &str,
    ) -> Result<Option<i64>, DatabaseError> {
        let mut filter = AuditFilter::column(table, column).record(record_id);
        filter.limit = Some(1);
        let history = self.svc.query_audit(&filter).await?;
        let id = history
            .first()
            .and_then(AuditRecord::carried_value)
            .and_then(parse_id);
        if id.is_none() {
            tracing::warn!(table, record_id, column, "unresolvable foreign key");
        }
        Ok(id)
    }

    pub(super) async fn playlist_title(
        &self,
        playlist_id: i64,
        at: DateTime<Utc>,
    ) -> Result<String, DatabaseError> {
        self.text_at(Playlist::TABLE, playlist_id, "title", at).await
    }

    /// `Title - Artist, Artist` of a song as of `at`. `None` degrades to an
    /// empty label.
    pub(super) async fn song_label(
        &self,
        song_id: Option<i64>,
        at: DateTime<Utc>,
    ) -> Result<SongLabel, DatabaseError> {
        let Some(song_id) = song_id else {
            return Ok(SongLabel::default());
        };
        Ok(SongLabel {
            title: self.text_at(Song::TABLE, song_id, "title", at).await?,
            artists: self.artist_names(song_id, at).await?,
        })
    }

    /// Names of the artists linked to a song at `at`, in link creation order.
    ///
    /// Link rows are found by the carried value of their `song_id` column,
    /// then each row's `artist_id` sibling record gives the artist, whose
    /// `name` comes from the artist table's own records.
    async fn artist_names(
        &self,
        song_id: i64,
        at: DateTime<Utc>,
    ) -> Result<Vec<String>, DatabaseError> {
        let records = self
            .svc
            .query_audit(
                &AuditFilter::column(SONG_ARTISTS.table, SONG_ARTISTS.owner_column).value(song_id),
            )
            .await?;

        let mut spans: Vec<LinkSpan> = Vec::new();
        for record in &records {
            let idx = if let Some(idx) = spans.iter().position(|s| s.row_id == record.record_id) {
                idx
            } else {
                spans.push(LinkSpan {
                    row_id: record.record_id,
                    added: None,
                    removed: None,
                });
                spans.len() - 1
            };
            match record.polarity() {
                Some(Polarity::Creation) => spans[idx].added = Some(record.created_at),
                Some(Polarity::Deletion) => spans[idx].removed = Some(record.created_at),
                _ => {}
            }
        }

        let mut seen = Vec::new();
        let mut names = Vec::new();
        for span in spans.iter().filter(|s| s.live_at(at)) {
            let Some(artist_id) = self
                .foreign_key(SONG_ARTISTS.table, span.row_id, SONG_ARTISTS.related_column)
                .await?
            else {
                continue;
            };
            if seen.contains(&artist_id) {
                continue;
            }
            seen.push(artist_id);
            names.push(self.text_at(Artist::TABLE, artist_id, "name", at).await?);
        }
        Ok(names)
    }
}

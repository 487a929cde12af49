//! Uploads and deletions, found on the song's ownership column.

use chorus_core::audit::Polarity;
use chorus_core::entities::Song;
use chorus_core::timeline::{EventKind, TimeWindow};
use chorus_core::tracked::Tracked;

use super::{Collected, Resolver};
use crate::error::DatabaseError;
use crate::repos::audit::AuditFilter;
use crate::service::CatalogService;

pub(super) async fn collect(
    svc: &CatalogService,
    resolver: &Resolver<'_>,
    user_id: i64,
    window: &TimeWindow,
) -> Result<Vec<Collected>, DatabaseError> {
    let records = svc
        .query_audit(
            &AuditFilter::column(Song::TABLE, "user_id")
                .value(user_id)
                .within(*window),
        )
        .await?;

    let mut out = Vec::new();
    for record in &records {
        let polarity = record.polarity();
        if !matches!(polarity, Some(Polarity::Creation | Polarity::Deletion)) {
            continue;
        }
        let song = resolver
            .song_label(Some(record.record_id), record.created_at)
            .await?;
        let kind = if polarity == Some(Polarity::Creation) {
            EventKind::UploadedSong { song }
        } else {
            EventKind::DeletedSong { song }
        };
        out.push(Collected::new(record, &kind));
    }
    Ok(out)
}

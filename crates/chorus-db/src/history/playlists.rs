//! Playlist creation and deletion, and songs added to or removed from the
//! user's playlists.

use chorus_core::audit::Polarity;
use chorus_core::entities::{PLAYLIST_SONGS, Playlist};
use chorus_core::timeline::{EventKind, TimeWindow};
use chorus_core::tracked::Tracked;

use super::{Collected, Resolver, owned_records};
use crate::error::DatabaseError;
use crate::repos::audit::AuditFilter;
use crate::service::CatalogService;

pub(super) async fn collect(
    svc: &CatalogService,
    resolver: &Resolver<'_>,
    user_id: i64,
    window: &TimeWindow,
) -> Result<Vec<Collected>, DatabaseError> {
    let mut out = Vec::new();

    let lifecycle = svc
        .query_audit(
            &AuditFilter::column(Playlist::TABLE, "user_id")
                .value(user_id)
                .within(*window),
        )
        .await?;
    for record in &lifecycle {
        let polarity = record.polarity();
        if !matches!(polarity, Some(Polarity::Creation | Polarity::Deletion)) {
            continue;
        }
        let playlist = resolver
            .playlist_title(record.record_id, record.created_at)
            .await?;
        let kind = if polarity == Some(Polarity::Creation) {
            EventKind::CreatedPlaylist { playlist }
        } else {
            EventKind::DeletedPlaylist { playlist }
        };
        out.push(Collected::new(record, &kind));
    }

    for playlist_id in owned_records(svc, Playlist::TABLE, "user_id", user_id).await? {
        let links = svc
            .query_audit(
                &AuditFilter::column(PLAYLIST_SONGS.table, PLAYLIST_SONGS.owner_column)
                    .value(playlist_id)
                    .within(*window),
            )
            .await?;

        for record in &links {
            let polarity = record.polarity();
            if !matches!(polarity, Some(Polarity::Creation | Polarity::Deletion)) {
                continue;
            }
            let song_id = resolver
                .foreign_key(PLAYLIST_SONGS.table, record.record_id, PLAYLIST_SONGS.related_column)
                .await?;
            let song = resolver.song_label(song_id, record.created_at).await?;
            let playlist = resolver.playlist_title(playlist_id, record.created_at).await?;
            let kind = if polarity == Some(Polarity::Creation) {
                EventKind::AddedSongToPlaylist { song, playlist }
            } else {
                EventKind::RemovedSongFromPlaylist { song, playlist }
            };
            out.push(Collected::new(record, &kind));
        }
    }

    Ok(out)
}

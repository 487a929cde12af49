//! Ratings given and changed. Deleting a rating is not a timeline event.

use chorus_core::audit::Polarity;
use chorus_core::entities::Rating;
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

    for rating_id in owned_records(svc, Rating::TABLE, "user_id", user_id).await? {
        let marks = svc
            .query_audit(
                &AuditFilter::column(Rating::TABLE, "mark")
                    .record(rating_id)
                    .within(*window),
            )
            .await?;
        if marks.is_empty() {
            continue;
        }

        let song_id = resolver
            .foreign_key(Rating::TABLE, rating_id, "song_id")
            .await?;
        for record in &marks {
            let kind = match (record.polarity(), &record.old_value, &record.new_value) {
                (Some(Polarity::Creation), _, Some(mark)) => EventKind::RatedSong {
                    song: resolver.song_label(song_id, record.created_at).await?,
                    mark: mark.clone(),
                },
                (Some(Polarity::Update), Some(from), Some(to)) => EventKind::ChangedRating {
                    song: resolver.song_label(song_id, record.created_at).await?,
                    from: from.clone(),
                    to: to.clone(),
                },
                _ => continue,
            };
            out.push(Collected::new(record, &kind));
        }
    }

    Ok(out)
}

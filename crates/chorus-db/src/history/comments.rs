//! Comments written, edited and deleted.

use chorus_core::audit::Polarity;
use chorus_core::entities::Comment;
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

    for comment_id in owned_records(svc, Comment::TABLE, "user_id", user_id).await? {
        let messages = svc
            .query_audit(
                &AuditFilter::column(Comment::TABLE, "message")
                    .record(comment_id)
                    .within(*window),
            )
            .await?;
        if messages.is_empty() {
            continue;
        }

        let song_id = resolver
            .foreign_key(Comment::TABLE, comment_id, "song_id")
            .await?;
        for record in &messages {
            let song = resolver.song_label(song_id, record.created_at).await?;
            let kind = match (record.polarity(), &record.old_value, &record.new_value) {
                (Some(Polarity::Creation), _, Some(message)) => EventKind::WroteComment {
                    song,
                    message: message.clone(),
                },
                (Some(Polarity::Update), Some(from), Some(to)) => EventKind::ChangedComment {
                    song,
                    from: from.clone(),
                    to: to.clone(),
                },
                (Some(Polarity::Deletion), Some(message), _) => EventKind::DeletedComment {
                    song,
                    message: message.clone(),
                },
                _ => continue,
            };
            out.push(Collected::new(record, &kind));
        }
    }

    Ok(out)
}

//! `chorus export`: one user's data as a `.tar.gz` of CSV extracts.

use std::path::PathBuf;

use chorus_core::entities::PLAYLIST_SONGS;
use chorus_core::timeline::TimeWindow;

use crate::archive::{ArchiveEntry, write_tar_gz};
use crate::cli::GlobalFlags;
use crate::cli::root_commands::ExportArgs;
use crate::commands::shared::window::parse_window;
use crate::context::AppContext;
use crate::output::csv::{events_to_csv, records_to_csv};
use crate::output::output;

#[derive(Debug, serde::Serialize)]
struct ExportResponse {
    user_id: i64,
    archive: String,
    files: Vec<String>,
}

/// Handle `chorus export`.
pub async fn handle(args: &ExportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let window = parse_window(args.from.as_deref(), args.to.as_deref())?;
    let path = args.out.clone().unwrap_or_else(|| {
        PathBuf::from(&ctx.config.export.output_dir).join(format!("chorus-user-{}.tar.gz", args.user))
    });

    let entries = collect(args.user, &window, ctx).await?;
    write_tar_gz(&path, &entries)?;
    tracing::info!(user_id = args.user, path = %path.display(), "export archive written");

    let response = ExportResponse {
        user_id: args.user,
        archive: path.display().to_string(),
        files: entries.into_iter().map(|entry| entry.name).collect(),
    };
    output(&response, flags.format_or(ctx.config.history.default_format))
}

/// Build every archive member for one user, timeline first.
///
/// `window` bounds the events history only; the catalog extracts are
/// always the user's current data.
pub async fn collect(
    user_id: i64,
    window: &TimeWindow,
    ctx: &AppContext,
) -> anyhow::Result<Vec<ArchiveEntry>> {
    let svc = &ctx.service;
    let user = svc.get_user(user_id).await?;
    let events = svc.reconstruct_history(user_id, window).await?;

    let personal = vec![vec![user.id.to_string(), user.username, user.email]];

    let songs = svc
        .list_songs_by_owner(user_id)
        .await?
        .into_iter()
        .map(|credited| {
            vec![
                credited.song.id.to_string(),
                credited.song.title,
                credited.artists.join(", "),
                credited.song.year.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect::<Vec<_>>();

    let mut playlists = Vec::new();
    for snapshot in svc.list_playlists_by_owner(user_id).await? {
        for song_id in snapshot.related_ids(PLAYLIST_SONGS.name) {
            let (title, artists) = song_columns(ctx, song_id).await?;
            playlists.push(vec![
                snapshot.entity.id.to_string(),
                snapshot.entity.title.clone(),
                title,
                artists,
            ]);
        }
    }

    let mut ratings = Vec::new();
    for rating in svc.list_ratings_by_user(user_id).await? {
        let (title, artists) = song_columns(ctx, rating.song_id).await?;
        ratings.push(vec![title, artists, rating.mark.to_string()]);
    }

    let mut comments = Vec::new();
    for comment in svc.list_comments_by_user(user_id).await? {
        let (title, artists) = song_columns(ctx, comment.song_id).await?;
        comments.push(vec![title, artists, comment.message]);
    }

    Ok(vec![
        ArchiveEntry::new("events_history.csv", events_to_csv(&events)?),
        ArchiveEntry::new(
            "personal_data.csv",
            records_to_csv(&["identifier", "username", "email"], &personal)?,
        ),
        ArchiveEntry::new(
            "uploaded_songs.csv",
            records_to_csv(&["identifier", "title", "artist", "release_date"], &songs)?,
        ),
        ArchiveEntry::new(
            "created_playlists.csv",
            records_to_csv(&["identifier", "title", "song_title", "song_artist"], &playlists)?,
        ),
        ArchiveEntry::new(
            "ratings.csv",
            records_to_csv(&["song_title", "song_artist", "mark"], &ratings)?,
        ),
        ArchiveEntry::new(
            "comments.csv",
            records_to_csv(&["song_title", "song_artist", "comment"], &comments)?,
        ),
    ])
}

async fn song_columns(ctx: &AppContext, song_id: i64) -> anyhow::Result<(String, String)> {
    let song = ctx.service.get_song(song_id).await?;
    let artists = ctx.service.song_artist_names(song_id).await?;
    Ok((song.title, artists.join(", ")))
}

//! Song repository: uploads, edits, artist credits and cascading deletion.

use chrono::NaiveDate;

use chorus_core::capture::{Transition, link_removed};
use chorus_core::entities::{Comment, PLAYLIST_SONGS, Rating, SONG_ARTISTS, Song};
use chorus_core::tracked::Snapshot;

use crate::capture::{append_all, capture};
use crate::error::DatabaseError;
use crate::helpers::{format_date, parse_date};
use crate::repos::artists::song_artist_names;
use crate::repos::links::{delete_link, links_to, load_snapshot, sync_links};
use crate::service::CatalogService;
use crate::updates::song::{SongUpdate, SongUpdateBuilder};

const SELECT_COLS: &str = "id, title, year, location, user_id";

fn row_to_song(row: &libsql::Row) -> Result<Song, DatabaseError> {
    Ok(Song {
        id: row.get(0)?,
        title: row.get(1)?,
        year: parse_date(&row.get::<String>(2)?)?,
        location: row.get(3)?,
        user_id: row.get(4)?,
    })
}

pub(crate) async fn fetch_song(conn: &libsql::Connection, id: i64) -> Result<Song, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM songs WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("song", id))?;
    row_to_song(&row)
}

/// A song with its artist names, as listed in exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditedSong {
    pub song: Song,
    pub artists: Vec<String>,
}

impl CatalogService {
    /// Upload a song credited to `artist_ids`, in credit order.
    ///
    /// The song's scalar fields are captured as a creation, then the artist
    /// links as an update from an empty link set.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the owner or an artist does not exist, or
    /// any insert or capture fails. Nothing is written in that case.
    pub async fn create_song(
        &self,
        title: &str,
        year: NaiveDate,
        location: &str,
        owner_id: i64,
        artist_ids: &[i64],
    ) -> Result<Song, DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        tx.execute(
            "INSERT INTO songs (title, year, location, user_id) VALUES (?1, ?2, ?3, ?4)",
            libsql::params![title, format_date(year), location, owner_id],
        )
        .await?;
        let song = Song {
            id: tx.last_insert_rowid(),
            title: title.to_string(),
            year,
            location: location.to_string(),
            user_id: owner_id,
        };
        capture(&tx, now, &Transition::Created(&song)).await?;

        if !artist_ids.is_empty() {
            let before = Snapshot::unlinked(song.clone());
            sync_links(&tx, &SONG_ARTISTS, song.id, artist_ids).await?;
            let after = load_snapshot(&tx, song.clone()).await?;
            capture(
                &tx,
                now,
                &Transition::Updated {
                    before: &before,
                    after: &after,
                },
            )
            .await?;
        }

        tx.commit().await?;
        Ok(song)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such song exists.
    pub async fn get_song(&self, id: i64) -> Result<Song, DatabaseError> {
        fetch_song(&*self.reader().await, id).await
    }

    /// Load a song with its artist links as they are right now.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such song exists.
    pub async fn load_song(&self, id: i64) -> Result<Snapshot<Song>, DatabaseError> {
        let conn = self.reader().await;
        let song = fetch_song(&conn, id).await?;
        load_snapshot(&conn, song).await
    }

    /// Apply an update. Changed scalar fields and artist link changes are
    /// captured against the snapshot loaded at the start of the transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such song exists, or any
    /// storage error from the update or its capture.
    pub async fn update_song(&self, id: i64, update: SongUpdate) -> Result<Song, DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        let before = load_snapshot(&tx, fetch_song(&tx, id).await?).await?;
        let song = update.apply(&before.entity);

        if song != before.entity {
            tx.execute(
                "UPDATE songs SET title = ?1, year = ?2, location = ?3 WHERE id = ?4",
                libsql::params![
                    song.title.as_str(),
                    format_date(song.year),
                    song.location.as_str(),
                    id
                ],
            )
            .await?;
        }
        if let Some(ref artist_ids) = update.artist_ids {
            sync_links(&tx, &SONG_ARTISTS, id, artist_ids).await?;
        }

        let after = load_snapshot(&tx, song.clone()).await?;
        let written = capture(
            &tx,
            now,
            &Transition::Updated {
                before: &before,
                after: &after,
            },
        )
        .await?;
        tx.commit().await?;

        tracing::debug!(song_id = id, written, "updated song");
        Ok(song)
    }

    /// Replace a song's artist credits.
    ///
    /// # Errors
    ///
    /// See [`Self::update_song`].
    pub async fn set_song_artists(&self, id: i64, artist_ids: &[i64]) -> Result<Song, DatabaseError> {
        self.update_song(id, SongUpdateBuilder::new().artist_ids(artist_ids.to_vec()).build())
            .await
    }

    /// Delete a song and everything that references it.
    ///
    /// Playlist links, ratings and comments on the song are captured as
    /// deletions first, then the song itself with its artist links.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such song exists, or any
    /// storage error from the deletes or their capture.
    pub async fn delete_song(&self, id: i64) -> Result<(), DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        let snapshot = load_snapshot(&tx, fetch_song(&tx, id).await?).await?;

        for (row_id, playlist_id) in links_to(&tx, &PLAYLIST_SONGS, id).await? {
            append_all(&tx, now, &[link_removed(&PLAYLIST_SONGS, row_id, playlist_id, id)]).await?;
            delete_link(&tx, &PLAYLIST_SONGS, row_id).await?;
        }

        for rating in ratings_on(&tx, id).await? {
            capture(&tx, now, &Transition::Deleted(&Snapshot::scalar_only(rating.clone()))).await?;
            tx.execute("DELETE FROM ratings WHERE id = ?1", [rating.id])
                .await?;
        }

        for comment in comments_on(&tx, id).await? {
            capture(&tx, now, &Transition::Deleted(&Snapshot::scalar_only(comment.clone()))).await?;
            tx.execute("DELETE FROM comments WHERE id = ?1", [comment.id])
                .await?;
        }

        capture(&tx, now, &Transition::Deleted(&snapshot)).await?;
        tx.execute("DELETE FROM artist_song WHERE song_id = ?1", [id])
            .await?;
        tx.execute("DELETE FROM songs WHERE id = ?1", [id]).await?;

        tx.commit().await?;
        tracing::debug!(song_id = id, "deleted song");
        Ok(())
    }

    /// Songs uploaded by a user, oldest first, with current artist names.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn list_songs_by_owner(
        &self,
        user_id: i64,
    ) -> Result<Vec<CreditedSong>, DatabaseError> {
        let conn = self.reader().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM songs WHERE user_id = ?1 ORDER BY id"),
                [user_id],
            )
            .await?;
        let mut songs = Vec::new();
        while let Some(row) = rows.next().await? {
            songs.push(row_to_song(&row)?);
        }

        let mut out = Vec::with_capacity(songs.len());
        for song in songs {
            let artists = song_artist_names(&conn, song.id).await?;
            out.push(CreditedSong { song, artists });
        }
        Ok(out)
    }
}

async fn ratings_on(conn: &libsql::Connection, song_id: i64) -> Result<Vec<Rating>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, mark, song_id, user_id FROM ratings WHERE song_id = ?1 ORDER BY id",
            [song_id],
        )
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(super::ratings::row_to_rating(&row)?);
    }
    Ok(out)
}

async fn comments_on(
    conn: &libsql::Connection,
    song_id: i64,
) -> Result<Vec<Comment>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, message, song_id, user_id FROM comments WHERE song_id = ?1 ORDER BY id",
            [song_id],
        )
        .await?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(super::comments::row_to_comment(&row)?);
    }
    Ok(out)
}

//! Playlist repository: ownership, renames and song membership.

use chorus_core::capture::Transition;
use chorus_core::entities::{PLAYLIST_SONGS, Playlist};
use chorus_core::tracked::Snapshot;

use crate::capture::capture;
use crate::error::DatabaseError;
use crate::repos::links::{delete_link, insert_link, load_snapshot};
use crate::repos::songs::fetch_song;
use crate::service::CatalogService;

const SELECT_COLS: &str = "id, title, user_id";

fn row_to_playlist(row: &libsql::Row) -> Result<Playlist, DatabaseError> {
    Ok(Playlist {
        id: row.get(0)?,
        title: row.get(1)?,
        user_id: row.get(2)?,
    })
}

async fn fetch_playlist(conn: &libsql::Connection, id: i64) -> Result<Playlist, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM playlists WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("playlist", id))?;
    row_to_playlist(&row)
}

impl CatalogService {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the owner does not exist or the insert or
    /// its capture fails.
    pub async fn create_playlist(&self, owner_id: i64, title: &str) -> Result<Playlist, DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        tx.execute(
            "INSERT INTO playlists (title, user_id) VALUES (?1, ?2)",
            libsql::params![title, owner_id],
        )
        .await?;
        let playlist = Playlist {
            id: tx.last_insert_rowid(),
            title: title.to_string(),
            user_id: owner_id,
        };

        capture(&tx, now, &Transition::Created(&playlist)).await?;
        tx.commit().await?;
        Ok(playlist)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such playlist exists.
    pub async fn get_playlist(&self, id: i64) -> Result<Playlist, DatabaseError> {
        fetch_playlist(&*self.reader().await, id).await
    }

    /// Load a playlist with its song links as they are right now.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such playlist exists.
    pub async fn load_playlist(&self, id: i64) -> Result<Snapshot<Playlist>, DatabaseError> {
        let conn = self.reader().await;
        let playlist = fetch_playlist(&conn, id).await?;
        load_snapshot(&conn, playlist).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such playlist exists, or any
    /// storage error from the update or its capture.
    pub async fn rename_playlist(&self, id: i64, title: &str) -> Result<Playlist, DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        let before = fetch_playlist(&tx, id).await?;
        if before.title == title {
            return Ok(before);
        }
        tx.execute(
            "UPDATE playlists SET title = ?1 WHERE id = ?2",
            libsql::params![title, id],
        )
        .await?;
        let after = Playlist {
            title: title.to_string(),
            ..before.clone()
        };

        capture(
            &tx,
            now,
            &Transition::Updated {
                before: &Snapshot::scalar_only(before),
                after: &Snapshot::scalar_only(after.clone()),
            },
        )
        .await?;
        tx.commit().await?;
        Ok(after)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the playlist or song does not
    /// exist, `DatabaseError::InvalidState` if the song is already on the
    /// playlist.
    pub async fn add_song_to_playlist(
        &self,
        playlist_id: i64,
        song_id: i64,
    ) -> Result<(), DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        let before = load_snapshot(&tx, fetch_playlist(&tx, playlist_id).await?).await?;
        fetch_song(&tx, song_id).await?;
        if before
            .linked(PLAYLIST_SONGS.name)
            .is_some_and(|links| links.contains_key(&song_id))
        {
            return Err(DatabaseError::InvalidState(format!(
                "song {song_id} is already on playlist {playlist_id}"
            )));
        }

        insert_link(&tx, &PLAYLIST_SONGS, playlist_id, song_id).await?;
        let after = load_snapshot(&tx, before.entity.clone()).await?;
        capture(
            &tx,
            now,
            &Transition::Updated {
                before: &before,
                after: &after,
            },
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if the playlist does not exist or
    /// the song is not on it.
    pub async fn remove_song_from_playlist(
        &self,
        playlist_id: i64,
        song_id: i64,
    ) -> Result<(), DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        let before = load_snapshot(&tx, fetch_playlist(&tx, playlist_id).await?).await?;
        let row_id = before
            .linked(PLAYLIST_SONGS.name)
            .and_then(|links| links.get(&song_id).copied())
            .ok_or_else(|| DatabaseError::not_found("playlist_song", format!("{playlist_id}/{song_id}")))?;

        delete_link(&tx, &PLAYLIST_SONGS, row_id).await?;
        let after = load_snapshot(&tx, before.entity.clone()).await?;
        capture(
            &tx,
            now,
            &Transition::Updated {
                before: &before,
                after: &after,
            },
        )
        .await?;
        tx.commit().await?;
        Ok(())
    }

    /// Delete a playlist, capturing the removal of every song still on it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such playlist exists, or any
    /// storage error from the deletes or their capture.
    pub async fn delete_playlist(&self, id: i64) -> Result<(), DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        let snapshot = load_snapshot(&tx, fetch_playlist(&tx, id).await?).await?;
        capture(&tx, now, &Transition::Deleted(&snapshot)).await?;
        tx.execute("DELETE FROM playlist_song WHERE playlist_id = ?1", [id])
            .await?;
        tx.execute("DELETE FROM playlists WHERE id = ?1", [id]).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Playlists owned by a user with their song ids in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a query fails.
    pub async fn list_playlists_by_owner(
        &self,
        user_id: i64,
    ) -> Result<Vec<Snapshot<Playlist>>, DatabaseError> {
        let conn = self.reader().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM playlists WHERE user_id = ?1 ORDER BY id"),
                [user_id],
            )
            .await?;
        let mut playlists = Vec::new();
        while let Some(row) = rows.next().await? {
            playlists.push(row_to_playlist(&row)?);
        }

        let mut out = Vec::with_capacity(playlists.len());
        for playlist in playlists {
            out.push(load_snapshot(&conn, playlist).await?);
        }
        Ok(out)
    }
}

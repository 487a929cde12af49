//! Artist repository.

use chorus_core::capture::Transition;
use chorus_core::entities::Artist;

use crate::capture::capture;
use crate::error::DatabaseError;
use crate::service::CatalogService;

fn row_to_artist(row: &libsql::Row) -> Result<Artist, DatabaseError> {
    Ok(Artist {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}

/// Names of a song's current artists in credit order.
pub(crate) async fn song_artist_names(
    conn: &libsql::Connection,
    song_id: i64,
) -> Result<Vec<String>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT a.name FROM artist_song l
             JOIN artists a ON a.id = l.artist_id
             WHERE l.song_id = ?1
             ORDER BY l.id",
            [song_id],
        )
        .await?;
    let mut names = Vec::new();
    while let Some(row) = rows.next().await? {
        names.push(row.get::<String>(0)?);
    }
    Ok(names)
}

impl CatalogService {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the insert or its capture fails.
    pub async fn create_artist(&self, name: &str) -> Result<Artist, DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        tx.execute("INSERT INTO artists (name) VALUES (?1)", [name])
            .await?;
        let artist = Artist {
            id: tx.last_insert_rowid(),
            name: name.to_string(),
        };

        capture(&tx, now, &Transition::Created(&artist)).await?;
        tx.commit().await?;
        Ok(artist)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such artist exists.
    pub async fn get_artist(&self, id: i64) -> Result<Artist, DatabaseError> {
        let conn = self.reader().await;
        let mut rows = conn
            .query("SELECT id, name FROM artists WHERE id = ?1", [id])
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| DatabaseError::not_found("artist", id))?;
        row_to_artist(&row)
    }

    /// Current artist names of a song in credit order.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn song_artist_names(&self, song_id: i64) -> Result<Vec<String>, DatabaseError> {
        song_artist_names(&*self.reader().await, song_id).await
    }
}

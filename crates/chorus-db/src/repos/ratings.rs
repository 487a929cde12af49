//! Rating repository. A user holds at most one rating per song.

use chorus_core::capture::Transition;
use chorus_core::entities::Rating;
use chorus_core::tracked::Snapshot;

use crate::capture::capture;
use crate::error::DatabaseError;
use crate::service::CatalogService;

const SELECT_COLS: &str = "id, mark, song_id, user_id";

pub(crate) fn row_to_rating(row: &libsql::Row) -> Result<Rating, DatabaseError> {
    let mark = row.get::<i64>(1)?;
    Ok(Rating {
        id: row.get(0)?,
        mark: u8::try_from(mark)
            .map_err(|_| DatabaseError::Query(format!("rating mark {mark} out of range")))?,
        song_id: row.get(2)?,
        user_id: row.get(3)?,
    })
}

async fn fetch_rating(conn: &libsql::Connection, id: i64) -> Result<Rating, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM ratings WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("rating", id))?;
    row_to_rating(&row)
}

async fn find_rating(
    conn: &libsql::Connection,
    user_id: i64,
    song_id: i64,
) -> Result<Option<Rating>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM ratings WHERE user_id = ?1 AND song_id = ?2"),
            [user_id, song_id],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_rating(&row)?)),
        None => Ok(None),
    }
}

impl CatalogService {
    /// Rate a song, or change the user's existing rating of it.
    ///
    /// Re-rating with the same mark writes nothing.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Core` for a mark outside 1..=5, or any storage
    /// error from the write or its capture.
    pub async fn rate_song(
        &self,
        user_id: i64,
        song_id: i64,
        mark: u8,
    ) -> Result<Rating, DatabaseError> {
        let mark = Rating::validate_mark(mark)?;
        let tx = self.begin_write().await?;
        let now = self.now();

        let rating = match find_rating(&tx, user_id, song_id).await? {
            None => {
                tx.execute(
                    "INSERT INTO ratings (mark, song_id, user_id) VALUES (?1, ?2, ?3)",
                    [i64::from(mark), song_id, user_id],
                )
                .await?;
                let rating = Rating {
                    id: tx.last_insert_rowid(),
                    mark,
                    song_id,
                    user_id,
                };
                capture(&tx, now, &Transition::Created(&rating)).await?;
                rating
            }
            Some(existing) if existing.mark == mark => return Ok(existing),
            Some(existing) => {
                tx.execute(
                    "UPDATE ratings SET mark = ?1 WHERE id = ?2",
                    [i64::from(mark), existing.id],
                )
                .await?;
                let rating = Rating {
                    mark,
                    ..existing.clone()
                };
                capture(
                    &tx,
                    now,
                    &Transition::Updated {
                        before: &Snapshot::scalar_only(existing),
                        after: &Snapshot::scalar_only(rating.clone()),
                    },
                )
                .await?;
                rating
            }
        };

        tx.commit().await?;
        Ok(rating)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such rating exists.
    pub async fn get_rating(&self, id: i64) -> Result<Rating, DatabaseError> {
        fetch_rating(&*self.reader().await, id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such rating exists, or any
    /// storage error from the delete or its capture.
    pub async fn delete_rating(&self, id: i64) -> Result<(), DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        let rating = fetch_rating(&tx, id).await?;
        capture(&tx, now, &Transition::Deleted(&Snapshot::scalar_only(rating))).await?;
        tx.execute("DELETE FROM ratings WHERE id = ?1", [id]).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Ratings given by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_ratings_by_user(&self, user_id: i64) -> Result<Vec<Rating>, DatabaseError> {
        let conn = self.reader().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM ratings WHERE user_id = ?1 ORDER BY id"),
                [user_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_rating(&row)?);
        }
        Ok(out)
    }
}

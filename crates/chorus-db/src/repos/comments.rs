//! Comment repository.

use chorus_core::capture::Transition;
use chorus_core::entities::Comment;
use chorus_core::tracked::Snapshot;

use crate::capture::capture;
use crate::error::DatabaseError;
use crate::service::CatalogService;

const SELECT_COLS: &str = "id, message, song_id, user_id";

pub(crate) fn row_to_comment(row: &libsql::Row) -> Result<Comment, DatabaseError> {
    Ok(Comment {
        id: row.get(0)?,
        message: row.get(1)?,
        song_id: row.get(2)?,
        user_id: row.get(3)?,
    })
}

async fn fetch_comment(conn: &libsql::Connection, id: i64) -> Result<Comment, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM comments WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("comment", id))?;
    row_to_comment(&row)
}

impl CatalogService {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the user or song does not exist, or the
    /// insert or its capture fails.
    pub async fn write_comment(
        &self,
        user_id: i64,
        song_id: i64,
        message: &str,
    ) -> Result<Comment, DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        tx.execute(
            "INSERT INTO comments (message, song_id, user_id) VALUES (?1, ?2, ?3)",
            libsql::params![message, song_id, user_id],
        )
        .await?;
        let comment = Comment {
            id: tx.last_insert_rowid(),
            message: message.to_string(),
            song_id,
            user_id,
        };

        capture(&tx, now, &Transition::Created(&comment)).await?;
        tx.commit().await?;
        Ok(comment)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such comment exists, or any
    /// storage error from the update or its capture.
    pub async fn edit_comment(&self, id: i64, message: &str) -> Result<Comment, DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        let before = fetch_comment(&tx, id).await?;
        if before.message == message {
            return Ok(before);
        }
        tx.execute(
            "UPDATE comments SET message = ?1 WHERE id = ?2",
            libsql::params![message, id],
        )
        .await?;
        let after = Comment {
            message: message.to_string(),
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
    /// Returns `DatabaseError::NotFound` if no such comment exists, or any
    /// storage error from the delete or its capture.
    pub async fn delete_comment(&self, id: i64) -> Result<(), DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        let comment = fetch_comment(&tx, id).await?;
        capture(&tx, now, &Transition::Deleted(&Snapshot::scalar_only(comment))).await?;
        tx.execute("DELETE FROM comments WHERE id = ?1", [id]).await?;

        tx.commit().await?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such comment exists.
    pub async fn get_comment(&self, id: i64) -> Result<Comment, DatabaseError> {
        fetch_comment(&*self.reader().await, id).await
    }

    /// Comments written by a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_comments_by_user(&self, user_id: i64) -> Result<Vec<Comment>, DatabaseError> {
        let conn = self.reader().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM comments WHERE user_id = ?1 ORDER BY id"),
                [user_id],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_comment(&row)?);
        }
        Ok(out)
    }
}

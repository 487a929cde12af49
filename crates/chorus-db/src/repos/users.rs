//! User repository.

use chorus_core::capture::Transition;
use chorus_core::entities::User;
use chorus_core::tracked::Snapshot;

use crate::capture::capture;
use crate::error::DatabaseError;
use crate::service::CatalogService;
use crate::updates::user::UserUpdate;

const SELECT_COLS: &str = "id, username, email";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
    })
}

pub(crate) async fn fetch_user(conn: &libsql::Connection, id: i64) -> Result<User, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("user", id))?;
    row_to_user(&row)
}

impl CatalogService {
    /// Register a user. The creation record of `id` marks the signup.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the username is taken or capture fails.
    pub async fn create_user(&self, username: &str, email: &str) -> Result<User, DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        tx.execute(
            "INSERT INTO users (username, email) VALUES (?1, ?2)",
            [username, email],
        )
        .await?;
        let user = User {
            id: tx.last_insert_rowid(),
            username: username.to_string(),
            email: email.to_string(),
        };

        capture(&tx, now, &Transition::Created(&user)).await?;
        tx.commit().await?;
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such user exists.
    pub async fn get_user(&self, id: i64) -> Result<User, DatabaseError> {
        fetch_user(&*self.reader().await, id).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no such user exists, or any
    /// storage error from the update or its capture.
    pub async fn update_user(&self, id: i64, update: UserUpdate) -> Result<User, DatabaseError> {
        let tx = self.begin_write().await?;
        let now = self.now();

        let before = fetch_user(&tx, id).await?;
        let after = update.apply(&before);
        if after == before {
            return Ok(before);
        }

        tx.execute(
            "UPDATE users SET username = ?1, email = ?2 WHERE id = ?3",
            libsql::params![after.username.as_str(), after.email.as_str(), id],
        )
        .await?;

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
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{audit_count, t0, test_service_at};
    use crate::updates::user::UserUpdateBuilder;

    #[tokio::test]
    async fn create_user_captures_every_field() {
        let (svc, _clock) = test_service_at(t0()).await;
        let user = svc.create_user("ana", "ana@example.com").await.unwrap();

        let records = svc
            .query_audit(&AuditFilter {
                table: Some("user".into()),
                record_id: Some(user.id),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        let columns: Vec<&str> = records.iter().map(|r| r.column_name.as_str()).collect();
        assert_eq!(columns, vec!["id", "username", "email"]);
        assert!(records.iter().all(|r| r.old_value.is_none()));
        assert_eq!(svc.get_user(user.id).await.unwrap(), user);
    }

    #[tokio::test]
    async fn update_user_captures_only_changed_fields() {
        let (svc, _clock) = test_service_at(t0()).await;
        let user = svc.create_user("ana", "ana@example.com").await.unwrap();
        let updated = svc
            .update_user(user.id, UserUpdateBuilder::new().email("ana@chorus.fm").build())
            .await
            .unwrap();
        assert_eq!(updated.email, "ana@chorus.fm");
        assert_eq!(audit_count(&svc, Some("user")).await, 4);

        // No-op update writes nothing.
        svc.update_user(user.id, UserUpdateBuilder::new().username("ana").build())
            .await
            .unwrap();
        assert_eq!(audit_count(&svc, Some("user")).await, 4);
    }

    #[tokio::test]
    async fn duplicate_username_rolls_back() {
        let (svc, _clock) = test_service_at(t0()).await;
        svc.create_user("ana", "ana@example.com").await.unwrap();
        assert!(svc.create_user("ana", "other@example.com").await.is_err());
        assert_eq!(audit_count(&svc, None).await, 3);
    }

    #[tokio::test]
    async fn missing_user_is_not_found() {
        let (svc, _clock) = test_service_at(t0()).await;
        assert!(matches!(
            svc.get_user(42).await,
            Err(DatabaseError::NotFound { .. })
        ));
    }
}

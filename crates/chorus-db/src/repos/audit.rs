//! Audit log repository.
//!
//! Append-only field-level records written by change capture, plus dynamic
//! filtering by table, record, column, null polarity, carried value and
//! `created_at` window. Results always come back in insertion order.

use chrono::{DateTime, Utc};

use chorus_core::audit::{AuditRecord, FieldDiff, Mutation, Polarity};
use chorus_core::replay::{ReplayedEntity, replay_entity};
use chorus_core::timeline::TimeWindow;

use crate::error::DatabaseError;
use crate::helpers::{format_datetime, get_opt_string, parse_datetime};
use crate::service::CatalogService;

const SELECT_COLS: &str =
    "id, created_at, table_name, record_id, column_name, old_value, new_value";

/// Filter criteria for audit queries.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub table: Option<String>,
    pub record_id: Option<i64>,
    pub column: Option<String>,
    pub polarity: Option<Polarity>,
    /// Matched against the value the record carries: `new_value` for
    /// creations and updates, `old_value` for deletions.
    pub value: Option<String>,
    pub window: TimeWindow,
    pub limit: Option<u32>,
}

impl AuditFilter {
    /// Records of one column of one audit table.
    #[must_use]
    pub fn column(table: &str, column: &str) -> Self {
        Self {
            table: Some(table.to_string()),
            column: Some(column.to_string()),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn record(mut self, record_id: i64) -> Self {
        self.record_id = Some(record_id);
        self
    }

    #[must_use]
    pub const fn polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = Some(polarity);
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self
    }

    #[must_use]
    pub const fn within(mut self, window: TimeWindow) -> Self {
        self.window = window;
        self
    }
}

pub(crate) fn row_to_audit_record(row: &libsql::Row) -> Result<AuditRecord, DatabaseError> {
    Ok(AuditRecord {
        id: row.get(0)?,
        created_at: parse_datetime(&row.get::<String>(1)?)?,
        table: row.get(2)?,
        record_id: row.get(3)?,
        column_name: row.get(4)?,
        old_value: get_opt_string(row, 5)?,
        new_value: get_opt_string(row, 6)?,
    })
}

/// Append every diff of a mutation, in order, stamped with `at`.
///
/// Pass the open transaction of the host mutation so the audit rows commit
/// or roll back with it. Returns the number of rows written.
///
/// # Errors
///
/// Returns `DatabaseError::Core` for a malformed mutation and
/// `DatabaseError::LibSql` if an INSERT fails.
pub async fn append(
    conn: &libsql::Connection,
    at: DateTime<Utc>,
    mutation: &Mutation,
) -> Result<usize, DatabaseError> {
    mutation.validate()?;
    let created_at = format_datetime(at);

    for diff in &mutation.diffs {
        conn.execute(
            "INSERT INTO audit_records (created_at, table_name, record_id, column_name, old_value, new_value)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            libsql::params![
                created_at.as_str(),
                mutation.table.as_str(),
                mutation.record_id,
                diff.column.as_str(),
                diff.old_value.as_deref(),
                diff.new_value.as_deref()
            ],
        )
        .await?;
    }

    Ok(mutation.diffs.len())
}

/// Query audit records in insertion order.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails or a row cannot be parsed.
pub async fn query(
    conn: &libsql::Connection,
    filter: &AuditFilter,
) -> Result<Vec<AuditRecord>, DatabaseError> {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some(ref table) = filter.table {
        params.push(libsql::Value::Text(table.clone()));
        conditions.push(format!("table_name = ?{}", params.len()));
    }
    if let Some(record_id) = filter.record_id {
        params.push(libsql::Value::Integer(record_id));
        conditions.push(format!("record_id = ?{}", params.len()));
    }
    if let Some(ref column) = filter.column {
        params.push(libsql::Value::Text(column.clone()));
        conditions.push(format!("column_name = ?{}", params.len()));
    }
    match filter.polarity {
        Some(Polarity::Creation) => {
            conditions.push("old_value IS NULL AND new_value IS NOT NULL".to_string());
        }
        Some(Polarity::Update) => {
            conditions.push("old_value IS NOT NULL AND new_value IS NOT NULL".to_string());
        }
        Some(Polarity::Deletion) => {
            conditions.push("old_value IS NOT NULL AND new_value IS NULL".to_string());
        }
        None => {}
    }
    if let Some(ref value) = filter.value {
        params.push(libsql::Value::Text(value.clone()));
        let carried = match filter.polarity {
            Some(Polarity::Creation | Polarity::Update) => "new_value",
            Some(Polarity::Deletion) => "old_value",
            None => "COALESCE(new_value, old_value)",
        };
        conditions.push(format!("{carried} = ?{}", params.len()));
    }
    if let Some(from) = filter.window.from {
        params.push(libsql::Value::Text(format_datetime(from)));
        conditions.push(format!("created_at >= ?{}", params.len()));
    }
    if let Some(to) = filter.window.to {
        params.push(libsql::Value::Text(format_datetime(to)));
        conditions.push(format!("created_at <= ?{}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let limit_clause = filter
        .limit
        .map_or_else(String::new, |limit| format!(" LIMIT {limit}"));

    let sql = format!(
        "SELECT {SELECT_COLS} FROM audit_records {where_clause} ORDER BY id ASC{limit_clause}"
    );

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    let mut records = Vec::new();
    while let Some(row) = rows.next().await? {
        records.push(row_to_audit_record(&row)?);
    }
    Ok(records)
}

impl CatalogService {
    /// Append one mutation in its own transaction.
    ///
    /// This is the entry point for writers outside the catalog repos; catalog
    /// operations write their audit rows inside their own transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if validation or any INSERT fails. Nothing is
    /// written in that case.
    pub async fn record_mutation(
        &self,
        table: &str,
        record_id: i64,
        diffs: Vec<FieldDiff>,
    ) -> Result<usize, DatabaseError> {
        let mutation = Mutation {
            table: table.to_string(),
            record_id,
            diffs,
        };
        let tx = self.begin_write().await?;
        let now = self.now();
        let written = append(&tx, now, &mutation).await?;
        tx.commit().await?;
        tracing::debug!(table, record_id, written, "recorded mutation");
        Ok(written)
    }

    /// Query audit records with optional filters.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditRecord>, DatabaseError> {
        query(&*self.reader().await, filter).await
    }

    /// Fold the audit history of one row back into its field state.
    ///
    /// Returns `None` if the log holds nothing for that row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or the history is malformed.
    pub async fn replay(
        &self,
        table: &str,
        record_id: i64,
    ) -> Result<Option<ReplayedEntity>, DatabaseError> {
        let filter = AuditFilter {
            table: Some(table.to_string()),
            record_id: Some(record_id),
            ..AuditFilter::default()
        };
        let records = self.query_audit(&filter).await?;
        Ok(replay_entity(&records)?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use chorus_core::clock::ManualClock;

    use super::*;
    use crate::test_support::helpers::{t0, test_service_at};

    async fn seed(svc: &CatalogService) {
        svc.record_mutation(
            "song",
            1,
            vec![
                FieldDiff::created("title", "Alpha"),
                FieldDiff::created("user_id", "7"),
            ],
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn append_and_query_in_insertion_order() {
        let (svc, _clock) = test_service_at(t0()).await;
        seed(&svc).await;

        let all = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].id < all[1].id);
        assert_eq!(all[0].column_name, "title");
        assert_eq!(all[0].created_at, t0());
        assert_eq!(all[0].created_at, all[1].created_at);
        assert_eq!(all[1].polarity(), Some(Polarity::Creation));
    }

    /// `title` of song 1 goes Alpha, then Beta, then is deleted.
    async fn title_lifecycle(svc: &CatalogService, clock: &ManualClock) {
        seed(svc).await;
        clock.advance(Duration::seconds(1));
        svc.record_mutation("song", 1, vec![FieldDiff::changed("title", "Alpha", "Beta")])
            .await
            .unwrap();
        clock.advance(Duration::seconds(1));
        svc.record_mutation("song", 1, vec![FieldDiff::deleted("title", "Beta")])
            .await
            .unwrap();
    }

    #[rstest]
    #[case(None, None, 3)]
    #[case(Some(Polarity::Creation), None, 1)]
    #[case(Some(Polarity::Update), None, 1)]
    #[case(Some(Polarity::Deletion), None, 1)]
    #[case(Some(Polarity::Creation), Some("Beta"), 0)]
    #[case(Some(Polarity::Update), Some("Beta"), 1)]
    #[case(Some(Polarity::Update), Some("Alpha"), 0)]
    #[case(Some(Polarity::Deletion), Some("Beta"), 1)]
    // Without a polarity the carried value of any record matches.
    #[case(None, Some("Beta"), 2)]
    #[case(None, Some("Alpha"), 1)]
    #[tokio::test]
    async fn polarity_and_value_filters(
        #[case] polarity: Option<Polarity>,
        #[case] value: Option<&str>,
        #[case] expected: usize,
    ) {
        let (svc, clock) = test_service_at(t0()).await;
        title_lifecycle(&svc, &clock).await;

        let mut filter = AuditFilter::column("song", "title");
        filter.polarity = polarity;
        filter.value = value.map(str::to_string);
        let records = svc.query_audit(&filter).await.unwrap();

        assert_eq!(records.len(), expected);
        if let Some(polarity) = polarity {
            assert!(records.iter().all(|r| r.polarity() == Some(polarity)));
        }
    }

    #[tokio::test]
    async fn window_is_inclusive() {
        let (svc, clock) = test_service_at(t0()).await;
        seed(&svc).await;
        let t1 = clock.advance(Duration::seconds(10));
        svc.record_mutation("song", 1, vec![FieldDiff::changed("title", "Alpha", "Beta")])
            .await
            .unwrap();

        let window = TimeWindow::new(Some(t1), Some(t1)).unwrap();
        let hits = svc
            .query_audit(&AuditFilter::column("song", "title").within(window))
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].created_at, t1);
    }

    #[tokio::test]
    async fn malformed_mutation_writes_nothing() {
        let (svc, _clock) = test_service_at(t0()).await;
        let result = svc
            .record_mutation(
                "song",
                1,
                vec![
                    FieldDiff::created("title", "Alpha"),
                    FieldDiff {
                        column: "year".into(),
                        old_value: None,
                        new_value: None,
                    },
                ],
            )
            .await;
        assert!(matches!(result, Err(DatabaseError::Core(_))));
        assert!(svc.query_audit(&AuditFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn replay_reads_row_history() {
        let (svc, _clock) = test_service_at(t0()).await;
        seed(&svc).await;
        let state = svc.replay("song", 1).await.unwrap().unwrap();
        assert_eq!(state.fields.get("title").map(String::as_str), Some("Alpha"));
        assert!(svc.replay("song", 2).await.unwrap().is_none());
    }
}

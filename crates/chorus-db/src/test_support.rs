//! Shared test utilities for chorus-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::sync::Arc;

    use chrono::{DateTime, NaiveDate, Utc};

    use chorus_core::clock::ManualClock;

    use crate::ChorusDb;
    use crate::service::CatalogService;

    pub fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// In-memory service whose clock starts at `start` and only moves when
    /// the returned handle is advanced.
    pub async fn test_service_at(start: DateTime<Utc>) -> (CatalogService, Arc<ManualClock>) {
        let db = ChorusDb::open_local(":memory:").await.unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let svc = CatalogService::from_db(db).with_clock(clock.clone());
        (svc, clock)
    }

    /// Count audit rows, optionally for one audit table.
    pub async fn audit_count(svc: &CatalogService, table: Option<&str>) -> i64 {
        let conn = svc.reader().await;
        let mut rows = match table {
            Some(t) => conn
                .query("SELECT COUNT(*) FROM audit_records WHERE table_name = ?1", [t])
                .await
                .unwrap(),
            None => conn
                .query("SELECT COUNT(*) FROM audit_records", ())
                .await
                .unwrap(),
        };
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }
}

//! Rebuild one row's field state purely from its audit records.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::audit::{AuditRecord, Polarity};
use crate::errors::CoreError;

/// Explicit lifecycle state of a replayed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Active,
    Deleted,
}

/// Field state of one `(table, record_id)` after folding its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayedEntity {
    pub table: String,
    pub record_id: i64,
    /// Current values. Empty once the row is deleted.
    pub fields: BTreeMap<String, String>,
    /// Last value seen per column, surviving deletion.
    pub last_known: BTreeMap<String, String>,
    pub lifecycle: Lifecycle,
}

/// Fold a row's audit records in insertion order.
///
/// Returns `Ok(None)` for an empty history.
///
/// # Errors
///
/// Returns `CoreError::Validation` if the records span more than one
/// `(table, record_id)` or a record carries neither an old nor a new value.
pub fn replay_entity(records: &[AuditRecord]) -> Result<Option<ReplayedEntity>, CoreError> {
    let Some(first) = records.first() else {
        return Ok(None);
    };

    let mut ordered: Vec<&AuditRecord> = records.iter().collect();
    ordered.sort_by_key(|r| r.id);

    let mut state = ReplayedEntity {
        table: first.table.clone(),
        record_id: first.record_id,
        fields: BTreeMap::new(),
        last_known: BTreeMap::new(),
        lifecycle: Lifecycle::Active,
    };

    for record in ordered {
        if record.table != state.table || record.record_id != state.record_id {
            return Err(CoreError::Validation(format!(
                "record {} belongs to {} {}, not {} {}",
                record.id, record.table, record.record_id, state.table, state.record_id
            )));
        }

        match (record.polarity(), record.carried_value()) {
            (Some(Polarity::Creation | Polarity::Update), Some(value)) => {
                state.fields.insert(record.column_name.clone(), value.to_string());
                state
                    .last_known
                    .insert(record.column_name.clone(), value.to_string());
                state.lifecycle = Lifecycle::Active;
            }
            (Some(Polarity::Deletion), Some(value)) => {
                state.fields.remove(&record.column_name);
                state
                    .last_known
                    .insert(record.column_name.clone(), value.to_string());
                state.lifecycle = Lifecycle::Deleted;
            }
            _ => {
                return Err(CoreError::Validation(format!(
                    "audit record {} has neither an old nor a new value",
                    record.id
                )));
            }
        }
    }

    Ok(Some(state))
}

//! Audit log row shape and the mutation envelope written by change capture.
//!
//! A creation, update or deletion is told apart purely by which of
//! `old_value` / `new_value` is absent (null polarity). No action column is
//! stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::CoreError;

/// One field-level delta persisted to the append-only audit log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditRecord {
    /// Monotonic insertion id. Tie-break for records sharing `created_at`.
    pub id: i64,
    pub created_at: DateTime<Utc>,
    /// Logical entity or association table name, e.g. `song` or `artist_song`.
    pub table: String,
    pub record_id: i64,
    pub column_name: String,
    /// Absent on creation records.
    pub old_value: Option<String>,
    /// Absent on deletion records.
    pub new_value: Option<String>,
}

impl AuditRecord {
    /// Classify the record by null polarity.
    ///
    /// Returns `None` for a malformed row where both values are absent.
    #[must_use]
    pub const fn polarity(&self) -> Option<Polarity> {
        Polarity::of(self.old_value.is_some(), self.new_value.is_some())
    }

    /// The value this record carries: the new value, or for a deletion the
    /// last known value.
    #[must_use]
    pub fn carried_value(&self) -> Option<&str> {
        self.new_value.as_deref().or(self.old_value.as_deref())
    }
}

/// Which lifecycle transition an audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// `old_value` absent.
    Creation,
    /// Both values present.
    Update,
    /// `new_value` absent.
    Deletion,
}

impl Polarity {
    #[must_use]
    pub const fn of(has_old: bool, has_new: bool) -> Option<Self> {
        match (has_old, has_new) {
            (false, true) => Some(Self::Creation),
            (true, true) => Some(Self::Update),
            (true, false) => Some(Self::Deletion),
            (false, false) => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creation => "creation",
            Self::Update => "update",
            Self::Deletion => "deletion",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single column change: `(column_name, old_value?, new_value?)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDiff {
    pub column: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl FieldDiff {
    #[must_use]
    pub fn created(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            old_value: None,
            new_value: Some(value.into()),
        }
    }

    #[must_use]
    pub fn changed(
        column: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            old_value: Some(old_value.into()),
            new_value: Some(new_value.into()),
        }
    }

    #[must_use]
    pub fn deleted(column: impl Into<String>, last_value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            old_value: Some(last_value.into()),
            new_value: None,
        }
    }

    #[must_use]
    pub const fn polarity(&self) -> Option<Polarity> {
        Polarity::of(self.old_value.is_some(), self.new_value.is_some())
    }
}

/// All field diffs of one row produced by one lifecycle transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Mutation {
    pub table: String,
    pub record_id: i64,
    pub diffs: Vec<FieldDiff>,
}

impl Mutation {
    /// Check the envelope before it is written.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for an empty table or column name, or a
    /// diff with neither an old nor a new value.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.table.trim().is_empty() {
            return Err(CoreError::Validation(
                "mutation table name is empty".to_string(),
            ));
        }
        for diff in &self.diffs {
            if diff.column.trim().is_empty() {
                return Err(CoreError::Validation(format!(
                    "empty column name in mutation of {} {}",
                    self.table, self.record_id
                )));
            }
            if diff.polarity().is_none() {
                return Err(CoreError::Validation(format!(
                    "{}.{} on record {} has neither an old nor a new value",
                    self.table, diff.column, self.record_id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(false, true, Some(Polarity::Creation))]
    #[case(true, true, Some(Polarity::Update))]
    #[case(true, false, Some(Polarity::Deletion))]
    #[case(false, false, None)]
    fn polarity_from_presence(
        #[case] has_old: bool,
        #[case] has_new: bool,
        #[case] expected: Option<Polarity>,
    ) {
        assert_eq!(Polarity::of(has_old, has_new), expected);
    }

    #[test]
    fn deletion_carries_last_known_value() {
        let record = AuditRecord {
            id: 7,
            created_at: Utc::now(),
            table: "song".into(),
            record_id: 3,
            column_name: "title".into(),
            old_value: Some("Alpha".into()),
            new_value: None,
        };
        assert_eq!(record.polarity(), Some(Polarity::Deletion));
        assert_eq!(record.carried_value(), Some("Alpha"));
    }

    #[test]
    fn validate_rejects_valueless_diff() {
        let mutation = Mutation {
            table: "song".into(),
            record_id: 1,
            diffs: vec![FieldDiff {
                column: "title".into(),
                old_value: None,
                new_value: None,
            }],
        };
        assert!(matches!(mutation.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn validate_rejects_blank_table() {
        let mutation = Mutation {
            table: "  ".into(),
            record_id: 1,
            diffs: vec![FieldDiff::created("title", "Alpha")],
        };
        assert!(mutation.validate().is_err());
    }
}

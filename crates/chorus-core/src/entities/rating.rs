use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::tracked::{Field, Tracked};

/// Allowed rating marks.
pub const MARK_RANGE: RangeInclusive<u8> = 1..=5;

/// A user's mark for a song. At most one per `(song_id, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rating {
    pub id: i64,
    pub mark: u8,
    pub song_id: i64,
    pub user_id: i64,
}

impl Rating {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if `mark` is outside `MARK_RANGE`.
    pub fn validate_mark(mark: u8) -> Result<u8, CoreError> {
        if MARK_RANGE.contains(&mark) {
            Ok(mark)
        } else {
            Err(CoreError::Validation(format!(
                "rating mark {mark} is outside {}..={}",
                MARK_RANGE.start(),
                MARK_RANGE.end()
            )))
        }
    }
}

impl Tracked for Rating {
    const TABLE: &'static str = "rating";
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            column: "id",
            read: |r| r.id.to_string(),
        },
        Field {
            column: "mark",
            read: |r| r.mark.to_string(),
        },
        Field {
            column: "song_id",
            read: |r| r.song_id.to_string(),
        },
        Field {
            column: "user_id",
            read: |r| r.user_id.to_string(),
        },
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

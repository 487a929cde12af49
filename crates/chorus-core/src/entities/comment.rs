use serde::{Deserialize, Serialize};

use crate::tracked::{Field, Tracked};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Comment {
    pub id: i64,
    pub message: String,
    pub song_id: i64,
    pub user_id: i64,
}

impl Tracked for Comment {
    const TABLE: &'static str = "comment";
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            column: "id",
            read: |c| c.id.to_string(),
        },
        Field {
            column: "message",
            read: |c| c.message.clone(),
        },
        Field {
            column: "song_id",
            read: |c| c.song_id.to_string(),
        },
        Field {
            column: "user_id",
            read: |c| c.user_id.to_string(),
        },
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

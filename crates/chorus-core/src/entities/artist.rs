use serde::{Deserialize, Serialize};

use crate::tracked::{Field, Tracked};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Artist {
    pub id: i64,
    pub name: String,
}

impl Tracked for Artist {
    const TABLE: &'static str = "artist";
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            column: "id",
            read: |a| a.id.to_string(),
        },
        Field {
            column: "name",
            read: |a| a.name.clone(),
        },
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

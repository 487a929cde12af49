use serde::{Deserialize, Serialize};

use crate::tracked::{Field, Tracked};

/// A registered account. `id` is the identity key whose creation record marks
/// the signup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl Tracked for User {
    const TABLE: &'static str = "user";
    const FIELDS: &'static [Field<Self>] = &[
        Field {
            column: "id",
            read: |u| u.id.to_string(),
        },
        Field {
            column: "username",
            read: |u| u.username.clone(),
        },
        Field {
            column: "email",
            read: |u| u.email.clone(),
        },
    ];

    fn id(&self) -> i64 {
        self.id
    }
}

//! User update builder.

use serde::Serialize;

use chorus_core::entities::User;

#[derive(Debug, Clone, Default, Serialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserUpdate {
    /// Apply the set fields on top of `user`.
    #[must_use]
    pub fn apply(&self, user: &User) -> User {
        User {
            id: user.id,
            username: self.username.clone().unwrap_or_else(|| user.username.clone()),
            email: self.email.clone().unwrap_or_else(|| user.email.clone()),
        }
    }
}

pub struct UserUpdateBuilder(UserUpdate);

impl UserUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(UserUpdate::default())
    }

    #[must_use]
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.0.username = Some(username.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.0.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn build(self) -> UserUpdate {
        self.0
    }
}

impl Default for UserUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::activity::RelatedActivity;

/// Row of the `users` table. Never serialized directly since it carries the password hash.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub chat_id: Option<String>,
    pub password: String,
    pub nick: Option<String>,
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub chat_id: Option<String>,
    pub password: String,
    pub nick: Option<String>,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub username: Option<String>,
    pub chat_id: Option<String>,
    pub password: Option<String>,
    pub nick: Option<String>,
}

impl UserPatch {
    /// Merge into `user`. `password` must already be hashed by the caller.
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(chat_id) = self.chat_id {
            user.chat_id = Some(chat_id);
        }
        if let Some(password) = self.password {
            user.password = password;
        }
        if let Some(nick) = self.nick {
            user.nick = Some(nick);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct UserView {
    pub id: i32,
    pub name: String,
    pub username: String,
    pub chat_id: Option<String>,
    pub nick: Option<String>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            username: user.username.clone(),
            chat_id: user.chat_id.clone(),
            nick: user.nick.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserFull {
    #[serde(flatten)]
    pub user: UserView,
    pub activities: Vec<RelatedActivity>,
    pub friends: Vec<UserView>,
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Entry {
    pub id: i32,
    pub activity_id: i32,
    pub amount: i32,
    pub description: String,
    pub date_added: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEntry {
    pub activity_id: i32,
    pub amount: i32,
    #[serde(default)]
    pub description: String,
    pub date_added: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryPatch {
    pub activity_id: Option<i32>,
    pub amount: Option<i32>,
    pub description: Option<String>,
    pub date_added: Option<String>,
}

impl EntryPatch {
    pub fn apply(self, entry: &mut Entry) {
        if let Some(activity_id) = self.activity_id {
            entry.activity_id = activity_id;
        }
        if let Some(amount) = self.amount {
            entry.amount = amount;
        }
        if let Some(description) = self.description {
            entry.description = description;
        }
        if let Some(date_added) = self.date_added {
            entry.date_added = date_added;
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EntryView {
    pub id: i32,
    pub activity_id: i32,
    pub amount: i32,
    pub description: String,
    pub date_added: String,
}

impl From<&Entry> for EntryView {
    fn from(entry: &Entry) -> Self {
        Self {
            id: entry.id,
            activity_id: entry.activity_id,
            amount: entry.amount,
            description: entry.description.clone(),
            date_added: entry.date_added.clone(),
        }
    }
}

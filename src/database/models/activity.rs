use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Activity {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub notification_text: String,
    pub status: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_status() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewActivity {
    pub name: String,
    #[serde(default)]
    pub notification_text: String,
    #[serde(default = "default_status")]
    pub status: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityPatch {
    pub name: Option<String>,
    pub notification_text: Option<String>,
    pub status: Option<bool>,
}

impl ActivityPatch {
    pub fn apply(self, activity: &mut Activity) {
        if let Some(name) = self.name {
            activity.name = name;
        }
        if let Some(text) = self.notification_text {
            activity.notification_text = text;
        }
        if let Some(status) = self.status {
            activity.status = status;
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ActivityView {
    pub id: i32,
    pub name: String,
    pub user_id: i32,
    pub notification_text: String,
    pub status: bool,
}

impl From<&Activity> for ActivityView {
    fn from(activity: &Activity) -> Self {
        Self {
            id: activity.id,
            name: activity.name.clone(),
            user_id: activity.user_id,
            notification_text: activity.notification_text.clone(),
            status: activity.status,
        }
    }
}

/// `{id, name}` pair used for related activities and profile listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct RelatedActivity {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityFull {
    #[serde(flatten)]
    pub activity: ActivityView,
    pub related_activities: Vec<RelatedActivity>,
}

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subreddit {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub rules: JsonValue,
    pub banner_image_url: Option<String>,
    pub icon_image_url: Option<String>,
    pub is_nsfw: bool,
    pub is_private: bool,
    pub created_by: Uuid,
    pub members_count: i32,
    pub active_users: i32,
    pub flairs: JsonValue,
    pub rules_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSubreddit {
    pub name: String,
    pub display_name: String,
    pub description: Option<String>,
    pub rules: JsonValue,
    pub is_nsfw: bool,
    pub is_private: bool,
    pub created_by: Uuid,
}

/// Full replacement of the creator-editable columns.
#[derive(Debug, Clone)]
pub struct SubredditChanges {
    pub display_name: String,
    pub description: Option<String>,
    pub rules: JsonValue,
    pub banner_image_url: Option<String>,
    pub icon_image_url: Option<String>,
    pub is_nsfw: bool,
    pub is_private: bool,
    pub flairs: JsonValue,
    pub rules_updated_at: Option<DateTime<Utc>>,
}

/// JSONB list columns default to an empty array.
pub fn json_list_or_empty(value: Option<JsonValue>) -> JsonValue {
    match value {
        None | Some(JsonValue::Null) => JsonValue::Array(Vec::new()),
        Some(v) => v,
    }
}

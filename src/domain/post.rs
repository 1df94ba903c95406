use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Text,
    Link,
    Image,
}

impl PostType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostType::Text => "text",
            PostType::Link => "link",
            PostType::Image => "image",
        }
    }
}

impl fmt::Display for PostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub post_type: String,
    pub link_url: Option<String>,
    pub image_url: Option<String>,
    pub author_id: Uuid,
    pub subreddit_id: Uuid,
    pub upvotes: i32,
    pub downvotes: i32,
    pub score: i32,
    pub comment_count: i32,
    pub is_locked: bool,
    pub is_nsfw: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: Option<String>,
    pub post_type: PostType,
    pub link_url: Option<String>,
    pub image_url: Option<String>,
    pub author_id: Uuid,
    pub subreddit_id: Uuid,
    pub is_locked: bool,
    pub is_nsfw: bool,
}

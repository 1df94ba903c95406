use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::ResetToken;

/// Account row. Credential and reset columns never leave the process.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expires: Option<DateTime<Utc>>,
}

impl User {
    /// The pending reset token, if one was issued and not yet consumed.
    pub fn pending_reset_token(&self) -> Option<ResetToken> {
        match (&self.reset_token, self.reset_token_expires) {
            (Some(token), Some(expires_at)) => Some(ResetToken {
                token: token.clone(),
                expires_at,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

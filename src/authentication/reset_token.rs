use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::{distributions::Alphanumeric, Rng};
use uuid::Uuid;

use crate::domain::{ResetToken, User};
use crate::repository::{Repository, RepositoryError};

pub const RESET_TOKEN_LENGTH: usize = 64;
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Opaque reset secret drawn from the thread-local CSPRNG.
pub fn generate_reset_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RESET_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Single-use reset tokens stored on the owning user's row.
///
/// At most one token is live per user: issuing overwrites. Expired tokens
/// are left in place until the next issue or a successful reset.
#[derive(Clone)]
pub struct ResetTokenManager {
    repository: Arc<dyn Repository>,
    ttl: Duration,
}

impl ResetTokenManager {
    pub fn new(repository: Arc<dyn Repository>) -> Self {
        Self {
            repository,
            ttl: Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        }
    }

    #[tracing::instrument(name = "Issue reset token", skip(self))]
    pub async fn issue_for(&self, user_id: Uuid) -> Result<ResetToken, RepositoryError> {
        let reset_token = ResetToken {
            token: generate_reset_token(),
            expires_at: Utc::now() + self.ttl,
        };
        self.repository
            .save_reset_token(user_id, &reset_token.token, reset_token.expires_at)
            .await?;
        Ok(reset_token)
    }

    /// The caller is responsible for rejecting expired tokens.
    pub async fn resolve(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        if token.is_empty() {
            return Ok(None);
        }
        self.repository.find_user_by_reset_token(token).await
    }

    #[tracing::instrument(name = "Consume reset token", skip(self))]
    pub async fn consume(&self, user_id: Uuid) -> Result<(), RepositoryError> {
        self.repository.clear_reset_token(user_id).await
    }
}

//! Persistence seam.
//!
//! Every operation maps to a single parameterized statement in the
//! PostgreSQL implementation. Lookups return `Ok(None)` for missing rows;
//! only infrastructure failures and unique-constraint violations are errors.

mod postgres;

pub use postgres::PgRepository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{NewPost, NewSubreddit, NewUser, Page, Post, Subreddit, SubredditChanges, User};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A unique constraint rejected the write. Carries the constraint name when known.
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait Repository: Send + Sync {
    // users

    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), RepositoryError>;

    /// Overwrites whatever reset token the user had.
    async fn save_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Does not filter on expiry.
    async fn find_user_by_reset_token(&self, token: &str) -> Result<Option<User>, RepositoryError>;

    async fn clear_reset_token(&self, id: Uuid) -> Result<(), RepositoryError>;

    // subreddits

    async fn insert_subreddit(&self, subreddit: NewSubreddit) -> Result<Subreddit, RepositoryError>;

    async fn find_subreddit_by_id(&self, id: Uuid) -> Result<Option<Subreddit>, RepositoryError>;

    async fn find_subreddit_by_name(&self, name: &str) -> Result<Option<Subreddit>, RepositoryError>;

    async fn find_subreddit_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<Subreddit>, RepositoryError>;

    /// Ordered by member count, largest first.
    async fn list_subreddits(&self, page: Page) -> Result<Vec<Subreddit>, RepositoryError>;

    async fn update_subreddit(
        &self,
        id: Uuid,
        changes: SubredditChanges,
    ) -> Result<Option<Subreddit>, RepositoryError>;

    /// Returns whether a row was removed.
    async fn delete_subreddit(&self, id: Uuid) -> Result<bool, RepositoryError>;

    // posts

    async fn insert_post(&self, post: NewPost) -> Result<Post, RepositoryError>;

    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, RepositoryError>;

    /// Ordered by score, highest first.
    async fn list_posts(
        &self,
        subreddit_id: Option<Uuid>,
        page: Page,
    ) -> Result<Vec<Post>, RepositoryError>;

    async fn delete_post(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

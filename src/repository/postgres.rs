use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{Repository, RepositoryError};
use crate::domain::{NewPost, NewSubreddit, NewUser, Page, Post, Subreddit, SubredditChanges, User};

const USER_COLUMNS: &str = "id, username, email, password_hash, avatar_url, bio, \
     created_at, updated_at, reset_token, reset_token_expires";

const SUBREDDIT_COLUMNS: &str = "id, name, display_name, description, rules, \
     banner_image_url, icon_image_url, is_nsfw, is_private, created_by, \
     members_count, active_users, flairs, rules_updated_at, created_at, updated_at";

const POST_COLUMNS: &str = "id, title, content, post_type, link_url, image_url, \
     author_id, subreddit_id, upvotes, downvotes, score, comment_count, \
     is_locked, is_nsfw, created_at, updated_at";

pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(
                db_err.constraint().unwrap_or("unique").to_string(),
            );
        }
    }
    RepositoryError::Database(e)
}

#[async_trait]
impl Repository for PgRepository {
    #[tracing::instrument(name = "Insert user", skip(self, user), fields(username = %user.username))]
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let query = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    #[tracing::instrument(name = "Update password hash", skip(self, password_hash))]
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    #[tracing::instrument(name = "Store reset token", skip(self, token))]
    async fn save_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET reset_token = $1, reset_token_expires = $2 WHERE id = $3")
            .bind(token)
            .bind(expires_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(())
    }

    async fn find_user_by_reset_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE reset_token = $1");
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?)
    }

    #[tracing::instrument(name = "Clear reset token", skip(self))]
    async fn clear_reset_token(&self, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE users SET reset_token = NULL, reset_token_expires = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[tracing::instrument(name = "Insert subreddit", skip(self, subreddit), fields(name = %subreddit.name))]
    async fn insert_subreddit(&self, subreddit: NewSubreddit) -> Result<Subreddit, RepositoryError> {
        let query = format!(
            "INSERT INTO subreddits (name, display_name, description, rules, is_nsfw, \
             is_private, created_by, members_count, active_users, flairs) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 1, 0, '[]'::jsonb) \
             RETURNING {SUBREDDIT_COLUMNS}"
        );
        sqlx::query_as::<_, Subreddit>(&query)
            .bind(&subreddit.name)
            .bind(&subreddit.display_name)
            .bind(&subreddit.description)
            .bind(&subreddit.rules)
            .bind(subreddit.is_nsfw)
            .bind(subreddit.is_private)
            .bind(subreddit.created_by)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn find_subreddit_by_id(&self, id: Uuid) -> Result<Option<Subreddit>, RepositoryError> {
        let query = format!("SELECT {SUBREDDIT_COLUMNS} FROM subreddits WHERE id = $1");
        Ok(sqlx::query_as::<_, Subreddit>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_subreddit_by_name(&self, name: &str) -> Result<Option<Subreddit>, RepositoryError> {
        let query = format!("SELECT {SUBREDDIT_COLUMNS} FROM subreddits WHERE name = $1");
        Ok(sqlx::query_as::<_, Subreddit>(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_subreddit_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<Subreddit>, RepositoryError> {
        let query = format!("SELECT {SUBREDDIT_COLUMNS} FROM subreddits WHERE display_name = $1");
        Ok(sqlx::query_as::<_, Subreddit>(&query)
            .bind(display_name)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_subreddits(&self, page: Page) -> Result<Vec<Subreddit>, RepositoryError> {
        let query = format!(
            "SELECT {SUBREDDIT_COLUMNS} FROM subreddits \
             ORDER BY members_count DESC, created_at ASC LIMIT $1 OFFSET $2"
        );
        Ok(sqlx::query_as::<_, Subreddit>(&query)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    #[tracing::instrument(name = "Update subreddit", skip(self, changes))]
    async fn update_subreddit(
        &self,
        id: Uuid,
        changes: SubredditChanges,
    ) -> Result<Option<Subreddit>, RepositoryError> {
        let query = format!(
            "UPDATE subreddits SET display_name = $1, description = $2, rules = $3, \
             banner_image_url = $4, icon_image_url = $5, is_nsfw = $6, is_private = $7, \
             flairs = $8, rules_updated_at = $9, updated_at = CURRENT_TIMESTAMP \
             WHERE id = $10 RETURNING {SUBREDDIT_COLUMNS}"
        );
        sqlx::query_as::<_, Subreddit>(&query)
            .bind(&changes.display_name)
            .bind(&changes.description)
            .bind(&changes.rules)
            .bind(&changes.banner_image_url)
            .bind(&changes.icon_image_url)
            .bind(changes.is_nsfw)
            .bind(changes.is_private)
            .bind(&changes.flairs)
            .bind(changes.rules_updated_at)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    #[tracing::instrument(name = "Delete subreddit", skip(self))]
    async fn delete_subreddit(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM subreddits WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[tracing::instrument(name = "Insert post", skip(self, post), fields(subreddit_id = %post.subreddit_id))]
    async fn insert_post(&self, post: NewPost) -> Result<Post, RepositoryError> {
        let query = format!(
            "INSERT INTO posts (title, content, post_type, link_url, image_url, \
             author_id, subreddit_id, is_locked, is_nsfw) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {POST_COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(&post.title)
            .bind(&post.content)
            .bind(post.post_type.as_str())
            .bind(&post.link_url)
            .bind(&post.image_url)
            .bind(post.author_id)
            .bind(post.subreddit_id)
            .bind(post.is_locked)
            .bind(post.is_nsfw)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, RepositoryError> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        Ok(sqlx::query_as::<_, Post>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_posts(
        &self,
        subreddit_id: Option<Uuid>,
        page: Page,
    ) -> Result<Vec<Post>, RepositoryError> {
        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE ($1::uuid IS NULL OR subreddit_id = $1) \
             ORDER BY score DESC, created_at DESC LIMIT $2 OFFSET $3"
        );
        Ok(sqlx::query_as::<_, Post>(&query)
            .bind(subreddit_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?)
    }

    #[tracing::instrument(name = "Delete post", skip(self))]
    async fn delete_post(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

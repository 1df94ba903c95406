//! Shared fixtures for the HTTP integration tests: an in-memory repository,
//! an e-mail sender that records instead of sending, and request builders.

#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use actix_web::test::TestRequest;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use social_api::authentication::{CredentialHasher, JwtSigner, TOKEN_HEADER};
use social_api::configuration::PasswordHashingSettings;
use social_api::domain::{
    NewPost, NewSubreddit, NewUser, Page, Post, Subreddit, SubredditChanges, User,
};
use social_api::email_client::{EmailError, EmailSender};
use social_api::repository::{Repository, RepositoryError};
use social_api::startup::AppState;

pub const FRONTEND_URL: &str = "http://frontend.test";
pub const JWT_SECRET: &[u8] = b"integration-test-secret";

#[derive(Default)]
pub struct InMemoryRepository {
    users: Mutex<Vec<User>>,
    subreddits: Mutex<Vec<Subreddit>>,
    posts: Mutex<Vec<Post>>,
    fail_password_updates: AtomicBool,
}

impl InMemoryRepository {
    /// While set, `update_password` fails like a lost connection.
    pub fn fail_password_updates(&self, fail: bool) {
        self.fail_password_updates.store(fail, Ordering::SeqCst);
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
    }

    /// Moves the pending reset token of `email` into the past.
    pub fn expire_reset_token(&self, email: &str) {
        let mut users = self.users.lock().unwrap();
        let user = users.iter_mut().find(|u| u.email == email).unwrap();
        user.reset_token_expires = Some(Utc::now() - Duration::minutes(1));
    }

    pub fn set_post_score(&self, id: Uuid, score: i32) {
        let mut posts = self.posts.lock().unwrap();
        let post = posts.iter_mut().find(|p| p.id == id).unwrap();
        post.score = score;
    }
}

fn paginate<T: Clone>(items: Vec<T>, page: Page) -> Vec<T> {
    items
        .into_iter()
        .skip(page.offset as usize)
        .take(page.limit as usize)
        .collect()
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("users_email_key".into()));
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(RepositoryError::Conflict("users_username_key".into()));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            avatar_url: None,
            bio: None,
            created_at: now,
            updated_at: now,
            reset_token: None,
            reset_token_expires: None,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self.user_by_email(email))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), RepositoryError> {
        if self.fail_password_updates.load(Ordering::SeqCst) {
            return Err(RepositoryError::Database(sqlx::Error::PoolTimedOut));
        }
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn save_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.reset_token = Some(token.to_string());
            user.reset_token_expires = Some(expires_at);
        }
        Ok(())
    }

    async fn find_user_by_reset_token(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.reset_token.as_deref() == Some(token))
            .cloned())
    }

    async fn clear_reset_token(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == id) {
            user.reset_token = None;
            user.reset_token_expires = None;
        }
        Ok(())
    }

    async fn insert_subreddit(&self, subreddit: NewSubreddit) -> Result<Subreddit, RepositoryError> {
        let mut subreddits = self.subreddits.lock().unwrap();
        if subreddits
            .iter()
            .any(|s| s.name == subreddit.name || s.display_name == subreddit.display_name)
        {
            return Err(RepositoryError::Conflict("subreddits_name_key".into()));
        }
        let now = Utc::now();
        let subreddit = Subreddit {
            id: Uuid::new_v4(),
            name: subreddit.name,
            display_name: subreddit.display_name,
            description: subreddit.description,
            rules: subreddit.rules,
            banner_image_url: None,
            icon_image_url: None,
            is_nsfw: subreddit.is_nsfw,
            is_private: subreddit.is_private,
            created_by: subreddit.created_by,
            members_count: 1,
            active_users: 0,
            flairs: json!([]),
            rules_updated_at: None,
            created_at: now,
            updated_at: now,
        };
        subreddits.push(subreddit.clone());
        Ok(subreddit)
    }

    async fn find_subreddit_by_id(&self, id: Uuid) -> Result<Option<Subreddit>, RepositoryError> {
        Ok(self
            .subreddits
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn find_subreddit_by_name(&self, name: &str) -> Result<Option<Subreddit>, RepositoryError> {
        Ok(self
            .subreddits
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.name == name)
            .cloned())
    }

    async fn find_subreddit_by_display_name(
        &self,
        display_name: &str,
    ) -> Result<Option<Subreddit>, RepositoryError> {
        Ok(self
            .subreddits
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.display_name == display_name)
            .cloned())
    }

    async fn list_subreddits(&self, page: Page) -> Result<Vec<Subreddit>, RepositoryError> {
        let mut subreddits = self.subreddits.lock().unwrap().clone();
        subreddits.sort_by(|a, b| {
            b.members_count
                .cmp(&a.members_count)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(paginate(subreddits, page))
    }

    async fn update_subreddit(
        &self,
        id: Uuid,
        changes: SubredditChanges,
    ) -> Result<Option<Subreddit>, RepositoryError> {
        let mut subreddits = self.subreddits.lock().unwrap();
        let Some(subreddit) = subreddits.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        subreddit.display_name = changes.display_name;
        subreddit.description = changes.description;
        subreddit.rules = changes.rules;
        subreddit.banner_image_url = changes.banner_image_url;
        subreddit.icon_image_url = changes.icon_image_url;
        subreddit.is_nsfw = changes.is_nsfw;
        subreddit.is_private = changes.is_private;
        subreddit.flairs = changes.flairs;
        subreddit.rules_updated_at = changes.rules_updated_at;
        subreddit.updated_at = Utc::now();
        Ok(Some(subreddit.clone()))
    }

    async fn delete_subreddit(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut subreddits = self.subreddits.lock().unwrap();
        let before = subreddits.len();
        subreddits.retain(|s| s.id != id);
        let removed = subreddits.len() != before;
        if removed {
            self.posts.lock().unwrap().retain(|p| p.subreddit_id != id);
        }
        Ok(removed)
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, RepositoryError> {
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: post.title,
            content: post.content,
            post_type: post.post_type.to_string(),
            link_url: post.link_url,
            image_url: post.image_url,
            author_id: post.author_id,
            subreddit_id: post.subreddit_id,
            upvotes: 0,
            downvotes: 0,
            score: 0,
            comment_count: 0,
            is_locked: post.is_locked,
            is_nsfw: post.is_nsfw,
            created_at: now,
            updated_at: now,
        };
        self.posts.lock().unwrap().push(post.clone());
        Ok(post)
    }

    async fn find_post_by_id(&self, id: Uuid) -> Result<Option<Post>, RepositoryError> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn list_posts(
        &self,
        subreddit_id: Option<Uuid>,
        page: Page,
    ) -> Result<Vec<Post>, RepositoryError> {
        let mut posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| subreddit_id.map_or(true, |id| p.subreddit_id == id))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.score.cmp(&a.score).then(b.created_at.cmp(&a.created_at)));
        Ok(paginate(posts, page))
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        Ok(posts.len() != before)
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Default)]
pub struct RecordingEmailSender {
    sent: Mutex<Vec<SentEmail>>,
    fail_deliveries: AtomicBool,
}

impl RecordingEmailSender {
    /// While set, every send fails and nothing is recorded.
    pub fn fail_deliveries(&self, fail: bool) {
        self.fail_deliveries.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailSender for RecordingEmailSender {
    async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        if self.fail_deliveries.load(Ordering::SeqCst) {
            let rejected = "undeliverable".parse::<lettre::Address>().unwrap_err();
            return Err(EmailError::Address(rejected));
        }
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub state: AppState,
    pub repository: Arc<InMemoryRepository>,
    pub email_client: Arc<RecordingEmailSender>,
    pub signer: Arc<JwtSigner>,
}

/// Argon2 with minimal cost so tests stay fast.
pub fn fast_hasher() -> CredentialHasher {
    CredentialHasher::new(&PasswordHashingSettings {
        memory_cost: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("Failed to build hasher")
}

pub fn spawn_app() -> TestApp {
    let repository = Arc::new(InMemoryRepository::default());
    let email_client = Arc::new(RecordingEmailSender::default());
    let signer = Arc::new(JwtSigner::new(JWT_SECRET));

    let state = AppState::new(
        repository.clone(),
        email_client.clone(),
        fast_hasher(),
        signer.clone(),
        FRONTEND_URL.to_string(),
    );

    TestApp {
        state,
        repository,
        email_client,
        signer,
    }
}

pub fn register_request(email: &str, username: &str, password: &str) -> TestRequest {
    TestRequest::post().uri("/auth/register").set_json(json!({
        "email": email,
        "username": username,
        "password": password,
    }))
}

pub fn login_request(email: &str, password: &str) -> TestRequest {
    TestRequest::post().uri("/auth/login").set_json(json!({
        "email": email,
        "password": password,
    }))
}

pub fn forgot_password_request(email: &str) -> TestRequest {
    TestRequest::post()
        .uri("/auth/forgot-password")
        .set_json(json!({ "email": email }))
}

pub fn reset_password_request(token: &str, password: &str) -> TestRequest {
    TestRequest::post().uri("/auth/reset-password").set_json(json!({
        "token": token,
        "password": password,
    }))
}

/// Attaches a session token the way clients send it.
pub fn with_token(request: TestRequest, token: &str) -> TestRequest {
    request.insert_header((TOKEN_HEADER, format!("Bearer {token}")))
}

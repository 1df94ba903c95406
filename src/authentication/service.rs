use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use super::{CredentialHasher, JwtSigner, ResetTokenManager};
use crate::domain::{NewUser, User};
use crate::email_client::{password_reset_body, password_reset_link, EmailSender};
use crate::repository::{Repository, RepositoryError};
use crate::utils::{is_valid_email, validate_length, validate_password};

/// Verified against when the e-mail is unknown so both login failures cost the same.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=15000,t=2,p=1$\
     gZiV/M1gPc22ElAH/Jh1Hw$CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

pub const MAX_USERNAME_LENGTH: usize = 50;

/// Addresses are stored and looked up lowercased.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Username or email is already taken")]
    AccountTaken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Old password does not match")]
    IncorrectOldPassword,

    #[error("User not found")]
    UserNotFound,

    #[error("Reset token is invalid")]
    ResetTokenInvalid,

    #[error("Reset token has expired")]
    ResetTokenExpired,

    #[error("Something went wrong")]
    UnexpectedError(#[from] anyhow::Error),
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(_) => AuthError::AccountTaken,
            RepositoryError::Database(e) => {
                AuthError::UnexpectedError(anyhow::Error::new(e).context("Database operation failed"))
            }
        }
    }
}

#[derive(Debug)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

/// Account flows: registration, login and the password lifecycle.
pub struct AuthService {
    repository: Arc<dyn Repository>,
    hasher: CredentialHasher,
    signer: Arc<JwtSigner>,
    reset_tokens: ResetTokenManager,
    email_client: Arc<dyn EmailSender>,
    frontend_url: String,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn Repository>,
        hasher: CredentialHasher,
        signer: Arc<JwtSigner>,
        email_client: Arc<dyn EmailSender>,
        frontend_url: String,
    ) -> Self {
        Self {
            reset_tokens: ResetTokenManager::new(repository.clone()),
            repository,
            hasher,
            signer,
            email_client,
            frontend_url,
        }
    }

    fn issue_session(&self, user: User) -> Result<AuthSession, AuthError> {
        let token = self
            .signer
            .issue(user.id, &user.username, &user.email)
            .context("Failed to issue session token")?;
        Ok(AuthSession { user, token })
    }

    #[tracing::instrument(name = "Register user", skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<AuthSession, AuthError> {
        let email = normalize_email(&registration.email);
        let username = registration.username.trim().to_string();

        if !is_valid_email(&email) {
            return Err(AuthError::InvalidInput("Invalid email format".to_string()));
        }
        validate_length("Username", &username, 1, MAX_USERNAME_LENGTH)
            .map_err(AuthError::InvalidInput)?;
        validate_password(&registration.password).map_err(AuthError::InvalidInput)?;

        if self.repository.find_user_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self
            .hasher
            .hash(registration.password)
            .await
            .context("Failed to hash password")?;

        let user = self
            .repository
            .insert_user(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "Registered new user");
        self.issue_session(user)
    }

    #[tracing::instrument(name = "Login", skip(self, password))]
    pub async fn login(&self, email: &str, password: String) -> Result<AuthSession, AuthError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidInput("Invalid email format".to_string()));
        }

        let user = self.repository.find_user_by_email(&email).await?;
        let expected_password_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_PASSWORD_HASH.to_string());

        let is_valid = self
            .hasher
            .verify(expected_password_hash, password)
            .await
            .context("Failed to verify password")?;

        match user {
            Some(user) if is_valid => self.issue_session(user),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.repository
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    #[tracing::instrument(name = "Change password", skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        old_password: String,
        new_password: String,
    ) -> Result<(), AuthError> {
        let user = self.current_user(user_id).await?;

        let old_matches = self
            .hasher
            .verify(user.password_hash, old_password)
            .await
            .context("Failed to verify password")?;
        if !old_matches {
            return Err(AuthError::IncorrectOldPassword);
        }

        validate_password(&new_password).map_err(AuthError::InvalidInput)?;

        let password_hash = self
            .hasher
            .hash(new_password)
            .await
            .context("Failed to hash password")?;
        self.repository
            .update_password(user.id, &password_hash)
            .await?;
        Ok(())
    }

    /// Succeeds identically whether or not the e-mail belongs to an account.
    #[tracing::instrument(name = "Request password reset", skip(self))]
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(AuthError::InvalidInput("Invalid email format".to_string()));
        }

        let Some(user) = self.repository.find_user_by_email(&email).await? else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(());
        };

        let reset_token = self
            .reset_tokens
            .issue_for(user.id)
            .await
            .context("Failed to save reset token")?;

        let reset_link = password_reset_link(&self.frontend_url, &reset_token.token);
        self.email_client
            .send_email(
                &user.email,
                "Password Reset Request",
                &password_reset_body(&reset_link),
            )
            .await
            .context("Failed to send reset email")?;

        Ok(())
    }

    /// The token is consumed only after the new hash is stored.
    #[tracing::instrument(name = "Reset password", skip(self, token, new_password))]
    pub async fn reset_password(&self, token: &str, new_password: String) -> Result<(), AuthError> {
        validate_password(&new_password).map_err(AuthError::InvalidInput)?;

        let user = self
            .reset_tokens
            .resolve(token.trim())
            .await?
            .ok_or(AuthError::ResetTokenInvalid)?;

        match user.pending_reset_token() {
            Some(reset_token) if !reset_token.is_expired(Utc::now()) => {}
            _ => return Err(AuthError::ResetTokenExpired),
        }

        let password_hash = self
            .hasher
            .hash(new_password)
            .await
            .context("Failed to hash password")?;
        self.repository
            .update_password(user.id, &password_hash)
            .await?;
        self.reset_tokens
            .consume(user.id)
            .await
            .context("Failed to clear reset token")?;

        tracing::info!(user_id = %user.id, "Password reset completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        assert_eq!(normalize_email("bob@x.com"), "bob@x.com");
    }
}

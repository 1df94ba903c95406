use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};

use crate::configuration::PasswordHashingSettings;
use crate::telemetry::spawn_blocking_with_tracing;

#[derive(thiserror::Error, Debug)]
pub enum HashingError {
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(argon2::Error),

    #[error("Failed to hash password: {0}")]
    Hash(argon2::password_hash::Error),

    #[error("Hashing task failed")]
    Join(#[from] tokio::task::JoinError),
}

/// Argon2id hasher producing self-describing PHC strings.
///
/// Verification reads the parameters back from the stored digest, so
/// changing the configured cost only affects newly hashed passwords.
#[derive(Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl CredentialHasher {
    pub fn new(settings: &PasswordHashingSettings) -> Result<Self, HashingError> {
        let params = Params::new(
            settings.memory_cost,
            settings.iterations,
            settings.parallelism,
            None,
        )
        .map_err(HashingError::InvalidParams)?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn compute_password_hash(&self, password: &str) -> Result<String, HashingError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(HashingError::Hash)?
            .to_string();

        Ok(password_hash)
    }

    /// `false` for a mismatch and for a digest that does not parse.
    pub fn verify_password_hash(&self, expected_password_hash: &str, candidate: &str) -> bool {
        let Ok(expected_password_hash) = PasswordHash::new(expected_password_hash) else {
            return false;
        };

        self.argon2()
            .verify_password(candidate.as_bytes(), &expected_password_hash)
            .is_ok()
    }

    #[tracing::instrument(name = "Hash password", skip(self, password))]
    pub async fn hash(&self, password: String) -> Result<String, HashingError> {
        let hasher = self.clone();
        spawn_blocking_with_tracing(move || hasher.compute_password_hash(&password)).await?
    }

    #[tracing::instrument(name = "Verify password", skip(self, expected_password_hash, candidate))]
    pub async fn verify(
        &self,
        expected_password_hash: String,
        candidate: String,
    ) -> Result<bool, HashingError> {
        let hasher = self.clone();
        Ok(spawn_blocking_with_tracing(move || {
            hasher.verify_password_hash(&expected_password_hash, &candidate)
        })
        .await?)
    }
}

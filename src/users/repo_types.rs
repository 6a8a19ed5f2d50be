use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::users::password::PasswordDigest;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: Uuid,                   // assigned by the store
    pub username: String,           // display name, not unique
    pub email: String,              // trimmed + lowercased, unique
    #[serde(skip_serializing)]
    pub password_hash: String,      // base64 scrypt output, not exposed in JSON
    #[serde(skip_serializing)]
    pub password_salt: String,      // base64 salt for password_hash
    #[serde(skip_serializing)]
    pub scrypt_log_n: i16,          // cost parameters password_hash was derived under
    #[serde(skip_serializing)]
    pub scrypt_block_size: i32,
    #[serde(skip_serializing)]
    pub scrypt_parallelism: i32,
    pub profile: String,
    pub point: i32,
}

impl UserRecord {
    /// Stored credential; parameters outside their column ranges fail verification.
    pub fn password_digest(&self) -> PasswordDigest {
        PasswordDigest {
            hash: self.password_hash.clone(),
            salt: self.password_salt.clone(),
            log_n: u8::try_from(self.scrypt_log_n).unwrap_or(u8::MAX),
            block_size: u32::try_from(self.scrypt_block_size).unwrap_or(0),
            parallelism: u32::try_from(self.scrypt_parallelism).unwrap_or(0),
        }
    }
}

/// Input for creating a user. `password` is plaintext and never stored.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile: Option<String>,
}

impl NewUser {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

/// Row handed to a repository: email already normalized, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUserRow {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub scrypt_log_n: i16,
    pub scrypt_block_size: i32,
    pub scrypt_parallelism: i32,
    pub profile: String,
    pub point: i32,
}

impl NewUserRow {
    pub fn new(username: String, email: String, digest: PasswordDigest, profile: String) -> Self {
        Self {
            username,
            email,
            password_hash: digest.hash,
            password_salt: digest.salt,
            scrypt_log_n: i16::from(digest.log_n),
            scrypt_block_size: i32::try_from(digest.block_size).unwrap_or(i32::MAX),
            scrypt_parallelism: i32::try_from(digest.parallelism).unwrap_or(i32::MAX),
            profile,
            point: 0,
        }
    }
}

/// Trim and lowercase, the form emails are stored and looked up in.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

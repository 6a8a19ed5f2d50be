use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::users::error::UserError;
use crate::users::repo::UserRepository;
use crate::users::repo_types::{NewUserRow, UserRecord};

/// Map-backed repository keyed by normalized email.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, row: NewUserRow) -> Result<UserRecord, UserError> {
        if row.username.trim().is_empty() || row.email.is_empty() {
            return Err(UserError::Validation("username and email are required".into()));
        }

        let mut users = self.users.write().await;
        if users.contains_key(&row.email) {
            return Err(UserError::DuplicateEmail(row.email));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            password_salt: row.password_salt,
            scrypt_log_n: row.scrypt_log_n,
            scrypt_block_size: row.scrypt_block_size,
            scrypt_parallelism: row.scrypt_parallelism,
            profile: row.profile,
            point: row.point,
        };
        users.insert(record.email.clone(), record.clone());
        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserError> {
        Ok(self.users.read().await.get(email).cloned())
    }
}

use async_trait::async_trait;
use sqlx::PgPool;

use crate::users::error::UserError;
use crate::users::repo_types::{NewUserRow, UserRecord};

/// Storage seam for user records. Implementations enforce email uniqueness.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new record; the store assigns its id.
    async fn insert(&self, row: NewUserRow) -> Result<UserRecord, UserError>;
    /// Exact match on the stored (normalized) email.
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserError>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert(&self, row: NewUserRow) -> Result<UserRecord, UserError> {
        let email = row.email.clone();
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (username, email, password_hash, password_salt,
                               scrypt_log_n, scrypt_block_size, scrypt_parallelism,
                               profile, point)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, username, email, password_hash, password_salt,
                      scrypt_log_n, scrypt_block_size, scrypt_parallelism, profile, point
            "#,
        )
        .bind(row.username)
        .bind(row.email)
        .bind(row.password_hash)
        .bind(row.password_salt)
        .bind(row.scrypt_log_n)
        .bind(row.scrypt_block_size)
        .bind(row.scrypt_parallelism)
        .bind(row.profile)
        .bind(row.point)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_insert_error(e, email))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserError> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT id, username, email, password_hash, password_salt,
                   scrypt_log_n, scrypt_block_size, scrypt_parallelism, profile, point
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }
}

fn map_insert_error(err: sqlx::Error, email: String) -> UserError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return UserError::DuplicateEmail(email);
        }
        if db_err.is_check_violation() {
            return UserError::Validation(db_err.message().to_string());
        }
    }
    UserError::Database(err)
}

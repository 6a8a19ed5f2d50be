use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    /// A required field was missing or empty.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// The key-derivation parameters or output buffer were rejected.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub mod dto;
pub mod error;
pub mod memory;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;

pub use dto::UserResponse;
pub use error::UserError;
pub use memory::InMemoryUserRepository;
pub use password::{PasswordHasher, LEGACY_SHARED_SALT};
pub use repo::{PgUserRepository, UserRepository};
pub use repo_types::{normalize_email, NewUser, NewUserRow, UserRecord};
pub use services::UserService;

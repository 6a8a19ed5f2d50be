use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::{AppConfig, DatabaseConfig};
use crate::users::{PasswordHasher, PgUserRepository, UserService};

pub async fn connect(config: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .context("connect to database")?;

    if config.run_migrations {
        ensure_schema(&db).await?;
    }
    Ok(db)
}

/// Creates the users table and its unique email index if missing.
pub async fn ensure_schema(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("install users schema")?;
    tracing::info!("users schema ready");
    Ok(())
}

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub users: UserService,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);
        let db = connect(&config.database).await?;
        let hasher = PasswordHasher::new(&config.hashing).context("build password hasher")?;
        let users = UserService::new(Arc::new(PgUserRepository::new(db.clone())), hasher);
        Ok(Self { db, config, users })
    }
}

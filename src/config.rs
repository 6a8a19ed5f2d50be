use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Install the schema and the unique email index on connect.
    pub run_migrations: bool,
}

/// scrypt parameters. Defaults match the hashes already in circulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct HashConfig {
    pub log_n: u8,
    pub block_size: u32,
    pub parallelism: u32,
    pub output_len: usize,
    pub salt_len: usize,
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            log_n: 13,
            block_size: 5,
            parallelism: 1,
            output_len: 25,
            salt_len: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub hashing: HashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            run_migrations: parse_or(&lookup, "DATABASE_RUN_MIGRATIONS", true)?,
        };

        let defaults = HashConfig::default();
        let hashing = HashConfig {
            log_n: parse_or(&lookup, "SCRYPT_LOG_N", defaults.log_n)?,
            block_size: parse_or(&lookup, "SCRYPT_BLOCK_SIZE", defaults.block_size)?,
            parallelism: parse_or(&lookup, "SCRYPT_PARALLELISM", defaults.parallelism)?,
            output_len: parse_or(&lookup, "SCRYPT_OUTPUT_LEN", defaults.output_len)?,
            salt_len: parse_or(&lookup, "SCRYPT_SALT_LEN", defaults.salt_len)?,
        };

        Ok(Self { database, hashing })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}

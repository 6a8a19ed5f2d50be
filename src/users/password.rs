use base64ct::{Base64, Encoding};
use constant_time_eq::constant_time_eq;
use rand::{rngs::OsRng, RngCore};
use scrypt::Params;
use tracing::{debug, error};

use crate::config::HashConfig;
use crate::users::error::UserError;

/// Salt shared by every hash the legacy system produced. Imported legacy
/// records carry it base64-encoded in `password_salt`; new records never use it.
pub const LEGACY_SHARED_SALT: &[u8] = b"$alt";

/// Everything needed to check a password later: the derived key, its salt
/// and the cost parameters it was derived under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    pub hash: String, // base64
    pub salt: String, // base64
    pub log_n: u8,
    pub block_size: u32,
    pub parallelism: u32,
}

impl PasswordDigest {
    /// False on mismatch and on anything undecodable.
    pub fn verify(&self, password: &str) -> bool {
        let (Ok(expected), Ok(salt)) = (Base64::decode_vec(&self.hash), Base64::decode_vec(&self.salt))
        else {
            debug!("stored hash or salt is not valid base64");
            return false;
        };

        let Ok(params) = Params::new(self.log_n, self.block_size, self.parallelism, expected.len())
        else {
            debug!(log_n = self.log_n, "stored scrypt parameters are invalid");
            return false;
        };

        let mut actual = vec![0u8; expected.len()];
        if scrypt::scrypt(password.as_bytes(), &salt, &params, &mut actual).is_err() {
            return false;
        }
        constant_time_eq(&actual, &expected)
    }
}

/// scrypt hasher for new passwords, bound to the configured cost parameters.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    config: HashConfig,
    params: Params,
}

impl PasswordHasher {
    pub fn new(config: &HashConfig) -> Result<Self, UserError> {
        let params = Params::new(
            config.log_n,
            config.block_size,
            config.parallelism,
            config.output_len,
        )
        .map_err(|e| {
            error!(error = %e, ?config, "invalid scrypt parameters");
            UserError::Hashing(e.to_string())
        })?;

        if config.output_len == 0 || config.salt_len == 0 {
            return Err(UserError::Hashing(
                "output and salt lengths must be positive".into(),
            ));
        }

        Ok(Self {
            config: *config,
            params,
        })
    }

    /// Fresh random salt from the OS RNG.
    pub fn generate_salt(&self) -> Vec<u8> {
        let mut salt = vec![0u8; self.config.salt_len];
        OsRng.fill_bytes(&mut salt);
        salt
    }

    /// Base64 of the derived key. Deterministic for fixed inputs.
    pub fn hash_with_salt(&self, password: &str, salt: &[u8]) -> Result<String, UserError> {
        let mut out = vec![0u8; self.config.output_len];
        scrypt::scrypt(password.as_bytes(), salt, &self.params, &mut out).map_err(|e| {
            error!(error = %e, "scrypt derive error");
            UserError::Hashing(e.to_string())
        })?;
        Ok(Base64::encode_string(&out))
    }

    /// Hash under a new random salt and the current parameters.
    pub fn hash(&self, password: &str) -> Result<PasswordDigest, UserError> {
        let salt = self.generate_salt();
        Ok(PasswordDigest {
            hash: self.hash_with_salt(password, &salt)?,
            salt: Base64::encode_string(&salt),
            log_n: self.config.log_n,
            block_size: self.config.block_size,
            parallelism: self.config.parallelism,
        })
    }
}

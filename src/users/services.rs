use std::sync::Arc;

use tracing::{debug, error, info, instrument, warn};

use crate::users::{
    error::UserError,
    password::PasswordHasher,
    repo::UserRepository,
    repo_types::{normalize_email, NewUser, NewUserRow, UserRecord},
};

/// Creates, looks up and authenticates user records.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self { repo, hasher }
    }

    #[instrument(skip(self, new_user), fields(username = %new_user.username))]
    pub async fn create(&self, new_user: NewUser) -> Result<UserRecord, UserError> {
        let NewUser {
            username,
            email,
            password,
            profile,
        } = new_user;
        let email = normalize_email(&email);

        if username.trim().is_empty() {
            warn!("username missing");
            return Err(UserError::Validation("username is required".into()));
        }
        if email.is_empty() {
            warn!("email missing");
            return Err(UserError::Validation("email is required".into()));
        }

        let digest = self.hasher.hash(&password)?;
        let row = NewUserRow::new(username, email, digest, profile.unwrap_or_default());

        match self.repo.insert(row).await {
            Ok(user) => {
                info!(user_id = %user.id, email = %user.email, "user created");
                Ok(user)
            }
            Err(UserError::DuplicateEmail(email)) => {
                warn!(email = %email, "email already registered");
                Err(UserError::DuplicateEmail(email))
            }
            Err(e) => {
                error!(error = %e, "create user failed");
                Err(e)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn find_one_by_email(&self, email: &str) -> Result<Option<UserRecord>, UserError> {
        let email = normalize_email(email);
        let user = self.repo.find_by_email(&email).await.map_err(|e| {
            error!(error = %e, "find_by_email failed");
            e
        })?;
        debug!(email = %email, found = user.is_some(), "user lookup");
        Ok(user)
    }

    /// True iff `password` is the plaintext the record was created with.
    /// Uses the cost parameters stored on the record, not the current ones.
    pub fn verify(&self, user: &UserRecord, password: &str) -> bool {
        user.password_digest().verify(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HashConfig;
    use crate::users::dto::UserResponse;
    use crate::users::memory::InMemoryUserRepository;
    use crate::users::password::LEGACY_SHARED_SALT;
    use base64ct::{Base64, Encoding};

    fn service() -> (UserService, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let hasher = PasswordHasher::new(&HashConfig::default()).expect("default params are valid");
        (UserService::new(repo.clone(), hasher), repo)
    }

    #[tokio::test]
    async fn create_then_find_returns_the_record() {
        let (svc, _) = service();
        let created = svc
            .create(NewUser::new("alice", "Alice@Example.com", "s3cret").with_profile("bio"))
            .await
            .expect("create should succeed");

        let found = svc
            .find_one_by_email("alice@example.com")
            .await
            .expect("lookup should succeed")
            .expect("user should exist");

        assert_eq!(found.id, created.id);
        assert_eq!(found.username, "alice");
        assert_eq!(found.email, "alice@example.com");
        assert_eq!(found.profile, "bio");
        assert_eq!(found.point, 0);
        assert_ne!(found.password_hash, "s3cret");
        assert!(!found.password_hash.is_empty());
    }

    #[tokio::test]
    async fn profile_defaults_to_empty() {
        let (svc, _) = service();
        let user = svc
            .create(NewUser::new("carol", "carol@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(user.profile, "");
        assert_eq!(user.point, 0);
    }

    #[tokio::test]
    async fn verify_accepts_only_the_original_password() {
        let (svc, _) = service();
        let user = svc
            .create(NewUser::new("alice", "alice@example.com", "s3cret"))
            .await
            .unwrap();

        assert!(svc.verify(&user, "s3cret"));
        assert!(!svc.verify(&user, "wrong"));
        assert!(!svc.verify(&user, "S3cret"));
        assert!(!svc.verify(&user, "s3cret "));
    }

    #[tokio::test]
    async fn verify_is_false_for_corrupted_hash() {
        let (svc, _) = service();
        let mut user = svc
            .create(NewUser::new("alice", "alice@example.com", "s3cret"))
            .await
            .unwrap();
        user.password_hash = "garbage!".into();
        assert!(!svc.verify(&user, "s3cret"));
    }

    #[tokio::test]
    async fn emails_differing_in_case_or_whitespace_collide() {
        let (svc, repo) = service();
        svc.create(NewUser::new("a", "A@x.com", "one")).await.unwrap();

        let err = svc
            .create(NewUser::new("b", "a@x.com ", "two"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::DuplicateEmail(ref e) if e == "a@x.com"));
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn lookup_normalizes_input_and_misses_cleanly() {
        let (svc, _) = service();
        svc.create(NewUser::new("alice", "alice@example.com", "s3cret"))
            .await
            .unwrap();

        assert!(svc.find_one_by_email("  ALICE@example.com").await.unwrap().is_some());
        assert!(svc.find_one_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_required_fields_are_rejected() {
        let (svc, repo) = service();
        let err = svc.create(NewUser::new("", "x@x.com", "pw")).await.unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));

        let err = svc.create(NewUser::new("x", "   ", "pw")).await.unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn same_password_different_users_get_different_hashes() {
        let (svc, _) = service();
        let a = svc.create(NewUser::new("a", "a@x.com", "same")).await.unwrap();
        let b = svc.create(NewUser::new("b", "b@x.com", "same")).await.unwrap();
        assert_ne!(a.password_salt, b.password_salt);
        assert_ne!(a.password_hash, b.password_hash);
        assert!(svc.verify(&a, "same"));
        assert!(svc.verify(&b, "same"));
    }

    #[tokio::test]
    async fn legacy_record_still_verifies() {
        let (svc, repo) = service();
        let legacy = repo
            .insert(NewUserRow {
                username: "old".into(),
                email: "old@example.com".into(),
                password_hash: "39HKEsVA2vXiUjPjfCtpkUP6Ag9c86LoJA==".into(),
                password_salt: Base64::encode_string(LEGACY_SHARED_SALT),
                scrypt_log_n: 13,
                scrypt_block_size: 5,
                scrypt_parallelism: 1,
                profile: String::new(),
                point: 7,
            })
            .await
            .unwrap();

        assert!(svc.verify(&legacy, "s3cret"));
        assert!(!svc.verify(&legacy, "wrong"));
    }

    #[tokio::test]
    async fn public_response_drops_hash_and_point() {
        let (svc, _) = service();
        let user = svc
            .create(NewUser::new("alice", "alice@example.com", "s3cret").with_profile("bio"))
            .await
            .unwrap();

        let response = user.to_user_response();
        assert_eq!(response, UserResponse::from(&user));
        assert_eq!(response.id, user.id);
        assert_eq!(response.username, "alice");
        assert_eq!(response.email, "alice@example.com");
        assert_eq!(response.profile, "bio");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("password").is_none());
        assert!(json.get("point").is_none());
    }

    #[tokio::test]
    async fn existing_users_still_verify_after_cost_parameters_change() {
        let (svc, repo) = service();
        svc.create(NewUser::new("alice", "alice@example.com", "pw"))
            .await
            .unwrap();

        let hasher = PasswordHasher::new(&HashConfig {
            log_n: 14,
            ..HashConfig::default()
        })
        .unwrap();
        let retuned = UserService::new(repo.clone(), hasher);

        let stored = retuned
            .find_one_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.scrypt_log_n, 13);
        assert!(retuned.verify(&stored, "pw"));
        assert!(!retuned.verify(&stored, "wrong"));

        let bob = retuned
            .create(NewUser::new("bob", "bob@example.com", "pw"))
            .await
            .unwrap();
        assert_eq!(bob.scrypt_log_n, 14);
        assert!(svc.verify(&bob, "pw"));
    }
}

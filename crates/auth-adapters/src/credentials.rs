//! # CredentialIdentityProvider
//!
//! E-mail/password accounts. Profiles live in a [`UserRepo`]; Argon2 hashes
//! live in a [`CredentialRepo`]. Hashing runs on the blocking pool.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use domains::{
    CredentialRepo, DomainError, IdentityProvider, Registration, Result, User, UserRepo,
    INVALID_CREDENTIALS,
};

pub struct CredentialIdentityProvider {
    users: Arc<dyn UserRepo>,
    credentials: Arc<dyn CredentialRepo>,
}

fn rejected() -> DomainError {
    DomainError::Unauthorized(INVALID_CREDENTIALS.to_string())
}

/// PHC-format Argon2id hash with a random salt.
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(DomainError::internal)
    })
    .await
    .map_err(DomainError::internal)?
}

/// `false` for a wrong password or an unparsable hash.
pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || match PasswordHash::new(&hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    })
    .await
    .map_err(DomainError::internal)
}

impl CredentialIdentityProvider {
    pub fn new(users: Arc<dyn UserRepo>, credentials: Arc<dyn CredentialRepo>) -> Self {
        Self { users, credentials }
    }
}

#[async_trait]
impl IdentityProvider for CredentialIdentityProvider {
    async fn sign_in(&self, identifier: &str, password: &str) -> Result<User> {
        let Some(user) = self.users.find_by_login(identifier).await? else {
            warn!("sign-in for unknown account");
            return Err(rejected());
        };
        let Some(hash) = self.credentials.password_hash(user.id).await? else {
            warn!(user_id = %user.id, "account has no password set");
            return Err(rejected());
        };
        if !verify_password(password, &hash).await? {
            warn!(user_id = %user.id, "wrong password");
            return Err(rejected());
        }
        Ok(user)
    }

    async fn sign_up(&self, registration: Registration) -> Result<User> {
        let hash = hash_password(&registration.password).await?;
        let user = User::new(
            registration.username.trim(),
            registration.email.trim(),
            Utc::now(),
        );
        self.users.insert_user(user.clone()).await?;
        if let Err(e) = self.credentials.set_password_hash(user.id, hash).await {
            error!(user_id = %user.id, error = %e, "profile stored without credentials");
            return Err(e);
        }
        info!(user_id = %user.id, "account created");
        Ok(user)
    }

    async fn sign_out(&self, _user_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "credentials"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage_adapters::{MemoryCredentialRepo, MemoryUserRepo};

    fn provider() -> CredentialIdentityProvider {
        CredentialIdentityProvider::new(
            Arc::new(MemoryUserRepo::new()),
            Arc::new(MemoryCredentialRepo::new()),
        )
    }

    fn registration() -> Registration {
        Registration {
            email: "vecino@email.com".into(),
            password: "secreto1".into(),
            username: "vecino_preocupado".into(),
        }
    }

    #[tokio::test]
    async fn hashes_verify() {
        let hash = hash_password("123456").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("123456", &hash).await.unwrap());
        assert!(!verify_password("654321", &hash).await.unwrap());
        assert!(!verify_password("123456", "not-a-hash").await.unwrap());
    }

    #[tokio::test]
    async fn sign_up_then_sign_in_by_email_or_username() {
        let provider = provider();
        let created = provider.sign_up(registration()).await.unwrap();

        let by_email = provider.sign_in("vecino@email.com", "secreto1").await.unwrap();
        let by_name = provider.sign_in("vecino_preocupado", "secreto1").await.unwrap();
        assert_eq!(by_email.id, created.id);
        assert_eq!(by_name.id, created.id);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let provider = provider();
        provider.sign_up(registration()).await.unwrap();
        let err = provider.sign_up(registration()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let provider = provider();
        let first = provider.sign_up(registration()).await.unwrap();
        let twin = Registration {
            email: "otra@email.com".into(),
            ..registration()
        };
        let err = provider.sign_up(twin).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let by_name = provider.sign_in("vecino_preocupado", "secreto1").await.unwrap();
        assert_eq!(by_name.id, first.id);
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let provider = provider();
        provider.sign_up(registration()).await.unwrap();

        let wrong = provider.sign_in("vecino@email.com", "otra").await.unwrap_err();
        let unknown = provider.sign_in("nadie@email.com", "secreto1").await.unwrap_err();
        assert_eq!(wrong, unknown);
        assert_eq!(wrong, rejected());
    }
}

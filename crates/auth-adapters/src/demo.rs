//! # DemoIdentityProvider
//!
//! Fixed-account sign-in for demos: `admin` / `password`, or the demo
//! e-mail `demo@example.com` / `123456`. Both resolve to the same demo user.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use domains::{
    DomainError, IdentityProvider, Registration, Result, User, UserRepo, INVALID_CREDENTIALS,
};

pub const DEMO_USERNAME: &str = "admin";
pub const DEMO_PASSWORD: &str = "password";
pub const DEMO_EMAIL: &str = "demo@example.com";
pub const DEMO_EMAIL_PASSWORD: &str = "123456";

pub struct DemoIdentityProvider {
    users: Arc<dyn UserRepo>,
    account: User,
}

impl DemoIdentityProvider {
    /// `account` is the profile every successful sign-in resolves to.
    pub fn new(users: Arc<dyn UserRepo>, account: User) -> Self {
        Self { users, account }
    }

    fn accepts(identifier: &str, password: &str) -> bool {
        (identifier == DEMO_USERNAME && password == DEMO_PASSWORD)
            || (identifier.eq_ignore_ascii_case(DEMO_EMAIL) && password == DEMO_EMAIL_PASSWORD)
    }

    /// Returns the stored profile, creating it on first use.
    async fn ensure_profile(&self) -> Result<User> {
        if let Some(user) = self.users.get_user(self.account.id).await? {
            return Ok(user);
        }
        match self.users.insert_user(self.account.clone()).await {
            Ok(()) | Err(DomainError::Conflict(_)) => {}
            Err(e) => return Err(e),
        }
        debug!(user_id = %self.account.id, "demo profile created");
        Ok(self
            .users
            .get_user(self.account.id)
            .await?
            .unwrap_or_else(|| self.account.clone()))
    }
}

#[async_trait]
impl IdentityProvider for DemoIdentityProvider {
    async fn sign_in(&self, identifier: &str, password: &str) -> Result<User> {
        if !Self::accepts(identifier, password) {
            warn!(identifier, "demo sign-in rejected");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        self.ensure_profile().await
    }

    async fn sign_up(&self, _registration: Registration) -> Result<User> {
        Err(DomainError::Unsupported(
            "El registro no está disponible en modo demo".to_string(),
        ))
    }

    async fn sign_out(&self, _user_id: Uuid) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "demo"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use storage_adapters::MemoryUserRepo;

    fn provider() -> (DemoIdentityProvider, Uuid) {
        let account = User::new("admin", "admin@denuncias.com", Utc::now());
        let id = account.id;
        (
            DemoIdentityProvider::new(Arc::new(MemoryUserRepo::new()), account),
            id,
        )
    }

    #[tokio::test]
    async fn accepts_both_demo_credentials() {
        let (demo, id) = provider();
        assert_eq!(demo.sign_in("admin", "password").await.unwrap().id, id);
        assert_eq!(demo.sign_in("Demo@Example.com", "123456").await.unwrap().id, id);
    }

    #[tokio::test]
    async fn rejects_anything_else() {
        let (demo, _) = provider();
        let err = demo.sign_in("admin", "123456").await.unwrap_err();
        assert_eq!(err, DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    #[tokio::test]
    async fn registration_is_unsupported() {
        let (demo, _) = provider();
        let err = demo.sign_up(Registration::default()).await.unwrap_err();
        assert!(matches!(err, DomainError::Unsupported(_)));
    }

    #[tokio::test]
    async fn profile_persists_between_sign_ins() {
        let users = Arc::new(MemoryUserRepo::new());
        let account = User::new("admin", "admin@denuncias.com", Utc::now());
        let demo = DemoIdentityProvider::new(users.clone(), account.clone());

        demo.sign_in("admin", "password").await.unwrap();
        assert!(users.get_user(account.id).await.unwrap().is_some());
        demo.sign_in("admin", "password").await.unwrap();
    }
}

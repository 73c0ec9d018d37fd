//! # AuthService
//!
//! Server-side authentication: registration and login through an
//! [`IdentityProvider`], bearer tokens through a [`TokenIssuer`], and the
//! profile operations of the signed-in user.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

use domains::{
    Caller, DomainError, IdentityProvider, IssuedToken, Registration, Result, SettingsPatch,
    TokenIssuer, User, UserRepo, UserStats,
};

pub use domains::INVALID_CREDENTIALS;

/// A signed-in user together with the bearer token minted for them.
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub token: IssuedToken,
}

pub struct AuthService {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepo>,
    tokens: Arc<dyn TokenIssuer>,
    /// Revoked token ids and the moment they would have expired anyway.
    revoked: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl AuthService {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepo>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            identity,
            users,
            tokens,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.identity.name()
    }

    pub fn validate_registration(&self, registration: &Registration) -> Vec<String> {
        registration.validate()
    }

    #[instrument(skip(self, registration), fields(username = %registration.username))]
    pub async fn register(&self, registration: Registration) -> Result<AuthSession> {
        let errors = registration.validate();
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }
        let user = self.identity.sign_up(registration).await?;
        info!(user_id = %user.id, provider = self.identity.name(), "user registered");
        self.open_session(user)
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthSession> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(DomainError::Validation(vec![
                "Usuario y contraseña son obligatorios".to_string(),
            ]));
        }
        let user = match self.identity.sign_in(identifier.trim(), password).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "login rejected");
                return Err(e);
            }
        };
        info!(user_id = %user.id, "login succeeded");
        self.open_session(user)
    }

    fn open_session(&self, user: User) -> Result<AuthSession> {
        let token = self.tokens.issue(&user)?;
        Ok(AuthSession { user, token })
    }

    /// Resolves a bearer token to the caller it was issued for.
    pub async fn verify(&self, token: &str) -> Result<Caller> {
        let claims = self.tokens.verify(token)?;
        if self.revoked.read().await.contains_key(&claims.token_id) {
            return Err(DomainError::Unauthorized("La sesión ha sido cerrada".into()));
        }
        Ok(Caller {
            user_id: claims.user_id,
            username: claims.username,
        })
    }

    /// Revokes the token until its natural expiry.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &str) -> Result<()> {
        let claims = self.tokens.verify(token)?;
        {
            let mut revoked = self.revoked.write().await;
            let now = Utc::now();
            revoked.retain(|_, expires_at| *expires_at > now);
            revoked.insert(claims.token_id.clone(), claims.expires_at);
        }
        self.identity.sign_out(claims.user_id).await?;
        info!(user_id = %claims.user_id, "logged out");
        Ok(())
    }

    pub async fn current_user(&self, caller: &Caller) -> Result<User> {
        self.users
            .get_user(caller.user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("el usuario", caller.user_id))
    }

    #[instrument(skip(self, patch), fields(user_id = %caller.user_id))]
    pub async fn update_settings(&self, caller: &Caller, patch: SettingsPatch) -> Result<User> {
        let user = self
            .users
            .update_settings(caller.user_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("el usuario", caller.user_id))?;
        info!("settings updated");
        Ok(user)
    }

    pub async fn user_stats(&self, caller: &Caller) -> Result<UserStats> {
        Ok(self.current_user(caller).await?.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domains::{MockIdentityProvider, MockTokenIssuer, MockUserRepo, TokenClaims};
    use uuid::Uuid;

    fn demo_user() -> User {
        User::new("admin", "admin@denuncias.com", Utc::now())
    }

    fn issuer_for(user: &User) -> MockTokenIssuer {
        let user_id = user.id;
        let mut tokens = MockTokenIssuer::new();
        tokens.expect_issue().returning(|_| {
            Ok(IssuedToken {
                token: "tok".into(),
                token_id: "jti-1".into(),
                expires_at: Utc::now() + Duration::hours(1),
            })
        });
        tokens.expect_verify().returning(move |_| {
            Ok(TokenClaims {
                user_id,
                username: "admin".into(),
                token_id: "jti-1".into(),
                expires_at: Utc::now() + Duration::hours(1),
            })
        });
        tokens
    }

    #[tokio::test]
    async fn register_validates_before_calling_provider() {
        let mut identity = MockIdentityProvider::new();
        identity.expect_sign_up().never();
        let service = AuthService::new(
            Arc::new(identity),
            Arc::new(MockUserRepo::new()),
            Arc::new(MockTokenIssuer::new()),
        );

        let err = service
            .register(Registration {
                email: "malo".into(),
                password: "1".into(),
                username: "x".into(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.errores().len(), 3);
    }

    #[tokio::test]
    async fn login_issues_token() {
        let user = demo_user();
        let returned = user.clone();
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in()
            .withf(|id, pw| id == "admin" && pw == "password")
            .returning(move |_, _| Ok(returned.clone()));
        let service = AuthService::new(
            Arc::new(identity),
            Arc::new(MockUserRepo::new()),
            Arc::new(issuer_for(&user)),
        );

        let session = service.login(" admin ", "password").await.unwrap();
        assert_eq!(session.user.id, user.id);
        assert_eq!(session.token.token, "tok");
    }

    #[tokio::test]
    async fn login_propagates_rejection() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in()
            .returning(|_, _| Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into())));
        let service = AuthService::new(
            Arc::new(identity),
            Arc::new(MockUserRepo::new()),
            Arc::new(MockTokenIssuer::new()),
        );

        let err = service.login("admin", "nope").await.unwrap_err();
        assert_eq!(err, DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        assert!(matches!(
            service.login("", "").await,
            Err(DomainError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn logout_revokes_the_token() {
        let user = demo_user();
        let mut identity = MockIdentityProvider::new();
        identity.expect_sign_out().returning(|_| Ok(()));
        let service = AuthService::new(
            Arc::new(identity),
            Arc::new(MockUserRepo::new()),
            Arc::new(issuer_for(&user)),
        );

        let caller = service.verify("tok").await.unwrap();
        assert_eq!(caller.user_id, user.id);
        service.logout("tok").await.unwrap();
        assert!(matches!(
            service.verify("tok").await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn settings_for_unknown_user_is_not_found() {
        let mut users = MockUserRepo::new();
        users.expect_update_settings().returning(|_, _| Ok(None));
        users.expect_get_user().returning(|_| Ok(None));
        let service = AuthService::new(
            Arc::new(MockIdentityProvider::new()),
            Arc::new(users),
            Arc::new(MockTokenIssuer::new()),
        );
        let caller = Caller {
            user_id: Uuid::new_v4(),
            username: "ghost".into(),
        };

        assert!(matches!(
            service.update_settings(&caller, SettingsPatch::default()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.user_stats(&caller).await,
            Err(DomainError::NotFound { .. })
        ));
    }
}

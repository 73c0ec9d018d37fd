//! # SessionController
//!
//! The client-side session: who is signed in on this device. Successful
//! logins are mirrored into a [`SessionStore`] so a later process can
//! [`restore_session`](SessionController::restore_session) without asking
//! the identity provider again. Every transition is published as an
//! [`AuthEvent`].

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use domains::{
    DomainError, IdentityProvider, Registration, Result, SessionStore, SettingsPatch, User,
    UserRepo, UserStats, ANONYMOUS_DISPLAY_NAME,
};

use crate::events::{AuthEvent, EventBus};

pub const CURRENT_USER_KEY: &str = "currentUser";
pub const AUTHENTICATED_KEY: &str = "isAuthenticated";

const PERMISSIONS: [&str; 5] = [
    "create_denuncia",
    "comment",
    "like",
    "view_profile",
    "edit_profile",
];

const ACTIONS: [&str; 8] = [
    "create_denuncia",
    "like_denuncia",
    "comment",
    "view_denuncias",
    "view_ranking",
    "view_community",
    "view_profile",
    "edit_profile",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticated(User),
}

impl SessionState {
    fn user(&self) -> Option<&User> {
        match self {
            SessionState::Anonymous => None,
            SessionState::Authenticated(user) => Some(user),
        }
    }
}

pub struct SessionController {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserRepo>,
    store: Arc<dyn SessionStore>,
    state: RwLock<SessionState>,
    events: EventBus<AuthEvent>,
}

impl SessionController {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        users: Arc<dyn UserRepo>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            identity,
            users,
            store,
            state: RwLock::new(SessionState::Anonymous),
            events: EventBus::default(),
        }
    }

    pub fn events(&self) -> &EventBus<AuthEvent> {
        &self.events
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<User> {
        let user = self.identity.sign_in(identifier.trim(), password).await?;
        self.authenticate(user.clone()).await;
        info!(user_id = %user.id, "session started");
        Ok(user)
    }

    pub async fn register(&self, registration: Registration) -> Result<User> {
        let errors = registration.validate();
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }
        let user = self.identity.sign_up(registration).await?;
        self.authenticate(user.clone()).await;
        info!(user_id = %user.id, "session started after registration");
        Ok(user)
    }

    pub async fn logout(&self) -> Result<()> {
        let previous = std::mem::take(&mut *self.state.write().await);
        if let Some(user) = previous.user() {
            if let Err(e) = self.identity.sign_out(user.id).await {
                warn!(error = %e, "identity provider sign-out failed");
            }
        }
        self.clear_mirror().await;
        self.notify().await;
        Ok(())
    }

    /// Trusts the mirrored copy until the provider reports otherwise.
    pub async fn restore_session(&self) -> bool {
        let flag = self.store.get(AUTHENTICATED_KEY).await;
        let payload = self.store.get(CURRENT_USER_KEY).await;
        let (Ok(Some(flag)), Ok(Some(payload))) = (flag, payload) else {
            return false;
        };
        if flag != "true" {
            return false;
        }
        match serde_json::from_str::<User>(&payload) {
            Ok(user) => {
                debug!(user_id = %user.id, "session restored from storage");
                *self.state.write().await = SessionState::Authenticated(user);
                self.notify().await;
                true
            }
            Err(e) => {
                warn!(error = %e, "stored session is unreadable");
                false
            }
        }
    }

    /// Callback for asynchronous identity-provider state changes.
    pub async fn on_provider_state_change(&self, user: Option<User>) {
        match user {
            Some(user) => self.authenticate(user).await,
            None => {
                *self.state.write().await = SessionState::Anonymous;
                self.clear_mirror().await;
                self.notify().await;
            }
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user().cloned()
    }

    pub async fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().await, SessionState::Authenticated(_))
    }

    pub async fn display_name(&self) -> String {
        match self.state.read().await.user() {
            Some(user) => user.display_name().to_string(),
            None => ANONYMOUS_DISPLAY_NAME.to_string(),
        }
    }

    /// Every authenticated user holds the same permissions.
    pub async fn has_permission(&self, permission: &str) -> bool {
        self.is_authenticated().await && PERMISSIONS.contains(&permission)
    }

    pub async fn can_perform_action(&self, action: &str) -> bool {
        self.is_authenticated().await && ACTIONS.contains(&action)
    }

    pub async fn update_settings(&self, patch: SettingsPatch) -> Result<User> {
        let mut state = self.state.write().await;
        let SessionState::Authenticated(user) = &mut *state else {
            return Err(DomainError::Unauthorized("Usuario no autenticado".into()));
        };
        user.update_settings(patch.clone());
        let updated = user.clone();
        drop(state);

        match self.users.update_settings(updated.id, patch).await {
            Ok(Some(_)) => {}
            Ok(None) => debug!(user_id = %updated.id, "no stored profile; settings kept locally"),
            Err(e) => warn!(error = %e, "failed to persist settings"),
        }
        self.mirror(&updated).await;
        Ok(updated)
    }

    pub async fn user_stats(&self) -> Option<UserStats> {
        self.state.read().await.user().map(User::stats)
    }

    async fn authenticate(&self, user: User) {
        self.mirror(&user).await;
        *self.state.write().await = SessionState::Authenticated(user);
        self.notify().await;
    }

    async fn mirror(&self, user: &User) {
        let payload = match serde_json::to_string(user) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "could not serialize session user");
                return;
            }
        };
        if let Err(e) = self.store.set(CURRENT_USER_KEY, &payload).await {
            warn!(error = %e, "could not persist session user");
        }
        if let Err(e) = self.store.set(AUTHENTICATED_KEY, "true").await {
            warn!(error = %e, "could not persist session flag");
        }
    }

    async fn clear_mirror(&self) {
        for key in [CURRENT_USER_KEY, AUTHENTICATED_KEY] {
            if let Err(e) = self.store.remove(key).await {
                warn!(key, error = %e, "could not clear session storage");
            }
        }
    }

    async fn notify(&self) {
        let user = self.current_user().await;
        self.events.publish(AuthEvent {
            is_authenticated: user.is_some(),
            user,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{MockIdentityProvider, MockSessionStore, MockUserRepo};

    fn admin() -> User {
        User::new("admin", "admin@denuncias.com", Utc::now())
    }

    fn permissive_store() -> MockSessionStore {
        let mut store = MockSessionStore::new();
        store.expect_set().returning(|_, _| Ok(()));
        store.expect_remove().returning(|_| Ok(()));
        store
    }

    #[tokio::test]
    async fn login_mirrors_and_notifies() {
        let user = admin();
        let returned = user.clone();
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in()
            .returning(move |_, _| Ok(returned.clone()));
        let mut store = MockSessionStore::new();
        store
            .expect_set()
            .withf(|k, _| k == CURRENT_USER_KEY)
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_set()
            .withf(|k, v| k == AUTHENTICATED_KEY && v == "true")
            .times(1)
            .returning(|_, _| Ok(()));

        let session =
            SessionController::new(Arc::new(identity), Arc::new(MockUserRepo::new()), Arc::new(store));
        let mut rx = session.events().subscribe();

        session.login("admin", "password").await.unwrap();
        assert!(session.is_authenticated().await);
        assert!(session.has_permission("like").await);
        assert!(!session.has_permission("delete_everything").await);
        assert!(session.can_perform_action("view_ranking").await);
        assert!(rx.recv().await.unwrap().is_authenticated);
    }

    #[tokio::test]
    async fn failed_login_stays_anonymous() {
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in()
            .returning(|_, _| Err(DomainError::Unauthorized("no".into())));
        let session = SessionController::new(
            Arc::new(identity),
            Arc::new(MockUserRepo::new()),
            Arc::new(MockSessionStore::new()),
        );

        assert!(session.login("admin", "mal").await.is_err());
        assert!(!session.is_authenticated().await);
        assert!(!session.can_perform_action("view_denuncias").await);
        assert_eq!(session.display_name().await, ANONYMOUS_DISPLAY_NAME);
        assert!(session.user_stats().await.is_none());
    }

    #[tokio::test]
    async fn login_trims_the_identifier() {
        let returned = admin();
        let mut identity = MockIdentityProvider::new();
        identity
            .expect_sign_in()
            .withf(|id, pw| id == "admin" && pw == "password")
            .times(1)
            .returning(move |_, _| Ok(returned.clone()));
        let session = SessionController::new(
            Arc::new(identity),
            Arc::new(MockUserRepo::new()),
            Arc::new(permissive_store()),
        );

        session.login("  admin \n", "password").await.unwrap();
        assert!(session.is_authenticated().await);
    }

    #[tokio::test]
    async fn restore_reads_the_mirrored_copy() {
        let payload = serde_json::to_string(&admin()).unwrap();
        let mut store = MockSessionStore::new();
        store
            .expect_get()
            .withf(|k| k == AUTHENTICATED_KEY)
            .returning(|_| Ok(Some("true".into())));
        store
            .expect_get()
            .withf(|k| k == CURRENT_USER_KEY)
            .returning(move |_| Ok(Some(payload.clone())));
        let session = SessionController::new(
            Arc::new(MockIdentityProvider::new()),
            Arc::new(MockUserRepo::new()),
            Arc::new(store),
        );

        assert!(session.restore_session().await);
        assert!(session.is_authenticated().await);
        assert_eq!(session.current_user().await.unwrap().username, "admin");
    }

    #[tokio::test]
    async fn restore_without_flag_fails() {
        let mut store = MockSessionStore::new();
        store.expect_get().returning(|_| Ok(None));
        let session = SessionController::new(
            Arc::new(MockIdentityProvider::new()),
            Arc::new(MockUserRepo::new()),
            Arc::new(store),
        );
        assert!(!session.restore_session().await);
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn provider_callback_drives_state() {
        let session = SessionController::new(
            Arc::new(MockIdentityProvider::new()),
            Arc::new(MockUserRepo::new()),
            Arc::new(permissive_store()),
        );
        let mut rx = session.events().subscribe();

        session.on_provider_state_change(Some(admin())).await;
        assert!(session.is_authenticated().await);
        session.on_provider_state_change(None).await;
        assert!(!session.is_authenticated().await);

        assert!(rx.recv().await.unwrap().is_authenticated);
        assert!(!rx.recv().await.unwrap().is_authenticated);
    }

    #[tokio::test]
    async fn settings_update_requires_session_and_updates_display_name() {
        let mut users = MockUserRepo::new();
        users.expect_update_settings().returning(|_, _| Ok(None));
        let mut identity = MockIdentityProvider::new();
        identity.expect_sign_out().returning(|_| Ok(()));
        let session =
            SessionController::new(Arc::new(identity), Arc::new(users), Arc::new(permissive_store()));
        let patch = SettingsPatch {
            anonymous_mode: Some(false),
            ..Default::default()
        };

        assert!(session.update_settings(patch.clone()).await.is_err());
        session.on_provider_state_change(Some(admin())).await;
        assert_eq!(session.display_name().await, ANONYMOUS_DISPLAY_NAME);
        session.update_settings(patch).await.unwrap();
        assert_eq!(session.display_name().await, "admin");

        session.logout().await.unwrap();
        assert_eq!(session.state().await, SessionState::Anonymous);
    }
}

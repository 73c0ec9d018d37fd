//! # Ports
//!
//! Any adapter must implement these traits to be wired into the services.
//! They stand in for the hosted document store, the identity provider and
//! the client's local persistent storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Comment, Complaint, LikeOutcome, Registration, SettingsPatch, User, UserActivity,
};

/// Persistence contract for complaints and their comments.
///
/// `toggle_like` and `attach_comment` are read-modify-write sequences and
/// must be atomic per complaint: concurrent callers may not lose updates.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ComplaintRepo: Send + Sync {
    // Complaint operations
    async fn insert_complaint(&self, complaint: Complaint) -> Result<()>;
    async fn get_complaint(&self, id: Uuid) -> Result<Option<Complaint>>;
    /// Full collection, oldest first.
    async fn list_complaints(&self) -> Result<Vec<Complaint>>;
    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<LikeOutcome>;

    // Comment operations
    /// Stores `comment` and appends its id to the parent complaint.
    async fn attach_comment(&self, comment: Comment) -> Result<()>;
    /// Comments of one complaint, oldest first.
    async fn list_comments(&self, complaint_id: Uuid) -> Result<Vec<Comment>>;
    async fn count_comments(&self) -> Result<usize>;
}

/// User profile storage.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Fails with `Conflict` when the e-mail is already registered.
    async fn insert_user(&self, user: User) -> Result<()>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>>;
    /// Looks a user up by e-mail (case-insensitive) or exact username.
    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>>;
    /// Returns `false` when the user does not exist.
    async fn apply_activity(&self, id: Uuid, activity: UserActivity) -> Result<bool>;
    async fn update_settings(&self, id: Uuid, patch: SettingsPatch) -> Result<Option<User>>;
}

/// Password hash storage for the credential-backed identity provider.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CredentialRepo: Send + Sync {
    async fn set_password_hash(&self, user_id: Uuid, hash: String) -> Result<()>;
    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>>;
}

/// Identity contract: who is this, and may they sign in.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// `identifier` is a username or an e-mail, depending on the provider.
    async fn sign_in(&self, identifier: &str, password: &str) -> Result<User>;
    async fn sign_up(&self, registration: Registration) -> Result<User>;
    async fn sign_out(&self, user_id: Uuid) -> Result<()>;
    fn name(&self) -> &'static str;
}

/// Client-side key/value persistence (the browser's local storage).
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub token: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub user_id: Uuid,
    pub username: String,
    pub token_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Bearer token minting and verification for the HTTP API.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, user: &User) -> Result<IssuedToken>;
    /// Fails with `Unauthorized` on a bad signature or an expired token.
    fn verify(&self, token: &str) -> Result<TokenClaims>;
}

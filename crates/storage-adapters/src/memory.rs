//! # In-memory stores
//!
//! `DashMap`-backed implementations of the repository ports. Read-modify-write
//! operations run while holding the entry's write guard, so concurrent
//! toggles on one complaint serialize instead of losing updates.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use domains::{
    Comment, Complaint, ComplaintRepo, CredentialRepo, DomainError, LikeOutcome, Result,
    SettingsPatch, User, UserActivity, UserRepo,
};

#[derive(Default)]
pub struct MemoryComplaintRepo {
    complaints: DashMap<Uuid, Complaint>,
    comments: DashMap<Uuid, Comment>,
}

impl MemoryComplaintRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ComplaintRepo for MemoryComplaintRepo {
    async fn insert_complaint(&self, complaint: Complaint) -> Result<()> {
        match self.complaints.entry(complaint.id) {
            Entry::Occupied(_) => Err(DomainError::Conflict(format!(
                "la denuncia {} ya existe",
                complaint.id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(complaint);
                Ok(())
            }
        }
    }

    async fn get_complaint(&self, id: Uuid) -> Result<Option<Complaint>> {
        Ok(self.complaints.get(&id).map(|c| c.value().clone()))
    }

    async fn list_complaints(&self) -> Result<Vec<Complaint>> {
        let mut all: Vec<Complaint> = self.complaints.iter().map(|c| c.value().clone()).collect();
        all.sort_by_key(|c| c.created_at);
        Ok(all)
    }

    async fn toggle_like(&self, id: Uuid, user_id: Uuid) -> Result<LikeOutcome> {
        let mut complaint = self
            .complaints
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("la denuncia", id))?;
        Ok(complaint.toggle_like(user_id))
    }

    async fn attach_comment(&self, comment: Comment) -> Result<()> {
        let mut complaint = self
            .complaints
            .get_mut(&comment.complaint_id)
            .ok_or_else(|| DomainError::not_found("la denuncia", comment.complaint_id))?;
        complaint.attach_comment(comment.id);
        self.comments.insert(comment.id, comment);
        Ok(())
    }

    async fn list_comments(&self, complaint_id: Uuid) -> Result<Vec<Comment>> {
        let mut comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|c| c.complaint_id == complaint_id)
            .map(|c| c.value().clone())
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn count_comments(&self) -> Result<usize> {
        Ok(self.comments.len())
    }
}

/// Profiles keyed by id, with a lowercase e-mail index and an exact username
/// index, both unique.
#[derive(Default)]
pub struct MemoryUserRepo {
    users: DashMap<Uuid, User>,
    emails: DashMap<String, Uuid>,
    usernames: DashMap<String, Uuid>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert_user(&self, user: User) -> Result<()> {
        // Lock order is emails, then usernames, then users.
        let Entry::Vacant(email_slot) = self.emails.entry(user.email.to_lowercase()) else {
            return Err(DomainError::Conflict(
                "El email ya está registrado".to_string(),
            ));
        };
        let Entry::Vacant(username_slot) = self.usernames.entry(user.username.clone()) else {
            return Err(DomainError::Conflict(
                "El nombre de usuario ya está en uso".to_string(),
            ));
        };
        email_slot.insert(user.id);
        username_slot.insert(user.id);
        self.users.insert(user.id, user);
        Ok(())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_login(&self, identifier: &str) -> Result<Option<User>> {
        let id = self
            .emails
            .get(&identifier.to_lowercase())
            .or_else(|| self.usernames.get(identifier))
            .map(|id| *id.value());
        Ok(id.and_then(|id| self.users.get(&id).map(|u| u.value().clone())))
    }

    async fn apply_activity(&self, id: Uuid, activity: UserActivity) -> Result<bool> {
        match self.users.get_mut(&id) {
            Some(mut user) => {
                user.apply(activity);
                Ok(true)
            }
            None => {
                debug!(user_id = %id, ?activity, "activity for unknown user");
                Ok(false)
            }
        }
    }

    async fn update_settings(&self, id: Uuid, patch: SettingsPatch) -> Result<Option<User>> {
        Ok(self.users.get_mut(&id).map(|mut user| {
            user.update_settings(patch);
            user.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryCredentialRepo {
    hashes: DashMap<Uuid, String>,
}

impl MemoryCredentialRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialRepo for MemoryCredentialRepo {
    async fn set_password_hash(&self, user_id: Uuid, hash: String) -> Result<()> {
        self.hashes.insert(user_id, hash);
        Ok(())
    }

    async fn password_hash(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self.hashes.get(&user_id).map(|h| h.value().clone()))
    }
}

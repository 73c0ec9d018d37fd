//! # ComplaintService
//!
//! The complaint controller: listing, creation, likes, comments, search and
//! statistics over a [`ComplaintRepo`]. Mutations publish a
//! [`ComplaintEvent`] and update the acting user's activity lists.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use domains::{
    Caller, Category, Comment, Complaint, ComplaintDraft, ComplaintOrder, ComplaintRepo,
    DomainError, LikeOutcome, Result, UserActivity, UserRepo,
};

use crate::events::{ComplaintEvent, EventBus};

pub const DEFAULT_HIGHLIGHT_LIMIT: usize = 5;

/// Aggregate counters for the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintStats {
    #[serde(rename = "totalDenuncias")]
    pub total_complaints: usize,
    #[serde(rename = "totalComentarios")]
    pub total_comments: usize,
    #[serde(rename = "totalLikes")]
    pub total_likes: u64,
    /// Every category is present, zero when unused.
    #[serde(rename = "categorias")]
    pub by_category: BTreeMap<String, usize>,
}

pub struct ComplaintService {
    repo: Arc<dyn ComplaintRepo>,
    users: Arc<dyn UserRepo>,
    events: EventBus<ComplaintEvent>,
}

fn require<'a>(caller: Option<&'a Caller>, message: &str) -> Result<&'a Caller> {
    caller.ok_or_else(|| DomainError::Unauthorized(message.to_string()))
}

impl ComplaintService {
    pub fn new(repo: Arc<dyn ComplaintRepo>, users: Arc<dyn UserRepo>) -> Self {
        Self {
            repo,
            users,
            events: EventBus::default(),
        }
    }

    pub fn events(&self) -> &EventBus<ComplaintEvent> {
        &self.events
    }

    pub async fn list_all(&self) -> Result<Vec<Complaint>> {
        self.repo.list_complaints().await
    }

    /// Whole collection sorted descending by `order`.
    pub async fn list(&self, order: ComplaintOrder) -> Result<Vec<Complaint>> {
        let mut complaints = self.repo.list_complaints().await?;
        order.sort(&mut complaints);
        Ok(complaints)
    }

    pub async fn by_category(&self, category: Category) -> Result<Vec<Complaint>> {
        let complaints = self.repo.list_complaints().await?;
        Ok(complaints
            .into_iter()
            .filter(|c| c.category == category)
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Complaint>> {
        self.repo.get_complaint(id).await
    }

    async fn get_existing(&self, id: Uuid) -> Result<Complaint> {
        self.repo
            .get_complaint(id)
            .await?
            .ok_or_else(|| DomainError::not_found("la denuncia", id))
    }

    #[instrument(skip(self, caller, draft), fields(user = ?caller.map(|c| c.user_id)))]
    pub async fn create(&self, caller: Option<&Caller>, draft: ComplaintDraft) -> Result<Complaint> {
        let caller = require(caller, "Se debe de estar autenticado para crear una denuncia")?;
        let complaint = draft.into_complaint(caller.user_id, Utc::now())?;

        self.repo.insert_complaint(complaint.clone()).await?;
        info!(complaint_id = %complaint.id, category = %complaint.category, "complaint created");

        self.record(caller.user_id, UserActivity::Created(complaint.id)).await;
        self.events.publish(ComplaintEvent::Created(complaint.clone()));
        Ok(complaint)
    }

    #[instrument(skip(self, caller), fields(user = ?caller.map(|c| c.user_id)))]
    pub async fn toggle_like(&self, caller: Option<&Caller>, id: Uuid) -> Result<LikeOutcome> {
        let caller = require(caller, "Se debe de estar autenticado para dar like")?;
        let outcome = self.repo.toggle_like(id, caller.user_id).await?;
        info!(complaint_id = %id, liked = outcome.liked, likes = outcome.likes, "like toggled");

        let activity = if outcome.liked {
            UserActivity::Liked(id)
        } else {
            UserActivity::Unliked(id)
        };
        self.record(caller.user_id, activity).await;
        self.events.publish(ComplaintEvent::LikeToggled {
            complaint_id: id,
            user_id: caller.user_id,
            outcome,
        });
        Ok(outcome)
    }

    #[instrument(skip(self, caller, content), fields(user = ?caller.map(|c| c.user_id)))]
    pub async fn add_comment(
        &self,
        caller: Option<&Caller>,
        complaint_id: Uuid,
        content: &str,
    ) -> Result<Comment> {
        let caller = require(caller, "Debe estar autenticado para comentar")?;
        self.get_existing(complaint_id).await?;

        let comment = Comment::new(complaint_id, caller.user_id, content, Utc::now())?;
        self.repo.attach_comment(comment.clone()).await?;
        info!(%complaint_id, comment_id = %comment.id, "comment added");

        self.record(caller.user_id, UserActivity::Commented(comment.id)).await;
        self.events.publish(ComplaintEvent::CommentAdded {
            complaint_id,
            comment_id: comment.id,
        });
        Ok(comment)
    }

    pub async fn comments_for(&self, complaint_id: Uuid) -> Result<Vec<Comment>> {
        self.repo.list_comments(complaint_id).await
    }

    pub fn categories(&self) -> &'static [Category] {
        &Category::ALL
    }

    pub async fn stats(&self) -> Result<ComplaintStats> {
        let complaints = self.repo.list_complaints().await?;
        let total_comments = self.repo.count_comments().await?;

        let mut by_category: BTreeMap<String, usize> = Category::ALL
            .iter()
            .map(|c| (c.as_str().to_string(), 0))
            .collect();
        for complaint in &complaints {
            *by_category
                .entry(complaint.category.as_str().to_string())
                .or_default() += 1;
        }

        Ok(ComplaintStats {
            total_complaints: complaints.len(),
            total_comments,
            total_likes: complaints.iter().map(|c| u64::from(c.likes)).sum(),
            by_category,
        })
    }

    /// Full-collection scan; fine at demo scale.
    pub async fn search(&self, term: &str) -> Result<Vec<Complaint>> {
        let complaints = self.repo.list_complaints().await?;
        Ok(complaints.into_iter().filter(|c| c.matches(term)).collect())
    }

    pub async fn recent(&self, limit: usize) -> Result<Vec<Complaint>> {
        let mut complaints = self.list(ComplaintOrder::Date).await?;
        complaints.truncate(limit);
        Ok(complaints)
    }

    pub async fn popular(&self, limit: usize) -> Result<Vec<Complaint>> {
        let mut complaints = self.list(ComplaintOrder::Likes).await?;
        complaints.truncate(limit);
        Ok(complaints)
    }

    /// Complaints authored by the caller; empty when anonymous.
    pub async fn mine(&self, caller: Option<&Caller>) -> Result<Vec<Complaint>> {
        let Some(caller) = caller else {
            return Ok(Vec::new());
        };
        let complaints = self.repo.list_complaints().await?;
        Ok(complaints
            .into_iter()
            .filter(|c| c.author_id == caller.user_id)
            .collect())
    }

    pub async fn liked_by(&self, caller: Option<&Caller>) -> Result<Vec<Complaint>> {
        let Some(caller) = caller else {
            return Ok(Vec::new());
        };
        let complaints = self.repo.list_complaints().await?;
        Ok(complaints
            .into_iter()
            .filter(|c| c.has_liked(caller.user_id))
            .collect())
    }

    pub async fn has_liked(&self, caller: Option<&Caller>, id: Uuid) -> Result<bool> {
        let Some(caller) = caller else {
            return Ok(false);
        };
        Ok(self
            .repo
            .get_complaint(id)
            .await?
            .is_some_and(|c| c.has_liked(caller.user_id)))
    }

    /// Acknowledges a report. There is no moderation queue behind it yet.
    #[instrument(skip(self, caller, reason), fields(user = ?caller.map(|c| c.user_id)))]
    pub async fn report(&self, caller: Option<&Caller>, id: Uuid, reason: &str) -> Result<()> {
        require(caller, "Debe estar autenticado para reportar")?;
        self.get_existing(id).await?;
        warn!(complaint_id = %id, reason, "complaint reported");
        self.events.publish(ComplaintEvent::Reported {
            complaint_id: id,
            reason: reason.to_string(),
        });
        Ok(())
    }

    /// Best effort: no referential integrity between users and complaints.
    async fn record(&self, user_id: Uuid, activity: UserActivity) {
        match self.users.apply_activity(user_id, activity).await {
            Ok(true) => {}
            Ok(false) => debug!(%user_id, "no profile for acting user; activity not recorded"),
            Err(e) => warn!(%user_id, error = %e, "failed to record user activity"),
        }
    }
}

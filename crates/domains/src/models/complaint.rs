use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Category;
use crate::error::{DomainError, Result};
use crate::time;
use crate::validation::{char_len, DESCRIPTION_MAX, DESCRIPTION_MIN, TITLE_MAX, TITLE_MIN};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ComplaintStatus {
    #[default]
    #[serde(rename = "activa")]
    Active,
    #[serde(rename = "cerrada")]
    Closed,
    #[serde(rename = "en_revision")]
    InReview,
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplaintStatus::Active => "activa",
            ComplaintStatus::Closed => "cerrada",
            ComplaintStatus::InReview => "en_revision",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "activa" => Some(ComplaintStatus::Active),
            "cerrada" => Some(ComplaintStatus::Closed),
            "en_revision" => Some(ComplaintStatus::InReview),
            _ => None,
        }
    }
}

/// A user-submitted complaint ("denuncia").
///
/// Field names on the wire follow the legacy `denuncias` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: Uuid,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descripcion")]
    pub description: String,
    #[serde(rename = "categoria")]
    pub category: Category,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "usuarioId")]
    pub author_id: Uuid,
    pub likes: u32,
    /// Ids of the users currently liking this complaint
    #[serde(rename = "usuariosQueDieronLike", default)]
    pub liked_by: Vec<Uuid>,
    #[serde(rename = "comentarios", default)]
    pub comment_ids: Vec<Uuid>,
    #[serde(rename = "anonimo", default = "default_true")]
    pub anonymous: bool,
    #[serde(rename = "estado", default)]
    pub status: ComplaintStatus,
}

pub(super) fn default_true() -> bool {
    true
}

/// Result of a like toggle, as returned to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeOutcome {
    pub liked: bool,
    pub likes: u32,
}

impl Complaint {
    pub fn add_like(&mut self) {
        self.likes += 1;
    }

    /// Never drops below zero.
    pub fn remove_like(&mut self) {
        self.likes = self.likes.saturating_sub(1);
    }

    pub fn has_liked(&self, user_id: Uuid) -> bool {
        self.liked_by.contains(&user_id)
    }

    /// Flips `user_id` membership in the liker list and moves the counter
    /// with it.
    pub fn toggle_like(&mut self, user_id: Uuid) -> LikeOutcome {
        if self.has_liked(user_id) {
            self.liked_by.retain(|u| *u != user_id);
            self.remove_like();
            LikeOutcome {
                liked: false,
                likes: self.likes,
            }
        } else {
            self.liked_by.push(user_id);
            self.add_like();
            LikeOutcome {
                liked: true,
                likes: self.likes,
            }
        }
    }

    pub fn attach_comment(&mut self, comment_id: Uuid) {
        if !self.comment_ids.contains(&comment_id) {
            self.comment_ids.push(comment_id);
        }
    }

    pub fn formatted_date(&self) -> String {
        time::format_date_time(&self.created_at)
    }

    pub fn category_color(&self) -> &'static str {
        self.category.color()
    }

    /// Re-checks the text rules on an already built complaint.
    pub fn validate(&self) -> Vec<String> {
        text_errors(&self.title, &self.description)
    }

    /// Case-insensitive substring match on title or description.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.title.to_lowercase().contains(&term) || self.description.to_lowercase().contains(&term)
    }
}

fn text_errors(title: &str, description: &str) -> Vec<String> {
    let mut errors = Vec::new();

    let title_len = char_len(title.trim());
    if title_len < TITLE_MIN {
        errors.push(format!("El título debe tener al menos {TITLE_MIN} caracteres"));
    } else if title_len > TITLE_MAX {
        errors.push(format!("El título no puede tener más de {TITLE_MAX} caracteres"));
    }

    let description_len = char_len(description.trim());
    if description_len < DESCRIPTION_MIN {
        errors.push(format!(
            "La descripción debe tener al menos {DESCRIPTION_MIN} caracteres"
        ));
    } else if description_len > DESCRIPTION_MAX {
        errors.push(format!(
            "La descripción no puede tener más de {DESCRIPTION_MAX} caracteres"
        ));
    }

    errors
}

/// Form data for a new complaint, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplaintDraft {
    #[serde(rename = "titulo", default)]
    pub title: String,
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(rename = "categoria", default)]
    pub category: Option<String>,
}

impl ComplaintDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>, category: Category) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: Some(category.as_str().to_string()),
        }
    }

    fn parsed_category(&self) -> std::result::Result<Category, String> {
        match self.category.as_deref().map(str::trim) {
            None | Some("") => Err("Debe seleccionar una categoría".to_string()),
            Some(raw) => raw.parse::<Category>().map_err(|e| e.to_string()),
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = text_errors(&self.title, &self.description);
        if let Err(e) = self.parsed_category() {
            errors.push(e);
        }
        errors
    }

    /// Builds a fresh complaint: no likes, no likers, no comments.
    pub fn into_complaint(self, author_id: Uuid, now: DateTime<Utc>) -> Result<Complaint> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(DomainError::Validation(errors));
        }
        let category = self.parsed_category().map_err(|e| DomainError::Validation(vec![e]))?;

        Ok(Complaint {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            category,
            created_at: now,
            author_id,
            likes: 0,
            liked_by: Vec::new(),
            comment_ids: Vec::new(),
            anonymous: true,
            status: ComplaintStatus::Active,
        })
    }
}

/// Sort key for complaint listings. Always descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintOrder {
    #[default]
    Likes,
    #[serde(rename = "fecha")]
    Date,
    #[serde(rename = "comentarios")]
    Comments,
}

impl FromStr for ComplaintOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "likes" | "votos" => Ok(ComplaintOrder::Likes),
            "fecha" | "fechacreacion" | "date" => Ok(ComplaintOrder::Date),
            "comentarios" | "comments" => Ok(ComplaintOrder::Comments),
            other => Err(DomainError::Validation(vec![format!(
                "Criterio de orden no válido: {other}"
            )])),
        }
    }
}

impl ComplaintOrder {
    fn compare(&self, a: &Complaint, b: &Complaint) -> Ordering {
        let primary = match self {
            ComplaintOrder::Likes => b.likes.cmp(&a.likes),
            ComplaintOrder::Date => b.created_at.cmp(&a.created_at),
            ComplaintOrder::Comments => b.comment_ids.len().cmp(&a.comment_ids.len()),
        };
        // Newest first on ties.
        primary.then_with(|| b.created_at.cmp(&a.created_at))
    }

    pub fn sort(&self, complaints: &mut [Complaint]) {
        complaints.sort_by(|a, b| self.compare(a, b));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::complaint::default_true;
use crate::error::{DomainError, Result};
use crate::time;
use crate::validation::{char_len, COMMENT_MAX, COMMENT_MIN};

const OFFENSIVE_WORDS: [&str; 4] = ["spam", "fake", "mentira", "falso"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CommentStatus {
    #[default]
    #[serde(rename = "activo")]
    Active,
    #[serde(rename = "inactivo")]
    Inactive,
    #[serde(rename = "reportado")]
    Reported,
    #[serde(rename = "eliminado")]
    Deleted,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Active => "activo",
            CommentStatus::Inactive => "inactivo",
            CommentStatus::Reported => "reportado",
            CommentStatus::Deleted => "eliminado",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "activo" => Some(CommentStatus::Active),
            "inactivo" => Some(CommentStatus::Inactive),
            "reportado" => Some(CommentStatus::Reported),
            "eliminado" => Some(CommentStatus::Deleted),
            _ => None,
        }
    }
}

/// A comment attached to a complaint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    #[serde(rename = "denunciaId")]
    pub complaint_id: Uuid,
    #[serde(rename = "usuarioId")]
    pub author_id: Uuid,
    #[serde(rename = "contenido")]
    pub content: String,
    #[serde(rename = "fechaCreacion")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub likes: u32,
    #[serde(rename = "respuestas", default)]
    pub replies: Vec<Uuid>,
    /// Threading is declared by the data model but no operation sets it.
    #[serde(rename = "comentarioPadreId", default)]
    pub parent_id: Option<Uuid>,
    #[serde(rename = "anonimo", default = "default_true")]
    pub anonymous: bool,
    #[serde(rename = "estado", default)]
    pub status: CommentStatus,
}

impl Comment {
    /// Builds and validates a top-level comment.
    pub fn new(
        complaint_id: Uuid,
        author_id: Uuid,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let comment = Self {
            id: Uuid::new_v4(),
            complaint_id,
            author_id,
            content: content.into(),
            created_at: now,
            likes: 0,
            replies: Vec::new(),
            parent_id: None,
            anonymous: true,
            status: CommentStatus::Active,
        };
        let errors = comment.validate();
        if errors.is_empty() {
            Ok(comment)
        } else {
            Err(DomainError::Validation(errors))
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if char_len(self.content.trim()) < COMMENT_MIN {
            errors.push("El comentario no puede estar vacío".to_string());
        }
        if char_len(&self.content) > COMMENT_MAX {
            errors.push(format!(
                "El comentario no puede tener más de {COMMENT_MAX} caracteres"
            ));
        }
        if self.complaint_id.is_nil() {
            errors.push("El comentario debe estar asociado a una denuncia".to_string());
        }
        if self.author_id.is_nil() {
            errors.push("El comentario debe tener un usuario asociado".to_string());
        }
        errors
    }

    pub fn add_like(&mut self) {
        self.likes += 1;
    }

    pub fn remove_like(&mut self) {
        self.likes = self.likes.saturating_sub(1);
    }

    pub fn add_reply(&mut self, reply_id: Uuid) {
        if !self.replies.contains(&reply_id) {
            self.replies.push(reply_id);
        }
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Content cut to `limit` characters with a trailing `...`.
    pub fn truncated(&self, limit: usize) -> String {
        if char_len(&self.content) <= limit {
            return self.content.clone();
        }
        let mut cut: String = self.content.chars().take(limit).collect();
        cut.push_str("...");
        cut
    }

    pub fn has_offensive_content(&self) -> bool {
        let lower = self.content.to_lowercase();
        OFFENSIVE_WORDS.iter().any(|w| lower.contains(w))
    }

    pub fn mark_inactive(&mut self) {
        self.status = CommentStatus::Inactive;
    }

    pub fn activate(&mut self) {
        self.status = CommentStatus::Active;
    }

    pub fn relative_time(&self, now: &DateTime<Utc>) -> String {
        time::relative_time(&self.created_at, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(content: &str) -> Result<Comment> {
        Comment::new(Uuid::new_v4(), Uuid::new_v4(), content, Utc::now())
    }

    #[test]
    fn content_length_boundaries() {
        assert!(comment(&"a".repeat(500)).is_ok());
        let err = comment(&"a".repeat(501)).unwrap_err();
        assert!(err.errores()[0].contains("500"));
        assert!(comment("   ").is_err());
        assert!(comment("a").is_ok());
    }

    #[test]
    fn requires_owner_and_parent() {
        let err = Comment::new(Uuid::nil(), Uuid::nil(), "hola", Utc::now()).unwrap_err();
        assert_eq!(err.errores().len(), 2);
    }

    #[test]
    fn likes_never_go_negative() {
        let mut c = comment("hola").unwrap();
        c.remove_like();
        assert_eq!(c.likes, 0);
        c.add_like();
        c.add_like();
        c.remove_like();
        assert_eq!(c.likes, 1);
    }

    #[test]
    fn replies_are_deduplicated() {
        let mut c = comment("hola").unwrap();
        let reply = Uuid::new_v4();
        c.add_reply(reply);
        c.add_reply(reply);
        assert_eq!(c.replies, vec![reply]);
        assert!(c.is_top_level());
        assert!(!c.is_reply());
    }

    #[test]
    fn truncation_and_moderation_helpers() {
        let mut c = comment("Esto es totalmente FALSO y lo sabemos").unwrap();
        assert_eq!(c.truncated(4), "Esto...");
        assert_eq!(c.truncated(100), c.content);
        assert!(c.has_offensive_content());
        c.mark_inactive();
        assert_eq!(c.status, CommentStatus::Inactive);
        c.activate();
        assert_eq!(c.status, CommentStatus::Active);
    }

    #[test]
    fn stored_comments_without_the_flag_stay_anonymous() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "denunciaId": Uuid::new_v4(),
            "usuarioId": Uuid::new_v4(),
            "contenido": "Sigue igual",
            "fechaCreacion": "2024-01-15T10:30:00Z",
        });
        let c: Comment = serde_json::from_value(json).unwrap();
        assert!(c.anonymous);
        assert_eq!(c.status, CommentStatus::Active);
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::time;
use crate::validation::{char_len, is_valid_email, PASSWORD_MIN, USERNAME_MIN};

pub const ANONYMOUS_DISPLAY_NAME: &str = "Usuario Anónimo";

/// Per-user preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(rename = "notificaciones")]
    pub notifications: bool,
    #[serde(rename = "mostrarPerfil")]
    pub public_profile: bool,
    #[serde(rename = "modoAnonimo")]
    pub anonymous_mode: bool,
    #[serde(rename = "tema", default = "default_theme")]
    pub theme: String,
    #[serde(rename = "idioma", default = "default_language")]
    pub language: String,
}

fn default_theme() -> String {
    "light".to_string()
}

fn default_language() -> String {
    "es".to_string()
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            public_profile: false,
            anonymous_mode: true,
            theme: default_theme(),
            language: default_language(),
        }
    }
}

/// Partial settings update; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(rename = "notificaciones", default)]
    pub notifications: Option<bool>,
    #[serde(rename = "mostrarPerfil", default)]
    pub public_profile: Option<bool>,
    #[serde(rename = "modoAnonimo", default)]
    pub anonymous_mode: Option<bool>,
    #[serde(rename = "tema", default)]
    pub theme: Option<String>,
    #[serde(rename = "idioma", default)]
    pub language: Option<String>,
}

impl UserSettings {
    pub fn merge(&mut self, patch: SettingsPatch) {
        if let Some(v) = patch.notifications {
            self.notifications = v;
        }
        if let Some(v) = patch.public_profile {
            self.public_profile = v;
        }
        if let Some(v) = patch.anonymous_mode {
            self.anonymous_mode = v;
        }
        if let Some(v) = patch.theme {
            self.theme = v;
        }
        if let Some(v) = patch.language {
            self.language = v;
        }
    }
}

/// A registered user and their activity lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(rename = "fechaRegistro")]
    pub registered_at: DateTime<Utc>,
    #[serde(rename = "denunciasCreadas", default)]
    pub created_complaints: Vec<Uuid>,
    #[serde(rename = "denunciasLikadas", default)]
    pub liked_complaints: Vec<Uuid>,
    #[serde(rename = "comentarios", default)]
    pub comments: Vec<Uuid>,
    #[serde(rename = "configuraciones", default)]
    pub settings: UserSettings,
}

/// Activity counters shown on the profile page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    #[serde(rename = "denunciasCreadas")]
    pub created_complaints: usize,
    #[serde(rename = "denunciasLikadas")]
    pub liked_complaints: usize,
    #[serde(rename = "comentarios")]
    pub comments: usize,
    #[serde(rename = "fechaRegistro")]
    pub registered: String,
}

/// Bookkeeping applied to the acting user after a complaint mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserActivity {
    Created(Uuid),
    Liked(Uuid),
    Unliked(Uuid),
    Commented(Uuid),
}

impl User {
    pub fn new(username: impl Into<String>, email: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            registered_at: now,
            created_complaints: Vec::new(),
            liked_complaints: Vec::new(),
            comments: Vec::new(),
            settings: UserSettings::default(),
        }
    }

    pub fn add_created(&mut self, complaint_id: Uuid) {
        if !self.created_complaints.contains(&complaint_id) {
            self.created_complaints.push(complaint_id);
        }
    }

    /// Returns `true` when the like was added, `false` when removed.
    pub fn toggle_liked(&mut self, complaint_id: Uuid) -> bool {
        if let Some(pos) = self.liked_complaints.iter().position(|c| *c == complaint_id) {
            self.liked_complaints.remove(pos);
            false
        } else {
            self.liked_complaints.push(complaint_id);
            true
        }
    }

    pub fn has_liked(&self, complaint_id: Uuid) -> bool {
        self.liked_complaints.contains(&complaint_id)
    }

    pub fn add_comment(&mut self, comment_id: Uuid) {
        if !self.comments.contains(&comment_id) {
            self.comments.push(comment_id);
        }
    }

    pub fn apply(&mut self, activity: UserActivity) {
        match activity {
            UserActivity::Created(id) => self.add_created(id),
            UserActivity::Liked(id) => {
                if !self.has_liked(id) {
                    self.liked_complaints.push(id);
                }
            }
            UserActivity::Unliked(id) => self.liked_complaints.retain(|c| *c != id),
            UserActivity::Commented(id) => self.add_comment(id),
        }
    }

    pub fn stats(&self) -> UserStats {
        UserStats {
            created_complaints: self.created_complaints.len(),
            liked_complaints: self.liked_complaints.len(),
            comments: self.comments.len(),
            registered: time::format_date(&self.registered_at),
        }
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.settings.merge(patch);
    }

    pub fn display_name(&self) -> &str {
        if self.settings.anonymous_mode {
            ANONYMOUS_DISPLAY_NAME
        } else {
            &self.username
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if char_len(self.username.trim()) < USERNAME_MIN {
            errors.push(format!(
                "El nombre de usuario debe tener al menos {USERNAME_MIN} caracteres"
            ));
        }
        if !is_valid_email(&self.email) {
            errors.push("Debe proporcionar un email válido".to_string());
        }
        errors
    }

    pub fn caller(&self) -> Caller {
        Caller {
            user_id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Sign-up form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub username: String,
}

impl Registration {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if char_len(&self.username) < USERNAME_MIN {
            errors.push(format!(
                "El nombre de usuario debe tener al menos {USERNAME_MIN} caracteres"
            ));
        }
        if !is_valid_email(&self.email) {
            errors.push("Email inválido".to_string());
        }
        if char_len(&self.password) < PASSWORD_MIN {
            errors.push(format!(
                "La contraseña debe tener al menos {PASSWORD_MIN} caracteres"
            ));
        }
        errors
    }
}

/// The authenticated identity behind a request or session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: Uuid,
    pub username: String,
}

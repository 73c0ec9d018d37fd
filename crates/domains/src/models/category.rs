use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of complaint categories, serialized by display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Seguridad")]
    Security,
    #[serde(rename = "Infraestructura")]
    Infrastructure,
    #[serde(rename = "Medio Ambiente")]
    Environment,
    #[serde(rename = "Servicios Públicos")]
    PublicServices,
    #[serde(rename = "Transporte")]
    Transport,
    #[serde(rename = "Salud")]
    Health,
    #[serde(rename = "Educación")]
    Education,
    #[serde(rename = "Otros")]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Security,
        Category::Infrastructure,
        Category::Environment,
        Category::PublicServices,
        Category::Transport,
        Category::Health,
        Category::Education,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Security => "Seguridad",
            Category::Infrastructure => "Infraestructura",
            Category::Environment => "Medio Ambiente",
            Category::PublicServices => "Servicios Públicos",
            Category::Transport => "Transporte",
            Category::Health => "Salud",
            Category::Education => "Educación",
            Category::Other => "Otros",
        }
    }

    /// Badge colour used by the UI.
    pub fn color(&self) -> &'static str {
        match self {
            Category::Security => "#ef4444",
            Category::Infrastructure => "#f59e0b",
            Category::Environment => "#10b981",
            Category::PublicServices => "#3b82f6",
            Category::Transport => "#8b5cf6",
            Category::Health => "#06b6d4",
            Category::Education => "#84cc16",
            Category::Other => "#64748b",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Categoría no válida: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Matches display names case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().to_lowercase() == needle)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

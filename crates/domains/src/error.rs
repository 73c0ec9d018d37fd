//! # DomainError
//!
//! Centralized error handling for the complaint platform.
//! Every port and service returns this type; the HTTP layer maps it to the
//! `{success, message, errores}` envelope.

use thiserror::Error;

/// Rejection message shared by every identity provider.
pub const INVALID_CREDENTIALS: &str = "Usuario o contraseña incorrectos";

/// The primary error type for all domain operations.
///
/// Display strings are user facing (Spanish), since the API surfaces them
/// verbatim as the `message` field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Resource not found (e.g., Denuncia, Comentario, Usuario)
    #[error("no se encontró {entity} con id {id}")]
    NotFound { entity: &'static str, id: String },

    /// Validation failure; carries every failed rule.
    #[error("Errores de validación")]
    Validation(Vec<String>),

    /// Caller is anonymous or presented bad credentials
    #[error("{0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate e-mail)
    #[error("{0}")]
    Conflict(String),

    /// The configured adapter cannot perform the operation
    #[error("{0}")]
    Unsupported(String),

    /// Infrastructure failure (e.g., DB down, I/O error)
    #[error("error interno: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    /// The list of failed validation rules, empty for other variants.
    pub fn errores(&self) -> &[String] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

/// A specialized Result type for domain logic.
pub type Result<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = DomainError::not_found("la denuncia", "abc");
        assert_eq!(err.to_string(), "no se encontró la denuncia con id abc");
        assert!(err.errores().is_empty());
    }

    #[test]
    fn validation_exposes_rule_list() {
        let err = DomainError::Validation(vec!["uno".into(), "dos".into()]);
        assert_eq!(err.errores().len(), 2);
        assert_eq!(err.to_string(), "Errores de validación");
    }
}

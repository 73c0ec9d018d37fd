//! # ApiError
//!
//! Every failed request answers with the same envelope:
//! `{"success": false, "message": "...", "errores": [...]}`.
//! `errores` is only present for validation failures.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use domains::DomainError;

const INTERNAL_MESSAGE: &str = "Error interno del servidor";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The request could not be decoded (bad JSON, malformed id, bad query).
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errores: Option<Vec<String>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(e) => match e {
                DomainError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
                DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
                DomainError::Conflict(_) => StatusCode::CONFLICT,
                DomainError::Unsupported(_) => StatusCode::NOT_IMPLEMENTED,
                DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Rejected { status, .. } => *status,
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        ApiError::Domain(DomainError::Unauthorized(message.to_string()))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        let body = match self {
            ApiError::Domain(DomainError::Internal(detail)) => {
                error!(%detail, "request failed");
                ErrorBody {
                    success: false,
                    message: INTERNAL_MESSAGE.to_string(),
                    errores: None,
                }
            }
            ApiError::Domain(DomainError::Validation(errores)) => ErrorBody {
                success: false,
                message,
                errores: Some(errores),
            },
            _ => ErrorBody {
                success: false,
                message,
                errores: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

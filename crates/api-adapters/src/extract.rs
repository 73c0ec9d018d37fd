//! Bearer-token extractors.
//!
//! A request without an `Authorization` header is anonymous. A header that is
//! present but malformed, expired or revoked is rejected with 401 rather than
//! silently downgraded to anonymous.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use domains::Caller;

use crate::error::ApiError;
use crate::state::AppState;

pub const NOT_AUTHENTICATED: &str = "Usuario no autenticado";

fn bearer(parts: &Parts) -> Result<Option<String>, ApiError> {
    let Some(value) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::unauthorized("Cabecera Authorization no válida"))?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(Some(token.trim().to_string()))
        }
        _ => Err(ApiError::unauthorized("Cabecera Authorization no válida")),
    }
}

/// The raw bearer token; required.
pub struct BearerToken(pub String);

impl FromRequestParts<AppState> for BearerToken {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &AppState) -> Result<Self, ApiError> {
        bearer(parts)?
            .map(BearerToken)
            .ok_or_else(|| ApiError::unauthorized(NOT_AUTHENTICATED))
    }
}

/// The verified caller, or `None` for anonymous requests.
pub struct MaybeCaller(pub Option<Caller>);

impl MaybeCaller {
    pub fn caller(&self) -> Option<&Caller> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for MaybeCaller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        match bearer(parts)? {
            Some(token) => Ok(MaybeCaller(Some(state.auth.verify(&token).await?))),
            None => Ok(MaybeCaller(None)),
        }
    }
}

/// The verified caller; anonymous requests are rejected.
pub struct Authenticated(pub Caller);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;
        Ok(Authenticated(state.auth.verify(&token).await?))
    }
}

//! # Handlers
//!
//! Thin adapters between HTTP and the services: extract, call, wrap the
//! result in the `{success: true, ...}` envelope.

pub mod auth;
pub mod complaints;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use domains::DomainError;

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "identidad": state.auth.provider_name(),
    }))
}

pub async fn render_metrics(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let body = state.metrics.render().map_err(DomainError::internal)?;
    Ok(([(header::CONTENT_TYPE, metrics::CONTENT_TYPE)], body))
}

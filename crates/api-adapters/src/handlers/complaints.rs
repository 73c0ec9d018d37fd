//! Complaint, comment, category and statistics endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use domains::{Category, ComplaintDraft, ComplaintOrder, DomainError};
use services::DEFAULT_HIGHLIGHT_LIMIT;

use crate::error::ApiResult;
use crate::extract::MaybeCaller;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub orden: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NewComment {
    #[serde(rename = "contenido", default)]
    pub content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub motivo: String,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = query?;
    let order = match non_empty(params.orden.as_deref()) {
        Some(orden) => orden.parse::<ComplaintOrder>()?,
        None => ComplaintOrder::default(),
    };
    let mut denuncias = state.complaints.list(order).await?;
    if let Some(name) = non_empty(params.categoria.as_deref()) {
        let category: Category = name
            .parse()
            .map_err(|e: domains::UnknownCategory| DomainError::Validation(vec![e.to_string()]))?;
        denuncias.retain(|c| c.category == category);
    }
    Ok(Json(json!({
        "success": true,
        "total": denuncias.len(),
        "denuncias": denuncias,
    })))
}

pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = query?;
    let denuncias = state.complaints.search(&params.q).await?;
    debug!(term = %params.q, hits = denuncias.len(), "search");
    Ok(Json(json!({ "success": true, "denuncias": denuncias })))
}

pub async fn recent(
    State(state): State<AppState>,
    query: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = query?;
    let limit = params.limit.unwrap_or(DEFAULT_HIGHLIGHT_LIMIT);
    let denuncias = state.complaints.recent(limit).await?;
    Ok(Json(json!({ "success": true, "denuncias": denuncias })))
}

pub async fn popular(
    State(state): State<AppState>,
    query: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Json<Value>> {
    let Query(params) = query?;
    let limit = params.limit.unwrap_or(DEFAULT_HIGHLIGHT_LIMIT);
    let denuncias = state.complaints.popular(limit).await?;
    Ok(Json(json!({ "success": true, "denuncias": denuncias })))
}

pub async fn mine(State(state): State<AppState>, caller: MaybeCaller) -> ApiResult<Json<Value>> {
    let denuncias = state.complaints.mine(caller.caller()).await?;
    Ok(Json(json!({ "success": true, "denuncias": denuncias })))
}

pub async fn liked(State(state): State<AppState>, caller: MaybeCaller) -> ApiResult<Json<Value>> {
    let denuncias = state.complaints.liked_by(caller.caller()).await?;
    Ok(Json(json!({ "success": true, "denuncias": denuncias })))
}

pub async fn create(
    State(state): State<AppState>,
    caller: MaybeCaller,
    payload: Result<Json<ComplaintDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(draft) = payload?;
    let denuncia = state.complaints.create(caller.caller(), draft).await?;
    state.metrics.complaints_created.inc();
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Denuncia creada exitosamente",
            "denuncia": denuncia,
        })),
    ))
}

pub async fn get_one(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let denuncia = state
        .complaints
        .get(id)
        .await?
        .ok_or_else(|| DomainError::not_found("la denuncia", id))?;
    Ok(Json(json!({ "success": true, "denuncia": denuncia })))
}

pub async fn toggle_like(
    State(state): State<AppState>,
    caller: MaybeCaller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let outcome = state.complaints.toggle_like(caller.caller(), id).await?;
    state.metrics.likes_toggled.inc();
    let message = if outcome.liked {
        "Like agregado correctamente"
    } else {
        "Like eliminado"
    };
    Ok(Json(json!({
        "success": true,
        "message": message,
        "liked": outcome.liked,
        "likes": outcome.likes,
    })))
}

pub async fn has_liked(
    State(state): State<AppState>,
    caller: MaybeCaller,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let liked = state.complaints.has_liked(caller.caller(), id).await?;
    Ok(Json(json!({ "success": true, "liked": liked })))
}

pub async fn comments(
    State(state): State<AppState>,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    let comentarios = state.complaints.comments_for(id).await?;
    Ok(Json(json!({
        "success": true,
        "total": comentarios.len(),
        "comentarios": comentarios,
    })))
}

pub async fn add_comment(
    State(state): State<AppState>,
    caller: MaybeCaller,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<NewComment>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Path(id) = path?;
    let Json(body) = payload?;
    let comentario = state
        .complaints
        .add_comment(caller.caller(), id, &body.content)
        .await?;
    state.metrics.comments_added.inc();
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Comentario agregado exitosamente",
            "comentario": comentario,
        })),
    ))
}

pub async fn report(
    State(state): State<AppState>,
    caller: MaybeCaller,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Path(id) = path?;
    // The reason is optional; a request without a JSON body reports with none.
    let reason = match payload {
        Ok(Json(body)) => body.motivo,
        Err(JsonRejection::MissingJsonContentType(_)) => String::new(),
        Err(e) => return Err(e.into()),
    };
    state.complaints.report(caller.caller(), id, &reason).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Denuncia reportada exitosamente",
    })))
}

pub async fn categories(State(state): State<AppState>) -> Json<Value> {
    let categorias: Vec<Value> = state
        .complaints
        .categories()
        .iter()
        .map(|c| json!({ "nombre": c.as_str(), "color": c.color() }))
        .collect();
    Json(json!({ "success": true, "categorias": categorias }))
}

pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let estadisticas = state.complaints.stats().await?;
    Ok(Json(json!({ "success": true, "estadisticas": estadisticas })))
}

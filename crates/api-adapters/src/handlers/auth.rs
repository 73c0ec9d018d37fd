//! Registration, login, logout and the signed-in user's profile.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use domains::{Registration, SettingsPatch};
use services::AuthSession;

use crate::error::ApiResult;
use crate::extract::{Authenticated, BearerToken};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or e-mail, depending on the identity provider.
    #[serde(alias = "email", alias = "usuario", default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn session_body(message: &str, session: AuthSession) -> Value {
    json!({
        "success": true,
        "message": message,
        "user": session.user,
        "token": session.token.token,
        "expiraEn": session.token.expires_at,
    })
}

pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let Json(registration) = payload?;
    let session = state.auth.register(registration).await?;
    Ok((
        StatusCode::CREATED,
        Json(session_body("Usuario registrado exitosamente", session)),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    match state.auth.login(&request.username, &request.password).await {
        Ok(session) => Ok(Json(session_body("Inicio de sesión exitoso", session))),
        Err(e) => {
            state.metrics.failed_logins.inc();
            Err(e.into())
        }
    }
}

pub async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> ApiResult<Json<Value>> {
    state.auth.logout(&token).await?;
    Ok(Json(json!({ "success": true, "message": "Sesión cerrada" })))
}

pub async fn me(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<Value>> {
    let user = state.auth.current_user(&caller).await?;
    Ok(Json(json!({
        "success": true,
        "user": user,
        "displayName": user.display_name(),
    })))
}

pub async fn update_settings(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    payload: Result<Json<SettingsPatch>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(patch) = payload?;
    let user = state.auth.update_settings(&caller, patch).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Configuración actualizada",
        "user": user,
    })))
}

pub async fn stats(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> ApiResult<Json<Value>> {
    let estadisticas = state.auth.user_stats(&caller).await?;
    Ok(Json(json!({ "success": true, "estadisticas": estadisticas })))
}

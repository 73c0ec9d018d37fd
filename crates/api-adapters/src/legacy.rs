//! # Legacy `/api/denuncias` service
//!
//! A tiny standalone API with its own in-memory list. It is served on a
//! separate port and shares nothing with the main data store; the list
//! resets whenever the process restarts.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyComplaint {
    pub id: String,
    pub titulo: String,
    pub descripcion: String,
    pub categoria: String,
    pub votos: u64,
    pub fecha: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewLegacyComplaint {
    #[serde(default)]
    pub titulo: Option<String>,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegacyError {
    #[error("Faltan campos obligatorios")]
    MissingFields,
    #[error("La denuncia no fue encontrada")]
    NotFound,
}

fn iso(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn seed_date(year: i32, month: u32, day: u32) -> String {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| iso(dt.and_utc()))
        .unwrap_or_default()
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.is_empty())
}

pub struct LegacyStore {
    items: RwLock<Vec<LegacyComplaint>>,
}

impl LegacyStore {
    pub fn empty() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// The two records the service starts with.
    pub fn seeded() -> Self {
        Self {
            items: RwLock::new(vec![
                LegacyComplaint {
                    id: "1".into(),
                    titulo: "Bache en la calle principal".into(),
                    descripcion: "Hay un bache grande frente a la escuela.".into(),
                    categoria: "Infraestructura".into(),
                    votos: 5,
                    fecha: seed_date(2025, 8, 1),
                },
                LegacyComplaint {
                    id: "2".into(),
                    titulo: "Luz pública apagada".into(),
                    descripcion: "La luz del parque central no funciona.".into(),
                    categoria: "Servicios".into(),
                    votos: 3,
                    fecha: seed_date(2025, 8, 3),
                },
            ]),
        }
    }

    pub async fn list(&self) -> Vec<LegacyComplaint> {
        self.items.read().await.clone()
    }

    /// `titulo` and `categoria` are required and may not be empty. The id is
    /// the creation time in milliseconds, bumped if it is already taken.
    pub async fn create(
        &self,
        new: NewLegacyComplaint,
        now: DateTime<Utc>,
    ) -> Result<LegacyComplaint, LegacyError> {
        let (Some(titulo), Some(categoria)) = (present(new.titulo), present(new.categoria)) else {
            return Err(LegacyError::MissingFields);
        };

        let mut items = self.items.write().await;
        let mut millis = now.timestamp_millis();
        while items.iter().any(|d| d.id == millis.to_string()) {
            millis += 1;
        }
        let created = LegacyComplaint {
            id: millis.to_string(),
            titulo,
            descripcion: new.descripcion.unwrap_or_default(),
            categoria,
            votos: 0,
            fecha: iso(now),
        };
        items.push(created.clone());
        info!(id = %created.id, "legacy complaint created");
        Ok(created)
    }

    pub async fn vote(&self, id: &str) -> Result<LegacyComplaint, LegacyError> {
        let mut items = self.items.write().await;
        let item = items
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(LegacyError::NotFound)?;
        item.votos += 1;
        Ok(item.clone())
    }
}

impl Default for LegacyStore {
    fn default() -> Self {
        Self::seeded()
    }
}

#[cfg(feature = "web-axum")]
mod http {
    use std::sync::Arc;

    use axum::{
        extract::{rejection::JsonRejection, Path, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use chrono::Utc;
    use serde_json::json;
    use tower_http::cors::CorsLayer;
    use tower_http::trace::TraceLayer;

    use super::{LegacyError, LegacyStore, NewLegacyComplaint};

    impl IntoResponse for LegacyError {
        fn into_response(self) -> Response {
            let status = match self {
                LegacyError::MissingFields => StatusCode::BAD_REQUEST,
                LegacyError::NotFound => StatusCode::NOT_FOUND,
            };
            (status, Json(json!({ "error": self.to_string() }))).into_response()
        }
    }

    async fn list(State(store): State<Arc<LegacyStore>>) -> impl IntoResponse {
        Json(store.list().await)
    }

    async fn create(
        State(store): State<Arc<LegacyStore>>,
        payload: Result<Json<NewLegacyComplaint>, JsonRejection>,
    ) -> Result<impl IntoResponse, LegacyError> {
        // A body that is not JSON carries no fields at all.
        let new = payload.map(|Json(new)| new).unwrap_or_default();
        let created = store.create(new, Utc::now()).await?;
        Ok((StatusCode::CREATED, Json(created)))
    }

    async fn vote(
        State(store): State<Arc<LegacyStore>>,
        Path(id): Path<String>,
    ) -> Result<impl IntoResponse, LegacyError> {
        Ok(Json(store.vote(&id).await?))
    }

    /// Router for the legacy service, with permissive CORS.
    pub fn router(store: Arc<LegacyStore>) -> Router {
        Router::new()
            .route("/api/denuncias", get(list).post(create))
            .route("/api/denuncias/votar/{id}", post(vote))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(store)
    }
}

#[cfg(feature = "web-axum")]
pub use http::router;

//! # api-adapters
//!
//! The HTTP surface of the complaint platform: the JSON API over the
//! services, its middleware stack, Prometheus metrics, and the small
//! standalone `/api/denuncias` service.
//!
//! Everything that touches axum sits behind the `web-axum` feature.

pub mod legacy;
pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod routes;
#[cfg(feature = "web-axum")]
pub mod state;

pub use legacy::{LegacyComplaint, LegacyError, LegacyStore, NewLegacyComplaint};
pub use metrics::Metrics;

#[cfg(feature = "web-axum")]
pub use error::ApiError;
#[cfg(feature = "web-axum")]
pub use routes::router;
#[cfg(feature = "web-axum")]
pub use state::AppState;

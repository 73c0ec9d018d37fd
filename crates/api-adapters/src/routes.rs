use axum::{
    routing::{get, post, put},
    Router,
};

use crate::handlers::{self, auth, complaints};
use crate::middleware;
use crate::state::AppState;

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/settings", put(auth::update_settings))
        .route("/auth/stats", get(auth::stats))
        .route("/complaints", get(complaints::list).post(complaints::create))
        .route("/complaints/search", get(complaints::search))
        .route("/complaints/recent", get(complaints::recent))
        .route("/complaints/popular", get(complaints::popular))
        .route("/complaints/mine", get(complaints::mine))
        .route("/complaints/liked", get(complaints::liked))
        .route("/complaints/{id}", get(complaints::get_one))
        .route("/complaints/{id}/like", post(complaints::toggle_like))
        .route("/complaints/{id}/liked", get(complaints::has_liked))
        .route(
            "/complaints/{id}/comments",
            get(complaints::comments).post(complaints::add_comment),
        )
        .route("/complaints/{id}/report", post(complaints::report))
        .route("/categories", get(complaints::categories))
        .route("/stats", get(complaints::stats))
}

/// The main API with its middleware stack applied.
pub fn router(state: AppState) -> Router {
    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::render_metrics))
        .nest("/api", api_routes())
        .with_state(state);
    middleware::apply(app)
}

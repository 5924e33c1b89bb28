// Authgate gateway
//
// Login/logout, token verification for nginx `auth_request`, and a `/me`
// lookup. The router is built here so binaries and tests share it.

pub mod auth;
pub mod config;

use axum::{http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

pub use auth::AuthState;
pub use config::GatewayConfig;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found\n")
}

/// Full gateway router: auth routes, health probe, explicit 404 fallback
pub fn app(state: AuthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::routes(state))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
}

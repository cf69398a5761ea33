//! Route definitions and router construction.

use std::sync::Arc;

use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

use crate::bootstrap::CorsConfig;
use crate::handlers;
use crate::state::{AppContext, AppState};

fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    match config {
        CorsConfig::AllowAll => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
        CorsConfig::AllowOrigins(origins) => {
            let allowed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            CorsLayer::new().allow_origin(allowed).allow_methods(Any).allow_headers(Any)
        }
    }
}

/// Build the full router: signaling, the audio data plane, and observability.
pub fn create_router(ctx: AppContext, cors: &CorsConfig) -> Router {
    let state: AppState = Arc::new(ctx);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/session", post(handlers::session::create))
        .route("/session/{id}", delete(handlers::session::close))
        .route("/session/{id}/audio", get(handlers::audio_ws::upgrade))
        .route("/session/{id}/metrics", get(handlers::metrics::snapshot))
        .route("/events", get(handlers::events::stream))
        .layer(build_cors_layer(cors))
        .with_state(state)
}

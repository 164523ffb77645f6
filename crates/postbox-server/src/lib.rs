use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use postbox_api::{AppState, messages};

/// Assemble the full application router. Exposed as a library function so
/// the integration tests can mount the real app on an ephemeral port.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/messages", post(messages::send_message))
        .route("/messages", get(messages::list_messages))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health — liveness check.
async fn health() -> &'static str {
    "ok"
}

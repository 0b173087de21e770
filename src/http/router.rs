//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Postings
        .route("/postings", get(handlers::list_postings))
        .route("/postings/import", post(handlers::import_posting))
        .route("/postings/{id}", delete(handlers::delete_posting))
        // Calendar
        .route("/calendar", get(handlers::get_calendar))
        // Availability slots
        .route("/slots", post(handlers::create_slot))
        .route("/slots/{id}", patch(handlers::update_slot))
        .route("/slots/{id}", delete(handlers::delete_slot))
        // Chat
        .route("/chat/sessions", get(handlers::list_sessions))
        .route("/chat/sessions/{id}/messages", get(handlers::get_messages))
        .route("/chat/sessions/{id}/messages", post(handlers::send_message))
        // Change feed
        .route("/changes/stream", get(handlers::stream_changes));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

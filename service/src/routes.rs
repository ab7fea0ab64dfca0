//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{health, notifications, transactions};
use crate::state::AppState;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Transactions (JWT auth)
/// - `POST /v1/transactions` - Record a transaction (optional
///   `Idempotency-Key` header)
/// - `GET /v1/transactions` - List the caller's transactions
/// - `GET /v1/transactions/global` - List recent transactions system-wide
/// - `GET /v1/transactions/:id` - Fetch a transaction (owner or admin)
///
/// ## Notifications (JWT auth)
/// - `GET /v1/notifications` - List the caller's notifications
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    // Build CORS layer
    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        // Health (public)
        .route("/health", get(health::health))
        // Transactions
        .route(
            "/v1/transactions",
            post(transactions::create_transaction).get(transactions::list_transactions),
        )
        .route(
            "/v1/transactions/global",
            get(transactions::list_global_transactions),
        )
        .route("/v1/transactions/:id", get(transactions::get_transaction))
        // Notifications
        .route("/v1/notifications", get(notifications::list_notifications))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

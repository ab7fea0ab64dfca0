//! Ledger HTTP API Service.
//!
//! This crate provides the HTTP API for the ledger, including:
//!
//! - Idempotent transaction creation
//! - Transaction retrieval (by user, by id, global recent)
//! - Notification listings
//!
//! # Authentication
//!
//! End-user requests carry issuer-signed JWTs validated against the
//! identity provider's JWKS. An admin API key grants read access to other
//! users' transactions.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers are async for Axum routing over a sync store

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

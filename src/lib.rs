//! Procurement workflow API backed by a spreadsheet store.
//!
//! The only persistence layer is a remote spreadsheet behind a script
//! endpoint: reads return whole tab grids, writes are positional
//! form-encoded actions. Everything above that is mapping by fixed column
//! offsets, grouping by planning number, derived-quantity arithmetic, and
//! sequential mutation submission with retry.

pub mod aggregate;
pub mod calc;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod refresh;
pub mod schema;
pub mod services;
pub mod sheets;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::services::AppServices;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: AppServices,
}

/// Builds the full application router: versioned API plus the health probe.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", handlers::api_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};

use crate::errors::ServiceError;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/vendors", get(vendors))
}

async fn dashboard(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.reporting.dashboard().await?))
}

async fn vendors(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.reporting.vendors().await?))
}

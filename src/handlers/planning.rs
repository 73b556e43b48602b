use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::errors::ServiceError;
use crate::services::planning::NewPlanningRequest;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(submit))
        .route("/grouped", get(list_grouped))
        .route("/next-number", get(next_number))
}

async fn list(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.services.planning.list().await)
}

async fn list_grouped(State(state): State<AppState>) -> impl IntoResponse {
    let (snapshot, groups) = state.services.planning.list_grouped().await;
    Json(json!({
        "phase": snapshot.phase,
        "error": snapshot.error,
        "groups": groups,
    }))
}

async fn next_number(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let number = state.services.planning.next_planning_number().await?;
    Ok(Json(json!({ "planning_number": number })))
}

async fn submit(
    State(state): State<AppState>,
    Json(request): Json<NewPlanningRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state.services.planning.submit(request).await?;
    // Per-line failures keep the 201; the summary carries them.
    Ok((StatusCode::CREATED, Json(result)))
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::errors::ServiceError;
use crate::services::purchase_orders::{GeneratePoRequest, PoStatusRequest};
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/board", get(board))
        .route("/generate", post(generate))
        .route("/status", post(update_status))
        .route("/:planning_number/indent-lines", get(indent_lines))
}

async fn list(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.services.purchase_orders.list().await)
}

async fn board(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    Ok(Json(state.services.purchase_orders.board().await?))
}

async fn indent_lines(
    State(state): State<AppState>,
    Path(planning_number): Path<String>,
) -> Result<impl IntoResponse, ServiceError> {
    let lines = state
        .services
        .purchase_orders
        .load_indent_lines(&planning_number)
        .await?;
    if lines.is_empty() {
        return Err(ServiceError::NotFound(format!(
            "no planning lines found for {planning_number}"
        )));
    }
    Ok(Json(lines))
}

async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GeneratePoRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state.services.purchase_orders.generate(request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn update_status(
    State(state): State<AppState>,
    Json(request): Json<PoStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let updated = state.services.purchase_orders.update_status(request).await?;
    Ok(Json(json!({ "updated": updated })))
}

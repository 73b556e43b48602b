use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::errors::ServiceError;
use crate::services::receiving::ReceiveBatchRequest;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/receivable", get(receivable))
        .route("/history", get(history))
        .route("/receipts", post(submit_batch))
}

async fn receivable(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let groups = state.services.receiving.receivable().await?;
    Ok(Json(groups))
}

async fn history(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let records = state.services.receiving.history().await?;
    Ok(Json(records))
}

async fn submit_batch(
    State(state): State<AppState>,
    Json(request): Json<ReceiveBatchRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state.services.receiving.submit_batch(request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

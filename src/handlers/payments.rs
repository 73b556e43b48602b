use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::errors::ServiceError;
use crate::services::payments::NewPaymentRequest;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(record))
        .route("/board", get(board))
        .route("/history", get(history))
}

async fn board(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let board = state.services.payments.board().await?;
    Ok(Json(board))
}

async fn history(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let records = state.services.payments.history().await?;
    Ok(Json(records))
}

async fn record(
    State(state): State<AppState>,
    Json(request): Json<NewPaymentRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.payments.record(request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use crate::errors::ServiceError;
use crate::services::approval::DecisionRequest;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/board", get(board))
        .route("/log", get(decision_log))
        .route("/decisions", post(decide))
}

async fn board(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.services.approval.board().await)
}

async fn decision_log(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let log = state.services.approval.decision_log().await?;
    Ok(Json(log))
}

async fn decide(
    State(state): State<AppState>,
    Json(request): Json<DecisionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let result = state.services.approval.decide(request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};

use crate::errors::ServiceError;
use crate::services::auth::LoginRequest;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let user = state.services.auth.login(request).await?;
    Ok(Json(user))
}

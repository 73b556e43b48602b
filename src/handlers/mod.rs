//! HTTP handlers, one module per workflow stage, mounted under `/api/v1`.

pub mod approval;
pub mod auth;
pub mod health;
pub mod payments;
pub mod planning;
pub mod purchase_orders;
pub mod receiving;
pub mod reports;

use axum::Router;

use crate::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/planning", planning::routes())
        .nest("/approvals", approval::routes())
        .nest("/purchase-orders", purchase_orders::routes())
        .nest("/receiving", receiving::routes())
        .nest("/payments", payments::routes())
        .nest("/reports", reports::routes())
        .nest("/auth", auth::routes())
}

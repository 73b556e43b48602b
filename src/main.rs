use std::sync::Arc;

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use procure_api::config::{init_tracing, load_config};
use procure_api::services::AppServices;
use procure_api::{app_router, schema, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    init_tracing(config.log_level(), config.log_json);
    info!(environment = %config.environment, "starting procure-api");

    // Fail fast on a mis-edited offset table before any write can land.
    schema::validate_row_widths()?;

    let services = AppServices::from_config(&config)?;
    let cors = build_cors(&config);
    let state = AppState {
        config: Arc::new(config.clone()),
        services,
    };
    let app = app_router(state).layer(cors);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    info!("shutdown complete");
    Ok(())
}

fn build_cors(config: &procure_api::config::AppConfig) -> CorsLayer {
    let methods = [Method::GET, Method::POST];
    if let Some(origins) = config
        .cors_allowed_origins
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        let parsed: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
            .collect();
        if !parsed.is_empty() {
            return CorsLayer::new()
                .allow_origin(parsed)
                .allow_methods(methods)
                .allow_headers(Any);
        }
        warn!("no parseable CORS origins configured");
    }
    if config.should_allow_permissive_cors() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        // Same-origin only.
        CorsLayer::new()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => warn!(error = %err, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

//! HTTP server entry point and Axum router setup.
//!
//! Loads configuration from the environment (and `.env`), builds the
//! recommendation pipeline, and serves `GET /` and `POST /recommend`.

mod dto;
mod error;
mod handlers;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::routing::{get, post};
use axum::Router;
use rujuk_config::TriageConfig;
use rujuk_engine::{PipelineStatus, Recommender};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared server state accessible from all handlers.
pub struct AppState {
    pub recommender: Recommender,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    let config = TriageConfig::from_env()?;
    info!(
        "Model: {} (provider: {}, api key: {})",
        config.model,
        config.provider(),
        if config.api_key.is_some() { "set" } else { "missing" }
    );
    if !config.limits.is_unbounded() {
        info!("Input limits: {:?}", config.limits);
    }

    let recommender = Recommender::from_config(&config);
    if let PipelineStatus::Disabled { reason } = recommender.status() {
        warn!(
            "LLM pipeline disabled ({}); POST /recommend will answer 500 until the server is restarted with a valid key",
            reason
        );
    }

    let app = router(Arc::new(AppState { recommender }));

    info!("Starting server on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

/// Builds the application router with CORS and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request<Body>| {
            tracing::info_span!(
                "request",
                method = %req.method(),
                uri = %req.uri(),
                version = ?req.version(),
            )
        })
        .on_response(|res: &Response<Body>, latency: Duration, _span: &tracing::Span| {
            info!(
                latency = %format!("{} ms", latency.as_millis()),
                status = %res.status().as_u16(),
                "finished processing request"
            );
        });

    Router::new()
        .route("/", get(handlers::root))
        .route("/recommend", post(handlers::recommend::recommend))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

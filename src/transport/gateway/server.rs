use super::handlers::{handle_health, handle_update};
use super::{AppState, MAX_BODY_SIZE, REQUEST_TIMEOUT_SECS};

use anyhow::{Context, Result};
use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;

/// Bind `host:port` and serve until `shutdown` resolves.
pub async fn run_gateway(
    host: &str,
    port: u16,
    bot_path: &str,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .context("parse gateway bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("bind gateway socket")?;

    run_gateway_with_listener(listener, bot_path, state, shutdown).await
}

/// Serve on a pre-bound listener.
pub async fn run_gateway_with_listener(
    listener: tokio::net::TcpListener,
    bot_path: &str,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let local = listener
        .local_addr()
        .context("get gateway listener local address")?;

    tracing::info!(
        addr = %local,
        bot_path,
        secret = state.secret_token.is_some(),
        "gateway listening"
    );

    let app = build_app(state, bot_path);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("serve HTTP gateway")?;

    tracing::info!("gateway stopped");
    Ok(())
}

pub fn build_app(state: AppState, bot_path: &str) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route(bot_path, post(handle_update))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_BODY_SIZE))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
        ))
}

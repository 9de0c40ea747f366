//! HTTP server lifecycle.

use axum::{Router, middleware};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use crate::error::ServerError;
use crate::middleware::{create_middleware_stack, create_trace_layer, request_logger};
use crate::routes::create_router;
use crate::state::AppState;

/// Routes plus the middleware stack.
pub fn build_app(state: AppState) -> Router {
    create_router(state)
        .layer(middleware::from_fn(request_logger))
        .layer(create_middleware_stack())
        .layer(create_trace_layer())
}

/// Parse `host:port` into a socket address.
///
/// # Errors
///
/// Returns `ServerError::InvalidAddress` if the pair does not form an address.
pub fn listen_addr(host: &str, port: u16) -> Result<SocketAddr, ServerError> {
    let raw = if host.contains(':') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };
    raw.parse().map_err(|_| ServerError::InvalidAddress(raw))
}

/// Bind `addr` and serve until Ctrl+C, SIGTERM or `POST /api/shutdown`.
///
/// # Errors
///
/// Returns `ServerError::Io` if binding or serving fails.
pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on http://{}", listener.local_addr()?);

    serve(listener, state).await
}

/// Serve on an already bound listener.
///
/// # Errors
///
/// Returns `ServerError::Io` if serving fails.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), ServerError> {
    let mut shutdown_rx = state.shutdown_tx.subscribe();
    let app = build_app(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    info!("Received Ctrl+C signal");
                }
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown signal from API");
                }
                () = wait_for_sigterm() => {
                    info!("Received SIGTERM signal");
                }
            }
            info!("Starting graceful shutdown...");
        })
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_sigterm() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(err) => {
            tracing::warn!(error = %err, "Failed to install SIGTERM handler");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_sigterm() {
    std::future::pending::<()>().await;
}

use std::net::SocketAddr;
use std::sync::Arc;

use flowstate_agent::HttpAgent;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowstate_api::config::ServerConfig;
use flowstate_api::router::build_app_router;
use flowstate_api::state::AppState;
use flowstate_api::ws;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowstate_api=debug,flowstate_agent=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        agent_url = %config.agent_url,
        agent_timeout_secs = config.agent_timeout_secs,
        "Loaded server configuration",
    );

    // --- Agent client ---
    let agent = Arc::new(HttpAgent::new(config.agent_url.clone()));

    // --- App state (session registry + agent job runner) ---
    let state = AppState::new(config.clone(), agent);
    let ws_manager = Arc::clone(&state.ws_manager);
    let agent_jobs = state.agent_jobs.clone();

    // --- Heartbeat ---
    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&ws_manager));

    // --- Router ---
    let app = build_app_router(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // Let running jobs deliver their final events before sockets close.
    let in_flight = agent_jobs.in_flight();
    tracing::info!(in_flight, "Waiting for agent jobs");
    if !agent_jobs.shutdown(config.shutdown_timeout()).await {
        tracing::warn!("Agent jobs still running after shutdown timeout");
    }

    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;

    heartbeat_handle.abort();
    tracing::info!("Heartbeat task stopped");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

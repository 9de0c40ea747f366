//! Taskdeps HTTP server binary.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use taskdeps::app::App;
use taskdeps_server::events::spawn_event_logger;
use taskdeps_server::server::listen_addr;
use taskdeps_server::{AppState, start_server};
use tracing_subscriber::EnvFilter;

/// Serve a taskdeps workspace over HTTP
#[derive(Parser, Debug)]
#[command(name = "taskdeps-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory inside the taskdeps workspace to serve
    #[arg(short, long, default_value = ".", env = "TASKDEPS_WORKSPACE")]
    workspace: PathBuf,

    /// Host to bind (defaults to the workspace config)
    #[arg(long, env = "TASKDEPS_HOST")]
    host: Option<String>,

    /// Port to bind (defaults to the workspace config)
    #[arg(short, long, env = "TASKDEPS_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Example: RUST_LOG=taskdeps=debug,tower_http=debug taskdeps-server
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("taskdeps=info,taskdeps_server=info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let app = App::from_directory(&args.workspace)
        .await
        .with_context(|| format!("Failed to open workspace at {}", args.workspace.display()))?;

    let server_config = &app.config().server;
    let host = args.host.unwrap_or_else(|| server_config.host.clone());
    let port = args.port.unwrap_or(server_config.port);
    let addr = listen_addr(&host, port)?;

    let state = AppState::new(app.shared_storage());
    let logger = spawn_event_logger(state.subscribe());

    tracing::info!(root = %app.root_dir().display(), "Serving taskdeps workspace");
    start_server(addr, state).await?;

    logger.abort();
    Ok(())
}

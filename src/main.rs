//! Timer Keeper - named, categorized countdown timers with a completion history
//!
//! This is the main entry point for the timer-keeper application.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use timer_keeper::{
    api::create_router,
    config::Config,
    state::{AppState, TimerEngine},
    storage::{FileStore, TimerRepository},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("timer_keeper={},tower_http=info", config.log_level()))
        .init();

    info!("Starting timer-keeper server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, data_dir={}, tick={}ms",
          config.host, config.port, config.data_dir.display(), config.tick_ms);

    // Load persisted timers and start ticking
    let store = FileStore::open(&config.data_dir).await?;
    let repository = TimerRepository::new(Arc::new(store));
    let engine = TimerEngine::load(repository).await;
    engine.start_ticker(config.tick_period()).await;

    // Create HTTP router with all endpoints
    let state = Arc::new(AppState::new(Arc::clone(&engine), config.export_dir()));
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timers            - List timers");
    info!("  POST /timers            - Create a timer");
    info!("  POST /timers/:id/toggle - Start or pause a timer");
    info!("  POST /timers/:id/reset  - Reset a timer");
    info!("  GET  /history           - Completion history");
    info!("  GET  /history/export    - Raw history blob");
    info!("  POST /history/export    - Write history to the export directory");
    info!("  GET  /status            - Timer summary");
    info!("  GET  /health            - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        result = shutdown_signal() => {
            match result {
                Ok(()) => info!("Shutdown signal received"),
                Err(e) => tracing::error!("Failed to install signal handler: {}", e),
            }
        }
    }

    engine.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

//! Tea Timer - A minute/second countdown timer served over HTTP
//!
//! This is the main entry point for the tea-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use tea_timer::{
    api::create_router,
    config::Config,
    state::AppState,
    tasks::{CountdownDriver, TokioScheduler},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("tea_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting tea-timer server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, tick={}ms",
          config.host, config.port, config.tick_ms);

    let state = Arc::new(AppState::new(config.port, config.host.clone()));
    let scheduler = Arc::new(TokioScheduler::new());
    let driver = CountdownDriver::with_interval(state, scheduler, config.tick_interval());

    let app = create_router(driver);

    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /timer                         - Current minutes, seconds and controls");
    info!("  GET  /timer/events                  - Stream timer updates (SSE)");
    info!("  POST /timer/minutes/increase|decrease");
    info!("  POST /timer/seconds/increase|decrease");
    info!("  POST /timer/controls                - Toggle or set control visibility");
    info!("  POST /timer/start                   - Start the countdown");
    info!("  POST /timer/cancel                  - Stop the countdown");
    info!("  GET  /status                        - Timer and server status");
    info!("  GET  /health                        - Health check");

    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

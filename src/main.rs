//! Pomodoro Timer - A state-managed Pomodoro timer daemon
//!
//! This is the main entry point for the pomodoro-timer application.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use pomodoro_timer::{
    api::create_router,
    config::Config,
    state::{AppState, PreferenceStore},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("pomodoro_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting pomodoro-timer v{}", env!("CARGO_PKG_VERSION"));
    let defaults = config.timer_defaults();
    info!(
        "Configuration: host={}, port={}, work={}min, short-break={}min, long-break={}min, interval={}, auto-cycle={}",
        config.host,
        config.port,
        defaults.durations.work,
        defaults.durations.short_break,
        defaults.durations.long_break,
        defaults.long_break_interval,
        defaults.auto_cycle
    );

    let storage = config.open_storage();
    match storage.path() {
        Some(path) => info!("Local storage: {}", path.display()),
        None => info!("Local storage: in memory"),
    }

    // Create application state
    let state = Arc::new(AppState::new(
        config.port,
        config.host.clone(),
        config.locale,
        defaults,
        PreferenceStore::load(storage),
    ));

    // Create HTTP router with all endpoints
    let app = create_router(Arc::clone(&state));

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  POST /timer/toggle             - Start or pause (optional settings body)");
    info!("  POST /timer/reset              - Rewind the current session");
    info!("  POST /timer/advance            - Skip to the next session");
    info!("  POST /timer/session            - Select a session while idle");
    info!("  PUT  /timer/settings           - Change durations while idle");
    info!("  GET  /timer                    - Current timer state");
    info!("  GET  /timer/events             - Live timer and presentation events");
    info!("  GET  /preferences              - Accent color and font");
    info!("  PUT  /preferences/accent-color - Set the accent color");
    info!("  PUT  /preferences/font         - Set the font");
    info!("  GET  /status                   - Server status");
    info!("  GET  /health                   - Health check");

    // Setup graceful shutdown
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

    state.shutdown();
    info!("Server shutdown complete");
    Ok(())
}

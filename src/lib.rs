//! Pomodoro Timer - A state-managed Pomodoro timer daemon
//!
//! This library provides the session state machine, the one-second countdown
//! driver, the preference store and the local HTTP binding a browser
//! presentation layer uses to drive them.

pub mod config;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;

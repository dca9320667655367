//! HTTP API module
//!
//! Local binding for the presentation layer: user input is forwarded into the
//! store and observed fields are served back, including a live event stream.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer", get(timer_handler))
        .route("/timer/toggle", post(toggle_handler))
        .route("/timer/reset", post(reset_handler))
        .route("/timer/advance", post(advance_handler))
        .route("/timer/session", post(select_session_handler))
        .route("/timer/settings", put(settings_handler))
        .route("/timer/events", get(events_handler))
        .route("/preferences", get(preferences_handler))
        .route("/preferences/accent-color", put(accent_color_handler))
        .route("/preferences/font", put(font_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::{
    future,
    stream::{self, Stream, StreamExt},
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::state::{AppState, Reconfigure, TimerSnapshot};
use super::responses::{
    ApiResponse, HealthResponse, PreferenceValue, PreferencesResponse, SelectSessionRequest,
    StatusResponse,
};

/// Handle POST /timer/toggle - Start or pause, optionally reconfiguring first
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    body: Option<Json<Reconfigure>>,
) -> Result<Json<ApiResponse>, StatusCode> {
    let reconfigure = body.map(|Json(request)| request);
    match state.toggle(reconfigure) {
        Ok(timer) => {
            let message = if timer.running { "Timer started" } else { "Timer paused" };
            Ok(Json(ApiResponse::from_timer(message.to_string(), timer)))
        }
        Err(e) => {
            error!("Failed to toggle timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/reset - Stop and rewind the current session
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reset() {
        Ok(timer) => Ok(Json(ApiResponse::from_timer("Timer reset".to_string(), timer))),
        Err(e) => {
            error!("Failed to reset timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/advance - Skip to the next session
pub async fn advance_handler(State(state): State<Arc<AppState>>) -> Result<Json<ApiResponse>, StatusCode> {
    match state.advance() {
        Ok(timer) => {
            let message = format!("Advanced to {}", timer.session_label);
            Ok(Json(ApiResponse::from_timer(message, timer)))
        }
        Err(e) => {
            error!("Failed to advance session: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/session - Pick the session type while idle
pub async fn select_session_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectSessionRequest>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.select_session(request.session) {
        Ok((true, timer)) => {
            let message = format!("Selected {}", timer.session_label);
            Ok(Json(ApiResponse::from_timer(message, timer)))
        }
        Ok((false, timer)) => Ok(Json(ApiResponse::ignored(
            "Pause the timer before switching sessions".to_string(),
            timer,
        ))),
        Err(e) => {
            error!("Failed to select session: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /timer/settings - Reconfigure durations while idle
pub async fn settings_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<Reconfigure>,
) -> Result<Json<ApiResponse>, StatusCode> {
    match state.reconfigure(request) {
        Ok((true, timer)) => Ok(Json(ApiResponse::from_timer(
            "Timer settings updated".to_string(),
            timer,
        ))),
        Ok((false, timer)) => Ok(Json(ApiResponse::ignored(
            "Pause the timer before changing settings".to_string(),
            timer,
        ))),
        Err(e) => {
            error!("Failed to reconfigure timer: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle GET /timer - Return the current timer snapshot
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerSnapshot>, StatusCode> {
    state.get_timer().map(Json).map_err(|e| {
        error!("Failed to get timer state: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Handle GET /timer/events - Stream timer snapshots and presentation attributes
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Presentation client subscribed to events");
    let timer = watch_events(state.subscribe_timer(), "timer");
    let presentation = watch_events(state.subscribe_presentation(), "presentation");

    Sse::new(stream::select(timer, presentation)).keep_alive(KeepAlive::default())
}

/// Handle GET /preferences - Return preferences and presentation attributes
pub async fn preferences_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PreferencesResponse>, StatusCode> {
    match state.get_preferences() {
        Ok((preferences, presentation)) => Ok(Json(PreferencesResponse {
            preferences,
            presentation,
        })),
        Err(e) => {
            error!("Failed to get preferences: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle PUT /preferences/accent-color
pub async fn accent_color_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PreferenceValue>,
) -> Result<Json<PreferencesResponse>, StatusCode> {
    if let Err(e) = state.set_accent_color(&body.value) {
        error!("Failed to set accent color: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    preferences_handler(State(state)).await
}

/// Handle PUT /preferences/font
pub async fn font_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PreferenceValue>,
) -> Result<Json<PreferencesResponse>, StatusCode> {
    if let Err(e) = state.set_font(&body.value) {
        error!("Failed to set font: {}", e);
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    preferences_handler(State(state)).await
}

/// Handle GET /status - Return current timer, preferences and server info
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.get_timer() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let preferences = match state.get_preferences() {
        Ok((p, _)) => p,
        Err(e) => {
            error!("Failed to get preferences: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        preferences,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Current value of `rx` followed by every later change, as named SSE events
fn watch_events<T>(
    mut rx: watch::Receiver<T>,
    name: &'static str,
) -> impl Stream<Item = Result<Event, Infallible>>
where
    T: Clone + Serialize + Send + Sync + 'static,
{
    let initial = rx.borrow_and_update().clone();
    let updates = stream::unfold(rx, |mut rx| async move {
        rx.changed().await.ok()?;
        let value = rx.borrow_and_update().clone();
        Some((value, rx))
    });

    stream::once(future::ready(initial))
        .chain(updates)
        .filter_map(move |value| {
            let event = match Event::default().event(name).json_data(&value) {
                Ok(event) => Some(Ok(event)),
                Err(e) => {
                    debug!("Dropping unserializable {} event: {}", name, e);
                    None
                }
            };
            future::ready(event)
        })
}

//! One-second countdown driver

use std::{
    ops::ControlFlow,
    sync::{Arc, Weak},
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::debug;

use crate::state::AppState;

/// Period between two ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Handle to a running countdown task.
///
/// Dropping the handle detaches the task; [`CountdownDriver::cancel`] stops it.
#[derive(Debug)]
pub struct CountdownDriver {
    generation: u64,
    handle: JoinHandle<()>,
}

impl CountdownDriver {
    /// Spawn a driver ticking `state` once per second. Must run inside a tokio runtime.
    pub fn spawn(state: &Arc<AppState>, generation: u64) -> Self {
        let handle = tokio::spawn(countdown_task(Arc::downgrade(state), generation));
        Self { generation, handle }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Abort the task; no further tick reaches the state
    pub fn cancel(self) {
        debug!("Cancelling countdown driver #{}", self.generation);
        self.handle.abort();
    }
}

/// Background task calling back into the state every [`TICK_INTERVAL`]
pub async fn countdown_task(state: Weak<AppState>, generation: u64) {
    debug!("Countdown driver #{} started", generation);

    // first tick one full period after start
    let mut interval = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);

    loop {
        interval.tick().await;

        let Some(state) = state.upgrade() else {
            break;
        };
        if let ControlFlow::Break(()) = state.countdown_tick(generation) {
            break;
        }
    }

    debug!("Countdown driver #{} stopped", generation);
}

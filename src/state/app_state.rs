//! Main application state management

use std::{
    ops::ControlFlow,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::{
    DriverCommand, Locale, PreferenceStore, Preferences, PresentationAttributes, Reconfigure,
    SessionType, TickOutcome, TimerMachine, TimerSettings, TimerSnapshot,
};
use crate::tasks::CountdownDriver;

/// Process-wide store: timer machine, countdown driver, preferences
#[derive(Debug)]
pub struct AppState {
    /// Session state machine
    pub machine: Mutex<TimerMachine>,
    /// The single live countdown driver, if running
    driver: Mutex<Option<CountdownDriver>>,
    next_generation: AtomicU64,
    /// Accent color, font and persisted durations
    pub preferences: Mutex<PreferenceStore>,
    pub locale: Locale,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Channel for timer updates
    pub timer_update_tx: watch::Sender<TimerSnapshot>,
    /// Channel for presentation attribute updates
    pub presentation_tx: watch::Sender<PresentationAttributes>,
    /// Keep the receivers alive to prevent channel closure
    _timer_update_rx: watch::Receiver<TimerSnapshot>,
    _presentation_rx: watch::Receiver<PresentationAttributes>,
}

impl AppState {
    /// Create the store. Durations found in the preference storage win over
    /// the configured defaults.
    pub fn new(
        port: u16,
        host: String,
        locale: Locale,
        defaults: TimerSettings,
        preferences: PreferenceStore,
    ) -> Self {
        let settings = TimerSettings {
            durations: preferences.durations(&defaults.durations),
            ..defaults
        };
        let machine = TimerMachine::new(defaults, settings);

        let (timer_update_tx, timer_update_rx) = watch::channel(machine.snapshot(locale));
        let (presentation_tx, presentation_rx) =
            watch::channel(preferences.preferences().presentation());

        Self {
            machine: Mutex::new(machine),
            driver: Mutex::new(None),
            next_generation: AtomicU64::new(0),
            preferences: Mutex::new(preferences),
            locale,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            timer_update_tx,
            presentation_tx,
            _timer_update_rx: timer_update_rx,
            _presentation_rx: presentation_rx,
        }
    }

    /// Start or pause the countdown, optionally reconfiguring first
    pub fn toggle(self: &Arc<Self>, reconfigure: Option<Reconfigure>) -> Result<TimerSnapshot, String> {
        let (snapshot, durations) = self.update_machine("toggle", |machine| {
            let was_running = machine.is_running();
            let command = machine.toggle(reconfigure.as_ref());
            // durations only change when idle parameters were applied
            let durations = (!was_running && reconfigure.is_some())
                .then(|| machine.settings().durations);
            (command, durations)
        })?;

        if let Some(durations) = durations {
            self.persist_durations(&durations)?;
        }

        info!(
            "Timer {} on {} at {}",
            if snapshot.running { "started" } else { "paused" },
            snapshot.session.as_str(),
            snapshot.formatted_time
        );
        Ok(snapshot)
    }

    /// Stop and rewind the current session
    pub fn reset(self: &Arc<Self>) -> Result<TimerSnapshot, String> {
        let (snapshot, ()) = self.update_machine("reset", |machine| (machine.reset(), ()))?;
        info!("Timer reset on {}", snapshot.session.as_str());
        Ok(snapshot)
    }

    /// Skip to the next session
    pub fn advance(self: &Arc<Self>) -> Result<TimerSnapshot, String> {
        let (snapshot, ()) = self.update_machine("advance", |machine| (machine.advance_session(), ()))?;
        info!("Advanced to {}", snapshot.session.as_str());
        Ok(snapshot)
    }

    /// Apply new settings without starting. Ignored while running.
    pub fn reconfigure(self: &Arc<Self>, request: Reconfigure) -> Result<(bool, TimerSnapshot), String> {
        let (snapshot, applied) = self.update_machine("reconfigure", |machine| {
            let applied = machine.reconfigure(&request);
            (DriverCommand::Keep, applied.then(|| machine.settings().durations))
        })?;

        match applied {
            Some(durations) => {
                self.persist_durations(&durations)?;
                info!("Timer reconfigured: {:?}", durations);
                Ok((true, snapshot))
            }
            None => {
                warn!("Ignoring reconfiguration while the timer is running");
                Ok((false, snapshot))
            }
        }
    }

    /// Switch to a session type while idle. Ignored while running.
    pub fn select_session(
        self: &Arc<Self>,
        session: SessionType,
    ) -> Result<(bool, TimerSnapshot), String> {
        let (snapshot, applied) = self.update_machine("select-session", |machine| {
            (DriverCommand::Keep, machine.select_session(session))
        })?;

        if applied {
            info!("Selected session {}", session.as_str());
        } else {
            warn!("Ignoring session selection while the timer is running");
        }
        Ok((applied, snapshot))
    }

    /// Called by the countdown driver once per second
    pub fn countdown_tick(&self, generation: u64) -> ControlFlow<()> {
        let mut machine = match self.machine.lock() {
            Ok(machine) => machine,
            Err(e) => {
                error!("Failed to lock timer state: {}", e);
                return ControlFlow::Break(());
            }
        };
        let mut driver = match self.driver.lock() {
            Ok(driver) => driver,
            Err(e) => {
                error!("Failed to lock countdown driver: {}", e);
                return ControlFlow::Break(());
            }
        };

        if driver.as_ref().map(CountdownDriver::generation) != Some(generation) {
            debug!("Stale countdown driver #{} ignored", generation);
            return ControlFlow::Break(());
        }

        let outcome = machine.tick();
        match outcome {
            TickOutcome::Advanced { from, to, .. } => {
                info!("{} finished, moving to {}", from.as_str(), to.as_str());
            }
            TickOutcome::Finished { session } => {
                info!("{} finished, waiting for restart", session.as_str());
            }
            TickOutcome::Counted { remaining_seconds } => {
                debug!("{} seconds remaining", remaining_seconds);
            }
            TickOutcome::Idle => {}
        }

        let flow = if outcome.driver_command() == DriverCommand::Stop || !machine.is_running() {
            // the driver is ending itself; release the slot without aborting
            driver.take();
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        };

        let snapshot = machine.snapshot(self.locale);
        drop(driver);
        drop(machine);

        self.publish_timer(snapshot);
        flow
    }

    /// Cancel any live driver, leaving the machine as it is
    pub fn shutdown(&self) {
        if let Ok(mut driver) = self.driver.lock() {
            if let Some(driver) = driver.take() {
                driver.cancel();
            }
        }
    }

    /// Whether a countdown driver is currently registered
    pub fn has_driver(&self) -> bool {
        self.driver
            .lock()
            .map(|driver| driver.is_some())
            .unwrap_or(false)
    }

    /// Get current timer snapshot
    pub fn get_timer(&self) -> Result<TimerSnapshot, String> {
        self.machine
            .lock()
            .map(|machine| machine.snapshot(self.locale))
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Get current preferences with their presentation attributes
    pub fn get_preferences(&self) -> Result<(Preferences, PresentationAttributes), String> {
        self.preferences
            .lock()
            .map(|store| {
                let preferences = store.preferences().clone();
                let presentation = preferences.presentation();
                (preferences, presentation)
            })
            .map_err(|e| format!("Failed to lock preferences: {}", e))
    }

    pub fn set_accent_color(&self, value: &str) -> Result<PresentationAttributes, String> {
        self.update_preferences("accent-color", |store| store.set_accent_color(value))
    }

    pub fn set_font(&self, value: &str) -> Result<PresentationAttributes, String> {
        self.update_preferences("font", |store| store.set_font(value))
    }

    pub fn subscribe_timer(&self) -> watch::Receiver<TimerSnapshot> {
        self.timer_update_tx.subscribe()
    }

    pub fn subscribe_presentation(&self) -> watch::Receiver<PresentationAttributes> {
        self.presentation_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    /// Run `updater` on the machine, apply the driver command it returns and
    /// notify timer watchers
    fn update_machine<F, T>(self: &Arc<Self>, action: &str, updater: F) -> Result<(TimerSnapshot, T), String>
    where
        F: FnOnce(&mut TimerMachine) -> (DriverCommand, T),
    {
        let mut machine = self.machine.lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))?;

        let (command, output) = updater(&mut machine);
        self.apply_driver_command(command)?;
        let snapshot = machine.snapshot(self.locale);
        drop(machine); // Release the lock early

        self.record_action(action);
        self.publish_timer(snapshot.clone());
        Ok((snapshot, output))
    }

    /// Must be called with the machine lock held
    fn apply_driver_command(self: &Arc<Self>, command: DriverCommand) -> Result<(), String> {
        if command == DriverCommand::Keep {
            return Ok(());
        }

        let mut driver = self.driver.lock()
            .map_err(|e| format!("Failed to lock countdown driver: {}", e))?;

        // every transition cancels the previous driver before replacing it
        if let Some(previous) = driver.take() {
            previous.cancel();
        }

        if command == DriverCommand::Start {
            let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
            debug!("Starting countdown driver #{}", generation);
            *driver = Some(CountdownDriver::spawn(self, generation));
        }
        Ok(())
    }

    fn update_preferences<F>(&self, action: &str, updater: F) -> Result<PresentationAttributes, String>
    where
        F: FnOnce(&mut PreferenceStore) -> PresentationAttributes,
    {
        let mut store = self.preferences.lock()
            .map_err(|e| format!("Failed to lock preferences: {}", e))?;
        let attributes = updater(&mut store);
        drop(store);

        self.record_action(action);
        if let Err(e) = self.presentation_tx.send(attributes.clone()) {
            warn!("Failed to send presentation update: {}", e);
        }
        Ok(attributes)
    }

    fn persist_durations(&self, durations: &super::Durations) -> Result<(), String> {
        let mut store = self.preferences.lock()
            .map_err(|e| format!("Failed to lock preferences: {}", e))?;
        store.save_durations(durations);
        Ok(())
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    fn publish_timer(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.timer_update_tx.send(snapshot) {
            warn!("Failed to send timer update: {}", e);
        }
    }
}

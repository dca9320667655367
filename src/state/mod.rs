//! State management module
//!
//! This module contains the session state machine, the preference store and
//! the process-wide application state binding them to the countdown driver.

pub mod session;
pub mod timer_state;
pub mod preferences;
pub mod app_state;

// Re-export main types
pub use session::{Durations, Locale, Reconfigure, SessionType, TimerSettings};
pub use timer_state::{DriverCommand, TickOutcome, TimerMachine, TimerSnapshot};
pub use preferences::{PreferenceStore, Preferences, PresentationAttributes};
pub use app_state::AppState;

//! Background tasks module
//!
//! This module contains the countdown driver that runs alongside the HTTP server.

pub mod countdown;

// Re-export main types
pub use countdown::{countdown_task, CountdownDriver, TICK_INTERVAL};

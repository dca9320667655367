//! Local service module
//!
//! This module contains the best-effort key-value storage that preferences
//! and durations are persisted to.

pub mod local_storage;

// Re-export main types
pub use local_storage::LocalStorage;

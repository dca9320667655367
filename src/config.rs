//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::{
    services::LocalStorage,
    state::{
        session::{
            DEFAULT_LONG_BREAK_INTERVAL, DEFAULT_LONG_BREAK_MINUTES, DEFAULT_SHORT_BREAK_MINUTES,
            DEFAULT_WORK_MINUTES,
        },
        Durations, Locale, TimerSettings,
    },
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "pomodoro-timer")]
#[command(about = "A Pomodoro timer daemon serving a local presentation layer")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "25025")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Default work session length in minutes
    #[arg(short, long, default_value_t = DEFAULT_WORK_MINUTES)]
    pub work: f64,

    /// Default short break length in minutes
    #[arg(short, long, default_value_t = DEFAULT_SHORT_BREAK_MINUTES)]
    pub short_break: f64,

    /// Default long break length in minutes
    #[arg(short, long, default_value_t = DEFAULT_LONG_BREAK_MINUTES)]
    pub long_break: f64,

    /// Work sessions completed before a long break
    #[arg(
        short = 'i',
        long,
        default_value_t = DEFAULT_LONG_BREAK_INTERVAL,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub long_break_interval: u32,

    /// Stop after each break instead of chaining into the next work session
    #[arg(long)]
    pub no_auto_cycle: bool,

    /// Local storage file (defaults to the user's local data directory)
    #[arg(long)]
    pub storage: Option<PathBuf>,

    /// Language of session labels
    #[arg(long, value_enum, default_value_t = Locale::En)]
    pub locale: Locale,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Timer defaults, with invalid durations replaced by the built-in ones
    pub fn timer_defaults(&self) -> TimerSettings {
        TimerSettings {
            durations: Durations::new(self.work, self.short_break, self.long_break)
                .or_fallback(&Durations::default()),
            long_break_interval: self.long_break_interval,
            auto_cycle: !self.no_auto_cycle,
        }
    }

    /// Storage location: the explicit flag, else the platform default
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage.clone().or_else(LocalStorage::default_path)
    }

    /// Open local storage, in memory when no location is available
    pub fn open_storage(&self) -> LocalStorage {
        match self.storage_path() {
            Some(path) => LocalStorage::open(&path),
            None => LocalStorage::in_memory(),
        }
    }
}

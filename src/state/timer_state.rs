//! Pomodoro session state machine
//!
//! The machine never owns a timer. Every operation that affects the countdown
//! returns a [`DriverCommand`] which the caller applies to the countdown
//! driver slot.

use serde::{Deserialize, Serialize};

use super::session::{Durations, Locale, Reconfigure, SessionType, TimerSettings};

/// What the caller must do with the countdown driver after an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverCommand {
    /// Register a fresh one-second driver
    Start,
    /// Cancel the live driver, if any
    Stop,
    /// Leave the driver as it is
    Keep,
}

/// Result of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Ticks are ignored while idle
    Idle,
    /// One second was counted down
    Counted { remaining_seconds: u64 },
    /// The session expired and the next one was entered
    Advanced {
        from: SessionType,
        to: SessionType,
        command: DriverCommand,
    },
    /// A break expired without auto-cycle; the machine stopped on it
    Finished { session: SessionType },
}

impl TickOutcome {
    pub fn driver_command(&self) -> DriverCommand {
        match self {
            TickOutcome::Idle | TickOutcome::Counted { .. } => DriverCommand::Keep,
            TickOutcome::Advanced { command, .. } => *command,
            TickOutcome::Finished { .. } => DriverCommand::Stop,
        }
    }
}

/// Observable view of the machine, recomputed on every read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub session: SessionType,
    pub session_label: String,
    pub remaining_seconds: u64,
    pub total_seconds: u64,
    pub formatted_time: String,
    pub running: bool,
    pub button_label: String,
    pub completed_work: u32,
    pub long_break_interval: u32,
    pub auto_cycle: bool,
    pub durations: Durations,
}

/// Session/countdown state machine
#[derive(Debug, Clone)]
pub struct TimerMachine {
    defaults: TimerSettings,
    settings: TimerSettings,
    session: SessionType,
    remaining_seconds: u64,
    running: bool,
    completed_work: u32,
}

impl TimerMachine {
    /// Create an idle machine at the start of a work session.
    ///
    /// `defaults` backs every absent or invalid reconfiguration value;
    /// `settings` is what the machine starts with.
    pub fn new(defaults: TimerSettings, settings: TimerSettings) -> Self {
        let defaults = sanitize(defaults, &TimerSettings::default());
        let settings = sanitize(settings, &defaults);
        Self {
            defaults,
            settings,
            session: SessionType::Work,
            remaining_seconds: settings.durations.seconds(SessionType::Work),
            running: false,
            completed_work: 0,
        }
    }

    /// Start or pause the countdown.
    ///
    /// While idle, a reconfiguration request rewinds the cycle to a fresh work
    /// session before starting. Without one the current session resumes.
    pub fn toggle(&mut self, reconfigure: Option<&Reconfigure>) -> DriverCommand {
        if self.running {
            self.running = false;
            return DriverCommand::Stop;
        }

        match reconfigure {
            Some(request) => {
                self.reconfigure(request);
            }
            None if self.remaining_seconds == 0 => {
                // finished break without auto-cycle: move on before resuming
                self.advance_session();
            }
            None => {}
        }

        self.running = true;
        DriverCommand::Start
    }

    /// Overwrite durations and cycle configuration and rewind to work.
    ///
    /// Returns false, leaving the machine untouched, while running.
    pub fn reconfigure(&mut self, request: &Reconfigure) -> bool {
        if self.running {
            return false;
        }

        self.settings = self.defaults.resolve(request, self.settings.auto_cycle);
        self.session = SessionType::Work;
        self.remaining_seconds = self.total_seconds();
        self.completed_work = 0;
        true
    }

    /// Switch to the given session with its full duration. Idle only.
    pub fn select_session(&mut self, session: SessionType) -> bool {
        if self.running {
            return false;
        }

        self.session = session;
        self.remaining_seconds = self.total_seconds();
        true
    }

    /// Count down one second, expiring the session once it reaches zero
    pub fn tick(&mut self) -> TickOutcome {
        if !self.running {
            return TickOutcome::Idle;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds > 0 {
            return TickOutcome::Counted {
                remaining_seconds: self.remaining_seconds,
            };
        }

        if self.session.is_break() && !self.settings.auto_cycle {
            self.running = false;
            return TickOutcome::Finished {
                session: self.session,
            };
        }

        let from = self.session;
        let command = self.advance_session();
        TickOutcome::Advanced {
            from,
            to: self.session,
            command,
        }
    }

    /// Move to the next session in the cycle
    pub fn advance_session(&mut self) -> DriverCommand {
        match self.session {
            SessionType::Work => {
                self.completed_work += 1;
                if self.completed_work % self.settings.long_break_interval == 0 {
                    self.session = SessionType::LongBreak;
                    self.completed_work = 0;
                } else {
                    self.session = SessionType::ShortBreak;
                }
                self.remaining_seconds = self.total_seconds();
                DriverCommand::Keep
            }
            SessionType::ShortBreak => {
                self.session = SessionType::Work;
                self.remaining_seconds = self.total_seconds();
                DriverCommand::Keep
            }
            SessionType::LongBreak => {
                // a long break always ends the automatic cycle
                self.session = SessionType::Work;
                self.remaining_seconds = self.total_seconds();
                self.running = false;
                DriverCommand::Stop
            }
        }
    }

    /// Stop and rewind the current session to its full length
    pub fn reset(&mut self) -> DriverCommand {
        self.running = false;
        self.remaining_seconds = self.total_seconds();
        DriverCommand::Stop
    }

    pub fn session(&self) -> SessionType {
        self.session
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn completed_work(&self) -> u32 {
        self.completed_work
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    /// Full length of the current session in seconds
    pub fn total_seconds(&self) -> u64 {
        self.settings.durations.seconds(self.session)
    }

    /// Remaining time as `mm:ss`
    pub fn formatted_time(&self) -> String {
        format_time(self.remaining_seconds)
    }

    /// Label of the start/pause control
    pub fn button_label(&self) -> &'static str {
        if self.running {
            "Pause"
        } else {
            "Start"
        }
    }

    pub fn snapshot(&self, locale: Locale) -> TimerSnapshot {
        TimerSnapshot {
            session: self.session,
            session_label: self.session.label(locale).to_string(),
            remaining_seconds: self.remaining_seconds,
            total_seconds: self.total_seconds(),
            formatted_time: self.formatted_time(),
            running: self.running,
            button_label: self.button_label().to_string(),
            completed_work: self.completed_work,
            long_break_interval: self.settings.long_break_interval,
            auto_cycle: self.settings.auto_cycle,
            durations: self.settings.durations,
        }
    }
}

impl Default for TimerMachine {
    fn default() -> Self {
        Self::new(TimerSettings::default(), TimerSettings::default())
    }
}

/// Format seconds as zero-padded `mm:ss`
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn sanitize(settings: TimerSettings, fallback: &TimerSettings) -> TimerSettings {
    TimerSettings {
        durations: settings.durations.or_fallback(&fallback.durations),
        long_break_interval: if settings.long_break_interval > 0 {
            settings.long_break_interval
        } else {
            fallback.long_break_interval
        },
        auto_cycle: settings.auto_cycle,
    }
}

//! Session types, durations and timer settings

use clap::ValueEnum;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Default work session length in minutes
pub const DEFAULT_WORK_MINUTES: f64 = 25.0;
/// Default short break length in minutes
pub const DEFAULT_SHORT_BREAK_MINUTES: f64 = 5.0;
/// Default long break length in minutes
pub const DEFAULT_LONG_BREAK_MINUTES: f64 = 15.0;
/// Work sessions completed before a long break is inserted
pub const DEFAULT_LONG_BREAK_INTERVAL: u32 = 4;

/// Kind of timed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionType {
    #[default]
    #[serde(alias = "pomodoro")]
    Work,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionType::Work => "work",
            SessionType::ShortBreak => "short-break",
            SessionType::LongBreak => "long-break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionType::Work)
    }

    /// Human label shown above the countdown
    pub fn label(&self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::En, SessionType::Work) => "Pomodoro",
            (Locale::En, SessionType::ShortBreak) => "Short break",
            (Locale::En, SessionType::LongBreak) => "Long break",
            (Locale::Fr, SessionType::Work) => "Pomodoro",
            (Locale::Fr, SessionType::ShortBreak) => "Courte pause",
            (Locale::Fr, SessionType::LongBreak) => "Longue pause",
        }
    }
}

/// Language used for session labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
}

/// Session lengths in minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Durations {
    pub work: f64,
    pub short_break: f64,
    pub long_break: f64,
}

impl Durations {
    pub fn new(work: f64, short_break: f64, long_break: f64) -> Self {
        Self {
            work,
            short_break,
            long_break,
        }
    }

    /// Length of the given session in minutes
    pub fn minutes(&self, session: SessionType) -> f64 {
        match session {
            SessionType::Work => self.work,
            SessionType::ShortBreak => self.short_break,
            SessionType::LongBreak => self.long_break,
        }
    }

    /// Length of the given session in whole seconds
    pub fn seconds(&self, session: SessionType) -> u64 {
        minutes_to_seconds(self.minutes(session))
    }

    /// Replace every invalid duration with the matching one from `fallback`
    pub fn or_fallback(self, fallback: &Durations) -> Self {
        Self {
            work: valid_or(Some(self.work), fallback.work),
            short_break: valid_or(Some(self.short_break), fallback.short_break),
            long_break: valid_or(Some(self.long_break), fallback.long_break),
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self::new(
            DEFAULT_WORK_MINUTES,
            DEFAULT_SHORT_BREAK_MINUTES,
            DEFAULT_LONG_BREAK_MINUTES,
        )
    }
}

/// Everything a reconfiguration may overwrite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimerSettings {
    pub durations: Durations,
    pub long_break_interval: u32,
    pub auto_cycle: bool,
}

impl TimerSettings {
    /// Resolve a reconfiguration request, treating `self` as the defaults.
    ///
    /// Absent or invalid durations and intervals take the default value.
    /// An absent auto-cycle flag keeps `current_auto_cycle`.
    pub fn resolve(&self, request: &Reconfigure, current_auto_cycle: bool) -> TimerSettings {
        TimerSettings {
            durations: Durations {
                work: valid_or(request.work_minutes, self.durations.work),
                short_break: valid_or(request.short_break_minutes, self.durations.short_break),
                long_break: valid_or(request.long_break_minutes, self.durations.long_break),
            },
            long_break_interval: request
                .long_break_interval
                .filter(|interval| *interval > 0)
                .unwrap_or(self.long_break_interval),
            auto_cycle: request.auto_cycle.unwrap_or(current_auto_cycle),
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            durations: Durations::default(),
            long_break_interval: DEFAULT_LONG_BREAK_INTERVAL,
            auto_cycle: true,
        }
    }
}

/// Parameters supplied alongside a start request or a settings update.
///
/// Each field is read on its own: a value of the wrong type reads as absent
/// instead of rejecting the whole request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reconfigure {
    #[serde(deserialize_with = "lenient_minutes")]
    pub work_minutes: Option<f64>,
    #[serde(deserialize_with = "lenient_minutes")]
    pub short_break_minutes: Option<f64>,
    #[serde(deserialize_with = "lenient_minutes")]
    pub long_break_minutes: Option<f64>,
    #[serde(deserialize_with = "lenient_interval")]
    pub long_break_interval: Option<u32>,
    #[serde(deserialize_with = "lenient_flag")]
    pub auto_cycle: Option<bool>,
}

/// A number, or a string holding one
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().parse().ok(),
        value => value.as_f64(),
    })
}

fn lenient_interval<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let interval = match Value::deserialize(deserializer)? {
        Value::String(s) => s.trim().parse::<u64>().ok(),
        value => value.as_u64(),
    };
    Ok(interval.and_then(|i| u32::try_from(i).ok()))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool())
}

/// Convert minutes to whole seconds, rounding to nearest and clamping at zero
pub fn minutes_to_seconds(minutes: f64) -> u64 {
    let seconds = (minutes * 60.0).round();
    if seconds.is_finite() && seconds > 0.0 {
        seconds as u64
    } else {
        0
    }
}

/// A duration is usable when it is a finite, strictly positive number of minutes
pub fn is_valid_minutes(minutes: f64) -> bool {
    minutes.is_finite() && minutes > 0.0
}

fn valid_or(minutes: Option<f64>, fallback: f64) -> f64 {
    minutes.filter(|m| is_valid_minutes(*m)).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_type_names() {
        assert_eq!(SessionType::ShortBreak.as_str(), "short-break");
        assert_eq!(SessionType::default(), SessionType::Work);
        assert!(serde_json::from_str::<SessionType>("\"nap\"").is_err());
    }

    #[test]
    fn test_session_type_serde_alias() {
        let parsed: SessionType = serde_json::from_str("\"pomodoro\"").unwrap();
        assert_eq!(parsed, SessionType::Work);
        assert_eq!(
            serde_json::to_string(&SessionType::LongBreak).unwrap(),
            "\"long-break\""
        );
    }

    #[test]
    fn test_labels_follow_locale() {
        assert_eq!(SessionType::ShortBreak.label(Locale::En), "Short break");
        assert_eq!(SessionType::ShortBreak.label(Locale::Fr), "Courte pause");
        assert_eq!(SessionType::LongBreak.label(Locale::Fr), "Longue pause");
    }

    #[test]
    fn test_minutes_to_seconds_rounds_and_clamps() {
        assert_eq!(minutes_to_seconds(0.05), 3);
        assert_eq!(minutes_to_seconds(0.0833), 5);
        assert_eq!(minutes_to_seconds(0.1667), 10);
        assert_eq!(minutes_to_seconds(25.0), 1500);
        assert_eq!(minutes_to_seconds(-1.0), 0);
        assert_eq!(minutes_to_seconds(f64::NAN), 0);
    }

    #[test]
    fn test_resolve_replaces_invalid_values_with_defaults() {
        let defaults = TimerSettings::default();
        let request = Reconfigure {
            work_minutes: Some(50.0),
            short_break_minutes: Some(-3.0),
            long_break_minutes: Some(f64::INFINITY),
            long_break_interval: Some(0),
            auto_cycle: None,
        };

        let resolved = defaults.resolve(&request, false);
        assert_eq!(resolved.durations.work, 50.0);
        assert_eq!(resolved.durations.short_break, DEFAULT_SHORT_BREAK_MINUTES);
        assert_eq!(resolved.durations.long_break, DEFAULT_LONG_BREAK_MINUTES);
        assert_eq!(resolved.long_break_interval, DEFAULT_LONG_BREAK_INTERVAL);
        assert!(!resolved.auto_cycle);
    }

    #[test]
    fn test_reconfigure_reads_fields_independently() {
        let request: Reconfigure = serde_json::from_str(
            r#"{"work_minutes": 50, "short_break_minutes": "x", "long_break_minutes": "20",
                "long_break_interval": -2, "auto_cycle": "yes"}"#,
        )
        .unwrap();

        assert_eq!(request.work_minutes, Some(50.0));
        assert_eq!(request.short_break_minutes, None);
        assert_eq!(request.long_break_minutes, Some(20.0));
        assert_eq!(request.long_break_interval, None);
        assert_eq!(request.auto_cycle, None);

        let resolved = TimerSettings::default().resolve(&request, true);
        assert_eq!(resolved.durations, Durations::new(50.0, 5.0, 20.0));
        assert_eq!(resolved.long_break_interval, DEFAULT_LONG_BREAK_INTERVAL);
    }

    #[test]
    fn test_reconfigure_null_and_missing_fields() {
        let request: Reconfigure =
            serde_json::from_str(r#"{"work_minutes": null, "long_break_interval": 3}"#).unwrap();
        assert_eq!(request.work_minutes, None);
        assert_eq!(request.long_break_interval, Some(3));
        assert_eq!(request.auto_cycle, None);
    }

    #[test]
    fn test_durations_or_fallback() {
        let durations = Durations::new(0.0, 3.0, f64::NAN).or_fallback(&Durations::default());
        assert_eq!(durations, Durations::new(25.0, 3.0, 15.0));
    }
}

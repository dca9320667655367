//! User preferences and the presentation attributes derived from them

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::session::Durations;
use crate::services::local_storage::{
    LocalStorage, ACCENT_COLOR_KEY, FONT_KEY, LONG_BREAK_DURATION_KEY, SHORT_BREAK_DURATION_KEY,
    WORK_DURATION_KEY,
};

pub const DEFAULT_ACCENT_COLOR: &str = "red";
pub const DEFAULT_FONT: &str = "kumbh-sans";

/// Accent color and font choice as the user picked them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub accent_color: String,
    pub font: String,
}

impl Preferences {
    /// Attributes the presentation layer applies page-wide
    pub fn presentation(&self) -> PresentationAttributes {
        let (font_family, font_weight) = resolve_font(&self.font);
        PresentationAttributes {
            accent_color: resolve_accent_color(&self.accent_color),
            font_family,
            font_weight,
        }
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            accent_color: DEFAULT_ACCENT_COLOR.to_string(),
            font: DEFAULT_FONT.to_string(),
        }
    }
}

/// CSS-ready values for the accent color and font
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationAttributes {
    pub accent_color: String,
    pub font_family: String,
    pub font_weight: u16,
}

/// Map a color preset to its CSS value; anything else is used verbatim
pub fn resolve_accent_color(name: &str) -> String {
    match name.trim().to_lowercase().as_str() {
        "red" => "#F87070".to_string(),
        "cyan" => "#70F3F8".to_string(),
        "violet" => "#D881F8".to_string(),
        _ => name.trim().to_string(),
    }
}

/// Map a font preset to its CSS family and weight
pub fn resolve_font(name: &str) -> (String, u16) {
    match name.trim().to_lowercase().as_str() {
        "kumbh-sans" => ("'Kumbh Sans', sans-serif".to_string(), 700),
        "roboto-slab" => ("'Roboto Slab', serif".to_string(), 700),
        "space-mono" => ("'Space Mono', monospace".to_string(), 700),
        _ => (format!("{}, sans-serif", name.trim()), 400),
    }
}

/// Preferences plus the storage they are persisted to
#[derive(Debug)]
pub struct PreferenceStore {
    storage: LocalStorage,
    preferences: Preferences,
}

impl PreferenceStore {
    /// Read preferences from storage, defaulting whatever is absent
    pub fn load(storage: LocalStorage) -> Self {
        let defaults = Preferences::default();
        let preferences = Preferences {
            accent_color: non_empty(storage.get(ACCENT_COLOR_KEY)).unwrap_or(defaults.accent_color),
            font: non_empty(storage.get(FONT_KEY)).unwrap_or(defaults.font),
        };
        debug!("Loaded preferences: {:?}", preferences);

        Self {
            storage,
            preferences,
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    /// Stored durations, each falling back to `fallback` when absent or malformed
    pub fn durations(&self, fallback: &Durations) -> Durations {
        Durations {
            work: self.storage.get_f64(WORK_DURATION_KEY).unwrap_or(fallback.work),
            short_break: self
                .storage
                .get_f64(SHORT_BREAK_DURATION_KEY)
                .unwrap_or(fallback.short_break),
            long_break: self
                .storage
                .get_f64(LONG_BREAK_DURATION_KEY)
                .unwrap_or(fallback.long_break),
        }
        .or_fallback(fallback)
    }

    pub fn set_accent_color(&mut self, value: &str) -> PresentationAttributes {
        info!("Setting accent color to: {}", value);
        self.preferences.accent_color = value.trim().to_string();
        self.storage.set(ACCENT_COLOR_KEY, self.preferences.accent_color.clone());
        self.preferences.presentation()
    }

    pub fn set_font(&mut self, value: &str) -> PresentationAttributes {
        info!("Setting font to: {}", value);
        self.preferences.font = value.trim().to_string();
        self.storage.set(FONT_KEY, self.preferences.font.clone());
        self.preferences.presentation()
    }

    pub fn save_durations(&mut self, durations: &Durations) {
        debug!("Persisting durations: {:?}", durations);
        self.storage.set(WORK_DURATION_KEY, durations.work.to_string());
        self.storage
            .set(SHORT_BREAK_DURATION_KEY, durations.short_break.to_string());
        self.storage
            .set(LONG_BREAK_DURATION_KEY, durations.long_break.to_string());
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_resolve() {
        assert_eq!(resolve_accent_color("Cyan"), "#70F3F8");
        assert_eq!(resolve_accent_color("#123456"), "#123456");
        assert_eq!(resolve_font("space-mono").0, "'Space Mono', monospace");
        assert_eq!(resolve_font("Georgia"), ("Georgia, sans-serif".to_string(), 400));
    }

    #[test]
    fn test_defaults_when_storage_empty() {
        let store = PreferenceStore::load(LocalStorage::in_memory());
        assert_eq!(store.preferences(), &Preferences::default());
        assert_eq!(store.durations(&Durations::default()), Durations::default());
        assert_eq!(store.preferences().presentation().accent_color, "#F87070");
    }

    #[test]
    fn test_malformed_durations_fall_back() {
        let mut storage = LocalStorage::in_memory();
        storage.set(WORK_DURATION_KEY, "abc");
        storage.set(SHORT_BREAK_DURATION_KEY, "-2");
        storage.set(LONG_BREAK_DURATION_KEY, "20");

        let store = PreferenceStore::load(storage);
        assert_eq!(
            store.durations(&Durations::default()),
            Durations::new(25.0, 5.0, 20.0)
        );
    }

    #[test]
    fn test_last_write_wins() {
        let mut store = PreferenceStore::load(LocalStorage::in_memory());
        store.set_font("roboto-slab");
        let attributes = store.set_font("space-mono");
        assert_eq!(store.preferences().font, "space-mono");
        assert_eq!(attributes.font_family, "'Space Mono', monospace");

        let attributes = store.set_accent_color("violet");
        assert_eq!(attributes.accent_color, "#D881F8");
    }

    #[test]
    fn test_saved_durations_reload() {
        let mut store = PreferenceStore::load(LocalStorage::in_memory());
        store.save_durations(&Durations::new(0.05, 0.0167, 0.5));
        assert_eq!(
            store.durations(&Durations::default()),
            Durations::new(0.05, 0.0167, 0.5)
        );
    }
}

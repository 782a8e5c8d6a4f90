// ABOUTME: User-facing advice settings with persistence and partial updates
// ABOUTME: The health reminder category can never be switched off
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Advice Settings
//!
//! The enumerated options the host UI exposes: per-category toggles plus a
//! handful of presentation switches. Updates are partial merges; listeners
//! registered on the engine are notified after each successful update so the
//! UI can re-render without polling.

use crate::storage::{keys, Store};
use crate::types::AdviceCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

fn default_true() -> bool {
    true
}

fn default_max_per_day() -> u32 {
    20
}

fn default_quiet_start() -> u32 {
    23
}

fn default_quiet_end() -> u32 {
    7
}

/// Persisted advice settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdviceSettings {
    /// Per-category enable flags; missing categories count as enabled
    #[serde(default)]
    pub categories: HashMap<String, bool>,
    /// Automatic toast display
    #[serde(default = "default_true")]
    pub toasts_enabled: bool,
    /// Sound on advice display
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    /// Haptic feedback on advice display
    #[serde(default = "default_true")]
    pub haptic_enabled: bool,
    /// Expanded detail rendering
    #[serde(default = "default_true")]
    pub show_details: bool,
    /// Daily display ceiling
    #[serde(default = "default_max_per_day")]
    pub max_per_day: u32,
    /// Quiet hours start (inclusive). The window is enforced by the host
    /// presentation layer via [`AdviceSettings::is_quiet_hour`]; generation
    /// itself is not gated on it.
    #[serde(default = "default_quiet_start")]
    pub quiet_hours_start: u32,
    /// Quiet hours end (exclusive); see `quiet_hours_start`
    #[serde(default = "default_quiet_end")]
    pub quiet_hours_end: u32,
}

impl Default for AdviceSettings {
    fn default() -> Self {
        Self {
            categories: HashMap::new(),
            toasts_enabled: true,
            sound_enabled: true,
            haptic_enabled: true,
            show_details: true,
            max_per_day: default_max_per_day(),
            quiet_hours_start: default_quiet_start(),
            quiet_hours_end: default_quiet_end(),
        }
    }
}

impl AdviceSettings {
    /// Is a category enabled? Reminder categories (health) are always on,
    /// and categories never toggled default to on.
    #[must_use]
    pub fn category_enabled(&self, category: AdviceCategory) -> bool {
        if category.is_reminder() {
            return true;
        }
        self.categories.get(category.as_str()).copied().unwrap_or(true)
    }

    /// Is `hour` inside the quiet window? The window may wrap midnight
    /// (23 → 7 means 23:00-06:59). Hosts call this before surfacing a toast;
    /// the engine stores the window but does not gate generation on it.
    #[must_use]
    pub fn is_quiet_hour(&self, hour: u32) -> bool {
        let (start, end) = (self.quiet_hours_start, self.quiet_hours_end);
        if start == end {
            return false;
        }
        if start < end {
            hour >= start && hour < end
        } else {
            hour >= start || hour < end
        }
    }
}

/// Partial settings update; `None` fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsPatch {
    /// Category toggles to merge in
    pub categories: Option<HashMap<String, bool>>,
    /// Toast switch
    pub toasts_enabled: Option<bool>,
    /// Sound switch
    pub sound_enabled: Option<bool>,
    /// Haptics switch
    pub haptic_enabled: Option<bool>,
    /// Detail rendering switch
    pub show_details: Option<bool>,
    /// Daily ceiling
    pub max_per_day: Option<u32>,
    /// Quiet hours start
    pub quiet_hours_start: Option<u32>,
    /// Quiet hours end
    pub quiet_hours_end: Option<u32>,
}

/// Load settings from the persistent store (defaults when absent/malformed).
#[must_use]
pub fn load(store: &Store) -> AdviceSettings {
    store.read_opt(keys::SETTINGS).unwrap_or_default()
}

/// Merge a patch into the stored settings and persist the result. Attempts to
/// disable the health category are ignored.
pub fn update(store: &Store, patch: SettingsPatch) -> AdviceSettings {
    let mut settings = load(store);
    if let Some(categories) = patch.categories {
        for (key, enabled) in categories {
            if key == AdviceCategory::Health.as_str() {
                continue;
            }
            settings.categories.insert(key, enabled);
        }
    }
    if let Some(v) = patch.toasts_enabled {
        settings.toasts_enabled = v;
    }
    if let Some(v) = patch.sound_enabled {
        settings.sound_enabled = v;
    }
    if let Some(v) = patch.haptic_enabled {
        settings.haptic_enabled = v;
    }
    if let Some(v) = patch.show_details {
        settings.show_details = v;
    }
    if let Some(v) = patch.max_per_day {
        settings.max_per_day = v;
    }
    if let Some(v) = patch.quiet_hours_start {
        settings.quiet_hours_start = v.min(23);
    }
    if let Some(v) = patch.quiet_hours_end {
        settings.quiet_hours_end = v.min(23);
    }
    store.write(keys::SETTINGS, &settings);
    settings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> Store {
        Store::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn defaults_enable_everything() {
        let settings = AdviceSettings::default();
        assert!(settings.category_enabled(AdviceCategory::Nutrition));
        assert!(settings.category_enabled(AdviceCategory::Health));
        assert!(settings.toasts_enabled);
        assert_eq!(settings.max_per_day, 20);
    }

    #[test]
    fn partial_update_persists() {
        let store = store();
        let patch = SettingsPatch {
            categories: Some([("nutrition".to_owned(), false)].into()),
            sound_enabled: Some(false),
            ..SettingsPatch::default()
        };
        update(&store, patch);
        let settings = load(&store);
        assert!(!settings.category_enabled(AdviceCategory::Nutrition));
        assert!(settings.category_enabled(AdviceCategory::Hydration));
        assert!(!settings.sound_enabled);
        assert!(settings.toasts_enabled, "untouched fields keep defaults");
    }

    #[test]
    fn health_cannot_be_disabled() {
        let store = store();
        let patch = SettingsPatch {
            categories: Some([("health".to_owned(), false)].into()),
            ..SettingsPatch::default()
        };
        let settings = update(&store, patch);
        assert!(settings.category_enabled(AdviceCategory::Health));
    }

    #[test]
    fn quiet_hours_wrap_midnight() {
        let settings = AdviceSettings::default();
        assert!(settings.is_quiet_hour(23));
        assert!(settings.is_quiet_hour(3));
        assert!(!settings.is_quiet_hour(7));
        assert!(!settings.is_quiet_hour(12));
    }
}

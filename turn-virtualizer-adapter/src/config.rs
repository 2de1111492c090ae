//! The configuration store the engine reads its [`Settings`] from.
//!
//! Values are persisted as JSON (`{"enabled": true, "visibleCount": 10}`); missing keys take
//! their defaults. Writes that change a value queue a [`SettingsChange`] notification, which
//! the controller drains on its next tick.

use std::collections::VecDeque;

use turn_virtualizer::{Settings, SettingsChange};

/// Read/write access to settings, as seen by the operator panel.
pub trait SettingsStore {
    fn get(&self) -> Settings;

    fn set(&mut self, change: SettingsChange);
}

#[derive(Clone, Debug, Default)]
pub struct ConfigStore {
    settings: Settings,
    changes: VecDeque<SettingsChange>,
}

impl ConfigStore {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: Settings::new(settings.enabled, settings.visible_count),
            changes: VecDeque::new(),
        }
    }

    /// Loads settings from JSON, falling back to defaults if the document is invalid.
    pub fn from_json(json: &str) -> Self {
        Self::new(load_settings(json))
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.settings).unwrap_or_default()
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Drains queued change notifications, oldest first.
    pub fn take_changes(&mut self) -> Vec<SettingsChange> {
        self.changes.drain(..).collect()
    }
}

impl SettingsStore for ConfigStore {
    fn get(&self) -> Settings {
        self.settings
    }

    /// Writes the values present in `change`. Only keys whose value actually changed are
    /// notified.
    fn set(&mut self, change: SettingsChange) {
        let next = self.settings.merged(&change);
        let notified = SettingsChange {
            enabled: (next.enabled != self.settings.enabled).then_some(next.enabled),
            visible_count: (next.visible_count != self.settings.visible_count)
                .then_some(next.visible_count),
        };
        self.settings = next;
        if !notified.is_empty() {
            vdebug!(?notified, "settings written");
            self.changes.push_back(notified);
        }
    }
}

pub fn load_settings(json: &str) -> Settings {
    match serde_json::from_str::<Settings>(json) {
        Ok(settings) => Settings::new(settings.enabled, settings.visible_count),
        Err(_err) => {
            vwarn!(err = %_err, "invalid settings document; using defaults");
            Settings::default()
        }
    }
}

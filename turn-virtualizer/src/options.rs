use alloc::sync::Arc;

use crate::Status;

/// A callback fired after the partition between live and stored items changes.
///
/// It receives the counts as they stand once the mutation (eviction, restoration, flush) has
/// been applied.
pub type OnChangeCallback = Arc<dyn Fn(Status) + Send + Sync>;

/// User-facing configuration, owned by an external store.
///
/// With `feature = "serde"`, missing keys deserialize to the defaults
/// (`{"enabled": true, "visibleCount": 10}`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct Settings {
    pub enabled: bool,
    /// Size of the on-surface window. Always at least 1.
    pub visible_count: usize,
}

impl Settings {
    pub const DEFAULT_VISIBLE_COUNT: usize = 10;

    pub fn new(enabled: bool, visible_count: usize) -> Self {
        Self {
            enabled,
            visible_count: visible_count.max(1),
        }
    }

    /// Applies a change notification, returning `self` with `visible_count` clamped.
    pub fn merged(mut self, change: &SettingsChange) -> Self {
        if let Some(enabled) = change.enabled {
            self.enabled = enabled;
        }
        if let Some(visible_count) = change.visible_count {
            self.visible_count = visible_count.max(1);
        }
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            visible_count: Self::DEFAULT_VISIBLE_COUNT,
        }
    }
}

/// A configuration change notification. Either key may be absent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct SettingsChange {
    pub enabled: Option<bool>,
    pub visible_count: Option<usize>,
}

impl SettingsChange {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            visible_count: None,
        }
    }

    pub fn visible_count(visible_count: usize) -> Self {
        Self {
            enabled: None,
            visible_count: Some(visible_count),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_none() && self.visible_count.is_none()
    }
}

/// Timing and sizing knobs of [`crate::Engine`].
///
/// All durations are in the same unit as the `now_ms` values the adapter feeds the engine.
pub struct EngineOptions {
    /// Delay between a viewport trigger and the batch being applied (loading affordance shown).
    pub loading_delay_ms: u64,
    /// Delay after a triggered batch before the lock is released and growth monitoring resumes.
    pub settle_delay_ms: u64,
    /// Margin around the viewport within which the sentinel counts as intersecting.
    pub trigger_margin: u32,
    /// Items restored per viewport trigger.
    pub restore_batch: usize,
    /// Render-surface probes before bootstrap gives up.
    pub bootstrap_attempts: u32,
    pub bootstrap_interval_ms: u64,
    /// Delay between a navigation reset and the restart on the new sequence.
    pub navigation_settle_ms: u64,

    /// Optional callback fired when the live/stored partition changes.
    pub on_change: Option<OnChangeCallback>,
}

impl Clone for EngineOptions {
    fn clone(&self) -> Self {
        Self {
            loading_delay_ms: self.loading_delay_ms,
            settle_delay_ms: self.settle_delay_ms,
            trigger_margin: self.trigger_margin,
            restore_batch: self.restore_batch,
            bootstrap_attempts: self.bootstrap_attempts,
            bootstrap_interval_ms: self.bootstrap_interval_ms,
            navigation_settle_ms: self.navigation_settle_ms,
            on_change: self.on_change.clone(),
        }
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            loading_delay_ms: 250,
            settle_delay_ms: 100,
            trigger_margin: 300,
            restore_batch: 10,
            bootstrap_attempts: 20,
            bootstrap_interval_ms: 500,
            navigation_settle_ms: 1200,
            on_change: None,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loading_delay_ms(mut self, delay_ms: u64) -> Self {
        self.loading_delay_ms = delay_ms;
        self
    }

    pub fn with_settle_delay_ms(mut self, delay_ms: u64) -> Self {
        self.settle_delay_ms = delay_ms;
        self
    }

    pub fn with_trigger_margin(mut self, margin: u32) -> Self {
        self.trigger_margin = margin;
        self
    }

    /// Sets the viewport-triggered batch size. Clamped to at least 1.
    pub fn with_restore_batch(mut self, batch: usize) -> Self {
        self.restore_batch = batch.max(1);
        self
    }

    pub fn with_bootstrap(mut self, attempts: u32, interval_ms: u64) -> Self {
        self.bootstrap_attempts = attempts;
        self.bootstrap_interval_ms = interval_ms;
        self
    }

    pub fn with_navigation_settle_ms(mut self, delay_ms: u64) -> Self {
        self.navigation_settle_ms = delay_ms;
        self
    }

    pub fn with_on_change(mut self, on_change: Option<impl Fn(Status) + Send + Sync + 'static>) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as OnChangeCallback);
        self
    }
}

impl core::fmt::Debug for EngineOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EngineOptions")
            .field("loading_delay_ms", &self.loading_delay_ms)
            .field("settle_delay_ms", &self.settle_delay_ms)
            .field("trigger_margin", &self.trigger_margin)
            .field("restore_batch", &self.restore_batch)
            .field("bootstrap_attempts", &self.bootstrap_attempts)
            .field("bootstrap_interval_ms", &self.bootstrap_interval_ms)
            .field("navigation_settle_ms", &self.navigation_settle_ms)
            .finish_non_exhaustive()
    }
}

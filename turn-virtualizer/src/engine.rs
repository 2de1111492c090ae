use alloc::string::String;
use alloc::vec::Vec;

use crate::schedule::Task;
use crate::{
    EngineOptions, Event, Host, ItemHandle, Phase, Restoration, Scheduler, Sentinel, Settings,
    SettingsChange, Status, StoredBuffer, Subscription, TaskKind,
};

/// The eviction/restoration engine for one conversation.
///
/// Owns every piece of mutable state: the stored buffer, the restoration lock, the sentinel and
/// subscription bookkeeping, and the scheduled tasks. The live sequence itself is the host's
/// container; the engine reads it through [`Host::live_items`].
///
/// All entry points take the host and the current time explicitly. Adapters deliver one
/// notification at a time, either through [`Engine::handle`] or through the matching `on_*`
/// method.
#[derive(Clone, Debug)]
pub struct Engine<K> {
    pub(crate) options: EngineOptions,
    pub(crate) settings: Settings,
    pub(crate) stored: StoredBuffer<K>,
    pub(crate) phase: Phase,
    pub(crate) restoration: Restoration,
    pub(crate) sentinel: Option<Sentinel>,
    pub(crate) growth: Subscription,
    pub(crate) visibility: Subscription,
    pub(crate) eviction_pending: bool,
    pub(crate) reconcile_pending: bool,
    pub(crate) scheduler: Scheduler,
    /// Advanced by `stop`; tasks scheduled under an older epoch are dropped when due.
    pub(crate) epoch: u64,
    location: Option<String>,
}

impl<K: ItemHandle> Engine<K> {
    pub fn new(settings: Settings, options: EngineOptions) -> Self {
        vdebug!(
            enabled = settings.enabled,
            visible_count = settings.visible_count,
            "Engine::new"
        );
        Self {
            options,
            settings: Settings::new(settings.enabled, settings.visible_count),
            stored: StoredBuffer::new(),
            phase: Phase::Inactive,
            restoration: Restoration::Idle,
            sentinel: None,
            growth: Subscription::Detached,
            visibility: Subscription::Detached,
            eviction_pending: false,
            reconcile_pending: false,
            scheduler: Scheduler::new(),
            epoch: 0,
            location: None,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn settings(&self) -> Settings {
        self.settings
    }

    pub fn stored(&self) -> &StoredBuffer<K> {
        &self.stored
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn restoration(&self) -> Restoration {
        self.restoration
    }

    pub fn is_locked(&self) -> bool {
        self.restoration.is_locked()
    }

    /// `None` when no sentinel is mounted.
    pub fn sentinel(&self) -> Option<Sentinel> {
        self.sentinel
    }

    pub fn growth_subscription(&self) -> Subscription {
        self.growth
    }

    pub fn visibility_subscription(&self) -> Subscription {
        self.visibility
    }

    /// Whether an eviction pass is waiting for the next [`Event::Frame`].
    pub fn wants_frame(&self) -> bool {
        self.eviction_pending
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Earliest pending task deadline, for adapters that sleep between ticks.
    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn status<H: Host<Item = K>>(&self, host: &H) -> Status {
        let live = if host.surface_ready() {
            host.live_items().len()
        } else {
            0
        };
        Status {
            virtualized_count: self.stored.len(),
            total_count: live + self.stored.len(),
        }
    }

    /// Single entry point for host notifications.
    pub fn handle<H: Host<Item = K>>(&mut self, host: &mut H, event: Event, now_ms: u64) {
        vtrace!(?event, now_ms, "Engine::handle");
        match event {
            Event::Growth { added_items } => {
                self.on_growth(added_items);
            }
            Event::Frame => {
                self.on_frame(host);
            }
            Event::SentinelIntersection { intersecting } => {
                self.on_sentinel_intersection(host, intersecting, now_ms);
            }
            Event::SettingsChanged(change) => self.apply_settings(host, change, now_ms),
            Event::Location(location) => {
                self.on_location(host, location, now_ms);
            }
            Event::Tick => {
                self.poll(host, now_ms);
            }
        }
    }

    /// Growth monitor. Returns `true` when this notification requested a new frame (the first
    /// one of a coalesced run).
    pub fn on_growth(&mut self, added_items: usize) -> bool {
        if added_items == 0 || !self.growth.is_armed() || self.is_locked() {
            return false;
        }
        let requested = !self.eviction_pending;
        self.eviction_pending = true;
        requested
    }

    /// Runs the coalesced eviction pass, if one is pending. Returns the number of evicted items.
    pub fn on_frame<H: Host<Item = K>>(&mut self, host: &mut H) -> usize {
        if !core::mem::take(&mut self.eviction_pending) {
            return 0;
        }
        self.evict_excess(host)
    }

    /// Visibility trigger. Returns `true` when a triggered restoration was started.
    pub fn on_sentinel_intersection<H: Host<Item = K>>(
        &mut self,
        host: &mut H,
        intersecting: bool,
        now_ms: u64,
    ) -> bool {
        if !intersecting || !self.visibility.is_armed() {
            return false;
        }
        let batch = self.options.restore_batch;
        self.restore(host, batch, now_ms)
    }

    /// Applies a configuration change notification.
    ///
    /// `enabled` is handled before `visible_count` when both are present.
    pub fn apply_settings<H: Host<Item = K>>(
        &mut self,
        host: &mut H,
        change: SettingsChange,
        now_ms: u64,
    ) {
        self.settings = self.settings.merged(&change);
        vdebug!(
            enabled = self.settings.enabled,
            visible_count = self.settings.visible_count,
            "settings changed"
        );

        if let Some(enabled) = change.enabled {
            if enabled {
                self.start(host, now_ms);
            } else {
                self.restore_all(host);
            }
        }

        if change.visible_count.is_some() && self.settings.enabled {
            self.reconcile_visible_count(host);
        }
    }

    /// Navigation reset monitor. The first location seen is recorded without a reset.
    ///
    /// Returns `true` if the location changed and state was flushed.
    pub fn on_location<H: Host<Item = K>>(
        &mut self,
        host: &mut H,
        location: String,
        now_ms: u64,
    ) -> bool {
        match &self.location {
            None => {
                self.location = Some(location);
                return false;
            }
            Some(prev) if *prev == location => return false,
            Some(_) => {}
        }
        vdebug!(%location, "navigation reset");
        self.location = Some(location);

        self.stored.clear();
        self.stop(host);
        self.notify_change(&*host);

        if self.settings.enabled {
            let due = now_ms.saturating_add(self.options.navigation_settle_ms);
            self.scheduler.schedule(due, self.epoch, TaskKind::Restart);
        }
        true
    }

    /// Runs every task due at `now_ms`. Returns how many ran (stale tasks are not counted).
    pub fn poll<H: Host<Item = K>>(&mut self, host: &mut H, now_ms: u64) -> usize {
        let mut ran = 0usize;
        while let Some(task) = self.scheduler.pop_due(now_ms) {
            if task.epoch != self.epoch {
                vdebug!(kind = ?task.kind, "dropping task from a stopped engine");
                continue;
            }
            ran += 1;
            self.run_task(host, task, now_ms);
        }
        ran
    }

    fn run_task<H: Host<Item = K>>(&mut self, host: &mut H, task: Task, now_ms: u64) {
        vtrace!(kind = ?task.kind, due_ms = task.due_ms, now_ms, "run_task");
        match task.kind {
            TaskKind::ApplyBatch { count } => self.finish_triggered_batch(host, count, now_ms),
            TaskKind::ReleaseLock => self.release_lock(host),
            TaskKind::BootstrapRetry { attempt } => {
                if matches!(self.phase, Phase::Bootstrapping { .. }) {
                    self.probe(host, attempt, now_ms);
                }
            }
            TaskKind::Restart => {
                self.start(host, now_ms);
            }
        }
    }

    /// Starts virtualization: waits for the render surface (bounded retries), then mounts the
    /// sentinel, runs an initial eviction pass and arms the growth monitor.
    ///
    /// Does nothing when disabled or already bootstrapping. When already active it only runs an
    /// eviction pass. Returns `true` if the engine is active afterwards.
    pub fn start<H: Host<Item = K>>(&mut self, host: &mut H, now_ms: u64) -> bool {
        if !self.settings.enabled {
            return false;
        }
        match self.phase {
            Phase::Active => {
                self.evict_excess(host);
                true
            }
            Phase::Bootstrapping { .. } => false,
            Phase::Inactive => self.probe(host, 0, now_ms),
        }
    }

    fn probe<H: Host<Item = K>>(&mut self, host: &mut H, attempt: u32, now_ms: u64) -> bool {
        if host.surface_ready() {
            self.activate(host);
            return true;
        }
        if attempt < self.options.bootstrap_attempts {
            let next = attempt + 1;
            self.phase = Phase::Bootstrapping { attempt: next };
            let due = now_ms.saturating_add(self.options.bootstrap_interval_ms);
            self.scheduler
                .schedule(due, self.epoch, TaskKind::BootstrapRetry { attempt: next });
        } else {
            vwarn!(attempts = attempt, "render surface never appeared; staying inactive");
            self.phase = Phase::Inactive;
        }
        false
    }

    fn activate<H: Host<Item = K>>(&mut self, host: &mut H) {
        vdebug!(stored = self.stored.len(), "activating");
        host.mount_sentinel();
        self.sentinel = Some(Sentinel::default());
        self.update_sentinel_visibility(host);
        host.observe_sentinel(self.options.trigger_margin);
        self.visibility = Subscription::Armed;
        self.phase = Phase::Active;

        self.evict_excess(host);

        host.observe_growth();
        self.growth = Subscription::Armed;
    }

    /// Detaches both monitors and removes the sentinel. The stored buffer is left alone.
    ///
    /// Pending scheduled work is invalidated and the restoration lock is released.
    pub fn stop<H: Host<Item = K>>(&mut self, host: &mut H) {
        vdebug!(phase = ?self.phase, stored = self.stored.len(), "stopping");
        if self.visibility != Subscription::Detached {
            host.unobserve_sentinel();
        }
        if self.growth == Subscription::Armed {
            host.unobserve_growth();
        }
        if self.sentinel.take().is_some() {
            host.unmount_sentinel();
        }
        self.visibility = Subscription::Detached;
        self.growth = Subscription::Detached;
        self.eviction_pending = false;
        self.reconcile_pending = false;
        self.restoration = Restoration::Idle;
        self.phase = Phase::Inactive;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Eviction controller: moves the oldest live items beyond `visible_count` into the stored
    /// buffer. Returns the number of evicted items.
    ///
    /// No-op while disabled, inactive or locked.
    pub fn evict_excess<H: Host<Item = K>>(&mut self, host: &mut H) -> usize {
        if !self.settings.enabled || !self.is_active() || self.is_locked() {
            return 0;
        }
        if !host.surface_ready() {
            return 0;
        }

        let mut live = host.live_items();
        let excess = live.len().saturating_sub(self.settings.visible_count);
        if excess > 0 {
            live.truncate(excess);
            for item in &live {
                host.detach(item);
            }
            vtrace!(excess, stored = self.stored.len() + excess, "evicted");
            self.stored.push_newest(live);
        }

        self.update_sentinel_visibility(host);
        if excess > 0 {
            self.notify_change(&*host);
        }
        excess
    }

    /// Brings the live window back to `visible_count` after it changed.
    ///
    /// While a triggered restoration holds the lock, the pass is deferred until the lock is
    /// released.
    pub(crate) fn reconcile_visible_count<H: Host<Item = K>>(&mut self, host: &mut H) {
        if !self.is_active() || !host.surface_ready() {
            return;
        }
        if self.is_locked() {
            vdebug!("restoration in flight; deferring reconciliation");
            self.reconcile_pending = true;
            return;
        }

        let total_visible = host.live_items().len();
        let desired = self.settings.visible_count;
        if total_visible > desired {
            self.evict_excess(host);
        } else if total_visible < desired && !self.stored.is_empty() {
            let count = (desired - total_visible).min(self.stored.len());
            self.restore_sync(host, count);
        }
    }

    pub(crate) fn update_sentinel_visibility<H: Host<Item = K>>(&mut self, host: &mut H) {
        let Some(sentinel) = self.sentinel.as_mut() else {
            return;
        };
        sentinel.visible = !self.stored.is_empty();
        host.set_sentinel_visible(sentinel.visible);
    }

    pub(crate) fn notify_change<H: Host<Item = K>>(&self, host: &H) {
        if let Some(cb) = &self.options.on_change {
            cb(self.status(host));
        }
    }

    /// Stored items, oldest first. Mostly useful for assertions.
    pub fn stored_items(&self) -> Vec<K> {
        self.stored.iter().cloned().collect()
    }
}

//! Restoration coordinator: `Idle -> Locked -> Idle`.

use crate::{Engine, Host, ItemHandle, RestorePath, Restoration, Subscription, TaskKind};

impl<K: ItemHandle> Engine<K> {
    /// Viewport-triggered restoration.
    ///
    /// Takes the lock, shows the loading affordance and suspends the growth monitor, then
    /// schedules the batch after `loading_delay_ms`. Once applied, the lock is held for another
    /// `settle_delay_ms` before growth monitoring resumes.
    ///
    /// Returns `false` (and does nothing) when the buffer is empty, the engine is inactive, or a
    /// restoration already holds the lock. Dropped triggers are not queued.
    pub fn restore<H: Host<Item = K>>(&mut self, host: &mut H, count: usize, now_ms: u64) -> bool {
        if self.stored.is_empty() || !self.is_active() {
            return false;
        }
        if self.is_locked() {
            vdebug!(count, "restoration already in flight; trigger dropped");
            return false;
        }

        self.restoration = Restoration::Locked(RestorePath::Triggered);
        if let Some(sentinel) = self.sentinel.as_mut() {
            sentinel.loading = true;
            host.set_sentinel_loading(true);
        }
        if self.growth.is_armed() {
            host.unobserve_growth();
            self.growth = Subscription::Suspended;
        }

        let due = now_ms.saturating_add(self.options.loading_delay_ms);
        self.scheduler
            .schedule(due, self.epoch, TaskKind::ApplyBatch { count });
        vtrace!(count, due, "restoration scheduled");
        true
    }

    /// Synchronous restoration used by reconciliation: no delay, no loading affordance.
    ///
    /// Returns the number of restored items; `0` while a triggered restoration holds the lock.
    pub fn restore_sync<H: Host<Item = K>>(&mut self, host: &mut H, count: usize) -> usize {
        if self.stored.is_empty() || self.is_locked() {
            return 0;
        }
        self.restoration = Restoration::Locked(RestorePath::Sync);
        let restored = self.apply_batch(host, count);
        self.restoration = Restoration::Idle;
        restored
    }

    /// Restores every stored item, then stops the engine.
    ///
    /// Safe to call repeatedly: with an empty buffer only the teardown runs. Any in-flight
    /// triggered restoration is abandoned. Returns the number of restored items.
    pub fn restore_all<H: Host<Item = K>>(&mut self, host: &mut H) -> usize {
        let mut restored = 0;
        if !self.stored.is_empty() {
            let count = self.stored.len();
            self.restoration = Restoration::Locked(RestorePath::Sync);
            restored = self.apply_batch(host, count);
        }
        self.stop(host);
        restored
    }

    /// Moves the newest `count` stored items back on-surface, directly below the sentinel, and
    /// compensates the scroll offset for the content inserted above the viewport.
    pub(crate) fn apply_batch<H: Host<Item = K>>(&mut self, host: &mut H, count: usize) -> usize {
        if !host.surface_ready() {
            vdebug!("render surface gone; batch skipped");
            return 0;
        }
        let batch = self.stored.take_newest(count);
        if batch.is_empty() {
            self.update_sentinel_visibility(host);
            return 0;
        }
        let restored = batch.len();

        let before = host.scroll_metrics();
        let anchor = host.live_items().into_iter().next();
        for item in batch {
            host.mark_restored(&item);
            host.insert_before(item, anchor.as_ref());
        }
        if let (Some(before), Some(after)) = (before, host.scroll_metrics()) {
            host.set_scroll_offset(before.compensated_offset(after));
        }

        vtrace!(restored, stored = self.stored.len(), "restored");
        self.update_sentinel_visibility(host);
        self.notify_change(&*host);
        restored
    }

    pub(crate) fn finish_triggered_batch<H: Host<Item = K>>(
        &mut self,
        host: &mut H,
        count: usize,
        now_ms: u64,
    ) {
        self.apply_batch(host, count);
        if let Some(sentinel) = self.sentinel.as_mut() {
            sentinel.loading = false;
            host.set_sentinel_loading(false);
        }
        let due = now_ms.saturating_add(self.options.settle_delay_ms);
        self.scheduler.schedule(due, self.epoch, TaskKind::ReleaseLock);
    }

    pub(crate) fn release_lock<H: Host<Item = K>>(&mut self, host: &mut H) {
        self.restoration = Restoration::Idle;
        if self.growth == Subscription::Suspended && host.surface_ready() {
            host.observe_growth();
            self.growth = Subscription::Armed;
        }
        if core::mem::take(&mut self.reconcile_pending) {
            self.reconcile_visible_count(host);
        }
    }
}

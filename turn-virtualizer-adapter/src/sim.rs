//! An in-memory render surface.
//!
//! Layout along the scroll axis: the sentinel (when mounted and visible) followed by the
//! attached turns in order. Growth notifications are buffered the way a mutation observer
//! buffers records: only while observed, and discarded on disconnect.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use turn_virtualizer::{Event, Host, ScrollMetrics};

/// Host-assigned identity of one simulated turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TurnId(pub u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SimSentinel {
    visible: bool,
    loading: bool,
}

#[derive(Clone, Debug)]
pub struct SimSurface {
    ready: bool,
    attached: Vec<TurnId>,
    heights: HashMap<TurnId, u32>,
    next_id: u64,
    sentinel: Option<SimSentinel>,
    sentinel_height: u32,
    viewport: u32,
    scroll_offset: u64,
    growth_observed: bool,
    pending_growth: usize,
    sentinel_margin: Option<u32>,
    /// Last intersection state delivered; `None` right after observing.
    reported_intersecting: Option<bool>,
    restored: HashSet<TurnId>,
}

impl Default for SimSurface {
    fn default() -> Self {
        Self {
            ready: true,
            attached: Vec::new(),
            heights: HashMap::new(),
            next_id: 0,
            sentinel: None,
            sentinel_height: 40,
            viewport: 800,
            scroll_offset: 0,
            growth_observed: false,
            pending_growth: 0,
            sentinel_margin: None,
            reported_intersecting: None,
            restored: HashSet::new(),
        }
    }
}

impl SimSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that has not been constructed yet (bootstrap will have to wait).
    pub fn unmounted() -> Self {
        Self {
            ready: false,
            ..Self::default()
        }
    }

    /// A ready surface holding `count` turns of `height` each.
    pub fn with_turns(count: usize, height: u32) -> Self {
        let mut s = Self::default();
        for _ in 0..count {
            s.append_turn(height);
        }
        s
    }

    pub fn with_viewport(mut self, viewport: u32) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Appends a new turn at the bottom, as the chat host does when a reply arrives.
    pub fn append_turn(&mut self, height: u32) -> TurnId {
        let id = TurnId(self.next_id);
        self.next_id += 1;
        self.heights.insert(id, height);
        self.attached.push(id);
        if self.growth_observed {
            self.pending_growth += 1;
        }
        id
    }

    /// Throws the whole surface away and builds a fresh one with `count` turns, as a
    /// client-side navigation does.
    pub fn replace_conversation(&mut self, count: usize, height: u32) {
        self.attached.clear();
        self.heights.clear();
        self.sentinel = None;
        self.pending_growth = 0;
        self.restored.clear();
        self.scroll_offset = 0;
        for _ in 0..count {
            self.append_turn(height);
        }
    }

    pub fn attached(&self) -> &[TurnId] {
        &self.attached
    }

    pub fn is_restored(&self, id: TurnId) -> bool {
        self.restored.contains(&id)
    }

    pub fn sentinel_mounted(&self) -> bool {
        self.sentinel.is_some()
    }

    pub fn sentinel_visible(&self) -> bool {
        self.sentinel.is_some_and(|s| s.visible)
    }

    pub fn sentinel_loading(&self) -> bool {
        self.sentinel.is_some_and(|s| s.loading)
    }

    pub fn growth_observed(&self) -> bool {
        self.growth_observed
    }

    pub fn sentinel_observed(&self) -> bool {
        self.sentinel_margin.is_some()
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn extent(&self) -> u64 {
        let sentinel = if self.sentinel_visible() {
            self.sentinel_height as u64
        } else {
            0
        };
        self.attached
            .iter()
            .map(|id| self.heights.get(id).copied().unwrap_or(0) as u64)
            .sum::<u64>()
            + sentinel
    }

    /// Scrolls, clamped to the scrollable range.
    pub fn scroll_to(&mut self, offset: u64) {
        let max = self.extent().saturating_sub(self.viewport as u64);
        self.scroll_offset = offset.min(max);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_to(u64::MAX);
    }

    /// Drains buffered child-list records into a growth event.
    pub fn take_growth(&mut self) -> Option<Event> {
        let added_items = std::mem::take(&mut self.pending_growth);
        (self.growth_observed && added_items > 0).then_some(Event::Growth { added_items })
    }

    /// Whether the sentinel currently lies within the viewport expanded by the observed margin.
    pub fn sentinel_intersecting(&self) -> bool {
        let (Some(margin), true) = (self.sentinel_margin, self.sentinel_visible()) else {
            return false;
        };
        self.scroll_offset <= self.sentinel_height as u64 + margin as u64
    }

    /// Reports an intersection change since the last call, like an intersection observer
    /// (which also reports the initial state once after observing).
    pub fn take_intersection(&mut self) -> Option<Event> {
        self.sentinel_margin?;
        let intersecting = self.sentinel_intersecting();
        if self.reported_intersecting == Some(intersecting) {
            return None;
        }
        self.reported_intersecting = Some(intersecting);
        Some(Event::SentinelIntersection { intersecting })
    }
}

impl Host for SimSurface {
    type Item = TurnId;

    fn surface_ready(&self) -> bool {
        self.ready
    }

    fn live_items(&self) -> Vec<TurnId> {
        if self.ready {
            self.attached.clone()
        } else {
            Vec::new()
        }
    }

    fn detach(&mut self, item: &TurnId) {
        self.attached.retain(|id| id != item);
    }

    fn insert_before(&mut self, item: TurnId, anchor: Option<&TurnId>) {
        let pos = anchor
            .and_then(|a| self.attached.iter().position(|id| id == a))
            .unwrap_or(self.attached.len());
        self.attached.insert(pos, item);
        if self.growth_observed {
            self.pending_growth += 1;
        }
    }

    fn mount_sentinel(&mut self) {
        self.sentinel = Some(SimSentinel {
            visible: true,
            loading: false,
        });
    }

    fn unmount_sentinel(&mut self) {
        self.sentinel = None;
    }

    fn set_sentinel_visible(&mut self, visible: bool) {
        if let Some(s) = self.sentinel.as_mut() {
            s.visible = visible;
        }
    }

    fn set_sentinel_loading(&mut self, loading: bool) {
        if let Some(s) = self.sentinel.as_mut() {
            s.loading = loading;
        }
    }

    fn mark_restored(&mut self, item: &TurnId) {
        self.restored.insert(*item);
    }

    fn scroll_metrics(&self) -> Option<ScrollMetrics> {
        self.ready.then(|| ScrollMetrics {
            extent: self.extent(),
            offset: self.scroll_offset,
        })
    }

    fn set_scroll_offset(&mut self, offset: u64) {
        self.scroll_offset = offset;
    }

    fn observe_growth(&mut self) {
        self.growth_observed = true;
    }

    fn unobserve_growth(&mut self) {
        self.growth_observed = false;
        self.pending_growth = 0;
    }

    fn observe_sentinel(&mut self, margin: u32) {
        self.sentinel_margin = Some(margin);
        self.reported_intersecting = None;
    }

    fn unobserve_sentinel(&mut self) {
        self.sentinel_margin = None;
        self.reported_intersecting = None;
    }
}

use alloc::vec::Vec;

use crate::{ItemHandle, ScrollMetrics};

/// The render surface and its notification channels, as seen by the engine.
///
/// The engine holds no host objects. Every operation that touches the surface receives the host
/// explicitly, and the adapter feeds host notifications back in as [`crate::Event`]s.
///
/// The sentinel is a single marker the host keeps as the first child of the item container.
/// Items are inserted relative to live items only, so the sentinel always stays on top.
pub trait Host {
    type Item: ItemHandle;

    /// Whether the item container currently exists.
    fn surface_ready(&self) -> bool;

    /// Attached items, in conversation order.
    fn live_items(&self) -> Vec<Self::Item>;

    /// Removes an attached item from the container.
    fn detach(&mut self, item: &Self::Item);

    /// Inserts `item` right before `anchor`, or appends it when `anchor` is `None`.
    fn insert_before(&mut self, item: Self::Item, anchor: Option<&Self::Item>);

    /// Creates the sentinel as the first child of the container.
    fn mount_sentinel(&mut self);

    fn unmount_sentinel(&mut self);

    fn set_sentinel_visible(&mut self, visible: bool);

    /// Toggles the "loading earlier items" affordance.
    fn set_sentinel_loading(&mut self, loading: bool);

    /// Tags an item that came back from the stored buffer. Styling only.
    fn mark_restored(&mut self, _item: &Self::Item) {}

    /// Geometry of the scroll container, if one can be found.
    fn scroll_metrics(&self) -> Option<ScrollMetrics>;

    fn set_scroll_offset(&mut self, offset: u64);

    /// Subscribes to shallow child-list changes of the item container.
    fn observe_growth(&mut self) {}

    fn unobserve_growth(&mut self) {}

    /// Subscribes to sentinel/viewport intersection with the viewport expanded by `margin`.
    fn observe_sentinel(&mut self, _margin: u32) {}

    fn unobserve_sentinel(&mut self) {}
}

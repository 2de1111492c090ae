use alloc::string::String;

use crate::SettingsChange;

/// A host notification, fed to [`crate::Engine::handle`].
///
/// Adapters translate their callbacks (mutation observers, intersection observers, store
/// listeners, timers, animation frames) into events and deliver them one at a time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Shallow child-list change on the item container. `added_items` counts attached nodes
    /// that match the item contract (other nodes are ignored).
    Growth { added_items: usize },
    /// The next rendering opportunity after a growth notification.
    Frame,
    /// Sentinel crossed the margin-expanded viewport.
    SentinelIntersection { intersecting: bool },
    /// Configuration store change notification.
    SettingsChanged(SettingsChange),
    /// Current addressable location of the hosted document (e.g. page URL).
    Location(String),
    /// Timer tick; runs scheduled tasks that are due.
    Tick,
}

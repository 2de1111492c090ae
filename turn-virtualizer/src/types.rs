/// Scroll geometry of the host's scroll container, sampled around a restoration batch.
///
/// `extent` is the total scrollable size (e.g. DOM `scrollHeight`), `offset` the distance
/// scrolled from the top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollMetrics {
    pub extent: u64,
    pub offset: u64,
}

impl ScrollMetrics {
    /// Offset that keeps the same content under the viewport after `self.extent` grew to
    /// `after.extent` above it.
    pub fn compensated_offset(&self, after: ScrollMetrics) -> u64 {
        let grown = after.extent.saturating_sub(self.extent);
        self.offset.saturating_add(grown)
    }
}

/// Counts reported to an external controller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Status {
    /// Items currently held in the stored buffer.
    pub virtualized_count: usize,
    /// Stored plus live items.
    pub total_count: usize,
}

/// Engine lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Phase {
    /// No sentinel, no subscriptions.
    #[default]
    Inactive,
    /// Waiting for the render surface; `attempt` probes have failed so far.
    Bootstrapping { attempt: u32 },
    /// Sentinel mounted, monitors armed.
    Active,
}

/// Which entry point took the restoration lock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RestorePath {
    /// Viewport-triggered, delayed and with a loading affordance.
    Triggered,
    /// Configuration reconciliation or full restore, applied in place.
    Sync,
}

/// The restoration lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Restoration {
    #[default]
    Idle,
    Locked(RestorePath),
}

impl Restoration {
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked(_))
    }
}

/// State of a host notification subscription as seen by the engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subscription {
    #[default]
    Detached,
    Armed,
    /// Temporarily disconnected while a triggered restoration is in flight.
    Suspended,
}

impl Subscription {
    pub fn is_armed(&self) -> bool {
        matches!(self, Self::Armed)
    }
}

/// Engine-side view of the sentinel node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sentinel {
    pub visible: bool,
    pub loading: bool,
}

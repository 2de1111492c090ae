//! A headless eviction/restoration engine for long, append-only lists of turns.
//!
//! Only the newest `visible_count` items stay attached to the host's render surface. Older
//! items are detached into a stored buffer and brought back in batches when the user scrolls
//! toward a sentinel placed at the top of the live window.
//!
//! The engine is UI-agnostic. A host layer is expected to provide (see [`Host`]):
//! - the ordered list of attached items and insert/detach operations
//! - a sentinel node, its visibility and loading affordance
//! - scroll extent/offset of the scroll container
//! - growth, sentinel-intersection and navigation notifications, delivered as [`Event`]s
//! - a monotonic clock, passed as `now_ms`, and periodic [`Event::Tick`]s
//!
//! For a configuration store, the external command channel and an in-memory host, see the
//! `turn-virtualizer-adapter` crate.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod engine;
mod event;
mod host;
mod key;
mod options;
mod restore;
mod schedule;
mod stored;
mod types;


pub use engine::Engine;
pub use event::Event;
pub use host::Host;
pub use key::ItemHandle;
pub use options::{EngineOptions, OnChangeCallback, Settings, SettingsChange};
pub use schedule::{Scheduler, TaskId, TaskKind};
pub use stored::StoredBuffer;
pub use types::{Phase, RestorePath, Restoration, ScrollMetrics, Sentinel, Status, Subscription};

//! Host-side utilities for the `turn-virtualizer` crate.
//!
//! The `turn-virtualizer` crate is UI-agnostic and holds only the eviction/restoration state
//! machine. This crate provides the pieces around it:
//!
//! - A configuration store with change notifications
//! - The command channel (`getStatus` / `restoreAll`) and its JSON wire format
//! - An operator panel client for that channel
//! - An in-memory render surface, for tests and simulations
//! - A `Controller` tying engine, host and store together
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod command;
mod config;
mod controller;
mod panel;
mod sim;

#[cfg(test)]
mod tests;

pub use command::{
    Command, CommandChannel, CommandError, Response, Unattached, dispatch, handle_message,
};
pub use config::{ConfigStore, SettingsStore, load_settings};
pub use controller::Controller;
pub use panel::{Panel, PanelView};
pub use sim::{SimSurface, TurnId};

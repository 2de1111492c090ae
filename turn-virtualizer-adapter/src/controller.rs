use turn_virtualizer::{Engine, EngineOptions, Event, Host, Settings, SettingsChange};

use crate::{
    Command, CommandChannel, CommandError, ConfigStore, Response, SettingsStore, SimSurface,
    handle_message,
};

/// A framework-neutral controller that owns one engine together with its host and the
/// configuration store it reads from.
///
/// Adapters drive it by calling:
/// - `boot` once the document is loaded
/// - `handle` for every host notification
/// - `tick(now_ms)` on each timer tick (delivers queued settings changes, runs due tasks)
///
/// It also serves as the receiving end of the command channel.
#[derive(Clone, Debug)]
pub struct Controller<H: Host> {
    engine: Engine<H::Item>,
    host: H,
    store: ConfigStore,
}

impl<H: Host> Controller<H> {
    pub fn new(host: H, mut store: ConfigStore, options: EngineOptions) -> Self {
        // Notifications written before the engine existed are already reflected in `get()`.
        store.take_changes();
        Self {
            engine: Engine::new(store.get(), options),
            host,
            store,
        }
    }

    pub fn engine(&self) -> &Engine<H::Item> {
        &self.engine
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Records the initial location and starts virtualization if enabled.
    pub fn boot(&mut self, location: Option<String>, now_ms: u64) {
        if let Some(location) = location {
            self.engine.on_location(&mut self.host, location, now_ms);
        }
        if self.engine.settings().enabled {
            self.engine.start(&mut self.host, now_ms);
        }
    }

    pub fn handle(&mut self, event: Event, now_ms: u64) {
        self.engine.handle(&mut self.host, event, now_ms);
    }

    /// Delivers queued settings changes, then runs due tasks. Returns the number of tasks run.
    pub fn tick(&mut self, now_ms: u64) -> usize {
        for change in self.store.take_changes() {
            self.engine
                .handle(&mut self.host, Event::SettingsChanged(change), now_ms);
        }
        self.engine.poll(&mut self.host, now_ms)
    }

    pub fn dispatch(&mut self, command: Command) -> Response {
        crate::dispatch(&mut self.engine, &mut self.host, command)
    }

    /// Handles one JSON message from the external controller.
    pub fn handle_message(&mut self, message: &str) -> Result<String, CommandError> {
        handle_message(&mut self.engine, &mut self.host, message)
    }
}

impl Controller<SimSurface> {
    /// Flushes the simulated host's pending notifications: growth records, the animation frame
    /// they requested, and any sentinel intersection change.
    pub fn pump(&mut self, now_ms: u64) {
        if let Some(growth) = self.host.take_growth() {
            self.handle(growth, now_ms);
        }
        if self.engine.wants_frame() {
            self.handle(Event::Frame, now_ms);
        }
        if let Some(intersection) = self.host.take_intersection() {
            self.handle(intersection, now_ms);
        }
    }
}

/// Messages go through the JSON wire format, as they would across a real channel.
impl<H: Host> CommandChannel for Controller<H> {
    fn send(&mut self, command: Command) -> Result<Response, CommandError> {
        let request = serde_json::to_string(&command)?;
        let reply = self.handle_message(&request)?;
        Ok(serde_json::from_str(&reply)?)
    }
}

impl<H: Host> SettingsStore for Controller<H> {
    fn get(&self) -> Settings {
        self.store.get()
    }

    fn set(&mut self, change: SettingsChange) {
        self.store.set(change);
    }
}

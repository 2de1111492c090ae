//! Operator panel: the external controller's side of the command channel.

use turn_virtualizer::SettingsChange;

use crate::{Command, CommandChannel, CommandError, SettingsStore};

/// What the panel shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PanelView {
    pub enabled: bool,
    pub visible_count: usize,
    /// `None` when the page could not be asked (wrong site, nothing attached).
    pub virtualized_count: Option<usize>,
}

impl PanelView {
    pub fn status_label(&self) -> &'static str {
        if self.enabled { "Active" } else { "Disabled" }
    }

    pub fn virtualized_label(&self) -> String {
        self.virtualized_count.unwrap_or(0).to_string()
    }
}

#[derive(Clone, Debug)]
pub struct Panel {
    /// Only pages whose location contains this are queried.
    site: String,
    view: PanelView,
    last_refresh_ms: Option<u64>,
}

impl Panel {
    /// Status refresh cadence while the panel is open.
    pub const REFRESH_INTERVAL_MS: u64 = 2_000;

    pub fn new(site: impl Into<String>, store: &impl SettingsStore) -> Self {
        let settings = store.get();
        Self {
            site: site.into(),
            view: PanelView {
                enabled: settings.enabled,
                visible_count: settings.visible_count,
                virtualized_count: None,
            },
            last_refresh_ms: None,
        }
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    /// Asks the page for its status. Any failure shows as zero; nothing is retried.
    pub fn refresh(&mut self, location: Option<&str>, channel: &mut impl CommandChannel) {
        if !location.is_some_and(|l| l.contains(self.site.as_str())) {
            self.view.virtualized_count = None;
            return;
        }
        self.view.virtualized_count = match channel.status() {
            Ok(status) => Some(status.virtualized_count),
            Err(_err) => {
                vdebug!(err = %_err, "status unavailable");
                None
            }
        };
    }

    /// Whether a periodic refresh is due. The first call is always due.
    pub fn due(&self, now_ms: u64) -> bool {
        self.last_refresh_ms
            .is_none_or(|last| now_ms.saturating_sub(last) >= Self::REFRESH_INTERVAL_MS)
    }

    /// Refreshes if [`Self::REFRESH_INTERVAL_MS`] has elapsed since the last periodic refresh.
    /// Returns `true` if a refresh ran.
    pub fn tick(
        &mut self,
        now_ms: u64,
        location: Option<&str>,
        channel: &mut impl CommandChannel,
    ) -> bool {
        if !self.due(now_ms) {
            return false;
        }
        self.last_refresh_ms = Some(now_ms);
        self.refresh(location, channel);
        true
    }

    pub fn set_enabled(&mut self, store: &mut impl SettingsStore, enabled: bool) {
        store.set(SettingsChange::enabled(enabled));
        self.view.enabled = enabled;
    }

    pub fn set_visible_count(&mut self, store: &mut impl SettingsStore, visible_count: usize) {
        store.set(SettingsChange::visible_count(visible_count));
        self.view.visible_count = store.get().visible_count;
    }

    /// Restores everything on the page, then disables virtualization so it does not
    /// immediately re-evict.
    ///
    /// The setting is written whether or not the page answered; the command error is still
    /// returned to the caller.
    pub fn restore_all_and_disable<T>(&mut self, target: &mut T) -> Result<(), CommandError>
    where
        T: CommandChannel + SettingsStore,
    {
        let sent = target.send(Command::RestoreAll).map(|_| ());
        self.set_enabled(target, false);
        sent
    }
}

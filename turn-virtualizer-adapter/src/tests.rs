use crate::*;

use turn_virtualizer::{EngineOptions, Event, Phase, Settings, SettingsChange, Status};

const SITE: &str = "chatgpt.com";
const LOCATION: &str = "https://chatgpt.com/c/first";

fn controller(visible_count: usize) -> Controller<SimSurface> {
    let host = SimSurface::new().with_viewport(300);
    let store = ConfigStore::new(Settings::new(true, visible_count));
    let mut c = Controller::new(host, store, EngineOptions::default());
    c.boot(Some(LOCATION.to_string()), 0);
    c
}

/// Appends turns the way a chat does: one at a time, with the user following the bottom.
fn chat(c: &mut Controller<SimSurface>, turns: usize, now_ms: u64) {
    for _ in 0..turns {
        c.host_mut().append_turn(100);
        c.pump(now_ms);
        c.host_mut().scroll_to_bottom();
    }
}

struct Gone {
    store: ConfigStore,
}

impl CommandChannel for Gone {
    fn send(&mut self, _command: Command) -> Result<Response, CommandError> {
        Err(CommandError::ReceiverGone)
    }
}

impl SettingsStore for Gone {
    fn get(&self) -> Settings {
        self.store.get()
    }

    fn set(&mut self, change: SettingsChange) {
        self.store.set(change);
    }
}

#[test]
fn settings_json_fills_in_defaults() {
    assert_eq!(load_settings("{}"), Settings::default());
    assert_eq!(
        load_settings(r#"{"visibleCount":25}"#),
        Settings::new(true, 25)
    );
    assert_eq!(
        load_settings(r#"{"enabled":false,"visibleCount":0}"#),
        Settings::new(false, 1)
    );
    assert_eq!(load_settings("not json"), Settings::default());

    let store = ConfigStore::from_json(r#"{"enabled":false}"#);
    assert_eq!(store.to_json(), r#"{"enabled":false,"visibleCount":10}"#);
}

#[test]
fn store_notifies_only_changed_keys() {
    let mut store = ConfigStore::default();
    store.set(SettingsChange::enabled(true));
    assert!(!store.has_pending_changes());

    store.set(SettingsChange {
        enabled: Some(true),
        visible_count: Some(4),
    });
    store.set(SettingsChange::enabled(false));
    assert_eq!(
        store.take_changes(),
        vec![
            SettingsChange::visible_count(4),
            SettingsChange::enabled(false)
        ]
    );
    assert!(store.take_changes().is_empty());
    assert_eq!(store.get(), Settings::new(false, 4));
}

#[test]
fn command_wire_format() {
    assert_eq!(
        serde_json::to_string(&Command::GetStatus).unwrap(),
        r#"{"action":"getStatus"}"#
    );
    assert_eq!(
        serde_json::from_str::<Command>(r#"{"action":"restoreAll"}"#).unwrap(),
        Command::RestoreAll
    );
    assert_eq!(
        serde_json::to_string(&Response::Status(Status {
            virtualized_count: 5,
            total_count: 15,
        }))
        .unwrap(),
        r#"{"virtualizedCount":5,"totalCount":15}"#
    );
    assert_eq!(
        serde_json::from_str::<Response>(r#"{"ok":true}"#).unwrap(),
        Response::ack()
    );
}

#[test]
fn unknown_actions_are_rejected_without_side_effects() {
    let mut c = controller(3);
    chat(&mut c, 6, 0);

    let err = c.handle_message(r#"{"action":"explode"}"#).unwrap_err();
    assert!(matches!(err, CommandError::Malformed(_)));
    assert_eq!(c.engine().stored().len(), 3);
    assert!(c.engine().is_active());
}

#[test]
fn chatting_past_the_window_evicts_oldest_turns() {
    let mut c = controller(10);
    chat(&mut c, 15, 0);

    assert_eq!(
        c.host().attached(),
        (5..15).map(TurnId).collect::<Vec<_>>().as_slice()
    );
    assert_eq!(
        c.engine().stored_items(),
        (0..5).map(TurnId).collect::<Vec<_>>()
    );
    assert!(c.host().sentinel_visible());
    assert_eq!(
        c.status().unwrap(),
        Status {
            virtualized_count: 5,
            total_count: 15,
        }
    );
}

#[test]
fn scrolling_to_the_top_restores_a_batch_without_jumping() {
    let mut c = controller(10);
    chat(&mut c, 15, 0);

    c.host_mut().scroll_to(0);
    c.pump(1_000);
    assert!(c.engine().is_locked());
    assert!(c.host().sentinel_loading());
    assert!(!c.host().growth_observed());

    assert_eq!(c.tick(1_249), 0);
    assert_eq!(c.tick(1_250), 1);
    assert_eq!(
        c.host().attached(),
        (0..15).map(TurnId).collect::<Vec<_>>().as_slice()
    );
    assert!(c.engine().stored().is_empty());
    assert!((0..5).all(|i| c.host().is_restored(TurnId(i))));
    assert!(!c.host().is_restored(TurnId(5)));
    // Five 100-unit turns landed above the viewport.
    assert_eq!(c.host().scroll_offset(), 500);
    assert!(!c.host().sentinel_visible());

    assert_eq!(c.tick(1_350), 1);
    assert!(!c.engine().is_locked());
    assert!(c.host().growth_observed());
}

#[test]
fn a_partial_batch_comes_back_in_order_above_the_window() {
    let mut c = controller(10);
    chat(&mut c, 25, 0);
    assert_eq!(c.engine().stored().len(), 15);

    c.host_mut().scroll_to(0);
    c.pump(1_000);
    assert_eq!(c.tick(1_250), 1);
    assert_eq!(
        c.host().attached(),
        (5..25).map(TurnId).collect::<Vec<_>>().as_slice()
    );
    assert_eq!(
        c.engine().stored_items(),
        (0..5).map(TurnId).collect::<Vec<_>>()
    );
    assert!(c.host().sentinel_visible());
    assert_eq!(c.host().scroll_offset(), 1_000);
}

#[test]
fn raising_visible_count_from_the_panel_restores_synchronously() {
    let mut c = controller(10);
    chat(&mut c, 15, 0);
    let mut panel = Panel::new(SITE, &c);

    panel.set_visible_count(&mut c, 15);
    c.tick(100);
    assert!(c.engine().stored().is_empty());
    assert_eq!(
        c.host().attached(),
        (0..15).map(TurnId).collect::<Vec<_>>().as_slice()
    );
    assert!(!c.engine().is_locked());

    // Reinsertion shows up as child-list records; the pass they trigger finds nothing to do.
    c.pump(100);
    assert_eq!(c.host().attached().len(), 15);

    panel.refresh(Some(LOCATION), &mut c);
    assert_eq!(panel.view().virtualized_count, Some(0));
    assert_eq!(panel.view().visible_count, 15);
}

#[test]
fn restore_all_from_the_panel_disables_virtualization() {
    let mut c = controller(10);
    chat(&mut c, 15, 0);
    let mut panel = Panel::new(SITE, &c);
    panel.refresh(Some(LOCATION), &mut c);
    assert_eq!(panel.view().virtualized_label(), "5");

    panel.restore_all_and_disable(&mut c).unwrap();
    assert_eq!(c.host().attached().len(), 15);
    assert!(!c.host().sentinel_mounted());
    assert!(!c.host().sentinel_observed());
    assert!(!c.host().growth_observed());
    assert!(!SettingsStore::get(&c).enabled);
    assert_eq!(panel.view().status_label(), "Disabled");

    c.tick(200);
    assert_eq!(c.engine().phase(), Phase::Inactive);
    assert!(!c.engine().settings().enabled);

    chat(&mut c, 3, 300);
    assert_eq!(c.host().attached().len(), 18);
    assert!(c.engine().stored().is_empty());

    // A second restore-all is harmless.
    assert_eq!(c.send(Command::RestoreAll).unwrap(), Response::ack());
    assert_eq!(c.host().attached().len(), 18);
}

#[test]
fn re_enabling_from_the_panel_virtualizes_again() {
    let mut c = controller(4);
    chat(&mut c, 6, 0);
    let mut panel = Panel::new(SITE, &c);

    panel.set_enabled(&mut c, false);
    c.tick(10);
    assert_eq!(c.host().attached().len(), 6);

    panel.set_enabled(&mut c, true);
    c.tick(20);
    assert!(c.engine().is_active());
    assert_eq!(c.host().attached().len(), 4);
    assert_eq!(panel.view().status_label(), "Active");
}

#[test]
fn panel_shows_zero_when_nothing_answers() {
    let store = ConfigStore::default();
    let mut panel = Panel::new(SITE, &store);

    panel.refresh(Some(LOCATION), &mut Unattached);
    assert_eq!(panel.view().virtualized_count, None);
    assert_eq!(panel.view().virtualized_label(), "0");

    let mut c = controller(2);
    chat(&mut c, 5, 0);
    panel.refresh(Some("https://example.com/"), &mut c);
    assert_eq!(panel.view().virtualized_count, None);
    panel.refresh(None, &mut c);
    assert_eq!(panel.view().virtualized_count, None);
    panel.refresh(Some(LOCATION), &mut c);
    assert_eq!(panel.view().virtualized_count, Some(3));
}

#[test]
fn panel_refreshes_every_two_seconds() {
    let mut c = controller(2);
    chat(&mut c, 3, 0);
    let mut panel = Panel::new(SITE, &c);

    assert!(panel.due(0));
    assert!(panel.tick(0, Some(LOCATION), &mut c));
    assert_eq!(panel.view().virtualized_count, Some(1));

    chat(&mut c, 2, 500);
    assert!(!panel.tick(1_999, Some(LOCATION), &mut c));
    assert_eq!(panel.view().virtualized_count, Some(1));

    assert!(panel.tick(Panel::REFRESH_INTERVAL_MS, Some(LOCATION), &mut c));
    assert_eq!(panel.view().virtualized_count, Some(3));
    assert!(!panel.due(3_999));
    assert!(panel.due(4_000));
}

#[test]
fn restore_all_still_disables_when_the_page_is_gone() {
    let mut gone = Gone {
        store: ConfigStore::default(),
    };
    let mut panel = Panel::new(SITE, &gone);

    let err = panel.restore_all_and_disable(&mut gone).unwrap_err();
    assert!(matches!(err, CommandError::ReceiverGone));
    assert!(!gone.store.get().enabled);
    assert_eq!(gone.store.take_changes(), vec![SettingsChange::enabled(false)]);
}

#[test]
fn controller_waits_for_the_surface() {
    let mut host = SimSurface::unmounted();
    for _ in 0..12 {
        host.append_turn(100);
    }
    let mut c = Controller::new(
        host,
        ConfigStore::new(Settings::new(true, 10)),
        EngineOptions::default(),
    );
    c.boot(None, 0);
    assert_eq!(c.engine().phase(), Phase::Bootstrapping { attempt: 1 });
    assert_eq!(
        c.status().unwrap(),
        Status {
            virtualized_count: 0,
            total_count: 0,
        }
    );

    c.tick(500);
    assert!(!c.engine().is_active());
    c.host_mut().set_ready(true);
    c.tick(1_000);
    assert!(c.engine().is_active());
    assert_eq!(c.host().attached().len(), 10);
}

#[test]
fn navigation_flushes_and_restarts_on_the_new_conversation() {
    let mut c = controller(10);
    chat(&mut c, 15, 0);

    c.handle(
        Event::Location("https://chatgpt.com/c/second".to_string()),
        2_000,
    );
    assert!(c.engine().stored().is_empty());
    assert!(!c.engine().is_active());

    c.host_mut().replace_conversation(12, 100);
    c.tick(3_199);
    assert!(!c.engine().is_active());
    c.tick(3_200);
    assert!(c.engine().is_active());
    assert_eq!(
        c.status().unwrap(),
        Status {
            virtualized_count: 2,
            total_count: 12,
        }
    );
}

#[test]
fn changes_written_before_boot_are_not_replayed() {
    let mut store = ConfigStore::default();
    store.set(SettingsChange::enabled(false));
    let mut c = Controller::new(SimSurface::with_turns(3, 100), store, EngineOptions::default());
    c.boot(None, 0);
    assert_eq!(c.tick(0), 0);
    assert!(!c.engine().is_active());
}

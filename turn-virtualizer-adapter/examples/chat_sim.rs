// Example: a simulated chat that grows past the window, then the user scrolls up through history.
use turn_virtualizer::{EngineOptions, Settings};
use turn_virtualizer_adapter::{CommandChannel, ConfigStore, Controller, Panel, SimSurface};

fn main() {
    let host = SimSurface::new().with_viewport(600);
    let store = ConfigStore::new(Settings::new(true, 10));
    let mut c = Controller::new(host, store, EngineOptions::default());
    c.boot(Some("https://chatgpt.com/c/demo".to_string()), 0);

    let mut now = 0u64;
    for _ in 0..40 {
        now += 50;
        c.host_mut().append_turn(120);
        c.pump(now);
        c.host_mut().scroll_to_bottom();
    }
    println!("after chatting: status={:?}", c.status());

    // Scroll to the top a few times; each visit restores one batch.
    for _ in 0..3 {
        c.host_mut().scroll_to(0);
        c.pump(now);
        // Loading delay, then the settle delay before the next trigger is accepted.
        now += 250;
        c.tick(now);
        now += 100;
        c.tick(now);
        c.pump(now);
        println!(
            "restored batch: attached={} stored={} scroll_offset={}",
            c.host().attached().len(),
            c.engine().stored().len(),
            c.host().scroll_offset()
        );
        c.host_mut().scroll_to(2_000);
        c.pump(now);
    }

    let mut panel = Panel::new("chatgpt.com", &c);
    panel.refresh(Some("https://chatgpt.com/c/demo"), &mut c);
    println!("panel shows {} virtualized", panel.view().virtualized_label());

    if let Err(err) = panel.restore_all_and_disable(&mut c) {
        println!("restore-all failed: {err}");
    }
    c.tick(now + 1);
    println!(
        "after restore-all: attached={} phase={:?}",
        c.host().attached().len(),
        c.engine().phase()
    );
}

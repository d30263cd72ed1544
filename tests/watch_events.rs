//! End-to-end watcher tests: real notify events over a temp tree, debounced
//! into callbacks. Timings are generous to stay stable on slow runners.

use std::fs;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use claude_deck::store::ConfigStore;
use claude_deck::watch::{ConfigWatcher, WatchConfig};
use tempfile::TempDir;

fn test_config() -> WatchConfig {
    WatchConfig {
        debounce_window: Duration::from_millis(100),
        stop_timeout: Duration::from_secs(5),
    }
}

#[test]
fn burst_of_markdown_writes_collapses_to_one_callback() {
    let temp_dir = TempDir::new().unwrap();
    let agents_dir = temp_dir.path().join("agents");
    fs::create_dir_all(&agents_dir).unwrap();

    let (tx, rx) = mpsc::channel();
    let watcher = ConfigWatcher::spawn(temp_dir.path(), test_config(), move || {
        let _ = tx.send(());
    })
    .unwrap();

    for i in 0..5 {
        fs::write(agents_dir.join(format!("agent-{i}.md")), "---\n---\nbody").unwrap();
    }

    // exactly one debounced callback for the burst
    rx.recv_timeout(Duration::from_secs(3))
        .expect("expected a change callback");
    assert!(
        rx.recv_timeout(Duration::from_millis(600)).is_err(),
        "burst should collapse into a single callback"
    );

    watcher.stop().unwrap();
}

#[test]
fn unwatched_extensions_do_not_fire() {
    let temp_dir = TempDir::new().unwrap();

    let (tx, rx) = mpsc::channel();
    let watcher = ConfigWatcher::spawn(temp_dir.path(), test_config(), move || {
        let _ = tx.send(());
    })
    .unwrap();

    fs::write(temp_dir.path().join("chart.png"), [1u8, 2, 3]).unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "ignored").unwrap();
    assert!(
        rx.recv_timeout(Duration::from_millis(700)).is_err(),
        "non-md/json files must not trigger the callback"
    );

    watcher.stop().unwrap();
}

#[test]
fn no_callback_after_stop_returns() {
    let temp_dir = TempDir::new().unwrap();

    let (tx, rx) = mpsc::channel();
    let watcher = ConfigWatcher::spawn(temp_dir.path(), test_config(), move || {
        let _ = tx.send(());
    })
    .unwrap();

    // queue a change, then stop before the debounce window can elapse
    fs::write(temp_dir.path().join("late.md"), "x").unwrap();
    watcher.stop().unwrap();

    while rx.try_recv().is_ok() {}
    std::thread::sleep(Duration::from_millis(400));
    assert!(rx.try_recv().is_err(), "callback fired after stop returned");
}

#[test]
fn store_watch_invalidates_before_notifying() {
    let temp_dir = TempDir::new().unwrap();
    let agents_dir = temp_dir.path().join("agents");
    fs::create_dir_all(&agents_dir).unwrap();

    let store = Arc::new(ConfigStore::with_cache_ttl(
        temp_dir.path(),
        Duration::from_secs(60),
    ));
    assert!(store.agents().is_empty());

    let (tx, rx) = mpsc::channel();
    let watcher = Arc::clone(&store)
        .watch(move || {
            let _ = tx.send(());
        })
        .unwrap();

    fs::write(agents_dir.join("external.md"), "---\nname: external\n---\n").unwrap();
    rx.recv_timeout(Duration::from_secs(3))
        .expect("expected a change callback");

    // the cache was invalidated before our callback ran, so even a
    // long-TTL store sees the externally created record
    assert_eq!(store.agents().len(), 1);

    watcher.stop().unwrap();
}

//! Filesystem watching for the configuration tree.
//!
//! Monitors the root recursively, ignores anything that is not a `.md` or
//! `.json` file, and collapses notification bursts through a trailing-edge
//! debounce before invoking the change callback. The callback runs on the
//! debounce thread; hosts must relay into their own event loop rather than
//! mutate UI state from here.

pub mod debounce;

pub use debounce::{Debouncer, DEBOUNCE_WINDOW};

use crate::error::DeckError;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Bound on how long `stop` waits for a worker thread to exit.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// File extensions that count as configuration changes.
const WATCHED_EXTENSIONS: [&str; 2] = ["md", "json"];

/// Watcher tuning knobs.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Debounce window applied to matching notifications.
    pub debounce_window: Duration,
    /// Bound on `stop` waiting for the worker threads.
    pub stop_timeout: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_window: DEBOUNCE_WINDOW,
            stop_timeout: STOP_TIMEOUT,
        }
    }
}

enum Signal {
    Fs(notify::Result<Event>),
    Stop,
}

/// Recursive watcher over a configuration root.
///
/// Owns two threads: the event loop (which also owns the OS-level watcher)
/// and the debounce timer. Both are joined by [`ConfigWatcher::stop`].
pub struct ConfigWatcher {
    tx: mpsc::Sender<Signal>,
    handle: Option<JoinHandle<()>>,
    stop_timeout: Duration,
}

impl ConfigWatcher {
    /// Start watching `root`, invoking `callback` (debounced) on relevant
    /// changes. `root` must exist.
    pub fn spawn<F>(
        root: impl Into<PathBuf>,
        config: WatchConfig,
        callback: F,
    ) -> Result<Self, DeckError>
    where
        F: Fn() + Send + 'static,
    {
        let root = root.into();
        let (tx, rx) = mpsc::channel::<Signal>();

        let event_tx = tx.clone();
        let mut watcher = notify::recommended_watcher(move |res| {
            // a failed send means the event loop is gone; nothing to deliver to
            let _ = event_tx.send(Signal::Fs(res));
        })
        .map_err(|e| DeckError::Watch(format!("failed to create watcher: {e}")))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| DeckError::Watch(format!("failed to watch {}: {e}", root.display())))?;

        let mut debouncer = Debouncer::new(config.debounce_window, callback)?;
        let stop_timeout = config.stop_timeout;

        let handle = thread::Builder::new()
            .name("deck-watch".to_string())
            .spawn(move || {
                // keep the OS watcher alive for exactly the lifetime of this loop
                let _watcher = watcher;
                for signal in rx {
                    match signal {
                        Signal::Fs(Ok(event)) => {
                            if is_relevant(&event) {
                                debug!(paths = ?event.paths, "configuration change");
                                debouncer.trigger();
                            }
                        }
                        Signal::Fs(Err(e)) => warn!("watch error: {e}"),
                        Signal::Stop => break,
                    }
                }
                if let Err(e) = debouncer.stop(stop_timeout) {
                    error!("failed to stop debouncer: {e}");
                }
            })?;

        Ok(Self {
            tx,
            handle: Some(handle),
            stop_timeout,
        })
    }

    /// Stop watching and block until both worker threads have exited.
    ///
    /// Once this returns, the callback cannot fire again: the event loop has
    /// stopped the debouncer before exiting, and we have joined the event
    /// loop.
    pub fn stop(mut self) -> Result<(), DeckError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<(), DeckError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let _ = self.tx.send(Signal::Stop);
        join_with_timeout(handle, self.stop_timeout)
    }
}

impl Drop for ConfigWatcher {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("watcher teardown: {e}");
        }
    }
}

fn is_relevant(event: &Event) -> bool {
    match event.kind {
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {
            event.paths.iter().any(|p| has_watched_extension(p))
        }
        _ => false,
    }
}

fn has_watched_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| WATCHED_EXTENSIONS.iter().any(|w| ext.eq_ignore_ascii_case(w)))
        .unwrap_or(false)
}

pub(crate) fn join_with_timeout(handle: JoinHandle<()>, timeout: Duration) -> Result<(), DeckError> {
    let deadline = Instant::now() + timeout;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return Err(DeckError::WatchStopTimeout(timeout));
        }
        thread::sleep(Duration::from_millis(10));
    }
    handle
        .join()
        .map_err(|_| DeckError::Watch("worker thread panicked".to_string()))
}

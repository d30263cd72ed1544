//! Trailing-edge debounce timer.

use super::join_with_timeout;
use crate::error::DeckError;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Default window applied to filesystem notifications.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

enum Control {
    Trigger,
    Stop,
}

/// Coalesces rapid trigger bursts into a single deferred action.
///
/// The action runs on the debouncer's own thread once the window elapses
/// with no further trigger; every trigger re-arms the deadline (trailing
/// edge, not leading edge). [`Debouncer::stop`] cancels any pending deadline
/// and joins the thread: the action cannot fire after `stop` returns,
/// because it only ever runs on the thread being joined.
pub struct Debouncer {
    tx: Sender<Control>,
    handle: Option<JoinHandle<()>>,
}

impl Debouncer {
    /// Spawn the timer thread.
    pub fn new<F>(window: Duration, action: F) -> Result<Self, DeckError>
    where
        F: Fn() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<Control>();
        let handle = thread::Builder::new()
            .name("deck-debounce".to_string())
            .spawn(move || {
                let mut deadline: Option<Instant> = None;
                loop {
                    let Some(armed) = deadline else {
                        // idle: nothing pending, block until the next message
                        match rx.recv() {
                            Ok(Control::Trigger) => {
                                deadline = Some(Instant::now() + window);
                                continue;
                            }
                            Ok(Control::Stop) | Err(_) => break,
                        }
                    };
                    let wait = armed.saturating_duration_since(Instant::now());
                    match rx.recv_timeout(wait) {
                        Ok(Control::Trigger) => deadline = Some(Instant::now() + window),
                        Ok(Control::Stop) => break,
                        Err(RecvTimeoutError::Timeout) => {
                            deadline = None;
                            action();
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Arm the deadline, or push it back if already armed.
    pub fn trigger(&self) {
        // a send after stop has no receiver; late triggers are no-ops
        let _ = self.tx.send(Control::Trigger);
    }

    /// Cancel any pending deadline and wait (bounded) for the thread to exit.
    pub fn stop(&mut self, timeout: Duration) -> Result<(), DeckError> {
        let Some(handle) = self.handle.take() else {
            return Ok(());
        };
        let _ = self.tx.send(Control::Stop);
        join_with_timeout(handle, timeout)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        let _ = self.stop(super::STOP_TIMEOUT);
    }
}

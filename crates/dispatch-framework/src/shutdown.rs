//! # Shutdown Signal
//!
//! A one-shot, level-triggered stop signal for long-lived loops, built on
//! `tokio::sync::watch`. The orchestrator keeps the [`ShutdownTrigger`]; every loop
//! gets a cloned [`Shutdown`] and races it against its own work in `tokio::select!`.
//!
//! Level-triggered means a loop that starts waiting *after* the trigger fired still
//! sees it immediately.

use tokio::sync::watch;

/// The sending half, owned by whoever decides when the system stops.
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

/// The receiving half, cloned into every loop.
#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Creates a connected trigger/signal pair.
pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once the trigger has fired (or was dropped).
    pub async fn wait(&mut self) {
        while !*self.rx.borrow_and_update() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

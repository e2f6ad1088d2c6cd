//! Cooperative cancellation signal
//!
//! Backed by a `watch` channel holding a flag, so the signal is
//! level-triggered: a listener that subscribes or checks after the
//! trigger still sees it, and triggering twice changes nothing.

use tokio::sync::watch;

/// Owner side of the cancellation signal
#[derive(Debug)]
pub struct Shutdown {
    tx: watch::Sender<bool>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx }
    }

    /// Raise the signal. Idempotent.
    pub fn trigger(&self) {
        self.tx.send_if_modified(|raised| !std::mem::replace(raised, true));
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Hand out a listener for one actor
    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener { rx: self.tx.subscribe() }
    }
}

/// Actor side of the cancellation signal
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

impl ShutdownListener {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal is raised
    ///
    /// Also resolves if the owning [`Shutdown`] is dropped, since nothing
    /// could raise the signal afterwards.
    pub async fn cancelled(&mut self) {
        let _ = self.rx.wait_for(|raised| *raised).await;
    }
}

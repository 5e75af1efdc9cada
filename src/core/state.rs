//! Process-wide shutdown state.
//!
//! Ctrl+C sets the `SHUTDOWN` flag, wakes every subscriber (watch actor,
//! reload server) and unblocks the HTTP server so its request loop returns.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use tiny_http::Server;

/// Shutdown flag plus the channels waiting on it.
pub(crate) struct ShutdownSignal {
    requested: AtomicBool,
    subscribers: Mutex<Vec<Sender<()>>>,
}

impl ShutdownSignal {
    pub(crate) const fn new() -> Self {
        Self {
            requested: AtomicBool::new(false),
            subscribers: parking_lot::const_mutex(Vec::new()),
        }
    }

    /// A receiver that gets one message on shutdown. Subscribing after the
    /// fact yields an already-signalled receiver.
    pub(crate) fn subscribe(&self) -> Receiver<()> {
        let (tx, rx) = channel::bounded(1);
        let mut subscribers = self.subscribers.lock();
        if self.is_requested() {
            let _ = tx.try_send(());
        } else {
            subscribers.push(tx);
        }
        rx
    }

    /// Set the flag and notify subscribers. Returns `false` if already set.
    pub(crate) fn trigger(&self) -> bool {
        let mut subscribers = self.subscribers.lock();
        if self.requested.swap(true, Ordering::SeqCst) {
            return false;
        }
        for tx in subscribers.drain(..) {
            let _ = tx.try_send(());
        }
        true
    }

    pub(crate) fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Relaxed)
    }

    fn has_subscribers(&self) -> bool {
        !self.subscribers.lock().is_empty()
    }
}

static SHUTDOWN: ShutdownSignal = ShutdownSignal::new();

/// HTTP server reference for graceful shutdown
static SERVER: OnceLock<Arc<Server>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// Before anything long-lived is running (plain builds, the initial build of
/// dev) the process exits immediately. Afterwards shutdown is graceful.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if SERVER.get().is_none() && !SHUTDOWN.has_subscribers() {
            std::process::exit(0);
        }
        request_shutdown();
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Stop everything long-lived: subscribers and the HTTP server.
pub fn request_shutdown() {
    if !SHUTDOWN.trigger() {
        return;
    }
    if let Some(server) = SERVER.get() {
        crate::log!("serve"; "shutting down...");
        server.unblock();
    }
}

/// Receiver signalled once shutdown is requested.
pub fn subscribe_shutdown() -> Receiver<()> {
    SHUTDOWN.subscribe()
}

/// Register the HTTP server for graceful shutdown
///
/// Call this after binding the server, before entering the request loop.
/// If shutdown was already requested the server is unblocked right away.
pub fn register_server(server: Arc<Server>) {
    let _ = SERVER.set(Arc::clone(&server));
    if is_shutdown() {
        server.unblock();
    }
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.is_requested()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_notifies_subscribers_once() {
        let signal = ShutdownSignal::new();
        let a = signal.subscribe();
        let b = signal.subscribe();
        assert!(a.try_recv().is_err());

        assert!(signal.trigger());
        assert!(!signal.trigger());

        assert!(a.try_recv().is_ok());
        assert!(b.try_recv().is_ok());
        assert!(a.try_recv().is_err());
        assert!(signal.is_requested());
    }

    #[test]
    fn test_late_subscriber_is_signalled() {
        let signal = ShutdownSignal::new();
        signal.trigger();
        assert!(signal.subscribe().try_recv().is_ok());
        assert!(!signal.has_subscribers());
    }
}

// src/engine/abort.rs

//! Run-wide abort signalling.
//!
//! An [`AbortHandle`] is held by whoever may stop a run (Ctrl-C handler,
//! embedding code, tests). Every worker and every executor call receives a
//! [`CancelSignal`] subscribed to the same flag.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

/// Cloneable handle that requests a run to stop.
#[derive(Debug, Clone)]
pub struct AbortHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl AbortHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Request the run to stop: no new work is enqueued, queued work is
    /// skipped, running tasks see their [`CancelSignal`] fire.
    pub fn abort(&self) {
        let was_aborted = self.tx.send_replace(true);
        if !was_aborted {
            info!("abort requested");
        }
    }

    pub fn is_aborted(&self) -> bool {
        *self.tx.borrow()
    }

    /// New signal observing this handle.
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for AbortHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of an [`AbortHandle`].
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that never fires. Useful when running a node outside a
    /// scheduler.
    pub fn never() -> Self {
        AbortHandle::new().signal()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested; pends forever if the handle
    /// is dropped without aborting.
    pub async fn cancelled(&mut self) {
        let closed = self.rx.wait_for(|aborted| *aborted).await.is_err();
        if closed {
            std::future::pending::<()>().await;
        }
    }
}

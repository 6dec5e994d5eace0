// src/engine/queue.rs

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};

use crate::errors::{DagrunError, Result};
use crate::types::NodeName;

/// Create an unbounded FIFO work queue of node names.
///
/// Many producers, many consumers: the receiving half is shared behind an
/// async mutex, so exactly one idle worker waits on the channel at a time
/// and every item is delivered to exactly one worker.
pub fn work_queue() -> (WorkSender, WorkReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        WorkSender { tx },
        WorkReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producer side. Dropping every sender closes the queue; workers then drain
/// what is left and stop.
#[derive(Debug, Clone)]
pub struct WorkSender {
    tx: mpsc::UnboundedSender<NodeName>,
}

impl WorkSender {
    pub fn enqueue(&self, node: NodeName) -> Result<()> {
        self.tx.send(node).map_err(|e| {
            DagrunError::Other(anyhow::anyhow!(
                "work queue closed while enqueuing node '{}'",
                e.0
            ))
        })
    }
}

/// Consumer side, cloned into every worker.
#[derive(Debug, Clone)]
pub struct WorkReceiver {
    rx: Arc<Mutex<mpsc::UnboundedReceiver<NodeName>>>,
}

impl WorkReceiver {
    /// Wait for the next node. `None` once the queue is closed and empty.
    pub async fn dequeue(&self) -> Option<NodeName> {
        let mut rx = self.rx.lock().await;
        rx.recv().await
    }
}

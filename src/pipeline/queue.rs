//! Bounded work queue shared by all workers.

use std::sync::Arc;

use tokio::sync::mpsc::error::SendError;
use tokio::sync::{mpsc, Mutex};

/// Creates a FIFO queue of hostnames holding at most `capacity` entries.
pub fn work_queue(capacity: usize) -> (WorkSender, WorkReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (
        WorkSender { tx },
        WorkReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

/// Producer side. Dropping it closes the queue.
pub struct WorkSender {
    tx: mpsc::Sender<String>,
}

impl WorkSender {
    /// Enqueues `host`, waiting while the queue is full. Never drops.
    ///
    /// Fails only when every receiver is gone.
    pub async fn send(&self, host: String) -> Result<(), SendError<String>> {
        self.tx.send(host).await
    }
}

/// Consumer side, cloned into every worker.
#[derive(Clone)]
pub struct WorkReceiver {
    rx: Arc<Mutex<mpsc::Receiver<String>>>,
}

impl WorkReceiver {
    /// Next hostname, or `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<String> {
        self.rx.lock().await.recv().await
    }
}

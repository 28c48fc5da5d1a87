//! Fixed pool of media workers with round-robin room assignment.
//!
//! Workers are created once at process start, one per processing unit by
//! default, and the pool is never resized. Workers share no recoverable
//! state, so a worker reporting death is an unrecoverable fault: the
//! binary observes the pool's fatal channel and terminates the whole
//! process rather than attempting per-worker restart.

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// An isolated media-processing unit.
///
/// The control plane only tracks identity and liveness; the forwarding
/// internals live below this layer.
#[derive(Debug, Clone)]
pub struct Worker {
    id: usize,
    fatal_tx: UnboundedSender<usize>,
}

impl Worker {
    /// Worker identity within the pool.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Report this worker as dead.
    ///
    /// Delivery failure means the fatal receiver is already gone, which
    /// only happens during shutdown; the report is then moot.
    pub fn report_death(&self) {
        tracing::error!(target: "media.worker", worker_id = self.id, "Worker died");
        let _ = self.fatal_tx.send(self.id);
    }
}

/// Fixed-size worker pool with deterministic round-robin assignment.
pub struct WorkerPool {
    workers: Vec<Worker>,
    next: AtomicUsize,
}

impl WorkerPool {
    /// Create `size` workers and the fatal-death receiver.
    pub fn new(size: usize) -> (Self, UnboundedReceiver<usize>) {
        let (fatal_tx, fatal_rx) = mpsc::unbounded_channel();

        let workers = (0..size)
            .map(|id| Worker {
                id,
                fatal_tx: fatal_tx.clone(),
            })
            .collect();

        (
            Self {
                workers,
                next: AtomicUsize::new(0),
            },
            fatal_rx,
        )
    }

    /// Assign the next worker, wrapping at the pool size.
    ///
    /// Assignment is a pure function of call order modulo pool size.
    pub fn assign(&self) -> usize {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        n % self.workers.len().max(1)
    }

    /// Number of workers in the pool.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Whether the pool is empty (never true for a configured pool).
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Access a worker by id.
    pub fn worker(&self, id: usize) -> Option<&Worker> {
        self.workers.get(id)
    }
}

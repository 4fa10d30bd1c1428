//! Bounded pool for extraction work.
//!
//! Each extraction occupies a slot for the whole retrieval and transcode.
//! Requests beyond capacity wait for a slot instead of starting more engine
//! processes.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;

/// Concurrency limiter shared by all download requests.
#[derive(Debug, Clone)]
pub struct ExtractionPool {
    permits: Arc<Semaphore>,
    capacity: usize,
}

impl ExtractionPool {
    /// Create a pool with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Slots currently free.
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `work` once a slot is free. The slot is held until `work`
    /// completes or is dropped.
    pub async fn run<F, T>(&self, work: F) -> mg_core::Result<T>
    where
        F: Future<Output = mg_core::Result<T>>,
    {
        if self.available() == 0 {
            tracing::debug!(capacity = self.capacity, "Extraction pool full; waiting for a slot");
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| mg_core::Error::Internal("extraction pool closed".into()))?;

        work.await
    }
}

use crate::filter::{FilterStore, RegistryError, SnapshotFile};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Writes the registry to its snapshot file when it has changed since the last save.
pub struct SnapshotSaver {
    file: SnapshotFile,
    store: Arc<FilterStore>,
    saved_generation: AtomicU64,
}

impl SnapshotSaver {
    /// The store is assumed to match the file on disk when the saver is created.
    pub fn new(file: SnapshotFile, store: Arc<FilterStore>) -> Self {
        let saved_generation = AtomicU64::new(store.generation());
        Self {
            file,
            store,
            saved_generation,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.store.generation() != self.saved_generation.load(Ordering::Acquire)
    }

    /// Returns the number of filters written, or `None` if nothing changed.
    pub fn save_if_dirty(&self) -> Result<Option<usize>, RegistryError> {
        if !self.is_dirty() {
            return Ok(None);
        }
        self.save().map(Some)
    }

    pub fn save(&self) -> Result<usize, RegistryError> {
        // Read before exporting: a mutation racing the export leaves the store dirty.
        let generation = self.store.generation();
        let count = self.file.save(&self.store)?;
        self.saved_generation.store(generation, Ordering::Release);

        tracing::debug!(
            path = %self.file.path().display(),
            filters = count,
            generation,
            "snapshot written"
        );
        Ok(count)
    }

    /// Periodic save loop for the control-plane runtime. Failures are logged and retried next tick.
    pub async fn run(self: Arc<Self>, every: Duration) {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;

        tracing::info!(
            path = %self.file.path().display(),
            interval_secs = every.as_secs(),
            "snapshot loop started"
        );

        loop {
            ticker.tick().await;
            if let Err(e) = self.save_if_dirty() {
                tracing::error!(error = %e, "snapshot save failed");
            }
        }
    }
}

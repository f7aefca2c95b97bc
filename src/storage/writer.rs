//! Background store writer
//!
//! Moves store writes off the caller's path while keeping them strictly
//! ordered: one blocking worker drains a command queue and applies each
//! write before taking the next. Failed writes are logged and dropped.

use super::store::KeyValueStore;
use crate::error::{StoreError, StoreResult};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Commands accepted by the writer worker
enum WriteCommand {
    /// Store a value under a key
    Put { key: String, value: String },
    /// Remove a key
    Remove { key: String },
    /// Reply once every command queued before this one has been applied
    Flush(oneshot::Sender<()>),
}

/// Handle to a worker that owns a store and applies writes in order
pub struct StoreWriter<S> {
    command_tx: mpsc::UnboundedSender<WriteCommand>,
    worker: JoinHandle<S>,
}

impl<S> StoreWriter<S>
where
    S: KeyValueStore + Send + 'static,
{
    /// Start the worker. Must be called from inside a tokio runtime.
    pub fn spawn(store: S) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let worker = tokio::task::spawn_blocking(move || run_worker(store, command_rx));
        Self { command_tx, worker }
    }

    /// Queue a write; returns immediately
    pub fn put(&self, key: &str, value: String) -> StoreResult<()> {
        self.command_tx
            .send(WriteCommand::Put {
                key: key.to_string(),
                value,
            })
            .map_err(|_| StoreError::WriterClosed)
    }

    /// Queue a removal; returns immediately
    pub fn remove(&self, key: &str) -> StoreResult<()> {
        self.command_tx
            .send(WriteCommand::Remove {
                key: key.to_string(),
            })
            .map_err(|_| StoreError::WriterClosed)
    }

    /// Wait until every previously queued command has been applied
    pub async fn flush(&self) -> StoreResult<()> {
        let (done_tx, done_rx) = oneshot::channel();
        self.command_tx
            .send(WriteCommand::Flush(done_tx))
            .map_err(|_| StoreError::WriterClosed)?;
        done_rx.await.map_err(|_| StoreError::WriterClosed)
    }

    /// Apply everything still queued, stop the worker and hand the store back
    pub async fn shutdown(self) -> StoreResult<S> {
        drop(self.command_tx);
        self.worker.await.map_err(|_| StoreError::WriterClosed)
    }
}

fn run_worker<S: KeyValueStore>(mut store: S, mut command_rx: mpsc::UnboundedReceiver<WriteCommand>) -> S {
    while let Some(command) = command_rx.blocking_recv() {
        match command {
            WriteCommand::Put { key, value } => {
                if let Err(e) = store.put(&key, value) {
                    log::error!("Failed to write {}: {}", key, e);
                }
            }
            WriteCommand::Remove { key } => {
                if let Err(e) = store.remove(&key) {
                    log::error!("Failed to remove {}: {}", key, e);
                }
            }
            WriteCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    log::debug!("Store writer stopped");
    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonFileStore, MemoryStore};

    #[tokio::test]
    async fn test_writes_apply_in_submission_order() {
        let writer = StoreWriter::spawn(MemoryStore::new());
        for i in 0..50 {
            writer.put("saved_tabs", i.to_string()).unwrap();
        }
        let store = writer.shutdown().await.unwrap();
        assert_eq!(store.get("saved_tabs").unwrap().as_deref(), Some("49"));
    }

    #[tokio::test]
    async fn test_flush_waits_for_file_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let writer = StoreWriter::spawn(JsonFileStore::new(&path));

        writer.put("saved_tabs", "[]".to_string()).unwrap();
        writer.flush().await.unwrap();

        let reader = JsonFileStore::new(&path);
        assert_eq!(reader.get("saved_tabs").unwrap().as_deref(), Some("[]"));

        writer.remove("saved_tabs").unwrap();
        writer.flush().await.unwrap();
        assert!(reader.get("saved_tabs").unwrap().is_none());
    }
}

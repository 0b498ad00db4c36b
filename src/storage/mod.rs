//! Persistence of the compiled signature table
//!
//! Stores deal in opaque byte blobs; only [`crate::signatures::SignatureTable`]
//! knows how to encode and decode them.

pub mod file;

use async_trait::async_trait;
use std::sync::Mutex;

use crate::errors::ClassifierResult;

pub use file::FileTableStore;

/// Durable storage for one encoded table
#[async_trait]
pub trait TableStore: Send + Sync {
    /// The stored blob, or `None` when nothing has been saved yet
    async fn load(&self) -> ClassifierResult<Option<Vec<u8>>>;

    /// Replace the stored blob
    async fn save(&self, blob: &[u8]) -> ClassifierResult<()>;

    async fn exists(&self) -> ClassifierResult<bool>;
}

/// Keeps the blob in memory; nothing survives the process
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `blob`
    pub fn with_blob(blob: Vec<u8>) -> Self {
        Self {
            blob: Mutex::new(Some(blob)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<Vec<u8>>> {
        self.blob
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn load(&self) -> ClassifierResult<Option<Vec<u8>>> {
        Ok(self.slot().clone())
    }

    async fn save(&self, blob: &[u8]) -> ClassifierResult<()> {
        *self.slot() = Some(blob.to_vec());
        Ok(())
    }

    async fn exists(&self) -> ClassifierResult<bool> {
        Ok(self.slot().is_some())
    }
}

//! Persistence layer — durable document storage for the relay's state.

pub mod fs;

pub use fs::FsStore;

use async_trait::async_trait;

use crate::error::StoreError;

/// Minimal document store: whole-document reads and writes keyed by name.
///
/// The relay persists exactly two documents (the seen-item ledger and the
/// subscriber registry), each rewritten wholesale on every change.
#[async_trait]
pub trait KVStore: Send + Sync {
    /// Read a document; `None` when the key has never been written.
    async fn read_document(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Write a document, replacing any previous content.
    async fn write_document(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

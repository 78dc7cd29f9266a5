//! Seen-item ledger — ids already dispatched, persisted as a JSON array.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::StoreError;
use crate::store::KVStore;

/// Document key for the persisted ledger.
pub const SEEN_DOC: &str = "seen";

/// Set of item ids already evaluated and dispatched.
///
/// Grows monotonically. The in-memory set is authoritative for the life of
/// the process; persistence failures only cost durability across restarts.
pub struct SeenLedger {
    ids: BTreeSet<String>,
    store: Arc<dyn KVStore>,
}

impl SeenLedger {
    /// Load the ledger, starting empty when the document is missing or
    /// unreadable.
    pub async fn load(store: Arc<dyn KVStore>) -> Self {
        let ids = match store.read_document(SEEN_DOC).await {
            Ok(Some(bytes)) => match serde_json::from_slice::<BTreeSet<String>>(&bytes) {
                Ok(ids) => {
                    info!("Loaded seen-item ledger: {} ids", ids.len());
                    ids
                }
                Err(e) => {
                    error!(error = %e, "seen-item ledger unreadable, starting empty");
                    BTreeSet::new()
                }
            },
            Ok(None) => {
                info!("No seen-item ledger on disk, starting empty");
                BTreeSet::new()
            }
            Err(e) => {
                error!(error = %e, "failed to read seen-item ledger, starting empty");
                BTreeSet::new()
            }
        };
        Self { ids, store }
    }

    pub fn has(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn add(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    /// Write the ledger out. Failures are logged and swallowed; the
    /// in-memory set stays authoritative.
    pub async fn persist(&self) {
        if let Err(e) = self.try_persist().await {
            error!(error = %e, "failed to persist seen-item ledger");
        }
    }

    async fn try_persist(&self) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&self.ids)?;
        self.store.write_document(SEEN_DOC, &bytes).await
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

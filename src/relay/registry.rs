//! Subscriber registry — per-subscriber filter config and dialogue mode.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::error::StoreError;
use crate::store::KVStore;

/// Document key for the persisted registry.
pub const SUBSCRIBERS_DOC: &str = "subscribers";

/// Conversational state: the next plain-text message is a value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwaitMode {
    AwaitingKeywords,
    AwaitingAuthors,
}

/// One subscriber's filter configuration.
///
/// Both filter sets are kept lowercase, trimmed and free of empty entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberConfig {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tracked_users: Vec<String>,
    /// `None` outside a prompt dialogue.
    #[serde(default)]
    pub mode: Option<AwaitMode>,
}

impl SubscriberConfig {
    fn normalize(&mut self) {
        normalize_values(&mut self.keywords);
        normalize_values(&mut self.tracked_users);
    }
}

fn normalize_values(values: &mut Vec<String>) {
    for value in values.iter_mut() {
        *value = value.trim().to_lowercase();
    }
    values.retain(|value| !value.is_empty());
}

/// All subscribers, loaded wholesale and rewritten wholesale on mutation.
pub struct SubscriberRegistry {
    subscribers: BTreeMap<i64, SubscriberConfig>,
    store: Arc<dyn KVStore>,
}

impl SubscriberRegistry {
    /// Load the registry, starting empty when the document is missing or
    /// unreadable. Loaded configs are re-normalized.
    pub async fn load(store: Arc<dyn KVStore>) -> Self {
        let subscribers = match store.read_document(SUBSCRIBERS_DOC).await {
            Ok(Some(bytes)) => {
                match serde_json::from_slice::<BTreeMap<i64, SubscriberConfig>>(&bytes) {
                    Ok(mut subscribers) => {
                        for config in subscribers.values_mut() {
                            config.normalize();
                        }
                        info!("Loaded subscriber registry: {} subscribers", subscribers.len());
                        subscribers
                    }
                    Err(e) => {
                        error!(error = %e, "subscriber registry unreadable, starting empty");
                        BTreeMap::new()
                    }
                }
            }
            Ok(None) => {
                info!("No subscriber registry on disk, starting empty");
                BTreeMap::new()
            }
            Err(e) => {
                error!(error = %e, "failed to read subscriber registry, starting empty");
                BTreeMap::new()
            }
        };
        Self { subscribers, store }
    }

    pub fn get(&self, subscriber_id: i64) -> Option<&SubscriberConfig> {
        self.subscribers.get(&subscriber_id)
    }

    /// Create-if-absent, mutate, normalize, persist. The single write path
    /// for subscriber state.
    pub async fn upsert(&mut self, subscriber_id: i64, mutate: impl FnOnce(&mut SubscriberConfig)) {
        let config = self.subscribers.entry(subscriber_id).or_default();
        mutate(config);
        config.normalize();
        self.persist_all().await;
    }

    /// Write the whole registry out. Failures are logged and swallowed;
    /// the in-memory map stays authoritative.
    pub async fn persist_all(&self) {
        match self.try_persist().await {
            Ok(()) => debug!(subscribers = self.subscribers.len(), "persisted subscriber registry"),
            Err(e) => error!(error = %e, "failed to persist subscriber registry"),
        }
    }

    async fn try_persist(&self) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(&self.subscribers)?;
        self.store.write_document(SUBSCRIBERS_DOC, &bytes).await
    }

    pub fn iter(&self) -> impl Iterator<Item = (i64, &SubscriberConfig)> {
        self.subscribers.iter().map(|(id, config)| (*id, config))
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{SlotBackend, SlotError};

/// Process-local slots. Used when no Redis URL is configured.
#[derive(Default)]
pub struct MemorySlots {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SlotBackend for MemorySlots {
    async fn get(&self, key: &str) -> Result<Option<String>, SlotError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), SlotError> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, keys: &[String]) -> Result<(), SlotError> {
        let mut values = self.values.write().await;
        for key in keys {
            values.remove(key);
        }
        Ok(())
    }
}

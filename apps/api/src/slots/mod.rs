//! Named key-value slots holding the browser extension's persisted state.
//!
//! Every value is stored as a JSON string under `{install_id}:{slot}`, so
//! installations never see each other's data.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub mod memory;
pub mod redis_slots;

pub use memory::MemorySlots;
pub use redis_slots::RedisSlots;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKey {
    UserId,
    MasterResume,
    AuthToken,
    GeminiApiKey,
    LastSync,
    CurrentPageText,
    CurrentPageUrl,
    CurrentJobData,
}

impl SlotKey {
    /// Slots wiped by `Slots::clear`. Page-capture slots are overwritten on
    /// every capture and are not part of this set.
    pub const PERSISTED: [SlotKey; 5] = [
        SlotKey::UserId,
        SlotKey::MasterResume,
        SlotKey::AuthToken,
        SlotKey::GeminiApiKey,
        SlotKey::LastSync,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKey::UserId => "resumematch_user_id",
            SlotKey::MasterResume => "resumematch_master_resume",
            SlotKey::AuthToken => "resumematch_auth_token",
            SlotKey::GeminiApiKey => "resumematch_gemini_key",
            SlotKey::LastSync => "resumematch_last_sync",
            SlotKey::CurrentPageText => "currentPageText",
            SlotKey::CurrentPageUrl => "currentPageURL",
            SlotKey::CurrentJobData => "currentJobData",
        }
    }
}

#[derive(Debug, Error)]
pub enum SlotError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("slot '{slot}' holds invalid JSON: {source}")]
    Corrupt {
        slot: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Raw string storage. Keys arrive fully namespaced.
#[async_trait]
pub trait SlotBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, SlotError>;
    async fn set(&self, key: &str, value: String) -> Result<(), SlotError>;
    async fn remove(&self, keys: &[String]) -> Result<(), SlotError>;
}

/// Typed access to one backend.
#[derive(Clone)]
pub struct Slots {
    backend: Arc<dyn SlotBackend>,
}

impl Slots {
    pub fn new(backend: Arc<dyn SlotBackend>) -> Self {
        Self { backend }
    }

    fn key(install_id: &str, slot: SlotKey) -> String {
        format!("{install_id}:{}", slot.as_str())
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        install_id: &str,
        slot: SlotKey,
    ) -> Result<Option<T>, SlotError> {
        let Some(raw) = self.backend.get(&Self::key(install_id, slot)).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| SlotError::Corrupt {
                slot: slot.as_str(),
                source,
            })
    }

    pub async fn set<T: Serialize + ?Sized>(
        &self,
        install_id: &str,
        slot: SlotKey,
        value: &T,
    ) -> Result<(), SlotError> {
        let raw = serde_json::to_string(value).map_err(|source| SlotError::Corrupt {
            slot: slot.as_str(),
            source,
        })?;
        self.backend.set(&Self::key(install_id, slot), raw).await
    }

    pub async fn remove(&self, install_id: &str, slot: SlotKey) -> Result<(), SlotError> {
        self.backend.remove(&[Self::key(install_id, slot)]).await
    }

    /// Removes every persisted slot of one installation.
    pub async fn clear(&self, install_id: &str) -> Result<(), SlotError> {
        let keys: Vec<String> = SlotKey::PERSISTED
            .iter()
            .map(|slot| Self::key(install_id, *slot))
            .collect();
        self.backend.remove(&keys).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::ResumeData;

    fn slots() -> (Slots, Arc<MemorySlots>) {
        let backend = Arc::new(MemorySlots::new());
        (Slots::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn test_values_are_stored_as_json_under_namespaced_key() {
        let (slots, backend) = slots();
        slots.set("install-1", SlotKey::UserId, "user_42").await.unwrap();

        let raw = backend.get("install-1:resumematch_user_id").await.unwrap();
        assert_eq!(raw.as_deref(), Some(r#""user_42""#));

        let value: Option<String> = slots.get("install-1", SlotKey::UserId).await.unwrap();
        assert_eq!(value.as_deref(), Some("user_42"));
    }

    #[tokio::test]
    async fn test_installations_are_isolated() {
        let (slots, _) = slots();
        slots
            .set("a", SlotKey::MasterResume, &ResumeData::default())
            .await
            .unwrap();
        let other: Option<ResumeData> = slots.get("b", SlotKey::MasterResume).await.unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_clear_keeps_page_capture_slots() {
        let (slots, _) = slots();
        slots.set("a", SlotKey::AuthToken, "tok").await.unwrap();
        slots.set("a", SlotKey::CurrentPageUrl, "https://x.dev").await.unwrap();

        slots.clear("a").await.unwrap();

        let token: Option<String> = slots.get("a", SlotKey::AuthToken).await.unwrap();
        let url: Option<String> = slots.get("a", SlotKey::CurrentPageUrl).await.unwrap();
        assert!(token.is_none());
        assert_eq!(url.as_deref(), Some("https://x.dev"));
    }

    #[tokio::test]
    async fn test_corrupt_slot_is_reported() {
        let (slots, backend) = slots();
        backend
            .set("a:resumematch_last_sync", "not json".to_string())
            .await
            .unwrap();
        let result: Result<Option<String>, _> = slots.get("a", SlotKey::LastSync).await;
        assert!(matches!(
            result,
            Err(SlotError::Corrupt { slot: "resumematch_last_sync", .. })
        ));
    }
}

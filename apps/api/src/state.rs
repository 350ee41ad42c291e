use std::sync::Arc;

use crate::llm_client::TextCompletion;
use crate::resume::DocumentFormatter;
use crate::slots::{SlotError, SlotKey, Slots};
use crate::store::ApplicationStore;
use crate::tailoring::ats_scoring::AtsScorer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Users, master resumes and saved applications. Memory or PostgreSQL.
    pub store: Arc<dyn ApplicationStore>,
    /// Extension local state. Memory or Redis.
    pub slots: Slots,
    /// Server-keyed completion service.
    pub llm: Arc<dyn TextCompletion>,
    /// Backend for orchestrator step 3. Swap via ATS_SCORER env.
    pub ats_scorer: Arc<dyn AtsScorer>,
    pub formatter: Arc<dyn DocumentFormatter>,
}

impl AppState {
    /// The completion service for one extension installation: its cached key
    /// when it stored one, the server key otherwise.
    pub async fn llm_for_install(
        &self,
        install_id: &str,
    ) -> Result<Arc<dyn TextCompletion>, SlotError> {
        let key: Option<String> = self.slots.get(install_id, SlotKey::GeminiApiKey).await?;

        Ok(key
            .filter(|k| !k.trim().is_empty())
            .and_then(|k| self.llm.rekeyed(&k))
            .unwrap_or_else(|| self.llm.clone()))
    }
}

mod config;
mod db;
mod errors;
mod extension;
mod llm_client;
mod models;
mod resume;
mod routes;
mod slots;
mod state;
mod store;
mod tailoring;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AtsScorerKind, Config};
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::GeminiClient;
use crate::resume::document::DocxFormatter;
use crate::routes::build_router;
use crate::slots::{MemorySlots, RedisSlots, SlotBackend, Slots};
use crate::state::AppState;
use crate::store::{ApplicationStore, MemoryStore, PgStore};
use crate::tailoring::ats_scoring::{AtsScorer, HeuristicAtsScorer, LlmAtsScorer};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeMatch API v{}", env!("CARGO_PKG_VERSION"));

    // Application store: PostgreSQL when configured, process memory otherwise
    let store: Arc<dyn ApplicationStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set, using in-memory application store");
            Arc::new(MemoryStore::new())
        }
    };

    // Extension slots: Redis when configured, process memory otherwise
    let slot_backend: Arc<dyn SlotBackend> = match &config.redis_url {
        Some(url) => Arc::new(RedisSlots::connect(url).await?),
        None => {
            info!("REDIS_URL not set, using in-memory extension slots");
            Arc::new(MemorySlots::new())
        }
    };

    // Initialize LLM client
    let llm = Arc::new(GeminiClient::new(config.gemini_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let ats_scorer: Arc<dyn AtsScorer> = match config.ats_scorer {
        AtsScorerKind::Llm => Arc::new(LlmAtsScorer),
        AtsScorerKind::Heuristic => Arc::new(HeuristicAtsScorer),
    };
    info!("ATS scorer: {:?}", config.ats_scorer);

    let state = AppState {
        store,
        slots: Slots::new(slot_backend),
        llm,
        ats_scorer,
        formatter: Arc::new(DocxFormatter),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // the extension calls from its own origin

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

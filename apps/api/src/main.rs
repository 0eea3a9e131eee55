mod config;
mod db;
mod errors;
mod llm_client;
mod matching;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::matching::engine::MatchingEngine;
use crate::matching::rationale::{RationaleComposer, TextGenerator};
use crate::matching::repository::PgMatchingRepository;
use crate::matching::rules::MatchingRules;
use crate::routes::build_router;
use crate::state::AppState;

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

    info!("Starting Matching API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let repository = Arc::new(PgMatchingRepository::new(db));

    // Matching rules (built-in defaults unless MATCHING_RULES_PATH is set)
    let rules = MatchingRules::load(config.matching_rules_path.as_deref())?;
    info!(
        "Matching rules loaded: weights total {:.1}, experience saturation {}y",
        rules.weights.sum(),
        rules.experience_saturation_years
    );

    // Optional LLM wording for rationale; templated rationale without it
    let rationale_timeout = Duration::from_millis(config.rationale_timeout_ms);
    let generator: Option<Arc<dyn TextGenerator>> = match &config.anthropic_api_key {
        Some(key) => {
            let client: Arc<dyn TextGenerator> =
                Arc::new(LlmClient::new(key.clone(), rationale_timeout)?);
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Some(client)
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; rationale will use templates only");
            None
        }
    };

    let engine = MatchingEngine::new(
        rules,
        RationaleComposer::new(generator, rationale_timeout),
        config.matching_concurrency,
    );

    // Build app state
    let state = AppState {
        config: config.clone(),
        engine: Arc::new(engine),
        companies: repository.clone(),
        consultants: repository.clone(),
        recommendations: repository,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the dashboard host once it has a fixed domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

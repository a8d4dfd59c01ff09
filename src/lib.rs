// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod briefing;
pub mod cache;
pub mod clock;
pub mod config;
pub mod enrich;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod pacer;
pub mod quiz;
pub mod snapshot;
pub mod verify;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::briefing::{article_stats, ArticleStats, BriefingService};
pub use crate::ingest::types::{Article, ValidationStatus};

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::enrich::backend::build_backend;
use crate::enrich::ContentEnrichment;
use crate::ingest::providers::api::ReqwestTransport;
use crate::ingest::Aggregator;
use crate::pacer::{Pacer, TokioPacer};
use crate::verify::probe::HttpProbe;
use crate::verify::{LinkCache, LinkVerifier};

/// Production wiring: real HTTP clients, wall-clock pacing, Gemini when a
/// key is configured.
pub fn build_state(config: AppConfig, clock: Arc<dyn Clock>) -> anyhow::Result<AppState> {
    use anyhow::Context;

    let pacer: Arc<dyn Pacer> = Arc::new(TokioPacer);
    let transport = ReqwestTransport::new(config.briefing.provider_timeout())
        .context("building provider HTTP client")?;
    let probe = HttpProbe::new().context("building link-check HTTP clients")?;

    let aggregator = Aggregator::from_config(
        &config,
        Arc::new(transport),
        Arc::clone(&pacer),
        Arc::clone(&clock),
    );
    let verifier = LinkVerifier::new(
        Arc::new(LinkCache::new(config.briefing.link_cache_ttl())),
        Arc::new(probe),
        Arc::clone(&clock),
    );
    let enrichment = Arc::new(ContentEnrichment::new(build_backend(&config.ai)));

    tracing::info!(
        providers = ?aggregator.provider_names(),
        ai = enrichment.provider_name(),
        "briefing service wired"
    );

    let briefing = BriefingService::new(
        aggregator,
        verifier,
        enrichment,
        pacer,
        Arc::clone(&clock),
        &config.briefing,
    );

    Ok(AppState {
        briefing: Arc::new(briefing),
        config: Arc::new(config),
        clock,
    })
}

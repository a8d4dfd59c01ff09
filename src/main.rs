//! BizAI Briefing Service: binary entrypoint.
//! Boots the Axum HTTP server, wiring providers, caches, and middleware.

use std::sync::Arc;

use bizai_briefing::clock::SystemClock;
use bizai_briefing::config::AppConfig;
use bizai_briefing::metrics::Metrics;
use shuttle_axum::ShuttleAxum;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs filtered by `RUST_LOG`. `try_init` leaves an already
/// installed subscriber (e.g. the hosting runtime's) in place.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("bizai_briefing=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = AppConfig::load()?;
    let metrics = Metrics::init(
        config.briefing.cache_ttl_secs,
        config.briefing.link_cache_ttl_secs,
    )?;

    let state = bizai_briefing::build_state(config, Arc::new(SystemClock))?;
    let router = bizai_briefing::router(state).merge(metrics.router());

    Ok(router.into())
}

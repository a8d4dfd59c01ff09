use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge, describe_histogram, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "briefing_provider_errors_total",
            "Provider endpoint or task failures."
        );
        describe_counter!(
            "briefing_articles_fetched_total",
            "Articles normalized from provider responses."
        );
        describe_counter!("briefing_dedup_total", "Articles removed by deduplication.");
        describe_counter!("briefing_cache_hits_total", "Briefing served from cache.");
        describe_counter!(
            "briefing_cache_misses_total",
            "Briefing rebuilt from providers."
        );
        describe_counter!(
            "briefing_fallback_total",
            "Aggregations that fell back to the fixed article set."
        );
        describe_counter!("link_cache_hits_total", "Link checks answered from cache.");
        describe_counter!("link_checks_total", "Link checks that went to the network.");
        describe_counter!("link_invalid_total", "Link checks that found a dead link.");
        describe_counter!("enrich_calls_total", "Generative backend calls.");
        describe_counter!("enrich_failures_total", "Failed generative backend calls.");
        describe_histogram!(
            "briefing_fetch_ms",
            "Provider endpoint fetch time in milliseconds."
        );
        describe_gauge!(
            "briefing_last_fetch_ts",
            "Unix ts of the last provider aggregation."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder and publish the cache TTLs as static gauges.
    pub fn init(cache_ttl_secs: u64, link_cache_ttl_secs: u64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        ensure_metrics_described();
        gauge!("briefing_cache_ttl_secs").set(cache_ttl_secs as f64);
        gauge!("link_cache_ttl_secs").set(link_cache_ttl_secs as f64);

        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

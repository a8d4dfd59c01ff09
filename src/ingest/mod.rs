// src/ingest/mod.rs
pub mod fallback;
pub mod normalize;
pub mod providers;
pub mod types;

use chrono::{DateTime, Utc};
use metrics::{counter, gauge};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::ingest::fallback::fallback_articles;
use crate::ingest::normalize::parse_published;
use crate::ingest::providers::api::{ApiProvider, JsonTransport};
use crate::ingest::providers::ALL_PROVIDERS;
use crate::ingest::types::{Article, SourceProvider};
use crate::pacer::Pacer;

pub const TITLE_KEY_CHARS: usize = 50;

/// Dedup key for titles: lowercase, first 50 chars.
pub fn title_key(title: &str) -> String {
    title.to_lowercase().chars().take(TITLE_KEY_CHARS).collect()
}

/// Keep the first occurrence of each URL and of each title key; an article
/// is dropped if either was already seen. Returns (kept, dropped_count).
pub fn dedup_articles<I>(articles: I) -> (Vec<Article>, usize)
where
    I: IntoIterator<Item = Article>,
{
    let mut seen_urls: HashSet<String> = HashSet::new();
    let mut seen_titles: HashSet<String> = HashSet::new();
    let mut keep = Vec::new();
    let mut dropped = 0usize;

    for a in articles {
        let tkey = title_key(&a.title);
        if seen_urls.contains(&a.url) || seen_titles.contains(&tkey) {
            dropped += 1;
            continue;
        }
        seen_urls.insert(a.url.clone());
        seen_titles.insert(tkey);
        keep.push(a);
    }
    (keep, dropped)
}

/// Newest first. Unparseable dates go last, keeping their relative order.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by_cached_key(|a| Reverse(parse_published(&a.published_at)));
}

/// Merge per-provider batches (given in registry order), dedup, sort and
/// truncate. Returns (articles, dropped_by_dedup).
pub fn merge_batches(batches: Vec<Vec<Article>>, max_articles: usize) -> (Vec<Article>, usize) {
    let (mut kept, dropped) = dedup_articles(batches.into_iter().flatten());
    sort_newest_first(&mut kept);
    kept.truncate(max_articles);
    (kept, dropped)
}

/// Fans out to every enabled provider and merges the results.
///
/// Caching is not done here: every call re-fetches.
pub struct Aggregator {
    providers: Vec<Arc<dyn SourceProvider>>,
    max_articles: usize,
    clock: Arc<dyn Clock>,
}

impl Aggregator {
    pub fn new(
        providers: Vec<Arc<dyn SourceProvider>>,
        max_articles: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            providers,
            max_articles,
            clock,
        }
    }

    /// One `ApiProvider` per provider whose key is configured, in registry order.
    pub fn from_config(
        cfg: &AppConfig,
        transport: Arc<dyn JsonTransport>,
        pacer: Arc<dyn Pacer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let endpoint_delay: Duration = cfg.briefing.endpoint_delay();
        let mut providers: Vec<Arc<dyn SourceProvider>> = Vec::new();
        for kind in ALL_PROVIDERS {
            match kind.api_key(&cfg.keys) {
                Some(key) => providers.push(Arc::new(ApiProvider::new(
                    kind,
                    key,
                    Arc::clone(&transport),
                    Arc::clone(&pacer),
                    endpoint_delay,
                    Arc::clone(&clock),
                ))),
                None => tracing::info!(
                    provider = kind.name(),
                    key_env = kind.key_env(),
                    "API key not configured, skipping"
                ),
            }
        }
        Self::new(providers, cfg.briefing.max_articles, clock)
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Concurrent fetch from all providers. Never fails: a provider that
    /// errors or panics contributes nothing, and an empty merge yields the
    /// fixed fallback set.
    pub async fn fetch_all(&self) -> Vec<Article> {
        crate::metrics::ensure_metrics_described();

        let handles: Vec<_> = self
            .providers
            .iter()
            .map(|p| {
                let p = Arc::clone(p);
                (p.name(), tokio::spawn(async move { p.fetch_latest().await }))
            })
            .collect();

        // Awaiting in registry order keeps the merge deterministic regardless
        // of which provider finished first.
        let mut batches = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            match handle.await {
                Ok(Ok(articles)) => batches.push(articles),
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, provider = name, "provider error");
                    counter!("briefing_provider_errors_total", "provider" => name).increment(1);
                }
                Err(e) => {
                    tracing::warn!(error = %e, provider = name, "provider task failed");
                    counter!("briefing_provider_errors_total", "provider" => name).increment(1);
                }
            }
        }

        let (merged, dropped) = merge_batches(batches, self.max_articles);
        let now: DateTime<Utc> = self.clock.now();
        counter!("briefing_dedup_total").increment(dropped as u64);
        gauge!("briefing_last_fetch_ts").set(now.timestamp() as f64);

        if merged.is_empty() {
            tracing::warn!("no articles from any provider, using fallback");
            counter!("briefing_fallback_total").increment(1);
            return fallback_articles(now);
        }

        tracing::info!(
            providers = self.providers.len(),
            unique = merged.len(),
            deduped = dropped,
            "aggregation finished"
        );
        merged
    }
}

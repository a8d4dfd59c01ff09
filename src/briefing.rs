// src/briefing.rs
//! Briefing orchestration: TTL-cached aggregation and the enhanced pass
//! (batched link verification plus optional AI enrichment).
//!
//! This is the only place where enrichment errors are turned into the
//! per-article fallback policy.

use chrono::Duration as ChronoDuration;
use metrics::counter;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::TtlSlot;
use crate::clock::Clock;
use crate::config::BriefingConfig;
use crate::enrich::{ContentEnrichment, Recommendation};
use crate::ingest::types::{Article, ValidationStatus};
use crate::ingest::Aggregator;
use crate::pacer::Pacer;
use crate::verify::LinkVerifier;

/// Reason passed to the backend when asking for replacement content.
pub const LINK_BROKEN_REASON: &str = "link_broken";
/// Attached when replacement content could not be generated.
pub const SOURCE_UNAVAILABLE_DISCLAIMER: &str = "Original source unavailable";

pub struct BriefingService {
    aggregator: Aggregator,
    cache: TtlSlot<Vec<Article>>,
    verifier: LinkVerifier,
    enrichment: Arc<ContentEnrichment>,
    pacer: Arc<dyn Pacer>,
    batch_size: usize,
    batch_pause: Duration,
}

impl BriefingService {
    pub fn new(
        aggregator: Aggregator,
        verifier: LinkVerifier,
        enrichment: Arc<ContentEnrichment>,
        pacer: Arc<dyn Pacer>,
        clock: Arc<dyn Clock>,
        cfg: &BriefingConfig,
    ) -> Self {
        Self::with_cache_ttl(
            aggregator,
            verifier,
            enrichment,
            pacer,
            clock,
            cfg.cache_ttl(),
            cfg.batch_size,
            cfg.batch_pause(),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn with_cache_ttl(
        aggregator: Aggregator,
        verifier: LinkVerifier,
        enrichment: Arc<ContentEnrichment>,
        pacer: Arc<dyn Pacer>,
        clock: Arc<dyn Clock>,
        cache_ttl: ChronoDuration,
        batch_size: usize,
        batch_pause: Duration,
    ) -> Self {
        Self {
            aggregator,
            cache: TtlSlot::new(cache_ttl, clock),
            verifier,
            enrichment,
            pacer,
            batch_size: batch_size.max(1),
            batch_pause,
        }
    }

    pub fn enrichment(&self) -> &ContentEnrichment {
        &self.enrichment
    }

    pub fn verifier(&self) -> &LinkVerifier {
        &self.verifier
    }

    /// Cached aggregation if fresh, else a full re-fetch that replaces the
    /// cache. Never empty: `fetch_all` yields the fallback set itself.
    pub async fn get_briefing(&self) -> Vec<Article> {
        if let Some(cached) = self.cache.get() {
            counter!("briefing_cache_hits_total").increment(1);
            return cached;
        }
        counter!("briefing_cache_misses_total").increment(1);

        let articles = self.aggregator.fetch_all().await;
        self.cache.set(articles.clone());
        articles
    }

    /// Briefing after link verification and optional enrichment, in the
    /// same order as `get_briefing`.
    pub async fn get_enhanced_briefing(&self) -> Vec<Article> {
        let articles = self.get_briefing().await;
        let total = articles.len();
        let mut out = Vec::with_capacity(total);

        let batches: Vec<&[Article]> = articles.chunks(self.batch_size).collect();
        let batch_count = batches.len();
        for (i, batch) in batches.into_iter().enumerate() {
            let urls: Vec<String> = batch.iter().map(|a| a.url.clone()).collect();
            let checks = self.verifier.verify_many(&urls).await;

            for (article, check) in batch.iter().zip(checks) {
                out.push(self.process_article(article.clone(), check.is_valid).await);
            }

            if i + 1 < batch_count {
                self.pacer.pause(self.batch_pause).await;
            }
        }

        tracing::info!(
            total,
            generated = out.iter().filter(|a| a.is_generated).count(),
            invalid = out.iter().filter(|a| a.link_valid == Some(false)).count(),
            "enhanced briefing built"
        );
        out
    }

    async fn process_article(&self, mut article: Article, link_valid: bool) -> Article {
        article.link_valid = Some(link_valid);
        article.validation_status = if link_valid {
            ValidationStatus::Verified
        } else {
            ValidationStatus::Failed
        };

        if !self.enrichment.is_configured() {
            return article;
        }

        if !link_valid {
            match self
                .enrichment
                .try_generate_alternative(&article, LINK_BROKEN_REASON)
                .await
            {
                Ok(alt) => {
                    article.title = alt.title;
                    article.summary = alt.summary;
                    article.is_generated = true;
                    article.alternative_sources = alt.alternative_sources;
                    article.disclaimer = Some(alt.disclaimer).filter(|d| !d.is_empty());
                    article.credibility_score = Some(alt.confidence * 10.0);
                }
                Err(e) => {
                    tracing::debug!(error = %e, id = %article.id, "alternative content unavailable");
                    article.disclaimer = Some(SOURCE_UNAVAILABLE_DISCLAIMER.to_string());
                }
            }
            return article;
        }

        let validation = match self.enrichment.try_validate(&article).await {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(error = %e, id = %article.id, "validation unavailable");
                return article;
            }
        };
        article.credibility_score = Some(validation.credibility_score);
        article.validation_status = validation.recommendation.into();

        if validation.recommendation == Recommendation::Approve {
            match self.enrichment.try_enhance_summary(&article).await {
                Ok(enhanced) if enhanced != article.summary => article.summary = enhanced,
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, id = %article.id, "summary enhancement failed"),
            }
        }
        article
    }
}

/// Aggregate view of a processed briefing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleStats {
    pub total: usize,
    pub verified: usize,
    pub failed: usize,
    pub generated: usize,
    pub avg_credibility: f64,
    pub domain_distribution: BTreeMap<String, usize>,
    pub api_distribution: BTreeMap<String, usize>,
    pub sources: usize,
}

pub fn article_stats(articles: &[Article]) -> ArticleStats {
    let mut domain_distribution = BTreeMap::new();
    let mut api_distribution = BTreeMap::new();
    for a in articles {
        for d in &a.domains {
            *domain_distribution.entry(d.clone()).or_insert(0) += 1;
        }
        let api = if a.api_source.is_empty() {
            "Unknown".to_string()
        } else {
            a.api_source.clone()
        };
        *api_distribution.entry(api).or_insert(0) += 1;
    }

    let scores: Vec<f64> = articles
        .iter()
        .filter_map(|a| a.credibility_score)
        .filter(|s| *s != 0.0)
        .collect();
    let avg_credibility = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    let sources: HashSet<&str> = articles.iter().map(|a| a.source_name.as_str()).collect();

    ArticleStats {
        total: articles.len(),
        verified: articles.iter().filter(|a| a.link_valid == Some(true)).count(),
        failed: articles.iter().filter(|a| a.link_valid == Some(false)).count(),
        generated: articles.iter().filter(|a| a.is_generated).count(),
        avg_credibility,
        domain_distribution,
        api_distribution,
        sources: sources.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_skip_unscored_articles_in_average() {
        let a = |src: &str, score: Option<f64>, valid: Option<bool>| Article {
            source_name: src.into(),
            credibility_score: score,
            link_valid: valid,
            domains: vec!["finance".into()],
            api_source: "GNews API".into(),
            ..Default::default()
        };
        let s = article_stats(&[
            a("Reuters", Some(8.0), Some(true)),
            a("Reuters", None, Some(false)),
            a("FT", Some(6.0), None),
        ]);
        assert_eq!(s.total, 3);
        assert_eq!(s.verified, 1);
        assert_eq!(s.failed, 1);
        assert_eq!(s.sources, 2);
        assert!((s.avg_credibility - 7.0).abs() < 1e-9);
        assert_eq!(s.domain_distribution["finance"], 3);
        assert_eq!(s.api_distribution["GNews API"], 3);
    }

    #[test]
    fn stats_of_empty_briefing() {
        let s = article_stats(&[]);
        assert_eq!(s.total, 0);
        assert_eq!(s.avg_credibility, 0.0);
        assert!(s.domain_distribution.is_empty());
    }
}

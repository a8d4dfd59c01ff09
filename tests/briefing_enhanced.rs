// tests/briefing_enhanced.rs
//
// BriefingService end to end with in-process collaborators: briefing cache
// TTL, batch pacing, and the per-article enrichment policy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;

use bizai_briefing::briefing::{BriefingService, SOURCE_UNAVAILABLE_DISCLAIMER};
use bizai_briefing::clock::ManualClock;
use bizai_briefing::enrich::backend::MockBackend;
use bizai_briefing::enrich::ContentEnrichment;
use bizai_briefing::error::{EnrichError, ProviderError};
use bizai_briefing::ingest::types::SourceProvider;
use bizai_briefing::ingest::Aggregator;
use bizai_briefing::pacer::RecordingPacer;
use bizai_briefing::verify::probe::FnProbe;
use bizai_briefing::verify::{LinkCache, LinkVerifier};
use bizai_briefing::{Article, ValidationStatus};

struct CountingProvider {
    articles: Vec<Article>,
    calls: AtomicUsize,
}

#[async_trait]
impl SourceProvider for CountingProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.articles.clone())
    }
    fn name(&self) -> &'static str {
        "Counting"
    }
}

fn article(i: usize, dead: bool) -> Article {
    let host = if dead { "dead" } else { "live" };
    Article {
        id: format!("a{i}"),
        title: format!("Headline {i}"),
        source_name: "Wire".into(),
        summary: format!("Original summary {i}"),
        url: format!("https://{host}.example/{i}"),
        published_at: format!("2024-03-01T10:{:02}:00Z", 59 - i),
        read_minutes: 2,
        domains: vec!["finance".into()],
        api_source: "Test".into(),
        ..Default::default()
    }
}

/// Probe: anything on the `dead` host is a 404.
fn probe() -> Arc<FnProbe> {
    Arc::new(FnProbe::new(|url, _| {
        Ok(if url.contains("://dead.") { 404 } else { 200 })
    }))
}

struct Harness {
    service: BriefingService,
    provider: Arc<CountingProvider>,
    pacer: Arc<RecordingPacer>,
    clock: Arc<ManualClock>,
}

fn harness(articles: Vec<Article>, enrichment: ContentEnrichment) -> Harness {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let provider = Arc::new(CountingProvider {
        articles,
        calls: AtomicUsize::new(0),
    });
    let pacer = Arc::new(RecordingPacer::new());
    let providers: Vec<Arc<dyn SourceProvider>> = vec![provider.clone()];
    let aggregator = Aggregator::new(providers, 30, clock.clone());
    let verifier = LinkVerifier::new(
        Arc::new(LinkCache::new(Duration::minutes(30))),
        probe(),
        clock.clone(),
    );
    let service = BriefingService::with_cache_ttl(
        aggregator,
        verifier,
        Arc::new(enrichment),
        pacer.clone(),
        clock.clone(),
        Duration::minutes(30),
        5,
        StdDuration::from_secs(1),
    );
    Harness {
        service,
        provider,
        pacer,
        clock,
    }
}

/// Routes each prompt kind to a canned reply.
fn scripted_backend(recommendation: &'static str) -> MockBackend {
    MockBackend::from_fn(move |prompt| {
        if prompt.contains("provide validation") {
            Ok(json!({
                "isLegitimate": true,
                "credibilityScore": 8.5,
                "sourceCredible": true,
                "contentQuality": "high",
                "concerns": [],
                "recommendation": recommendation
            })
            .to_string())
        } else if prompt.contains("link is broken") {
            Ok(format!(
                "```json\n{}\n```",
                json!({
                    "title": "Replacement headline",
                    "summary": "Replacement summary",
                    "alternativeSources": [
                        {"name": "Reuters", "url": "https://reuters.com", "reason": "coverage"}
                    ],
                    "confidence": 0.8,
                    "disclaimer": "Generated"
                })
            ))
        } else if prompt.contains("Enhance this") {
            Ok("  Sharper summary.  ".to_string())
        } else {
            Err(EnrichError::EmptyResponse)
        }
    })
}

#[tokio::test]
async fn briefing_is_cached_for_the_ttl() {
    let h = harness(vec![article(0, false)], ContentEnrichment::disabled());

    h.service.get_briefing().await;
    h.clock.advance(Duration::minutes(29));
    h.service.get_briefing().await;
    assert_eq!(h.provider.calls.load(Ordering::SeqCst), 1);

    h.clock.advance(Duration::minutes(1));
    h.service.get_briefing().await;
    assert_eq!(h.provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_aggregation_is_served_as_fallback() {
    let h = harness(vec![], ContentEnrichment::disabled());
    let out = h.service.get_briefing().await;
    assert_eq!(out.len(), 5);
    assert!(out.iter().all(|a| a.api_source == "Fallback"));
}

#[tokio::test]
async fn dead_link_without_ai_keeps_original_content() {
    let original = article(0, true);
    let h = harness(vec![original.clone()], ContentEnrichment::disabled());

    let out = h.service.get_enhanced_briefing().await;
    assert_eq!(out.len(), 1);
    let a = &out[0];
    assert_eq!(a.link_valid, Some(false));
    assert_eq!(a.validation_status, ValidationStatus::Failed);
    assert!(!a.is_generated);
    assert_eq!(a.title, original.title);
    assert_eq!(a.summary, original.summary);
    assert!(a.disclaimer.is_none());
}

#[tokio::test]
async fn batches_of_five_with_pauses_only_between_them() {
    let articles: Vec<Article> = (0..12).map(|i| article(i, i % 4 == 0)).collect();
    let h = harness(articles.clone(), ContentEnrichment::disabled());

    let out = h.service.get_enhanced_briefing().await;

    let ids: Vec<_> = out.iter().map(|a| a.id.clone()).collect();
    let expected: Vec<_> = articles.iter().map(|a| a.id.clone()).collect();
    assert_eq!(ids, expected, "aggregation order is preserved");
    assert_eq!(h.pacer.pauses(), vec![StdDuration::from_secs(1); 2]);
    for a in &out {
        assert_eq!(a.link_valid, Some(!a.url.contains("://dead.")));
    }
}

#[tokio::test]
async fn dead_link_with_ai_becomes_generated_content() {
    let backend = Arc::new(scripted_backend("approve"));
    let h = harness(
        vec![article(0, true)],
        ContentEnrichment::new(Some(backend.clone())),
    );

    let out = h.service.get_enhanced_briefing().await;
    let a = &out[0];
    assert!(a.is_generated);
    assert_eq!(a.title, "Replacement headline");
    assert_eq!(a.summary, "Replacement summary");
    assert_eq!(a.alternative_sources.len(), 1);
    assert_eq!(a.disclaimer.as_deref(), Some("Generated"));
    assert!((a.credibility_score.unwrap() - 8.0).abs() < 1e-9);
    assert_eq!(a.validation_status, ValidationStatus::Failed);
    // Generated articles are not validated afterwards.
    assert_eq!(backend.calls().len(), 1);
    assert!((backend.calls()[0].1.temperature - 0.5).abs() < f32::EPSILON);
}

#[tokio::test]
async fn dead_link_with_failing_ai_only_gets_a_disclaimer() {
    let original = article(0, true);
    let backend = MockBackend::failing(EnrichError::Status {
        status: 429,
        message: "quota".into(),
    });
    let h = harness(
        vec![original.clone()],
        ContentEnrichment::new(Some(Arc::new(backend))),
    );

    let out = h.service.get_enhanced_briefing().await;
    let a = &out[0];
    assert!(!a.is_generated);
    assert_eq!(a.title, original.title);
    assert_eq!(a.summary, original.summary);
    assert_eq!(a.disclaimer.as_deref(), Some(SOURCE_UNAVAILABLE_DISCLAIMER));
    assert_eq!(a.validation_status, ValidationStatus::Failed);
}

#[tokio::test]
async fn approved_article_gets_enhanced_summary() {
    let h = harness(
        vec![article(0, false)],
        ContentEnrichment::new(Some(Arc::new(scripted_backend("approve")))),
    );

    let out = h.service.get_enhanced_briefing().await;
    let a = &out[0];
    assert_eq!(a.link_valid, Some(true));
    assert_eq!(a.validation_status, ValidationStatus::Approve);
    assert_eq!(a.credibility_score, Some(8.5));
    assert_eq!(a.summary, "Sharper summary.");
    assert!(!a.is_generated);
}

#[tokio::test]
async fn rejected_article_keeps_summary() {
    let backend = Arc::new(scripted_backend("reject"));
    let h = harness(
        vec![article(0, false)],
        ContentEnrichment::new(Some(backend.clone())),
    );

    let out = h.service.get_enhanced_briefing().await;
    let a = &out[0];
    assert_eq!(a.validation_status, ValidationStatus::Reject);
    assert_eq!(a.summary, "Original summary 0");
    assert_eq!(backend.calls().len(), 1, "no enhancement after reject");
}

#[tokio::test]
async fn validation_failure_keeps_verifier_status() {
    let h = harness(
        vec![article(0, false)],
        ContentEnrichment::new(Some(Arc::new(MockBackend::fixed("not json at all")))),
    );

    let out = h.service.get_enhanced_briefing().await;
    let a = &out[0];
    assert_eq!(a.validation_status, ValidationStatus::Verified);
    assert!(a.credibility_score.is_none());
    assert_eq!(a.summary, "Original summary 0");
}

// tests/verify_links.rs
//
// LinkVerifier: cache TTL on an injected clock, HEAD -> ranged GET
// fallback, and order-preserving batch checks.

use std::sync::Arc;

use chrono::{Duration, Utc};

use bizai_briefing::clock::ManualClock;
use bizai_briefing::error::VerifyError;
use bizai_briefing::verify::probe::{FnProbe, ProbeShape};
use bizai_briefing::verify::{LinkCache, LinkCheck, LinkVerifier};

fn verifier(probe: Arc<FnProbe>, clock: Arc<ManualClock>) -> LinkVerifier {
    LinkVerifier::new(Arc::new(LinkCache::new(Duration::minutes(30))), probe, clock)
}

#[tokio::test]
async fn second_check_within_ttl_hits_the_cache() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let probe = Arc::new(FnProbe::always(200));
    let v = verifier(probe.clone(), clock.clone());

    assert!(v.verify("https://a.example/").await);
    clock.advance(Duration::minutes(29));
    assert!(v.verify("https://a.example/").await);
    assert_eq!(probe.call_count(), 1, "one network attempt within the TTL");

    clock.advance(Duration::minutes(1));
    assert!(v.verify("https://a.example/").await);
    assert_eq!(probe.call_count(), 2, "stale entry triggers a fresh attempt");
}

#[tokio::test]
async fn client_errors_are_reachable_but_invalid() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let probe = Arc::new(FnProbe::always(404));
    let v = verifier(probe.clone(), clock);

    assert!(!v.verify("https://gone.example/").await);
    // 404 classifies on HEAD; no fallback attempt.
    assert_eq!(probe.calls(), vec![("https://gone.example/".to_string(), ProbeShape::Head)]);

    let entry = v.cache().get("https://gone.example/").unwrap();
    assert_eq!(entry.status, 404);
    assert!(entry.error.is_none());
}

#[tokio::test]
async fn head_failure_falls_back_to_ranged_get() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let probe = Arc::new(FnProbe::new(|_, shape| match shape {
        ProbeShape::Head => Err(VerifyError::Status(405)),
        ProbeShape::RangedGet => Ok(206),
    }));
    let v = verifier(probe.clone(), clock);

    assert!(v.verify("https://nohead.example/").await);
    let shapes: Vec<_> = probe.calls().into_iter().map(|(_, s)| s).collect();
    assert_eq!(shapes, vec![ProbeShape::Head, ProbeShape::RangedGet]);
}

#[tokio::test]
async fn both_attempts_failing_caches_false_with_reason() {
    let start = Utc::now();
    let clock = Arc::new(ManualClock::new(start));
    let probe = Arc::new(FnProbe::new(|_, _| {
        Err(VerifyError::Transport("connection refused".into()))
    }));
    let v = verifier(probe.clone(), clock.clone());

    assert!(!v.verify("https://down.example/").await);
    assert!(!v.verify("https://down.example/").await);
    assert_eq!(probe.call_count(), 2, "second call served from cache");

    let entry = v.cache().get("https://down.example/").unwrap();
    assert!(!entry.is_valid);
    assert_eq!(entry.status, 0);
    assert_eq!(entry.checked_at, start);
    assert!(entry.error.unwrap().contains("connection refused"));
}

#[tokio::test]
async fn verify_many_keeps_input_order_despite_failures() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let probe = Arc::new(FnProbe::new(|url, _| {
        if url.contains("panic") {
            panic!("probe blew up");
        }
        if url.contains("bad") {
            return Err(VerifyError::Status(503));
        }
        Ok(200)
    }));
    let v = verifier(probe, clock);

    let urls: Vec<String> = ["https://ok/1", "https://bad/2", "https://panic/3", "https://ok/4"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let results = v.verify_many(&urls).await;

    assert_eq!(
        results,
        vec![
            LinkCheck { url: "https://ok/1".into(), is_valid: true },
            LinkCheck { url: "https://bad/2".into(), is_valid: false },
            LinkCheck { url: "https://panic/3".into(), is_valid: false },
            LinkCheck { url: "https://ok/4".into(), is_valid: true },
        ]
    );
}

#[tokio::test]
async fn stats_and_clear() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let probe = Arc::new(FnProbe::always(301));
    let v = verifier(probe, clock);

    v.verify("https://b.example/").await;
    v.verify("https://a.example/").await;

    let stats = v.cache().stats();
    assert_eq!(stats.size, 2);
    assert_eq!(stats.entries[0].url, "https://a.example/");
    assert!(stats.entries[0].is_valid);
    assert_eq!(stats.entries[0].status, 301);

    v.cache().clear();
    assert!(v.cache().is_empty());
}

// src/verify/mod.rs
//! Link verification: cached liveness checks with a HEAD-then-ranged-GET
//! fallback, plus an order-preserving batch form.

pub mod probe;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use metrics::counter;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::verify::probe::{LinkProbe, ProbeShape};

/// Short anonymized id for log lines; raw URLs stay out of debug logs.
pub(crate) fn anon_id(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkCacheEntry {
    pub is_valid: bool,
    pub checked_at: DateTime<Utc>,
    /// Observed HTTP status, 0 when no attempt got a response.
    pub status: u16,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCacheStatsEntry {
    pub url: String,
    pub is_valid: bool,
    pub cached_at: String,
    pub status: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkCacheStats {
    pub size: usize,
    pub entries: Vec<LinkCacheStatsEntry>,
}

/// URL → last check. Entries are never evicted; staleness is judged on read.
#[derive(Debug)]
pub struct LinkCache {
    entries: Mutex<HashMap<String, LinkCacheEntry>>,
    ttl: Duration,
}

impl LinkCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn get(&self, url: &str) -> Option<LinkCacheEntry> {
        let g = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        g.get(url).cloned()
    }

    /// Stored verdict if younger than the TTL at `now`.
    pub fn get_fresh(&self, url: &str, now: DateTime<Utc>) -> Option<bool> {
        let g = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        g.get(url)
            .filter(|e| now - e.checked_at < self.ttl)
            .map(|e| e.is_valid)
    }

    pub fn is_fresh(&self, url: &str, now: DateTime<Utc>) -> bool {
        self.get_fresh(url, now).is_some()
    }

    pub fn set(&self, url: &str, entry: LinkCacheEntry) {
        let mut g = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        g.insert(url.to_string(), entry);
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot sorted by URL.
    pub fn stats(&self) -> LinkCacheStats {
        let g = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        let mut entries: Vec<LinkCacheStatsEntry> = g
            .iter()
            .map(|(url, e)| LinkCacheStatsEntry {
                url: url.clone(),
                is_valid: e.is_valid,
                cached_at: e.checked_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                status: e.status,
            })
            .collect();
        entries.sort_by(|a, b| a.url.cmp(&b.url));
        LinkCacheStats {
            size: entries.len(),
            entries,
        }
    }
}

/// Per-url outcome of a batch verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCheck {
    pub url: String,
    pub is_valid: bool,
}

fn is_valid_status(status: u16) -> bool {
    (200..400).contains(&status)
}

/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct LinkVerifier {
    cache: Arc<LinkCache>,
    probe: Arc<dyn LinkProbe>,
    clock: Arc<dyn Clock>,
}

impl LinkVerifier {
    pub fn new(cache: Arc<LinkCache>, probe: Arc<dyn LinkProbe>, clock: Arc<dyn Clock>) -> Self {
        Self {
            cache,
            probe,
            clock,
        }
    }

    pub fn cache(&self) -> &LinkCache {
        &self.cache
    }

    /// Whether `url` answers with a 2xx/3xx. Never fails; every outcome is
    /// cached, overwriting any stale entry.
    pub async fn verify(&self, url: &str) -> bool {
        if let Some(valid) = self.cache.get_fresh(url, self.clock.now()) {
            counter!("link_cache_hits_total").increment(1);
            return valid;
        }
        counter!("link_checks_total").increment(1);

        let id = anon_id(url);
        let (is_valid, status, error) = match self.probe.probe(url, ProbeShape::Head).await {
            Ok(status) => (is_valid_status(status), status, None),
            Err(first) => {
                tracing::debug!(%id, error = %first, "HEAD check failed, retrying with ranged GET");
                match self.probe.probe(url, ProbeShape::RangedGet).await {
                    Ok(status) => (is_valid_status(status), status, None),
                    Err(second) => (false, 0, Some(second.to_string())),
                }
            }
        };

        if !is_valid {
            counter!("link_invalid_total").increment(1);
        }
        tracing::debug!(%id, is_valid, status, "link checked");

        self.cache.set(
            url,
            LinkCacheEntry {
                is_valid,
                checked_at: self.clock.now(),
                status,
                error,
            },
        );
        is_valid
    }

    /// Concurrent verification, one result per input in input order. A
    /// check that dies (panic, cancelled task) reports `is_valid: false`.
    pub async fn verify_many(&self, urls: &[String]) -> Vec<LinkCheck> {
        let handles: Vec<_> = urls
            .iter()
            .map(|url| {
                let me = self.clone();
                let url = url.clone();
                tokio::spawn(async move { me.verify(&url).await })
            })
            .collect();

        let mut out = Vec::with_capacity(urls.len());
        for (url, handle) in urls.iter().zip(handles) {
            let is_valid = match handle.await {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(id = %anon_id(url), error = %e, "link check task failed");
                    false
                }
            };
            out.push(LinkCheck {
                url: url.clone(),
                is_valid,
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anon_id_is_short_and_stable() {
        let a = anon_id("https://example.com/a");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_id("https://example.com/a"));
        assert_ne!(a, anon_id("https://example.com/b"));
    }

    #[test]
    fn validity_window_is_2xx_and_3xx() {
        assert!(is_valid_status(200));
        assert!(is_valid_status(206));
        assert!(is_valid_status(399));
        assert!(!is_valid_status(404));
        assert!(!is_valid_status(199));
    }
}

// src/ingest/providers/api.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{ProviderKind, USER_AGENT};
use crate::clock::Clock;
use crate::error::ProviderError;
use crate::ingest::normalize::{is_acceptable, normalize, RawFields};
use crate::ingest::types::{Article, SourceProvider};
use crate::pacer::Pacer;

/// GET-a-JSON-document seam between providers and the network.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn get_json(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, ProviderError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JsonTransport for ReqwestTransport {
    async fn get_json(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, ProviderError> {
        let resp = self
            .client
            .get(url)
            .query(params)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status.as_u16()));
        }
        resp.json::<Value>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

type Responder =
    dyn Fn(&str, &[(&'static str, String)]) -> Result<Value, ProviderError> + Send + Sync;

/// In-process transport answering from a closure; records every call.
pub struct FnTransport {
    respond: Box<Responder>,
    calls: Mutex<Vec<(String, Vec<(&'static str, String)>)>>,
}

impl FnTransport {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str, &[(&'static str, String)]) -> Result<Value, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<(&'static str, String)>)> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait]
impl JsonTransport for FnTransport {
    async fn get_json(
        &self,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<Value, ProviderError> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((url.to_string(), params.to_vec()));
        (self.respond)(url, params)
    }
}

/// A configured (keyed) news API. Endpoints run one after another with a
/// fixed pause in between.
pub struct ApiProvider {
    kind: ProviderKind,
    api_key: String,
    transport: Arc<dyn JsonTransport>,
    pacer: Arc<dyn Pacer>,
    endpoint_delay: Duration,
    clock: Arc<dyn Clock>,
}

impl ApiProvider {
    pub fn new(
        kind: ProviderKind,
        api_key: impl Into<String>,
        transport: Arc<dyn JsonTransport>,
        pacer: Arc<dyn Pacer>,
        endpoint_delay: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            transport,
            pacer,
            endpoint_delay,
            clock,
        }
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Filter + normalize every record of one response body.
    pub fn parse_records(kind: ProviderKind, body: &Value, now: DateTime<Utc>) -> Vec<Article> {
        kind.parse_response(body)
            .iter()
            .filter(|raw| is_acceptable(raw))
            .enumerate()
            .map(|(idx, raw)| {
                normalize(
                    RawFields::extract(raw, kind.field_map()),
                    kind.name(),
                    idx,
                    now,
                )
            })
            .filter(|a| !a.title.is_empty() && !a.url.is_empty())
            .collect()
    }
}

#[async_trait]
impl SourceProvider for ApiProvider {
    async fn fetch_latest(&self) -> Result<Vec<Article>, ProviderError> {
        let name = self.kind.name();
        let endpoints = self.kind.endpoints(&self.api_key, self.clock.now());
        let mut out = Vec::new();

        for (i, ep) in endpoints.iter().enumerate() {
            if i > 0 {
                self.pacer.pause(self.endpoint_delay).await;
            }
            let t0 = std::time::Instant::now();
            match self.transport.get_json(ep.url, &ep.params).await {
                Ok(body) => {
                    let mut articles = Self::parse_records(self.kind, &body, self.clock.now());
                    histogram!("briefing_fetch_ms", "provider" => name)
                        .record(t0.elapsed().as_secs_f64() * 1_000.0);
                    tracing::debug!(
                        provider = name,
                        endpoint = ep.name,
                        count = articles.len(),
                        "endpoint fetched"
                    );
                    out.append(&mut articles);
                }
                Err(e) => {
                    tracing::warn!(error = %e, provider = name, endpoint = ep.name, "endpoint failed");
                    counter!("briefing_provider_errors_total", "provider" => name).increment(1);
                }
            }
        }

        counter!("briefing_articles_fetched_total", "provider" => name)
            .increment(out.len() as u64);
        tracing::info!(provider = name, total = out.len(), "provider fetch finished");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        self.kind.name()
    }
}

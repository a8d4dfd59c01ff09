//! Generative backend abstraction + the Gemini REST provider.
//!
//! Kept separate from `ContentEnrichment` so the same prompt/parse/default
//! logic runs against the real API in production and a mock in tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use crate::config::AiConfig;
use crate::error::EnrichError;

/// Sampling settings for one call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

impl GenerationOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self {
            temperature,
            ..Self::default()
        }
    }
}

pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<String, EnrichError>> + Send + 'a>>;

/// Low-level text generator: prompt in, raw reply text out.
pub trait GenerativeBackend: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str, options: GenerationOptions) -> GenerateFuture<'a>;
    /// Provider name for diagnostics.
    fn name(&self) -> &'static str;
}

pub type DynBackend = Arc<dyn GenerativeBackend>;

/// Builds the Gemini backend when a credential is configured.
pub fn build_backend(cfg: &AiConfig) -> Option<DynBackend> {
    let key = cfg.api_key.as_deref()?;
    match GeminiBackend::new(key, cfg) {
        Ok(b) => Some(Arc::new(b)),
        Err(e) => {
            tracing::warn!(error = %e, "could not build Gemini client, enrichment disabled");
            None
        }
    }
}

const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];
const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

impl<'a> GenerateRequest<'a> {
    fn new(prompt: &'a str, o: GenerationOptions) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: o.temperature,
                top_k: o.top_k,
                top_p: o.top_p,
                max_output_tokens: o.max_output_tokens,
            },
            safety_settings: SAFETY_CATEGORIES
                .iter()
                .map(|c| SafetySetting {
                    category: *c,
                    threshold: SAFETY_THRESHOLD,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Gemini `generateContent` over REST. The key goes in the query string.
pub struct GeminiBackend {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl GeminiBackend {
    pub fn new(api_key: &str, cfg: &AiConfig) -> Result<Self, EnrichError> {
        let http = reqwest::Client::builder()
            .user_agent("bizai-briefing/0.1")
            .timeout(cfg.timeout)
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
            endpoint: cfg.endpoint(),
        })
    }

    async fn generate_impl(
        &self,
        prompt: &str,
        options: GenerationOptions,
    ) -> Result<String, EnrichError> {
        let resp = self
            .http
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&GenerateRequest::new(prompt, options))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("error").to_string());
            return Err(EnrichError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = resp.json().await?;
        body.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or(EnrichError::EmptyResponse)
    }
}

impl GenerativeBackend for GeminiBackend {
    fn generate<'a>(&'a self, prompt: &'a str, options: GenerationOptions) -> GenerateFuture<'a> {
        Box::pin(self.generate_impl(prompt, options))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

type ReplyFn = dyn Fn(&str) -> Result<String, EnrichError> + Send + Sync;

/// Deterministic backend for tests and local runs; records every call.
pub struct MockBackend {
    reply: Box<ReplyFn>,
    calls: Mutex<Vec<(String, GenerationOptions)>>,
}

impl MockBackend {
    pub fn from_fn<F>(reply: F) -> Self
    where
        F: Fn(&str) -> Result<String, EnrichError> + Send + Sync + 'static,
    {
        Self {
            reply: Box::new(reply),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fixed(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::from_fn(move |_| Ok(text.clone()))
    }

    pub fn failing(err: EnrichError) -> Self {
        Self::from_fn(move |_| Err(err.clone()))
    }

    pub fn calls(&self) -> Vec<(String, GenerationOptions)> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

impl GenerativeBackend for MockBackend {
    fn generate<'a>(&'a self, prompt: &'a str, options: GenerationOptions) -> GenerateFuture<'a> {
        self.calls
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push((prompt.to_string(), options));
        let out = (self.reply)(prompt);
        Box::pin(async move { out })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_has_wire_field_names() {
        let req = GenerateRequest::new("hi", GenerationOptions::with_temperature(0.3));
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(v["generationConfig"]["topK"], 40);
        assert_eq!(v["generationConfig"]["maxOutputTokens"], 1024);
        assert_eq!(v["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(v["safetySettings"][0]["threshold"], SAFETY_THRESHOLD);
    }

    #[test]
    fn no_key_no_backend() {
        let cfg = AiConfig::new(None, &crate::config::BriefingConfig::default());
        assert!(build_backend(&cfg).is_none());
    }
}

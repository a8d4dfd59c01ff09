//! Content enrichment: article validation, replacement content for dead
//! links, summary enhancement and quiz generation through a generative
//! backend.
//!
//! Each operation comes in two forms:
//! - `try_*` returns `Result<_, EnrichError>` and is what the orchestrator uses,
//!   so failure policy stays at the call site;
//! - the plain form never fails and substitutes the documented safe default
//!   (used by the HTTP passthroughs).
//!
//! With no backend configured every `try_*` returns `EnrichError::NotConfigured`.

pub mod backend;
pub mod prompts;

use metrics::counter;
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::AiConfig;
use crate::enrich::backend::{build_backend, DynBackend, GenerationOptions};
use crate::error::EnrichError;
use crate::ingest::types::{AlternativeSource, Article, ValidationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentQuality {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Approve,
    Review,
    Reject,
}

/// Model replies capitalize freely ("High", "APPROVE"); labels match in any case.
fn label_from<'de, D, T>(deserializer: D, table: &[(&'static str, T)]) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Copy,
{
    let raw = String::deserialize(deserializer)?;
    let wanted = raw.trim().to_ascii_lowercase();
    table
        .iter()
        .find(|(name, _)| *name == wanted)
        .map(|(_, v)| *v)
        .ok_or_else(|| {
            let names: Vec<&'static str> = table.iter().map(|(n, _)| *n).collect();
            de::Error::custom(format!("unknown label `{raw}`, expected one of {names:?}"))
        })
}

impl<'de> Deserialize<'de> for ContentQuality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        label_from(
            deserializer,
            &[
                ("high", ContentQuality::High),
                ("medium", ContentQuality::Medium),
                ("low", ContentQuality::Low),
            ],
        )
    }
}

impl<'de> Deserialize<'de> for Recommendation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        label_from(
            deserializer,
            &[
                ("approve", Recommendation::Approve),
                ("review", Recommendation::Review),
                ("reject", Recommendation::Reject),
            ],
        )
    }
}

impl From<Recommendation> for ValidationStatus {
    fn from(r: Recommendation) -> Self {
        match r {
            Recommendation::Approve => ValidationStatus::Approve,
            Recommendation::Review => ValidationStatus::Review,
            Recommendation::Reject => ValidationStatus::Reject,
        }
    }
}

/// Accepts `8`, `8.5` or `"8.5"`.
fn score_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Score {
        Number(f64),
        Text(String),
    }
    match Score::deserialize(deserializer)? {
        Score::Number(n) => Ok(n),
        Score::Text(t) => t
            .trim()
            .parse::<f64>()
            .map_err(|_| de::Error::custom(format!("credibility score `{t}` is not a number"))),
    }
}

fn yes() -> bool {
    true
}

fn medium() -> ContentQuality {
    ContentQuality::Medium
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleValidation {
    #[serde(default = "yes")]
    pub is_legitimate: bool,
    /// 0–10 after clamping.
    #[serde(deserialize_with = "score_from_number_or_string")]
    pub credibility_score: f64,
    #[serde(default = "yes")]
    pub source_credible: bool,
    #[serde(default = "medium")]
    pub content_quality: ContentQuality,
    #[serde(default)]
    pub concerns: Vec<String>,
    pub recommendation: Recommendation,
}

impl ArticleValidation {
    /// Optimistic verdict used when the backend cannot answer.
    pub fn unavailable() -> Self {
        Self {
            is_legitimate: true,
            credibility_score: 7.0,
            source_credible: true,
            content_quality: ContentQuality::Medium,
            concerns: vec!["Validation service unavailable".to_string()],
            recommendation: Recommendation::Review,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeContent {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub alternative_sources: Vec<AlternativeSource>,
    /// 0–1 after clamping.
    pub confidence: f64,
    #[serde(default)]
    pub disclaimer: String,
}

impl AlternativeContent {
    /// Deterministic stand-in built from the original article.
    pub fn templated(original: &Article) -> Self {
        let src = |name: &str, url: &str, reason: &str| AlternativeSource {
            name: name.to_string(),
            url: url.to_string(),
            reason: reason.to_string(),
        };
        Self {
            title: format!("{} (Content Unavailable)", original.title),
            summary: format!(
                "Original article from {} is currently unavailable. This appears to be about {}. Please check back later or visit the source directly.",
                original.source_name,
                original.title.to_lowercase()
            ),
            alternative_sources: vec![
                src(
                    "Reuters Business",
                    "https://www.reuters.com/business/",
                    "Comprehensive business coverage",
                ),
                src(
                    "Bloomberg",
                    "https://www.bloomberg.com/",
                    "Financial and market news",
                ),
                src(
                    "Financial Times",
                    "https://www.ft.com/",
                    "Global business news",
                ),
            ],
            confidence: 0.3,
            disclaimer: "This content was generated due to source unavailability".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
    pub source_article: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiQuiz {
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

/// Pull a JSON document out of a model reply: tolerates Markdown code
/// fences and prose around the object.
pub fn parse_json_reply<T: DeserializeOwned>(text: &str) -> Result<T, EnrichError> {
    let trimmed = text.trim();
    if let Ok(v) = serde_json::from_str(trimmed) {
        return Ok(v);
    }
    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    match (start, end) {
        (Some(s), Some(e)) if s < e => Ok(serde_json::from_str(&trimmed[s..=e])?),
        _ => Err(EnrichError::Parse("no JSON object in reply".to_string())),
    }
}

pub struct ContentEnrichment {
    backend: Option<DynBackend>,
}

impl ContentEnrichment {
    pub fn new(backend: Option<DynBackend>) -> Self {
        Self { backend }
    }

    pub fn disabled() -> Self {
        Self { backend: None }
    }

    pub fn from_config(cfg: &AiConfig) -> Self {
        Self::new(build_backend(cfg))
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn provider_name(&self) -> &'static str {
        self.backend.as_ref().map_or("disabled", |b| b.name())
    }

    async fn generate(&self, op: &'static str, prompt: &str, temperature: f32) -> Result<String, EnrichError> {
        let backend = self.backend.as_ref().ok_or(EnrichError::NotConfigured)?;
        counter!("enrich_calls_total", "op" => op).increment(1);
        let out = backend
            .generate(prompt, GenerationOptions::with_temperature(temperature))
            .await;
        if let Err(e) = &out {
            counter!("enrich_failures_total", "op" => op).increment(1);
            tracing::warn!(error = %e, op, provider = backend.name(), "AI call failed");
        }
        out
    }

    pub async fn try_validate(&self, article: &Article) -> Result<ArticleValidation, EnrichError> {
        let reply = self
            .generate("validate", &prompts::validate_prompt(article), 0.3)
            .await?;
        let mut v: ArticleValidation = parse_json_reply(&reply)?;
        v.credibility_score = v.credibility_score.clamp(0.0, 10.0);
        Ok(v)
    }

    pub async fn validate(&self, article: &Article) -> ArticleValidation {
        self.try_validate(article)
            .await
            .unwrap_or_else(|_| ArticleValidation::unavailable())
    }

    pub async fn try_generate_alternative(
        &self,
        article: &Article,
        reason: &str,
    ) -> Result<AlternativeContent, EnrichError> {
        let reply = self
            .generate(
                "alternative",
                &prompts::alternative_prompt(article, reason),
                0.5,
            )
            .await?;
        let mut alt: AlternativeContent = parse_json_reply(&reply)?;
        if alt.title.trim().is_empty() || alt.summary.trim().is_empty() {
            return Err(EnrichError::Parse(
                "alternative content missing title or summary".to_string(),
            ));
        }
        alt.confidence = alt.confidence.clamp(0.0, 1.0);
        Ok(alt)
    }

    pub async fn generate_alternative(&self, article: &Article, reason: &str) -> AlternativeContent {
        self.try_generate_alternative(article, reason)
            .await
            .unwrap_or_else(|_| AlternativeContent::templated(article))
    }

    /// Enhanced summary text; an empty reply counts as failure.
    pub async fn try_enhance_summary(&self, article: &Article) -> Result<String, EnrichError> {
        let reply = self
            .generate("enhance", &prompts::enhance_prompt(article), 0.4)
            .await?;
        let text = reply.trim();
        if text.is_empty() {
            return Err(EnrichError::EmptyResponse);
        }
        Ok(text.to_string())
    }

    pub async fn enhance_summary(&self, article: &Article) -> String {
        self.try_enhance_summary(article)
            .await
            .unwrap_or_else(|_| article.summary.clone())
    }

    pub async fn try_generate_quiz(&self, articles: &[Article]) -> Result<AiQuiz, EnrichError> {
        let reply = self
            .generate("quiz", &prompts::quiz_prompt(articles), 0.6)
            .await?;
        parse_json_reply(&reply)
    }

    pub async fn generate_quiz(&self, articles: &[Article]) -> AiQuiz {
        self.try_generate_quiz(articles).await.unwrap_or_default()
    }
}

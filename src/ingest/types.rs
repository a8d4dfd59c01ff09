// src/ingest/types.rs
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// Where an article stands after verification / AI validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Verified,
    Failed,
    Approve,
    Review,
    Reject,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AlternativeSource {
    pub name: String,
    pub url: String,
    pub reason: String,
}

/// Canonical article handed to clients.
///
/// Every field has a serde default so partially filled articles (e.g. the
/// body of an AI passthrough request) deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub source_name: String,
    pub summary: String,
    pub url: String,
    pub image_url: Option<String>,
    pub published_at: String,
    pub read_minutes: u32,
    /// Topic labels; never empty for aggregated articles.
    pub domains: Vec<String>,
    pub api_source: String,
    pub link_valid: Option<bool>,
    pub is_generated: bool,
    pub credibility_score: Option<f64>,
    pub validation_status: ValidationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disclaimer: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alternative_sources: Vec<AlternativeSource>,
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    /// All articles from every endpoint of this provider. Endpoint failures
    /// are absorbed; an `Err` means the provider as a whole could not run.
    async fn fetch_latest(&self) -> Result<Vec<Article>, ProviderError>;
    fn name(&self) -> &'static str;
}

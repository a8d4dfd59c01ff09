// src/config/ai.rs
use std::time::Duration;

use super::briefing::BriefingConfig;

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Generative-AI settings. Enrichment is enabled iff `api_key` is present.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub api_base: String,
}

impl AiConfig {
    pub fn new(api_key: Option<String>, tunables: &BriefingConfig) -> Self {
        Self {
            api_key,
            model: tunables.gemini_model.clone(),
            timeout: Duration::from_secs(tunables.ai_timeout_secs),
            api_base: GEMINI_API_BASE.to_string(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.api_key.is_some()
    }

    /// `generateContent` URL for the configured model (key passed separately).
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_uses_model_and_trims_base() {
        let mut cfg = AiConfig::new(None, &BriefingConfig::default());
        cfg.api_base = "http://localhost:9/v1beta/models/".into();
        assert_eq!(
            cfg.endpoint(),
            "http://localhost:9/v1beta/models/gemini-pro:generateContent"
        );
        assert!(!cfg.enabled());
    }
}

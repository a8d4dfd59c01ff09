// src/config/mod.rs
//! Service configuration: credentials from the environment, tunables from TOML.

pub mod ai;
pub mod briefing;

pub use ai::AiConfig;
pub use briefing::BriefingConfig;

use anyhow::Result;

use crate::snapshot::EcoConfig;

pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_KEY";
pub const ENV_GNEWS_API_KEY: &str = "GNEWS_API_KEY";
pub const ENV_NEWSDATA_API_KEY: &str = "NEWSDATA_API_KEY";
pub const ENV_THENEWSAPI_KEY: &str = "THENEWSAPI_KEY";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_YOUTUBE_API_KEY: &str = "YOUTUBE_API_KEY";

/// Optional credentials. Absence of a key disables the matching integration.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    pub newsapi: Option<String>,
    pub gnews: Option<String>,
    pub newsdata: Option<String>,
    pub thenewsapi: Option<String>,
    pub gemini: Option<String>,
    pub youtube: Option<String>,
}

impl ApiKeys {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup; blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            newsapi: get(ENV_NEWSAPI_KEY),
            gnews: get(ENV_GNEWS_API_KEY),
            newsdata: get(ENV_NEWSDATA_API_KEY),
            thenewsapi: get(ENV_THENEWSAPI_KEY),
            gemini: get(ENV_GEMINI_API_KEY),
            youtube: get(ENV_YOUTUBE_API_KEY),
        }
    }

    pub fn configured_count(&self) -> usize {
        [
            &self.newsapi,
            &self.gnews,
            &self.newsdata,
            &self.thenewsapi,
            &self.youtube,
        ]
        .iter()
        .filter(|k| k.is_some())
        .count()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub keys: ApiKeys,
    pub briefing: BriefingConfig,
    pub ai: AiConfig,
    pub eco: EcoConfig,
}

impl AppConfig {
    pub fn new(keys: ApiKeys, briefing: BriefingConfig) -> Self {
        let ai = AiConfig::new(keys.gemini.clone(), &briefing);
        Self {
            keys,
            briefing,
            ai,
            eco: EcoConfig::default(),
        }
    }

    /// Reads env credentials and the tunables file.
    pub fn load() -> Result<Self> {
        let briefing = BriefingConfig::load_default()?;
        Ok(Self {
            eco: EcoConfig::from_env(),
            ..Self::new(ApiKeys::from_env(), briefing)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_are_absent() {
        let keys = ApiKeys::from_lookup(|k| match k {
            ENV_NEWSAPI_KEY => Some("  abc ".into()),
            ENV_GNEWS_API_KEY => Some("   ".into()),
            _ => None,
        });
        assert_eq!(keys.newsapi.as_deref(), Some("abc"));
        assert!(keys.gnews.is_none());
        assert_eq!(keys.configured_count(), 1);
    }
}

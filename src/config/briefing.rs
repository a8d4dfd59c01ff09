// src/config/briefing.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_BRIEFING_CONFIG_PATH: &str = "config/briefing.toml";
pub const ENV_BRIEFING_CONFIG_PATH: &str = "BRIEFING_CONFIG_PATH";

/// Upper bound for cache TTLs (one year).
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Pipeline tunables. Every field is optional in the TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BriefingConfig {
    pub cache_ttl_secs: u64,
    pub link_cache_ttl_secs: u64,
    pub max_articles: usize,
    pub endpoint_delay_ms: u64,
    pub batch_size: usize,
    pub batch_pause_ms: u64,
    pub provider_timeout_secs: u64,
    pub ai_timeout_secs: u64,
    pub gemini_model: String,
}

impl Default for BriefingConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 30 * 60,
            link_cache_ttl_secs: 30 * 60,
            max_articles: 30,
            endpoint_delay_ms: 500,
            batch_size: 5,
            batch_pause_ms: 1_000,
            provider_timeout_secs: 10,
            ai_timeout_secs: 30,
            gemini_model: "gemini-pro".to_string(),
        }
    }
}

impl BriefingConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: BriefingConfig = toml::from_str(s).context("parsing briefing config")?;
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading briefing config from {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load using env var + fallback:
    /// 1) $BRIEFING_CONFIG_PATH (must exist)
    /// 2) config/briefing.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_BRIEFING_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("BRIEFING_CONFIG_PATH points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_BRIEFING_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::default())
    }

    fn sanitize(&mut self) {
        let d = Self::default();
        if self.max_articles == 0 {
            self.max_articles = d.max_articles;
        }
        if self.batch_size == 0 {
            self.batch_size = d.batch_size;
        }
        if self.provider_timeout_secs == 0 {
            self.provider_timeout_secs = d.provider_timeout_secs;
        }
        if self.ai_timeout_secs == 0 {
            self.ai_timeout_secs = d.ai_timeout_secs;
        }
        if self.gemini_model.trim().is_empty() {
            self.gemini_model = d.gemini_model;
        }
        self.cache_ttl_secs = self.cache_ttl_secs.min(MAX_TTL_SECS);
        self.link_cache_ttl_secs = self.link_cache_ttl_secs.min(MAX_TTL_SECS);
    }

    pub fn cache_ttl(&self) -> chrono::Duration {
        ttl_from_secs(self.cache_ttl_secs)
    }

    pub fn link_cache_ttl(&self) -> chrono::Duration {
        ttl_from_secs(self.link_cache_ttl_secs)
    }

    pub fn endpoint_delay(&self) -> Duration {
        Duration::from_millis(self.endpoint_delay_ms)
    }

    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

fn ttl_from_secs(secs: u64) -> chrono::Duration {
    // Fits in i64 after the cap.
    chrono::Duration::seconds(secs.min(MAX_TTL_SECS) as i64)
}

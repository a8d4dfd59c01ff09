// src/snapshot.rs
//! Static market indices and the "Go Green" paper-savings estimate.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

pub const ENV_ECO_PAPERS_BASE: &str = "ECO_PAPERS_BASE";
pub const ENV_ECO_CO2_PER_PAPER: &str = "ECO_CO2_PER_PAPER";
pub const DEFAULT_PAPERS_BASE: u64 = 12_847;
pub const DEFAULT_CO2_PER_PAPER_GRAMS: f64 = 200.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndex {
    pub name: &'static str,
    pub value: String,
    pub change_percent: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSnapshot {
    pub indices: Vec<MarketIndex>,
    pub last_updated: String,
}

const INDICES: [(&str, f64, &str); 4] = [
    ("S&P 500", 4783.45, "+0.45"),
    ("NASDAQ", 15055.65, "+0.75"),
    ("DJIA", 37695.73, "-0.08"),
    ("FTSE 100", 7694.19, "+0.12"),
];

pub fn market_snapshot(now: DateTime<Utc>) -> MarketSnapshot {
    MarketSnapshot {
        indices: INDICES
            .iter()
            .map(|&(name, value, change)| MarketIndex {
                name,
                value: format!("{value:.2}"),
                change_percent: change,
            })
            .collect(),
        last_updated: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcoConfig {
    pub papers_base: u64,
    pub co2_per_paper_grams: f64,
}

impl Default for EcoConfig {
    fn default() -> Self {
        Self {
            papers_base: DEFAULT_PAPERS_BASE,
            co2_per_paper_grams: DEFAULT_CO2_PER_PAPER_GRAMS,
        }
    }
}

impl EcoConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Unparseable or negative values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Self {
            papers_base: lookup(ENV_ECO_PAPERS_BASE)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(d.papers_base),
            co2_per_paper_grams: lookup(ENV_ECO_CO2_PER_PAPER)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v >= 0.0)
                .unwrap_or(d.co2_per_paper_grams),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcoSource {
    pub label: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EcoAssumptions {
    pub co2_per_paper_grams: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EcoMetrics {
    pub papers_saved: u64,
    pub co2_saved_grams: u64,
    pub co2_saved_kg: f64,
    pub co2_saved_formatted: String,
    pub assumptions: EcoAssumptions,
    pub sources: Vec<EcoSource>,
}

const ECO_SOURCES: [EcoSource; 3] = [
    EcoSource {
        label: "Holmen Paper – Magazine climate impact",
        url: "https://www.holmen.com/en/paper/sustainability/sustainability-stories/magazine-climate-impact/",
    },
    EcoSource {
        label: "Carbon footprint and environmental impacts of print products (LEADER project)",
        url: "https://cris.vtt.fi/en/publications/carbon-footprint-and-environmental-impacts-of-print-products-from",
    },
    EcoSource {
        label: "Comparative life cycle assessments: paper and digital media",
        url: "https://www.sciencedirect.com/science/article/abs/pii/S0195925513000942",
    },
];

pub fn eco_metrics(cfg: EcoConfig) -> EcoMetrics {
    let grams = (cfg.papers_base as f64 * cfg.co2_per_paper_grams).round() as u64;
    let kg = grams as f64 / 1000.0;
    EcoMetrics {
        papers_saved: cfg.papers_base,
        co2_saved_grams: grams,
        co2_saved_kg: kg,
        co2_saved_formatted: format!("{kg:.1} kg"),
        assumptions: EcoAssumptions {
            co2_per_paper_grams: cfg.co2_per_paper_grams,
        },
        sources: ECO_SOURCES.to_vec(),
    }
}

// src/ingest/normalize.rs
//! Raw provider record → canonical `Article`.
//!
//! Field extraction is driven by a per-provider [`FieldMap`] of JSON pointers;
//! everything after extraction (title cleanup, summary cap, read time, domain
//! labels) is shared.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::ingest::types::{Article, ValidationStatus};

pub const SUMMARY_MAX_CHARS: usize = 300;
pub const REMOVED_MARKER: &str = "[Removed]";

/// Label used when no keyword group matches.
pub const GENERAL_DOMAIN: &str = "general";

/// JSON pointers into one provider's record shape.
#[derive(Debug)]
pub struct FieldMap {
    pub title: &'static str,
    pub source: &'static str,
    pub source_default: &'static str,
    /// First non-empty wins.
    pub summary: &'static [&'static str],
    pub url: &'static [&'static str],
    pub image: &'static str,
    pub published: &'static str,
}

/// Values pulled out of a raw record, before cleanup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFields {
    pub title: Option<String>,
    pub source_name: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<String>,
}

fn str_at(raw: &Value, pointer: &str) -> Option<String> {
    raw.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_str(raw: &Value, pointers: &[&str]) -> Option<String> {
    pointers.iter().find_map(|p| str_at(raw, p))
}

impl RawFields {
    pub fn extract(raw: &Value, map: &FieldMap) -> Self {
        Self {
            title: str_at(raw, map.title),
            source_name: str_at(raw, map.source).or_else(|| Some(map.source_default.to_string())),
            summary: first_str(raw, map.summary),
            url: first_str(raw, map.url),
            image_url: str_at(raw, map.image),
            published_at: str_at(raw, map.published),
        }
    }
}

/// Pre-normalization filter: needs a title without the removal marker and
/// at least one of `url` / `link`.
pub fn is_acceptable(raw: &Value) -> bool {
    let Some(title) = str_at(raw, "/title") else {
        return false;
    };
    if title.contains(REMOVED_MARKER) {
        return false;
    }
    str_at(raw, "/url").is_some() || str_at(raw, "/link").is_some()
}

/// Decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    static RE_TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?is)</?[^>]+>").expect("tag regex"));
    static RE_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

    let decoded = html_escape::decode_html_entities(s);
    let no_tags = RE_TAGS.replace_all(&decoded, "");
    RE_WS.replace_all(&no_tags, " ").trim().to_string()
}

/// Drop a trailing bracketed tag such as `[Removed]` or `[+1200 chars]`.
pub fn clean_title(raw: &str) -> String {
    static RE_TRAILING_TAG: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\s*\[.*?\]\s*$").expect("trailing tag regex"));
    let text = normalize_text(raw);
    RE_TRAILING_TAG.replace(&text, "").trim().to_string()
}

/// First `SUMMARY_MAX_CHARS` characters, trimmed.
pub fn cap_summary(raw: &str) -> String {
    let text = normalize_text(raw);
    let capped: String = text.chars().take(SUMMARY_MAX_CHARS).collect();
    capped.trim().to_string()
}

pub fn read_minutes(summary: &str) -> u32 {
    let minutes = (summary.chars().count() as f64 / 900.0).round() as u32;
    minutes.max(2)
}

static DOMAIN_GROUPS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    [
        (
            "geopolitics",
            r"\b(war|sanction|diplomacy|election|border|conflict|geopolitic)",
        ),
        (
            "trade",
            r"\b(trade|tariff|export|import|supply chain|logistics)\b",
        ),
        (
            "sports",
            r"\b(sport|league|tournament|match|world cup|olympic)",
        ),
        (
            "economics",
            r"\b(gdp|inflation|recession|macro|economy|economic)\b",
        ),
        (
            "share market",
            r"\b(index|s&p|nasdaq|dow|ftse|nifty|sensex|stock market|equity|shares?)\b",
        ),
        (
            "finance",
            r"\b(bank|interest rate|loan|funding|capital|investment|investor|finance)\b",
        ),
        (
            "marketing",
            r"\b(marketing|brand|campaign|advertis(ing|ement)|customer|consumer)\b",
        ),
        (
            "technology",
            r"\b(ai |artificial intelligence|machine learning|cloud|software|startup|tech\b)",
        ),
    ]
    .into_iter()
    .map(|(label, pat)| (label, Regex::new(pat).expect("domain regex")))
    .collect()
});

/// Topic labels for an article, in fixed group order. Never empty.
pub fn classify_domains(title: &str, summary: &str, source_name: &str) -> Vec<String> {
    let text = format!("{title} {summary} {source_name}").to_lowercase();
    let mut out: Vec<String> = DOMAIN_GROUPS
        .iter()
        .filter(|(_, re)| re.is_match(&text))
        .map(|(label, _)| label.to_string())
        .collect();
    if out.is_empty() {
        out.push(GENERAL_DOMAIN.to_string());
    }
    out
}

/// Lenient date parse used for ordering. Accepts RFC 3339, RFC 2822 and
/// `YYYY-MM-DD HH:MM:SS` (taken as UTC).
pub fn parse_published(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|n| n.and_utc())
}

pub fn normalize(fields: RawFields, provider: &str, idx: usize, now: DateTime<Utc>) -> Article {
    let title = clean_title(fields.title.as_deref().unwrap_or_default());
    let summary = cap_summary(fields.summary.as_deref().unwrap_or_default());
    let source_name = fields
        .source_name
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());
    let url = fields.url.unwrap_or_default();
    let published_at = fields
        .published_at
        .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Millis, true));

    let id = if url.is_empty() {
        format!(
            "{}-{}-{}",
            provider.to_lowercase(),
            idx,
            now.timestamp_millis()
        )
    } else {
        url.clone()
    };

    Article {
        id,
        read_minutes: read_minutes(&summary),
        domains: classify_domains(&title, &summary, &source_name),
        title,
        source_name,
        summary,
        url,
        image_url: fields.image_url,
        published_at,
        api_source: provider.to_string(),
        link_valid: None,
        is_generated: false,
        credibility_score: None,
        validation_status: ValidationStatus::Pending,
        disclaimer: None,
        alternative_sources: Vec::new(),
    }
}

// src/ingest/providers/mod.rs
//! Provider registry: each news API is data (endpoints, key parameter, JSON
//! envelope, field map), not behavior. Adding a provider means adding a
//! variant and its table rows here.

pub mod api;

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

use crate::config::{
    ApiKeys, ENV_GNEWS_API_KEY, ENV_NEWSAPI_KEY, ENV_NEWSDATA_API_KEY, ENV_THENEWSAPI_KEY,
};
use crate::ingest::normalize::FieldMap;

pub const USER_AGENT: &str = "BizAI/1.0 (Educational Purpose)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    NewsApi,
    GNews,
    NewsData,
    TheNewsApi,
}

/// Registry order. Also the dedup priority: earlier providers win ties.
pub const ALL_PROVIDERS: [ProviderKind; 4] = [
    ProviderKind::NewsApi,
    ProviderKind::GNews,
    ProviderKind::NewsData,
    ProviderKind::TheNewsApi,
];

/// One request to issue against a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSpec {
    pub name: &'static str,
    pub url: &'static str,
    pub params: Vec<(&'static str, String)>,
}

static NEWSAPI_FIELDS: FieldMap = FieldMap {
    title: "/title",
    source: "/source/name",
    source_default: "Unknown",
    summary: &["/description", "/content"],
    url: &["/url"],
    image: "/urlToImage",
    published: "/publishedAt",
};

static GNEWS_FIELDS: FieldMap = FieldMap {
    title: "/title",
    source: "/source/name",
    source_default: "GNews",
    summary: &["/description"],
    url: &["/url"],
    image: "/image",
    published: "/publishedAt",
};

static NEWSDATA_FIELDS: FieldMap = FieldMap {
    title: "/title",
    source: "/source_id",
    source_default: "NewsData",
    summary: &["/description", "/content"],
    url: &["/link"],
    image: "/image_url",
    published: "/pubDate",
};

static THENEWSAPI_FIELDS: FieldMap = FieldMap {
    title: "/title",
    source: "/source",
    source_default: "TheNewsAPI",
    summary: &["/description", "/snippet"],
    url: &["/url"],
    image: "/image_url",
    published: "/published_at",
};

fn p(key: &'static str, value: impl Into<String>) -> (&'static str, String) {
    (key, value.into())
}

impl ProviderKind {
    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::NewsApi => "NewsAPI.org",
            ProviderKind::GNews => "GNews API",
            ProviderKind::NewsData => "NewsData.io",
            ProviderKind::TheNewsApi => "TheNewsAPI.com",
        }
    }

    pub fn key_env(self) -> &'static str {
        match self {
            ProviderKind::NewsApi => ENV_NEWSAPI_KEY,
            ProviderKind::GNews => ENV_GNEWS_API_KEY,
            ProviderKind::NewsData => ENV_NEWSDATA_API_KEY,
            ProviderKind::TheNewsApi => ENV_THENEWSAPI_KEY,
        }
    }

    pub fn api_key(self, keys: &ApiKeys) -> Option<&str> {
        match self {
            ProviderKind::NewsApi => keys.newsapi.as_deref(),
            ProviderKind::GNews => keys.gnews.as_deref(),
            ProviderKind::NewsData => keys.newsdata.as_deref(),
            ProviderKind::TheNewsApi => keys.thenewsapi.as_deref(),
        }
    }

    fn key_param(self) -> &'static str {
        match self {
            ProviderKind::NewsApi => "apiKey",
            ProviderKind::GNews | ProviderKind::NewsData => "apikey",
            ProviderKind::TheNewsApi => "api_token",
        }
    }

    /// Top-level field holding the record array.
    fn envelope(self) -> &'static str {
        match self {
            ProviderKind::NewsApi | ProviderKind::GNews => "articles",
            ProviderKind::NewsData => "results",
            ProviderKind::TheNewsApi => "data",
        }
    }

    pub fn field_map(self) -> &'static FieldMap {
        match self {
            ProviderKind::NewsApi => &NEWSAPI_FIELDS,
            ProviderKind::GNews => &GNEWS_FIELDS,
            ProviderKind::NewsData => &NEWSDATA_FIELDS,
            ProviderKind::TheNewsApi => &THENEWSAPI_FIELDS,
        }
    }

    /// Requests to issue, in order. `now` feeds date-relative parameters.
    pub fn endpoints(self, api_key: &str, now: DateTime<Utc>) -> Vec<EndpointSpec> {
        let mut eps = match self {
            ProviderKind::NewsApi => {
                let from = (now - Duration::hours(24)).format("%Y-%m-%d").to_string();
                vec![
                    EndpointSpec {
                        name: "Business Headlines",
                        url: "https://newsapi.org/v2/top-headlines",
                        params: vec![
                            p("category", "business"),
                            p("language", "en"),
                            p("pageSize", "15"),
                        ],
                    },
                    EndpointSpec {
                        name: "Everything Business",
                        url: "https://newsapi.org/v2/everything",
                        params: vec![
                            p("q", "business OR finance OR economy OR market"),
                            p("language", "en"),
                            p("sortBy", "publishedAt"),
                            p("pageSize", "10"),
                            p("from", from),
                        ],
                    },
                ]
            }
            ProviderKind::GNews => vec![
                EndpointSpec {
                    name: "Business News",
                    url: "https://gnews.io/api/v4/top-headlines",
                    params: vec![
                        p("category", "business"),
                        p("lang", "en"),
                        p("country", "us"),
                        p("max", "15"),
                    ],
                },
                EndpointSpec {
                    name: "Technology News",
                    url: "https://gnews.io/api/v4/top-headlines",
                    params: vec![
                        p("category", "technology"),
                        p("lang", "en"),
                        p("country", "us"),
                        p("max", "10"),
                    ],
                },
            ],
            ProviderKind::NewsData => vec![
                EndpointSpec {
                    name: "Business Headlines",
                    url: "https://newsdata.io/api/1/news",
                    params: vec![
                        p("category", "business"),
                        p("language", "en"),
                        p("country", "us"),
                        p("size", "15"),
                    ],
                },
                EndpointSpec {
                    name: "Technology Headlines",
                    url: "https://newsdata.io/api/1/news",
                    params: vec![
                        p("category", "technology"),
                        p("language", "en"),
                        p("country", "us"),
                        p("size", "10"),
                    ],
                },
            ],
            ProviderKind::TheNewsApi => vec![
                EndpointSpec {
                    name: "Business News",
                    url: "https://api.thenewsapi.com/v1/news/top",
                    params: vec![
                        p("categories", "business"),
                        p("language", "en"),
                        p("limit", "15"),
                    ],
                },
                EndpointSpec {
                    name: "Technology News",
                    url: "https://api.thenewsapi.com/v1/news/top",
                    params: vec![
                        p("categories", "tech"),
                        p("language", "en"),
                        p("limit", "10"),
                    ],
                },
            ],
        };
        for ep in &mut eps {
            ep.params.push(p(self.key_param(), api_key));
        }
        eps
    }

    /// Raw records from a response body. A missing or non-array envelope
    /// yields no records.
    pub fn parse_response(self, body: &Value) -> Vec<Value> {
        body.get(self.envelope())
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default()
    }
}

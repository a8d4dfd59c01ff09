use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer};

use crate::briefing::{article_stats, ArticleStats, BriefingService, LINK_BROKEN_REASON};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::enrich::{AlternativeContent, ArticleValidation};
use crate::error::ApiError;
use crate::ingest::types::Article;
use crate::quiz::{daily_quiz, QuizResponse};
use crate::snapshot::{eco_metrics, market_snapshot, EcoMetrics, MarketSnapshot};
use crate::verify::{LinkCacheStats, LinkCheck};

#[derive(Clone)]
pub struct AppState {
    pub briefing: Arc<BriefingService>,
    pub config: Arc<AppConfig>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    fn timestamp(&self) -> String {
        self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/news/daily-briefing", get(daily_briefing))
        .route("/api/quiz/daily", get(quiz_daily))
        .route("/api/market", get(market))
        .route("/api/eco", get(eco))
        .route("/api/verify/link", post(verify_link))
        .route("/api/verify/links", post(verify_links))
        .route("/api/verify/stats", get(verify_stats))
        .route("/api/verify/cache", delete(clear_link_cache))
        .route("/api/ai/validate-article", post(ai_validate))
        .route("/api/ai/enhance-summary", post(ai_enhance))
        .route("/api/ai/generate-alternative", post(ai_alternative))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// A handler panic becomes a 500 with a generic body.
fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let cause = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    ApiError::Internal(cause).into_response()
}

fn json_body(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    body.map(|Json(v)| v).map_err(|e| {
        tracing::debug!(error = %e, "rejected request body");
        ApiError::BadRequest("Malformed JSON body".to_string())
    })
}

/// Shared guard for the AI passthroughs: 503 before 400.
fn ai_article(state: &AppState, body: &Value) -> Result<Article, ApiError> {
    if !state.briefing.enrichment().is_configured() {
        return Err(ApiError::ServiceUnavailable(
            "Gemini AI service not configured".to_string(),
        ));
    }
    match body.get("article") {
        Some(v) if v.is_object() => serde_json::from_value(v.clone()).map_err(|e| {
            tracing::debug!(error = %e, "article payload rejected");
            ApiError::BadRequest("Article data is required".to_string())
        }),
        _ => Err(ApiError::BadRequest("Article data is required".to_string())),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewsApis {
    news_api_org: bool,
    g_news_api: bool,
    news_data_io: bool,
    the_news_api: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Services {
    gemini: bool,
    news_apis: NewsApis,
    youtube_api: bool,
    total_configured_apis: usize,
}

#[derive(Serialize)]
struct HealthOut {
    status: &'static str,
    services: Services,
    timestamp: String,
}

async fn health(State(state): State<AppState>) -> Json<HealthOut> {
    let keys = &state.config.keys;
    Json(HealthOut {
        status: "ok",
        services: Services {
            gemini: state.briefing.enrichment().is_configured(),
            news_apis: NewsApis {
                news_api_org: keys.newsapi.is_some(),
                g_news_api: keys.gnews.is_some(),
                news_data_io: keys.newsdata.is_some(),
                the_news_api: keys.thenewsapi.is_some(),
            },
            youtube_api: keys.youtube.is_some(),
            total_configured_apis: keys.configured_count(),
        },
        timestamp: state.timestamp(),
    })
}

#[derive(Deserialize)]
struct FlagQuery {
    enhanced: Option<String>,
    ai: Option<String>,
}

fn flag(v: &Option<String>) -> bool {
    v.as_deref() == Some("true")
}

#[derive(Serialize)]
struct BriefingOut {
    articles: Vec<Article>,
    stats: Option<ArticleStats>,
    enhanced: bool,
    timestamp: String,
}

async fn daily_briefing(
    State(state): State<AppState>,
    Query(q): Query<FlagQuery>,
) -> Json<BriefingOut> {
    let enhanced = flag(&q.enhanced);
    let articles = if enhanced {
        state.briefing.get_enhanced_briefing().await
    } else {
        state.briefing.get_briefing().await
    };
    let stats = enhanced.then(|| article_stats(&articles));
    Json(BriefingOut {
        articles,
        stats,
        enhanced,
        timestamp: state.timestamp(),
    })
}

async fn quiz_daily(State(state): State<AppState>, Query(q): Query<FlagQuery>) -> Response {
    let articles = state.briefing.get_briefing().await;
    let enrichment = state.briefing.enrichment();

    if flag(&q.ai) && enrichment.is_configured() {
        match enrichment.try_generate_quiz(&articles).await {
            Ok(quiz) if !quiz.questions.is_empty() => {
                return Json(QuizResponse {
                    quiz,
                    ai_generated: true,
                })
                .into_response();
            }
            Ok(_) => tracing::info!("AI quiz came back empty, using daily quiz"),
            Err(e) => tracing::warn!(error = %e, "AI quiz failed, using daily quiz"),
        }
    }

    let quiz = daily_quiz(&articles, &mut rand::rng());
    Json(QuizResponse {
        quiz,
        ai_generated: false,
    })
    .into_response()
}

async fn market(State(state): State<AppState>) -> Json<MarketSnapshot> {
    Json(market_snapshot(state.clock.now()))
}

async fn eco(State(state): State<AppState>) -> Json<EcoMetrics> {
    Json(eco_metrics(state.config.eco))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyLinkOut {
    url: String,
    is_valid: bool,
    timestamp: String,
}

async fn verify_link(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VerifyLinkOut>, ApiError> {
    let body = json_body(body)?;
    let url = body
        .get("url")
        .and_then(Value::as_str)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::BadRequest("URL is required".to_string()))?
        .to_string();

    let is_valid = state.briefing.verifier().verify(&url).await;
    Ok(Json(VerifyLinkOut {
        url,
        is_valid,
        timestamp: state.timestamp(),
    }))
}

#[derive(Serialize)]
struct VerifyLinksOut {
    results: Vec<LinkCheck>,
    timestamp: String,
}

async fn verify_links(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VerifyLinksOut>, ApiError> {
    let body = json_body(body)?;
    let missing = || ApiError::BadRequest("URLs array is required".to_string());
    let urls: Vec<String> = body
        .get("urls")
        .and_then(Value::as_array)
        .ok_or_else(missing)?
        .iter()
        .map(|v| v.as_str().map(str::to_string).ok_or_else(missing))
        .collect::<Result<_, _>>()?;

    let results = state.briefing.verifier().verify_many(&urls).await;
    Ok(Json(VerifyLinksOut {
        results,
        timestamp: state.timestamp(),
    }))
}

async fn verify_stats(State(state): State<AppState>) -> Json<LinkCacheStats> {
    Json(state.briefing.verifier().cache().stats())
}

#[derive(Serialize)]
struct MessageOut {
    message: &'static str,
    timestamp: String,
}

async fn clear_link_cache(State(state): State<AppState>) -> Json<MessageOut> {
    state.briefing.verifier().cache().clear();
    tracing::info!("link cache cleared");
    Json(MessageOut {
        message: "Link cache cleared",
        timestamp: state.timestamp(),
    })
}

#[derive(Serialize)]
struct ValidationOut {
    validation: ArticleValidation,
    timestamp: String,
}

async fn ai_validate(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ValidationOut>, ApiError> {
    let body = json_body(body)?;
    let article = ai_article(&state, &body)?;
    let validation = state.briefing.enrichment().validate(&article).await;
    Ok(Json(ValidationOut {
        validation,
        timestamp: state.timestamp(),
    }))
}

#[derive(Serialize)]
struct EnhanceOut {
    original: String,
    enhanced: String,
    timestamp: String,
}

async fn ai_enhance(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EnhanceOut>, ApiError> {
    let body = json_body(body)?;
    let article = ai_article(&state, &body)?;
    let enhanced = state.briefing.enrichment().enhance_summary(&article).await;
    Ok(Json(EnhanceOut {
        original: article.summary,
        enhanced,
        timestamp: state.timestamp(),
    }))
}

#[derive(Serialize)]
struct AlternativeOut {
    alternative: AlternativeContent,
    timestamp: String,
}

async fn ai_alternative(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AlternativeOut>, ApiError> {
    let body = json_body(body)?;
    let article = ai_article(&state, &body)?;
    let reason = body
        .get("reason")
        .and_then(Value::as_str)
        .unwrap_or(LINK_BROKEN_REASON);
    let alternative = state
        .briefing
        .enrichment()
        .generate_alternative(&article, reason)
        .await;
    Ok(Json(AlternativeOut {
        alternative,
        timestamp: state.timestamp(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{self, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt as _;

    #[tokio::test]
    async fn handler_panic_is_a_generic_500() {
        async fn boom() -> &'static str {
            panic!("briefing state poisoned")
        }
        let app: Router = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(panic_response));

        let resp = app
            .oneshot(Request::get("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = body::to_bytes(resp.into_body(), 1024).await.unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["error"], crate::error::INTERNAL_ERROR_MESSAGE);
        assert!(!bytes.windows(8).any(|w| w == b"poisoned"));
    }
}

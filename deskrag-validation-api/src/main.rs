//! Axum-based combiner/validator service: the confidence-based combination
//! rule and the heuristic quality rubric, both pure functions over the
//! request body.

use axum::{
    routing::{get, post},
    Json, Router,
};
use deskrag_shared::{clamp_confidence, now_rfc3339, ServiceConfig};
use deskrag_validation::{
    combine_answers, validate_answer, ScoredAnswer, COMBINED_BOOST, CONFIDENCE_THRESHOLD,
    CRITERION_DESCRIPTIONS, CRITERION_WEIGHTS, HIGH_QUALITY_THRESHOLD, VALIDATION_THRESHOLD,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[deskrag-validation-api] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::load().expect("load ServiceConfig");
    let app = router();

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.validation_port));
    tracing::info!("deskrag-validation-api listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(addr).await.unwrap(),
        app,
    )
    .await
    .unwrap();
}

fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/validate_answer", post(validate))
        .route("/combine_answers", post(combine))
        .route("/validation_metrics", get(validation_metrics))
}

#[derive(serde::Deserialize)]
struct ValidationRequest {
    question: String,
    answer: String,
    #[serde(default)]
    source: String,
    #[serde(default)]
    confidence: f64,
}

#[derive(serde::Deserialize)]
struct CombineRequest {
    primary: ScoredAnswer,
    secondary: Option<ScoredAnswer>,
}

async fn validate(Json(req): Json<ValidationRequest>) -> Json<serde_json::Value> {
    tracing::info!(
        source = %req.source,
        confidence = clamp_confidence(req.confidence),
        "validating answer"
    );
    let report = validate_answer(&req.question, &req.answer);
    Json(serde_json::json!({
        "is_valid": report.is_valid,
        "validation_score": report.validation_score,
        "validation_reason": report.validation_reason,
        "quality_metrics": report.quality_metrics,
        "suggestions": report.suggestions,
        "timestamp": now_rfc3339(),
    }))
}

async fn combine(Json(req): Json<CombineRequest>) -> Json<serde_json::Value> {
    let combined = combine_answers(&req.primary, req.secondary.as_ref());
    Json(serde_json::json!({
        "answer": combined.text,
        "source": combined.source,
        "confidence": combined.confidence,
        "timestamp": now_rfc3339(),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "deskrag-validation-api",
        "validation_criteria": CRITERION_WEIGHTS.iter().map(|(n, _)| *n).collect::<Vec<_>>(),
        "timestamp": now_rfc3339(),
    }))
}

async fn validation_metrics() -> Json<serde_json::Value> {
    let weights: serde_json::Map<String, serde_json::Value> = CRITERION_WEIGHTS
        .iter()
        .map(|(name, weight)| (name.to_string(), serde_json::json!(weight)))
        .collect();
    let criteria: serde_json::Map<String, serde_json::Value> = CRITERION_DESCRIPTIONS
        .iter()
        .map(|(name, description)| (name.to_string(), serde_json::json!(description)))
        .collect();
    Json(serde_json::json!({
        "validation_weights": weights,
        "quality_criteria": criteria,
        "thresholds": {
            "minimum_validation_score": VALIDATION_THRESHOLD,
            "high_quality_threshold": HIGH_QUALITY_THRESHOLD,
            "combiner_confidence_threshold": CONFIDENCE_THRESHOLD,
            "combined_confidence_boost": COMBINED_BOOST,
        },
        "supported_sources": [
            "high-confidence-primary",
            "combined",
            "low-confidence-fallback",
        ],
        "timestamp": now_rfc3339(),
    }))
}

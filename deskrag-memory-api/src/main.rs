//! Axum-based memory-augmented responder: independent keyword match phrased
//! through the configured language model, with fixed confidence tiers.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use deskrag_responder::MemoryResponder;
use deskrag_shared::{now_rfc3339, ServiceConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[deskrag-memory-api] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::load().expect("load ServiceConfig");
    let state = AppState {
        responder: Arc::new(MemoryResponder::from_config(&config)),
    };
    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.memory_port));
    tracing::info!("deskrag-memory-api listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(addr).await.unwrap(),
        app,
    )
    .await
    .unwrap();
}

#[derive(Clone)]
struct AppState {
    responder: Arc<MemoryResponder>,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/cognee_query", post(cognee_query))
        .route("/cognee_query_get", get(cognee_query_get))
        .route("/query", post(legacy_query))
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct QueryRequest {
    question: String,
}

#[derive(serde::Deserialize)]
struct QueryParams {
    question: String,
}

async fn answer_json(state: &AppState, question: &str) -> serde_json::Value {
    let result = state.responder.respond(question).await;
    serde_json::json!({
        "answer": result.answer,
        "confidence": result.confidence,
        "used_context": result.used_context,
        "source": result.source,
        "metadata": {
            "context_found": result.context_found,
            "model_mode": result.model_mode,
            "timestamp": now_rfc3339(),
        },
        "timestamp": now_rfc3339(),
    })
}

async fn cognee_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Json<serde_json::Value> {
    Json(answer_json(&state, &req.question).await)
}

async fn cognee_query_get(
    State(state): State<AppState>,
    Query(params): Query<QueryParams>,
) -> Json<serde_json::Value> {
    Json(answer_json(&state, &params.question).await)
}

/// Legacy endpoint kept for workflow compatibility: trimmed response shape.
async fn legacy_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Json<serde_json::Value> {
    let result = state.responder.respond(&req.question).await;
    Json(serde_json::json!({
        "answer": result.answer,
        "used_context": result.used_context,
        "timestamp": now_rfc3339(),
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "deskrag-memory-api",
        "model_mode": state.responder.mode().as_str(),
        "timestamp": now_rfc3339(),
    }))
}

async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "memory_service": "active",
        "model_mode": state.responder.mode().as_str(),
        "endpoints": {
            "cognee_query": "/cognee_query",
            "cognee_query_get": "/cognee_query_get",
            "legacy_query": "/query",
            "health": "/health",
            "status": "/status",
        },
        "timestamp": now_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use deskrag_responder::{LlmMode, StaticResponder};
    use tower::ServiceExt;

    fn test_app() -> Router {
        router(AppState {
            responder: Arc::new(MemoryResponder::with_model(
                Arc::new(StaticResponder),
                LlmMode::Static,
            )),
        })
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn cognee_query_uses_knowledge_context() {
        let app = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/cognee_query")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"question":"What is the return policy?"}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["used_context"], true);
        assert_eq!(json["confidence"], 0.7);
        assert_eq!(json["source"], "ai_memory");
        assert!(json["answer"].as_str().unwrap().contains("30 days"));
        assert_eq!(json["metadata"]["model_mode"], "static");
    }

    #[tokio::test]
    async fn cognee_query_get_matches_post_semantics() {
        let app = test_app();
        let req = Request::builder()
            .method("GET")
            .uri("/cognee_query_get?question=what%20payment%20methods%20do%20you%20take")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["used_context"], true);
        assert!(json["answer"].as_str().unwrap().contains("PayPal"));
    }

    #[tokio::test]
    async fn unknown_question_gets_memory_tier_confidence() {
        let app = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/cognee_query")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"question":"what is the meaning of life"}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let json = body_json(res).await;
        assert_eq!(json["used_context"], false);
        assert_eq!(json["confidence"], 0.4);
        assert!(json["answer"]
            .as_str()
            .unwrap()
            .starts_with("Based on AI memory analysis:"));
    }

    #[tokio::test]
    async fn legacy_query_returns_trimmed_shape() {
        let app = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/query")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"question":"warranty coverage?"}"#))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        let json = body_json(res).await;
        assert_eq!(json["used_context"], true);
        assert!(json.get("answer").is_some());
        assert!(json.get("confidence").is_none());
        assert!(json.get("timestamp").is_some());
    }

    #[tokio::test]
    async fn status_lists_endpoints() {
        let app = test_app();
        let res = app
            .oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(res).await;
        assert_eq!(json["memory_service"], "active");
        assert_eq!(json["endpoints"]["legacy_query"], "/query");
    }
}

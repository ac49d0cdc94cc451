//! Axum-based knowledge lookup service: keyword search over the built-in
//! category table and appended entries, with an append-only interaction log.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use deskrag_knowledge::KnowledgeBase;
use deskrag_shared::{now_rfc3339, text::key_terms, ServiceConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[deskrag-knowledge-api] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServiceConfig::load().expect("load ServiceConfig");
    let state = AppState {
        base: Arc::new(KnowledgeBase::new()),
    };
    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.knowledge_port));
    tracing::info!("deskrag-knowledge-api listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(addr).await.unwrap(),
        app,
    )
    .await
    .unwrap();
}

#[derive(Clone)]
struct AppState {
    base: Arc<KnowledgeBase>,
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stats", get(stats))
        .route("/manual_search", post(manual_search))
        .route("/manual_search_get", get(manual_search_get))
        .route("/add_manual_knowledge", post(add_manual_knowledge))
        .route("/log_interaction", post(log_interaction))
        .with_state(state)
}

#[derive(serde::Deserialize)]
struct QueryRequest {
    question: String,
}

#[derive(serde::Deserialize)]
struct SearchParams {
    question: String,
}

#[derive(serde::Deserialize)]
struct AddKnowledgeRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
    confidence: Option<f64>,
    category: Option<String>,
}

#[derive(serde::Deserialize)]
struct LogRequest {
    query: String,
    answer: Option<String>,
    source: Option<String>,
    #[serde(default)]
    confidence: f64,
}

fn search_response(state: &AppState, question: &str) -> Json<serde_json::Value> {
    let result = state.base.lookup(question);
    let metadata = if result.found {
        serde_json::json!({
            "category": result.category,
            "entry_id": result.entry_id,
        })
    } else {
        serde_json::json!({ "reason": "No matching information found for this question" })
    };
    Json(serde_json::json!({
        "found": result.found,
        "answer": result.answer,
        "confidence": result.confidence,
        "source_type": result.source_type,
        "metadata": metadata,
        "timestamp": now_rfc3339(),
    }))
}

async fn manual_search(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> Json<serde_json::Value> {
    search_response(&state, &req.question)
}

async fn manual_search_get(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<serde_json::Value> {
    search_response(&state, &params.question)
}

async fn add_manual_knowledge(
    State(state): State<AppState>,
    Json(req): Json<AddKnowledgeRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    if req.question.trim().is_empty() || req.answer.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "error": "Question and answer are required",
                "timestamp": now_rfc3339(),
            })),
        ));
    }
    // The question pattern becomes the entry's keyword set.
    let keywords = key_terms(&req.question);
    let entry_id = state.base.add_entry(
        keywords,
        req.answer,
        req.confidence.unwrap_or(0.8),
        req.category.unwrap_or_else(|| "manual".to_string()),
    );
    Ok(Json(serde_json::json!({
        "status": "success",
        "entry_id": entry_id,
        "timestamp": now_rfc3339(),
    })))
}

async fn log_interaction(
    State(state): State<AppState>,
    Json(req): Json<LogRequest>,
) -> Json<serde_json::Value> {
    let log_id = state.base.log_interaction(
        &req.query,
        req.answer.as_deref(),
        req.source.as_deref(),
        req.confidence,
    );
    Json(serde_json::json!({
        "status": "success",
        "log_id": log_id,
        "timestamp": now_rfc3339(),
    }))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "deskrag-knowledge-api",
        "manual_knowledge_entries": state.base.entry_count(),
        "logged_interactions": state.base.interaction_count(),
        "timestamp": now_rfc3339(),
    }))
}

async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let stats = state.base.stats();
    Json(serde_json::json!({
        "manual_knowledge": {
            "total_entries": stats.total_entries,
            "by_category": stats.entries_by_category,
            "avg_confidence": stats.avg_entry_confidence,
        },
        "interactions": {
            "total_queries": stats.total_interactions,
            "sources_used": stats.interactions_by_source,
            "avg_confidence": stats.avg_interaction_confidence,
        },
        "timestamp": now_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        router(AppState {
            base: Arc::new(KnowledgeBase::new()),
        })
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap()
    }

    #[tokio::test]
    async fn manual_search_matches_return_policy() {
        let app = test_app();
        let req = post_json("/manual_search", serde_json::json!({ "question": "What is the return policy?" }));
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["found"], true);
        assert_eq!(json["confidence"], 0.85);
        assert_eq!(json["source_type"], "manual");
        assert!(json["answer"].as_str().unwrap().contains("30 days"));
        assert!(json.get("timestamp").is_some());
    }

    #[tokio::test]
    async fn manual_search_get_uses_query_string() {
        let app = test_app();
        let req = Request::builder()
            .method("GET")
            .uri("/manual_search_get?question=how%20fast%20is%20shipping")
            .body(Body::empty())
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["found"], true);
        assert_eq!(json["confidence"], 0.90);
        assert_eq!(json["metadata"]["category"], "shipping");
    }

    #[tokio::test]
    async fn unmatched_question_returns_not_found_with_zero_confidence() {
        let app = test_app();
        let req = post_json("/manual_search", serde_json::json!({ "question": "weather forecast" }));
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["found"], false);
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["source_type"], "low_confidence");
        assert!(json["metadata"].get("reason").is_some());
    }

    #[tokio::test]
    async fn added_knowledge_is_searchable() {
        let app = test_app();
        let add = post_json(
            "/add_manual_knowledge",
            serde_json::json!({
                "question": "What about the loyalty program?",
                "answer": "Loyalty members earn 2% back on every order.",
                "confidence": 0.8,
                "category": "loyalty"
            }),
        );
        let res = app.clone().oneshot(add).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["status"], "success");
        let entry_id = json["entry_id"].as_str().unwrap().to_string();

        let search = post_json("/manual_search", serde_json::json!({ "question": "loyalty perks?" }));
        let res = app.oneshot(search).await.unwrap();
        let json = body_json(res).await;
        assert_eq!(json["found"], true);
        assert_eq!(json["metadata"]["entry_id"], entry_id);
        assert!(json["answer"].as_str().unwrap().contains("2% back"));
    }

    #[tokio::test]
    async fn add_knowledge_without_answer_is_rejected() {
        let app = test_app();
        let req = post_json(
            "/add_manual_knowledge",
            serde_json::json!({ "question": "incomplete entry" }),
        );
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let json = body_json(res).await;
        assert_eq!(json["error"], "Question and answer are required");
    }

    #[tokio::test]
    async fn malformed_body_is_a_client_error() {
        let app = test_app();
        let req = Request::builder()
            .method("POST")
            .uri("/manual_search")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let res = app.oneshot(req).await.unwrap();
        assert!(res.status().is_client_error());
    }

    #[tokio::test]
    async fn searches_and_explicit_logs_show_up_in_health_and_stats() {
        let app = test_app();
        let res = app
            .clone()
            .oneshot(post_json("/manual_search", serde_json::json!({ "question": "warranty?" })))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let log = post_json(
            "/log_interaction",
            serde_json::json!({
                "query": "warranty?",
                "answer": "combined answer text",
                "source": "combined",
                "confidence": 0.9
            }),
        );
        let res = app.clone().oneshot(log).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let json = body_json(res).await;
        assert_eq!(json["status"], "success");
        assert!(json.get("log_id").is_some());

        let res = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(res).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["manual_knowledge_entries"], 1);
        assert_eq!(json["logged_interactions"], 2);

        let res = app
            .oneshot(Request::builder().uri("/stats").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = body_json(res).await;
        assert_eq!(json["interactions"]["total_queries"], 2);
        assert_eq!(json["manual_knowledge"]["total_entries"], 1);
        assert_eq!(json["manual_knowledge"]["by_category"]["sample"], 1);
        assert_eq!(json["interactions"]["sources_used"]["manual"], 1);
        assert_eq!(json["interactions"]["sources_used"]["combined"], 1);
    }
}

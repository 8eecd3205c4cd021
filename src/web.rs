//! HTTP 传输层（feature = "web"）
//!
//! 只负责 JSON 编解码与状态码映射，所有业务都委托给 RoutingEngine。
//! 浏览器页面从静态目录加载，任意来源都可跨域调用 API。

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::conversation::{customer_messages, first_customer_message};
use crate::core::{RouterError, RoutingEngine};

/// 测试端点最多展示 / 分类的对话数
const SAMPLE_CONVERSATIONS: usize = 3;
const SAMPLE_CLASSIFICATIONS: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<RoutingEngine>,
    /// 启动时加载的对话（可为空）
    pub conversations: Arc<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    #[serde(default)]
    pub content: Option<String>,
    pub intent: String,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    #[serde(default)]
    pub customer_message: String,
}

/// 任意来源；预检请求直接返回 200
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// API 路由；其余路径交给 static_dir（`/` 即 index.html）
pub fn router(state: AppState, static_dir: impl AsRef<FsPath>) -> Router {
    Router::new()
        .route("/route", post(route_query))
        .route("/classify", post(classify_query))
        .route("/agents", get(list_agents))
        .route("/agents/:id/release", post(release_agent))
        .route("/stats", get(agent_stats))
        .route("/classification-stats", get(classification_stats))
        .route("/intents", get(list_intents))
        .route("/test-conversations", get(test_conversations))
        .route("/test-classification", get(test_classification))
        .route("/health", get(|| async { "OK" }))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .with_state(state)
        .layer(cors_layer())
}

fn error_response(status: StatusCode, message: String, kind: &str) -> Response {
    (status, Json(json!({ "error": message, "status": kind }))).into_response()
}

fn invalid_json(rejection: JsonRejection) -> Response {
    error_response(StatusCode::BAD_REQUEST, rejection.body_text(), "invalid_json")
}

async fn route_query(
    State(state): State<AppState>,
    payload: Result<Json<RouteRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => return invalid_json(rejection),
    };
    tracing::debug!(intent = %request.intent, has_content = request.content.is_some(), "route request");

    match state.engine.route(&request.intent).await {
        Ok(assignment) => Json(assignment).into_response(),
        Err(err) if err.is_unavailable() => {
            error_response(StatusCode::SERVICE_UNAVAILABLE, err.to_string(), err.status())
        }
        Err(err) => error_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string(), err.status()),
    }
}

async fn classify_query(
    State(state): State<AppState>,
    payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(p) => p,
        Err(rejection) => return invalid_json(rejection),
    };

    match state.engine.classify(&request.customer_message).await {
        Ok(classification) => Json(json!({
            "intent": classification.intent,
            "recommended_agent": classification.team,
            "message": request.customer_message,
        }))
        .into_response(),
        Err(err @ RouterError::EmptyMessage) => error_response(
            StatusCode::BAD_REQUEST,
            "customer_message field is required".to_string(),
            err.status(),
        ),
        Err(err) => error_response(
            StatusCode::BAD_GATEWAY,
            format!("Classification failed: {err}"),
            err.status(),
        ),
    }
}

async fn release_agent(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.engine.release(&id).await {
        Ok(agent) => Json(agent).into_response(),
        Err(err) => error_response(StatusCode::NOT_FOUND, err.to_string(), err.status()),
    }
}

async fn list_agents(State(state): State<AppState>) -> Response {
    Json(state.engine.get_agents().await).into_response()
}

async fn agent_stats(State(state): State<AppState>) -> Response {
    Json(state.engine.get_agent_stats().await).into_response()
}

async fn classification_stats(State(state): State<AppState>) -> Response {
    Json(state.engine.get_classification_stats()).into_response()
}

async fn list_intents(State(state): State<AppState>) -> Response {
    Json(state.engine.intents().to_vec()).into_response()
}

async fn test_conversations(State(state): State<AppState>) -> Response {
    let examples: Vec<&str> = state
        .conversations
        .iter()
        .take(SAMPLE_CONVERSATIONS)
        .map(|c| first_customer_message(c).unwrap_or("No customer message found"))
        .collect();

    Json(json!({
        "message": "Conversation loading test",
        "total_conversations": state.conversations.len(),
        "examples": examples,
    }))
    .into_response()
}

async fn test_classification(State(state): State<AppState>) -> Response {
    if state.conversations.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "No conversations loaded".to_string(),
            "no_conversations",
        );
    }

    let mut results = Vec::new();
    for (i, message) in customer_messages(&state.conversations, SAMPLE_CLASSIFICATIONS)
        .into_iter()
        .enumerate()
    {
        let mut result = json!({
            "conversation_id": i + 1,
            "customer_message": &message,
        });
        match state.engine.classify(&message).await {
            Ok(classification) => {
                result["classified_intent"] = json!(classification.intent);
                result["recommended_agent"] = json!(classification.team);
            }
            Err(err) => result["error"] = json!(err.to_string()),
        }
        results.push(result);
    }

    Json(json!({
        "message": "Classification test on conversations",
        "total_tested": results.len(),
        "results": results,
    }))
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::Agent;
    use crate::config::AppConfig;
    use crate::core::EngineBuilder;
    use crate::llm::{LlmError, MockLlmClient};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn app(llm: MockLlmClient, conversations: Vec<String>) -> Router {
        app_serving(llm, conversations, "static")
    }

    fn app_serving(
        llm: MockLlmClient,
        conversations: Vec<String>,
        static_dir: impl AsRef<FsPath>,
    ) -> Router {
        let mut config = AppConfig::default();
        config.routing.agents =
            vec![Agent::new("A", "Agent A", 1).with_specialties(["billing_discrepancies"])];
        let engine = EngineBuilder::new(config)
            .with_llm(Arc::new(llm))
            .build()
            .unwrap();
        router(
            AppState {
                engine: Arc::new(engine),
                conversations: Arc::new(conversations),
            },
            static_dir,
        )
    }

    async fn call(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_route_then_503() {
        let app = app(MockLlmClient::default(), Vec::new());
        let body = r#"{"content":"I was charged twice","intent":"billing_discrepancies"}"#;

        let (status, value) = call(&app, "POST", "/route", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["agent_id"], "A");
        assert_eq!(value["intent"], "billing_discrepancies");

        let (status, value) = call(&app, "POST", "/route", body).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(value["status"], "no_agent_available");
    }

    #[tokio::test]
    async fn test_route_invalid_json() {
        let app = app(MockLlmClient::default(), Vec::new());
        let (status, _) = call(&app, "POST", "/route", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_classify_statuses() {
        let ok = app(MockLlmClient::replying("billing_discrepancies"), Vec::new());
        let (status, value) =
            call(&ok, "POST", "/classify", r#"{"customer_message":"I was charged twice"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["intent"], "billing_discrepancies");
        assert_eq!(value["recommended_agent"], "billing-team");

        let (status, _) = call(&ok, "POST", "/classify", r#"{"customer_message":""}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let down = app(MockLlmClient::failing(LlmError::Transport("down".into())), Vec::new());
        let (status, value) =
            call(&down, "POST", "/classify", r#"{"customer_message":"hello"}"#).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(value["status"], "classification_unavailable");
    }

    #[tokio::test]
    async fn test_release_and_stats() {
        let app = app(MockLlmClient::default(), Vec::new());
        call(&app, "POST", "/route", r#"{"intent":"billing_discrepancies"}"#).await;

        let (_, stats) = call(&app, "GET", "/stats", "").await;
        assert_eq!(stats["current_load"], 1);

        let (status, agent) = call(&app, "POST", "/agents/A/release", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(agent["current_load"], 0);

        let (status, _) = call(&app, "POST", "/agents/ghost/release", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_classification_endpoints_need_conversations() {
        let empty = app(MockLlmClient::default(), Vec::new());
        let (status, _) = call(&empty, "GET", "/test-classification", "").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let loaded = app(
            MockLlmClient::replying("billing_discrepancies"),
            vec!["\"Agent: Thank you for calling\nCustomer: I was charged twice".to_string()],
        );
        let (status, value) = call(&loaded, "GET", "/test-classification", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["total_tested"], 1);
        assert_eq!(value["results"][0]["classified_intent"], "billing_discrepancies");

        let (_, value) = call(&loaded, "GET", "/test-conversations", "").await;
        assert_eq!(value["examples"][0], "I was charged twice");
    }

    #[tokio::test]
    async fn test_cors_preflight_and_headers() {
        let app = app(MockLlmClient::default(), Vec::new());

        let preflight = Request::builder()
            .method("OPTIONS")
            .uri("/classify")
            .header("origin", "http://localhost:3000")
            .header("access-control-request-method", "POST")
            .header("access-control-request-headers", "content-type")
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(preflight).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], "*");
        let methods = headers["access-control-allow-methods"].to_str().unwrap();
        for method in ["GET", "POST", "PUT", "DELETE", "OPTIONS"] {
            assert!(methods.contains(method), "missing {method} in {methods}");
        }
        let allowed = headers["access-control-allow-headers"]
            .to_str()
            .unwrap()
            .to_ascii_lowercase();
        assert!(allowed.contains("content-type"));
        assert!(allowed.contains("authorization"));

        let request = Request::builder()
            .uri("/agents")
            .header("origin", "http://localhost:3000")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["access-control-allow-origin"], "*");
    }

    #[tokio::test]
    async fn test_static_fallback_serves_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<title>Query Router</title>").unwrap();
        let app = app_serving(MockLlmClient::default(), Vec::new(), dir.path());

        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<title>Query Router</title>");

        // API 路由优先于静态目录
        let (status, _) = call(&app, "GET", "/health", "").await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder().uri("/missing.js").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! HTTP Endpoints
//!
//! REST and SSE API for the legal assistant.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use futures::Stream;
use legal_agent_agent::{SidebarSummary, TurnRequest, TurnResponse};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::metrics::{metrics_handler, record_request};
use crate::state::AppState;
use crate::ServerError;

const DEFAULT_ORIGIN: &str = "http://localhost:3000";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(&state.config.server.cors_origins, state.config.server.cors_enabled);
    let timeout = Duration::from_secs(state.config.server.timeout_seconds);

    Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session).get(list_sessions))
        .route("/api/sessions/:id", delete(delete_session))
        .route("/api/sessions/:id/sidebar", get(get_sidebar))
        .route("/api/sessions/:id/history", get(get_history))

        // Chat endpoints
        .route("/api/chat", post(chat))
        .route("/api/chat/stream", post(chat_stream))

        // Health and metrics
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))

        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer (for dev)
/// - If no origin is configured or parses, allows localhost:3000 only
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    if parsed_origins.is_empty() {
        tracing::info!("No usable CORS origins configured, defaulting to {}", DEFAULT_ORIGIN);
        return layer.allow_origin(HeaderValue::from_static(DEFAULT_ORIGIN));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    layer.allow_origin(parsed_origins)
}

/// Chat request body. Missing fields deserialize as blank and are rejected
/// by validation.
#[derive(Debug, Default, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    session_id: String,
    #[serde(default, alias = "query")]
    text: String,
}

impl From<ChatRequest> for TurnRequest {
    fn from(request: ChatRequest) -> Self {
        TurnRequest::new(request.session_id, request.text)
    }
}

async fn run_turn(
    state: &AppState,
    endpoint: &'static str,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<TurnResponse, ServerError> {
    let result = match payload {
        Ok(Json(request)) => state.agent.process(request.into()).await.map_err(ServerError::from),
        Err(rejection) => Err(ServerError::InvalidRequest(rejection.body_text())),
    };
    let status = result.as_ref().map_or_else(ServerError::status, |_| StatusCode::OK);
    record_request(endpoint, status);
    result
}

/// Chat endpoint (non-streaming)
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<TurnResponse>, ServerError> {
    let response = run_turn(&state, "chat", payload).await?;
    Ok(Json(response))
}

/// Chat endpoint streaming one `chunk` event per section, then `done`
/// carrying the full turn response.
async fn chat_stream(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
    let response = run_turn(&state, "chat_stream", payload).await?;

    let mut events: Vec<Event> = response
        .chunks()
        .map(|chunk| json_event("chunk", &chunk))
        .collect();
    events.push(json_event("done", &response));

    let stream = tokio_stream::iter(events.into_iter().map(Ok::<_, Infallible>));
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

fn json_event<T: Serialize>(event_type: &str, data: &T) -> Event {
    Event::default()
        .event(event_type)
        .data(serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string()))
}

/// Create an empty session with a generated id
async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServerError> {
    let id = uuid::Uuid::new_v4().to_string();
    state.memory.create_session(&id)?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "session_id": id }))))
}

/// List sessions
async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.memory.list_sessions();
    Json(serde_json::json!({
        "count": sessions.len(),
        "sessions": sessions,
    }))
}

async fn get_sidebar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SidebarSummary>, ServerError> {
    Ok(Json(state.memory.get_sidebar_summary(&id)?))
}

async fn get_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let messages = state.memory.history(&id)?;
    Ok(Json(serde_json::json!({
        "session_id": id,
        "count": messages.len(),
        "messages": messages,
    })))
}

/// Delete session
async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServerError> {
    if state.memory.delete_session(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::Session(id))
    }
}

/// Health check
async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.memory.session_count(),
        "model": state.agent.model_name(),
        "retriever": state.agent.retriever_name(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use legal_agent_config::Settings;
    use legal_agent_core::{ContextRetriever, LanguageModel, ModelError, Passage, RetrievalError};
    use tower::ServiceExt;

    struct CannedModel;

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn complete(&self, _prompt: &str, _timeout: Duration) -> Result<String, ModelError> {
            Ok("**Applicable Law & Section:** Section 420 PPC\n**Simplified Text:** Cheating.".to_string())
        }

        fn model_name(&self) -> &str {
            "canned"
        }
    }

    struct OnePassage;

    #[async_trait]
    impl ContextRetriever for OnePassage {
        async fn search(&self, _query: &str, _k: usize) -> Result<Vec<Passage>, RetrievalError> {
            Ok(vec![Passage::new("420. Cheating.", "Pakistan Penal Code 1860", 1.0)])
        }

        fn name(&self) -> &str {
            "one"
        }
    }

    fn app() -> (Router, AppState) {
        let state = AppState::new(Settings::default(), Arc::new(OnePassage), Arc::new(CannedModel));
        (create_router(state.clone()), state)
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["sessions"], 0);
        assert_eq!(body["model"], "canned");
    }

    #[tokio::test]
    async fn test_chat_casual() {
        let (app, state) = app();
        let response = app
            .oneshot(post_json("/api/chat", serde_json::json!({"session_id": "web-1", "text": "Hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["intent"], "casual_chat");
        assert_eq!(body["sidebar"]["message_count"], 2);
        assert_eq!(state.memory.session_count(), 1);
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_and_missing_fields() {
        let (app, _) = app();
        let response = app
            .clone()
            .oneshot(post_json("/api/chat", serde_json::json!({"session_id": "web-2", "text": "  "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json("/api/chat", serde_json::json!({"text": "What is section 420?"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "bad_request");
    }

    #[tokio::test]
    async fn test_chat_stream_ends_with_done() {
        let (app, _) = app();
        let response = app
            .oneshot(post_json(
                "/api/chat/stream",
                serde_json::json!({"session_id": "web-3", "text": "What is section 420?"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        // acknowledgment, overview, then the seven sections
        let chunk_events = text.matches("event: chunk").count();
        assert_eq!(chunk_events, 9);
        assert!(text.contains("\"kind\":\"overview\""));
        let done = text.find("event: done").unwrap();
        assert!(text.rfind("event: chunk").unwrap() < done);
    }

    #[tokio::test]
    async fn test_session_endpoints() {
        let (app, _) = app();

        let response = app
            .clone()
            .oneshot(Request::builder().method("POST").uri("/api/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let id = body_json(response).await["session_id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/api/sessions").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["count"], 1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/api/sessions/{}/sidebar", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["message_count"], 0);

        let delete = |id: String| {
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/sessions/{}", id))
                .body(Body::empty())
                .unwrap()
        };
        let response = app.clone().oneshot(delete(id.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let response = app.clone().oneshot(delete(id.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/api/sessions/{}/history", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

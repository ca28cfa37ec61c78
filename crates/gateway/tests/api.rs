//! HTTP API integration tests — full router round-trips against an
//! in-memory database and a canned completion gateway.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::util::ServiceExt;
use uuid::Uuid;

use gl_domain::agent::default_roster;
use gl_domain::config::Config;
use gl_domain::error::Result;
use gl_gateway::api;
use gl_gateway::runtime::{PromptRegistry, SessionService};
use gl_gateway::state::AppState;
use gl_persistence::{Database, PersistenceLog, SessionRepository, SqlitePersistenceLog};
use gl_providers::{CompletionGateway, CompletionRequest};
use gl_sessions::SessionCache;

struct CannedGateway;

#[async_trait::async_trait]
impl CompletionGateway for CannedGateway {
    async fn complete(&self, req: CompletionRequest) -> Result<String> {
        Ok(format!("ok: {}", req.input.lines().next().unwrap_or("")))
    }
}

async fn test_state() -> AppState {
    let db = Database::open_in_memory().await.unwrap();
    let repository = Arc::new(SessionRepository::new(&db));
    let audit = Arc::new(SqlitePersistenceLog::new(&db));

    let service = Arc::new(SessionService::new(
        Arc::new(SessionCache::new()),
        Arc::clone(&repository),
        Arc::clone(&audit) as Arc<dyn PersistenceLog>,
        Arc::new(CannedGateway),
        Arc::new(PromptRegistry::new(default_roster("test-model"))),
        None,
        None,
    ));

    AppState {
        config: Arc::new(Config::default()),
        service,
        repository,
        audit,
    }
}

fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn create_session_returns_an_active_row() {
    let app = api::router().with_state(test_state().await);

    let response = app
        .oneshot(json_request(Method::POST, "/v1/sessions", serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["status"], "active");
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
}

#[tokio::test]
async fn get_unknown_session_is_404() {
    let app = api::router().with_state(test_state().await);

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/sessions/{}", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn message_roundtrip_returns_response_and_thoughts() {
    let state = test_state().await;
    let app = api::router().with_state(state.clone());

    let created = app
        .clone()
        .oneshot(json_request(Method::POST, "/v1/sessions", serde_json::json!({})))
        .await
        .unwrap();
    let session_id = json_body(created).await["id"].as_str().unwrap().to_owned();

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/v1/sessions/{session_id}/messages"),
            serde_json::json!({ "message": "Tell a story about Ada Lovelace" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["session_id"], session_id);
    assert!(body["response"]
        .as_str()
        .unwrap()
        .contains("# Film Concept Pitch"));

    let thoughts = body["thoughts"].as_array().unwrap();
    assert_eq!(thoughts.len(), 4);
    let agents: Vec<&str> = thoughts
        .iter()
        .map(|t| t["agent"].as_str().unwrap())
        .collect();
    assert_eq!(agents, ["greeter", "researcher", "screenwriter", "critic"]);
    assert!(thoughts.iter().all(|t| t["status"] == "completed"));
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let state = test_state().await;
    let app = api::router().with_state(state.clone());

    let created = app
        .clone()
        .oneshot(json_request(Method::POST, "/v1/sessions", serde_json::json!({})))
        .await
        .unwrap();
    let session_id = json_body(created).await["id"].as_str().unwrap().to_owned();

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/v1/sessions/{session_id}/messages"),
            serde_json::json!({ "message": "   " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn messaging_an_unknown_session_is_404() {
    let app = api::router().with_state(test_state().await);

    let response = app
        .oneshot(json_request(
            Method::POST,
            &format!("/v1/sessions/{}/messages", Uuid::new_v4()),
            serde_json::json!({ "message": "hello" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn close_session_marks_the_row_completed() {
    let state = test_state().await;
    let app = api::router().with_state(state.clone());

    let created = app
        .clone()
        .oneshot(json_request(Method::POST, "/v1/sessions", serde_json::json!({})))
        .await
        .unwrap();
    let session_id = json_body(created).await["id"].as_str().unwrap().to_owned();

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/v1/sessions/{session_id}/close"),
            serde_json::json!({}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "completed");

    let fetched = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(json_body(fetched).await["status"], "completed");
}

#[tokio::test]
async fn history_reflects_a_completed_run() {
    let state = test_state().await;
    let app = api::router().with_state(state.clone());

    let created = app
        .clone()
        .oneshot(json_request(Method::POST, "/v1/sessions", serde_json::json!({})))
        .await
        .unwrap();
    let session_id = json_body(created).await["id"].as_str().unwrap().to_owned();

    app.clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/v1/sessions/{session_id}/messages"),
            serde_json::json!({ "message": "Ada Lovelace" }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/sessions/{session_id}/history"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["questions"].as_array().unwrap().len(), 1);
    // Four step answers plus the aggregate.
    assert_eq!(body["answers"].as_array().unwrap().len(), 5);
}

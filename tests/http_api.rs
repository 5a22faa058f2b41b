use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use lead_insight::analysis::directory::{ClientDirectory, DirectoryError};
use lead_insight::analysis::router::analysis_router;
use lead_insight::analysis::scoring::ScoringConfig;
use lead_insight::analysis::AnalysisService;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

struct StaticDirectory {
    records: HashMap<String, Value>,
}

impl StaticDirectory {
    fn with(records: Vec<(&str, Value)>) -> Arc<Self> {
        Arc::new(Self {
            records: records
                .into_iter()
                .map(|(id, value)| (id.to_string(), value))
                .collect(),
        })
    }
}

#[async_trait]
impl ClientDirectory for StaticDirectory {
    async fn fetch(&self, id: &str) -> Result<Value, DirectoryError> {
        self.records
            .get(id)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))
    }
}

struct DownDirectory;

#[async_trait]
impl ClientDirectory for DownDirectory {
    async fn fetch(&self, _id: &str) -> Result<Value, DirectoryError> {
        Err(DirectoryError::Unreachable(
            "connection refused".to_string(),
        ))
    }
}

fn build_router<D: ClientDirectory + 'static>(directory: Arc<D>) -> axum::Router {
    let service = Arc::new(AnalysisService::new(directory, ScoringConfig::default()));
    analysis_router(service)
}

async fn dispatch(router: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    let status = response.status();
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    let payload: Value = serde_json::from_slice(&body).expect("json");
    (status, payload)
}

#[tokio::test]
async fn get_analysis_returns_the_scored_payload() {
    let directory = StaticDirectory::with(vec![(
        "client-a",
        json!({
            "id": "client-a",
            "name": "Ancien Client",
            "hasWorkedWithUs": true,
            "isActive": true
        }),
    )]);

    let (status, payload) =
        dispatch(build_router(directory), "/api/v1/clients/client-a/analysis").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload.get("score"), Some(&json!(25)));
    assert_eq!(payload.get("priority"), Some(&json!("basse")));
    assert!(payload.get("riskAssessment").is_some());
    assert!(payload.get("generatedAt").is_some());
}

#[tokio::test]
async fn blank_client_id_maps_to_bad_request() {
    let directory = StaticDirectory::with(Vec::new());

    let (status, payload) =
        dispatch(build_router(directory), "/api/v1/clients/%20/analysis").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = payload["error"].as_str().expect("error message");
    assert!(message.contains("client id"), "got '{message}'");
}

#[tokio::test]
async fn unknown_client_maps_to_not_found() {
    let directory = StaticDirectory::with(Vec::new());

    let (status, payload) =
        dispatch(build_router(directory), "/api/v1/clients/ghost/analysis").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let message = payload["error"].as_str().expect("error message");
    assert!(message.contains("ghost"), "got '{message}'");
}

#[tokio::test]
async fn unreachable_upstream_maps_to_bad_gateway() {
    let (status, payload) = dispatch(
        build_router(Arc::new(DownDirectory)),
        "/api/v1/clients/client-a/analysis",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = payload["error"].as_str().expect("error message");
    assert!(message.contains("unreachable"), "got '{message}'");
}

//! HTTP-level tests for the gateway routes

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use gen_dispatch_gateway::api::routes::create_router;
use gen_dispatch_gateway::broker::{EnqueueOptions, JobBroker, JobResult, MemoryBroker};
use gen_dispatch_gateway::config::Settings;
use gen_dispatch_gateway::dispatch::{AdmissionController, Dispatcher};
use gen_dispatch_gateway::model::defaults::builtin_defaults;
use gen_dispatch_gateway::model::registry::ModelRegistry;
use gen_dispatch_gateway::model::Model;
use gen_dispatch_gateway::AppState;

fn image_b64() -> String {
    STANDARD.encode(b"fake png bytes")
}

fn test_settings(backlog_limit: u64, wait_timeout_ms: u64) -> Settings {
    let mut settings = Settings::default();
    settings.queue.backlog_limit = backlog_limit;
    settings.queue.enqueue_delay_ms = 0;
    settings.queue.wait_timeout_ms = wait_timeout_ms;
    settings
}

fn test_app(broker: Arc<MemoryBroker>, settings: Settings) -> Router {
    let registry = Arc::new(ModelRegistry::new(
        broker,
        &settings.queue,
        settings.generation.default_steps,
    ));
    let admission = AdmissionController::new(registry.clone(), settings.queue.backlog_limit);
    let dispatcher = Arc::new(Dispatcher::new(registry.clone(), admission));
    create_router(Arc::new(AppState {
        settings,
        registry,
        dispatcher,
    }))
}

fn spawn_echo_worker(broker: Arc<MemoryBroker>, queue: &'static str) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Some(job) = broker.claim(queue) {
                let seed = if job.payload.seed >= 0 {
                    job.payload.seed
                } else {
                    1234
                };
                broker.complete(
                    queue,
                    job.id,
                    JobResult {
                        base64: image_b64(),
                        seed,
                    },
                );
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
}

async fn prefill(broker: &MemoryBroker, queue: &str, n: usize) {
    let opts = EnqueueOptions {
        delay: Duration::from_secs(60),
        retention: 10,
    };
    for _ in 0..n {
        broker
            .enqueue(queue, builtin_defaults(Model::Anything, 20), opts)
            .await
            .unwrap();
    }
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

#[tokio::test]
async fn test_liveness() {
    let app = test_app(Arc::new(MemoryBroker::new()), test_settings(10, 1000));

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "API is alive");
}

#[tokio::test]
async fn test_queue_depth_reports_backlog() {
    let broker = Arc::new(MemoryBroker::new());
    let app = test_app(broker.clone(), test_settings(10, 1000));
    prefill(&broker, "anything", 2).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/queue/anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "2");
}

#[tokio::test]
async fn test_queue_depth_model_is_case_insensitive() {
    let broker = Arc::new(MemoryBroker::new());
    let app = test_app(broker.clone(), test_settings(10, 1000));
    prefill(&broker, "anything", 1).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/queue/ANYTHING")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "1");
}

#[tokio::test]
async fn test_queue_depth_unknown_model_is_400() {
    let app = test_app(Arc::new(MemoryBroker::new()), test_settings(10, 1000));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/queue/sdxl")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_generate_unknown_model_is_400_without_enqueue() {
    let broker = Arc::new(MemoryBroker::new());
    let app = test_app(broker.clone(), test_settings(10, 1000));

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/generate/sdxl")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    for model in Model::ALL {
        assert_eq!(broker.counts(model.as_str()).await.unwrap().depth(), 0);
    }
}

#[tokio::test]
async fn test_generate_over_capacity_is_503() {
    let broker = Arc::new(MemoryBroker::new());
    let app = test_app(broker.clone(), test_settings(1, 1000));
    prefill(&broker, "counterfeit", 2).await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/generate/counterfeit")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "queue_full");
    // Nothing new was enqueued
    assert_eq!(broker.counts("counterfeit").await.unwrap().depth(), 2);
}

#[tokio::test]
async fn test_generate_returns_result_and_echoed_parameters() {
    let broker = Arc::new(MemoryBroker::new());
    let app = test_app(broker.clone(), test_settings(10, 2000));
    let worker = spawn_echo_worker(broker.clone(), "aom");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/generate/aom")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"seed": 42, "prompt": "1girl"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    worker.abort();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["base64"], image_b64());
    assert_eq!(body["model"], "aom");
    assert_eq!(body["seed"], 42);
    assert_eq!(body["cfg_scale"], 5.0);
    assert_eq!(body["denoising_strength"], 0.5);
    // The echo carries the caller's fragment, not the merged prompt
    assert_eq!(body["positive"], "1girl");
    assert!(body.get("negative").is_none());
}

#[tokio::test]
async fn test_generate_accepts_empty_body() {
    let broker = Arc::new(MemoryBroker::new());
    let app = test_app(broker.clone(), test_settings(10, 2000));
    let worker = spawn_echo_worker(broker.clone(), "anything");

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/generate/anything")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    worker.abort();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["model"], "anything");
    assert_eq!(body["cfg_scale"], 7.0);
    assert!(body.get("positive").is_none());
}

#[tokio::test]
async fn test_generate_timeout_is_500_with_generic_body() {
    let broker = Arc::new(MemoryBroker::new());
    let app = test_app(broker.clone(), test_settings(10, 30));

    // No worker: the wait times out and the caller sees a generic 500
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/generate/anything")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["message"], "internal server error");

    // The orphaned job stays queued
    assert_eq!(broker.counts("anything").await.unwrap().depth(), 1);
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let mut settings = test_settings(10, 1000);
    settings.cors.allowed_origins = vec!["https://waifus.example.com".to_string()];
    let app = test_app(Arc::new(MemoryBroker::new()), settings);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "https://waifus.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://waifus.example.com")
    );
}

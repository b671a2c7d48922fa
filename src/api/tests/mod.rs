use super::*;
use crate::config::DownloadConfig;
use crate::error::{ApiError, Result as CrateResult};
use crate::extractor::{FetchOptions, MediaExtractor};
use crate::types::{Event, JobId, MediaInfo, Progress, ProgressEvent, Rendition, SubmitRequest};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::{broadcast, mpsc};
use tokio::time::timeout;
use tower::ServiceExt;

/// Engine double for router tests: optional delay, then success or failure
struct MockExtractor {
    delay: Duration,
    fail_with: Option<String>,
}

impl MockExtractor {
    fn succeeding() -> Self {
        Self {
            delay: Duration::ZERO,
            fail_with: None,
        }
    }

    fn slow() -> Self {
        Self {
            delay: Duration::from_secs(30),
            fail_with: None,
        }
    }
}

#[async_trait]
impl MediaExtractor for MockExtractor {
    async fn probe(&self, _url: &str) -> CrateResult<MediaInfo> {
        Ok(MediaInfo {
            title: "Mock Video".to_string(),
            duration_seconds: 60,
            uploader: "mock channel".to_string(),
            view_count: 3,
            thumbnail_url: "https://example.com/thumb.jpg".to_string(),
            renditions: vec![Rendition {
                id: "22".to_string(),
                quality_label: "720p".to_string(),
                container_format: "mp4".to_string(),
                size_bytes: Some(2048),
            }],
        })
    }

    async fn fetch(
        &self,
        _url: &str,
        options: &FetchOptions,
        progress: mpsc::Sender<ProgressEvent>,
    ) -> CrateResult<PathBuf> {
        tokio::time::sleep(self.delay).await;
        let _ = progress
            .send(ProgressEvent::Downloading(Progress {
                percent: Some(100.0),
                speed_bps: Some(1_000_000),
                eta_seconds: Some(0),
                downloaded_bytes: 2048,
                total_bytes: Some(2048),
            }))
            .await;
        if let Some(message) = &self.fail_with {
            return Err(crate::error::ExtractionError::EngineFailed {
                reason: message.clone(),
            }
            .into());
        }
        let output = options.output_path();
        tokio::fs::write(&output, b"artifact bytes").await?;
        Ok(output)
    }
}

/// Helper to create a router backed by a mock engine
async fn create_test_app(extractor: MockExtractor) -> (Router, Arc<MediaBroker>, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let config = Config {
        download: DownloadConfig {
            download_dir: dir.path().to_path_buf(),
            ..DownloadConfig::default()
        },
        ..Config::default()
    };
    let broker = Arc::new(
        MediaBroker::with_extractor(config.clone(), Arc::new(extractor))
            .await
            .expect("broker construction"),
    );
    let app = create_router(broker.clone(), Arc::new(config));
    (app, broker, dir)
}

fn submit_body(url: &str) -> Body {
    Body::from(format!(r#"{{"url": "{url}"}}"#))
}

async fn wait_terminal(rx: &mut broadcast::Receiver<Event>, id: JobId) {
    loop {
        let event = timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for terminal event")
            .expect("event channel closed");
        match event {
            Event::Finished { id: event_id, .. } | Event::Failed { id: event_id, .. }
                if event_id == id =>
            {
                return;
            }
            _ => {}
        }
    }
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

#[tokio::test]
async fn health_endpoint_reports_ok_and_job_counts() {
    let (app, _broker, _dir) = create_test_app(MockExtractor::succeeding()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["jobs"]["total"], 0);
}

#[tokio::test]
async fn cors_headers_are_present_when_enabled() {
    let (app, _broker, _dir) = create_test_app(MockExtractor::succeeding()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("Origin", "http://localhost:3000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers().contains_key("access-control-allow-origin"),
        "CORS header should be present when CORS is enabled"
    );
}

#[tokio::test]
async fn submit_returns_201_with_a_job_id() {
    let (app, broker, _dir) = create_test_app(MockExtractor::slow()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs")
                .header("content-type", "application/json")
                .body(submit_body("https://example.com/v"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let id: JobId = serde_json::from_value(body["id"].clone()).expect("id should be a job id");
    assert!(broker.progress(id).await.is_ok());
}

#[tokio::test]
async fn submit_with_invalid_url_returns_400() {
    let (app, broker, _dir) = create_test_app(MockExtractor::succeeding()).await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/jobs")
                .header("content-type", "application/json")
                .body(submit_body("ftp://example.com/v"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "validation_error");
    assert_eq!(broker.stats().await.total, 0);
}

#[tokio::test]
async fn unknown_job_returns_404() {
    let (app, _broker, _dir) = create_test_app(MockExtractor::succeeding()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/jobs/{}", JobId::new()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn submit_poll_and_fetch_artifact_flow() {
    let (app, broker, _dir) = create_test_app(MockExtractor::succeeding()).await;
    let mut events = broker.subscribe();

    let id = broker
        .submit(SubmitRequest {
            url: "https://example.com/v".to_string(),
            quality: "best".to_string(),
            audio_only: false,
        })
        .await
        .unwrap();
    wait_terminal(&mut events, id).await;

    // Poll shows the finished snapshot
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/jobs/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "finished");
    assert_eq!(body["filename"], format!("{id}.mp4"));

    // The file endpoint streams the artifact bytes with download headers
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/jobs/{id}/file"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "video/mp4"
    );
    let disposition = response.headers()["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains(&format!("{id}.mp4")));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"artifact bytes");
}

#[tokio::test]
async fn artifact_request_before_finish_returns_409() {
    let (app, broker, _dir) = create_test_app(MockExtractor::slow()).await;

    let id = broker
        .submit(SubmitRequest {
            url: "https://example.com/v".to_string(),
            quality: "best".to_string(),
            audio_only: false,
        })
        .await
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/jobs/{id}/file"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error: ApiError = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(error.error.code, "not_ready");
}

#[tokio::test]
async fn metadata_endpoint_probes_the_url() {
    let (app, _broker, _dir) = create_test_app(MockExtractor::succeeding()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metadata?url=https%3A%2F%2Fexample.com%2Fv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Mock Video");
    assert_eq!(body["renditions"][0]["quality_label"], "720p");
}

#[tokio::test]
async fn metadata_endpoint_rejects_bad_urls() {
    let (app, _broker, _dir) = create_test_app(MockExtractor::succeeding()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metadata?url=not-a-url")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn openapi_spec_is_served() {
    let (app, _broker, _dir) = create_test_app(MockExtractor::succeeding()).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["openapi"].as_str().unwrap().starts_with("3."));
}

#[tokio::test]
async fn api_server_binds_and_serves() {
    let dir = TempDir::new().unwrap();
    let mut config = Config {
        download: DownloadConfig {
            download_dir: dir.path().to_path_buf(),
            ..DownloadConfig::default()
        },
        ..Config::default()
    };
    config.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);

    let broker = Arc::new(
        MediaBroker::with_extractor((*config).clone(), Arc::new(MockExtractor::succeeding()))
            .await
            .unwrap(),
    );

    let api_handle = tokio::spawn({
        let broker = broker.clone();
        let config = config.clone();
        async move { start_api_server(broker, config).await }
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!api_handle.is_finished(), "server should still be running");
    api_handle.abort();
}

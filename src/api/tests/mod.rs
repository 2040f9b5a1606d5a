use super::*;
use crate::error::Error;
use crate::protocol::{Decoded, EventDecoder};
use crate::stages::{IndexChecker, IndexVerdict, Pinger, Shortener, StageSet, TrafficProbe};
use crate::types::ProgressEvent;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;
use url::Url;

mod files;

struct OkPinger;

#[async_trait]
impl Pinger for OkPinger {
    async fn ping(&self, _url: &Url, _title: &str) -> crate::Result<u16> {
        Ok(200)
    }

    fn name(&self) -> &str {
        "ok-ping"
    }
}

struct OkShortener;

#[async_trait]
impl Shortener for OkShortener {
    async fn shorten(&self, url: &Url) -> crate::Result<String> {
        Ok(format!("https://sho.rt{}", url.path()))
    }

    fn name(&self) -> &str {
        "ok-short"
    }
}

struct OkProbe;

#[async_trait]
impl TrafficProbe for OkProbe {
    async fn visit(&self, _url: &Url, _user_agent: &str) -> crate::Result<u16> {
        Ok(200)
    }
}

/// Reports every host as not indexed
struct NeverIndexed;

#[async_trait]
impl IndexChecker for NeverIndexed {
    async fn check(&self, _url: &Url) -> crate::Result<IndexVerdict> {
        Ok(IndexVerdict {
            indexed: false,
            stats: String::new(),
        })
    }

    fn name(&self) -> &str {
        "never"
    }
}

fn test_config(output: &Path) -> Config {
    let mut config = Config::default();
    config.output.output_dir = output.to_path_buf();
    config.stages.traffic.pacing = Duration::ZERO;
    config.stages.traffic.requests_per_url = 1;
    config
}

fn stub_pipeline(config: &Config) -> Pipeline {
    let stages = StageSet::from_config(config)
        .unwrap()
        .with_pingers(vec![Arc::new(OkPinger)])
        .with_shorteners(vec![Arc::new(OkShortener)])
        .with_traffic_probe(Arc::new(OkProbe))
        .with_index_checker(Arc::new(NeverIndexed));
    Pipeline::new(stages, 1)
}

/// Router over stub collaborators writing into `<tempdir>/output`
fn test_router() -> (Router, TempDir) {
    let dir = tempdir().unwrap();
    let config = test_config(&dir.path().join("output"));
    (router_for(config), dir)
}

fn router_for(config: Config) -> Router {
    let pipeline = stub_pipeline(&config);
    create_router(pipeline, Arc::new(config))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Read the whole progress stream and decode it
async fn collect_events(response: Response<Body>) -> Vec<ProgressEvent> {
    let bytes = body_bytes(response).await;
    let mut decoder = EventDecoder::new();
    let mut decoded = decoder.feed(&bytes);
    decoded.extend(decoder.finish());

    decoded
        .into_iter()
        .map(|d| match d {
            Decoded::Event(event) => event,
            Decoded::Malformed { line, reason } => panic!("malformed frame {line:?}: {reason}"),
        })
        .collect()
}

#[tokio::test]
async fn test_api_server_spawns() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.server.bind_address = "127.0.0.1:0".parse().unwrap();

    let api_handle = tokio::spawn(start_api_server(Arc::new(config)));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(!api_handle.is_finished(), "server exited early");
    api_handle.abort();
}

#[tokio::test]
async fn test_start_fails_on_invalid_configuration() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.stages.indexing.stats_selector = "[[".into();

    let err = start_api_server(Arc::new(config)).await.unwrap_err();
    assert!(matches!(err, Error::Config { .. }));
}

#[tokio::test]
async fn test_cors_enabled() {
    let (app, _dir) = test_router();

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_restricted_origins() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.server.cors_origins = vec!["http://allowed.example".into()];
    let app = router_for(config);

    let allowed = Request::builder()
        .uri("/health")
        .header("Origin", "http://allowed.example")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://allowed.example"
    );

    let denied = Request::builder()
        .uri("/health")
        .header("Origin", "http://other.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(denied).await.unwrap();
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let dir = tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.server.cors_enabled = false;
    let app = router_for(config);

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

#[tokio::test]
async fn test_static_dir_served_as_fallback() {
    let dir = tempdir().unwrap();
    let public = dir.path().join("public");
    std::fs::create_dir_all(&public).unwrap();
    std::fs::write(public.join("index.html"), "<h1>linkindex</h1>").unwrap();

    let mut config = test_config(&dir.path().join("output"));
    config.server.static_dir = Some(public);
    let app = router_for(config);

    let response = app.clone().oneshot(get_request("/index.html")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"<h1>linkindex</h1>");

    // API routes still win over the fallback
    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_without_static_dir_is_404() {
    let (app, _dir) = test_router();
    let response = app.oneshot(get_request("/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

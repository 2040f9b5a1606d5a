//! Common test utilities for linkindex end-to-end tests
//!
//! Starts the real router on an ephemeral port with collaborators that never
//! leave the machine.

#![allow(dead_code)]

use async_trait::async_trait;
use linkindex::stages::{IndexChecker, IndexVerdict, Pinger, Shortener, TrafficProbe};
use linkindex::{Config, Error, Pipeline, StageSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use url::Url;

/// Host every stub collaborator treats as unreachable
pub const DOWN_HOST: &str = "down.example";

/// Accepts every URL except those on [`DOWN_HOST`]
pub struct LocalPinger;

#[async_trait]
impl Pinger for LocalPinger {
    async fn ping(&self, url: &Url, _title: &str) -> linkindex::Result<u16> {
        if url.host_str() == Some(DOWN_HOST) {
            return Err(Error::ExternalService {
                service: "local-ping".into(),
                message: "HTTP 503".into(),
            });
        }
        Ok(200)
    }

    fn name(&self) -> &str {
        "local-ping"
    }
}

/// Shortens to `https://s.example/<n>` where n is the path length
pub struct LocalShortener;

#[async_trait]
impl Shortener for LocalShortener {
    async fn shorten(&self, url: &Url) -> linkindex::Result<String> {
        Ok(format!("https://s.example/{}", url.path().len()))
    }

    fn name(&self) -> &str {
        "local-short"
    }
}

/// Visits succeed except for [`DOWN_HOST`]
pub struct LocalProbe;

#[async_trait]
impl TrafficProbe for LocalProbe {
    async fn visit(&self, url: &Url, _user_agent: &str) -> linkindex::Result<u16> {
        tokio::time::sleep(Duration::from_millis(5)).await;
        if url.host_str() == Some(DOWN_HOST) {
            return Err(Error::Timeout {
                service: "traffic".into(),
                after: Duration::from_millis(5),
            });
        }
        Ok(200)
    }
}

/// Every host is indexed
pub struct AlwaysIndexed;

#[async_trait]
impl IndexChecker for AlwaysIndexed {
    async fn check(&self, _url: &Url) -> linkindex::Result<IndexVerdict> {
        Ok(IndexVerdict {
            indexed: true,
            stats: "About 42 results".into(),
        })
    }

    fn name(&self) -> &str {
        "local-index"
    }
}

/// A server running on 127.0.0.1 with its own output directory
pub struct TestServer {
    /// Base URL, e.g. `http://127.0.0.1:40123`
    pub base: String,
    /// Address the listener is bound to
    pub addr: SocketAddr,
    /// Holds the output directory alive
    pub dir: TempDir,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// The artifact output directory
    pub fn output_dir(&self) -> std::path::PathBuf {
        self.dir.path().join("output")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Start a server with stub collaborators
pub async fn spawn_server() -> TestServer {
    let dir = tempfile::tempdir().expect("tempdir");

    let mut config = Config::default();
    config.output.output_dir = dir.path().join("output");
    config.stages.traffic.pacing = Duration::ZERO;
    config.stages.traffic.requests_per_url = 2;
    config.server.bind_address = "127.0.0.1:0".parse().expect("bind address");

    let stages = StageSet::from_config(&config)
        .expect("stage set")
        .with_pingers(vec![Arc::new(LocalPinger)])
        .with_shorteners(vec![Arc::new(LocalShortener)])
        .with_traffic_probe(Arc::new(LocalProbe))
        .with_index_checker(Arc::new(AlwaysIndexed));
    let pipeline = Pipeline::new(stages, config.stages.item_concurrency);

    let listener = TcpListener::bind(config.server.bind_address)
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let app = linkindex::api::create_router(pipeline, Arc::new(config));

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    TestServer {
        base: format!("http://{addr}"),
        addr,
        dir,
        handle,
    }
}

use super::*;
use crate::config::ShortenerConfig;
use crate::types::OutcomeStatus;
use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use tempfile::tempdir;
use url::Url;
use wiremock::matchers::{body_string_contains, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod ping;

/// Config with every outbound endpoint pointed at `server`
fn test_config(output: &Path, server: &MockServer) -> Config {
    let uri = server.uri();
    let mut config = Config::default();
    config.output.output_dir = output.to_path_buf();
    config.stages.request_timeout = Duration::from_secs(2);
    config.stages.ping_services = vec![format!("{uri}/RPC2"), format!("{uri}/ping")];
    config.stages.shorteners = vec![
        ShortenerConfig {
            name: "tinyurl".into(),
            kind: ShortenerKind::TinyUrl,
            endpoint: format!("{uri}/api-create.php"),
        },
        ShortenerConfig {
            name: "is.gd".into(),
            kind: ShortenerKind::IsGd,
            endpoint: format!("{uri}/create.php"),
        },
    ];
    config.stages.traffic.pacing = Duration::ZERO;
    config.stages.indexing.search_url = format!("{uri}/search");
    config
}

fn url(raw: &str) -> Url {
    Url::parse(raw).unwrap()
}

/// Publisher that always fails
struct FailingPublisher;

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(&self, _content: &str) -> crate::Result<String> {
        Err(Error::ExternalService {
            service: "broken".into(),
            message: "quota exceeded".into(),
        })
    }

    fn name(&self) -> &str {
        "broken"
    }
}

/// Probe that succeeds `ok_visits` times and then fails
struct FlakyProbe {
    ok_visits: u32,
    calls: AtomicU32,
}

#[async_trait]
impl TrafficProbe for FlakyProbe {
    async fn visit(&self, _url: &Url, _user_agent: &str) -> crate::Result<u16> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.ok_visits {
            Ok(200)
        } else {
            Err(Error::Other("connection reset".into()))
        }
    }
}

#[test]
fn escape_markup_neutralizes_html() {
    assert_eq!(
        escape_markup(r#"<a href="x">Tom & 'Jerry'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
    );
}

#[tokio::test]
async fn bounded_reports_timeout_with_service_name() {
    let result: crate::Result<()> = bounded("slow.example", Duration::from_millis(20), async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    })
    .await;

    match result {
        Err(Error::Timeout { service, after }) => {
            assert_eq!(service, "slow.example");
            assert_eq!(after, Duration::from_millis(20));
        }
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn from_config_builds_one_collaborator_per_entry() {
    let dir = tempdir().unwrap();
    let server = MockServer::start().await;
    let stages = StageSet::from_config(&test_config(dir.path(), &server)).unwrap();

    assert_eq!(stages.pingers.len(), 2);
    assert_eq!(stages.shorteners.len(), 2);
    assert_eq!(stages.publishers.len(), 2);
    assert_eq!(stages.store().root(), dir.path());
}

#[test]
fn invalid_stats_selector_is_a_config_error() {
    let mut config = Config::default();
    config.stages.indexing.stats_selector = "##".into();

    let err = StageSet::from_config(&config).unwrap_err();
    assert!(matches!(err, Error::Config { key: Some(ref k), .. } if k == "indexing.stats_selector"));
}

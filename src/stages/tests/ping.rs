use super::*;

#[tokio::test]
async fn url_succeeds_when_any_service_accepts() {
    let dir = tempdir().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/RPC2"))
        .and(header("content-type", "text/xml"))
        .and(body_string_contains("<methodName>weblogUpdates.ping</methodName>"))
        .and(body_string_contains("https://example.com/a"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let stages = StageSet::from_config(&test_config(dir.path(), &server)).unwrap();
    let outcome = stages.ping_url(&url("https://example.com/a")).await;

    assert_eq!(outcome.url, "https://example.com/a");
    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.detail, "1/2 services accepted");
    assert_eq!(outcome.services.len(), 2);
    assert_eq!(outcome.services[0].status, OutcomeStatus::Success);
    assert_eq!(outcome.services[1].status, OutcomeStatus::Error);
    assert!(outcome.services[1].detail.contains("HTTP 500"));
}

#[tokio::test]
async fn url_fails_when_every_service_rejects() {
    let dir = tempdir().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let stages = StageSet::from_config(&test_config(dir.path(), &server)).unwrap();
    let outcome = stages.ping_url(&url("https://example.com/b")).await;

    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert!(outcome.services.iter().all(|s| !s.status.is_success()));
}

#[tokio::test]
async fn slow_service_is_recorded_as_error() {
    let dir = tempdir().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/RPC2"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let mut config = test_config(dir.path(), &server);
    config.stages.request_timeout = Duration::from_millis(200);
    let stages = StageSet::from_config(&config).unwrap();

    let outcome = stages.ping_url(&url("https://example.com/c")).await;
    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.services[0].status, OutcomeStatus::Error);
    assert_eq!(outcome.services[1].status, OutcomeStatus::Success);
}

#[tokio::test]
async fn ping_title_is_escaped_in_payload() {
    let dir = tempdir().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_string_contains("<string>Links &amp; Co</string>"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let mut config = test_config(dir.path(), &server);
    config.stages.ping_title = "Links & Co".into();
    let stages = StageSet::from_config(&config).unwrap();

    let outcome = stages.ping_url(&url("https://example.com/")).await;
    assert_eq!(outcome.detail, "2/2 services accepted");
}

#[tokio::test]
async fn no_configured_services_is_an_error_outcome() {
    let dir = tempdir().unwrap();
    let server = MockServer::start().await;
    let stages = StageSet::from_config(&test_config(dir.path(), &server))
        .unwrap()
        .with_pingers(Vec::new());

    let outcome = stages.ping_url(&url("https://example.com/")).await;
    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert_eq!(outcome.detail, "no ping services configured");
}

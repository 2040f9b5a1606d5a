use super::*;
use crate::types::ArtifactFile;

#[tokio::test]
async fn test_list_files_empty_before_first_run() {
    let (app, _dir) = test_router();

    let response = app.oneshot(get_request("/files")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_files_after_run() {
    let (app, _dir) = test_router();

    let response = app
        .clone()
        .oneshot(post_json("/process", r#"{"urls":["https://a.example"]}"#))
        .await
        .unwrap();
    collect_events(response).await;

    let response = app.oneshot(get_request("/files")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let files: Vec<ArtifactFile> =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    let mut names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, ["backlinks.html", "links.xml"]);
    assert!(files.iter().all(|f| f.size > 0));
}

#[tokio::test]
async fn test_list_files_wire_shape() {
    let (app, dir) = test_router();
    let output = dir.path().join("output");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("links.xml"), b"<rss/>").unwrap();

    let response = app.oneshot(get_request("/files")).await.unwrap();
    let json = body_json(response).await;

    let entry = &json[0];
    assert_eq!(entry["name"], "links.xml");
    assert_eq!(entry["size"], 6);
    assert!(entry["created"].is_string());
    assert!(entry["modified"].is_string());
}

#[tokio::test]
async fn test_download_streams_attachment() {
    let (app, dir) = test_router();
    let output = dir.path().join("output");
    std::fs::create_dir_all(&output).unwrap();
    std::fs::write(output.join("backlinks.html"), b"<html>links</html>").unwrap();

    let response = app
        .oneshot(get_request("/download/backlinks.html"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"backlinks.html\""
    );
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(body_bytes(response).await, b"<html>links</html>");
}

#[tokio::test]
async fn test_download_missing_is_404() {
    let (app, _dir) = test_router();

    let response = app
        .oneshot(get_request("/download/links.xml"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("links.xml"));
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let (app, dir) = test_router();
    std::fs::create_dir_all(dir.path().join("output")).unwrap();
    std::fs::write(dir.path().join("secret.txt"), b"secret").unwrap();

    for uri in [
        "/download/..%2Fsecret.txt",
        "/download/..",
        "/download/..%5Csecret.txt",
    ] {
        let response = app.clone().oneshot(get_request(uri)).await.unwrap();
        assert!(
            response.status().is_client_error(),
            "{uri} answered {}",
            response.status()
        );
        assert_ne!(body_bytes(response).await, b"secret");
    }
}

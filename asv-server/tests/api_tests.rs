//! Integration tests for the asv-server HTTP API
//!
//! Uses tower::ServiceExt::oneshot to test routes directly without binding a port.

use asv_core::model::{AdminConfig, Theme};
use asv_server::{api::create_router, config::ServerConfig, state::AppState};
use axum::body::Body;
use http_body_util::BodyExt;
use hyper::Request;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "asv-test-boundary";

/// Helper: fresh state rooted in a temporary data directory
fn app_with_state() -> (axum::Router, AppState, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(ServerConfig::with_data_dir(dir.path()));
    std::fs::create_dir_all(state.config.uploads_dir()).unwrap();
    let router = create_router(state.clone());
    (router, state, dir)
}

/// Helper: collect response body into bytes
async fn body_bytes(body: Body) -> Vec<u8> {
    let collected = body.collect().await.unwrap();
    collected.to_bytes().to_vec()
}

/// Helper: collect response body into JSON
async fn body_json(body: Body) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

/// Helper: log in directly through the registry
async fn token(state: &AppState) -> String {
    state.sessions.issue().await
}

fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    json: serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(json.to_string())).unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

/// Helper: multipart body with an optional `type` field and one file
fn multipart(kind: Option<&str>, file_name: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(kind) = kind {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"type\"\r\n\r\n{kind}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
        .body(Body::from(body))
        .unwrap()
}

// ==================== GET / ====================

#[tokio::test]
async fn test_get_root_reports_ready() {
    let (app, _state, _dir) = app_with_state();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "ASV Backend Ready");
}

// ==================== POST /api/login ====================

#[tokio::test]
async fn test_login_success_issues_token() {
    let (app, state, _dir) = app_with_state();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            serde_json::json!({"username": "admin", "password": "asv2025"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = body_json(response.into_body()).await;
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());
    assert!(state.sessions.is_valid(token).await);
}

#[tokio::test]
async fn test_login_wrong_password_returns_401() {
    let (app, state, _dir) = app_with_state();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            serde_json::json!({"username": "admin", "password": "nope"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["reason"], "invalid_credentials");
    assert_eq!(body["detail"], "Invalid username or password.");
    assert!(state.sessions.is_empty().await);
}

#[tokio::test]
async fn test_login_missing_fields_returns_400() {
    let (app, _state, _dir) = app_with_state();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/login",
            None,
            serde_json::json!({"username": "admin"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["reason"], "missing_fields");
}

// ==================== POST /api/logout ====================

#[tokio::test]
async fn test_logout_revokes_token() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;

    let response = app
        .clone()
        .oneshot(authed("POST", "/api/logout", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    assert!(!state.sessions.is_valid(&token).await);

    // The revoked token no longer works
    let response = app
        .oneshot(authed("POST", "/api/logout", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

// ==================== /api/admin ====================

#[tokio::test]
async fn test_get_admin_state_defaults() {
    let (app, _state, _dir) = app_with_state();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/admin/state")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = body_json(response.into_body()).await;
    assert_eq!(
        body,
        serde_json::json!({
            "theme": "light",
            "defaultTrack": "A",
            "cv_counts": {"red": 0, "green": 0, "track": 0}
        })
    );
}

#[tokio::test]
async fn test_update_without_token_returns_401() {
    let (app, state, _dir) = app_with_state();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/update",
            None,
            serde_json::json!({"theme": "dark"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["reason"], "unauthorized");
    assert_eq!(state.admin.read().await.theme, Theme::Light);
}

#[tokio::test]
async fn test_update_with_unknown_token_returns_401() {
    let (app, _state, _dir) = app_with_state();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/update",
            Some("not-a-real-token"),
            serde_json::json!({"theme": "dark"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_update_merges_and_persists() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/update",
            Some(&token),
            serde_json::json!({
                "defaultTrack": "b",
                "cv_counts": {"red": 3, "green": 2, "track": 1},
                "unknown": true
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["new_state"]["defaultTrack"], "B");
    assert_eq!(body["new_state"]["theme"], "light", "absent fields are kept");
    assert_eq!(body["new_state"]["cv_counts"]["red"], 3);

    // Persisted to disk and reloaded by a fresh state
    let saved = std::fs::read_to_string(state.config.state_file()).unwrap();
    let saved: AdminConfig = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved.default_track.letter(), 'B');

    let reloaded = AppState::new(ServerConfig::with_data_dir(state.config.data_dir()));
    assert_eq!(*reloaded.admin.read().await, saved);
}

#[tokio::test]
async fn test_update_with_invalid_value_returns_400() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/admin/update",
            Some(&token),
            serde_json::json!({"theme": "purple"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["reason"], "invalid_body");
    assert_eq!(*state.admin.read().await, AdminConfig::default());
}

// ==================== POST /api/upload ====================

#[tokio::test]
async fn test_upload_image_then_list() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;

    let response = app
        .clone()
        .oneshot(upload_request(&token, multipart(None, "buoy.png", b"\x89PNG")))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["filename"], "buoy.png");
    assert!(state.config.uploads_dir().join("buoy.png").exists());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/images")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response.into_body()).await;
    assert_eq!(body["images"], serde_json::json!(["buoy.png"]));
}

#[tokio::test]
async fn test_upload_route_is_served_from_uploads() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;
    let route = b"latitude,longitude,type,round,rotation\n-7.1,110.1,red,1,0\n";

    let response = app
        .clone()
        .oneshot(upload_request(&token, multipart(Some("csv"), "lintasan_a.csv", route)))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/uploads/lintasan_a.csv")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(body_bytes(response.into_body()).await, route.to_vec());
}

#[tokio::test]
async fn test_upload_requires_token() {
    let (app, state, _dir) = app_with_state();

    let response = app
        .oneshot(upload_request("bogus", multipart(None, "buoy.png", b"x")))
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert!(!state.config.uploads_dir().join("buoy.png").exists());
}

#[tokio::test]
async fn test_upload_rejects_path_traversal() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;

    let response = app
        .oneshot(upload_request(&token, multipart(None, "../evil.png", b"x")))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["reason"], "invalid_filename");
}

#[tokio::test]
async fn test_upload_rejects_mismatched_extension() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;

    let response = app
        .oneshot(upload_request(&token, multipart(Some("csv"), "photo.png", b"x")))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["reason"], "unsupported_type");
}

#[tokio::test]
async fn test_upload_rejects_unknown_type() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;

    let response = app
        .oneshot(upload_request(&token, multipart(Some("video"), "clip.png", b"x")))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["reason"], "invalid_type");
}

// ==================== /api/images ====================

#[tokio::test]
async fn test_list_images_ignores_other_files() {
    let (app, state, _dir) = app_with_state();
    let uploads = state.config.uploads_dir();
    std::fs::write(uploads.join("a.jpg"), b"x").unwrap();
    std::fs::write(uploads.join("lintasan_a.csv"), b"x").unwrap();
    std::fs::write(uploads.join("admin_state.json"), b"{}").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/images")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response.into_body()).await;
    assert_eq!(body["images"], serde_json::json!(["a.jpg"]));
}

#[tokio::test]
async fn test_delete_image() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;
    let uploads = state.config.uploads_dir();
    std::fs::write(uploads.join("a.png"), b"x").unwrap();

    let response = app
        .clone()
        .oneshot(authed("DELETE", "/api/images/a.png", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["message"], "a.png deleted");
    assert!(!uploads.join("a.png").exists());

    // Deleting again reports 404
    let response = app
        .oneshot(authed("DELETE", "/api/images/a.png", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["detail"], "File not found");
}

#[tokio::test]
async fn test_delete_refuses_non_image_files() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;
    let uploads = state.config.uploads_dir();
    std::fs::write(uploads.join("lintasan_a.csv"), b"x").unwrap();

    let response = app
        .oneshot(authed("DELETE", "/api/images/lintasan_a.csv", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
    assert!(uploads.join("lintasan_a.csv").exists());
}

#[tokio::test]
async fn test_delete_without_token_returns_401() {
    let (app, state, _dir) = app_with_state();
    std::fs::write(state.config.uploads_dir().join("a.png"), b"x").unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/images/a.png")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert!(state.config.uploads_dir().join("a.png").exists());
}

#[tokio::test]
async fn test_clear_images_counts_deleted() {
    let (app, state, _dir) = app_with_state();
    let token = token(&state).await;
    let uploads = state.config.uploads_dir();
    for name in ["a.png", "b.jpg", "c.jpeg", "lintasan_a.csv"] {
        std::fs::write(uploads.join(name), b"x").unwrap();
    }

    let response = app
        .oneshot(authed("DELETE", "/api/images/all/clear", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = body_json(response.into_body()).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["deleted_count"], 3);
    assert!(uploads.join("lintasan_a.csv").exists());
}

// ==================== GET /api/telemetry/stream ====================

#[tokio::test]
async fn test_telemetry_stream_is_event_stream() {
    let (app, _state, _dir) = app_with_state();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/telemetry/stream")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(
        content_type.contains("text/event-stream"),
        "Expected text/event-stream content-type, got: {}",
        content_type
    );
}

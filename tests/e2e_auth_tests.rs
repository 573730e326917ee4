//! End-to-end tests for authentication endpoints
//!
//! Tests login, logout, session management, and authentication requirements.

mod common;

use common::{
    TestClient, TestServer, ADMIN_PASS, ADMIN_USER, EDITOR_PASS, EDITOR_USER, VIEWER_USER,
};
use reqwest::{header::SET_COOKIE, StatusCode};
use serde_json::Value;

#[tokio::test]
async fn test_login_with_valid_credentials() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(EDITOR_USER, EDITOR_PASS).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session_token="));
    assert!(cookie.contains("HttpOnly"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["token"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_login_with_invalid_password() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login(EDITOR_USER, "wrong_password").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_with_nonexistent_user() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.login("nonexistent_user", "password").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_reports_user_and_permissions() {
    let server = TestServer::spawn().await;

    let editor = TestClient::authenticated_editor(server.base_url.clone()).await;
    let response = editor.get_session().await;
    assert_eq!(response.status(), StatusCode::OK);
    let session: Value = response.json().await.unwrap();
    assert_eq!(session["user_handle"], EDITOR_USER);
    assert_eq!(session["permissions"], serde_json::json!(["EditJobs"]));

    let viewer = TestClient::authenticated_viewer(server.base_url.clone()).await;
    let session: Value = viewer.get_session().await.json().await.unwrap();
    assert_eq!(session["user_handle"], VIEWER_USER);
    assert_eq!(session["permissions"], serde_json::json!([]));

    let client = TestClient::new(server.base_url.clone());
    client.login(ADMIN_USER, ADMIN_PASS).await;
    let session: Value = client.get_session().await.json().await.unwrap();
    assert_eq!(
        session["permissions"],
        serde_json::json!(["EditJobs", "ManageUsers"])
    );
}

#[tokio::test]
async fn test_logout_clears_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::authenticated_editor(server.base_url.clone()).await;

    // Verify we can access an editor-only endpoint
    let response = client.create_form().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = client.create_form().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = client.get_session().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_without_session() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.logout().await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_authenticates() {
    let server = TestServer::spawn().await;
    let login_client = TestClient::new(server.base_url.clone());
    let body: Value = login_client
        .login(EDITOR_USER, EDITOR_PASS)
        .await
        .json()
        .await
        .unwrap();
    let token = body["token"].as_str().unwrap();

    // fresh client, no cookie
    let client = TestClient::new(server.base_url.clone());
    let response = client
        .client
        .get(format!("{}/jobs/create", server.base_url))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .client
        .get(format!("{}/jobs/create", server.base_url))
        .header("Authorization", "Bearer not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_home_reports_session_presence() {
    let server = TestServer::spawn().await;

    let anonymous = TestClient::new(server.base_url.clone());
    let stats: Value = anonymous.get_home().await.json().await.unwrap();
    assert!(stats["session_token"].is_null());
    assert!(stats["uptime"].is_string());
    assert_eq!(stats["version"], env!("CARGO_PKG_VERSION"));

    let editor = TestClient::authenticated_editor(server.base_url.clone()).await;
    let stats: Value = editor.get_home().await.json().await.unwrap();
    assert!(stats["session_token"].is_string());
}

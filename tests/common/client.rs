//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all jobs-server endpoints.
//!
//! When API routes or request formats change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client with cookie-based session management
///
/// Redirects are not followed, so submissions can be checked for their
/// `303 See Other` answer.
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .redirect(reqwest::redirect::Policy::none())
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    async fn authenticated_as(base_url: String, handle: &str, password: &str) -> Self {
        let client = Self::new(base_url);

        let response = client.login(handle, password).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Authentication of {} failed: {:?}",
            handle,
            response.text().await
        );

        client
    }

    /// Creates a client pre-authenticated as a user allowed to edit jobs
    ///
    /// # Panics
    ///
    /// Panics if authentication fails (indicates test infrastructure problem).
    pub async fn authenticated_editor(base_url: String) -> Self {
        Self::authenticated_as(base_url, EDITOR_USER, EDITOR_PASS).await
    }

    /// Creates a client pre-authenticated as a read-only user
    pub async fn authenticated_viewer(base_url: String) -> Self {
        Self::authenticated_as(base_url, VIEWER_USER, VIEWER_PASS).await
    }

    /// Creates a client pre-authenticated as an admin user
    pub async fn authenticated_admin(base_url: String) -> Self {
        Self::authenticated_as(base_url, ADMIN_USER, ADMIN_PASS).await
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /v1/auth/login
    pub async fn login(&self, handle: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/v1/auth/login", self.base_url))
            .json(&json!({
                "user_handle": handle,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// GET /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .get(format!("{}/v1/auth/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    /// GET /v1/auth/session
    pub async fn get_session(&self) -> Response {
        self.client
            .get(format!("{}/v1/auth/session", self.base_url))
            .send()
            .await
            .expect("Session request failed")
    }

    /// GET /v1/auth/users
    pub async fn list_users(&self) -> Response {
        self.get("/v1/auth/users").await
    }

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // Job Endpoints
    // ========================================================================

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap_or_else(|e| panic!("GET {} failed: {}", path, e))
    }

    async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .unwrap_or_else(|e| panic!("POST {} failed: {}", path, e))
    }

    /// GET /jobs
    pub async fn list_jobs(&self) -> Response {
        self.get("/jobs").await
    }

    /// GET /jobs, decoded
    pub async fn list_jobs_json(&self) -> Vec<Value> {
        let response = self.list_jobs().await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.json().await.expect("Invalid jobs list")
    }

    /// GET /jobs/search-form
    pub async fn search_form(&self) -> Response {
        self.get("/jobs/search-form").await
    }

    /// GET /jobs/search?phrase=...
    pub async fn search_jobs(&self, phrase: &str) -> Response {
        self.client
            .get(format!("{}/jobs/search", self.base_url))
            .query(&[("phrase", phrase)])
            .send()
            .await
            .expect("Search request failed")
    }

    /// GET /jobs/{id}
    pub async fn get_job(&self, id: &str) -> Response {
        self.get(&format!("/jobs/{}", id)).await
    }

    /// GET /jobs/create
    pub async fn create_form(&self) -> Response {
        self.get("/jobs/create").await
    }

    /// POST /jobs/create
    pub async fn create_job(&self, question: &str, answer: &str) -> Response {
        self.post_json(
            "/jobs/create",
            &json!({ "question": question, "answer": answer }),
        )
        .await
    }

    /// POST /jobs/create with an arbitrary body
    pub async fn create_job_raw(&self, body: &Value) -> Response {
        self.post_json("/jobs/create", body).await
    }

    /// GET /jobs/{id}/edit
    pub async fn edit_form(&self, id: &str) -> Response {
        self.get(&format!("/jobs/{}/edit", id)).await
    }

    /// POST /jobs/{id}/edit
    pub async fn edit_job(&self, id: &str, body: &Value) -> Response {
        self.post_json(&format!("/jobs/{}/edit", id), body).await
    }

    /// GET /jobs/{id}/delete
    pub async fn delete_form(&self, id: &str) -> Response {
        self.get(&format!("/jobs/{}/delete", id)).await
    }

    /// POST /jobs/{id}/delete
    pub async fn delete_job(&self, id: &str) -> Response {
        self.client
            .post(format!("{}/jobs/{}/delete", self.base_url, id))
            .send()
            .await
            .expect("Delete request failed")
    }
}

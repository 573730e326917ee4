//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test data changes (user credentials, sample jobs, etc.),
//! update only this file.

#![allow(dead_code)]

// ============================================================================
// Test User Credentials
// ============================================================================

/// Editor test user handle, may create, edit and delete jobs
pub const EDITOR_USER: &str = "editor";

/// Editor test user password
pub const EDITOR_PASS: &str = "editorpass123";

/// Viewer test user handle, read only
pub const VIEWER_USER: &str = "viewer";

/// Viewer test user password
pub const VIEWER_PASS: &str = "viewerpass123";

/// Admin test user handle
pub const ADMIN_USER: &str = "admin";

/// Admin test user password
pub const ADMIN_PASS: &str = "adminpass123";

// ============================================================================
// Sample Jobs
// ============================================================================

pub const QUESTION_1: &str = "Q1";
pub const ANSWER_1: &str = "A1";

pub const QUESTION_2: &str = "What is the capital of Italy?";
pub const ANSWER_2: &str = "Rome";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the test server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

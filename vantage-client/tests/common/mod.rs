//! Shared fixtures for client integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use wiremock::MockServer;

use vantage_client::AuthServiceConfig;
use vantage_identity::{CookieAttributes, CookieSink, EdgeCookie};

/// Cookie sink that records the projected cookie in memory.
#[derive(Default)]
pub struct RecordingCookieSink {
    current: Mutex<Option<EdgeCookie>>,
}

impl RecordingCookieSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

impl CookieSink for RecordingCookieSink {
    fn write(&self, cookie: &EdgeCookie, _attributes: &CookieAttributes) {
        *self.current.lock().unwrap() = Some(cookie.clone());
    }

    fn clear(&self) {
        *self.current.lock().unwrap() = None;
    }

    fn current(&self) -> Option<EdgeCookie> {
        self.current.lock().unwrap().clone()
    }
}

/// Config pointing at a mock server.
pub fn test_config(server: &MockServer) -> AuthServiceConfig {
    AuthServiceConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        cookie_secure: false,
    }
}

/// Session payload JSON as the backend emits it.
pub fn session_json(access_token: &str, refresh_token: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access_token,
        "refresh_token": refresh_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "expires_at": 0
    })
}

/// User payload JSON as the backend emits it.
pub fn user_json(id: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "email": email,
        "full_name": "Test User",
        "created_at": "2026-01-15T10:00:00Z"
    })
}

/// Combined login/register response JSON.
pub fn auth_user_json(access_token: &str, refresh_token: &str, email: &str) -> serde_json::Value {
    serde_json::json!({
        "user": user_json("018f4d9e-5b7a-7c3d-9e2f-1a2b3c4d5e6f", email),
        "session": session_json(access_token, refresh_token)
    })
}

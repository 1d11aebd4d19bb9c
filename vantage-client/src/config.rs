//! Service configuration for the identity backend client.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults for local development.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use vantage_identity::{AuthError, AuthResult};

/// Configuration for the identity backend connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthServiceConfig {
    /// Base URL of the identity backend (e.g. "https://api.vantage.io").
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Whether the session cookie carries the Secure attribute.
    ///
    /// Enabled in production; local development over plain HTTP leaves it
    /// off so the cookie is actually stored.
    pub cookie_secure: bool,
}

impl Default for AuthServiceConfig {
    /// Returns default configuration suitable for local development.
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            cookie_secure: false,
        }
    }
}

impl AuthServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `VANTAGE_API_URL`: identity backend URL (default: http://localhost:8000)
    /// - `VANTAGE_API_TIMEOUT_SECS`: request timeout in seconds (default: 30)
    /// - `VANTAGE_COOKIE_SECURE`: whether the session cookie is Secure (default: false)
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            base_url: std::env::var("VANTAGE_API_URL").unwrap_or(default.base_url),
            timeout_secs: std::env::var("VANTAGE_API_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.timeout_secs),
            cookie_secure: std::env::var("VANTAGE_COOKIE_SECURE")
                .map(|s| s == "true" || s == "1")
                .unwrap_or(default.cookie_secure),
        }
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build a full URL by appending a path to the base URL.
    pub fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Validate that the configuration is safe for production.
    ///
    /// Production requires HTTPS transport and a Secure session cookie.
    pub fn validate_for_production(&self) -> AuthResult<()> {
        if !self.base_url.starts_with("https://") {
            return Err(AuthError::Config(
                "production requires an https:// base URL".to_string(),
            ));
        }
        if !self.cookie_secure {
            return Err(AuthError::Config(
                "production requires cookie_secure = true".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthServiceConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn test_url_join() {
        let config = AuthServiceConfig {
            base_url: "https://api.example.com".to_string(),
            ..Default::default()
        };

        assert_eq!(config.url("/auth/login"), "https://api.example.com/auth/login");
        assert_eq!(config.url("auth/login"), "https://api.example.com/auth/login");
    }

    #[test]
    fn test_url_join_trailing_slash() {
        let config = AuthServiceConfig {
            base_url: "https://api.example.com/".to_string(),
            ..Default::default()
        };

        assert_eq!(config.url("/auth/me"), "https://api.example.com/auth/me");
    }

    #[test]
    fn test_validate_for_production() {
        let mut config = AuthServiceConfig::default();
        assert!(config.validate_for_production().is_err());

        config.base_url = "https://api.example.com".to_string();
        assert!(config.validate_for_production().is_err());

        config.cookie_secure = true;
        assert!(config.validate_for_production().is_ok());
    }
}

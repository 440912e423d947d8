//! OAuth and API endpoint configuration.
//!
//! Provides the `AuthConfiguration` struct shared by the auth helper, the
//! token exchange and the authenticated API services.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::util::{is_http_url, normalize_text_option};
use crate::{Error, Result};

pub const DEFAULT_AUTHORIZE_URL: &str = "https://unsplash.com/oauth/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://unsplash.com/oauth/token";
pub const DEFAULT_API_BASE_URL: &str = "https://api.unsplash.com/";
pub const DEFAULT_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";
/// Space separated; form encoding renders it as `public+read_user+write_likes`.
pub const DEFAULT_ACCESS_SCOPE: &str = "public read_user write_likes";

/// Client credentials and endpoints for the photo API.
///
/// `secret_key` is required by the authorization-code exchange and is never
/// printed by `Debug`.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthConfiguration {
    pub access_key: String,
    pub secret_key: String,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_access_scope")]
    pub access_scope: String,
    #[serde(default = "default_authorize_url")]
    pub authorize_url: String,
    #[serde(default = "default_token_url")]
    pub token_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl AuthConfiguration {
    /// Configuration for the public Unsplash endpoints.
    pub fn standard(access_key: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            redirect_uri: default_redirect_uri(),
            access_scope: default_access_scope(),
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            api_base_url: default_api_base_url(),
        }
    }

    /// Parse a JSON configuration document.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)
            .map_err(|error| Error::InvalidRequest(format!("invalid configuration: {error}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot produce valid requests.
    pub fn validate(&self) -> Result<()> {
        require_value(&self.access_key, "access_key")?;
        require_value(&self.secret_key, "secret_key")?;
        require_value(&self.redirect_uri, "redirect_uri")?;
        require_http_url(&self.authorize_url, "authorize_url")?;
        require_http_url(&self.token_url, "token_url")?;
        require_http_url(&self.api_base_url, "api_base_url")?;
        Ok(())
    }

    /// API base URL with a trailing slash so relative joins keep the prefix.
    pub fn api_base(&self) -> Result<Url> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/');
        Ok(Url::parse(&format!("{trimmed}/"))?)
    }

    /// Return a copy pointing every endpoint at `base`.
    ///
    /// Used by hosts that talk to a proxy or a local stub server.
    #[must_use]
    pub fn with_api_base_url(mut self, base: impl Into<String>) -> Self {
        if let Some(base) = normalize_text_option(Some(base.into())) {
            self.api_base_url = base;
        }
        self
    }
}

impl fmt::Debug for AuthConfiguration {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AuthConfiguration")
            .field("access_key", &self.access_key)
            .field("secret_key", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("access_scope", &self.access_scope)
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Private
// ---------------------------------------------------------------------------

fn default_redirect_uri() -> String {
    DEFAULT_REDIRECT_URI.to_string()
}

fn default_access_scope() -> String {
    DEFAULT_ACCESS_SCOPE.to_string()
}

fn default_authorize_url() -> String {
    DEFAULT_AUTHORIZE_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn require_value(raw: &str, field: &str) -> Result<()> {
    if raw.trim().is_empty() {
        return Err(Error::InvalidRequest(format!(
            "configuration field '{field}' is required"
        )));
    }
    Ok(())
}

fn require_http_url(raw: &str, field: &str) -> Result<()> {
    require_value(raw, field)?;
    if is_http_url(raw.trim()) {
        Ok(())
    } else {
        Err(Error::InvalidRequest(format!(
            "configuration field '{field}' must include http:// or https://"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_configuration_uses_unsplash_endpoints() {
        let config = AuthConfiguration::standard("access", "secret");
        assert_eq!(config.authorize_url, DEFAULT_AUTHORIZE_URL);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.redirect_uri, "urn:ietf:wg:oauth:2.0:oob");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_missing_keys() {
        let config = AuthConfiguration::standard("  ", "secret");
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("access_key"));
    }

    #[test]
    fn validate_rejects_non_http_endpoints() {
        let mut config = AuthConfiguration::standard("access", "secret");
        config.token_url = "unsplash.com/oauth/token".to_string();
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("token_url"));
    }

    #[test]
    fn from_json_fills_defaults_and_rejects_unknown_fields() {
        let parsed = AuthConfiguration::from_json(
            r#"{ "access_key": "access", "secret_key": "secret" }"#,
        )
        .expect("minimal configuration should parse");
        assert_eq!(parsed.api_base_url, DEFAULT_API_BASE_URL);

        let error = AuthConfiguration::from_json(
            r#"{ "access_key": "a", "secret_key": "s", "unexpected": true }"#,
        )
        .unwrap_err();
        assert!(error.to_string().contains("unknown field"));
    }

    #[test]
    fn api_base_always_ends_with_slash() {
        let config = AuthConfiguration::standard("a", "s").with_api_base_url("http://localhost:8080/v1");
        assert_eq!(config.api_base().unwrap().as_str(), "http://localhost:8080/v1/");
    }

    #[test]
    fn debug_redacts_secret_key() {
        let config = AuthConfiguration::standard("access", "very-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}

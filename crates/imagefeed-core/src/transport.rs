//! HTTP transport seam shared by the API services.
//!
//! Services build an [`ApiRequest`] and decode the [`ApiResponse`] themselves;
//! the transport only moves bytes. Production code uses [`ReqwestTransport`].

use std::fmt;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::auth::Token;
use crate::util::compact_text;
use crate::{Error, NetworkFailure, Result};

/// A single outgoing API call.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub bearer: Option<Token>,
}

impl ApiRequest {
    pub const fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            bearer: None,
        }
    }

    #[must_use]
    pub fn with_bearer(mut self, token: Token) -> Self {
        self.bearer = Some(token);
        self
    }

    /// Value of the first query parameter named `name`.
    pub fn query_value(&self, name: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url.path())
            .field("bearer", &self.bearer.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Raw response returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Fail with [`NetworkFailure::Status`] unless the status is 2xx.
    pub fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Network(NetworkFailure::Status {
                status: self.status,
                message: parse_api_error(self.status, &self.body),
            }))
        }
    }

    /// Check the status, then decode the body against `T`.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let response = self.ensure_success()?;
        Ok(serde_json::from_str(&response.body)?)
    }
}

/// Moves a request to the server and returns the raw response.
///
/// Implementations must not interpret status codes; a non-2xx response is
/// still `Ok`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, NetworkFailure>;
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|error| Error::InvalidRequest(format!("failed to build HTTP client: {error}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> std::result::Result<ApiResponse, NetworkFailure> {
        tracing::debug!("{} {}", request.method, request.url.path());

        let mut builder = self
            .client
            .request(request.method, request.url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|error| NetworkFailure::Transport(error.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|error| NetworkFailure::Transport(error.to_string()))?;
        Ok(ApiResponse { status, body })
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    error_description: Option<String>,
    #[serde(default)]
    errors: Vec<String>,
}

/// Condense an error body into `"<message> (<status>)"`.
pub fn parse_api_error(status: u16, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        let message = payload
            .error_description
            .or(payload.error)
            .or_else(|| (!payload.errors.is_empty()).then(|| payload.errors.join(", ")));
        if let Some(message) = message {
            return format!("{} ({status})", message.trim());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("{trimmed} ({status})")
    }
}

// Generic authenticated JSON HTTP client
//
// One client is built per invocation from a ConnectionConfig; nothing is
// pooled or cached across invocations. Failures propagate immediately - no
// retries, no backoff.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::output::errors::HashictlError;

/// Connection parameters for one remote service, supplied per invocation
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Base URL of the service, e.g. "https://consul.example.com:8501"
    pub base_url: String,

    /// Bearer credential for privileged operations
    pub token: Option<String>,

    /// Verify TLS certificates (default: true; disabling is an explicit,
    /// discouraged opt-in)
    pub validate_certs: bool,

    /// Per-request network timeout
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        ConnectionConfig {
            base_url: base_url.into(),
            token: None,
            validate_certs: true,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_validate_certs(mut self, validate: bool) -> Self {
        self.validate_certs = validate;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Thin JSON-over-HTTP wrapper used by every service API
pub struct HttpClient {
    inner: reqwest::Client,
    config: ConnectionConfig,
}

impl HttpClient {
    pub fn new(config: ConnectionConfig) -> Result<Self, HashictlError> {
        let mut builder = reqwest::Client::builder().timeout(config.timeout);

        if !config.validate_certs {
            warn!("TLS certificate verification is disabled for {}", config.base_url);
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(HttpClient {
            inner: builder.build()?,
            config,
        })
    }

    /// Issue one request and decode the JSON response.
    ///
    /// Non-success statuses become `Remote` errors carrying the status code
    /// and response body. A success with an empty body decodes to `None`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Option<Value>, HashictlError> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );

        debug!(%method, %url, "issuing request");

        let mut request = self.inner.request(method, &url);

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            // sets Content-Type: application/json
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(HashictlError::Remote {
                status: status.as_u16(),
                message: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(None);
        }

        let decoded = serde_json::from_str(&text).map_err(|e| HashictlError::Remote {
            status: status.as_u16(),
            message: format!("response body is not valid JSON: {}", e),
        })?;

        Ok(Some(decoded))
    }

    /// GET; a non-success status is an error, including 404
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<Value>, HashictlError> {
        self.request(Method::GET, path, query, None).await
    }

    /// GET where the resource may legitimately not exist: 404 maps to None
    pub async fn get_or_none(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<Value>, HashictlError> {
        match self.request(Method::GET, path, query, None).await {
            Ok(value) => Ok(value),
            Err(HashictlError::Remote { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn put(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &Value,
    ) -> Result<Option<Value>, HashictlError> {
        self.request(Method::PUT, path, query, Some(body)).await
    }

    pub async fn post(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &Value,
    ) -> Result<Option<Value>, HashictlError> {
        self.request(Method::POST, path, query, Some(body)).await
    }

    pub async fn delete(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<Value>, HashictlError> {
        self.request(Method::DELETE, path, query, None).await
    }
}

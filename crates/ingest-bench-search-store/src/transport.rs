// crates/ingest-bench-search-store/src/transport.rs
// ============================================================================
// Module: Search Transport
// Description: Minimal HTTP seam for the search-store REST API.
// Purpose: Send JSON and NDJSON requests through reqwest or a test double.
// Dependencies: reqwest, serde_json
// ============================================================================

//! ## Overview
//! [`SearchTransport`] sends one [`SearchRequest`] and returns the status and
//! parsed body. Status interpretation (throttling, oversize payloads, error
//! objects) belongs to the callers, so the transport only fails when nothing
//! came back.
//!
//! Security posture: the cluster URL is operator configuration; redirects are
//! not followed and basic-auth credentials are only sent to that URL.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;

use crate::config::SearchStoreConfig;
use crate::error::SearchStoreError;

/// User agent sent with every request.
const USER_AGENT: &str = "ingest-bench/0.1";

// ============================================================================
// SECTION: Requests
// ============================================================================

/// HTTP method subset used by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET.
    Get,
    /// HEAD.
    Head,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

impl Method {
    /// Returns the reqwest method.
    const fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Head => reqwest::Method::HEAD,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body.
    Empty,
    /// JSON document.
    Json(Value),
    /// Newline-delimited JSON, already terminated by a newline.
    NdJson(String),
}

/// One request relative to the cluster URL.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    /// HTTP method.
    pub method: Method,
    /// Path and query string without a leading slash.
    pub path: String,
    /// Request body.
    pub body: RequestBody,
}

impl SearchRequest {
    /// Creates a request without a body.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
        }
    }

    /// Creates a request with a JSON body.
    #[must_use]
    pub fn json(method: Method, path: impl Into<String>, body: Value) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Json(body),
        }
    }
}

/// Response status and parsed body.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Parsed JSON body; `None` when empty or not JSON.
    pub body: Option<Value>,
}

impl SearchResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Sends requests to the search cluster.
pub trait SearchTransport: Send + Sync {
    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError::Transport`] only when no response was
    /// received; HTTP error statuses are returned as responses.
    fn send(&self, request: &SearchRequest) -> Result<SearchResponse, SearchStoreError>;
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Blocking reqwest transport.
pub struct HttpSearchTransport {
    /// HTTP client.
    client: Client,
    /// Cluster URL without a trailing slash.
    base_url: String,
    /// Basic-auth credentials.
    credentials: Option<(String, String)>,
}

impl HttpSearchTransport {
    /// Builds a transport from adapter settings.
    ///
    /// # Errors
    ///
    /// Returns [`SearchStoreError`] when the settings are invalid or the
    /// client cannot be built.
    pub fn new(config: &SearchStoreConfig) -> Result<Self, SearchStoreError> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(USER_AGENT)
            .redirect(Policy::none())
            .build()
            .map_err(|err| SearchStoreError::Transport(format!("client build failed: {err}")))?;
        let credentials = match (&config.username, &config.password) {
            (Some(user), Some(password)) => Some((user.clone(), password.clone())),
            _ => None,
        };
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            credentials,
        })
    }
}

impl SearchTransport for HttpSearchTransport {
    fn send(&self, request: &SearchRequest) -> Result<SearchResponse, SearchStoreError> {
        let url = format!("{}/{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.as_reqwest(), url);
        if let Some((user, password)) = &self.credentials {
            builder = builder.basic_auth(user, Some(password));
        }
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => {
                let body = serde_json::to_vec(value).map_err(|err| SearchStoreError::Invalid(err.to_string()))?;
                builder.header(CONTENT_TYPE, "application/json").body(body)
            }
            RequestBody::NdJson(lines) => builder.header(CONTENT_TYPE, "application/x-ndjson").body(lines.clone()),
        };
        let response = builder.send().map_err(|err| SearchStoreError::Transport(err.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().map_err(|err| SearchStoreError::Transport(err.to_string()))?;
        let body = if text.trim().is_empty() { None } else { serde_json::from_str(&text).ok() };
        Ok(SearchResponse {
            status,
            body,
        })
    }
}

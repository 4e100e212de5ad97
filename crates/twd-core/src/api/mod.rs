//! Twitch Helix HTTP client.
//!
//! The client carries a shared default-header map (`Client-Id`,
//! `Authorization`) that is applied to every request. A request can also be
//! signed with its own credential, which overrides the default
//! `Authorization` header for that request only.

pub mod users;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use users::{User, fetch_current_user};

/// Header carrying the application client id on every Helix request.
pub const CLIENT_ID_HEADER: HeaderName = HeaderName::from_static("client-id");

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// An OAuth access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    /// `Authorization` header value for this token.
    ///
    /// # Errors
    /// Returns an error if the token contains characters not allowed in headers.
    pub fn header_value(&self) -> Result<HeaderValue, ApiError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.0))
            .map_err(|e| ApiError::InvalidHeader(format!("Authorization: {e}")))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken({})", mask_token(&self.0))
    }
}

/// Returns a masked version of a token for display (first 6 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 12 {
        return "***".to_string();
    }
    let head: String = token.chars().take(6).collect();
    format!("{head}...")
}

/// Errors from the Helix API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection failure or timeout.
    Transport(String),
    /// Non-2xx response.
    Status { status: u16, message: String },
    /// Response body did not match the expected shape.
    Parse(String),
    InvalidHeader(String),
}

impl ApiError {
    pub(crate) fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|json| {
                json.get("message")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string());
        ApiError::Status { status, message }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(msg) => write!(f, "request failed: {msg}"),
            ApiError::Status { status, message } if message.is_empty() => {
                write!(f, "HTTP {status}")
            }
            ApiError::Status { status, message } => write!(f, "HTTP {status}: {message}"),
            ApiError::Parse(msg) => write!(f, "unexpected response: {msg}"),
            ApiError::InvalidHeader(msg) => write!(f, "invalid header {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Shared, mutable default headers.
///
/// Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct DefaultHeaders {
    inner: Arc<RwLock<HeaderMap>>,
}

impl DefaultHeaders {
    pub fn set(&self, name: HeaderName, value: HeaderValue) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, value);
    }

    pub fn remove(&self, name: &HeaderName) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
    }

    /// Returns the header value as text, if present and printable.
    pub fn get(&self, name: &HeaderName) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn contains(&self, name: &HeaderName) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn snapshot(&self) -> HeaderMap {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Helix API client.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    headers: DefaultHeaders,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_http(http, base_url)
    }

    pub fn with_http(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            headers: DefaultHeaders::default(),
        }
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn default_headers(&self) -> &DefaultHeaders {
        &self.headers
    }

    /// Current `Authorization` default header, if any.
    pub fn authorization(&self) -> Option<String> {
        self.headers.get(&AUTHORIZATION)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GETs `path` and decodes the JSON body.
    ///
    /// Default headers are applied first; `credential` then overrides
    /// `Authorization` for this request only.
    ///
    /// # Errors
    /// Returns an error on transport failure, non-2xx status or a body that
    /// does not decode into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&BearerToken>,
    ) -> Result<T, ApiError> {
        let mut headers = self.headers.snapshot();
        if let Some(token) = credential {
            headers.insert(AUTHORIZATION, token.header_value()?);
        }

        let url = self.url(path);
        tracing::debug!(%url, "GET");
        let response = self.http.get(&url).headers(headers).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status.as_u16(), &body));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

//! Shared HTTP transport for the provider API
//!
//! Every resource client goes through `ApiClient`, which attaches the bearer
//! token, applies the configured timeout and turns non-2xx responses into
//! `ApiError::Status` using the `error` field of the response body.

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::Config;

/// Query parameters as sent on the wire
pub type Query = Vec<(&'static str, String)>;

/// Errors that can occur when calling the provider API
#[derive(Debug, Error)]
pub enum ApiError {
    /// No bearer token was configured
    #[error("No authentication token available")]
    NotAuthenticated,

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Server-provided error text, or `HTTP <code>: <reason>`
        message: String,
    },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Query parameters could not be form-encoded
    #[error("Failed to encode query: {0}")]
    QueryEncode(#[from] serde_urlencoded::ser::Error),
}

impl ApiError {
    /// Whether the server rejected the bearer token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status { status: 401, .. })
    }

    /// HTTP status code, when the server answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Error body returned by the provider services
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Authenticated JSON client for one provider API base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Creates a client for `config` sending `token` as bearer credentials
    pub fn new(config: &Config, token: Option<String>) -> Result<Self, ApiError> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::NotAuthenticated)?;
        Ok(self
            .http_client
            .request(method, self.url(path))
            .bearer_auth(token))
    }

    /// GET `path` with `query` appended
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path)?;
        let request = if query.is_empty() {
            request
        } else {
            request.query(query)
        };
        self.send(request).await
    }

    /// POST a JSON body to `path`
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path)?.json(body)).await
    }

    /// POST to `path` with no body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::POST, path)?).await
    }

    /// PUT a JSON body to `path`
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path)?.json(body)).await
    }

    /// DELETE `path`
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(self.request(Method::DELETE, path)?).await
    }

    /// POST without credentials, used for login
    pub async fn post_anonymous<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http_client.post(self.url(path)).json(body);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "api response");

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

fn status_error(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| {
            format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            )
        });

    ApiError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Renders query parameters form-encoded as `k=v&k=v`, used as a cache key
/// variant
pub fn query_key(query: &Query) -> Result<String, ApiError> {
    Ok(serde_urlencoded::to_string(query)?)
}

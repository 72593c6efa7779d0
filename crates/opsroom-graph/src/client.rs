//! Microsoft Graph API client
//!
//! Provides a typed HTTP client for interacting with the Microsoft Graph API.
//! Handles authentication headers, endpoint construction, and the mapping of
//! error responses into the structured [`ProviderError`] taxonomy that the
//! core's retry policies match on.

use std::sync::Arc;
use std::time::Duration;

use opsroom_core::domain::errors::ProviderError;
use opsroom_core::ports::token_provider::ITokenProvider;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::debug;

/// Base URL for Microsoft Graph API v1.0
const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Default retry-after duration when the 429 header is missing
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

// ============================================================================
// GraphClient
// ============================================================================

/// HTTP client for Microsoft Graph API calls
///
/// Wraps `reqwest::Client` with bearer authentication and base URL
/// construction. Tokens come from an injected [`ITokenProvider`], so the
/// client stays valid across token refreshes without interior mutability.
pub struct GraphClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for API requests
    base_url: String,
    /// Bearer token source
    tokens: Arc<dyn ITokenProvider>,
}

impl GraphClient {
    /// Creates a new GraphClient against the production Graph endpoint
    ///
    /// # Arguments
    /// * `tokens` - Source of valid bearer tokens
    pub fn new(tokens: Arc<dyn ITokenProvider>) -> Self {
        Self {
            client: Client::new(),
            base_url: GRAPH_BASE_URL.to_string(),
            tokens,
        }
    }

    /// Creates a new GraphClient with a custom base URL (useful for testing)
    ///
    /// # Arguments
    /// * `tokens` - Source of valid bearer tokens
    /// * `base_url` - Custom base URL for API requests
    pub fn with_base_url(tokens: Arc<dyn ITokenProvider>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            tokens,
        }
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// Automatically prepends the base URL and adds the Authorization header.
    /// Paths that are already absolute URLs (upload session endpoints, status
    /// locators) are used as-is.
    ///
    /// # Arguments
    /// * `method` - HTTP method (GET, POST, PUT, DELETE, etc.)
    /// * `path` - API path relative to base URL, or an absolute URL
    pub async fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, ProviderError> {
        let token = self.tokens.bearer_token().await?;
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        };
        Ok(self.client.request(method, &url).bearer_auth(token))
    }

    /// Sends a built request and maps transport failures
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, ProviderError> {
        builder
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))
    }

    /// Converts a non-success response into the structured error taxonomy
    ///
    /// Consumes the response body for the error message. Success statuses
    /// pass through untouched.
    pub async fn check_status(&self, response: Response) -> Result<Response, ProviderError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(error_from_response(response).await)
    }

    /// Returns the base URL for API requests
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Maps an error response into a [`ProviderError`] by status class
///
/// 404 is *not* mapped to `FolderNotReady` here: only the channel
/// files-folder lookup carries that meaning, and that call site does its
/// own classification.
pub(crate) async fn error_from_response(response: Response) -> ProviderError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get("Retry-After")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs);
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_string());
    debug!(status = status.as_u16(), "Graph API error response");

    match status {
        StatusCode::UNAUTHORIZED => ProviderError::Unauthorized(body),
        StatusCode::NOT_FOUND => ProviderError::NotFound(body),
        StatusCode::TOO_MANY_REQUESTS => ProviderError::Throttled {
            retry_after: retry_after.unwrap_or(DEFAULT_RETRY_AFTER),
        },
        other => ProviderError::Http {
            status: other.as_u16(),
            message: body,
        },
    }
}

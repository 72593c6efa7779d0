//! OAuth2 client-credentials authentication for Microsoft Graph API
//!
//! Implements the application-permissions flow: the service authenticates
//! as itself against the tenant's token endpoint, no user interaction
//! involved. Acquired tokens are cached until shortly before expiry.
//!
//! ## Components
//!
//! - [`AppAuthConfig`] - Tenant, client id, and secret for the grant
//! - [`ClientCredentialsAuth`] - Token acquisition and caching; implements
//!   the core's [`ITokenProvider`] port

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use oauth2::{
    basic::BasicClient, ClientId, ClientSecret, EndpointNotSet, EndpointSet, Scope,
    TokenResponse, TokenUrl,
};
use opsroom_core::domain::errors::ProviderError;
use opsroom_core::ports::token_provider::ITokenProvider;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default Microsoft identity platform authority host
const DEFAULT_AUTHORITY_HOST: &str = "https://login.microsoftonline.com";

/// Default scope for application permissions against Graph
const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Tokens are refreshed this long before their reported expiry
const EXPIRY_MARGIN_SECS: i64 = 60;

// ============================================================================
// AppAuthConfig
// ============================================================================

/// Configuration for the client-credentials grant
#[derive(Debug, Clone)]
pub struct AppAuthConfig {
    /// Identity platform authority host
    pub authority_host: String,
    /// Directory (tenant) ID
    pub tenant_id: String,
    /// Application (client) ID
    pub client_id: String,
    /// Application client secret
    pub client_secret: String,
    /// Scope requested on the grant
    pub scope: String,
}

impl AppAuthConfig {
    /// Creates a config against the production authority with the default scope
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            authority_host: DEFAULT_AUTHORITY_HOST.to_string(),
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    /// Overrides the authority host (useful for testing)
    pub fn with_authority_host(mut self, host: impl Into<String>) -> Self {
        self.authority_host = host.into();
        self
    }

    /// The tenant-scoped token endpoint
    fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority_host, self.tenant_id
        )
    }
}

// ============================================================================
// ClientCredentialsAuth
// ============================================================================

/// A token acquired from the token endpoint, with its expiry
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Utc::now() + ChronoDuration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Token provider running the OAuth2 client-credentials exchange
///
/// Tokens are cached behind a mutex and re-acquired when they are within
/// a minute of expiry.
pub struct ClientCredentialsAuth {
    client: BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ClientCredentialsAuth {
    /// Creates the provider from the grant configuration
    ///
    /// # Errors
    /// Returns an error if the derived token endpoint URL is invalid
    pub fn new(config: &AppAuthConfig) -> Result<Self, ProviderError> {
        let token_url = TokenUrl::new(config.token_url())
            .map_err(|e| ProviderError::InvalidRequest(format!("invalid token URL: {e}")))?;
        let client = BasicClient::new(ClientId::new(config.client_id.clone()))
            .set_client_secret(ClientSecret::new(config.client_secret.clone()))
            .set_token_uri(token_url);

        Ok(Self {
            client,
            scope: config.scope.clone(),
            cached: Mutex::new(None),
        })
    }

    /// Runs the client-credentials exchange against the token endpoint
    async fn acquire(&self) -> Result<CachedToken, ProviderError> {
        info!("Acquiring application token via client credentials");

        let http_client = reqwest::Client::new();
        let token_result = self
            .client
            .exchange_client_credentials()
            .add_scope(Scope::new(self.scope.clone()))
            .request_async(&http_client)
            .await
            .map_err(|e| ProviderError::Unauthorized(format!("token request failed: {e}")))?;

        let expires_at = token_result
            .expires_in()
            .map(|d| Utc::now() + ChronoDuration::seconds(d.as_secs() as i64))
            .unwrap_or_else(|| Utc::now() + ChronoDuration::hours(1));

        debug!(%expires_at, "Application token acquired");
        Ok(CachedToken {
            access_token: token_result.access_token().secret().to_string(),
            expires_at,
        })
    }
}

#[async_trait::async_trait]
impl ITokenProvider for ClientCredentialsAuth {
    async fn bearer_token(&self) -> Result<String, ProviderError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
            debug!("Cached application token near expiry, re-acquiring");
        }

        let fresh = self.acquire().await?;
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }
}

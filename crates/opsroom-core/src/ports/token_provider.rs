//! Token provider port (driven/secondary port)
//!
//! Credential acquisition is an external collaborator: the flow only needs
//! a bearer token to hand to the wire client. The production adapter runs
//! an OAuth2 client-credentials exchange; tests supply a static token.

use crate::domain::errors::ProviderError;

/// Port trait for opaque bearer-token acquisition
#[async_trait::async_trait]
pub trait ITokenProvider: Send + Sync {
    /// Returns a currently valid bearer token, refreshing if needed
    async fn bearer_token(&self) -> Result<String, ProviderError>;
}

/// A fixed-token provider for tests and pre-acquired credentials
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Wraps an already-acquired token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl ITokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> Result<String, ProviderError> {
        Ok(self.token.clone())
    }
}

//! Domain and flow error types
//!
//! This module defines three error layers:
//! - [`DomainError`] for validation failures at construction time
//! - [`ProviderError`] for classified failures returned by port adapters
//! - [`FlowError`] for stage-level failures of the provisioning flow

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid email address format
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    /// Invalid team identifier
    #[error("Invalid team ID: {0}")]
    InvalidTeamId(String),

    /// Invalid drive identifier
    #[error("Invalid drive ID: {0}")]
    InvalidDriveId(String),

    /// Invalid channel identifier
    #[error("Invalid channel ID: {0}")]
    InvalidChannelId(String),

    /// Invalid tenant identifier
    #[error("Invalid tenant ID: {0}")]
    InvalidTenantId(String),

    /// Invalid state transition attempt
    #[error("Invalid state transition from {from} to {to}")]
    InvalidState {
        /// The current state
        from: String,
        /// The attempted target state
        to: String,
    },

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

/// Classified failures from downstream service adapters
///
/// Every port method returns this type so that retry decisions can be made
/// on a structured kind rather than on error message text. The adapter is
/// responsible for mapping wire-level responses into the right variant.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The channel's folder location has not propagated yet; retryable
    #[error("Folder location for this channel is not ready yet")]
    FolderNotReady,

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Rate limit exceeded; retry after the specified duration
    #[error("Too many requests, retry after {retry_after:?}")]
    Throttled {
        /// Duration to wait before retrying
        retry_after: Duration,
    },

    /// Any other HTTP error status
    #[error("HTTP {status}: {message}")]
    Http {
        /// The HTTP status code
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(String),

    /// The request was rejected before reaching the wire
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Returns true if this failure is the transient "not ready yet"
    /// propagation-window signature that the coordinate lookup retries on.
    #[must_use]
    pub fn is_folder_not_ready(&self) -> bool {
        matches!(self, Self::FolderNotReady)
    }
}

/// Stage-level failures of the provisioning flow
///
/// These are fatal to the whole run and propagate to the caller. Per-member
/// reconciliation outcomes are reported, not raised, and never appear here.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The creation operation did not reach a terminal state within the ceiling
    #[error("Provisioning did not complete within {ceiling:?}")]
    ProvisioningTimeout {
        /// The configured wait ceiling
        ceiling: Duration,
    },

    /// The creation operation reported a failed terminal status
    #[error("Provisioning reported a failed terminal status")]
    ProvisioningFailed,

    /// The run was aborted by the cancellation signal
    #[error("Operation cancelled")]
    Cancelled,

    /// Storage coordinates could not be resolved within the retry budget
    #[error("Storage coordinates unavailable after {attempts} attempts")]
    CoordinatesUnavailable {
        /// Total attempts issued (retries + 1)
        attempts: u32,
        /// The last failure observed
        #[source]
        source: ProviderError,
    },

    /// A range transfer or finalize call failed mid-upload
    #[error("Upload failed after committing {committed} bytes")]
    UploadFailed {
        /// Bytes committed before the failure, for diagnostics
        committed: u64,
        /// The underlying transfer failure
        #[source]
        source: ProviderError,
    },

    /// Upload result metadata was malformed; no usable link can be built
    #[error("Deep link construction failed: {0}")]
    DeepLinkConstructionFailed(String),

    /// A downstream failure outside any retry policy
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::InvalidEmail("notanemail".to_string());
        assert_eq!(err.to_string(), "Invalid email format: notanemail");

        let err = DomainError::InvalidState {
            from: "Pending".to_string(),
            to: "Succeeded".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid state transition from Pending to Succeeded"
        );
    }

    #[test]
    fn test_folder_not_ready_classification() {
        assert!(ProviderError::FolderNotReady.is_folder_not_ready());
        assert!(!ProviderError::NotFound("x".into()).is_folder_not_ready());
        assert!(!ProviderError::Http {
            status: 500,
            message: "boom".into()
        }
        .is_folder_not_ready());
    }

    #[test]
    fn test_flow_error_preserves_source() {
        let err = FlowError::CoordinatesUnavailable {
            attempts: 6,
            source: ProviderError::FolderNotReady,
        };
        assert_eq!(
            err.to_string(),
            "Storage coordinates unavailable after 6 attempts"
        );
        let source = std::error::Error::source(&err).expect("source present");
        assert!(source.to_string().contains("not ready"));
    }

    #[test]
    fn test_provider_error_converts_into_flow_error() {
        let flow: FlowError = ProviderError::NotFound("team".into()).into();
        assert!(matches!(flow, FlowError::Provider(_)));
    }
}

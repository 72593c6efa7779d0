//! Storage coordinate resolution use case
//!
//! Wraps the channel-folder lookup with a bounded retry against the
//! "folder location not ready yet" propagation window. The retry is
//! narrow: it matches only the structured [`ProviderError::FolderNotReady`]
//! kind; any other failure propagates immediately.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::errors::{FlowError, ProviderError};
use crate::domain::newtypes::TeamId;
use crate::domain::provisioning::StorageCoordinates;
use crate::ports::workspace_provider::IWorkspaceProvider;

/// Retry parameters for the coordinate lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_secs(2),
        }
    }
}

/// Use case that resolves where a channel's files physically reside
pub struct ResolveCoordinatesUseCase {
    provider: Arc<dyn IWorkspaceProvider>,
    policy: RetryPolicy,
}

impl ResolveCoordinatesUseCase {
    /// Creates the use case with the given provider and retry policy
    pub fn new(provider: Arc<dyn IWorkspaceProvider>, policy: RetryPolicy) -> Self {
        Self { provider, policy }
    }

    /// Resolves storage coordinates for the team's distinguished channel
    ///
    /// # Errors
    /// - [`FlowError::CoordinatesUnavailable`] when the retry budget is
    ///   exhausted against the not-ready signature
    /// - [`FlowError::Provider`] for any non-retryable lookup failure
    /// - [`FlowError::Cancelled`] when the cancellation signal is raised
    pub async fn resolve(
        &self,
        team_id: &TeamId,
        channel_name: &str,
        cancel: &CancellationToken,
    ) -> Result<StorageCoordinates, FlowError> {
        let mut last_not_ready: Option<ProviderError> = None;

        for attempt in 0..=self.policy.max_retries {
            if cancel.is_cancelled() {
                return Err(FlowError::Cancelled);
            }

            match self
                .provider
                .channel_coordinates(team_id, channel_name)
                .await
            {
                Ok(coordinates) => {
                    info!(
                        %team_id,
                        drive_id = %coordinates.drive_id,
                        channel_id = %coordinates.channel_id,
                        attempt,
                        "Resolved storage coordinates"
                    );
                    return Ok(coordinates);
                }
                Err(err) if err.is_folder_not_ready() => {
                    debug!(%team_id, attempt, "Channel folder not ready yet");
                    last_not_ready = Some(err);
                }
                Err(err) => return Err(FlowError::Provider(err)),
            }

            if attempt < self.policy.max_retries {
                tokio::select! {
                    () = cancel.cancelled() => return Err(FlowError::Cancelled),
                    () = tokio::time::sleep(self.policy.delay) => {}
                }
            }
        }

        let attempts = self.policy.max_retries + 1;
        warn!(%team_id, attempts, "Coordinate lookup retry budget exhausted");
        Err(FlowError::CoordinatesUnavailable {
            attempts,
            source: last_not_ready.unwrap_or(ProviderError::FolderNotReady),
        })
    }
}

//! Provisioning wait use case
//!
//! Polls the long-running team creation operation until it reaches a
//! terminal state, with a fixed interval, a hard ceiling on total wait
//! time, and cooperative cancellation. The remote operation can take
//! several minutes; fixed-interval polling is sufficient, no backoff
//! growth is applied.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::errors::FlowError;
use crate::domain::provisioning::{OperationStatus, ProvisioningHandle, ProvisioningState};
use crate::ports::workspace_provider::IWorkspaceProvider;

/// Polling parameters for the provisioning wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay between status reads
    pub interval: Duration,
    /// Hard ceiling on total wait time
    pub ceiling: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            ceiling: Duration::from_secs(600),
        }
    }
}

/// Use case that waits for a creation operation to finish
///
/// The handle is never polled after a terminal observation, and the loop
/// is bounded: a `failed` status or an expired ceiling ends the wait with
/// an error instead of polling forever.
pub struct AwaitProvisioningUseCase {
    provider: Arc<dyn IWorkspaceProvider>,
    policy: PollPolicy,
}

impl AwaitProvisioningUseCase {
    /// Creates the use case with the given provider and polling policy
    pub fn new(provider: Arc<dyn IWorkspaceProvider>, policy: PollPolicy) -> Self {
        Self { provider, policy }
    }

    /// Waits until the operation behind `handle` reaches a terminal state
    ///
    /// # Returns
    /// `ProvisioningState::Succeeded` once the resource is usable
    ///
    /// # Errors
    /// - [`FlowError::ProvisioningFailed`] on a `failed` terminal status
    /// - [`FlowError::ProvisioningTimeout`] when the ceiling expires
    /// - [`FlowError::Cancelled`] when the cancellation signal is raised
    /// - [`FlowError::Provider`] when a status read itself fails
    pub async fn await_completion(
        &self,
        handle: &ProvisioningHandle,
        cancel: &CancellationToken,
    ) -> Result<ProvisioningState, FlowError> {
        let started = Instant::now();
        let mut polls: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(FlowError::Cancelled);
            }

            let status = self.provider.poll_status(handle).await?;
            polls += 1;
            debug!(
                team_id = %handle.team_id(),
                %status,
                polls,
                elapsed_s = started.elapsed().as_secs(),
                "Polled provisioning status"
            );

            match status {
                OperationStatus::Succeeded => {
                    info!(team_id = %handle.team_id(), polls, "Provisioning completed");
                    return Ok(ProvisioningState::Succeeded);
                }
                OperationStatus::Failed => {
                    warn!(team_id = %handle.team_id(), polls, "Provisioning failed terminally");
                    return Err(FlowError::ProvisioningFailed);
                }
                OperationStatus::InProgress => {}
            }

            if started.elapsed() >= self.policy.ceiling {
                warn!(
                    team_id = %handle.team_id(),
                    polls,
                    ceiling_s = self.policy.ceiling.as_secs(),
                    "Provisioning wait ceiling expired"
                );
                return Err(FlowError::ProvisioningTimeout {
                    ceiling: self.policy.ceiling,
                });
            }

            tokio::select! {
                () = cancel.cancelled() => return Err(FlowError::Cancelled),
                () = tokio::time::sleep(self.policy.interval) => {}
            }
        }
    }
}

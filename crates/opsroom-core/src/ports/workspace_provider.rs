//! Workspace provider port (driven/secondary port)
//!
//! Interface for the downstream collaboration service that creates teams,
//! exposes the long-running creation status, and resolves where a channel's
//! files physically reside. The production implementation targets Microsoft
//! Graph, but the trait keeps the core decoupled from the wire client.
//!
//! ## Design Notes
//!
//! - Methods return [`ProviderError`] so retry policies can match on a
//!   structured error kind (`FolderNotReady`) instead of message text.
//! - Status transitions are observed, never driven: `poll_status` reads the
//!   remote operation, it does not advance it.

use serde::{Deserialize, Serialize};

use crate::domain::errors::ProviderError;
use crate::domain::newtypes::TeamId;
use crate::domain::provisioning::{OperationStatus, ProvisioningHandle, StorageCoordinates};

// ============================================================================
// TeamSpec
// ============================================================================

/// What to create: template reference, naming, and the initial owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSpec {
    /// Identifier of the team template to instantiate
    pub template_id: String,
    /// Display name of the new team
    pub display_name: String,
    /// Description of the new team
    pub description: String,
    /// Directory object id of the initial owner
    pub owner_id: String,
}

// ============================================================================
// IWorkspaceProvider trait
// ============================================================================

/// Port trait for team provisioning operations
#[async_trait::async_trait]
pub trait IWorkspaceProvider: Send + Sync {
    /// Requests creation of a team from a template
    ///
    /// The downstream accepts the request asynchronously (202 semantics);
    /// the returned handle carries the status poll locator and the team id
    /// extracted from it.
    ///
    /// # Errors
    /// Returns an error if the creation request is rejected or the accepted
    /// response carries no parsable handle
    async fn create_team(&self, spec: &TeamSpec) -> Result<ProvisioningHandle, ProviderError>;

    /// Reads the current status of the creation operation
    async fn poll_status(
        &self,
        handle: &ProvisioningHandle,
    ) -> Result<OperationStatus, ProviderError>;

    /// Resolves storage coordinates for the distinguished channel
    ///
    /// Queries the team's channel list filtered by display name, then reads
    /// that channel's files-folder reference. For a bounded window after
    /// creation this fails with [`ProviderError::FolderNotReady`], which is
    /// retryable; every other failure is not.
    async fn channel_coordinates(
        &self,
        team_id: &TeamId,
        channel_name: &str,
    ) -> Result<StorageCoordinates, ProviderError>;
}

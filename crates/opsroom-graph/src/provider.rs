//! GraphWorkspaceProvider - port implementations for Microsoft Graph API
//!
//! Wraps the [`GraphClient`] and delegates to the provisioning, channels,
//! upload, and membership modules to fulfil the [`IWorkspaceProvider`],
//! [`IFileStore`], and [`IDirectory`] port contracts.
//!
//! ## Design Notes
//!
//! - One provider instance backs all three ports; the orchestration layer
//!   holds it behind three `Arc<dyn ...>` handles.
//! - The chunk size of the resumable upload is fixed at construction,
//!   sourced from configuration by the caller.

use opsroom_core::domain::errors::ProviderError;
use opsroom_core::domain::newtypes::{Email, TeamId};
use opsroom_core::domain::provisioning::{
    OperationStatus, ProvisioningHandle, StorageCoordinates,
};
use opsroom_core::ports::directory::{DirectoryUser, IDirectory, TeamMember};
use opsroom_core::ports::file_store::{IFileStore, ProgressObserver, UploadedItem};
use opsroom_core::ports::workspace_provider::{IWorkspaceProvider, TeamSpec};

use crate::client::GraphClient;
use crate::{channels, membership, provisioning, upload};

/// Default resumable-upload range size: 1 MiB (1,048,576 bytes)
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Microsoft Graph implementation of the provisioning, storage, and
/// directory ports
pub struct GraphWorkspaceProvider {
    client: GraphClient,
    chunk_size: usize,
}

impl GraphWorkspaceProvider {
    /// Create a provider with the default chunk size
    #[must_use]
    pub fn new(client: GraphClient) -> Self {
        Self::with_chunk_size(client, DEFAULT_CHUNK_SIZE)
    }

    /// Create a provider with an explicit resumable-upload range size
    #[must_use]
    pub fn with_chunk_size(client: GraphClient, chunk_size: usize) -> Self {
        Self { client, chunk_size }
    }
}

#[async_trait::async_trait]
impl IWorkspaceProvider for GraphWorkspaceProvider {
    async fn create_team(&self, spec: &TeamSpec) -> Result<ProvisioningHandle, ProviderError> {
        provisioning::create_team(&self.client, spec).await
    }

    async fn poll_status(
        &self,
        handle: &ProvisioningHandle,
    ) -> Result<OperationStatus, ProviderError> {
        provisioning::poll_status(&self.client, handle).await
    }

    async fn channel_coordinates(
        &self,
        team_id: &TeamId,
        channel_name: &str,
    ) -> Result<StorageCoordinates, ProviderError> {
        channels::channel_coordinates(&self.client, team_id, channel_name).await
    }
}

#[async_trait::async_trait]
impl IFileStore for GraphWorkspaceProvider {
    async fn upload(
        &self,
        coordinates: &StorageCoordinates,
        folder: &str,
        file_name: &str,
        data: &[u8],
        progress: Option<ProgressObserver>,
    ) -> Result<UploadedItem, ProviderError> {
        upload::upload_file(
            &self.client,
            coordinates,
            folder,
            file_name,
            data,
            self.chunk_size,
            progress.as_ref(),
        )
        .await
    }
}

#[async_trait::async_trait]
impl IDirectory for GraphWorkspaceProvider {
    async fn find_user_by_email(&self, email: &Email) -> Result<DirectoryUser, ProviderError> {
        membership::find_user_by_email(&self.client, email).await
    }

    async fn list_members(&self, team_id: &TeamId) -> Result<Vec<TeamMember>, ProviderError> {
        membership::list_members(&self.client, team_id).await
    }

    async fn add_member(
        &self,
        team_id: &TeamId,
        user_id: &str,
        roles: &[String],
    ) -> Result<(), ProviderError> {
        membership::add_member(&self.client, team_id, user_id, roles).await
    }

    async fn find_guest_by_mail_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<DirectoryUser>, ProviderError> {
        membership::find_guest_by_mail_prefix(&self.client, prefix).await
    }

    async fn invite_guest(
        &self,
        email: &Email,
        redirect_url: &str,
    ) -> Result<(), ProviderError> {
        membership::invite_guest(&self.client, email, redirect_url).await
    }
}

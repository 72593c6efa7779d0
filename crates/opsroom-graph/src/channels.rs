//! Channel lookup and file-storage coordinate resolution
//!
//! Resolves the drive backing a named channel in two hops:
//! 1. `GET /teams/{id}/channels?$filter=...` to find the channel id
//! 2. `GET /teams/{id}/channels/{cid}/filesFolder` to read the drive id
//!
//! The files folder materializes asynchronously after team creation, so a
//! 404 on the second hop is reported as [`ProviderError::FolderNotReady`]
//! and left to the caller's retry policy.
//!
//! ## Microsoft Graph API References
//!
//! - [List channels](https://learn.microsoft.com/en-us/graph/api/channel-list)
//! - [Get filesFolder](https://learn.microsoft.com/en-us/graph/api/channel-get-filesfolder)

use opsroom_core::domain::errors::ProviderError;
use opsroom_core::domain::newtypes::{ChannelId, DriveId, TeamId};
use opsroom_core::domain::provisioning::StorageCoordinates;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::debug;

use crate::client::{error_from_response, GraphClient};

#[derive(Debug, Deserialize)]
struct ChannelListResponse {
    value: Vec<ChannelEntry>,
}

#[derive(Debug, Deserialize)]
struct ChannelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FilesFolderResponse {
    #[serde(rename = "parentReference")]
    parent_reference: Option<ParentReference>,
}

#[derive(Debug, Deserialize)]
struct ParentReference {
    #[serde(rename = "driveId")]
    drive_id: Option<String>,
}

/// Finds a channel by display name
///
/// # Errors
/// Returns [`ProviderError::NotFound`] when no channel matches the name.
async fn find_channel(
    client: &GraphClient,
    team_id: &TeamId,
    channel_name: &str,
) -> Result<ChannelId, ProviderError> {
    let path = format!(
        "/teams/{}/channels?$filter=displayName eq '{}'&$select=id",
        team_id.as_str(),
        channel_name
    );
    let response = client.send(client.request(Method::GET, &path).await?).await?;
    let response = client.check_status(response).await?;

    let body: ChannelListResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("channel list: {e}")))?;

    let entry = body.value.into_iter().next().ok_or_else(|| {
        ProviderError::NotFound(format!(
            "no channel named '{}' in team {}",
            channel_name,
            team_id.as_str()
        ))
    })?;
    ChannelId::new(entry.id).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

/// Resolves the storage coordinates of a channel's files folder
///
/// # Errors
/// - [`ProviderError::FolderNotReady`] when the files folder has not yet
///   materialized (404 on the `filesFolder` hop)
/// - [`ProviderError::NotFound`] when the channel itself does not exist
pub async fn channel_coordinates(
    client: &GraphClient,
    team_id: &TeamId,
    channel_name: &str,
) -> Result<StorageCoordinates, ProviderError> {
    let channel_id = find_channel(client, team_id, channel_name).await?;

    let path = format!(
        "/teams/{}/channels/{}/filesFolder",
        team_id.as_str(),
        channel_id.as_str()
    );
    let response = client.send(client.request(Method::GET, &path).await?).await?;

    // The folder lags team creation; 404 here means "not yet", not "never".
    if response.status() == StatusCode::NOT_FOUND {
        return Err(ProviderError::FolderNotReady);
    }
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body: FilesFolderResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("filesFolder: {e}")))?;

    let drive_id = body
        .parent_reference
        .and_then(|p| p.drive_id)
        .ok_or_else(|| {
            ProviderError::InvalidResponse("filesFolder response carries no driveId".to_string())
        })?;
    let drive_id =
        DriveId::new(drive_id).map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

    debug!(
        team_id = %team_id.as_str(),
        channel_id = %channel_id.as_str(),
        drive_id = %drive_id.as_str(),
        "Resolved channel storage coordinates"
    );
    Ok(StorageCoordinates::new(drive_id, channel_id))
}

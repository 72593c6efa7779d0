//! Upload operations for Microsoft Graph API (channel drives)
//!
//! Provides functions for placing a payload into a channel's file library:
//! - [`create_upload_session`] - Creates a resumable upload session
//! - [`upload_chunk`] - Uploads a single ranged chunk within a session
//! - [`upload_file`] - Orchestrates the whole transfer, finalize included
//!
//! ## Microsoft Graph API References
//!
//! - [Upload large files](https://learn.microsoft.com/en-us/graph/api/driveitem-createuploadsession)

use opsroom_core::domain::errors::ProviderError;
use opsroom_core::domain::provisioning::{StorageCoordinates, UploadSession};
use opsroom_core::ports::file_store::{ProgressObserver, UploadedItem};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::client::{error_from_response, GraphClient};

// ============================================================================
// Graph API response types for deserialization
// ============================================================================

/// DriveItem response returned once the session completes
///
/// Fields use `Option` because intermediate responses and some tenants omit
/// them; the deep link stage decides whether absence is fatal.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphDriveItem {
    /// Drive item ID
    id: String,
    /// Stored file name (differs from the requested name on rename)
    name: String,
    /// Per-version tag of the form `"{id},{version}"`
    e_tag: Option<String>,
    /// Canonical reference URL of the stored file
    web_url: Option<String>,
    /// Stored size in bytes
    size: Option<u64>,
}

/// Response from creating an upload session
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadSessionResponse {
    /// The URL to use for uploading chunks
    upload_url: String,
}

/// Maps the Graph response into the port-level DTO
fn item_from_response(item: GraphDriveItem) -> UploadedItem {
    UploadedItem {
        id: item.id,
        name: item.name,
        revision_tag: item.e_tag,
        web_url: item.web_url,
        size: item.size,
    }
}

/// Builds the item-by-path session creation path inside a drive
fn session_path(drive_id: &str, folder: &str, file_name: &str) -> String {
    format!("/drives/{drive_id}/root:/{folder}/{file_name}:/createUploadSession")
}

// ============================================================================
// create_upload_session
// ============================================================================

/// Creates a resumable upload session in a channel folder
///
/// Conflict behavior is `rename`, so a repeated upload never overwrites the
/// previous revision.
///
/// # Errors
/// Returns an error if the session creation request fails
pub async fn create_upload_session(
    client: &GraphClient,
    drive_id: &str,
    folder: &str,
    file_name: &str,
) -> Result<String, ProviderError> {
    let path = session_path(drive_id, folder, file_name);
    debug!(file_name, folder, "Creating upload session");

    let body = json!({
        "item": {
            "@microsoft.graph.conflictBehavior": "rename",
            "name": file_name,
        }
    });
    let response = client
        .send(client.request(Method::POST, &path).await?.json(&body))
        .await?;
    let response = client.check_status(response).await?;

    let session: UploadSessionResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("upload session: {e}")))?;
    debug!(upload_url = %session.upload_url, "Upload session created");
    Ok(session.upload_url)
}

// ============================================================================
// upload_chunk
// ============================================================================

/// Uploads a single chunk to a session URL
///
/// The session URL is absolute and passes through the client's base URL
/// handling untouched.
///
/// # Returns
/// - `Some(GraphDriveItem)` when the store treats the range as final (200/201)
/// - `None` for intermediate ranges (202 Accepted)
async fn upload_chunk(
    client: &GraphClient,
    upload_url: &str,
    chunk: &[u8],
    offset: u64,
    total: u64,
) -> Result<Option<GraphDriveItem>, ProviderError> {
    let chunk_len = chunk.len() as u64;
    let range_end = offset + chunk_len - 1;
    let content_range = format!("bytes {offset}-{range_end}/{total}");
    debug!(%content_range, "Uploading chunk");

    let response = client
        .send(
            client
                .request(Method::PUT, upload_url)
                .await?
                .header("Content-Length", chunk_len.to_string())
                .header("Content-Range", &content_range)
                .body(chunk.to_vec()),
        )
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(error_from_response(response).await);
    }
    if status == StatusCode::OK || status == StatusCode::CREATED {
        let item: GraphDriveItem = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("final chunk body: {e}")))?;
        return Ok(Some(item));
    }
    Ok(None)
}

// ============================================================================
// finalize
// ============================================================================

/// Sends the zero-length finalize request after the last accepted range
///
/// Some stores return the completed item here instead of on the final
/// chunk, so a parsable body is captured when present.
async fn finalize(
    client: &GraphClient,
    upload_url: &str,
) -> Result<Option<GraphDriveItem>, ProviderError> {
    let response = client
        .send(
            client
                .request(Method::POST, upload_url)
                .await?
                .header("Content-Length", "0"),
        )
        .await?;
    let response = client.check_status(response).await?;
    Ok(response.json().await.ok())
}

// ============================================================================
// upload_file
// ============================================================================

/// Uploads a payload into a channel folder through a resumable session
///
/// Splits the data into fixed-size ranges sent strictly in increasing
/// offset order, invokes the progress observer after each accepted range,
/// and closes the session with a zero-length finalize request.
///
/// # Arguments
/// * `client` - The authenticated GraphClient
/// * `coordinates` - Drive and channel the upload lands in
/// * `folder` - Channel folder name within the drive root
/// * `file_name` - Target file name (rename-on-collision)
/// * `data` - Complete payload, must be non-empty
/// * `chunk_size` - Range size in bytes
/// * `progress` - Optional observer called with inclusive `(start, end)`
///
/// # Errors
/// - [`ProviderError::InvalidRequest`] for an empty payload, rejected before
///   any session is created
/// - Any range failure aborts the transfer with the underlying error
pub async fn upload_file(
    client: &GraphClient,
    coordinates: &StorageCoordinates,
    folder: &str,
    file_name: &str,
    data: &[u8],
    chunk_size: usize,
    progress: Option<&ProgressObserver>,
) -> Result<UploadedItem, ProviderError> {
    if data.is_empty() {
        return Err(ProviderError::InvalidRequest(
            "refusing to upload an empty payload".to_string(),
        ));
    }
    let total = data.len() as u64;
    info!(
        file_name,
        total_bytes = total,
        chunks = total.div_ceil(chunk_size as u64),
        "Starting resumable upload"
    );

    let upload_url =
        create_upload_session(client, coordinates.drive_id.as_str(), folder, file_name).await?;
    let mut session = UploadSession::new(upload_url, total);
    let mut completed: Option<GraphDriveItem> = None;

    while !session.is_complete() {
        let start = session.cursor();
        let end = std::cmp::min(start + chunk_size as u64, total);
        let chunk = &data[start as usize..end as usize];

        let result = upload_chunk(client, session.session_url(), chunk, start, total).await?;
        session
            .commit_through(end - 1)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        if let Some(cb) = progress {
            cb(start, end - 1);
        }
        if let Some(item) = result {
            completed = Some(item);
        }
    }

    let session_url = session.session_url().to_string();
    if let Some(item) = finalize(client, &session_url).await? {
        completed = Some(item);
    }

    let item = completed.ok_or_else(|| {
        ProviderError::InvalidResponse(
            "upload session completed without a drive item response".to_string(),
        )
    })?;
    info!(item_id = %item.id, name = %item.name, "Upload completed");
    Ok(item_from_response(item))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drive_item_deserialization() {
        let json = r#"{
            "id": "01ITEM",
            "name": "report.pdf",
            "eTag": "\"{4FC55F5A-0301-4A2C-BB4F-D81653ACE4B5},2\"",
            "webUrl": "https://contoso.sharepoint.com/sites/ops/Shared%20Documents/General/report.pdf",
            "size": 2048
        }"#;

        let item: GraphDriveItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, "01ITEM");
        assert_eq!(item.name, "report.pdf");
        assert_eq!(
            item.e_tag.as_deref(),
            Some("\"{4FC55F5A-0301-4A2C-BB4F-D81653ACE4B5},2\"")
        );
        assert_eq!(item.size, Some(2048));
    }

    #[test]
    fn test_drive_item_deserialization_minimal() {
        let item: GraphDriveItem =
            serde_json::from_str(r#"{"id": "01ITEM", "name": "report.pdf"}"#).unwrap();
        assert!(item.e_tag.is_none());
        assert!(item.web_url.is_none());
        assert!(item.size.is_none());
    }

    #[test]
    fn test_item_from_response_maps_all_fields() {
        let item = item_from_response(GraphDriveItem {
            id: "01ITEM".to_string(),
            name: "report 1.pdf".to_string(),
            e_tag: Some("\"abc,1\"".to_string()),
            web_url: Some("https://contoso.sharepoint.com/x/report%201.pdf".to_string()),
            size: Some(10),
        });
        assert_eq!(item.id, "01ITEM");
        assert_eq!(item.name, "report 1.pdf");
        assert_eq!(item.revision_tag.as_deref(), Some("\"abc,1\""));
        assert_eq!(item.size, Some(10));
    }

    #[test]
    fn test_session_path_construction() {
        assert_eq!(
            session_path("drive-9", "General", "brief.pdf"),
            "/drives/drive-9/root:/General/brief.pdf:/createUploadSession"
        );
    }

    #[test]
    fn test_upload_session_response_deserialization() {
        let json = r#"{
            "uploadUrl": "https://sn3302.up.example.com/up/fe6987/brief.pdf",
            "expirationDateTime": "2025-06-15T12:00:00Z"
        }"#;
        let response: UploadSessionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            response.upload_url,
            "https://sn3302.up.example.com/up/fe6987/brief.pdf"
        );
    }
}

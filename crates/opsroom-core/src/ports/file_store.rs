//! File store port (driven/secondary port)
//!
//! Interface for the resumable chunked transfer into a channel's file
//! library. The adapter owns the session protocol (session creation, ranged
//! PUTs, zero-length finalize); the core supplies the payload and observes
//! progress through the injected callback.

use serde::{Deserialize, Serialize};

use crate::domain::errors::ProviderError;
use crate::domain::provisioning::StorageCoordinates;

// ============================================================================
// UploadedItem
// ============================================================================

/// Metadata of the stored file, returned once the transfer completes
///
/// This is a port-level DTO carrying exactly what deep link construction
/// needs; the adapter maps the downstream response format into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedItem {
    /// Downstream item identifier
    pub id: String,
    /// Stored file name (may differ from the requested name on rename)
    pub name: String,
    /// Opaque per-version revision tag of the form `"<id>,<version>"`
    pub revision_tag: Option<String>,
    /// Canonical reference URL of the stored file
    pub web_url: Option<String>,
    /// Stored size in bytes
    pub size: Option<u64>,
}

/// Callback invoked after each committed range with `(range_start, range_end)`
///
/// Both bounds are inclusive byte offsets. Injected rather than hard-wired
/// to keep progress reporting testable.
pub type ProgressObserver = Box<dyn Fn(u64, u64) + Send + Sync>;

// ============================================================================
// IFileStore trait
// ============================================================================

/// Port trait for the resumable chunked upload
#[async_trait::async_trait]
pub trait IFileStore: Send + Sync {
    /// Uploads a payload into the channel folder behind `coordinates`
    ///
    /// Ranges are sent strictly in increasing offset order; a failed range
    /// aborts the whole transfer. The adapter reports
    /// [`ProviderError`] failures; the caller maps them into the flow-level
    /// taxonomy together with the committed cursor.
    ///
    /// # Arguments
    /// * `coordinates` - Where the upload lands
    /// * `folder` - Channel folder name within the drive root
    /// * `file_name` - Target file name (rename-on-collision downstream)
    /// * `data` - Complete payload
    /// * `progress` - Optional observer called after each committed range
    async fn upload(
        &self,
        coordinates: &StorageCoordinates,
        folder: &str,
        file_name: &str,
        data: &[u8],
        progress: Option<ProgressObserver>,
    ) -> Result<UploadedItem, ProviderError>;
}

//! Provisioning state model
//!
//! Types describing a team under asynchronous creation: the handle returned
//! when creation is accepted, the observed operation status, the bounded
//! waiter state machine, and the storage coordinates resolved afterwards.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{ChannelId, DriveId, TeamId};

// ============================================================================
// ProvisioningHandle
// ============================================================================

/// Reference to a team whose creation was accepted but not yet complete
///
/// Built from the 202 response of the creation call: the `Location` header
/// is the status poll locator, and the team id is embedded in it as a
/// single-quoted substring. Immutable once created; discarded after the
/// waiter observes a terminal status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningHandle {
    team_id: TeamId,
    status_url: String,
}

impl ProvisioningHandle {
    /// Create a handle from already-parsed parts
    pub fn new(team_id: TeamId, status_url: impl Into<String>) -> Self {
        Self {
            team_id,
            status_url: status_url.into(),
        }
    }

    /// Parse a handle from a `Location`-style header value
    ///
    /// The team id is the substring between the first pair of single quotes,
    /// e.g. `/teams('2ab9c796-...')/operations('...')`.
    ///
    /// # Errors
    /// Returns error if no quoted substring is present or the id is invalid
    pub fn from_location(location: &str) -> Result<Self, DomainError> {
        let start = location.find('\'').ok_or_else(|| {
            DomainError::InvalidTeamId(format!(
                "Location header has no quoted team id: {location}"
            ))
        })?;
        let rest = &location[start + 1..];
        let end = rest.find('\'').ok_or_else(|| {
            DomainError::InvalidTeamId(format!(
                "Location header has an unterminated quote: {location}"
            ))
        })?;
        let team_id = TeamId::new(rest[..end].to_string())?;
        Ok(Self {
            team_id,
            status_url: location.to_string(),
        })
    }

    /// The id assigned when creation was accepted
    #[must_use]
    pub fn team_id(&self) -> &TeamId {
        &self.team_id
    }

    /// The locator to poll for operation status
    #[must_use]
    pub fn status_url(&self) -> &str {
        &self.status_url
    }
}

// ============================================================================
// OperationStatus
// ============================================================================

/// Status observed on the long-running creation operation
///
/// Transitions are observed, not driven. Unknown status strings are treated
/// as still in progress; the waiter only trusts exact terminal values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OperationStatus {
    /// The operation has not reached a terminal state
    InProgress,
    /// The resource is fully created and usable
    Succeeded,
    /// The operation terminally failed
    Failed,
}

impl OperationStatus {
    /// Parse a wire status string; unknown values map to `InProgress`
    #[must_use]
    pub fn from_wire(status: &str) -> Self {
        match status {
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            _ => Self::InProgress,
        }
    }

    /// Returns true for `Succeeded` and `Failed`
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

impl Display for OperationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InProgress => "inProgress",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

// ============================================================================
// ProvisioningState
// ============================================================================

/// State machine driven by the bounded waiter
///
/// Unlike the raw [`OperationStatus`], this includes the waiter-side
/// terminal states (`TimedOut`) and enforces that no transition leaves a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningState {
    /// Still waiting for a terminal observation
    Pending,
    /// The resource is usable
    Succeeded,
    /// The remote operation failed terminally
    Failed,
    /// The wait ceiling expired before a terminal observation
    TimedOut,
}

impl ProvisioningState {
    /// Apply an observed status; errors on transitions out of terminal states
    ///
    /// # Errors
    /// Returns error if this state is already terminal
    pub fn observe(self, status: OperationStatus) -> Result<Self, DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidState {
                from: format!("{self:?}"),
                to: format!("{status}"),
            });
        }
        Ok(match status {
            OperationStatus::InProgress => Self::Pending,
            OperationStatus::Succeeded => Self::Succeeded,
            OperationStatus::Failed => Self::Failed,
        })
    }

    /// Mark the wait ceiling as expired; errors if already terminal
    ///
    /// # Errors
    /// Returns error if this state is already terminal
    pub fn expire(self) -> Result<Self, DomainError> {
        if self.is_terminal() {
            return Err(DomainError::InvalidState {
                from: format!("{self:?}"),
                to: "TimedOut".to_string(),
            });
        }
        Ok(Self::TimedOut)
    }

    /// Returns true for any state the waiter must not poll past
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

// ============================================================================
// StorageCoordinates
// ============================================================================

/// Identifiers locating where a team channel's files physically reside
///
/// Resolved from a provisioned team; immutable once resolved. Resolution may
/// fail with a retryable "not ready" signature for a bounded window after
/// creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageCoordinates {
    /// The drive backing the channel's file library
    pub drive_id: DriveId,
    /// The channel whose folder the drive location was read from
    pub channel_id: ChannelId,
}

impl StorageCoordinates {
    /// Create coordinates from the resolved pair
    pub fn new(drive_id: DriveId, channel_id: ChannelId) -> Self {
        Self {
            drive_id,
            channel_id,
        }
    }
}

// ============================================================================
// UploadSession
// ============================================================================

/// An in-progress resumable transfer
///
/// Tracks the server-assigned session endpoint and the committed byte
/// cursor. The cursor is monotonically non-decreasing and never exceeds
/// the total size.
#[derive(Debug, Clone)]
pub struct UploadSession {
    session_url: String,
    total_size: u64,
    cursor: u64,
}

impl UploadSession {
    /// Create a session with the cursor at zero
    pub fn new(session_url: impl Into<String>, total_size: u64) -> Self {
        Self {
            session_url: session_url.into(),
            total_size,
            cursor: 0,
        }
    }

    /// The opaque transfer endpoint supplied by the downstream store
    #[must_use]
    pub fn session_url(&self) -> &str {
        &self.session_url
    }

    /// Total payload size in bytes
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Bytes already committed
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Advance the cursor past a committed range ending at `range_end`
    /// (inclusive)
    ///
    /// # Errors
    /// Returns error if the advance would move backwards or past the total
    pub fn commit_through(&mut self, range_end: u64) -> Result<(), DomainError> {
        let next = range_end + 1;
        if next < self.cursor || next > self.total_size {
            return Err(DomainError::ValidationFailed(format!(
                "cursor advance to {next} out of range (cursor={}, total={})",
                self.cursor, self.total_size
            )));
        }
        self.cursor = next;
        Ok(())
    }

    /// Returns true once every byte is committed
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cursor == self.total_size
    }
}

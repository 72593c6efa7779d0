//! Directory port (driven/secondary port)
//!
//! Interface for identity resolution and team membership mutation. The
//! reconciler runs entirely over this trait, so its classification and
//! retry behavior can be unit-tested with an in-memory implementation.

use serde::{Deserialize, Serialize};

use crate::domain::errors::ProviderError;
use crate::domain::newtypes::{Email, TeamId};

// ============================================================================
// DTOs
// ============================================================================

/// A resolved directory identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Directory object id
    pub id: String,
    /// Display name, when the directory exposes one
    pub display_name: Option<String>,
    /// Primary mail address, when the directory exposes one
    pub mail: Option<String>,
}

/// One entry of a team's live member snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    /// Membership record id
    pub id: String,
    /// The member's email, when known (used for the presence check)
    pub email: Option<String>,
    /// Roles currently applied to the membership
    pub roles: Vec<String>,
}

// ============================================================================
// IDirectory trait
// ============================================================================

/// Port trait for identity and membership operations
#[async_trait::async_trait]
pub trait IDirectory: Send + Sync {
    /// Resolves a directory identity by email address
    ///
    /// Newly provisioned identities are eventually consistent; callers own
    /// the retry policy for the visibility window.
    async fn find_user_by_email(&self, email: &Email) -> Result<DirectoryUser, ProviderError>;

    /// Fetches the current member snapshot of a team
    async fn list_members(&self, team_id: &TeamId) -> Result<Vec<TeamMember>, ProviderError>;

    /// Adds a resolved identity to the team with the given role array
    ///
    /// An empty role array means the default member role.
    async fn add_member(
        &self,
        team_id: &TeamId,
        user_id: &str,
        roles: &[String],
    ) -> Result<(), ProviderError>;

    /// Looks up an existing guest account by mail-prefix match
    ///
    /// Guest accounts carry mangled principal names, so the lookup matches
    /// on the mail prefix rather than the full address.
    async fn find_guest_by_mail_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<DirectoryUser>, ProviderError>;

    /// Creates a tenant invitation for an external guest
    ///
    /// # Arguments
    /// * `email` - The guest's address
    /// * `redirect_url` - Where the redemption flow lands the guest
    async fn invite_guest(&self, email: &Email, redirect_url: &str)
        -> Result<(), ProviderError>;
}

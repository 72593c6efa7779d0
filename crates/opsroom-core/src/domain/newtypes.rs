//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for the identifiers that flow between the
//! provisioning stages. Each newtype validates at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// String-based Graph identifiers
// ============================================================================

/// Characters permitted in Graph resource identifiers (team, drive, channel).
///
/// Teams channel ids look like `19:abc123...@thread.tacv2`, drive ids are
/// base64-like, team ids are GUIDs. The shared rule is printable ASCII with
/// no whitespace.
fn is_valid_graph_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_graphic())
}

/// Identifier of a team (the provisioned container)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamId(String);

impl TeamId {
    /// Create a new TeamId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace/control chars
    pub fn new(id: String) -> Result<Self, DomainError> {
        if !is_valid_graph_id(&id) {
            return Err(DomainError::InvalidTeamId(format!(
                "Team ID must be non-empty printable ASCII: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TeamId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TeamId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Identifier of the drive where channel files land
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriveId(String);

impl DriveId {
    /// Create a new DriveId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace/control chars
    pub fn new(id: String) -> Result<Self, DomainError> {
        if !is_valid_graph_id(&id) {
            return Err(DomainError::InvalidDriveId(format!(
                "Drive ID must be non-empty printable ASCII: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DriveId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DriveId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Identifier of a channel within a team
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Create a new ChannelId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace/control chars
    pub fn new(id: String) -> Result<Self, DomainError> {
        if !is_valid_graph_id(&id) {
            return Err(DomainError::InvalidChannelId(format!(
                "Channel ID must be non-empty printable ASCII: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ChannelId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChannelId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

/// Identifier of the tenant (directory) the workspace belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Create a new TenantId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains whitespace/control chars
    pub fn new(id: String) -> Result<Self, DomainError> {
        if !is_valid_graph_id(&id) {
            return Err(DomainError::InvalidTenantId(format!(
                "Tenant ID must be non-empty printable ASCII: {id:?}"
            )));
        }
        Ok(Self(id))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TenantId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

// ============================================================================
// Email
// ============================================================================

/// A validated email address, stored lowercase
///
/// Membership comparisons are case-insensitive per the directory's
/// matching rules, so the canonical lowercase form is kept internally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Create a new validated Email
    ///
    /// # Errors
    /// Returns error if the email format is invalid
    pub fn new(email: String) -> Result<Self, DomainError> {
        Self::validate(&email)?;
        Ok(Self(email.to_lowercase()))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the local part (before @), used for guest mail-prefix matching
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    /// Get the domain part (after @)
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }

    /// Case-insensitive comparison against an arbitrary address string
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0 == other.to_lowercase()
    }

    /// Validate email format
    fn validate(email: &str) -> Result<(), DomainError> {
        if email.is_empty() {
            return Err(DomainError::InvalidEmail(
                "Email cannot be empty".to_string(),
            ));
        }

        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return Err(DomainError::InvalidEmail(format!(
                "Email must contain exactly one '@': {email}"
            )));
        }

        let (local, domain) = (parts[0], parts[1]);
        if local.is_empty() {
            return Err(DomainError::InvalidEmail(format!(
                "Email local part cannot be empty: {email}"
            )));
        }
        if domain.is_empty() || !domain.contains('.') {
            return Err(DomainError::InvalidEmail(format!(
                "Email domain must contain a dot: {email}"
            )));
        }
        if email.chars().any(|c| c.is_whitespace()) {
            return Err(DomainError::InvalidEmail(format!(
                "Email cannot contain whitespace: {email}"
            )));
        }

        Ok(())
    }
}

impl Display for Email {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Email {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_id_accepts_guid() {
        let id = TeamId::new("2ab9c796-2902-45f8-b712-7c5c63e30c2b".to_string()).unwrap();
        assert_eq!(id.as_str(), "2ab9c796-2902-45f8-b712-7c5c63e30c2b");
    }

    #[test]
    fn test_team_id_rejects_empty_and_whitespace() {
        assert!(TeamId::new(String::new()).is_err());
        assert!(TeamId::new("has space".to_string()).is_err());
    }

    #[test]
    fn test_channel_id_accepts_thread_format() {
        let id = ChannelId::new("19:abc123def@thread.tacv2".to_string()).unwrap();
        assert_eq!(id.as_str(), "19:abc123def@thread.tacv2");
    }

    #[test]
    fn test_drive_id_accepts_base64_like() {
        let id = DriveId::new("b!CQwzMG1R-kKrtBrqYK98mw".to_string()).unwrap();
        assert_eq!(id.as_str(), "b!CQwzMG1R-kKrtBrqYK98mw");
    }

    #[test]
    fn test_email_lowercases() {
        let email = Email::new("First.Last@Example.COM".to_string()).unwrap();
        assert_eq!(email.as_str(), "first.last@example.com");
        assert_eq!(email.local_part(), "first.last");
        assert_eq!(email.domain(), "example.com");
    }

    #[test]
    fn test_email_case_insensitive_match() {
        let email = Email::new("a@x.com".to_string()).unwrap();
        assert!(email.matches("A@X.COM"));
        assert!(!email.matches("b@x.com"));
    }

    #[test]
    fn test_email_rejects_invalid() {
        assert!(Email::new(String::new()).is_err());
        assert!(Email::new("no-at-sign".to_string()).is_err());
        assert!(Email::new("two@@x.com".to_string()).is_err());
        assert!(Email::new("a@nodot".to_string()).is_err());
        assert!(Email::new("a b@x.com".to_string()).is_err());
    }

    #[test]
    fn test_from_str_roundtrip() {
        let id: TeamId = "team-1".parse().unwrap();
        assert_eq!(id.to_string(), "team-1");
        let email: Email = "a@x.com".parse().unwrap();
        assert_eq!(email.to_string(), "a@x.com");
    }
}

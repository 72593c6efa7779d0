//! Desired-membership roster and reconciliation outcomes
//!
//! A roster is the externally supplied list of members a provisioned team
//! should end up with. Reconciliation classifies each requested member
//! against the live member snapshot and records one outcome per member.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::newtypes::Email;

// ============================================================================
// Roles
// ============================================================================

/// Requested role for a member
///
/// Unrecognized role strings are carried rather than rejected at parse time
/// so the reconciler can report them per member instead of failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Added with the `owner` role
    Owner,
    /// Added with the default (empty) role set
    Member,
    /// Invited into the tenant; never added to the team directly
    Guest,
    /// A role string this system does not know how to apply
    #[serde(untagged)]
    Unknown(String),
}

impl MemberRole {
    /// Parse a role string; anything unrecognized becomes `Unknown`
    #[must_use]
    pub fn from_wire(role: &str) -> Self {
        match role.to_lowercase().as_str() {
            "owner" => Self::Owner,
            "member" => Self::Member,
            "guest" => Self::Guest,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// The role array sent on a member-add call, if this role supports one
    #[must_use]
    pub fn add_roles(&self) -> Option<Vec<String>> {
        match self {
            Self::Owner => Some(vec!["owner".to_string()]),
            Self::Member => Some(Vec::new()),
            Self::Guest | Self::Unknown(_) => None,
        }
    }
}

// ============================================================================
// MemberRequest
// ============================================================================

/// One entry of the desired member list; read-only input to the reconciler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRequest {
    /// The member's email address
    pub email: Email,
    /// The requested role
    pub role: MemberRole,
}

impl MemberRequest {
    /// Create a request from an already-validated email and role
    pub fn new(email: Email, role: MemberRole) -> Self {
        Self { email, role }
    }
}

// ============================================================================
// Outcomes and report
// ============================================================================

/// Per-member result of one reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum MemberOutcome {
    /// The member was added with the stated role array
    Added {
        /// Roles applied on the add call
        roles: Vec<String>,
    },
    /// The member was already present in the live snapshot; skipped
    AlreadyMember,
    /// A tenant invitation was created for the guest
    GuestInvited,
    /// The guest already exists in the tenant; no action taken, since
    /// direct guest-to-team addition is unsupported in this design
    GuestPresent,
    /// Identity resolution or the add call failed after the retry budget
    Unresolved {
        /// The last failure observed
        reason: String,
    },
    /// The requested role has no remediation path
    UnknownRole {
        /// The role string as requested
        role: String,
    },
}

/// One line of the reconciliation report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    /// The requested member's email
    pub email: Email,
    /// What happened for that member
    pub outcome: MemberOutcome,
}

/// Aggregated outcomes of one reconciliation run, for caller-visible auditing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    entries: Vec<ReportEntry>,
    generated_at: DateTime<Utc>,
}

impl ReconciliationReport {
    /// Create an empty report stamped with the current time
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    /// Record one member outcome
    pub fn record(&mut self, email: Email, outcome: MemberOutcome) {
        self.entries.push(ReportEntry { email, outcome });
    }

    /// All entries, in roster order
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// When this report was started
    #[must_use]
    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Number of members actually added this run
    #[must_use]
    pub fn added_count(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Added { .. }))
    }

    /// Number of members already present in the snapshot
    #[must_use]
    pub fn already_member_count(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::AlreadyMember))
    }

    /// Number of tenant invitations created
    #[must_use]
    pub fn invited_count(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::GuestInvited))
    }

    /// Number of members that could not be resolved or added
    #[must_use]
    pub fn unresolved_count(&self) -> usize {
        self.count(|o| matches!(o, MemberOutcome::Unresolved { .. }))
    }

    fn count(&self, pred: impl Fn(&MemberOutcome) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.outcome)).count()
    }
}

impl Default for ReconciliationReport {
    fn default() -> Self {
        Self::new()
    }
}

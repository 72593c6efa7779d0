//! Membership reconciliation use case
//!
//! Applies a desired member roster to a provisioned team. For each
//! requested member the reconciler classifies against the live member
//! snapshot and remediates per role class; one member's failure never
//! aborts the rest of the roster.
//!
//! ## Design Notes
//!
//! - The member snapshot is fetched once per reconciliation call and
//!   checked with case-insensitive email comparison, so re-running the
//!   same roster is safe: previously added members classify as
//!   `AlreadyMember`.
//! - Identity lookups for newly provisioned users are eventually
//!   consistent; the lookup retries a few times before recording the
//!   member as unresolved.
//! - Guests are never added to the team directly, only invited into the
//!   tenant. Direct guest addition needs delegated permissions this
//!   service does not hold.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::errors::{FlowError, ProviderError};
use crate::domain::newtypes::{Email, TeamId};
use crate::domain::roster::{MemberOutcome, MemberRequest, MemberRole, ReconciliationReport};
use crate::ports::directory::{DirectoryUser, IDirectory};

/// Retry parameters for the identity-lookup visibility window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(2),
        }
    }
}

/// Use case that reconciles desired membership against a live team
pub struct ReconcileMembersUseCase {
    directory: Arc<dyn IDirectory>,
    policy: LookupPolicy,
    invite_redirect_url: String,
}

impl ReconcileMembersUseCase {
    /// Creates the use case
    ///
    /// # Arguments
    /// * `directory` - Identity and membership operations
    /// * `policy` - Identity-lookup retry parameters
    /// * `invite_redirect_url` - Where guest invitation redemption lands
    pub fn new(
        directory: Arc<dyn IDirectory>,
        policy: LookupPolicy,
        invite_redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            directory,
            policy,
            invite_redirect_url: invite_redirect_url.into(),
        }
    }

    /// Applies the desired roster to the team and reports per-member outcomes
    ///
    /// # Errors
    /// - [`FlowError::Provider`] if the member snapshot itself cannot be
    ///   fetched (without it no classification is possible)
    /// - [`FlowError::Cancelled`] when the cancellation signal is raised
    ///
    /// Per-member failures are recorded in the report, never raised.
    pub async fn reconcile(
        &self,
        team_id: &TeamId,
        desired: &[MemberRequest],
        cancel: &CancellationToken,
    ) -> Result<ReconciliationReport, FlowError> {
        let snapshot = self.directory.list_members(team_id).await?;
        let mut present: HashSet<String> = snapshot
            .iter()
            .filter_map(|m| m.email.as_ref())
            .map(|e| e.to_lowercase())
            .collect();
        debug!(%team_id, members = present.len(), requested = desired.len(), "Reconciling roster");

        let mut report = ReconciliationReport::new();

        for request in desired {
            if cancel.is_cancelled() {
                return Err(FlowError::Cancelled);
            }

            if present.contains(request.email.as_str()) {
                debug!(email = %request.email, "Already a member, skipping");
                report.record(request.email.clone(), MemberOutcome::AlreadyMember);
                continue;
            }

            let outcome = match &request.role {
                MemberRole::Owner | MemberRole::Member => {
                    self.add_with_role(team_id, request, cancel).await?
                }
                MemberRole::Guest => self.invite(request).await,
                MemberRole::Unknown(role) => {
                    warn!(email = %request.email, role, "Unrecognized role, skipping");
                    MemberOutcome::UnknownRole { role: role.clone() }
                }
            };

            if matches!(outcome, MemberOutcome::Added { .. }) {
                // A member is added at most once per run even if the
                // roster repeats the address.
                present.insert(request.email.as_str().to_string());
            }
            report.record(request.email.clone(), outcome);
        }

        info!(
            %team_id,
            added = report.added_count(),
            already = report.already_member_count(),
            invited = report.invited_count(),
            unresolved = report.unresolved_count(),
            "Reconciliation finished"
        );
        Ok(report)
    }

    /// Owner/member path: resolve the identity, then issue the add call
    async fn add_with_role(
        &self,
        team_id: &TeamId,
        request: &MemberRequest,
        cancel: &CancellationToken,
    ) -> Result<MemberOutcome, FlowError> {
        let user = match self.resolve_with_retry(&request.email, cancel).await? {
            Ok(user) => user,
            Err(err) => {
                warn!(email = %request.email, %err, "Identity resolution exhausted its retries");
                return Ok(MemberOutcome::Unresolved {
                    reason: err.to_string(),
                });
            }
        };

        // Owner/Member always carry a role array
        let roles = request.role.add_roles().unwrap_or_default();

        match self.directory.add_member(team_id, &user.id, &roles).await {
            Ok(()) => {
                info!(email = %request.email, ?roles, "Member added");
                Ok(MemberOutcome::Added { roles })
            }
            Err(err) => {
                warn!(email = %request.email, %err, "Member add failed");
                Ok(MemberOutcome::Unresolved {
                    reason: err.to_string(),
                })
            }
        }
    }

    /// Guest path: mail-prefix lookup, tenant invitation when absent
    async fn invite(&self, request: &MemberRequest) -> MemberOutcome {
        match self
            .directory
            .find_guest_by_mail_prefix(request.email.local_part())
            .await
        {
            Ok(Some(_)) => {
                debug!(email = %request.email, "Guest already present in tenant");
                MemberOutcome::GuestPresent
            }
            Ok(None) => match self
                .directory
                .invite_guest(&request.email, &self.invite_redirect_url)
                .await
            {
                Ok(()) => {
                    info!(email = %request.email, "Guest invitation created");
                    MemberOutcome::GuestInvited
                }
                Err(err) => {
                    warn!(email = %request.email, %err, "Guest invitation failed");
                    MemberOutcome::Unresolved {
                        reason: err.to_string(),
                    }
                }
            },
            Err(err) => {
                warn!(email = %request.email, %err, "Guest lookup failed");
                MemberOutcome::Unresolved {
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Identity lookup with the eventual-consistency retry window
    ///
    /// The outer `Result` is for run-level aborts (cancellation); the inner
    /// one carries the per-member lookup result.
    async fn resolve_with_retry(
        &self,
        email: &Email,
        cancel: &CancellationToken,
    ) -> Result<Result<DirectoryUser, ProviderError>, FlowError> {
        let mut last_err: Option<ProviderError> = None;

        for attempt in 0..=self.policy.max_retries {
            match self.directory.find_user_by_email(email).await {
                Ok(user) => return Ok(Ok(user)),
                Err(err) => {
                    debug!(%email, attempt, %err, "Identity lookup failed");
                    last_err = Some(err);
                }
            }

            if attempt < self.policy.max_retries {
                tokio::select! {
                    () = cancel.cancelled() => return Err(FlowError::Cancelled),
                    () = tokio::time::sleep(self.policy.delay) => {}
                }
            }
        }

        Ok(Err(last_err.unwrap_or(ProviderError::InvalidResponse(
            "identity lookup produced no result".to_string(),
        ))))
    }
}

//! End-to-end workspace provisioning flow
//!
//! Composes the sub-use-cases into the full pipeline: create the team,
//! wait for the long-running operation, resolve storage coordinates,
//! upload the artifact, build the deep link, reconcile membership, and
//! broadcast the link to registered recipients.
//!
//! ## Design Notes
//!
//! - The flow is fail-fast through the upload: any stage failure up to
//!   and including link construction aborts with a flow-level error.
//!   Membership failures are isolated per member, and broadcast failures
//!   are logged and counted but never abort the flow.
//! - A caller-supplied observer sees committed byte ranges as they land;
//!   the flow additionally tracks the committed cursor itself so an
//!   aborted upload reports how far it got.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::deeplink::{build_deep_link, DeepLink};
use crate::domain::errors::FlowError;
use crate::domain::newtypes::{TeamId, TenantId};
use crate::domain::provisioning::StorageCoordinates;
use crate::domain::roster::{MemberRequest, ReconciliationReport};
use crate::ports::directory::IDirectory;
use crate::ports::file_store::{IFileStore, ProgressObserver, UploadedItem};
use crate::ports::notification::{INotifier, IRecipientSource};
use crate::ports::workspace_provider::{IWorkspaceProvider, TeamSpec};

use super::await_provisioning::{AwaitProvisioningUseCase, PollPolicy};
use super::reconcile_members::{LookupPolicy, ReconcileMembersUseCase};
use super::resolve_coordinates::{ResolveCoordinatesUseCase, RetryPolicy};

// ============================================================================
// Request / outcome
// ============================================================================

/// Reference to a workspace that already exists
///
/// When supplied, creation and the provisioning wait are skipped entirely;
/// the flow starts at coordinate resolution (or the upload, if coordinates
/// are already known).
#[derive(Debug, Clone)]
pub struct ExistingWorkspace {
    /// The existing team
    pub team_id: TeamId,
    /// Known storage coordinates, if resolution can be skipped too
    pub coordinates: Option<StorageCoordinates>,
}

/// Everything one provisioning run needs
#[derive(Debug, Clone)]
pub struct WorkspaceRequest {
    /// What to create (ignored when `existing` is set)
    pub team: TeamSpec,
    /// Display name of the distinguished channel whose library receives
    /// the artifact
    pub channel_name: String,
    /// Target file name within the channel folder
    pub file_name: String,
    /// Complete artifact payload
    pub payload: Vec<u8>,
    /// Desired member roster to reconcile after the upload
    pub roster: Vec<MemberRequest>,
    /// Tenant the deep link is scoped to
    pub tenant_id: TenantId,
    /// Reuse an existing workspace instead of creating one
    pub existing: Option<ExistingWorkspace>,
}

/// What one completed run produced
#[derive(Debug)]
pub struct WorkspaceOutcome {
    /// The team the artifact landed in
    pub team_id: TeamId,
    /// Where the channel's files reside
    pub coordinates: StorageCoordinates,
    /// Metadata of the stored artifact
    pub item: UploadedItem,
    /// Client-openable link to the stored artifact
    pub deep_link: DeepLink,
    /// Per-member reconciliation outcomes
    pub membership: ReconciliationReport,
    /// Recipients notified successfully
    pub notified: usize,
    /// Recipients whose notification failed (non-fatal)
    pub notify_failures: usize,
}

/// Tunables for one flow instance
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// Provisioning wait parameters
    pub poll: PollPolicy,
    /// Coordinate lookup retry parameters
    pub coordinate_retry: RetryPolicy,
    /// Identity lookup retry parameters
    pub member_lookup: LookupPolicy,
    /// Recipient page size for the broadcast
    pub recipient_page_size: usize,
    /// Where guest invitation redemption lands
    pub invite_redirect_url: String,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            poll: PollPolicy::default(),
            coordinate_retry: RetryPolicy::default(),
            member_lookup: LookupPolicy::default(),
            recipient_page_size: 50,
            invite_redirect_url: "https://teams.microsoft.com".to_string(),
        }
    }
}

// ============================================================================
// Use case
// ============================================================================

/// Use case driving the whole provisioning pipeline
pub struct ProvisionWorkspaceUseCase {
    provider: Arc<dyn IWorkspaceProvider>,
    store: Arc<dyn IFileStore>,
    recipients: Arc<dyn IRecipientSource>,
    notifier: Arc<dyn INotifier>,
    waiter: AwaitProvisioningUseCase,
    resolver: ResolveCoordinatesUseCase,
    reconciler: ReconcileMembersUseCase,
    page_size: usize,
}

impl ProvisionWorkspaceUseCase {
    /// Wires the flow from its ports and tunables
    pub fn new(
        provider: Arc<dyn IWorkspaceProvider>,
        store: Arc<dyn IFileStore>,
        directory: Arc<dyn IDirectory>,
        recipients: Arc<dyn IRecipientSource>,
        notifier: Arc<dyn INotifier>,
        config: FlowConfig,
    ) -> Self {
        Self {
            waiter: AwaitProvisioningUseCase::new(provider.clone(), config.poll),
            resolver: ResolveCoordinatesUseCase::new(provider.clone(), config.coordinate_retry),
            reconciler: ReconcileMembersUseCase::new(
                directory,
                config.member_lookup,
                config.invite_redirect_url,
            ),
            provider,
            store,
            recipients,
            notifier,
            page_size: config.recipient_page_size,
        }
    }

    /// Runs the pipeline to completion
    ///
    /// # Arguments
    /// * `request` - What to provision and upload
    /// * `progress` - Optional observer of committed upload ranges
    /// * `cancel` - Cooperative cancellation signal honored between stages
    ///   and inside every waiting loop
    ///
    /// # Errors
    /// Any flow-level failure up to link construction; membership and
    /// broadcast problems are reported in the outcome instead.
    pub async fn execute(
        &self,
        request: WorkspaceRequest,
        progress: Option<ProgressObserver>,
        cancel: &CancellationToken,
    ) -> Result<WorkspaceOutcome, FlowError> {
        let (team_id, known_coordinates) = match &request.existing {
            Some(existing) => {
                info!(team_id = %existing.team_id, "Reusing existing workspace");
                (existing.team_id.clone(), existing.coordinates.clone())
            }
            None => {
                let handle = self.provider.create_team(&request.team).await?;
                info!(team_id = %handle.team_id(), "Team creation accepted");
                self.waiter.await_completion(&handle, cancel).await?;
                (handle.team_id().clone(), None)
            }
        };

        let coordinates = match known_coordinates {
            Some(coordinates) => coordinates,
            None => {
                self.resolver
                    .resolve(&team_id, &request.channel_name, cancel)
                    .await?
            }
        };

        if cancel.is_cancelled() {
            return Err(FlowError::Cancelled);
        }
        let item = self.upload(&request, &coordinates, progress).await?;
        info!(item_id = %item.id, name = %item.name, "Artifact stored");

        let deep_link = self.link_for(&request, &team_id, &coordinates, &item)?;
        debug!(link = %deep_link, "Deep link constructed");

        if cancel.is_cancelled() {
            return Err(FlowError::Cancelled);
        }
        let membership = self
            .reconciler
            .reconcile(&team_id, &request.roster, cancel)
            .await?;

        let (notified, notify_failures) = self.broadcast(&deep_link, cancel).await?;

        Ok(WorkspaceOutcome {
            team_id,
            coordinates,
            item,
            deep_link,
            membership,
            notified,
            notify_failures,
        })
    }

    /// Runs the chunked transfer, tracking the committed cursor so a
    /// failure can report how many bytes landed
    async fn upload(
        &self,
        request: &WorkspaceRequest,
        coordinates: &StorageCoordinates,
        progress: Option<ProgressObserver>,
    ) -> Result<UploadedItem, FlowError> {
        let committed = Arc::new(AtomicU64::new(0));
        let cursor = committed.clone();
        let observer: ProgressObserver = Box::new(move |start, end| {
            cursor.store(end + 1, Ordering::SeqCst);
            if let Some(outer) = &progress {
                outer(start, end);
            }
        });

        self.store
            .upload(
                coordinates,
                &request.channel_name,
                &request.file_name,
                &request.payload,
                Some(observer),
            )
            .await
            .map_err(|source| FlowError::UploadFailed {
                committed: committed.load(Ordering::SeqCst),
                source,
            })
    }

    /// Builds the deep link from the stored item's metadata
    fn link_for(
        &self,
        request: &WorkspaceRequest,
        team_id: &TeamId,
        coordinates: &StorageCoordinates,
        item: &UploadedItem,
    ) -> Result<DeepLink, FlowError> {
        let revision_tag = item.revision_tag.as_deref().ok_or_else(|| {
            FlowError::DeepLinkConstructionFailed(
                "stored item carries no revision tag".to_string(),
            )
        })?;
        let web_url = item.web_url.as_deref().ok_or_else(|| {
            FlowError::DeepLinkConstructionFailed(
                "stored item carries no reference URL".to_string(),
            )
        })?;
        build_deep_link(
            revision_tag,
            web_url,
            &request.tenant_id,
            team_id,
            &coordinates.channel_id,
        )
    }

    /// Pages through registered recipients and delivers the link to each
    ///
    /// Per-recipient failures are counted, not raised. A failed page fetch
    /// ends the broadcast early with a warning; recipients already notified
    /// stay notified.
    async fn broadcast(
        &self,
        link: &DeepLink,
        cancel: &CancellationToken,
    ) -> Result<(usize, usize), FlowError> {
        let mut notified = 0usize;
        let mut failures = 0usize;
        let mut continuation: Option<String> = None;

        loop {
            if cancel.is_cancelled() {
                return Err(FlowError::Cancelled);
            }

            let page = match self
                .recipients
                .page(self.page_size, continuation.as_deref())
                .await
            {
                Ok(page) => page,
                Err(err) => {
                    warn!(%err, notified, "Recipient page fetch failed, ending broadcast");
                    break;
                }
            };

            for recipient in &page.items {
                match self.notifier.notify(recipient, link).await {
                    Ok(()) => notified += 1,
                    Err(err) => {
                        warn!(
                            conversation_id = %recipient.conversation_id,
                            %err,
                            "Notification delivery failed"
                        );
                        failures += 1;
                    }
                }
            }

            match page.continuation {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        info!(notified, failures, "Broadcast finished");
        Ok((notified, failures))
    }
}

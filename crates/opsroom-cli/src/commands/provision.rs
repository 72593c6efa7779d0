//! Provision command - run the workspace provisioning pipeline
//!
//! Provides the `opsroom provision` CLI command which:
//! 1. Creates (or reuses) a team and waits for provisioning to finish
//! 2. Resolves the channel's file library and uploads the artifact
//! 3. Reconciles the roster and broadcasts the deep link

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use opsroom_core::config::Config;
use opsroom_core::domain::newtypes::{ChannelId, DriveId, Email, TeamId, TenantId};
use opsroom_core::domain::provisioning::StorageCoordinates;
use opsroom_core::domain::roster::{MemberRequest, MemberRole};
use opsroom_core::ports::directory::IDirectory;
use opsroom_core::ports::file_store::{IFileStore, ProgressObserver};
use opsroom_core::ports::notification::{INotifier, IRecipientSource};
use opsroom_core::ports::workspace_provider::{IWorkspaceProvider, TeamSpec};
use opsroom_core::usecases::provision_workspace::{
    ExistingWorkspace, ProvisionWorkspaceUseCase, WorkspaceRequest,
};
use opsroom_graph::auth::{AppAuthConfig, ClientCredentialsAuth};
use opsroom_graph::client::GraphClient;
use opsroom_graph::provider::GraphWorkspaceProvider;

use crate::output::OutputFormat;
use crate::recipients::{FileRecipientSource, LogNotifier};

/// Arguments of the provision command
#[derive(Debug, Args)]
pub struct ProvisionCommand {
    /// Display name of the workspace team
    #[arg(long)]
    name: String,

    /// Description of the workspace team
    #[arg(long, default_value = "")]
    description: String,

    /// Directory object id of the initial owner
    #[arg(long)]
    owner: String,

    /// File to upload into the channel library
    file: PathBuf,

    /// Roster entry as EMAIL=ROLE (owner|member|guest); repeatable
    #[arg(long = "member", value_name = "EMAIL=ROLE")]
    members: Vec<String>,

    /// Reuse an existing team instead of creating one
    #[arg(long)]
    team_id: Option<String>,

    /// Known drive id of the channel library (skips coordinate resolution)
    #[arg(long, requires = "team_id", requires = "channel_id")]
    drive_id: Option<String>,

    /// Known channel id backing that drive
    #[arg(long, requires = "drive_id")]
    channel_id: Option<String>,

    /// YAML file listing broadcast recipients
    #[arg(long)]
    recipients: Option<PathBuf>,
}

impl ProvisionCommand {
    /// Execute the provision command
    pub async fn execute(&self, format: OutputFormat, config: &Config) -> Result<()> {
        let errors = config.validate();
        if !errors.is_empty() {
            for error in &errors {
                format.error(&error.to_string());
            }
            bail!("configuration is invalid");
        }

        let tenant_id = config
            .tenant
            .tenant_id
            .clone()
            .context("tenant.tenant_id is not configured")?;
        let client_id = config
            .tenant
            .client_id
            .clone()
            .context("tenant.client_id is not configured")?;
        let client_secret = std::env::var(&config.tenant.client_secret_env).with_context(|| {
            format!(
                "client secret not found in ${}",
                config.tenant.client_secret_env
            )
        })?;

        let roster = parse_roster(&self.members)?;
        let payload = std::fs::read(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;
        let file_name = self
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("upload path has no file name")?;

        let auth = ClientCredentialsAuth::new(&AppAuthConfig::new(
            tenant_id.clone(),
            client_id,
            client_secret,
        ))?;
        let client = GraphClient::new(Arc::new(auth));
        let provider = Arc::new(GraphWorkspaceProvider::with_chunk_size(
            client,
            config.upload.chunk_size_bytes as usize,
        ));

        let recipients: Arc<dyn IRecipientSource> = match &self.recipients {
            Some(path) => Arc::new(FileRecipientSource::load(path)?),
            None => Arc::new(FileRecipientSource::empty()),
        };
        let flow = ProvisionWorkspaceUseCase::new(
            provider.clone() as Arc<dyn IWorkspaceProvider>,
            provider.clone() as Arc<dyn IFileStore>,
            provider as Arc<dyn IDirectory>,
            recipients,
            Arc::new(LogNotifier) as Arc<dyn INotifier>,
            config.flow_config(),
        );

        let request = WorkspaceRequest {
            team: TeamSpec {
                template_id: config.workspace.template_id.clone(),
                display_name: self.name.clone(),
                description: self.description.clone(),
                owner_id: self.owner.clone(),
            },
            channel_name: config.workspace.channel_name.clone(),
            file_name,
            payload,
            roster,
            tenant_id: TenantId::new(tenant_id).map_err(anyhow::Error::from)?,
            existing: self.existing_workspace()?,
        };

        // Ctrl-C flips the cooperative cancellation token; the flow stops
        // at the next stage boundary or waiting loop.
        let cancel = CancellationToken::new();
        let signal_token = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling");
                signal_token.cancel();
            }
        });

        let progress: Option<ProgressObserver> = if format.is_json() {
            None
        } else {
            Some(Box::new(|start, end| {
                println!("  Uploaded bytes {start} to {end}");
            }))
        };

        let outcome = match flow.execute(request, progress, &cancel).await {
            Ok(outcome) => outcome,
            Err(e) => {
                format.error(&e.to_string());
                bail!("provisioning failed");
            }
        };

        if format.is_json() {
            format.document(&serde_json::json!({
                "team_id": outcome.team_id.as_str(),
                "drive_id": outcome.coordinates.drive_id.as_str(),
                "channel_id": outcome.coordinates.channel_id.as_str(),
                "item": outcome.item,
                "deep_link": outcome.deep_link.as_str(),
                "membership": outcome.membership,
                "notified": outcome.notified,
                "notify_failures": outcome.notify_failures,
            }));
        } else {
            format.success(&format!("Workspace ready: {}", outcome.team_id));
            format.detail(&format!("Uploaded {}", outcome.item.name));
            format.detail(&format!("Deep link: {}", outcome.deep_link));
            format.detail(&format!(
                "Members: {} added, {} already present, {} invited, {} unresolved",
                outcome.membership.added_count(),
                outcome.membership.already_member_count(),
                outcome.membership.invited_count(),
                outcome.membership.unresolved_count(),
            ));
            format.detail(&format!("Recipients notified: {}", outcome.notified));
            if outcome.notify_failures > 0 {
                format.warn(&format!(
                    "{} notification(s) failed; see the log",
                    outcome.notify_failures
                ));
            }
        }
        Ok(())
    }

    /// Maps the reuse flags onto the pipeline's existing-workspace input
    fn existing_workspace(&self) -> Result<Option<ExistingWorkspace>> {
        let Some(team_id) = &self.team_id else {
            return Ok(None);
        };
        let team_id = TeamId::new(team_id.clone()).map_err(anyhow::Error::from)?;
        let coordinates = match (&self.drive_id, &self.channel_id) {
            (Some(drive), Some(channel)) => Some(StorageCoordinates::new(
                DriveId::new(drive.clone()).map_err(anyhow::Error::from)?,
                ChannelId::new(channel.clone()).map_err(anyhow::Error::from)?,
            )),
            _ => None,
        };
        Ok(Some(ExistingWorkspace {
            team_id,
            coordinates,
        }))
    }
}

/// Parses `EMAIL=ROLE` roster arguments; a bare email defaults to member
fn parse_roster(entries: &[String]) -> Result<Vec<MemberRequest>> {
    entries
        .iter()
        .map(|entry| {
            let (email, role) = match entry.split_once('=') {
                Some((email, role)) => (email, MemberRole::from_wire(role)),
                None => (entry.as_str(), MemberRole::Member),
            };
            let email = Email::new(email.to_string())
                .map_err(|e| anyhow::anyhow!("invalid roster entry {entry:?}: {e}"))?;
            Ok(MemberRequest::new(email, role))
        })
        .collect()
}

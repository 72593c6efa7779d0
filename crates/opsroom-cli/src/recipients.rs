//! Local recipient directory and notifier adapters
//!
//! The CLI has no bot channel of its own, so the broadcast stage runs over
//! two lightweight adapters: a recipient list loaded from a YAML file,
//! paged the way a remote directory would page it, and a notifier that
//! reports each delivery through the log.

use std::path::Path;

use anyhow::{Context, Result};
use opsroom_core::domain::deeplink::DeepLink;
use opsroom_core::domain::errors::ProviderError;
use opsroom_core::ports::notification::{INotifier, IRecipientSource, Recipient, RecipientPage};
use tracing::info;

// ============================================================================
// FileRecipientSource
// ============================================================================

/// Recipient directory backed by an in-memory list
///
/// Pages through the list with an offset continuation token, so the
/// orchestration exercises the same paging loop it runs against a remote
/// source.
pub struct FileRecipientSource {
    recipients: Vec<Recipient>,
}

impl FileRecipientSource {
    /// Wraps an already-loaded recipient list
    #[must_use]
    pub fn new(recipients: Vec<Recipient>) -> Self {
        Self { recipients }
    }

    /// Loads the recipient list from a YAML file
    ///
    /// The file is a sequence of `{conversation_id, kind}` entries with
    /// `kind` one of `channel`, `group`, or `person`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipient file {}", path.display()))?;
        let recipients: Vec<Recipient> = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse recipient file {}", path.display()))?;
        Ok(Self::new(recipients))
    }

    /// An empty directory, for runs without a broadcast stage
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

#[async_trait::async_trait]
impl IRecipientSource for FileRecipientSource {
    async fn page(
        &self,
        page_size: usize,
        continuation: Option<&str>,
    ) -> Result<RecipientPage, ProviderError> {
        let offset = match continuation {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ProviderError::InvalidRequest(format!("bad page token {token:?}")))?,
            None => 0,
        };
        let end = (offset + page_size).min(self.recipients.len());
        let items = self.recipients[offset.min(end)..end].to_vec();
        let continuation = (end < self.recipients.len()).then(|| end.to_string());
        Ok(RecipientPage {
            items,
            continuation,
        })
    }
}

// ============================================================================
// LogNotifier
// ============================================================================

/// Notifier that records each delivery in the log
pub struct LogNotifier;

#[async_trait::async_trait]
impl INotifier for LogNotifier {
    async fn notify(&self, recipient: &Recipient, link: &DeepLink) -> Result<(), ProviderError> {
        info!(
            conversation_id = %recipient.conversation_id,
            kind = ?recipient.kind,
            link = %link,
            "Notified recipient"
        );
        Ok(())
    }
}

//! Notification ports (driven/secondary ports)
//!
//! The recipient directory and the broadcast channel are external
//! collaborators: the flow only needs to enumerate registered recipients
//! page by page and hand each one the deep link. Card rendering is the
//! notifier implementation's concern.

use serde::{Deserialize, Serialize};

use crate::domain::deeplink::DeepLink;
use crate::domain::errors::ProviderError;

// ============================================================================
// Recipient paging
// ============================================================================

/// Where a notification target was installed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    /// Installed to a team (notifies the default channel)
    Channel,
    /// Installed to a group chat
    Group,
    /// Installed as a personal app
    Person,
}

/// A registered notification target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    /// Opaque conversation reference understood by the notifier
    pub conversation_id: String,
    /// Installation scope of this target
    pub kind: RecipientKind,
}

/// One page of recipients with an optional continuation token
#[derive(Debug, Clone)]
pub struct RecipientPage {
    /// Recipients in this page
    pub items: Vec<Recipient>,
    /// Token for the next page; `None` on the last page
    pub continuation: Option<String>,
}

/// Port trait for the paged recipient directory
#[async_trait::async_trait]
pub trait IRecipientSource: Send + Sync {
    /// Fetches one page of registered recipients
    ///
    /// # Arguments
    /// * `page_size` - Maximum number of recipients per page
    /// * `continuation` - Token from the previous page, `None` for the first
    async fn page(
        &self,
        page_size: usize,
        continuation: Option<&str>,
    ) -> Result<RecipientPage, ProviderError>;
}

// ============================================================================
// Notifier
// ============================================================================

/// Port trait for broadcasting the artifact link to a recipient
#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    /// Delivers the availability notification carrying the deep link
    async fn notify(&self, recipient: &Recipient, link: &DeepLink) -> Result<(), ProviderError>;
}

//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the domain core
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IWorkspaceProvider`] - Team creation, status polling, coordinate lookup
//! - [`IFileStore`] - Resumable chunked upload into a channel's file library
//! - [`IDirectory`] - Identity resolution and membership mutation
//! - [`ITokenProvider`] - Opaque bearer-token acquisition
//! - [`IRecipientSource`] / [`INotifier`] - Paged recipient directory and broadcast

pub mod directory;
pub mod file_store;
pub mod notification;
pub mod token_provider;
pub mod workspace_provider;

pub use directory::{DirectoryUser, IDirectory, TeamMember};
pub use file_store::{IFileStore, ProgressObserver, UploadedItem};
pub use notification::{INotifier, IRecipientSource, Recipient, RecipientKind, RecipientPage};
pub use token_provider::{ITokenProvider, StaticTokenProvider};
pub use workspace_provider::{IWorkspaceProvider, TeamSpec};

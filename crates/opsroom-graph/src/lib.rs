//! Opsroom Graph - Microsoft Graph API adapter
//!
//! Provides async client for:
//! - OAuth2 authentication (client credentials, app-only)
//! - Team provisioning from templates with long-running operation handling
//! - Channel drive resolution and resumable chunked uploads
//! - Directory lookups, team membership, and guest invitations
//!
//! ## Modules
//!
//! - [`auth`] - Client-credentials token acquisition with caching
//! - [`client`] - Microsoft Graph API HTTP client
//! - [`provisioning`] - Team creation and operation status polling
//! - [`channels`] - Channel lookup and storage coordinate resolution
//! - [`upload`] - Resumable chunked upload into channel drives
//! - [`membership`] - Directory, roster, and invitation operations
//! - [`provider`] - Port implementations wired over the above

pub mod auth;
pub mod channels;
pub mod client;
pub mod membership;
pub mod provider;
pub mod provisioning;
pub mod upload;

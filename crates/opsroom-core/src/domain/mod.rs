//! Domain entities and business logic
//!
//! This module contains the core domain types for OpsRoom:
//! - Newtypes for type-safe identifiers and validated domain types
//! - Provisioning handle, operation status, and the waiter state machine
//! - Storage coordinates and the resumable upload session
//! - Desired-membership roster and reconciliation outcomes
//! - Deep link construction
//! - Domain-specific error types

pub mod deeplink;
pub mod errors;
pub mod newtypes;
pub mod provisioning;
pub mod roster;

// Re-export commonly used types
pub use deeplink::{build_deep_link, DeepLink};
pub use errors::{DomainError, FlowError, ProviderError};
pub use newtypes::*;
pub use provisioning::{
    OperationStatus, ProvisioningHandle, ProvisioningState, StorageCoordinates, UploadSession,
};
pub use roster::{MemberOutcome, MemberRequest, MemberRole, ReconciliationReport, ReportEntry};

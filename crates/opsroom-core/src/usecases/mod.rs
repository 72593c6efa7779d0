//! Use cases (interactors) for OpsRoom
//!
//! This module contains the application use cases that orchestrate
//! domain entities and port interfaces. Use cases are thin coordinators
//! that delegate business rules to domain methods and I/O to ports.
//!
//! ## Use Cases
//!
//! - [`ProvisionWorkspaceUseCase`] - The whole pipeline end to end
//! - [`AwaitProvisioningUseCase`] - Bounded wait on the creation operation
//! - [`ResolveCoordinatesUseCase`] - Storage coordinate lookup with narrow retry
//! - [`ReconcileMembersUseCase`] - Roster reconciliation with per-member isolation

pub mod await_provisioning;
pub mod provision_workspace;
pub mod reconcile_members;
pub mod resolve_coordinates;

pub use await_provisioning::{AwaitProvisioningUseCase, PollPolicy};
pub use provision_workspace::{
    ExistingWorkspace, FlowConfig, ProvisionWorkspaceUseCase, WorkspaceOutcome, WorkspaceRequest,
};
pub use reconcile_members::{LookupPolicy, ReconcileMembersUseCase};
pub use resolve_coordinates::{ResolveCoordinatesUseCase, RetryPolicy};

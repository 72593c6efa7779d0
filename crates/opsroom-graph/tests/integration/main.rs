//! Integration tests for opsroom-graph
//!
//! Uses wiremock to simulate the Microsoft Graph API and verifies
//! end-to-end behavior of team provisioning, coordinate resolution,
//! resumable uploads, and membership operations.

mod common;

mod test_membership;
mod test_provisioning;
mod test_upload;

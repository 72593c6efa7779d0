//! Team provisioning operations for Microsoft Graph API
//!
//! Provides functions for creating a team from a template and observing the
//! long-running creation operation:
//! - [`create_team`] - `POST /teams` with a template binding (202 semantics)
//! - [`poll_status`] - Reads the operation status behind the `Location` header
//!
//! ## Microsoft Graph API References
//!
//! - [Create team](https://learn.microsoft.com/en-us/graph/api/team-post)
//! - [teamsAsyncOperation](https://learn.microsoft.com/en-us/graph/api/resources/teamsasyncoperation)

use opsroom_core::domain::errors::ProviderError;
use opsroom_core::domain::provisioning::{OperationStatus, ProvisioningHandle};
use opsroom_core::ports::workspace_provider::TeamSpec;
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::client::{error_from_response, GraphClient};

/// Response body of the operation status locator
#[derive(Debug, Deserialize)]
struct OperationStatusResponse {
    /// Wire status string: `inProgress`, `succeeded`, `failed`, ...
    status: Option<String>,
}

/// Builds the creation request body from a team spec
///
/// The template and the initial owner are both expressed as OData binds,
/// matching what `POST /teams` expects for template instantiation.
fn creation_body(spec: &TeamSpec) -> serde_json::Value {
    json!({
        "template@odata.bind": format!(
            "https://graph.microsoft.com/v1.0/teamsTemplates('{}')",
            spec.template_id
        ),
        "displayName": spec.display_name,
        "description": spec.description,
        "members": [
            {
                "@odata.type": "#microsoft.graph.aadUserConversationMember",
                "roles": ["owner"],
                "user@odata.bind": format!(
                    "https://graph.microsoft.com/v1.0/users/{}",
                    spec.owner_id
                )
            }
        ]
    })
}

/// Requests creation of a team from a template
///
/// The Graph accepts the request with a 202 and a `Location` header that
/// doubles as the status poll locator; the team id is embedded in it as a
/// single-quoted substring.
///
/// # Errors
/// - [`ProviderError::InvalidResponse`] when the accepted response carries
///   no parsable `Location` header
/// - Standard status mapping for rejected requests
pub async fn create_team(
    client: &GraphClient,
    spec: &TeamSpec,
) -> Result<ProvisioningHandle, ProviderError> {
    debug!(display_name = %spec.display_name, template = %spec.template_id, "Creating team");

    let response = client
        .send(
            client
                .request(Method::POST, "/teams")
                .await?
                .json(&creation_body(spec)),
        )
        .await?;

    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    // Correlates the request with downstream support diagnostics
    if let Some(request_id) = response
        .headers()
        .get("client-request-id")
        .and_then(|v| v.to_str().ok())
    {
        debug!(client_request_id = request_id, "Team creation accepted");
    }

    let location = response
        .headers()
        .get("Location")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            ProviderError::InvalidResponse(
                "team creation response carries no Location header".to_string(),
            )
        })?;

    let handle = ProvisioningHandle::from_location(location)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    info!(team_id = %handle.team_id(), "Team creation accepted");
    Ok(handle)
}

/// Reads the current status of the creation operation
///
/// Unknown wire statuses map to in-progress; the waiter only trusts exact
/// terminal values.
pub async fn poll_status(
    client: &GraphClient,
    handle: &ProvisioningHandle,
) -> Result<OperationStatus, ProviderError> {
    let response = client
        .send(client.request(Method::GET, handle.status_url()).await?)
        .await?;
    let response = client.check_status(response).await?;

    let body: OperationStatusResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("status body: {e}")))?;

    let status = body
        .status
        .as_deref()
        .map(OperationStatus::from_wire)
        .unwrap_or(OperationStatus::InProgress);
    debug!(team_id = %handle.team_id(), %status, "Read provisioning status");
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> TeamSpec {
        TeamSpec {
            template_id: "standard".to_string(),
            display_name: "Incident 7".to_string(),
            description: "Response workspace".to_string(),
            owner_id: "owner-1".to_string(),
        }
    }

    #[test]
    fn test_creation_body_binds_template_and_owner() {
        let body = creation_body(&spec());
        assert_eq!(
            body["template@odata.bind"],
            "https://graph.microsoft.com/v1.0/teamsTemplates('standard')"
        );
        assert_eq!(body["displayName"], "Incident 7");
        assert_eq!(
            body["members"][0]["@odata.type"],
            "#microsoft.graph.aadUserConversationMember"
        );
        assert_eq!(body["members"][0]["roles"][0], "owner");
        assert_eq!(
            body["members"][0]["user@odata.bind"],
            "https://graph.microsoft.com/v1.0/users/owner-1"
        );
    }

    #[test]
    fn test_status_response_deserialization() {
        let json = r#"{"status": "succeeded", "operationType": "createTeam"}"#;
        let body: OperationStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.status.as_deref(), Some("succeeded"));
    }

    #[test]
    fn test_status_response_missing_status_field() {
        let body: OperationStatusResponse = serde_json::from_str("{}").unwrap();
        assert!(body.status.is_none());
    }
}

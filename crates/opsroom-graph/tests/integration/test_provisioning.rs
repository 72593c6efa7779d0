//! Integration tests for team provisioning and coordinate resolution

use opsroom_core::domain::errors::ProviderError;
use opsroom_core::domain::newtypes::TeamId;
use opsroom_core::domain::provisioning::{OperationStatus, ProvisioningHandle};
use opsroom_core::ports::workspace_provider::{IWorkspaceProvider, TeamSpec};
use opsroom_graph::provider::GraphWorkspaceProvider;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

fn spec() -> TeamSpec {
    TeamSpec {
        template_id: "standard".to_string(),
        display_name: "Incident 7".to_string(),
        description: "Response workspace".to_string(),
        owner_id: "owner-1".to_string(),
    }
}

async fn mount_create_accepted(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/teams"))
        .and(header("Authorization", "Bearer test-access-token"))
        .and(body_partial_json(serde_json::json!({
            "template@odata.bind":
                "https://graph.microsoft.com/v1.0/teamsTemplates('standard')",
            "displayName": "Incident 7"
        })))
        .respond_with(
            ResponseTemplate::new(202)
                .append_header(
                    "Location",
                    "/teams('team-77')/operations('op-1')",
                )
                .append_header("client-request-id", "req-123"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_create_team_returns_handle_from_location() {
    let (server, client) = common::setup_graph_mock().await;
    mount_create_accepted(&server).await;

    let provider = GraphWorkspaceProvider::new(client);
    let handle = provider.create_team(&spec()).await.unwrap();

    assert_eq!(handle.team_id().as_str(), "team-77");
    assert_eq!(handle.status_url(), "/teams('team-77')/operations('op-1')");
}

#[tokio::test]
async fn test_create_team_without_location_is_invalid_response() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("POST"))
        .and(path("/teams"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let result = provider.create_team(&spec()).await;
    assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_create_team_rejection_maps_status() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("POST"))
        .and(path("/teams"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string("displayName must not be empty"),
        )
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    match provider.create_team(&spec()).await {
        Err(ProviderError::Http { status, .. }) => assert_eq!(status, 400),
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_poll_status_reads_terminal_states() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("GET"))
        .and(path("/teams('team-77')/operations('op-1')"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "succeeded"})),
        )
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let handle = ProvisioningHandle::from_location("/teams('team-77')/operations('op-1')")
        .unwrap();
    // The relative status locator resolves against the client's base URL
    let status = provider.poll_status(&handle).await.unwrap();
    assert_eq!(status, OperationStatus::Succeeded);
}

#[tokio::test]
async fn test_poll_status_unknown_wire_value_is_in_progress() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("GET"))
        .and(path("/teams('team-77')/operations('op-1')"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "notStarted"})),
        )
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let handle = ProvisioningHandle::from_location("/teams('team-77')/operations('op-1')")
        .unwrap();
    let status = provider.poll_status(&handle).await.unwrap();
    assert_eq!(status, OperationStatus::InProgress);
}

#[tokio::test]
async fn test_channel_coordinates_resolves_two_hops() {
    let (server, client) = common::setup_graph_mock().await;
    common::mount_channel_coordinates(&server, "team-77", "19:gen@thread.tacv2", "drive-9")
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let team_id = TeamId::new("team-77".to_string()).unwrap();
    let coordinates = provider
        .channel_coordinates(&team_id, "General")
        .await
        .unwrap();

    assert_eq!(coordinates.drive_id.as_str(), "drive-9");
    assert_eq!(coordinates.channel_id.as_str(), "19:gen@thread.tacv2");
}

#[tokio::test]
async fn test_files_folder_404_is_folder_not_ready() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("GET"))
        .and(path("/teams/team-77/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "19:gen@thread.tacv2"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/teams/team-77/channels/19:gen@thread.tacv2/filesFolder"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let team_id = TeamId::new("team-77".to_string()).unwrap();
    let result = provider.channel_coordinates(&team_id, "General").await;
    assert!(matches!(result, Err(ProviderError::FolderNotReady)));
}

#[tokio::test]
async fn test_missing_channel_is_not_found() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("GET"))
        .and(path("/teams/team-77/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": []
        })))
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let team_id = TeamId::new("team-77".to_string()).unwrap();
    let result = provider.channel_coordinates(&team_id, "General").await;
    assert!(matches!(result, Err(ProviderError::NotFound(_))));
}

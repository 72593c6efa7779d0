//! Shared test helpers for Graph API integration tests
//!
//! Provides wiremock-based mock server setup for Microsoft Graph API
//! endpoints. Each helper mounts the necessary mock endpoints and returns a
//! configured GraphClient pointing at the mock server.

use std::sync::Arc;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use opsroom_core::ports::token_provider::StaticTokenProvider;
use opsroom_graph::client::GraphClient;

/// Starts a mock server and returns a (MockServer, GraphClient) tuple
/// with the client's base URL pointing at the server.
pub async fn setup_graph_mock() -> (MockServer, GraphClient) {
    let server = MockServer::start().await;
    let client = GraphClient::with_base_url(
        Arc::new(StaticTokenProvider::new("test-access-token")),
        server.uri(),
    );
    (server, client)
}

/// Mounts the two-hop channel coordinate endpoints for a team.
///
/// First hop lists the channels filtered by display name; second hop
/// resolves the channel's files folder to a drive.
#[allow(dead_code)]
pub async fn mount_channel_coordinates(
    server: &MockServer,
    team_id: &str,
    channel_id: &str,
    drive_id: &str,
) {
    Mock::given(method("GET"))
        .and(path(format!("/teams/{team_id}/channels")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": channel_id}]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!(
            "/teams/{team_id}/channels/{channel_id}/filesFolder"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "root",
            "parentReference": {"driveId": drive_id}
        })))
        .mount(server)
        .await;
}

/// Mounts an upload session creation endpoint inside a drive.
///
/// The returned session URL points back into the mock server under
/// `/upload-session/{session}` so chunk requests stay observable.
#[allow(dead_code)]
pub async fn mount_upload_session(
    server: &MockServer,
    drive_id: &str,
    folder: &str,
    file_name: &str,
    session: &str,
) -> String {
    let session_url = format!("{}/upload-session/{session}", server.uri());
    Mock::given(method("POST"))
        .and(path(format!(
            "/drives/{drive_id}/root:/{folder}/{file_name}:/createUploadSession"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "uploadUrl": session_url,
            "expirationDateTime": "2026-01-15T12:00:00Z"
        })))
        .mount(server)
        .await;
    session_url
}

/// A completed-item body in the shape the session protocol returns.
#[allow(dead_code)]
pub fn drive_item_body(id: &str, name: &str, size: u64) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "name": name,
        "size": size,
        "eTag": "\"{4FC55F5A-0301-4A2C-BB4F-D81653ACE4B5},2\"",
        "webUrl": format!(
            "https://contoso.sharepoint.com/sites/ops/Shared%20Documents/General/{name}"
        )
    })
}

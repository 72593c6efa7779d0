//! Integration tests for the resumable chunked upload

use std::sync::{Arc, Mutex};

use opsroom_core::domain::errors::ProviderError;
use opsroom_core::domain::newtypes::{ChannelId, DriveId};
use opsroom_core::domain::provisioning::StorageCoordinates;
use opsroom_core::ports::file_store::IFileStore;
use opsroom_graph::provider::GraphWorkspaceProvider;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common;

fn coordinates() -> StorageCoordinates {
    StorageCoordinates::new(
        DriveId::new("drive-9".to_string()).unwrap(),
        ChannelId::new("19:gen@thread.tacv2".to_string()).unwrap(),
    )
}

/// Mounts intermediate-chunk acceptance and a final-chunk completion mock.
async fn mount_chunk_sequence(server: &MockServer, intermediate: u64, final_body: serde_json::Value) {
    // Earlier-mounted mocks win, so the bounded 202 mock absorbs the
    // intermediate ranges before the completion mock starts matching.
    if intermediate > 0 {
        Mock::given(method("PUT"))
            .and(path("/upload-session/s1"))
            .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({
                "nextExpectedRanges": ["4-9"]
            })))
            .up_to_n_times(intermediate)
            .mount(server)
            .await;
    }
    Mock::given(method("PUT"))
        .and(path("/upload-session/s1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(final_body))
        .mount(server)
        .await;
}

async fn mount_finalize(server: &MockServer, status: u16, body: Option<serde_json::Value>) {
    let mut template = ResponseTemplate::new(status);
    if let Some(body) = body {
        template = template.set_body_json(body);
    }
    Mock::given(method("POST"))
        .and(path("/upload-session/s1"))
        .and(header("Content-Length", "0"))
        .respond_with(template)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_upload_splits_into_ranges_and_reports_progress() {
    let (server, client) = common::setup_graph_mock().await;
    common::mount_upload_session(&server, "drive-9", "General", "brief.pdf", "s1").await;
    mount_chunk_sequence(&server, 2, common::drive_item_body("01ITEM", "brief.pdf", 10)).await;
    mount_finalize(&server, 200, None).await;

    let provider = GraphWorkspaceProvider::with_chunk_size(client, 4);
    let observed: Arc<Mutex<Vec<(u64, u64)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);

    let item = provider
        .upload(
            &coordinates(),
            "General",
            "brief.pdf",
            &[7u8; 10],
            Some(Box::new(move |start, end| {
                sink.lock().unwrap().push((start, end));
            })),
        )
        .await
        .unwrap();

    assert_eq!(item.id, "01ITEM");
    assert_eq!(item.name, "brief.pdf");
    assert!(item.revision_tag.is_some());
    assert!(item.web_url.is_some());
    // Three inclusive ranges covering all ten bytes in order
    assert_eq!(
        *observed.lock().unwrap(),
        vec![(0, 3), (4, 7), (8, 9)]
    );
}

#[tokio::test]
async fn test_empty_payload_is_rejected_before_any_request() {
    let (server, client) = common::setup_graph_mock().await;

    let provider = GraphWorkspaceProvider::new(client);
    let result = provider
        .upload(&coordinates(), "General", "brief.pdf", &[], None)
        .await;

    assert!(matches!(result, Err(ProviderError::InvalidRequest(_))));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_range_aborts_the_transfer() {
    let (server, client) = common::setup_graph_mock().await;
    common::mount_upload_session(&server, "drive-9", "General", "brief.pdf", "s1").await;
    Mock::given(method("PUT"))
        .and(path("/upload-session/s1"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/upload-session/s1"))
        .respond_with(ResponseTemplate::new(500).set_body_string("session expired"))
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::with_chunk_size(client, 4);
    match provider
        .upload(&coordinates(), "General", "brief.pdf", &[7u8; 10], None)
        .await
    {
        Err(ProviderError::Http { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_item_from_finalize_response_is_used() {
    let (server, client) = common::setup_graph_mock().await;
    common::mount_upload_session(&server, "drive-9", "General", "brief.pdf", "s1").await;
    // Every range is merely accepted; the item only arrives on finalize.
    Mock::given(method("PUT"))
        .and(path("/upload-session/s1"))
        .respond_with(ResponseTemplate::new(202).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;
    mount_finalize(
        &server,
        200,
        Some(common::drive_item_body("01LATE", "brief.pdf", 10)),
    )
    .await;

    let provider = GraphWorkspaceProvider::with_chunk_size(client, 4);
    let item = provider
        .upload(&coordinates(), "General", "brief.pdf", &[7u8; 10], None)
        .await
        .unwrap();
    assert_eq!(item.id, "01LATE");
}

#[tokio::test]
async fn test_single_range_upload_completes() {
    let (server, client) = common::setup_graph_mock().await;
    common::mount_upload_session(&server, "drive-9", "General", "brief.pdf", "s1").await;
    mount_chunk_sequence(&server, 0, common::drive_item_body("01ITEM", "brief.pdf", 3)).await;
    mount_finalize(&server, 200, None).await;

    let provider = GraphWorkspaceProvider::new(client);
    let item = provider
        .upload(&coordinates(), "General", "brief.pdf", b"abc", None)
        .await
        .unwrap();
    assert_eq!(item.size, Some(3));
}

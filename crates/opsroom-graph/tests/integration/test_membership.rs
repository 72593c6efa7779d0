//! Integration tests for directory and membership operations

use opsroom_core::domain::errors::ProviderError;
use opsroom_core::domain::newtypes::{Email, TeamId};
use opsroom_core::ports::directory::IDirectory;
use opsroom_graph::provider::GraphWorkspaceProvider;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_find_user_by_email() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("GET"))
        .and(path("/users/avery@contoso.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "user-1",
            "displayName": "Avery Lane",
            "mail": "avery@contoso.com"
        })))
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let email = Email::new("Avery@Contoso.com".to_string()).unwrap();
    // The address was lowercased at the domain boundary
    let user = provider.find_user_by_email(&email).await.unwrap();
    assert_eq!(user.id, "user-1");
    assert_eq!(user.mail.as_deref(), Some("avery@contoso.com"));
}

#[tokio::test]
async fn test_unknown_user_is_not_found() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("GET"))
        .and(path("/users/ghost@contoso.com"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Resource not found"))
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let email = Email::new("ghost@contoso.com".to_string()).unwrap();
    let result = provider.find_user_by_email(&email).await;
    assert!(matches!(result, Err(ProviderError::NotFound(_))));
}

#[tokio::test]
async fn test_list_members_follows_next_link() {
    let (server, client) = common::setup_graph_mock().await;
    // Page 2 is mounted first so the skiptoken request matches it.
    Mock::given(method("GET"))
        .and(path("/teams/team-77/members"))
        .and(query_param("$skiptoken", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{"id": "m-2", "email": "b@contoso.com", "roles": []}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/teams/team-77/members"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "@odata.nextLink": format!(
                "{}/teams/team-77/members?$skiptoken=page2",
                server.uri()
            ),
            "value": [{"id": "m-1", "email": "a@contoso.com", "roles": ["owner"]}]
        })))
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let team_id = TeamId::new("team-77".to_string()).unwrap();
    let members = provider.list_members(&team_id).await.unwrap();

    assert_eq!(members.len(), 2);
    assert_eq!(members[0].id, "m-1");
    assert_eq!(members[0].roles, vec!["owner".to_string()]);
    assert_eq!(members[1].email.as_deref(), Some("b@contoso.com"));
}

#[tokio::test]
async fn test_add_member_binds_user_and_roles() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("POST"))
        .and(path("/teams/team-77/members"))
        .and(body_partial_json(serde_json::json!({
            "@odata.type": "#microsoft.graph.aadUserConversationMember",
            "roles": ["owner"],
            "user@odata.bind": "https://graph.microsoft.com/v1.0/users/user-1"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "m-9",
            "roles": ["owner"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let team_id = TeamId::new("team-77".to_string()).unwrap();
    provider
        .add_member(&team_id, "user-1", &["owner".to_string()])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_find_guest_by_mail_prefix() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": [{
                "id": "guest-1",
                "displayName": "Jules (Guest)",
                "mail": "jules@fabrikam.com"
            }]
        })))
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let guest = provider.find_guest_by_mail_prefix("jules").await.unwrap();
    assert_eq!(guest.unwrap().id, "guest-1");
}

#[tokio::test]
async fn test_no_guest_match_is_none() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "value": []
        })))
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let guest = provider.find_guest_by_mail_prefix("nobody").await.unwrap();
    assert!(guest.is_none());
}

#[tokio::test]
async fn test_invite_guest_posts_invitation() {
    let (server, client) = common::setup_graph_mock().await;
    Mock::given(method("POST"))
        .and(path("/invitations"))
        .and(body_partial_json(serde_json::json!({
            "invitedUserEmailAddress": "jules@fabrikam.com",
            "inviteRedirectUrl": "https://teams.microsoft.com",
            "sendInvitationMessage": true,
            "invitedUserType": "Guest"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "invite-1",
            "status": "PendingAcceptance"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GraphWorkspaceProvider::new(client);
    let email = Email::new("jules@fabrikam.com".to_string()).unwrap();
    provider
        .invite_guest(&email, "https://teams.microsoft.com")
        .await
        .unwrap();
}

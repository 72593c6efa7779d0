//! Directory and membership operations for Microsoft Graph API
//!
//! Provides functions behind the identity and roster surface:
//! - [`find_user_by_email`] - `GET /users/{email}`
//! - [`list_members`] - `GET /teams/{id}/members` with nextLink paging
//! - [`add_member`] - `POST /teams/{id}/members` (conversation member bind)
//! - [`find_guest_by_mail_prefix`] - `GET /users?$filter=startswith(...)`
//! - [`invite_guest`] - `POST /invitations`
//!
//! ## Microsoft Graph API References
//!
//! - [List members of team](https://learn.microsoft.com/en-us/graph/api/team-list-members)
//! - [Add member to team](https://learn.microsoft.com/en-us/graph/api/team-post-members)
//! - [Create invitation](https://learn.microsoft.com/en-us/graph/api/invitation-post)

use opsroom_core::domain::errors::ProviderError;
use opsroom_core::domain::newtypes::{Email, TeamId};
use opsroom_core::ports::directory::{DirectoryUser, TeamMember};
use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::client::GraphClient;

// ============================================================================
// Graph API response types for deserialization
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    id: String,
    display_name: Option<String>,
    mail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserListResponse {
    value: Vec<GraphUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphConversationMember {
    id: String,
    email: Option<String>,
    #[serde(default)]
    roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MemberListResponse {
    value: Vec<GraphConversationMember>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

fn user_from_response(user: GraphUser) -> DirectoryUser {
    DirectoryUser {
        id: user.id,
        display_name: user.display_name,
        mail: user.mail,
    }
}

// ============================================================================
// User resolution
// ============================================================================

/// Resolves a directory identity by email address
///
/// # Errors
/// [`ProviderError::NotFound`] when the address resolves to nothing; for a
/// freshly provisioned identity that can mean "not visible yet".
pub async fn find_user_by_email(
    client: &GraphClient,
    email: &Email,
) -> Result<DirectoryUser, ProviderError> {
    let path = format!("/users/{}", email.as_str());
    let response = client.send(client.request(Method::GET, &path).await?).await?;
    let response = client.check_status(response).await?;

    let user: GraphUser = response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("user body: {e}")))?;
    debug!(email = %email.as_str(), user_id = %user.id, "Resolved user");
    Ok(user_from_response(user))
}

/// Looks up an existing guest account by mail-prefix match
///
/// Guest principal names are mangled (`user_domain.com#EXT#@tenant`), so the
/// filter matches on the mail prefix instead.
pub async fn find_guest_by_mail_prefix(
    client: &GraphClient,
    prefix: &str,
) -> Result<Option<DirectoryUser>, ProviderError> {
    let path = format!("/users?$filter=startswith(mail,'{prefix}')");
    let response = client.send(client.request(Method::GET, &path).await?).await?;
    let response = client.check_status(response).await?;

    let body: UserListResponse = response
        .json()
        .await
        .map_err(|e| ProviderError::InvalidResponse(format!("user list: {e}")))?;
    Ok(body.value.into_iter().next().map(user_from_response))
}

// ============================================================================
// Team membership
// ============================================================================

/// Fetches the complete member snapshot of a team, following nextLink pages
pub async fn list_members(
    client: &GraphClient,
    team_id: &TeamId,
) -> Result<Vec<TeamMember>, ProviderError> {
    let mut members = Vec::new();
    let mut next = format!("/teams/{}/members", team_id.as_str());

    loop {
        let response = client.send(client.request(Method::GET, &next).await?).await?;
        let response = client.check_status(response).await?;

        let page: MemberListResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("member list: {e}")))?;
        members.extend(page.value.into_iter().map(|m| TeamMember {
            id: m.id,
            email: m.email,
            roles: m.roles,
        }));

        match page.next_link {
            Some(link) => next = link,
            None => break,
        }
    }

    debug!(team_id = %team_id.as_str(), count = members.len(), "Fetched member snapshot");
    Ok(members)
}

/// Adds a resolved identity to a team with the given role array
pub async fn add_member(
    client: &GraphClient,
    team_id: &TeamId,
    user_id: &str,
    roles: &[String],
) -> Result<(), ProviderError> {
    let path = format!("/teams/{}/members", team_id.as_str());
    let body = json!({
        "@odata.type": "#microsoft.graph.aadUserConversationMember",
        "roles": roles,
        "user@odata.bind": format!("https://graph.microsoft.com/v1.0/users/{user_id}"),
    });

    let response = client
        .send(client.request(Method::POST, &path).await?.json(&body))
        .await?;
    client.check_status(response).await?;
    info!(team_id = %team_id.as_str(), user_id, ?roles, "Added team member");
    Ok(())
}

// ============================================================================
// Guest invitations
// ============================================================================

/// Creates a tenant invitation for an external guest
///
/// Membership is granted by the guest through redemption, never directly by
/// this call.
pub async fn invite_guest(
    client: &GraphClient,
    email: &Email,
    redirect_url: &str,
) -> Result<(), ProviderError> {
    let body = json!({
        "invitedUserEmailAddress": email.as_str(),
        "inviteRedirectUrl": redirect_url,
        "sendInvitationMessage": true,
        "invitedUserType": "Guest",
    });

    let response = client
        .send(client.request(Method::POST, "/invitations").await?.json(&body))
        .await?;
    client.check_status(response).await?;
    info!(email = %email.as_str(), "Guest invitation sent");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_deserialization() {
        let json = r#"{
            "id": "user-1",
            "displayName": "Avery Lane",
            "mail": "avery@contoso.com",
            "userPrincipalName": "avery@contoso.com"
        }"#;
        let user: GraphUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "user-1");
        assert_eq!(user.display_name.as_deref(), Some("Avery Lane"));
        assert_eq!(user.mail.as_deref(), Some("avery@contoso.com"));
    }

    #[test]
    fn test_member_list_deserialization_with_next_link() {
        let json = r#"{
            "@odata.nextLink": "https://graph.microsoft.com/v1.0/teams/t/members?$skiptoken=abc",
            "value": [
                {"id": "m-1", "email": "a@contoso.com", "roles": ["owner"]},
                {"id": "m-2", "email": "b@contoso.com"}
            ]
        }"#;
        let page: MemberListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.value.len(), 2);
        assert_eq!(page.value[0].roles, vec!["owner".to_string()]);
        // Missing roles field defaults to an empty array
        assert!(page.value[1].roles.is_empty());
        assert!(page.next_link.is_some());
    }

    #[test]
    fn test_member_list_final_page_has_no_next_link() {
        let page: MemberListResponse = serde_json::from_str(r#"{"value": []}"#).unwrap();
        assert!(page.value.is_empty());
        assert!(page.next_link.is_none());
    }

    #[test]
    fn test_user_list_empty_means_no_guest() {
        let body: UserListResponse = serde_json::from_str(r#"{"value": []}"#).unwrap();
        assert!(body.value.into_iter().next().is_none());
    }
}

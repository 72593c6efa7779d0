//! Deep link construction
//!
//! Builds the collaboration-client URL that opens an uploaded file directly
//! in the team channel's file tab. The link must be reproduced bit-exact for
//! the host client to resolve it, so the parameter order and encoding here
//! are part of the wire contract.

use std::fmt::{self, Display, Formatter};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use url::Url;

use super::errors::FlowError;
use super::newtypes::{ChannelId, TeamId, TenantId};

/// Host of the collaboration client the link targets
const TEAMS_HOST: &str = "https://teams.microsoft.com";

/// Document-library path segment markers used to derive the base URL
///
/// The canonical reference URL points into the team site's document library;
/// everything from the library segment onwards is truncated to obtain the
/// container-relative base URL.
const LIBRARY_MARKERS: &[&str] = &["/Shared%20Documents", "/Shared Documents"];

/// Characters the host client's own encoder leaves intact; everything else
/// is percent-encoded. Space becomes `%20`, never `+`.
const LINK_VALUE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_value(value: &str) -> String {
    utf8_percent_encode(value, LINK_VALUE_SET).to_string()
}

/// A client-specific URL that opens a file inside the collaboration client
///
/// Derived, immutable; computed exactly once per successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeepLink(String);

impl DeepLink {
    /// Get the link as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DeepLink {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Builds a [`DeepLink`] from upload-result metadata and container context
///
/// # Arguments
/// * `revision_tag` - Opaque per-version tag of the form `"<id>,<version>"`
///   (surrounding quotes and braces are tolerated)
/// * `web_url` - Canonical reference URL of the uploaded file
/// * `tenant_id` - The tenant the workspace belongs to
/// * `team_id` - The container (group) the file was uploaded into
/// * `channel_id` - The channel (thread) whose file library holds the file
///
/// # Errors
/// Returns [`FlowError::DeepLinkConstructionFailed`] if the revision tag or
/// reference URL is malformed or absent.
pub fn build_deep_link(
    revision_tag: &str,
    web_url: &str,
    tenant_id: &TenantId,
    team_id: &TeamId,
    channel_id: &ChannelId,
) -> Result<DeepLink, FlowError> {
    let version_id = parse_version_id(revision_tag)?;
    let reference = Url::parse(web_url).map_err(|e| {
        FlowError::DeepLinkConstructionFailed(format!("invalid reference URL {web_url:?}: {e}"))
    })?;
    let extension = file_extension(&reference)?;
    let base_url = truncate_library_suffix(web_url)?;

    // Assembled by hand: the query order and the exact encoding of every
    // value are part of the contract the host client resolves against.
    let link = format!(
        "{TEAMS_HOST}/l/file/{}?tenantId={}&fileType={}&objectUrl={}&baseUrl={}\
         &serviceName=teams&threadId={}&groupId={}",
        encode_value(&version_id),
        encode_value(tenant_id.as_str()),
        encode_value(&extension),
        encode_value(web_url),
        encode_value(&base_url),
        encode_value(channel_id.as_str()),
        encode_value(team_id.as_str()),
    );

    Ok(DeepLink(link))
}

/// Extracts the stable per-version identifier from a revision tag
///
/// The tag has the shape `"<id>,<version>"`; quotes and braces around the
/// id are stripped.
fn parse_version_id(revision_tag: &str) -> Result<String, FlowError> {
    let trimmed = revision_tag.trim().trim_matches('"');
    let (id, version) = trimmed.split_once(',').ok_or_else(|| {
        FlowError::DeepLinkConstructionFailed(format!(
            "revision tag {revision_tag:?} has no \"<id>,<version>\" shape"
        ))
    })?;
    let id = id.trim_matches(|c| c == '{' || c == '}');
    if id.is_empty() || version.is_empty() {
        return Err(FlowError::DeepLinkConstructionFailed(format!(
            "revision tag {revision_tag:?} has an empty id or version"
        )));
    }
    Ok(id.to_string())
}

/// Infers the file extension from the reference URL's trailing segment
fn file_extension(reference: &Url) -> Result<String, FlowError> {
    let last = reference
        .path_segments()
        .and_then(|mut s| s.next_back())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            FlowError::DeepLinkConstructionFailed(format!(
                "reference URL {reference} has no file segment"
            ))
        })?;
    let (_, ext) = last.rsplit_once('.').ok_or_else(|| {
        FlowError::DeepLinkConstructionFailed(format!(
            "file segment {last:?} has no extension"
        ))
    })?;
    if ext.is_empty() {
        return Err(FlowError::DeepLinkConstructionFailed(format!(
            "file segment {last:?} has an empty extension"
        )));
    }
    Ok(ext.to_lowercase())
}

/// Derives the container-relative base URL from the reference URL
///
/// Truncates at the document-library segment when present; otherwise strips
/// the trailing file segment only.
fn truncate_library_suffix(web_url: &str) -> Result<String, FlowError> {
    for marker in LIBRARY_MARKERS {
        if let Some(idx) = web_url.find(marker) {
            return Ok(web_url[..idx].to_string());
        }
    }
    // No library segment: drop the trailing file segment.
    match web_url.rsplit_once('/') {
        Some((base, file)) if !base.is_empty() && !file.is_empty() => Ok(base.to_string()),
        _ => Err(FlowError::DeepLinkConstructionFailed(format!(
            "reference URL {web_url:?} has no truncatable suffix"
        ))),
    }
}

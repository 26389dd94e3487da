//! Record source abstraction.
//!
//! Pipelines only see [`RecordSource`]; the HTTP client in [`crate::client`]
//! is one implementation, tests use an in-memory one.

use crate::error::Result;
use crate::note::{ApiVersion, Group, Note};
use std::future::Future;

/// Filter for a note listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NoteQuery {
    /// Invitation id or pattern
    pub invitation: Option<String>,
    /// Content field equality, e.g. `venueid = ICLR.cc/2024/Conference`
    pub content: Option<(String, String)>,
    /// Expanded data to attach, e.g. `replies`
    pub details: Option<String>,
}

impl NoteQuery {
    pub fn invitation(invitation: impl Into<String>) -> Self {
        Self {
            invitation: Some(invitation.into()),
            ..Default::default()
        }
    }

    pub fn content_eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            content: Some((field.into(), value.into())),
            ..Default::default()
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Anything that can list notes and fetch groups.
pub trait RecordSource {
    /// API generation the source speaks
    fn api_version(&self) -> ApiVersion;

    /// Every note matching `query`, in the order the source yields them.
    fn notes(&self, query: &NoteQuery) -> impl Future<Output = Result<Vec<Note>>> + Send;

    /// A group by id.
    fn group(&self, id: &str) -> impl Future<Output = Result<Group>> + Send;
}

/// Decide which API version serves `venue_id`: only v2 groups carry a domain.
pub async fn detect_api_version<S: RecordSource>(source: &S, venue_id: &str) -> Result<ApiVersion> {
    let group = source.group(venue_id).await?;
    Ok(if group.domain.is_some() {
        ApiVersion::V2
    } else {
        ApiVersion::V1
    })
}

//! Record and group data model shared by both OpenReview API versions.
//!
//! Notes are deserialized leniently: fields that only one API version sends
//! (`invitation` vs `invitations`, `mdate`) are optional, and the content map
//! is kept as raw JSON because its value shapes differ per version.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// OpenReview API generation a venue is served by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    /// `api.openreview.net`: raw content values
    V1,
    /// `api2.openreview.net`: content values wrapped as `{value: ...}`
    V2,
}

impl ApiVersion {
    /// Numeric version as printed by `which-api`
    pub fn number(self) -> u8 {
        match self {
            ApiVersion::V1 => 1,
            ApiVersion::V2 => 2,
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// A single platform entry: submission, review, comment or decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub replyto: Option<String>,
    #[serde(default)]
    pub forum: Option<String>,
    /// Creation date, unix milliseconds
    #[serde(default)]
    pub cdate: Option<i64>,
    #[serde(default)]
    pub mdate: Option<i64>,
    /// True creation date, unix milliseconds
    #[serde(default)]
    pub tcdate: Option<i64>,
    /// True modification date, unix milliseconds
    #[serde(default)]
    pub tmdate: Option<i64>,
    /// API v1 invitation
    #[serde(default)]
    pub invitation: Option<String>,
    /// API v2 invitations
    #[serde(default)]
    pub invitations: Vec<String>,
    #[serde(default)]
    pub signatures: Vec<String>,
    #[serde(default)]
    pub writers: Vec<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
    #[serde(default)]
    pub details: Option<NoteDetails>,
}

/// Expanded data requested with `details=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NoteDetails {
    #[serde(default, alias = "directReplies")]
    pub replies: Vec<Note>,
}

impl Note {
    /// Replies attached through `details=replies`
    pub fn replies(&self) -> &[Note] {
        self.details
            .as_ref()
            .map(|d| d.replies.as_slice())
            .unwrap_or_default()
    }
}

/// Venue group: holds the venue's configuration in its content map.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    /// Set only for groups served by API v2
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub content: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_v1_note() -> serde_json::Result<()> {
        let note: Note = serde_json::from_value(json!({
            "id": "abc",
            "number": 12,
            "tcdate": 1500000000000i64,
            "tmdate": 1500000001000i64,
            "invitation": "ICLR.cc/2019/Conference/-/Blind_Submission",
            "content": {"title": "A Paper", "authors": ["A", "B"]}
        }))?;
        assert_eq!(note.number, Some(12));
        assert_eq!(note.mdate, None);
        assert_eq!(
            note.invitation.as_deref(),
            Some("ICLR.cc/2019/Conference/-/Blind_Submission")
        );
        assert!(note.invitations.is_empty());
        assert!(note.replies().is_empty());
        Ok(())
    }

    #[test]
    fn test_deserialize_v2_replies() -> serde_json::Result<()> {
        let note: Note = serde_json::from_value(json!({
            "id": "sub1",
            "number": 3,
            "invitations": ["ICLR.cc/2024/Conference/-/Submission"],
            "content": {"title": {"value": "T"}},
            "details": {"replies": [{
                "id": "r1",
                "replyto": "sub1",
                "invitations": ["ICLR.cc/2024/Conference/Submission3/-/Official_Comment"],
                "signatures": ["ICLR.cc/2024/Conference/Submission3/Authors"],
                "content": {"comment": {"value": "thanks"}}
            }]}
        }))?;
        assert_eq!(note.replies().len(), 1);
        assert_eq!(note.replies()[0].replyto.as_deref(), Some("sub1"));
        Ok(())
    }

    #[test]
    fn test_group_domain() -> serde_json::Result<()> {
        let group: Group = serde_json::from_value(json!({"id": "ICLR.cc/2018/Conference"}))?;
        assert!(group.domain.is_none());
        Ok(())
    }
}

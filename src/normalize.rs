//! Record to row normalization.
//!
//! A single routine walks a [`Schema`] and reads each column from a note;
//! per-year and per-version differences are expressed in the schema tables,
//! not here.

use crate::content::Content;
use crate::error::{OpenReviewError, Result};
use crate::note::{ApiVersion, Note};
use crate::schema::{Field, Meta, Schema};
use crate::table::Row;
use serde_json::Value;
use tracing::debug;

/// Author of a discussion comment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writer {
    Authors,
    Reviewer,
}

impl Writer {
    pub fn as_str(self) -> &'static str {
        match self {
            Writer::Authors => "Authors",
            Writer::Reviewer => "Reviewer",
        }
    }
}

/// Literal signature fragments identifying each role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTokens {
    pub authors: &'static str,
    pub reviewer: &'static str,
}

/// v1 reviewers sign as `.../AnonReviewer2`
pub const V1_ROLES: RoleTokens = RoleTokens {
    authors: "Authors",
    reviewer: "Reviewer",
};

/// v2 reviewers sign as `.../Reviewer_abcd`
pub const V2_ROLES: RoleTokens = RoleTokens {
    authors: "Authors",
    reviewer: "Reviewer_",
};

impl RoleTokens {
    pub fn for_api(api: ApiVersion) -> Self {
        match api {
            ApiVersion::V1 => V1_ROLES,
            ApiVersion::V2 => V2_ROLES,
        }
    }

    /// Role named by any of the signatures. Authors win when both appear.
    pub fn detect<S: AsRef<str>>(&self, signatures: &[S]) -> Option<Writer> {
        let any = |token: &str| signatures.iter().any(|s| s.as_ref().contains(token));
        if any(self.authors) {
            Some(Writer::Authors)
        } else if any(self.reviewer) {
            Some(Writer::Reviewer)
        } else {
            None
        }
    }
}

impl Meta {
    fn read(self, note: &Note) -> Value {
        match self {
            Meta::Id => Value::from(note.id.clone()),
            Meta::Number => note.number.map(Value::from).unwrap_or(Value::Null),
            Meta::Replyto => note.replyto.clone().map(Value::from).unwrap_or(Value::Null),
            Meta::Mdate => note.mdate.map(Value::from).unwrap_or(Value::Null),
            Meta::Tcdate => note.tcdate.map(Value::from).unwrap_or(Value::Null),
            Meta::Tmdate => note.tmdate.map(Value::from).unwrap_or(Value::Null),
        }
    }
}

/// Normalize one note into a row of `schema`.
///
/// Returns `Ok(None)` for records that are skipped rather than rejected:
/// no body field, or no recognizable author role.
pub fn normalize(note: &Note, schema: &Schema, api: ApiVersion) -> Result<Option<Row>> {
    let content = Content::new(&note.content, api, &note.id);

    if let Some(body) = schema.body {
        if !content.has(body) {
            debug!(id = %note.id, field = body, "Skipping record without body");
            return Ok(None);
        }
    }

    let writer = if schema.has_writer() {
        match RoleTokens::for_api(api).detect(&note.signatures) {
            Some(writer) => Some(writer),
            None => {
                debug!(id = %note.id, signatures = ?note.signatures, "Skipping record with unknown author role");
                return Ok(None);
            }
        }
    } else {
        None
    };

    let mut row = Row::with_capacity(schema.columns.len());
    for column in schema.columns {
        let value = match column.field {
            Field::Meta(meta) => meta.read(note),
            Field::Required(key) => content.require(key)?.clone(),
            Field::Optional(key) => content
                .get(key)?
                .cloned()
                .unwrap_or_else(|| Value::String(String::new())),
            Field::FirstOf(keys) => first_of(&content, keys, &note.id)?.clone(),
            Field::Writer => Value::from(writer.map(Writer::as_str).unwrap_or_default()),
        };
        row.push(column.name, value);
    }
    Ok(Some(row))
}

/// Normalize every note in order, dropping skipped records.
pub fn normalize_all<'n>(
    notes: impl IntoIterator<Item = &'n Note>,
    schema: &Schema,
    api: ApiVersion,
) -> Result<Vec<Row>> {
    let mut rows = Vec::new();
    for note in notes {
        if let Some(row) = normalize(note, schema, api)? {
            rows.push(row);
        }
    }
    Ok(rows)
}

fn first_of<'a>(content: &Content<'a>, keys: &[&str], record: &str) -> Result<&'a Value> {
    for key in keys {
        if let Some(value) = content.get(key)? {
            return Ok(value);
        }
    }
    Err(OpenReviewError::MissingField {
        field: keys.join(" | "),
        record: record.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{COMMENT_V1, COMMENT_V2, REVIEW_V2, SUBMISSION_V1, SUBMISSION_V2};
    use serde_json::json;

    fn note(value: Value) -> Note {
        serde_json::from_value(value).unwrap_or_default()
    }

    #[test]
    fn test_detect_roles() {
        assert_eq!(V2_ROLES.detect(&["~Reviewer_1"]), Some(Writer::Reviewer));
        assert_eq!(
            V2_ROLES.detect(&["ICLR.cc/2024/Conference/Submission5/Authors"]),
            Some(Writer::Authors)
        );
        assert_eq!(V2_ROLES.detect(&["ICLR.cc/2024/Conference/Submission5/Area_Chair_x"]), None);
        // v2 token requires the underscore
        assert_eq!(V2_ROLES.detect(&["Paper5/AnonReviewer2"]), None);
        assert_eq!(V1_ROLES.detect(&["ICLR.cc/2019/Conference/Paper5/AnonReviewer2"]), Some(Writer::Reviewer));
        let empty: [&str; 0] = [];
        assert_eq!(V1_ROLES.detect(&empty), None);
    }

    #[test]
    fn test_authors_take_precedence() {
        let sigs = ["Paper1/Reviewer_x", "Paper1/Authors"];
        assert_eq!(V2_ROLES.detect(&sigs), Some(Writer::Authors));
    }

    #[test]
    fn test_v1_submission_author_emails_fallback() -> Result<()> {
        let n = note(json!({
            "id": "s1", "number": 4, "tmdate": 10,
            "content": {
                "title": "T", "authors": ["A"], "author_emails": "a@x.org",
                "keywords": ["k"], "abstract": "abs", "pdf": "/pdf/1.pdf"
            }
        }));
        let row = normalize(&n, &SUBMISSION_V1, ApiVersion::V1)?.ok_or_else(|| OpenReviewError::Validation("skipped".into()))?;
        assert_eq!(row.get("authorids"), Some(&json!("a@x.org")));
        assert_eq!(row.get("mdate"), Some(&Value::Null));
        assert_eq!(row.get("number"), Some(&json!(4)));
        Ok(())
    }

    #[test]
    fn test_v1_missing_required_field() {
        let n = note(json!({"id": "s1", "content": {"title": "T"}}));
        assert!(matches!(
            normalize(&n, &SUBMISSION_V1, ApiVersion::V1),
            Err(OpenReviewError::MissingField { .. })
        ));
    }

    #[test]
    fn test_v2_submission_unwraps_values() -> Result<()> {
        let n = note(json!({
            "id": "s2", "number": 9, "mdate": 1, "tmdate": 2,
            "content": {
                "title": {"value": "Wrapped"},
                "authors": {"value": ["A", "B"]},
                "authorids": {"value": ["~A1", "~B1"]},
                "keywords": {"value": ["k"]},
                "abstract": {"value": "abs"},
                "primary_area": {"value": "optimization"}
            }
        }));
        let row = normalize(&n, &SUBMISSION_V2, ApiVersion::V2)?.ok_or_else(|| OpenReviewError::Validation("skipped".into()))?;
        assert_eq!(row.get("title"), Some(&json!("Wrapped")));
        assert_eq!(row.get("authors"), Some(&json!(["A", "B"])));
        assert_eq!(row.get("pdf"), Some(&json!("")));
        let names: Vec<_> = row.columns().collect();
        assert_eq!(names, SUBMISSION_V2.column_names().collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_v2_malformed_wrapper_is_fatal() {
        let n = note(json!({
            "id": "s3",
            "content": {
                "title": {"value": "T", "readers": ["everyone"]},
                "authors": {"value": ["A"]},
                "authorids": {"value": ["~A1"]},
                "keywords": {"value": []},
                "abstract": {"value": "abs"},
                "primary_area": {"value": "x"}
            }
        }));
        assert!(matches!(
            normalize(&n, &SUBMISSION_V2, ApiVersion::V2),
            Err(OpenReviewError::MalformedField { keys: 2, .. })
        ));
    }

    #[test]
    fn test_v2_review_optional_confidence() -> Result<()> {
        let n = note(json!({
            "id": "r1", "replyto": "s1", "tcdate": 5, "tmdate": 6,
            "content": {
                "summary": {"value": "sum"}, "soundness": {"value": 3},
                "presentation": {"value": 2}, "contribution": {"value": 3},
                "strengths": {"value": "s"}, "weaknesses": {"value": "w"},
                "questions": {"value": "q"}, "rating": {"value": 6}
            }
        }));
        let row = normalize(&n, &REVIEW_V2, ApiVersion::V2)?.ok_or_else(|| OpenReviewError::Validation("skipped".into()))?;
        assert_eq!(row.get("rating"), Some(&json!(6)));
        assert_eq!(row.get("confidence"), Some(&json!("")));
        assert_eq!(row.get("replyto"), Some(&json!("s1")));
        Ok(())
    }

    #[test]
    fn test_v2_comment_by_reviewer() -> Result<()> {
        let n = note(json!({
            "id": "c1", "replyto": "r1",
            "signatures": ["~Reviewer_1"],
            "content": {"comment": {"value": "Thanks for the rebuttal."}}
        }));
        let row = normalize(&n, &COMMENT_V2, ApiVersion::V2)?.ok_or_else(|| OpenReviewError::Validation("skipped".into()))?;
        assert_eq!(row.get("writer"), Some(&json!("Reviewer")));
        assert_eq!(row.get("title"), Some(&json!("")));
        assert_eq!(row.get("comment"), Some(&json!("Thanks for the rebuttal.")));
        Ok(())
    }

    #[test]
    fn test_comment_skips() -> Result<()> {
        let no_body = note(json!({
            "id": "c2", "signatures": ["Paper1/Authors"],
            "content": {"title": {"value": "Re"}}
        }));
        assert!(normalize(&no_body, &COMMENT_V2, ApiVersion::V2)?.is_none());

        let area_chair = note(json!({
            "id": "c3", "signatures": ["Paper1/Area_Chair1"],
            "content": {"comment": "noted"}
        }));
        assert!(normalize(&area_chair, &COMMENT_V1, ApiVersion::V1)?.is_none());
        Ok(())
    }
}

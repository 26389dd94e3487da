//! Tables for venues served by OpenReview API v2.
//!
//! A v2 venue describes itself: its group content names the submission and
//! review invitations and the venue ids given to withdrawn and desk-rejected
//! papers.

use crate::content::Content;
use crate::error::{OpenReviewError, OptionExt, Result};
use crate::normalize::{normalize, normalize_all};
use crate::note::{ApiVersion, Group, Note};
use crate::outcome::OutcomeSets;
use crate::schema::{self, Category};
use crate::source::{NoteQuery, RecordSource};
use crate::table::Table;
use serde_json::Value;
use tracing::info;

/// Content field holding the venue a submission ended up in
const VENUE_ID_FIELD: &str = "venueid";

/// Invitation suffix of discussion comments
const COMMENT_SUFFIX: &str = "Official_Comment";

/// Venue settings read from its group
#[derive(Debug, Clone)]
pub struct Venue {
    group: Group,
}

impl Venue {
    pub async fn fetch<S: RecordSource>(source: &S, venue_id: &str) -> Result<Self> {
        let group = source.group(venue_id).await?;
        Ok(Self { group })
    }

    pub fn from_group(group: Group) -> Self {
        Self { group }
    }

    pub fn id(&self) -> &str {
        &self.group.id
    }

    fn setting(&self, key: &str) -> Result<&str> {
        Content::new(&self.group.content, ApiVersion::V2, &self.group.id).require_str(key)
    }

    pub fn submission_name(&self) -> Result<&str> {
        self.setting("submission_name")
    }

    pub fn withdrawn_venue_id(&self) -> Result<&str> {
        self.setting("withdrawn_venue_id")
    }

    pub fn desk_rejected_venue_id(&self) -> Result<&str> {
        self.setting("desk_rejected_venue_id")
    }

    pub fn review_name(&self) -> Result<&str> {
        self.setting("review_name")
    }

    /// `<venue>/-/<submission_name>`
    pub fn submission_invitation(&self) -> Result<String> {
        Ok(format!("{}/-/{}", self.id(), self.submission_name()?))
    }

    /// `<venue>/<submission_name><number>/-/<review_name>`
    pub fn review_invitation(&self, number: i64) -> Result<String> {
        Ok(format!(
            "{}/{}{}/-/{}",
            self.id(),
            self.submission_name()?,
            number,
            self.review_name()?
        ))
    }
}

fn ensure_v2<S: RecordSource>(source: &S) -> Result<()> {
    match source.api_version() {
        ApiVersion::V2 => Ok(()),
        other => Err(OpenReviewError::Config(format!(
            "API v2 tables need an API v2 source, got version {}",
            other
        ))),
    }
}

async fn ids_in_venue<S: RecordSource>(source: &S, venue_id: &str) -> Result<Vec<String>> {
    let notes = source.notes(&NoteQuery::content_eq(VENUE_ID_FIELD, venue_id)).await?;
    Ok(notes.into_iter().map(|n| n.id).collect())
}

/// Build `submissions.csv` for a v2 venue.
pub async fn make_submissions<S: RecordSource>(source: &S, venue: &Venue) -> Result<Table> {
    ensure_v2(source)?;
    let submission_schema = schema::lookup(Category::Submission, ApiVersion::V2, None)?;

    let submissions = source
        .notes(&NoteQuery::invitation(venue.submission_invitation()?))
        .await?;
    println!("found {} submissions", submissions.len());

    let mut rows = normalize_all(&submissions, submission_schema, ApiVersion::V2)?;
    println!("found {} records", rows.len());

    let accepted = ids_in_venue(source, venue.id()).await?;
    println!("found {} accepted submissions", accepted.len());
    let withdrawn = ids_in_venue(source, venue.withdrawn_venue_id()?).await?;
    println!("found {} withdrawn submissions", withdrawn.len());
    let desk_rejected = ids_in_venue(source, venue.desk_rejected_venue_id()?).await?;
    println!("found {} desk rejected submissions", desk_rejected.len());

    let sets = OutcomeSets::new(accepted, withdrawn, desk_rejected)?;
    for row in &mut rows {
        let id = row
            .get("id")
            .and_then(Value::as_str)
            .ok_or_parse("submission row without id")?;
        let outcome = sets.categorize(id);
        row.push("outcome", Value::from(outcome.as_str()));
    }

    info!(venue = venue.id(), rows = rows.len(), "Built submissions table");
    Table::assemble(rows)
}

fn is_comment(reply: &Note) -> bool {
    reply
        .invitations
        .first()
        .is_some_and(|invitation| invitation.ends_with(COMMENT_SUFFIX))
}

/// Build `official_reviews.csv` and `official_comments.csv` from the replies
/// attached to every submission.
pub async fn make_discussions<S: RecordSource>(source: &S, venue: &Venue) -> Result<(Table, Table)> {
    ensure_v2(source)?;
    let review_schema = schema::lookup(Category::Review, ApiVersion::V2, None)?;
    let comment_schema = schema::lookup(Category::Comment, ApiVersion::V2, None)?;

    let submissions = source
        .notes(&NoteQuery::invitation(venue.submission_invitation()?).with_details("replies"))
        .await?;

    let mut review_rows = Vec::new();
    for submission in &submissions {
        let number = submission
            .number
            .ok_or_parse(&format!("submission {} has no paper number", submission.id))?;
        let review_invitation = venue.review_invitation(number)?;
        for reply in submission.replies() {
            if !reply.invitations.contains(&review_invitation) {
                continue;
            }
            if let Some(row) = normalize(reply, review_schema, ApiVersion::V2)? {
                review_rows.push(row);
            }
        }
    }
    println!("found {} reviews", review_rows.len());

    let comments = submissions
        .iter()
        .flat_map(Note::replies)
        .filter(|reply| is_comment(reply));
    let comment_rows = normalize_all(comments, comment_schema, ApiVersion::V2)?;
    println!("found {} official comments", comment_rows.len());

    Ok((Table::assemble(review_rows)?, Table::assemble(comment_rows)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::fixtures::FakeSource;
    use serde_json::json;

    const VENUE_ID: &str = "ICLR.cc/2024/Conference";

    fn group() -> Group {
        Group {
            id: VENUE_ID.to_string(),
            domain: Some(VENUE_ID.to_string()),
            content: json!({
                "submission_name": {"value": "Submission"},
                "withdrawn_venue_id": {"value": "ICLR.cc/2024/Conference/Withdrawn_Submission"},
                "desk_rejected_venue_id": {"value": "ICLR.cc/2024/Conference/Desk_Rejected_Submission"},
                "review_name": {"value": "Official_Review"}
            })
            .as_object()
            .cloned()
            .unwrap_or_default(),
        }
    }

    fn note(value: Value) -> Note {
        serde_json::from_value(value).unwrap_or_default()
    }

    fn submission(id: &str, number: i64) -> Note {
        note(json!({
            "id": id, "number": number, "mdate": 1, "tmdate": 2,
            "content": {
                "title": {"value": format!("Paper {}", id)},
                "authors": {"value": ["A"]},
                "authorids": {"value": ["~A1"]},
                "keywords": {"value": ["k"]},
                "abstract": {"value": "abs"},
                "primary_area": {"value": "optimization"},
                "venueid": {"value": VENUE_ID}
            }
        }))
    }

    fn ids(list: &[&str]) -> Vec<Note> {
        list.iter()
            .map(|id| Note {
                id: id.to_string(),
                ..Default::default()
            })
            .collect()
    }

    fn source(accepted: &[&str], withdrawn: &[&str], desk_rejected: &[&str]) -> FakeSource {
        FakeSource::new(ApiVersion::V2)
            .with_group(group())
            .with_notes(
                NoteQuery::invitation("ICLR.cc/2024/Conference/-/Submission"),
                vec![submission("a", 1), submission("b", 2), submission("c", 3), submission("d", 4)],
            )
            .with_notes(NoteQuery::content_eq("venueid", VENUE_ID), ids(accepted))
            .with_notes(
                NoteQuery::content_eq("venueid", "ICLR.cc/2024/Conference/Withdrawn_Submission"),
                ids(withdrawn),
            )
            .with_notes(
                NoteQuery::content_eq("venueid", "ICLR.cc/2024/Conference/Desk_Rejected_Submission"),
                ids(desk_rejected),
            )
    }

    #[test]
    fn test_venue_settings() -> Result<()> {
        let venue = Venue::from_group(group());
        assert_eq!(venue.submission_invitation()?, "ICLR.cc/2024/Conference/-/Submission");
        assert_eq!(
            venue.review_invitation(7)?,
            "ICLR.cc/2024/Conference/Submission7/-/Official_Review"
        );

        let bare = Venue::from_group(Group {
            id: VENUE_ID.to_string(),
            ..Default::default()
        });
        assert!(matches!(bare.review_name(), Err(OpenReviewError::MissingField { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_submissions_outcomes() -> Result<()> {
        let source = source(&["a"], &["b"], &["c"]);
        let venue = Venue::fetch(&source, VENUE_ID).await?;
        let table = make_submissions(&source, &venue).await?;

        let outcomes: Vec<_> = table
            .rows()
            .iter()
            .filter_map(|r| r.get("outcome").and_then(Value::as_str))
            .collect();
        assert_eq!(outcomes, vec!["Accepted", "Withdrawn", "Desk_Rejected", "Rejected"]);
        assert_eq!(table.columns().len(), schema::SUBMISSION_V2.columns.len() + 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_overlapping_sets_are_fatal() -> Result<()> {
        let source = source(&["a", "b"], &["b"], &[]);
        let venue = Venue::fetch(&source, VENUE_ID).await?;
        match make_submissions(&source, &venue).await {
            Err(OpenReviewError::OverlappingOutcomes { left, right, ids }) => {
                assert_eq!((left, right), ("accepted", "withdrawn"));
                assert_eq!(ids, vec!["b".to_string()]);
            }
            other => panic!("expected overlap error, got {:?}", other.map(|t| t.len())),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_discussions_split_replies() -> Result<()> {
        let review = json!({
            "id": "r1", "replyto": "s1", "tcdate": 10, "tmdate": 11,
            "invitations": ["ICLR.cc/2024/Conference/Submission5/-/Official_Review"],
            "signatures": ["ICLR.cc/2024/Conference/Submission5/Reviewer_abcd"],
            "content": {
                "summary": {"value": "sum"}, "soundness": {"value": 3},
                "presentation": {"value": 3}, "contribution": {"value": 2},
                "strengths": {"value": "s"}, "weaknesses": {"value": "w"},
                "questions": {"value": "q"}, "rating": {"value": 8},
                "confidence": {"value": 4}
            }
        });
        let reply = |id: &str, signature: &str| {
            json!({
                "id": id, "replyto": "r1", "tcdate": 12, "tmdate": 13,
                "invitations": ["ICLR.cc/2024/Conference/Submission5/-/Official_Comment"],
                "signatures": [signature],
                "content": {"comment": {"value": "Thanks"}}
            })
        };
        let decision = json!({
            "id": "m1", "replyto": "s1",
            "invitations": ["ICLR.cc/2024/Conference/Submission5/-/Decision"],
            "content": {"decision": {"value": "Accept (poster)"}}
        });
        let with_replies = note(json!({
            "id": "s1", "number": 5,
            "details": {"replies": [
                review,
                reply("c1", "ICLR.cc/2024/Conference/Submission5/Authors"),
                reply("c2", "~Reviewer_1"),
                reply("c3", "ICLR.cc/2024/Conference/Submission5/Area_Chair_x"),
                decision
            ]}
        }));
        let source = FakeSource::new(ApiVersion::V2).with_group(group()).with_notes(
            NoteQuery::invitation("ICLR.cc/2024/Conference/-/Submission").with_details("replies"),
            vec![with_replies],
        );

        let venue = Venue::fetch(&source, VENUE_ID).await?;
        let (reviews, comments) = make_discussions(&source, &venue).await?;
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews.rows()[0].get("confidence"), Some(&json!(4)));

        let written: Vec<_> = comments
            .rows()
            .iter()
            .filter_map(|r| Some((r.get("id")?.as_str()?, r.get("writer")?.as_str()?)))
            .collect();
        assert_eq!(written, vec![("c1", "Authors"), ("c2", "Reviewer")]);
        Ok(())
    }
}

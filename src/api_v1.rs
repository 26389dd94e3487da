//! Tables for venues served by OpenReview API v1 (ICLR 2017 to 2023).

use crate::error::{OpenReviewError, OptionExt, Result};
use crate::normalize::{normalize, normalize_all};
use crate::note::{ApiVersion, Note};
use crate::outcome::{DecisionJoin, DecisionRule, Outcome};
use crate::schema::{self, Category};
use crate::source::{NoteQuery, RecordSource};
use crate::table::{Row, Table};
use crate::venues::VenueYear;
use serde_json::Value;
use tracing::{debug, info};

fn ensure_v1<S: RecordSource>(source: &S) -> Result<()> {
    match source.api_version() {
        ApiVersion::V1 => Ok(()),
        other => Err(OpenReviewError::Config(format!(
            "API v1 tables need an API v1 source, got version {}",
            other
        ))),
    }
}

/// Build `submissions.csv`: blind submissions with their outcome, then
/// withdrawn and desk-rejected submissions.
pub async fn make_submissions<S: RecordSource>(source: &S, venue: &VenueYear) -> Result<Table> {
    ensure_v1(source)?;
    let submission_schema = schema::lookup(Category::Submission, ApiVersion::V1, Some(venue.year))?;

    let blind = source.notes(&NoteQuery::invitation(venue.submission)).await?;
    println!("found {} blind submissions", blind.len());

    let join = match venue.decision {
        DecisionRule::ReplyJoin {
            invitation,
            field,
            labels,
        } => {
            let decisions = source.notes(&NoteQuery::invitation(invitation)).await?;
            let join = DecisionJoin::build(&decisions, venue.year, field, labels)?;
            info!(year = venue.year, decisions = join.len(), "Built decision join");
            Some(join)
        }
        _ => None,
    };

    let mut rows = Vec::with_capacity(blind.len());
    for submission in &blind {
        let Some(mut row) = normalize(submission, submission_schema, ApiVersion::V1)? else {
            continue;
        };
        let outcome = match &join {
            Some(join) => match join.resolve(submission)? {
                Some(outcome) => outcome,
                None => {
                    debug!(id = %submission.id, "No decision and not withdrawn, left out");
                    continue;
                }
            },
            None => {
                let side = fetch_side_records(source, venue, submission).await?;
                venue.classify(submission, &side)?
            }
        };
        push_outcome(&mut row, outcome);
        rows.push(row);
    }

    for (category, invitation, outcome) in [
        (Category::Withdrawal, venue.withdrawn, Outcome::Withdrawn),
        (Category::DeskRejection, venue.desk_rejected, Outcome::DeskRejected),
    ] {
        let notes = source.notes(&NoteQuery::invitation(invitation)).await?;
        let schema = schema::lookup(category, ApiVersion::V1, Some(venue.year))?;
        for mut row in normalize_all(&notes, schema, ApiVersion::V1)? {
            push_outcome(&mut row, outcome);
            rows.push(row);
        }
        println!("found {} {} submissions", notes.len(), outcome.as_str().to_lowercase());
    }

    println!("found {} records", rows.len());
    Table::assemble(rows)
}

async fn fetch_side_records<S: RecordSource>(source: &S, venue: &VenueYear, submission: &Note) -> Result<Vec<Note>> {
    if !matches!(venue.decision, DecisionRule::SideRecord { .. }) {
        return Ok(Vec::new());
    }
    let number = submission
        .number
        .ok_or_parse(&format!("submission {} has no paper number", submission.id))?;
    match venue.decision.side_invitation(number) {
        Some(invitation) => source.notes(&NoteQuery::invitation(invitation)).await,
        None => Ok(Vec::new()),
    }
}

fn push_outcome(row: &mut Row, outcome: Outcome) {
    row.push("outcome", Value::from(outcome.as_str()));
}

/// Build `official_reviews.csv` and `official_comments.csv`.
pub async fn make_discussions<S: RecordSource>(source: &S, venue: &VenueYear) -> Result<(Table, Table)> {
    ensure_v1(source)?;

    let reviews = source.notes(&NoteQuery::invitation(venue.review)).await?;
    let review_schema = schema::lookup(Category::Review, ApiVersion::V1, Some(venue.year))?;
    let review_rows = normalize_all(&reviews, review_schema, ApiVersion::V1)?;
    println!("found {} reviews", review_rows.len());

    let comments = source.notes(&NoteQuery::invitation(venue.comment)).await?;
    let comment_schema = schema::lookup(Category::Comment, ApiVersion::V1, Some(venue.year))?;
    let comment_rows = normalize_all(&comments, comment_schema, ApiVersion::V1)?;
    println!("found {} official comments", comment_rows.len());

    Ok((Table::assemble(review_rows)?, Table::assemble(comment_rows)?))
}

//! Decision outcome classification.
//!
//! API v1 venues changed their decision vocabulary every year, so each year
//! carries a [`DecisionRule`] with a fixed label table (see [`crate::venues`]).
//! Labels missing from a table are fatal: the table is a data-quality gate,
//! not a best-effort mapping.
//!
//! API v2 venues are classified by membership in three id sets which must be
//! pairwise disjoint ([`OutcomeSets`]).

use crate::content::Content;
use crate::error::{OpenReviewError, Result};
use crate::note::{ApiVersion, Note};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Coarse decision outcome of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accepted,
    Rejected,
    Withdrawn,
    DeskRejected,
    /// Resolved later through a reply-to join (API v1, 2018)
    Pending,
}

impl Outcome {
    /// Label written to the `outcome` column
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Accepted => "Accepted",
            Outcome::Rejected => "Rejected",
            Outcome::Withdrawn => "Withdrawn",
            Outcome::DeskRejected => "Desk_Rejected",
            Outcome::Pending => "",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Free-text decision label to outcome
pub type LabelTable = &'static [(&'static str, Outcome)];

/// Exact-match lookup; `context` names the year and field for the error.
pub fn lookup_label(table: LabelTable, label: &str, context: &str) -> Result<Outcome> {
    table
        .iter()
        .find(|(known, _)| *known == label)
        .map(|(_, outcome)| *outcome)
        .ok_or_else(|| OpenReviewError::UnknownLabel {
            context: context.to_string(),
            label: label.to_string(),
        })
}

/// Where a v1 year keeps its decision.
#[derive(Debug, Clone, Copy)]
pub enum DecisionRule {
    /// `content.venue` of the submission itself
    VenueLabel { labels: LabelTable },
    /// Presence of `content.venue` means accepted, absence rejected
    VenuePresence,
    /// One decision note per paper under its own invitation.
    /// `invitation` contains a `{number}` placeholder.
    SideRecord {
        invitation: &'static str,
        field: &'static str,
        labels: LabelTable,
    },
    /// Decision notes replying to submissions under one shared invitation
    ReplyJoin {
        invitation: &'static str,
        field: &'static str,
        labels: LabelTable,
    },
}

impl DecisionRule {
    /// Side-record invitation for a paper, if this rule needs one.
    pub fn side_invitation(&self, number: i64) -> Option<String> {
        match self {
            DecisionRule::SideRecord { invitation, .. } => {
                Some(invitation.replace("{number}", &number.to_string()))
            }
            _ => None,
        }
    }
}

/// Classify a v1 submission.
///
/// `side` holds the decision notes fetched for this paper when the rule is
/// [`DecisionRule::SideRecord`]; it is ignored otherwise. Reply-join years
/// return [`Outcome::Pending`], resolved afterwards by [`DecisionJoin`].
pub fn classify_v1(submission: &Note, year: u16, rule: &DecisionRule, side: &[Note]) -> Result<Outcome> {
    let content = Content::new(&submission.content, ApiVersion::V1, &submission.id);
    match rule {
        DecisionRule::VenueLabel { labels } => {
            let venue = content.require_str("venue")?;
            lookup_label(*labels, venue, &format!("{} venue", year))
        }
        DecisionRule::VenuePresence => Ok(if content.has("venue") {
            Outcome::Accepted
        } else {
            Outcome::Rejected
        }),
        DecisionRule::SideRecord { field, labels, .. } => {
            let number = submission.number.unwrap_or_default();
            let [decision] = side else {
                return Err(OpenReviewError::DecisionCardinality {
                    number,
                    found: side.len(),
                });
            };
            let decision_content = Content::new(&decision.content, ApiVersion::V1, &decision.id);
            let label = decision_content.require_str(field)?;
            lookup_label(*labels, label, &format!("{} {}", year, field))
        }
        DecisionRule::ReplyJoin { .. } => Ok(Outcome::Pending),
    }
}

/// Submission id to outcome, built from decision notes that reply to
/// submissions.
#[derive(Debug, Default)]
pub struct DecisionJoin {
    decisions: HashMap<String, Outcome>,
}

impl DecisionJoin {
    /// Build the join from decision notes; every label must be known.
    pub fn build(notes: &[Note], year: u16, field: &str, labels: LabelTable) -> Result<Self> {
        let mut decisions = HashMap::with_capacity(notes.len());
        for note in notes {
            let Some(replyto) = note.replyto.clone() else {
                debug!(id = %note.id, "Decision note without replyto, ignored");
                continue;
            };
            let content = Content::new(&note.content, ApiVersion::V1, &note.id);
            let label = content.require_str(field)?;
            let outcome = lookup_label(labels, label, &format!("{} {}", year, field))?;
            decisions.insert(replyto, outcome);
        }
        Ok(Self { decisions })
    }

    pub fn len(&self) -> usize {
        self.decisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decisions.is_empty()
    }

    /// Outcome of a submission, or `None` when it must be left out of the
    /// table: no decision and not a confirmed withdrawal.
    pub fn resolve(&self, submission: &Note) -> Result<Option<Outcome>> {
        if let Some(outcome) = self.decisions.get(&submission.id) {
            return Ok(Some(*outcome));
        }
        let content = Content::new(&submission.content, ApiVersion::V1, &submission.id);
        if content.get_str("withdrawal")? == Some("Confirmed") {
            return Ok(Some(Outcome::Withdrawn));
        }
        Ok(None)
    }
}

/// Accepted, withdrawn and desk-rejected submission ids of a v2 venue.
#[derive(Debug, Default)]
pub struct OutcomeSets {
    accepted: HashSet<String>,
    withdrawn: HashSet<String>,
    desk_rejected: HashSet<String>,
}

impl OutcomeSets {
    /// Build the sets; fails if any two of them share an id.
    pub fn new(
        accepted: impl IntoIterator<Item = String>,
        withdrawn: impl IntoIterator<Item = String>,
        desk_rejected: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let sets = Self {
            accepted: accepted.into_iter().collect(),
            withdrawn: withdrawn.into_iter().collect(),
            desk_rejected: desk_rejected.into_iter().collect(),
        };
        ensure_disjoint("accepted", &sets.accepted, "withdrawn", &sets.withdrawn)?;
        ensure_disjoint("accepted", &sets.accepted, "desk rejected", &sets.desk_rejected)?;
        ensure_disjoint("withdrawn", &sets.withdrawn, "desk rejected", &sets.desk_rejected)?;
        Ok(sets)
    }

    /// Outcome of a submission id; ids in no set were rejected.
    pub fn categorize(&self, id: &str) -> Outcome {
        if self.accepted.contains(id) {
            Outcome::Accepted
        } else if self.withdrawn.contains(id) {
            Outcome::Withdrawn
        } else if self.desk_rejected.contains(id) {
            Outcome::DeskRejected
        } else {
            Outcome::Rejected
        }
    }
}

fn ensure_disjoint(
    left: &'static str,
    a: &HashSet<String>,
    right: &'static str,
    b: &HashSet<String>,
) -> Result<()> {
    let mut ids: Vec<String> = a.intersection(b).cloned().collect();
    if ids.is_empty() {
        return Ok(());
    }
    ids.sort();
    Err(OpenReviewError::OverlappingOutcomes { left, right, ids })
}

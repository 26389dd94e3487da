//! ICLR venue years served by OpenReview API v1.
//!
//! One entry per year: the invitations each record category is posted
//! under, and where that year keeps its decisions.

use crate::error::{OpenReviewError, Result};
use crate::outcome::{classify_v1, DecisionRule, LabelTable, Outcome};
use crate::note::Note;

use crate::outcome::Outcome::{Accepted, Rejected};

/// Invitations and decision rule of one venue year
#[derive(Debug)]
pub struct VenueYear {
    pub year: u16,
    pub submission: &'static str,
    pub withdrawn: &'static str,
    pub desk_rejected: &'static str,
    /// Official review invitation pattern
    pub review: &'static str,
    /// Official comment invitation pattern
    pub comment: &'static str,
    pub decision: DecisionRule,
}

impl VenueYear {
    /// Look up a supported year.
    pub fn get(year: u16) -> Result<&'static VenueYear> {
        VENUE_YEARS
            .iter()
            .find(|v| v.year == year)
            .ok_or(OpenReviewError::UnsupportedYear(year))
    }

    /// Outcome of a blind submission; `side` as in [`classify_v1`].
    pub fn classify(&self, submission: &Note, side: &[Note]) -> Result<Outcome> {
        classify_v1(submission, self.year, &self.decision, side)
    }
}

const LABELS_2017: LabelTable = &[
    ("ICLR 2017 Poster", Accepted),
    ("ICLR 2017 Oral", Accepted),
    ("Submitted to ICLR 2017", Rejected),
    ("ICLR 2017 Invite to Workshop", Rejected),
];

const LABELS_2018: LabelTable = &[
    ("Accept (Oral)", Accepted),
    ("Accept (Poster)", Accepted),
    ("Invite to Workshop Track", Rejected),
    ("Reject", Rejected),
];

const LABELS_2019: LabelTable = &[
    ("Accept (Poster)", Accepted),
    ("Accept (Oral)", Accepted),
    ("Reject", Rejected),
];

const LABELS_2020: LabelTable = &[
    ("Accept (Poster)", Accepted),
    ("Accept (Spotlight)", Accepted),
    ("Accept (Talk)", Accepted),
    ("Reject", Rejected),
];

const LABELS_2022: LabelTable = &[
    ("ICLR 2022 Oral", Accepted),
    ("ICLR 2022 Poster", Accepted),
    ("ICLR 2022 Spotlight", Accepted),
    ("ICLR 2022 Submitted", Rejected),
];

const LABELS_2023: LabelTable = &[
    ("ICLR 2023 notable top 25%", Accepted),
    ("ICLR 2023 notable top 5%", Accepted),
    ("ICLR 2023 poster", Accepted),
    ("Submitted to ICLR 2023", Rejected),
];

pub static VENUE_YEARS: &[VenueYear] = &[
    VenueYear {
        year: 2017,
        submission: "ICLR.cc/2017/conference/-/submission",
        withdrawn: "ICLR.cc/2017/Conference/-/Withdrawn_Submission",
        desk_rejected: "ICLR.cc/2017/Conference/-/Desk_Rejected_Submission",
        review: "ICLR.cc/2017/conference/-/paper.*/official/review",
        comment: "ICLR.cc/2017/conference/-/paper.*/official/comment",
        decision: DecisionRule::VenueLabel { labels: LABELS_2017 },
    },
    VenueYear {
        year: 2018,
        submission: "ICLR.cc/2018/Conference/-/Blind_Submission",
        withdrawn: "ICLR.cc/2018/Conference/-/Withdrawn_Submission",
        desk_rejected: "ICLR.cc/2018/Conference/-/Desk_Rejected_Submission",
        review: "ICLR.cc/2018/Conference/-/Paper.*/Official_Review",
        comment: "ICLR.cc/2018/Conference/-/Paper.*/Official_Comment",
        decision: DecisionRule::ReplyJoin {
            invitation: "ICLR.cc/2018/Conference/-/Acceptance_Decision",
            field: "decision",
            labels: LABELS_2018,
        },
    },
    VenueYear {
        year: 2019,
        submission: "ICLR.cc/2019/Conference/-/Blind_Submission",
        withdrawn: "ICLR.cc/2019/Conference/-/Withdrawn_Submission",
        desk_rejected: "ICLR.cc/2019/Conference/-/Desk_Rejected_Submission",
        review: "ICLR.cc/2019/Conference/-/Paper.*/Official_Review",
        comment: "ICLR.cc/2019/Conference/-/Paper.*/Official_Comment",
        decision: DecisionRule::SideRecord {
            invitation: "ICLR.cc/2019/Conference/-/Paper{number}/Meta_Review",
            field: "recommendation",
            labels: LABELS_2019,
        },
    },
    VenueYear {
        year: 2020,
        submission: "ICLR.cc/2020/Conference/-/Blind_Submission",
        withdrawn: "ICLR.cc/2020/Conference/-/Withdrawn_Submission",
        desk_rejected: "ICLR.cc/2020/Conference/-/Desk_Rejected_Submission",
        review: "ICLR.cc/2020/Conference/Paper.*/-/Official_Review",
        comment: "ICLR.cc/2020/Conference/Paper.*/-/Official_Comment",
        decision: DecisionRule::SideRecord {
            invitation: "ICLR.cc/2020/Conference/Paper{number}/-/Decision",
            field: "decision",
            labels: LABELS_2020,
        },
    },
    VenueYear {
        year: 2021,
        submission: "ICLR.cc/2021/Conference/-/Blind_Submission",
        withdrawn: "ICLR.cc/2021/Conference/-/Withdrawn_Submission",
        desk_rejected: "ICLR.cc/2021/Conference/-/Desk_Rejected_Submission",
        review: "ICLR.cc/2021/Conference/Paper.*/-/Official_Review",
        comment: "ICLR.cc/2021/Conference/Paper.*/-/Official_Comment",
        decision: DecisionRule::VenuePresence,
    },
    VenueYear {
        year: 2022,
        submission: "ICLR.cc/2022/Conference/-/Blind_Submission",
        withdrawn: "ICLR.cc/2022/Conference/-/Withdrawn_Submission",
        desk_rejected: "ICLR.cc/2022/Conference/-/Desk_Rejected_Submission",
        review: "ICLR.cc/2022/Conference/Paper.*/-/Official_Review",
        comment: "ICLR.cc/2022/Conference/Paper.*/-/Official_Comment",
        decision: DecisionRule::VenueLabel { labels: LABELS_2022 },
    },
    VenueYear {
        year: 2023,
        submission: "ICLR.cc/2023/Conference/-/Blind_Submission",
        withdrawn: "ICLR.cc/2023/Conference/-/Withdrawn_Submission",
        desk_rejected: "ICLR.cc/2023/Conference/-/Desk_Rejected_Submission",
        review: "ICLR.cc/2023/Conference/Paper.*/-/Official_Review",
        comment: "ICLR.cc/2023/Conference/Paper.*/-/Official_Comment",
        decision: DecisionRule::VenueLabel { labels: LABELS_2023 },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(content: serde_json::Value) -> Note {
        Note {
            id: "s1".to_string(),
            number: Some(1),
            content: content.as_object().cloned().unwrap_or_default(),
            ..Default::default()
        }
    }

    #[test]
    fn test_2022_poster_is_accepted() -> Result<()> {
        let venue = VenueYear::get(2022)?;
        let note = submission(json!({"venue": "ICLR 2022 Poster"}));
        assert_eq!(venue.classify(&note, &[])?, Outcome::Accepted);
        Ok(())
    }

    #[test]
    fn test_2021_missing_venue_is_rejected() -> Result<()> {
        let venue = VenueYear::get(2021)?;
        let note = submission(json!({"title": "T"}));
        assert_eq!(venue.classify(&note, &[])?, Outcome::Rejected);
        Ok(())
    }

    #[test]
    fn test_every_label_in_table_classifies() -> Result<()> {
        for (year, labels) in [(2017, LABELS_2017), (2022, LABELS_2022), (2023, LABELS_2023)] {
            let venue = VenueYear::get(year)?;
            for (label, expected) in labels {
                let note = submission(json!({ "venue": label }));
                assert_eq!(venue.classify(&note, &[])?, *expected, "{} {}", year, label);
            }
            let unknown = submission(json!({"venue": "Accepted somewhere"}));
            assert!(matches!(
                venue.classify(&unknown, &[]),
                Err(OpenReviewError::UnknownLabel { .. })
            ));
        }
        Ok(())
    }

    #[test]
    fn test_2018_defers_to_join() -> Result<()> {
        let venue = VenueYear::get(2018)?;
        assert_eq!(venue.classify(&submission(json!({})), &[])?, Outcome::Pending);
        Ok(())
    }

    #[test]
    fn test_side_invitations() -> Result<()> {
        assert_eq!(
            VenueYear::get(2019)?.decision.side_invitation(42).as_deref(),
            Some("ICLR.cc/2019/Conference/-/Paper42/Meta_Review")
        );
        assert_eq!(
            VenueYear::get(2020)?.decision.side_invitation(42).as_deref(),
            Some("ICLR.cc/2020/Conference/Paper42/-/Decision")
        );
        assert!(VenueYear::get(2021)?.decision.side_invitation(42).is_none());
        assert!(matches!(VenueYear::get(2016), Err(OpenReviewError::UnsupportedYear(2016))));
        Ok(())
    }
}

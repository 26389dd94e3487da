//! Column tables for every exported record category.
//!
//! Each [`Schema`] lists its output columns in order and says where each
//! value comes from. Field presence rules live here and nowhere else: a
//! `Required` field that is absent aborts the run, an `Optional` one becomes
//! an empty string.

use crate::error::{OpenReviewError, Result};
use crate::note::ApiVersion;

/// Kind of record being exported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Submission,
    Withdrawal,
    DeskRejection,
    Review,
    Comment,
}

/// Note attributes outside the content map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meta {
    Id,
    Number,
    Replyto,
    Mdate,
    Tcdate,
    Tmdate,
}

/// Source of a column value
#[derive(Debug, Clone, Copy)]
pub enum Field {
    Meta(Meta),
    /// Content field that must be present
    Required(&'static str),
    /// Content field replaced by `""` when absent
    Optional(&'static str),
    /// First present content field among these; at least one must exist
    FirstOf(&'static [&'static str]),
    /// Author role derived from the signatures
    Writer,
}

/// One output column
#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub field: Field,
}

const fn col(name: &'static str, field: Field) -> Column {
    Column { name, field }
}

const fn req(name: &'static str) -> Column {
    col(name, Field::Required(name))
}

const fn opt(name: &'static str) -> Column {
    col(name, Field::Optional(name))
}

const fn meta(name: &'static str, meta: Meta) -> Column {
    col(name, Field::Meta(meta))
}

/// Column layout of one table
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub columns: &'static [Column],
    /// Records lacking this content field are skipped, not rejected
    pub body: Option<&'static str>,
}

impl Schema {
    /// Column names in output order
    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// Whether rows carry an author-role column
    pub fn has_writer(&self) -> bool {
        self.columns.iter().any(|c| matches!(c.field, Field::Writer))
    }
}

/// v1 submissions; older years name the author ids `author_emails`
pub static SUBMISSION_V1: Schema = Schema {
    name: "submission_v1",
    columns: &[
        meta("id", Meta::Id),
        meta("number", Meta::Number),
        meta("mdate", Meta::Mdate),
        meta("tmdate", Meta::Tmdate),
        req("title"),
        req("authors"),
        col("authorids", Field::FirstOf(&["authorids", "author_emails"])),
        req("keywords"),
        req("abstract"),
        req("pdf"),
    ],
    body: None,
};

/// v2 submissions; `pdf` is empty for papers withdrawn before the deadline
pub static SUBMISSION_V2: Schema = Schema {
    name: "submission_v2",
    columns: &[
        meta("id", Meta::Id),
        meta("number", Meta::Number),
        meta("mdate", Meta::Mdate),
        meta("tmdate", Meta::Tmdate),
        req("title"),
        req("authors"),
        req("authorids"),
        req("keywords"),
        req("abstract"),
        req("primary_area"),
        opt("pdf"),
    ],
    body: None,
};

/// v1 official reviews, 2017 through 2021
pub static REVIEW_V1_2017: Schema = Schema {
    name: "review_v1_2017",
    columns: &[
        meta("id", Meta::Id),
        meta("replyto", Meta::Replyto),
        meta("tcdate", Meta::Tcdate),
        meta("tmdate", Meta::Tmdate),
        opt("title"),
        req("review"),
        req("rating"),
        opt("confidence"),
    ],
    body: Some("review"),
};

pub static REVIEW_V1_2022: Schema = Schema {
    name: "review_v1_2022",
    columns: &[
        meta("id", Meta::Id),
        meta("replyto", Meta::Replyto),
        meta("tcdate", Meta::Tcdate),
        meta("tmdate", Meta::Tmdate),
        req("summary_of_the_paper"),
        req("main_review"),
        req("summary_of_the_review"),
        req("correctness"),
        req("technical_novelty_and_significance"),
        req("empirical_novelty_and_significance"),
        req("recommendation"),
        opt("confidence"),
    ],
    body: Some("main_review"),
};

pub static REVIEW_V1_2023: Schema = Schema {
    name: "review_v1_2023",
    columns: &[
        meta("id", Meta::Id),
        meta("replyto", Meta::Replyto),
        meta("tcdate", Meta::Tcdate),
        meta("tmdate", Meta::Tmdate),
        req("summary_of_the_paper"),
        req("strength_and_weaknesses"),
        req("clarity,_quality,_novelty_and_reproducibility"),
        req("summary_of_the_review"),
        req("correctness"),
        req("technical_novelty_and_significance"),
        req("empirical_novelty_and_significance"),
        req("recommendation"),
        opt("confidence"),
    ],
    body: Some("strength_and_weaknesses"),
};

pub static REVIEW_V2: Schema = Schema {
    name: "review_v2",
    columns: &[
        meta("id", Meta::Id),
        meta("replyto", Meta::Replyto),
        meta("tcdate", Meta::Tcdate),
        meta("tmdate", Meta::Tmdate),
        req("summary"),
        req("soundness"),
        req("presentation"),
        req("contribution"),
        req("strengths"),
        req("weaknesses"),
        req("questions"),
        req("rating"),
        opt("confidence"),
    ],
    body: None,
};

/// Author/reviewer discussion comments, identical layout in both versions
const COMMENT_COLUMNS: &[Column] = &[
    meta("id", Meta::Id),
    meta("replyto", Meta::Replyto),
    meta("tcdate", Meta::Tcdate),
    meta("tmdate", Meta::Tmdate),
    col("writer", Field::Writer),
    opt("title"),
    req("comment"),
];

pub static COMMENT_V1: Schema = Schema {
    name: "comment_v1",
    columns: COMMENT_COLUMNS,
    body: Some("comment"),
};

pub static COMMENT_V2: Schema = Schema {
    name: "comment_v2",
    columns: COMMENT_COLUMNS,
    body: Some("comment"),
};

/// Schema for a record category. `year` is needed for v1 reviews, whose
/// form changed in 2022 and 2023.
pub fn lookup(category: Category, api: ApiVersion, year: Option<u16>) -> Result<&'static Schema> {
    match (api, category) {
        (ApiVersion::V2, Category::Review) => Ok(&REVIEW_V2),
        (ApiVersion::V2, Category::Comment) => Ok(&COMMENT_V2),
        (ApiVersion::V2, _) => Ok(&SUBMISSION_V2),
        (ApiVersion::V1, Category::Comment) => Ok(&COMMENT_V1),
        (ApiVersion::V1, Category::Review) => {
            let year = year.ok_or_else(|| {
                OpenReviewError::Config("API v1 review schema needs a venue year".to_string())
            })?;
            match year {
                2017..=2021 => Ok(&REVIEW_V1_2017),
                2022 => Ok(&REVIEW_V1_2022),
                2023 => Ok(&REVIEW_V1_2023),
                other => Err(OpenReviewError::UnsupportedYear(other)),
            }
        }
        (ApiVersion::V1, _) => Ok(&SUBMISSION_V1),
    }
}

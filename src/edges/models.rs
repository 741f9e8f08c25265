//! Edge data models.
//!
//! - [`EdgeKey`] — canonical unordered author pair (smaller id first)
//! - [`ExperienceEdge`] — same-visit, same-day co-authorship (history)
//! - [`TeamEdge`] — same-visit co-authorship (care-team candidate)
//! - [`EdgeTables`] — both edge tables produced by one build

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Canonical key for an unordered pair of distinct authors.
///
/// `(A, B)` and `(B, A)` produce the same key; a self-pair has no key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeKey {
    source: String,
    target: String,
}

impl EdgeKey {
    /// Canonicalize a pair. Returns `None` when both ids are equal.
    pub fn new(a: &str, b: &str) -> Option<Self> {
        match a.cmp(b) {
            Ordering::Less => Some(Self {
                source: a.to_string(),
                target: b.to_string(),
            }),
            Ordering::Greater => Some(Self {
                source: b.to_string(),
                target: a.to_string(),
            }),
            Ordering::Equal => None,
        }
    }

    /// The lexicographically smaller author.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The lexicographically larger author.
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl std::fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.source, self.target)
    }
}

/// Two authors who wrote on the same visit on the same calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceEdge {
    pub key: EdgeKey,
    pub visit_id: String,
    /// Shared (normalized) note day
    pub note_date: NaiveDate,
    pub admission_date: NaiveDate,
    /// Both joined notes were in-team
    pub in_team: bool,
    /// Visit admitted after the warm-up window
    pub after_warmup: bool,
    /// Either joined note carries the condition flag
    pub condition: bool,
}

/// Two authors who both wrote on the same visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamEdge {
    pub key: EdgeKey,
    pub visit_id: String,
    pub admission_ts: NaiveDateTime,
    pub admission_date: NaiveDate,
    /// Both joined notes were in-team
    pub in_team: bool,
    /// Visit admitted after the warm-up window
    pub after_warmup: bool,
}

impl TeamEdge {
    /// Whether this co-authorship defines current care-team membership.
    pub fn is_care_team(&self) -> bool {
        self.in_team && self.after_warmup
    }
}

/// Output of the edge builder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeTables {
    /// Every same-day co-authorship
    pub experience: Vec<ExperienceEdge>,
    /// Same-visit co-authorships that are in-team and after warm-up
    pub team: Vec<TeamEdge>,
}

impl EdgeTables {
    /// Experience edges derived from condition-flagged notes.
    pub fn dx_experience(&self) -> impl Iterator<Item = &ExperienceEdge> {
        self.experience.iter().filter(|e| e.condition)
    }

    pub fn is_empty(&self) -> bool {
        self.experience.is_empty() && self.team.is_empty()
    }
}

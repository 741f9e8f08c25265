//! Edge construction by self-join.
//!
//! Normalized notes are joined with themselves on two keys:
//!
//! - **experience**: `(visit id, note day)` — all same-day co-authors
//! - **team**: `(visit id)` — all co-authors of the visit
//!
//! Joined rows where `left.author >= right.author` are dropped, which removes
//! self-pairs and mirrored duplicates in one step. Groups with fewer than two
//! distinct authors contribute nothing; an empty result is not an error.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;

use super::classifier::TeamClassifier;
use super::models::{EdgeTables, ExperienceEdge, TeamEdge};
use crate::error::Result;
use crate::notes::NormalizedNote;
use crate::window_duration;

/// Builds the experience and team edge tables from normalized notes.
#[derive(Debug, Clone, Copy)]
pub struct EdgeBuilder {
    classifier: TeamClassifier,
}

impl EdgeBuilder {
    pub fn new(study_start: NaiveDateTime, teamwork_window_days: i64) -> Result<Self> {
        let window = window_duration("teamwork", teamwork_window_days)?;
        Ok(Self {
            classifier: TeamClassifier::new(study_start, window)?,
        })
    }

    /// Build both edge tables.
    pub fn build(&self, notes: &[NormalizedNote]) -> EdgeTables {
        let tables = EdgeTables {
            experience: self.experience_edges(notes),
            team: self.team_edges(notes),
        };
        tracing::info!(
            "Built {} experience edges ({} condition-flagged) and {} team edges",
            tables.experience.len(),
            tables.dx_experience().count(),
            tables.team.len()
        );
        tables
    }

    /// Same-visit, same-day co-authorships, unfiltered.
    pub fn experience_edges(&self, notes: &[NormalizedNote]) -> Vec<ExperienceEdge> {
        self_join(notes, |n| (n.visit_id.as_str(), n.note_date))
            .filter_map(|(l, r)| self.classifier.experience_edge(l, r))
            .collect()
    }

    /// Same-visit co-authorships that are in-team and past warm-up.
    pub fn team_edges(&self, notes: &[NormalizedNote]) -> Vec<TeamEdge> {
        self_join(notes, |n| n.visit_id.as_str())
            .filter_map(|(l, r)| self.classifier.team_edge(l, r))
            .filter(TeamEdge::is_care_team)
            .collect()
    }
}

/// Inner self-join on `key`, keeping only canonical pairs (`left.author < right.author`).
///
/// Groups are visited in key order and rows within a group in input order,
/// so the output order is deterministic.
fn self_join<'a, K, F>(
    notes: &'a [NormalizedNote],
    key: F,
) -> impl Iterator<Item = (&'a NormalizedNote, &'a NormalizedNote)>
where
    K: Ord,
    F: Fn(&'a NormalizedNote) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'a NormalizedNote>> = BTreeMap::new();
    for note in notes {
        groups.entry(key(note)).or_default().push(note);
    }

    groups.into_values().flat_map(|group| {
        let mut pairs = Vec::new();
        for left in &group {
            for right in &group {
                if left.author < right.author {
                    pairs.push((*left, *right));
                }
            }
        }
        pairs
    })
}

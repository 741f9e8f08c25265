//! Corpus lookup index.
//!
//! Built once from the edge tables by an owned [`IndexBuilder`] and then
//! frozen into a read-only [`CorpusIndex`]:
//!
//! - visit → team edge entries (each pair once per visit)
//! - visit → team members
//! - edge key → sorted occurrence days (all experience edges)
//! - edge key → sorted occurrence days (condition-flagged experience edges)
//!
//! Insertion is append-only; keys are created on first insert and never removed.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::edges::{EdgeKey, ExperienceEdge, TeamEdge};

/// One team edge of a visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamEdgeEntry {
    pub key: EdgeKey,
    pub admission_date: NaiveDate,
}

/// Read-only lookup maps over the edge tables.
#[derive(Debug, Clone, Default)]
pub struct CorpusIndex {
    visit_edges: BTreeMap<String, Vec<TeamEdgeEntry>>,
    visit_teams: BTreeMap<String, BTreeSet<String>>,
    edge_dates: HashMap<EdgeKey, Vec<NaiveDate>>,
    dx_edge_dates: HashMap<EdgeKey, Vec<NaiveDate>>,
}

impl CorpusIndex {
    /// One pass over team edges, one over experience edges.
    pub fn build(team: &[TeamEdge], experience: &[ExperienceEdge]) -> Self {
        let mut builder = IndexBuilder::default();
        for edge in team {
            builder.push_team_edge(edge);
        }
        for edge in experience {
            builder.push_experience_edge(edge);
        }
        builder.finish()
    }

    pub(crate) fn visit_edge_map(&self) -> &BTreeMap<String, Vec<TeamEdgeEntry>> {
        &self.visit_edges
    }

    pub fn contains_visit(&self, visit_id: &str) -> bool {
        self.visit_edges.contains_key(visit_id)
    }

    /// Team edges of a visit (empty if the visit has no team).
    pub fn team_edges(&self, visit_id: &str) -> &[TeamEdgeEntry] {
        self.visit_edges
            .get(visit_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn team(&self, visit_id: &str) -> Option<&BTreeSet<String>> {
        self.visit_teams.get(visit_id)
    }

    /// Sorted occurrence days of a pair across all experience edges.
    pub fn edge_dates(&self, key: &EdgeKey) -> &[NaiveDate] {
        self.edge_dates.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sorted occurrence days of a pair across condition-flagged experience edges.
    pub fn dx_edge_dates(&self, key: &EdgeKey) -> &[NaiveDate] {
        self.dx_edge_dates
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn visit_count(&self) -> usize {
        self.visit_edges.len()
    }

    /// Number of distinct pairs with any experience history.
    pub fn experience_key_count(&self) -> usize {
        self.edge_dates.len()
    }
}

/// Exclusive owner of the index during the build phase.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    index: CorpusIndex,
    seen_team_edges: HashSet<(String, EdgeKey)>,
}

impl IndexBuilder {
    /// Record a team edge. Edges that are not care-team edges are ignored,
    /// as is a pair already recorded for the same visit.
    pub fn push_team_edge(&mut self, edge: &TeamEdge) {
        if !edge.is_care_team() {
            return;
        }
        if !self
            .seen_team_edges
            .insert((edge.visit_id.clone(), edge.key.clone()))
        {
            return;
        }

        self.index
            .visit_edges
            .entry(edge.visit_id.clone())
            .or_default()
            .push(TeamEdgeEntry {
                key: edge.key.clone(),
                admission_date: edge.admission_date,
            });

        let team = self
            .index
            .visit_teams
            .entry(edge.visit_id.clone())
            .or_default();
        team.insert(edge.key.source().to_string());
        team.insert(edge.key.target().to_string());
    }

    /// Record one occurrence of an experience edge.
    pub fn push_experience_edge(&mut self, edge: &ExperienceEdge) {
        self.index
            .edge_dates
            .entry(edge.key.clone())
            .or_default()
            .push(edge.note_date);

        if edge.condition {
            self.index
                .dx_edge_dates
                .entry(edge.key.clone())
                .or_default()
                .push(edge.note_date);
        }
    }

    /// Sort the occurrence lists and hand out the read-only index.
    pub fn finish(mut self) -> CorpusIndex {
        for dates in self.index.edge_dates.values_mut() {
            dates.sort_unstable();
        }
        for dates in self.index.dx_edge_dates.values_mut() {
            dates.sort_unstable();
        }
        tracing::debug!(
            "Index built: {} scored visits, {} experience pairs ({} condition-flagged)",
            self.index.visit_edges.len(),
            self.index.edge_dates.len(),
            self.index.dx_edge_dates.len()
        );
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{day, ts};

    fn team_edge(visit: &str, a: &str, b: &str, in_team: bool, after_warmup: bool) -> TeamEdge {
        TeamEdge {
            key: EdgeKey::new(a, b).unwrap(),
            visit_id: visit.into(),
            admission_ts: ts("2019-06-01 08:00"),
            admission_date: day("2019-06-01"),
            in_team,
            after_warmup,
        }
    }

    fn experience_edge(a: &str, b: &str, date: &str, condition: bool) -> ExperienceEdge {
        ExperienceEdge {
            key: EdgeKey::new(a, b).unwrap(),
            visit_id: "old".into(),
            note_date: day(date),
            admission_date: day(date),
            in_team: false,
            after_warmup: false,
            condition,
        }
    }

    #[test]
    fn test_team_maps() {
        let index = CorpusIndex::build(
            &[
                team_edge("v1", "a", "b", true, true),
                team_edge("v1", "b", "c", true, true),
                team_edge("v2", "a", "d", true, true),
            ],
            &[],
        );
        assert_eq!(index.visit_count(), 2);
        assert_eq!(index.team_edges("v1").len(), 2);
        let team: Vec<&str> = index.team("v1").unwrap().iter().map(String::as_str).collect();
        assert_eq!(team, vec!["a", "b", "c"]);
        assert!(index.team_edges("missing").is_empty());
        assert!(index.team("missing").is_none());
    }

    #[test]
    fn test_repeated_team_pair_listed_once() {
        let index = CorpusIndex::build(
            &[
                team_edge("v1", "a", "b", true, true),
                team_edge("v1", "b", "a", true, true),
            ],
            &[],
        );
        assert_eq!(index.team_edges("v1").len(), 1);
    }

    #[test]
    fn test_non_team_edges_ignored() {
        let index = CorpusIndex::build(
            &[
                team_edge("v1", "a", "b", false, true),
                team_edge("v2", "a", "b", true, false),
            ],
            &[],
        );
        assert_eq!(index.visit_count(), 0);
        assert!(!index.contains_visit("v1"));
        assert!(!index.contains_visit("v2"));
    }

    #[test]
    fn test_experience_dates_sorted_and_split() {
        let index = CorpusIndex::build(
            &[],
            &[
                experience_edge("a", "b", "2019-03-05", true),
                experience_edge("b", "a", "2019-03-01", false),
                experience_edge("a", "b", "2019-03-03", true),
            ],
        );
        let key = EdgeKey::new("a", "b").unwrap();
        assert_eq!(
            index.edge_dates(&key),
            &[day("2019-03-01"), day("2019-03-03"), day("2019-03-05")]
        );
        assert_eq!(
            index.dx_edge_dates(&key),
            &[day("2019-03-03"), day("2019-03-05")]
        );
        assert_eq!(index.experience_key_count(), 1);
        assert!(index.edge_dates(&EdgeKey::new("x", "y").unwrap()).is_empty());
    }
}

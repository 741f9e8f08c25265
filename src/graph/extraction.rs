//! Index → per-visit experience graphs.
//!
//! For every scored visit, each team edge is weighted by the number of prior
//! same-day co-authorships of the pair inside the lookback window:
//!
//! ```text
//! admission − teamwork_window ≤ day < admission
//! ```
//!
//! Edges with weight 0 are pruned, so a graph's nodes are exactly the
//! authors of its surviving edges. The same is done with the
//! condition-flagged history to produce the diagnosis graph.

use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use std::collections::BTreeMap;

use super::index::{CorpusIndex, TeamEdgeEntry};
use super::models::{ExperienceGraph, TeamExperience};
use crate::edges::EdgeKey;
use crate::error::Result;
use crate::window_duration;

/// Count the sorted `dates` inside `[admission − window, admission)`.
/// A window reaching before the calendar start counts from the first date.
pub fn count_in_window(dates: &[NaiveDate], admission: NaiveDate, window: Duration) -> u32 {
    let start = admission
        .checked_sub_signed(window)
        .unwrap_or(NaiveDate::MIN);
    let lo = dates.partition_point(|d| *d < start);
    let hi = dates.partition_point(|d| *d < admission);
    hi.saturating_sub(lo) as u32
}

/// Builds [`TeamExperience`]s from a [`CorpusIndex`].
#[derive(Debug, Clone, Copy)]
pub struct ExperienceGraphBuilder {
    teamwork_window: Duration,
}

impl ExperienceGraphBuilder {
    pub fn new(teamwork_window_days: i64) -> Result<Self> {
        Ok(Self {
            teamwork_window: window_duration("teamwork", teamwork_window_days)?,
        })
    }

    /// Build graphs for every visit in the index, in parallel.
    pub fn build_all(&self, index: &CorpusIndex) -> BTreeMap<String, TeamExperience> {
        let experiences: BTreeMap<String, TeamExperience> = index
            .visit_edge_map()
            .par_iter()
            .map(|(visit_id, entries)| {
                (
                    visit_id.clone(),
                    self.build_visit(index, visit_id, entries),
                )
            })
            .collect();

        tracing::info!(
            "Built experience graphs for {} visits ({} with prior collaboration)",
            experiences.len(),
            experiences
                .values()
                .filter(|e| e.graph.edge_count() > 0)
                .count()
        );
        experiences
    }

    /// Build the graphs of one visit.
    pub fn build_visit(
        &self,
        index: &CorpusIndex,
        visit_id: &str,
        entries: &[TeamEdgeEntry],
    ) -> TeamExperience {
        let graph = self.weighted_graph(entries, |key| index.edge_dates(key));
        let dx_graph = self.weighted_graph(entries, |key| index.dx_edge_dates(key));

        TeamExperience {
            visit_id: visit_id.to_string(),
            admission_date: entries
                .first()
                .map(|e| e.admission_date)
                .unwrap_or_default(),
            team: index.team(visit_id).cloned().unwrap_or_default(),
            team_edge_count: entries.len(),
            graph,
            dx_graph,
        }
    }

    fn weighted_graph<'h, F>(&self, entries: &[TeamEdgeEntry], history: F) -> ExperienceGraph
    where
        F: Fn(&EdgeKey) -> &'h [NaiveDate],
    {
        let mut graph = ExperienceGraph::with_capacity(entries.len(), entries.len());
        for entry in entries {
            let weight =
                count_in_window(history(&entry.key), entry.admission_date, self.teamwork_window);
            if weight < 1 {
                continue;
            }
            graph.add_edge(entry.key.source(), entry.key.target(), weight);
        }
        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::{ExperienceEdge, TeamEdge};
    use crate::test_helpers::{day, ts};

    fn team_edge(visit: &str, a: &str, b: &str, admission: &str) -> TeamEdge {
        TeamEdge {
            key: EdgeKey::new(a, b).unwrap(),
            visit_id: visit.into(),
            admission_ts: ts(admission),
            admission_date: day(admission),
            in_team: true,
            after_warmup: true,
        }
    }

    fn history(a: &str, b: &str, date: &str, condition: bool) -> ExperienceEdge {
        ExperienceEdge {
            key: EdgeKey::new(a, b).unwrap(),
            visit_id: "past".into(),
            note_date: day(date),
            admission_date: day(date),
            in_team: false,
            after_warmup: false,
            condition,
        }
    }

    #[test]
    fn test_count_in_window_bounds() {
        let dates = [
            day("2019-03-01"),
            day("2019-03-02"),
            day("2019-05-30"),
            day("2019-05-31"),
        ];
        let window = Duration::days(90);
        // 2019-05-31 − 90 days = 2019-03-02 (inclusive); admission day excluded
        assert_eq!(count_in_window(&dates, day("2019-05-31"), window), 2);
        assert_eq!(count_in_window(&dates, day("2019-06-01"), window), 2);
        assert_eq!(
            count_in_window(&dates, day("2019-06-01"), Duration::days(1000)),
            4
        );
    }

    #[test]
    fn test_count_in_window_past_calendar_start() {
        let dates = [day("2019-03-01"), day("2019-05-30")];
        let huge = Duration::try_days(1_000_000_000).unwrap();
        assert_eq!(count_in_window(&dates, day("2019-06-01"), huge), 2);
    }

    #[test]
    fn test_out_of_range_window_rejected() {
        assert!(ExperienceGraphBuilder::new(i64::MAX).is_err());
        assert!(ExperienceGraphBuilder::new(-1).is_err());
    }

    #[test]
    fn test_count_in_window_empty() {
        assert_eq!(count_in_window(&[], day("2019-06-01"), Duration::days(90)), 0);
    }

    #[test]
    fn test_zero_weight_edges_pruned() {
        let index = CorpusIndex::build(
            &[
                team_edge("v1", "a", "b", "2019-06-01"),
                team_edge("v1", "b", "c", "2019-06-01"),
            ],
            &[history("a", "b", "2019-05-01", false)],
        );
        let exp = ExperienceGraphBuilder::new(90)
            .unwrap()
            .build_visit(&index, "v1", index.team_edges("v1"));

        assert_eq!(exp.team.len(), 3);
        assert_eq!(exp.team_edge_count, 2);
        assert_eq!(exp.graph.edge_count(), 1);
        assert_eq!(exp.graph.node_count(), 2);
        assert!(!exp.graph.contains_node("c"));
        assert_eq!(exp.graph.edge_weight("a", "b"), Some(1));
        assert_eq!(exp.dx_graph.edge_count(), 0);
        assert_eq!(exp.dx_graph.node_count(), 0);
    }

    #[test]
    fn test_dx_graph_uses_condition_history_only() {
        let index = CorpusIndex::build(
            &[team_edge("v1", "a", "b", "2019-06-01")],
            &[
                history("a", "b", "2019-05-01", true),
                history("a", "b", "2019-05-02", false),
                history("a", "b", "2019-05-03", true),
            ],
        );
        let exp = ExperienceGraphBuilder::new(90)
            .unwrap()
            .build_visit(&index, "v1", index.team_edges("v1"));
        assert_eq!(exp.graph.edge_weight("a", "b"), Some(3));
        assert_eq!(exp.dx_graph.edge_weight("a", "b"), Some(2));
    }

    #[test]
    fn test_weight_monotone_in_window() {
        let index = CorpusIndex::build(
            &[team_edge("v1", "a", "b", "2019-06-01")],
            &[
                history("a", "b", "2019-05-25", false),
                history("a", "b", "2019-04-01", false),
                history("a", "b", "2019-01-15", false),
                history("a", "b", "2018-06-01", false),
            ],
        );
        let mut previous = 0;
        for window in [0, 7, 30, 90, 180, 365, 1000] {
            let exp = ExperienceGraphBuilder::new(window)
                .unwrap()
                .build_visit(&index, "v1", index.team_edges("v1"));
            let weight = exp.graph.edge_weight("a", "b").unwrap_or(0);
            assert!(weight >= previous, "window {} decreased weight", window);
            previous = weight;
        }
        assert_eq!(previous, 4);
    }

    #[test]
    fn test_build_all_matches_single_visit() {
        let index = CorpusIndex::build(
            &[
                team_edge("v1", "a", "b", "2019-06-01"),
                team_edge("v2", "a", "b", "2019-07-01"),
            ],
            &[
                history("a", "b", "2019-05-01", false),
                history("a", "b", "2019-06-15", false),
            ],
        );
        let all = ExperienceGraphBuilder::new(90).unwrap().build_all(&index);
        assert_eq!(all.len(), 2);
        assert_eq!(all["v1"].graph.edge_weight("a", "b"), Some(1));
        assert_eq!(all["v2"].graph.edge_weight("a", "b"), Some(2));
        assert_eq!(all["v2"].admission_date, day("2019-07-01"));
    }
}

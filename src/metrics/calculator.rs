//! Per-visit metric computation.

use rayon::prelude::*;
use std::collections::BTreeMap;

use super::demographics::{DemographicLookup, Sex};
use super::departments::DepartmentLookup;
use super::models::{GenderComposition, MetricsRow, VisitMetrics};
use crate::graph::{clustering_summary, TeamExperience};

/// Scores team experiences against a demographic lookup.
pub struct MetricsCalculator<'a> {
    demographics: &'a dyn DemographicLookup,
}

impl<'a> MetricsCalculator<'a> {
    pub fn new(demographics: &'a dyn DemographicLookup) -> Self {
        Self { demographics }
    }

    /// Metrics of one visit.
    pub fn compute(&self, exp: &TeamExperience) -> VisitMetrics {
        let clust = clustering_summary(&exp.graph);
        let dx_clust = clustering_summary(&exp.dx_graph);

        let team_size = exp.team.len();
        let potential_edges = team_size * team_size.saturating_sub(1) / 2;
        let team_edge_size = exp.graph.edge_count();
        let dx_edge_size = exp.dx_graph.edge_count();
        let experience = exp.graph.total_weight();
        let dx_experience = exp.dx_graph.total_weight();

        // Every surviving edge has weight >= 1, so neither subtraction underflows
        let cumulative_experience = experience.saturating_sub(team_edge_size as u64);
        let cumulative_dx_experience = dx_experience.saturating_sub(dx_edge_size as u64);

        let per_edge = |total: u64| {
            if potential_edges == 0 {
                0.0
            } else {
                total as f64 / potential_edges as f64
            }
        };

        let (recorded, guessed) = self.team_sexes(exp);
        let recorded = GenderComposition::from_sexes(recorded);
        let guessed = GenderComposition::from_sexes(guessed);

        VisitMetrics {
            visit_id: exp.visit_id.clone(),
            avg_clust: clust.average,
            avg_dx_clust: dx_clust.average,
            sum_clust: clust.sum,
            sum_dx_clust: dx_clust.sum,
            team_size,
            potential_edges,
            team_edge_size,
            dx_edge_size,
            experience,
            dx_experience,
            cumulative_experience,
            cumulative_dx_experience,
            avg_cumulative_experience: per_edge(cumulative_experience),
            avg_cumulative_dx_experience: per_edge(cumulative_dx_experience),
            gen_count: recorded.known,
            fem_count: recorded.female,
            gender_ratio: recorded.ratio,
            guessed_gen_count: guessed.known,
            guessed_fem_count: guessed.female,
            guessed_gender_ratio: guessed.ratio,
        }
    }

    /// Metrics of every visit merged with department records, in visit id order.
    pub fn score(
        &self,
        experiences: &BTreeMap<String, TeamExperience>,
        departments: &dyn DepartmentLookup,
    ) -> Vec<MetricsRow> {
        let rows: Vec<MetricsRow> = experiences
            .par_iter()
            .map(|(visit_id, exp)| {
                let department = match departments.department(visit_id) {
                    Some(record) => record.clone(),
                    None => {
                        tracing::warn!("No department record for visit {}", visit_id);
                        BTreeMap::new()
                    }
                };
                MetricsRow {
                    metrics: self.compute(exp),
                    department,
                }
            })
            .collect();

        tracing::info!("Scored {} visits", rows.len());
        rows
    }

    fn team_sexes(&self, exp: &TeamExperience) -> (Vec<Sex>, Vec<Sex>) {
        exp.team
            .iter()
            .map(|author| match self.demographics.lookup(author) {
                Some(p) => (p.sex, p.guessed_sex),
                None => {
                    tracing::debug!(
                        "No demographics for {} (visit {}), counted as unknown",
                        author,
                        exp.visit_id
                    );
                    (Sex::Unknown, Sex::Unknown)
                }
            })
            .unzip()
    }
}

// ============================================================================
// Tests
// ============================================================================

//! Exported metric types.
//!
//! - [`VisitMetrics`]: the fixed per-visit metrics
//! - [`MetricsRow`]: metrics plus the visit's department fields
//! - [`GenderComposition`]: known/female counts and their ratio
//! - [`METRIC_COLUMNS`]: export order of the metric fields

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::demographics::Sex;

/// Fixed metric columns, in export order.
pub const METRIC_COLUMNS: [&str; 21] = [
    "visit_id",
    "avg_clust",
    "avg_dx_clust",
    "sum_clust",
    "sum_dx_clust",
    "team_size",
    "potential_edges",
    "team_edge_size",
    "dx_edge_size",
    "experience",
    "dx_experience",
    "cumulative_experience",
    "cumulative_dx_experience",
    "avg_cumulative_experience",
    "avg_cumulative_dx_experience",
    "gen_count",
    "fem_count",
    "gender_ratio",
    "guessed_gen_count",
    "guessed_fem_count",
    "guessed_gender_ratio",
];

/// Female share among members of known sex.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GenderComposition {
    /// Members with a known (M/F) sex
    pub known: usize,
    pub female: usize,
    /// `female / known`, 0 when nobody is known
    pub ratio: f64,
}

impl GenderComposition {
    pub fn from_sexes(sexes: impl IntoIterator<Item = Sex>) -> Self {
        let (mut known, mut female) = (0usize, 0usize);
        for sex in sexes {
            if sex.is_known() {
                known += 1;
            }
            if sex == Sex::Female {
                female += 1;
            }
        }
        let ratio = if known > 0 {
            female as f64 / known as f64
        } else {
            0.0
        };
        Self {
            known,
            female,
            ratio,
        }
    }
}

/// Structural and demographic metrics of one visit's care team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitMetrics {
    pub visit_id: String,
    pub avg_clust: f64,
    pub avg_dx_clust: f64,
    pub sum_clust: f64,
    pub sum_dx_clust: f64,
    pub team_size: usize,
    pub potential_edges: usize,
    pub team_edge_size: usize,
    pub dx_edge_size: usize,
    pub experience: u64,
    pub dx_experience: u64,
    pub cumulative_experience: u64,
    pub cumulative_dx_experience: u64,
    pub avg_cumulative_experience: f64,
    pub avg_cumulative_dx_experience: f64,
    pub gen_count: usize,
    pub fem_count: usize,
    pub gender_ratio: f64,
    pub guessed_gen_count: usize,
    pub guessed_fem_count: usize,
    pub guessed_gender_ratio: f64,
}

impl VisitMetrics {
    /// Field values as strings, in [`METRIC_COLUMNS`] order.
    pub fn values(&self) -> Vec<String> {
        vec![
            self.visit_id.clone(),
            self.avg_clust.to_string(),
            self.avg_dx_clust.to_string(),
            self.sum_clust.to_string(),
            self.sum_dx_clust.to_string(),
            self.team_size.to_string(),
            self.potential_edges.to_string(),
            self.team_edge_size.to_string(),
            self.dx_edge_size.to_string(),
            self.experience.to_string(),
            self.dx_experience.to_string(),
            self.cumulative_experience.to_string(),
            self.cumulative_dx_experience.to_string(),
            self.avg_cumulative_experience.to_string(),
            self.avg_cumulative_dx_experience.to_string(),
            self.gen_count.to_string(),
            self.fem_count.to_string(),
            self.gender_ratio.to_string(),
            self.guessed_gen_count.to_string(),
            self.guessed_fem_count.to_string(),
            self.guessed_gender_ratio.to_string(),
        ]
    }
}

/// Exported row: visit metrics merged with the visit's department record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    #[serde(flatten)]
    pub metrics: VisitMetrics,
    #[serde(flatten)]
    pub department: BTreeMap<String, String>,
}

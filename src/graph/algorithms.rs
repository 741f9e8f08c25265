//! Graph algorithms on experience graphs.
//!
//! - **Weighted clustering coefficient** — geometric-mean definition over
//!   weights normalized by the graph's maximum weight
//! - **Clustering summary** — sum and divide-by-zero-guarded mean
//!
//! All algorithms operate on `ExperienceGraph` and return results indexed by
//! author id.

use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};

use super::models::ExperienceGraph;

// ============================================================================
// Weighted clustering coefficient
// ============================================================================

/// Compute the weighted local clustering coefficient of every node.
///
/// For a node `u` with `k ≥ 2` distinct neighbours:
///
/// ```text
/// c_u = 2 / (k (k − 1)) · Σ_{v < w, v ~ w} (ŵ_uv · ŵ_uw · ŵ_vw)^(1/3)
/// ```
///
/// where `ŵ = weight / max_weight`. Nodes with fewer than two neighbours
/// score 0. With all weights equal this reduces to the unweighted
/// triangles / possible-triangles ratio.
pub fn clustering_coefficient(graph: &ExperienceGraph) -> HashMap<String, f64> {
    let g = &graph.graph;
    let mut result = HashMap::with_capacity(g.node_count());
    let max_weight = f64::from(graph.max_weight().unwrap_or(1).max(1));

    let normalized = |a: NodeIndex, b: NodeIndex| -> Option<f64> {
        let edge = g.find_edge(a, b)?;
        g.edge_weight(edge)
            .map(|e| f64::from(e.weight) / max_weight)
    };

    for idx in g.node_indices() {
        let node = &g[idx];

        let mut neighbors: Vec<NodeIndex> = Vec::new();
        let mut seen = HashSet::new();
        for n in g.neighbors(idx) {
            if n != idx && seen.insert(n) {
                neighbors.push(n);
            }
        }

        let k = neighbors.len();
        if k < 2 {
            result.insert(node.clone(), 0.0);
            continue;
        }

        let mut weighted_triangles = 0.0;
        for i in 0..neighbors.len() {
            for j in (i + 1)..neighbors.len() {
                let (ni, nj) = (neighbors[i], neighbors[j]);
                if let (Some(w_ui), Some(w_uj), Some(w_ij)) = (
                    normalized(idx, ni),
                    normalized(idx, nj),
                    normalized(ni, nj),
                ) {
                    weighted_triangles += (w_ui * w_uj * w_ij).cbrt();
                }
            }
        }

        let possible = (k * (k - 1)) as f64;
        result.insert(node.clone(), 2.0 * weighted_triangles / possible);
    }

    result
}

// ============================================================================
// Summary
// ============================================================================

/// Sum and mean of the per-node clustering coefficients.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClusteringSummary {
    pub sum: f64,
    /// 0 for a graph without nodes
    pub average: f64,
}

pub fn clustering_summary(graph: &ExperienceGraph) -> ClusteringSummary {
    let cc = clustering_coefficient(graph);
    let sum: f64 = cc.values().sum();
    let average = if cc.is_empty() {
        0.0
    } else {
        sum / cc.len() as f64
    };
    ClusteringSummary { sum, average }
}

// ============================================================================
// Tests
// ============================================================================

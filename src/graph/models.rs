//! Collaboration graph data models.
//!
//! ## Graph structure
//! - [`CollaborationEdge`] — edge payload (experience weight)
//! - [`ExperienceGraph`] — petgraph `UnGraph` wrapper with author id ↔ NodeIndex mapping
//!
//! ## Per-visit output
//! - [`TeamExperience`] — team, experience graph and diagnosis graph of one visit
//! - [`WeightedEdge`] / [`TeamExperienceSummary`] — serializable views for export

use chrono::NaiveDate;
use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

// ============================================================================
// ExperienceGraph — petgraph wrapper with ID mapping
// ============================================================================

/// Edge payload: number of prior same-day co-authorships inside the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaborationEdge {
    pub weight: u32,
}

/// Wrapper around `petgraph::UnGraph` keyed by author id.
///
/// Nodes carry the author id. Adding an edge between two authors that are
/// already connected replaces the weight rather than creating a parallel edge.
#[derive(Debug, Clone)]
pub struct ExperienceGraph {
    /// The underlying undirected graph
    pub graph: UnGraph<String, CollaborationEdge>,
    /// Mapping from author id to petgraph NodeIndex
    pub id_to_index: HashMap<String, NodeIndex>,
}

impl ExperienceGraph {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::new_undirected(),
            id_to_index: HashMap::new(),
        }
    }

    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: UnGraph::with_capacity(nodes, edges),
            id_to_index: HashMap::with_capacity(nodes),
        }
    }

    /// Add an author node; returns the existing index if already present.
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.id_to_index.insert(id.to_string(), idx);
        idx
    }

    /// Connect two authors, creating missing nodes.
    pub fn add_edge(&mut self, a: &str, b: &str, weight: u32) -> EdgeIndex {
        let ia = self.add_node(a);
        let ib = self.add_node(b);
        self.graph.update_edge(ia, ib, CollaborationEdge { weight })
    }

    pub fn get_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Weight of the edge between two authors, if connected.
    pub fn edge_weight(&self, a: &str, b: &str) -> Option<u32> {
        let ia = self.get_index(a)?;
        let ib = self.get_index(b)?;
        let edge = self.graph.find_edge(ia, ib)?;
        self.graph.edge_weight(edge).map(|e| e.weight)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> u64 {
        self.graph
            .edge_references()
            .map(|e| u64::from(e.weight().weight))
            .sum()
    }

    /// Largest edge weight, `None` for an edgeless graph.
    pub fn max_weight(&self) -> Option<u32> {
        self.graph.edge_references().map(|e| e.weight().weight).max()
    }

    /// All edges, canonicalized (smaller id first) and sorted.
    pub fn weighted_edges(&self) -> Vec<WeightedEdge> {
        let mut edges: Vec<WeightedEdge> = self
            .graph
            .edge_references()
            .map(|e| {
                let (a, b) = (&self.graph[e.source()], &self.graph[e.target()]);
                let (source, target) = if a <= b { (a, b) } else { (b, a) };
                WeightedEdge {
                    source: source.clone(),
                    target: target.clone(),
                    weight: e.weight().weight,
                }
            })
            .collect();
        edges.sort_by(|x, y| (&x.source, &x.target).cmp(&(&y.source, &y.target)));
        edges
    }
}

impl Default for ExperienceGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable edge view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

// ============================================================================
// Per-visit team experience
// ============================================================================

/// The care team of one visit and its weighted collaboration history.
#[derive(Debug, Clone)]
pub struct TeamExperience {
    pub visit_id: String,
    pub admission_date: NaiveDate,
    /// Distinct authors of the visit's team edges
    pub team: BTreeSet<String>,
    /// Number of distinct team edges (before weight pruning)
    pub team_edge_count: usize,
    /// Team edges with at least one prior co-authorship in the window
    pub graph: ExperienceGraph,
    /// Same, counting only condition-flagged co-authorships
    pub dx_graph: ExperienceGraph,
}

impl TeamExperience {
    pub fn summary(&self) -> TeamExperienceSummary {
        TeamExperienceSummary {
            visit_id: self.visit_id.clone(),
            admission_date: self.admission_date,
            team: self.team.iter().cloned().collect(),
            team_edge_count: self.team_edge_count,
            graph: self.graph.weighted_edges(),
            dx_graph: self.dx_graph.weighted_edges(),
        }
    }
}

/// Serializable view of a [`TeamExperience`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamExperienceSummary {
    pub visit_id: String,
    pub admission_date: NaiveDate,
    pub team: Vec<String>,
    pub team_edge_count: usize,
    pub graph: Vec<WeightedEdge>,
    pub dx_graph: Vec<WeightedEdge>,
}

// ============================================================================
// Tests
// ============================================================================

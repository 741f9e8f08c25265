//! Team experience graphs.
//!
//! Turns the edge tables into one weighted collaboration graph per scored
//! visit, plus the graph algorithms the metrics need.
//!
//! ## Architecture
//!
//! ```text
//! EdgeTables ──► index (CorpusIndex) ──► extraction ──► TeamExperience per visit
//!                                                            │
//!                                                       algorithms
//!                                                            │
//!                                                   clustering summaries
//! ```
//!
//! ## Modules
//!
//! - [`models`] — `ExperienceGraph`, `TeamExperience` and serializable views
//! - [`index`] — `CorpusIndex` / `IndexBuilder` (append-only lookup maps)
//! - [`extraction`] — `ExperienceGraphBuilder` (window-weighted per-visit graphs)
//! - [`algorithms`] — weighted clustering coefficient

pub mod algorithms;
pub mod extraction;
pub mod index;
pub mod models;

pub use algorithms::{clustering_coefficient, clustering_summary, ClusteringSummary};
pub use extraction::{count_in_window, ExperienceGraphBuilder};
pub use index::{CorpusIndex, IndexBuilder, TeamEdgeEntry};
pub use models::{
    CollaborationEdge, ExperienceGraph, TeamExperience, TeamExperienceSummary, WeightedEdge,
};

//! Co-authorship edges.
//!
//! ```text
//! normalized notes ──► self-join (visit, day) ──► experience edges
//!                  └─► self-join (visit)      ──► team edges (in-team ∧ after warm-up)
//! ```
//!
//! - [`models`] — `EdgeKey`, `ExperienceEdge`, `TeamEdge`, `EdgeTables`
//! - [`classifier`] — `TeamClassifier`: in-team / warm-up / condition predicates
//! - [`builder`] — `EdgeBuilder`: the self-joins

pub mod builder;
pub mod classifier;
pub mod models;

pub use builder::EdgeBuilder;
pub use classifier::TeamClassifier;
pub use models::{EdgeKey, EdgeTables, ExperienceEdge, TeamEdge};

//! Clinical note ingestion.
//!
//! Turns a raw note table (one row per clinical note) into the normalized,
//! deduplicated, team-labelled note list every downstream stage consumes.
//!
//! ## Modules
//!
//! - [`models`] — `ColumnMapping`, `Note`, `NormalizedNote`
//! - [`table`] — `NoteTable`, an in-memory header + rows table (CSV loadable)
//! - [`normalize`] — `NoteNormalizer`: date truncation, dedup, sort, in-team flag

pub mod models;
pub mod normalize;
pub mod table;

pub use models::{ColumnMapping, NormalizedNote, Note};
pub use normalize::{parse_flag, parse_timestamp, NoteNormalizer};
pub use table::NoteTable;

//! End-to-end corpus pipeline.
//!
//! ```text
//! NoteTable ──► NoteNormalizer ──► EdgeBuilder ──► CorpusIndex ──► ExperienceGraphBuilder
//!                                                                          │
//!                                               score(demographics, departments)
//! ```
//!
//! Everything is computed once in [`TeamworkCorpus::new`] and read-only afterwards.

use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::path::Path;

use crate::edges::{EdgeBuilder, EdgeTables};
use crate::error::Result;
use crate::graph::{CorpusIndex, ExperienceGraphBuilder, TeamExperience};
use crate::metrics::{DemographicLookup, DepartmentLookup, MetricsCalculator, MetricsRow};
use crate::notes::{NormalizedNote, NoteNormalizer, NoteTable};
use crate::CorpusConfig;

/// A normalized note corpus with its edges, index and per-visit graphs.
#[derive(Debug, Clone)]
pub struct TeamworkCorpus {
    study_start: NaiveDateTime,
    notes: Vec<NormalizedNote>,
    edges: EdgeTables,
    index: CorpusIndex,
    team_experience: BTreeMap<String, TeamExperience>,
}

impl TeamworkCorpus {
    /// Build the corpus from an in-memory note table.
    pub fn new(table: &NoteTable, config: &CorpusConfig) -> Result<Self> {
        config.validate()?;
        let normalizer = NoteNormalizer::new(config.columns.clone(), config.team_window_days)?;
        let notes = normalizer.normalize(table)?;
        Self::from_notes(notes, config)
    }

    /// Load a delimited note file and build the corpus.
    pub fn from_csv(path: &Path, config: &CorpusConfig) -> Result<Self> {
        let table = NoteTable::from_path(path)?;
        Self::new(&table, config)
    }

    /// Build from notes that are already normalized.
    pub fn from_notes(notes: Vec<NormalizedNote>, config: &CorpusConfig) -> Result<Self> {
        let study_start = config
            .study_start
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .or_else(|| notes.iter().map(|n| n.admission_ts).min())
            .unwrap_or_default();

        let edges = EdgeBuilder::new(study_start, config.teamwork_window_days)?.build(&notes);
        let index = CorpusIndex::build(&edges.team, &edges.experience);
        let team_experience =
            ExperienceGraphBuilder::new(config.teamwork_window_days)?.build_all(&index);

        tracing::info!(
            "Corpus ready: {} notes, study start {}, {} scored visits",
            notes.len(),
            study_start,
            team_experience.len()
        );

        Ok(Self {
            study_start,
            notes,
            edges,
            index,
            team_experience,
        })
    }

    pub fn study_start(&self) -> NaiveDateTime {
        self.study_start
    }

    pub fn notes(&self) -> &[NormalizedNote] {
        &self.notes
    }

    pub fn edges(&self) -> &EdgeTables {
        &self.edges
    }

    pub fn index(&self) -> &CorpusIndex {
        &self.index
    }

    /// Team experience of every scored visit, by visit id.
    pub fn team_experience(&self) -> &BTreeMap<String, TeamExperience> {
        &self.team_experience
    }

    /// `None` when the visit has no care team (or is inside the warm-up period).
    pub fn team_experience_for(&self, visit_id: &str) -> Option<&TeamExperience> {
        self.team_experience.get(visit_id)
    }

    /// Metric rows of every scored visit, in visit id order.
    pub fn score(
        &self,
        demographics: &dyn DemographicLookup,
        departments: &dyn DepartmentLookup,
    ) -> Vec<MetricsRow> {
        MetricsCalculator::new(demographics).score(&self.team_experience, departments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CorpusError;
    use crate::metrics::{DemographicTable, DepartmentTable};
    use crate::test_helpers::{note_table, same_day_rows, ts};

    #[test]
    fn test_study_start_defaults_to_earliest_admission() {
        let mut rows = same_day_rows("v2", "2019-06-01 08:00", "2019-06-01 09:00", &["a", "b"]);
        rows.extend(same_day_rows("v1", "2019-01-03 10:00", "2019-01-03 11:00", &["a", "c"]));
        let corpus = TeamworkCorpus::new(&note_table(&rows), &CorpusConfig::default()).unwrap();
        assert_eq!(corpus.study_start(), ts("2019-01-03 10:00"));
        assert_eq!(corpus.notes().len(), 4);
    }

    #[test]
    fn test_explicit_study_start() {
        let rows = same_day_rows("v1", "2019-01-03 10:00", "2019-01-03 11:00", &["a", "b"]);
        let config = CorpusConfig {
            study_start: chrono::NaiveDate::from_ymd_opt(2018, 1, 1),
            ..CorpusConfig::default()
        };
        let corpus = TeamworkCorpus::new(&note_table(&rows), &config).unwrap();
        assert_eq!(corpus.study_start(), ts("2018-01-01 00:00"));
        // 2019-01-03 is past the 90-day warm-up, so the visit is scored
        assert!(corpus.team_experience_for("v1").is_some());
    }

    #[test]
    fn test_warmup_visit_not_scored() {
        let rows = same_day_rows("v1", "2019-01-03 10:00", "2019-01-03 11:00", &["a", "b"]);
        let corpus = TeamworkCorpus::new(&note_table(&rows), &CorpusConfig::default()).unwrap();
        assert!(corpus.team_experience().is_empty());
        assert_eq!(corpus.edges().experience.len(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = CorpusConfig::default();
        config.columns.note_author = config.columns.visit_id.clone();
        let err = TeamworkCorpus::new(&note_table(&[]), &config).unwrap_err();
        assert!(matches!(err, CorpusError::InvalidConfig(_)));
    }

    #[test]
    fn test_empty_corpus_scores_nothing() {
        let corpus = TeamworkCorpus::new(&note_table(&[]), &CorpusConfig::default()).unwrap();
        let rows = corpus.score(&DemographicTable::new(), &DepartmentTable::new());
        assert!(rows.is_empty());
    }
}

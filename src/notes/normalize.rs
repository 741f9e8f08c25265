//! Note normalization.
//!
//! Pipeline for a raw [`NoteTable`]:
//! 1. Bind the five semantic columns (missing column → error)
//! 2. Parse timestamps and the condition flag per row
//! 3. Collapse duplicates on `(note day, author, visit)` to a single note
//! 4. Sort ascending by admission timestamp (stable)
//! 5. Label each note in-team / out-of-team

use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::models::{ColumnMapping, NormalizedNote, Note};
use super::table::NoteTable;
use crate::error::{CorpusError, Result};
use crate::window_duration;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Parse a timestamp cell. Bare dates read as midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a boolean flag cell. An empty cell is `false`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "0.0" | "false" | "f" | "no" | "n" => Some(false),
        "1" | "1.0" | "true" | "t" | "yes" | "y" => Some(true),
        _ => None,
    }
}

/// Column positions resolved against a concrete table.
struct BoundColumns {
    visit_id: usize,
    admission_date: usize,
    note_date: usize,
    note_author: usize,
    team_condition: usize,
}

/// Cleans a raw note table into [`NormalizedNote`]s.
#[derive(Debug, Clone)]
pub struct NoteNormalizer {
    columns: ColumnMapping,
    team_window: Duration,
}

impl NoteNormalizer {
    pub fn new(columns: ColumnMapping, team_window_days: i64) -> Result<Self> {
        Ok(Self {
            columns,
            team_window: window_duration("team", team_window_days)?,
        })
    }

    /// Normalize a raw table. Fails if a bound column is absent or a cell
    /// cannot be parsed.
    pub fn normalize(&self, table: &NoteTable) -> Result<Vec<NormalizedNote>> {
        let bound = self.bind(table)?;
        let mut notes = Vec::with_capacity(table.len());

        for (row_no, row) in table.rows().iter().enumerate() {
            let cell = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or("");

            let visit_id = cell(bound.visit_id);
            let author = cell(bound.note_author);
            if visit_id.is_empty() || author.is_empty() {
                tracing::debug!("Dropping note row {}: empty visit id or author", row_no);
                continue;
            }

            notes.push(Note {
                visit_id: visit_id.to_string(),
                admission_ts: timestamp_cell(
                    row_no,
                    &self.columns.admission_date,
                    cell(bound.admission_date),
                )?,
                note_ts: timestamp_cell(row_no, &self.columns.note_date, cell(bound.note_date))?,
                author: author.to_string(),
                condition: parse_flag(cell(bound.team_condition)).ok_or_else(|| {
                    CorpusError::InvalidValue {
                        row: row_no,
                        column: self.columns.team_condition.clone(),
                        value: cell(bound.team_condition).to_string(),
                        reason: "expected a boolean flag".into(),
                    }
                })?,
            });
        }

        Ok(self.normalize_notes(notes))
    }

    /// Dedup, sort and label already-parsed notes.
    ///
    /// Every `(note day, author, visit)` group collapses to one note that
    /// keeps the group's earliest note timestamp (with that note's admission
    /// timestamp) and the OR of the group's condition flags.
    pub fn normalize_notes(&self, notes: Vec<Note>) -> Vec<NormalizedNote> {
        let raw_count = notes.len();
        let mut kept: Vec<Note> = Vec::with_capacity(raw_count);
        let mut groups: HashMap<(NaiveDate, String, String), usize> = HashMap::new();

        for note in notes {
            let key = (
                note.note_ts.date(),
                note.author.clone(),
                note.visit_id.clone(),
            );
            match groups.entry(key) {
                Entry::Occupied(slot) => {
                    let existing = &mut kept[*slot.get()];
                    existing.condition |= note.condition;
                    if note.note_ts < existing.note_ts {
                        existing.note_ts = note.note_ts;
                        existing.admission_ts = note.admission_ts;
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(kept.len());
                    kept.push(note);
                }
            }
        }

        kept.sort_by_key(|n| n.admission_ts);

        let normalized: Vec<NormalizedNote> = kept
            .into_iter()
            .map(|n| NormalizedNote::from_note(n, self.team_window))
            .collect();

        tracing::debug!(
            "Normalized {} notes ({} duplicates collapsed, {} in-team)",
            normalized.len(),
            raw_count - normalized.len(),
            normalized.iter().filter(|n| n.in_team).count()
        );
        normalized
    }

    fn bind(&self, table: &NoteTable) -> Result<BoundColumns> {
        let find = |role: &'static str, column: &str| {
            table
                .column_index(column)
                .ok_or_else(|| CorpusError::MissingColumn {
                    column: column.to_string(),
                    role,
                })
        };
        Ok(BoundColumns {
            visit_id: find("visit_id", &self.columns.visit_id)?,
            admission_date: find("admission_date", &self.columns.admission_date)?,
            note_date: find("note_date", &self.columns.note_date)?,
            note_author: find("note_author", &self.columns.note_author)?,
            team_condition: find("team_condition", &self.columns.team_condition)?,
        })
    }
}

fn timestamp_cell(row: usize, column: &str, value: &str) -> Result<NaiveDateTime> {
    parse_timestamp(value).ok_or_else(|| CorpusError::InvalidValue {
        row,
        column: column.to_string(),
        value: value.to_string(),
        reason: "expected a date or timestamp".into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{day, note_table, test_note, ts};
    use std::collections::HashSet;

    fn normalizer() -> NoteNormalizer {
        NoteNormalizer::new(ColumnMapping::default(), 2).unwrap()
    }

    #[test]
    fn test_out_of_range_team_window_rejected() {
        assert!(matches!(
            NoteNormalizer::new(ColumnMapping::default(), 1_000_000_000_000),
            Err(CorpusError::InvalidConfig(_))
        ));
        assert!(NoteNormalizer::new(ColumnMapping::default(), -1).is_err());
    }

    // --- Cell parsing ---

    #[test]
    fn test_parse_timestamp_formats() {
        assert_eq!(parse_timestamp("2019-01-24 10:15:00"), Some(ts("2019-01-24 10:15")));
        assert_eq!(
            parse_timestamp("2019-01-24T10:15:00.250").map(|t| t.date()),
            Some(day("2019-01-24"))
        );
        assert_eq!(parse_timestamp("2019-01-24 10:15"), Some(ts("2019-01-24 10:15")));
        assert_eq!(parse_timestamp("2019-01-24"), Some(ts("2019-01-24 00:00")));
        assert_eq!(parse_timestamp("01/24/2019 10:15"), Some(ts("2019-01-24 10:15")));
        assert_eq!(parse_timestamp("01/24/2019"), Some(ts("2019-01-24 00:00")));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_parse_flag_variants() {
        for v in ["1", "True", "t", "YES", "y", "1.0"] {
            assert_eq!(parse_flag(v), Some(true), "{}", v);
        }
        for v in ["0", "False", "f", "no", "N", "0.0", ""] {
            assert_eq!(parse_flag(v), Some(false), "{}", v);
        }
        assert_eq!(parse_flag("maybe"), None);
    }

    // --- Table normalization ---

    #[test]
    fn test_missing_column_is_error() {
        let table = NoteTable::from_rows(&["id", "arrive_date", "date", "dr"], &[]);
        let err = normalizer().normalize(&table).unwrap_err();
        match err {
            CorpusError::MissingColumn { column, role } => {
                assert_eq!(column, "hf");
                assert_eq!(role, "team_condition");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_custom_column_mapping() {
        let columns = ColumnMapping {
            visit_id: "enc_csn_id".into(),
            note_author: "author_prov_id".into(),
            ..Default::default()
        };
        let table = NoteTable::from_rows(
            &["enc_csn_id", "arrive_date", "date", "author_prov_id", "hf"],
            &[vec!["7", "2019-01-01", "2019-01-01 09:00", "p1", "1"]],
        );
        let notes = NoteNormalizer::new(columns, 2).unwrap().normalize(&table).unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].visit_id, "7");
        assert_eq!(notes[0].author, "p1");
    }

    #[test]
    fn test_invalid_timestamp_reports_row_and_column() {
        let table = note_table(&[("v1", "not-a-date", "2019-01-01", "a", true)]);
        let err = normalizer().normalize(&table).unwrap_err();
        match err {
            CorpusError::InvalidValue { row, column, .. } => {
                assert_eq!(row, 0);
                assert_eq!(column, "arrive_date");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_invalid_flag_is_error() {
        let mut table = note_table(&[]);
        table.push_row(vec![
            "v1".into(),
            "2019-01-01".into(),
            "2019-01-01".into(),
            "a".into(),
            "maybe".into(),
        ]);
        assert!(matches!(
            normalizer().normalize(&table),
            Err(CorpusError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_rows_without_author_are_dropped() {
        let table = note_table(&[
            ("v1", "2019-01-01", "2019-01-01", "", true),
            ("v1", "2019-01-01", "2019-01-01", "a", true),
        ]);
        let notes = normalizer().normalize(&table).unwrap();
        assert_eq!(notes.len(), 1);
    }

    // --- Dedup ---

    #[test]
    fn test_duplicates_collapse_to_single_note() {
        let table = note_table(&[
            ("v1", "2019-01-01 08:00", "2019-01-02 09:00", "a", false),
            ("v1", "2019-01-01 08:00", "2019-01-02 15:00", "a", true),
            ("v1", "2019-01-01 08:00", "2019-01-02 07:00", "a", false),
            ("v1", "2019-01-01 08:00", "2019-01-03 09:00", "a", true),
            ("v2", "2019-01-01 08:00", "2019-01-02 09:00", "a", true),
        ]);
        let notes = normalizer().normalize(&table).unwrap();

        let triples: HashSet<(NaiveDate, &str, &str)> = notes
            .iter()
            .map(|n| (n.note_date, n.author.as_str(), n.visit_id.as_str()))
            .collect();
        assert_eq!(triples.len(), notes.len(), "no duplicate triple may survive");
        assert_eq!(notes.len(), 3);

        let collapsed = notes
            .iter()
            .find(|n| n.visit_id == "v1" && n.note_date == day("2019-01-02"))
            .unwrap();
        assert_eq!(collapsed.note_ts, ts("2019-01-02 07:00"));
        assert!(collapsed.condition);
    }

    #[test]
    fn test_dedup_is_order_independent() {
        let forward = vec![
            test_note("v1", "a", "2019-01-01 08:00", "2019-01-02 09:00"),
            Note {
                condition: false,
                ..test_note("v1", "a", "2019-01-01 08:00", "2019-01-02 06:00")
            },
        ];
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(
            normalizer().normalize_notes(forward),
            normalizer().normalize_notes(backward)
        );
    }

    // --- Sorting & labelling ---

    #[test]
    fn test_sorted_by_admission() {
        let notes = normalizer().normalize_notes(vec![
            test_note("v3", "a", "2019-03-01 08:00", "2019-03-01 09:00"),
            test_note("v1", "a", "2019-01-01 08:00", "2019-01-01 09:00"),
            test_note("v2", "a", "2019-02-01 08:00", "2019-02-01 09:00"),
        ]);
        let visits: Vec<&str> = notes.iter().map(|n| n.visit_id.as_str()).collect();
        assert_eq!(visits, vec!["v1", "v2", "v3"]);
    }

    #[test]
    fn test_in_team_uses_raw_timestamps() {
        let notes = normalizer().normalize_notes(vec![
            test_note("v1", "a", "2019-01-01 08:00", "2019-01-03 08:00"),
            test_note("v1", "b", "2019-01-01 08:00", "2019-01-03 09:00"),
        ]);
        let a = notes.iter().find(|n| n.author == "a").unwrap();
        let b = notes.iter().find(|n| n.author == "b").unwrap();
        assert!(a.in_team);
        assert!(!b.in_team);
    }
}

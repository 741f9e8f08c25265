//! Note data models.
//!
//! ## Input types
//! - [`ColumnMapping`] — which table column carries each of the five semantic fields
//! - [`Note`] — one parsed clinical note
//!
//! ## Output types
//! - [`NormalizedNote`] — a note with calendar-day dates and the in-team label

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{CorpusError, Result};

// ============================================================================
// Column mapping
// ============================================================================

/// Binds the five semantic note fields to column names of the input table.
///
/// Defaults to `{id, arrive_date, date, dr, hf}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    /// Visit (encounter) identifier
    pub visit_id: String,
    /// Admission timestamp of the visit
    pub admission_date: String,
    /// Timestamp the note was written
    pub note_date: String,
    /// Note author (provider) identifier
    pub note_author: String,
    /// Boolean flag: the note relates to the studied condition (e.g. heart failure)
    pub team_condition: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            visit_id: "id".into(),
            admission_date: "arrive_date".into(),
            note_date: "date".into(),
            note_author: "dr".into(),
            team_condition: "hf".into(),
        }
    }
}

impl ColumnMapping {
    /// `(role, column name)` pairs in a fixed order.
    pub fn bindings(&self) -> [(&'static str, &str); 5] {
        [
            ("visit_id", self.visit_id.as_str()),
            ("admission_date", self.admission_date.as_str()),
            ("note_date", self.note_date.as_str()),
            ("note_author", self.note_author.as_str()),
            ("team_condition", self.team_condition.as_str()),
        ]
    }

    /// Reject empty column names and a column bound to two roles.
    pub fn validate(&self) -> Result<()> {
        let bindings = self.bindings();
        for (i, (role, column)) in bindings.iter().enumerate() {
            if column.trim().is_empty() {
                return Err(CorpusError::InvalidConfig(format!(
                    "column for {} must not be empty",
                    role
                )));
            }
            if let Some((other, _)) = bindings[..i].iter().find(|(_, c)| c == column) {
                return Err(CorpusError::InvalidConfig(format!(
                    "column '{}' is bound to both {} and {}",
                    column, other, role
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Notes
// ============================================================================

/// A single clinical note as read from the input table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub visit_id: String,
    pub admission_ts: NaiveDateTime,
    pub note_ts: NaiveDateTime,
    pub author: String,
    pub condition: bool,
}

/// A note after normalization.
///
/// Dates are truncated to the calendar day; `in_team` is true when the note
/// was written within the team window after admission and carries the
/// condition flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedNote {
    pub visit_id: String,
    pub author: String,
    pub admission_ts: NaiveDateTime,
    pub note_ts: NaiveDateTime,
    pub admission_date: NaiveDate,
    pub note_date: NaiveDate,
    pub condition: bool,
    pub in_team: bool,
}

impl NormalizedNote {
    /// Label a parsed note against the team window.
    pub fn from_note(note: Note, team_window: Duration) -> Self {
        let in_team = note.note_ts - note.admission_ts <= team_window && note.condition;
        Self {
            admission_date: note.admission_ts.date(),
            note_date: note.note_ts.date(),
            in_team,
            visit_id: note.visit_id,
            author: note.author,
            admission_ts: note.admission_ts,
            note_ts: note.note_ts,
            condition: note.condition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::ts;

    #[test]
    fn test_column_mapping_defaults() {
        let columns = ColumnMapping::default();
        assert_eq!(columns.visit_id, "id");
        assert_eq!(columns.admission_date, "arrive_date");
        assert_eq!(columns.note_date, "date");
        assert_eq!(columns.note_author, "dr");
        assert_eq!(columns.team_condition, "hf");
        assert!(columns.validate().is_ok());
    }

    #[test]
    fn test_column_mapping_rejects_duplicate_binding() {
        let columns = ColumnMapping {
            note_date: "arrive_date".into(),
            ..Default::default()
        };
        let err = columns.validate().unwrap_err();
        assert!(err.to_string().contains("admission_date"));
        assert!(err.to_string().contains("note_date"));
    }

    #[test]
    fn test_column_mapping_rejects_empty_name() {
        let columns = ColumnMapping {
            note_author: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            columns.validate(),
            Err(CorpusError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_in_team_requires_window_and_condition() {
        let window = Duration::days(2);
        let note = |note_ts: &str, condition: bool| Note {
            visit_id: "v1".into(),
            admission_ts: ts("2019-03-01 08:00"),
            note_ts: ts(note_ts),
            author: "Meyer, Margie".into(),
            condition,
        };

        assert!(NormalizedNote::from_note(note("2019-03-03 08:00", true), window).in_team);
        assert!(!NormalizedNote::from_note(note("2019-03-03 08:01", true), window).in_team);
        assert!(!NormalizedNote::from_note(note("2019-03-01 09:00", false), window).in_team);
    }

    #[test]
    fn test_normalized_dates_drop_time() {
        let note = Note {
            visit_id: "v1".into(),
            admission_ts: ts("2019-03-01 23:59"),
            note_ts: ts("2019-03-02 00:30"),
            author: "a".into(),
            condition: true,
        };
        let normalized = NormalizedNote::from_note(note, Duration::days(2));
        assert_eq!(
            normalized.admission_date,
            NaiveDate::from_ymd_opt(2019, 3, 1).unwrap()
        );
        assert_eq!(
            normalized.note_date,
            NaiveDate::from_ymd_opt(2019, 3, 2).unwrap()
        );
    }
}

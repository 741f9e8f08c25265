//! Test helper factories
//!
//! Convenience builders for timestamps, notes and note tables with the
//! default column bindings.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};

use crate::notes::{Note, NoteTable};

/// Parse `YYYY-MM-DD HH:MM` (or a bare `YYYY-MM-DD`, read as midnight).
pub fn ts(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M").unwrap_or_else(|_| {
        day(value)
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
    })
}

/// Parse `YYYY-MM-DD`.
pub fn day(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("fixture date")
}

/// Create a note with sensible defaults for the non-essential fields.
pub fn test_note(visit_id: &str, author: &str, admission: &str, written: &str) -> Note {
    Note {
        visit_id: visit_id.to_string(),
        admission_ts: ts(admission),
        note_ts: ts(written),
        author: author.to_string(),
        condition: true,
    }
}

/// One fixture row: `(visit, admission, note date, author, condition)`.
pub type NoteRow<'a> = (&'a str, &'a str, &'a str, &'a str, bool);

/// Build a note table with the default `{id, arrive_date, date, dr, hf}` headers.
pub fn note_table(rows: &[NoteRow<'_>]) -> NoteTable {
    let mut table = NoteTable::from_rows(&["id", "arrive_date", "date", "dr", "hf"], &[]);
    for (visit, admission, written, author, condition) in rows {
        table.push_row(vec![
            visit.to_string(),
            admission.to_string(),
            written.to_string(),
            author.to_string(),
            if *condition { "1" } else { "0" }.to_string(),
        ]);
    }
    table
}

/// Notes for one visit where every author writes once on the given day.
pub fn same_day_rows<'a>(
    visit: &'a str,
    admission: &'a str,
    written: &'a str,
    authors: &[&'a str],
) -> Vec<NoteRow<'a>> {
    authors
        .iter()
        .map(|author| (visit, admission, written, *author, true))
        .collect()
}

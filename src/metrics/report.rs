//! Metric row export.

use std::collections::BTreeSet;
use std::io::Write;

use super::models::{MetricsRow, METRIC_COLUMNS};
use crate::error::Result;

/// Sorted union of the department column names across `rows`.
pub fn department_columns(rows: &[MetricsRow]) -> Vec<String> {
    rows.iter()
        .flat_map(|r| r.department.keys().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Write rows as CSV: the fixed metric columns, then the department columns.
/// Department fields a row lacks are left empty.
pub fn write_csv<W: Write>(rows: &[MetricsRow], writer: W) -> Result<()> {
    let extra = department_columns(rows);
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(METRIC_COLUMNS.iter().copied().chain(extra.iter().map(String::as_str)))?;
    for row in rows {
        let mut record = row.metrics.values();
        record.extend(
            extra
                .iter()
                .map(|c| row.department.get(c).cloned().unwrap_or_default()),
        );
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write rows as a pretty-printed JSON array.
pub fn write_json<W: Write>(rows: &[MetricsRow], mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

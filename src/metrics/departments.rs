//! Per-visit department / outcome records merged into the exported rows.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::models::METRIC_COLUMNS;
use crate::error::{CorpusError, Result};

/// Extra columns of one visit, by column name.
pub type DepartmentRecord = BTreeMap<String, String>;

/// Visit id → department record.
pub trait DepartmentLookup: Send + Sync {
    fn department(&self, visit_id: &str) -> Option<&DepartmentRecord>;

    /// Column names every record may carry, sorted.
    fn columns(&self) -> Vec<String>;
}

fn rename_metric_collisions(visit_id: &str, record: DepartmentRecord) -> DepartmentRecord {
    let (shadowing, mut kept): (DepartmentRecord, DepartmentRecord) = record
        .into_iter()
        .partition(|(column, _)| METRIC_COLUMNS.contains(&column.as_str()));

    for (column, value) in shadowing {
        match kept.entry(format!("department_{}", column)) {
            Entry::Vacant(slot) => {
                tracing::debug!("Department column {} renamed to {}", column, slot.key());
                slot.insert(value);
            }
            Entry::Occupied(slot) => {
                tracing::warn!(
                    "Dropping department column {} for visit {}: {} already present",
                    column,
                    visit_id,
                    slot.key()
                );
            }
        }
    }
    kept
}

/// In-memory [`DepartmentLookup`].
#[derive(Debug, Clone, Default)]
pub struct DepartmentTable {
    columns: Vec<String>,
    records: HashMap<String, DepartmentRecord>,
}

impl DepartmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a visit's record. Columns named like a metric are renamed to
    /// `department_<name>` so exported rows keep unique keys.
    pub fn insert(&mut self, visit_id: &str, record: DepartmentRecord) {
        let record = rename_metric_collisions(visit_id, record);
        for column in record.keys() {
            if let Err(pos) = self.columns.binary_search(column) {
                self.columns.insert(pos, column.clone());
            }
        }
        self.records.insert(visit_id.to_string(), record);
    }

    /// Read a CSV keyed by `id_column`. Every other column is carried as a string.
    pub fn from_reader<R: Read>(reader: R, id_column: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();
        let id_idx = headers
            .iter()
            .position(|h| h == id_column)
            .ok_or_else(|| CorpusError::MissingColumn {
                column: id_column.to_string(),
                role: "department id",
            })?;

        let mut table = Self::new();
        for record in rdr.records() {
            let record = record?;
            let Some(visit_id) = record.get(id_idx).filter(|v| !v.is_empty()) else {
                continue;
            };
            let fields: DepartmentRecord = headers
                .iter()
                .zip(record.iter())
                .enumerate()
                .filter(|(i, _)| *i != id_idx)
                .map(|(_, (h, v))| (h.to_string(), v.to_string()))
                .collect();
            table.insert(visit_id, fields);
        }
        Ok(table)
    }

    pub fn from_path(path: &Path, id_column: &str) -> Result<Self> {
        let table = Self::from_reader(File::open(path)?, id_column)?;
        tracing::info!(
            "Loaded department records for {} visits from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl DepartmentLookup for DepartmentTable {
    fn department(&self, visit_id: &str) -> Option<&DepartmentRecord> {
        self.records.get(visit_id)
    }

    fn columns(&self) -> Vec<String> {
        self.columns.clone()
    }
}

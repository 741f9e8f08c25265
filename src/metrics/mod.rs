//! Per-visit team metrics.
//!
//! - [`calculator`] — `MetricsCalculator`: clustering, cumulative experience, gender composition
//! - [`demographics`] — `DemographicLookup` / `DemographicTable`, `Sex`
//! - [`gender`] — first-name extraction and `GenderGuesser`
//! - [`departments`] — `DepartmentLookup` / `DepartmentTable`
//! - [`models`] — `VisitMetrics`, `MetricsRow`
//! - [`report`] — CSV / JSON export

pub mod calculator;
pub mod demographics;
pub mod departments;
pub mod gender;
pub mod models;
pub mod report;

pub use calculator::MetricsCalculator;
pub use demographics::{DemographicLookup, DemographicTable, ProviderDemographics, Sex};
pub use departments::{DepartmentLookup, DepartmentRecord, DepartmentTable};
pub use gender::{extract_first_name, guess_sex, label_to_sex, FirstNameTable, GenderGuesser};
pub use models::{GenderComposition, MetricsRow, VisitMetrics, METRIC_COLUMNS};
pub use report::{department_columns, write_csv, write_json};

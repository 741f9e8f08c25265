//! Provider demographics.
//!
//! A [`DemographicLookup`] resolves an author id to recorded sex, clinician
//! title and a guessed sex. [`DemographicTable`] is the in-memory
//! implementation, loadable from a CSV with the columns
//! `author_prov_id, prov_name, sex, clinician_title`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::gender::{guess_sex, GenderGuesser};
use crate::error::Result;

/// Recorded or guessed sex of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[default]
    #[serde(rename = "U")]
    Unknown,
}

impl Sex {
    /// Read a recorded value. Values starting with `M` or `F` are kept;
    /// anything else (including missing) is unknown.
    pub fn from_recorded(value: Option<&str>) -> Self {
        match value.map(str::trim).and_then(|v| v.chars().next()) {
            Some('M') | Some('m') => Self::Male,
            Some('F') | Some('f') => Self::Female,
            _ => Self::Unknown,
        }
    }

    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Unknown => "U",
        }
    }
}

impl std::fmt::Display for Sex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Demographic facts about one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDemographics {
    pub author_id: String,
    pub name: String,
    /// Sex as recorded in the source table (`U` when missing or invalid)
    pub sex: Sex,
    pub clinician_title: String,
    /// Recorded sex when valid, otherwise the first-name guess
    pub guessed_sex: Sex,
}

/// Author id → demographics.
pub trait DemographicLookup: Send + Sync {
    fn lookup(&self, author_id: &str) -> Option<&ProviderDemographics>;
}

/// CSV row of the demographics file.
#[derive(Debug, Deserialize)]
struct DemographicRecord {
    author_prov_id: Option<String>,
    prov_name: Option<String>,
    sex: Option<String>,
    clinician_title: Option<String>,
}

/// In-memory [`DemographicLookup`].
#[derive(Debug, Clone, Default)]
pub struct DemographicTable {
    providers: HashMap<String, ProviderDemographics>,
}

impl DemographicTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a provider, guessing the sex from the name when the recorded
    /// value is not M/F. Fails if the name has no extractable token in that case.
    pub fn insert(
        &mut self,
        author_id: &str,
        name: &str,
        recorded_sex: Option<&str>,
        clinician_title: Option<&str>,
        guesser: &dyn GenderGuesser,
    ) -> Result<()> {
        let sex = Sex::from_recorded(recorded_sex);
        let guessed_sex = if sex.is_known() {
            sex
        } else {
            guess_sex(name, guesser)?
        };
        let title = clinician_title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("UNKNOWN");

        self.providers.insert(
            author_id.to_string(),
            ProviderDemographics {
                author_id: author_id.to_string(),
                name: name.to_string(),
                sex,
                clinician_title: title.to_string(),
                guessed_sex,
            },
        );
        Ok(())
    }

    /// Load from CSV. Rows without an id or a name are skipped.
    pub fn from_reader<R: Read>(reader: R, guesser: &dyn GenderGuesser) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = Self::new();
        let mut skipped = 0usize;

        for record in rdr.deserialize() {
            let record: DemographicRecord = record?;
            let (Some(id), Some(name)) = (
                record.author_prov_id.filter(|s| !s.is_empty()),
                record.prov_name.filter(|s| !s.is_empty()),
            ) else {
                skipped += 1;
                continue;
            };
            table.insert(
                &id,
                &name,
                record.sex.as_deref(),
                record.clinician_title.as_deref(),
                guesser,
            )?;
        }

        if skipped > 0 {
            tracing::debug!("Skipped {} demographic rows without id or name", skipped);
        }
        Ok(table)
    }

    pub fn from_path(path: &Path, guesser: &dyn GenderGuesser) -> Result<Self> {
        let table = Self::from_reader(File::open(path)?, guesser)?;
        tracing::info!(
            "Loaded demographics for {} providers from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl DemographicLookup for DemographicTable {
    fn lookup(&self, author_id: &str) -> Option<&ProviderDemographics> {
        self.providers.get(author_id)
    }
}

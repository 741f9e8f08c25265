//! First-name gender guessing.
//!
//! Used only when a provider's recorded sex is missing or invalid. The first
//! name is the word after `", "` in "Last, First" names, otherwise the first
//! word. A [`GenderGuesser`] maps it to a label; labels containing `female`
//! read as F, otherwise labels containing `male` read as M, anything else U.

use regex::Regex;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use super::demographics::Sex;
use crate::error::{CorpusError, Result};

static AFTER_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s(\w+)").expect("valid first-name pattern"));
static FIRST_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+").expect("valid word pattern"));

/// Extract the first-name token of a provider name.
pub fn extract_first_name(name: &str) -> Result<&str> {
    if let Some(m) = AFTER_COMMA.captures(name).and_then(|c| c.get(1)) {
        return Ok(m.as_str());
    }
    FIRST_WORD
        .find(name)
        .map(|m| m.as_str())
        .ok_or_else(|| CorpusError::NameParse(name.to_string()))
}

/// Map a guesser label (`male`, `mostly_female`, `andy`, `unknown`, ...) to a sex.
pub fn label_to_sex(label: &str) -> Sex {
    let label = label.to_ascii_lowercase();
    if label.contains("female") {
        Sex::Female
    } else if label.contains("male") {
        Sex::Male
    } else {
        Sex::Unknown
    }
}

/// Maps a first name to a sex.
pub trait GenderGuesser: Send + Sync {
    fn guess(&self, first_name: &str) -> Sex;
}

/// Guess the sex of a full provider name.
pub fn guess_sex(name: &str, guesser: &dyn GenderGuesser) -> Result<Sex> {
    let first = extract_first_name(name)?;
    Ok(guesser.guess(first))
}

/// Case-insensitive first-name → label dictionary.
#[derive(Debug, Clone, Default)]
pub struct FirstNameTable {
    labels: HashMap<String, String>,
}

impl FirstNameTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, first_name: &str, label: &str) {
        self.labels
            .insert(first_name.trim().to_lowercase(), label.trim().to_string());
    }

    /// Read a `name,gender` table (header row required).
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut table = Self::new();
        for record in rdr.records() {
            let record = record?;
            match (record.get(0), record.get(1)) {
                (Some(name), Some(label)) if !name.is_empty() => table.insert(name, label),
                _ => continue,
            }
        }
        Ok(table)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let table = Self::from_reader(File::open(path)?)?;
        tracing::info!(
            "Loaded {} first names from {}",
            table.len(),
            path.display()
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl GenderGuesser for FirstNameTable {
    fn guess(&self, first_name: &str) -> Sex {
        self.labels
            .get(&first_name.to_lowercase())
            .map(|label| label_to_sex(label))
            .unwrap_or(Sex::Unknown)
    }
}

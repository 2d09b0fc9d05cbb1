use std::collections::BTreeSet;
use std::fmt;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use super::repository::BlacklistRepository;
use super::service::AdmissionError;

/// Exact-match deny-list check on the applicant's personal id.
pub struct BlacklistGate<B> {
    blacklist: Arc<B>,
}

impl<B> BlacklistGate<B>
where
    B: BlacklistRepository + 'static,
{
    pub fn new(blacklist: Arc<B>) -> Self {
        Self { blacklist }
    }

    pub fn check(&self, personal_id: &str) -> Result<(), AdmissionError> {
        match self.blacklist.find_blacklist_entry(personal_id)? {
            Some(entry) => Err(AdmissionError::Blacklisted {
                personal_id: entry.personal_id,
            }),
            None => Ok(()),
        }
    }
}

#[derive(Debug)]
pub enum BlacklistImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl fmt::Display for BlacklistImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlacklistImportError::Io(err) => write!(f, "failed to read blacklist file: {}", err),
            BlacklistImportError::Csv(err) => write!(f, "invalid blacklist CSV data: {}", err),
        }
    }
}

impl std::error::Error for BlacklistImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlacklistImportError::Io(err) => Some(err),
            BlacklistImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for BlacklistImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for BlacklistImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct BlacklistRow {
    personal_id: String,
}

/// Reads a `personal_id` column; blank rows are skipped and duplicates collapse.
pub fn load_blacklist_csv<R: Read>(reader: R) -> Result<BTreeSet<String>, BlacklistImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut personal_ids = BTreeSet::new();

    for record in csv_reader.deserialize::<BlacklistRow>() {
        let row = record?;
        if !row.personal_id.is_empty() {
            personal_ids.insert(row.personal_id);
        }
    }

    Ok(personal_ids)
}

pub fn load_blacklist_file<P: AsRef<Path>>(
    path: P,
) -> Result<BTreeSet<String>, BlacklistImportError> {
    let file = std::fs::File::open(path)?;
    load_blacklist_csv(file)
}

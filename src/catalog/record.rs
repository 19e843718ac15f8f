use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::parse::{self, ParsedMetadata};

/// One downloadable file from a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Decoded display name, for example `Zelda (Spain).zip`.
    pub name: String,
    /// Absolute download URL.
    pub url: String,
    /// Size in bytes, zero when the listing did not report one.
    #[serde(default)]
    pub size: u64,
}

impl FileRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, url: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            size,
        }
    }

    /// Parse the metadata encoded in the file name.
    #[must_use]
    pub fn metadata(&self) -> ParsedMetadata {
        parse::parse(&self.name)
    }

    /// Title used for grouping regional releases of the same game.
    #[must_use]
    pub fn base_title(&self) -> String {
        parse::base_title(&self.name)
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Sum of the listed sizes.
#[must_use]
pub fn total_size(records: &[FileRecord]) -> u64 {
    records.iter().map(|record| record.size).sum()
}

/// Keep records whose name contains `query`, ignoring case.
///
/// An empty query keeps everything.
#[must_use]
pub fn filter_by_title(records: &[FileRecord], query: &str) -> Vec<FileRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return records.to_vec();
    }
    records
        .iter()
        .filter(|record| record.name.to_lowercase().contains(&query))
        .cloned()
        .collect()
}

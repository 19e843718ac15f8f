//! Match candidate downloads against archives and extracted directories already on disk.
//!
//! Matching compares every candidate with every library item, so a run is
//! O(candidates × items). Keyword sets are computed once per name and compared
//! with hashed set intersections.

use std::collections::{BTreeSet, HashSet};

use crate::catalog::events::{CatalogEvent, EventSink};
use crate::catalog::keywords::{extract_keywords, is_numeric_token, number_tokens, number_value};
use crate::catalog::parse::{disc_number, strip_extension};
use crate::catalog::patterns::{ARCHIVE_EXTENSION_TOKENS, MIN_SIMILARITY_SCORE, is_sport_keyword};
use crate::catalog::record::FileRecord;
use crate::safe_file_name;

/// How a candidate relates to the local library.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchClassification {
    New,
    ExactMatch {
        existing: String,
    },
    Similar {
        existing: String,
        matching_keywords: BTreeSet<String>,
        score: f64,
    },
}

/// Keyword data of one title used by the similarity guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleProfile {
    keywords: HashSet<String>,
    numbers: HashSet<String>,
    sports: HashSet<String>,
    disc: Option<u32>,
}

impl TitleProfile {
    #[must_use]
    pub fn new(name: &str) -> Self {
        // Roman numerals are stored as their decimal value so "VII" and "7" compare equal
        let keywords: HashSet<String> = extract_keywords(name)
            .into_iter()
            .filter(|word| !ARCHIVE_EXTENSION_TOKENS.contains(&word.as_str()))
            .map(|word| number_value(&word).unwrap_or(word))
            .collect();
        let numbers = number_tokens(&keywords);
        let sports = keywords.iter().filter(|word| is_sport_keyword(word)).cloned().collect();
        Self {
            keywords,
            numbers,
            sports,
            disc: disc_number(name),
        }
    }

    #[must_use]
    pub const fn keywords(&self) -> &HashSet<String> {
        &self.keywords
    }

    /// Number of keywords that are not numbers or roman numerals.
    fn word_count(&self) -> usize {
        self.keywords.iter().filter(|word| number_value(word).is_none()).count()
    }

    /// Compare two titles and return the shared keywords and score when they pass every guard.
    #[must_use]
    pub fn similarity(&self, other: &Self) -> Option<(BTreeSet<String>, f64)> {
        // Different discs of the same game
        if let (Some(a), Some(b)) = (self.disc, other.disc)
            && a != b
        {
            return None;
        }

        // Different entries of a numbered series
        if !self.numbers.is_empty() && !other.numbers.is_empty() && self.numbers != other.numbers {
            return None;
        }

        // A sequel number on only one side of a long title
        if self.numbers.is_empty() != other.numbers.is_empty() && (self.word_count() > 2 || other.word_count() > 2) {
            return None;
        }

        if !self.sports.is_empty() && !other.sports.is_empty() && self.sports != other.sports {
            return None;
        }

        let common: BTreeSet<String> = self.keywords.intersection(&other.keywords).cloned().collect();
        let shared = common.len();
        let specific = common
            .iter()
            .filter(|word| word.chars().count() > 4 || is_numeric_token(word))
            .count();
        let smaller = self.keywords.len().min(other.keywords.len());
        let short_titles_fully_shared = self.keywords.len() <= 3 && other.keywords.len() <= 3 && shared == smaller;
        if shared < 3 && !(shared >= 2 && (specific >= 2 || short_titles_fully_shared)) {
            return None;
        }

        let largest = self.keywords.len().max(other.keywords.len());
        let score = shared as f64 / largest as f64;
        if score < MIN_SIMILARITY_SCORE {
            return None;
        }
        Some((common, score))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryItem {
    pub name: String,
    profile: TitleProfile,
}

/// Precomputed keyword data for the local library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibraryIndex {
    items: Vec<LibraryItem>,
    archive_names: HashSet<String>,
    directory_names: HashSet<String>,
}

impl LibraryIndex {
    #[must_use]
    pub fn new(archive_names: &[String], directory_names: &[String]) -> Self {
        let items = archive_names
            .iter()
            .chain(directory_names)
            .map(|name| LibraryItem {
                name: name.clone(),
                profile: TitleProfile::new(name),
            })
            .collect();

        Self {
            items,
            archive_names: archive_names.iter().cloned().collect(),
            directory_names: directory_names.iter().cloned().collect(),
        }
    }

    #[must_use]
    pub fn items(&self) -> &[LibraryItem] {
        &self.items
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Classify one candidate against the library.
    #[must_use]
    pub fn classify(&self, candidate: &FileRecord) -> MatchClassification {
        let safe_name = safe_file_name(&candidate.name);
        if self.archive_names.contains(&safe_name) {
            return MatchClassification::ExactMatch { existing: safe_name };
        }
        let stem = strip_extension(&safe_name);
        if self.directory_names.contains(stem) {
            return MatchClassification::ExactMatch {
                existing: stem.to_string(),
            };
        }

        let profile = TitleProfile::new(&candidate.name);
        let mut best: Option<(&LibraryItem, BTreeSet<String>, f64)> = None;
        for item in &self.items {
            if let Some((matching_keywords, score)) = profile.similarity(&item.profile)
                && best.as_ref().is_none_or(|(_, _, best_score)| score > *best_score)
            {
                best = Some((item, matching_keywords, score));
            }
        }

        best.map_or(MatchClassification::New, |(item, matching_keywords, score)| {
            MatchClassification::Similar {
                existing: item.name.clone(),
                matching_keywords,
                score,
            }
        })
    }

    /// Classify every candidate, reporting exact and similar matches to the sink.
    #[must_use]
    pub fn classify_all(&self, candidates: &[FileRecord], sink: &dyn EventSink) -> LibraryReport {
        let mut report = LibraryReport::default();
        for record in candidates {
            let classification = self.classify(record);
            if classification != MatchClassification::New {
                sink.emit(&CatalogEvent::LibraryMatch {
                    record,
                    classification: &classification,
                });
            }
            match classification {
                MatchClassification::New => report.new.push(record.clone()),
                MatchClassification::ExactMatch { existing } => report.exact.push((record.clone(), existing)),
                MatchClassification::Similar {
                    existing,
                    matching_keywords,
                    score,
                } => report.similar.push(SimilarMatch {
                    record: record.clone(),
                    existing,
                    matching_keywords,
                    score,
                }),
            }
        }
        report
    }
}

/// A candidate judged to be the same release as a library item.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarMatch {
    pub record: FileRecord,
    pub existing: String,
    pub matching_keywords: BTreeSet<String>,
    pub score: f64,
}

/// Candidates split by their library classification, each list in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LibraryReport {
    pub new: Vec<FileRecord>,
    pub exact: Vec<(FileRecord, String)>,
    pub similar: Vec<SimilarMatch>,
}

impl LibraryReport {
    /// Candidates to download in their original order: new ones, plus similar ones when requested.
    #[must_use]
    pub fn downloads(&self, candidates: &[FileRecord], include_similar: bool) -> Vec<FileRecord> {
        let mut wanted: HashSet<&str> = self.new.iter().map(|record| record.name.as_str()).collect();
        if include_similar {
            wanted.extend(self.similar.iter().map(|similar| similar.record.name.as_str()));
        }
        candidates
            .iter()
            .filter(|record| wanted.contains(record.name.as_str()))
            .cloned()
            .collect()
    }
}

/// Classify candidates against on-disk archive and directory names.
#[must_use]
pub fn classify_candidates(
    candidates: &[FileRecord],
    archive_names: &[String],
    directory_names: &[String],
    sink: &dyn EventSink,
) -> LibraryReport {
    LibraryIndex::new(archive_names, directory_names).classify_all(candidates, sink)
}

//! Title grouping and best-pick selection.

use std::collections::HashMap;
use std::fmt;

use crate::catalog::events::{CatalogEvent, EventSink};
use crate::catalog::parse::{ParsedMetadata, Region, parse};
use crate::catalog::policy::{Classification, InvalidReason, PriorityPolicy};
use crate::catalog::record::{FileRecord, total_size};

/// A valid record with its parsed metadata and policy rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub record: FileRecord,
    pub metadata: ParsedMetadata,
    pub rank: u32,
}

/// Regional releases of one title, in input order.
///
/// Discs of a multi-disc game form separate groups so every disc can be selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleGroup {
    pub base_title: String,
    pub disc_number: Option<u32>,
    pub entries: Vec<RankedEntry>,
}

/// Why a valid record lost to another release of the same title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// A better ranked release was selected.
    Superseded { by: String, region: Region },
    /// A home-country release beats every Europe release.
    CountryRelease { by: String, country: String },
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Superseded {
                by,
                region: Region::Known(region),
            } => write!(f, "lower priority, superseded by {region}: {by}"),
            Self::Superseded {
                by,
                region: Region::Unknown,
            } => write!(f, "lower priority, superseded by {by}"),
            Self::CountryRelease { by, country } => {
                write!(f, "superseded by {country} release over Europe: {by}")
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionResult {
    pub selected: Vec<FileRecord>,
    pub discarded: Vec<(FileRecord, DiscardReason)>,
    pub invalid: Vec<(FileRecord, InvalidReason)>,
}

impl SelectionResult {
    #[must_use]
    pub fn selected_size(&self) -> u64 {
        total_size(&self.selected)
    }

    #[must_use]
    pub fn total_records(&self) -> usize {
        self.selected.len() + self.discarded.len() + self.invalid.len()
    }
}

/// Classify every record, group the valid ones by title and pick the best of each group.
#[must_use]
pub fn select(records: &[FileRecord], policy: &PriorityPolicy, sink: &dyn EventSink) -> SelectionResult {
    let mut result = SelectionResult::default();
    let mut valid = Vec::new();

    for record in records {
        let metadata = parse(&record.name);
        match policy.classify_parsed(&record.name, &metadata) {
            Classification::Valid { rank, .. } => valid.push(RankedEntry {
                record: record.clone(),
                metadata,
                rank,
            }),
            Classification::Invalid(reason) => {
                sink.emit(&CatalogEvent::Rejected {
                    record,
                    reason: &reason,
                });
                result.invalid.push((record.clone(), reason));
            }
        }
    }

    for group in group_by_title(valid) {
        pick_best(group, policy.home_country(), &mut result, sink);
    }

    result
}

/// Group entries by base title and disc number, keeping first-seen order.
#[must_use]
pub fn group_by_title(entries: Vec<RankedEntry>) -> Vec<TitleGroup> {
    let mut groups: Vec<TitleGroup> = Vec::new();
    let mut index: HashMap<(String, Option<u32>), usize> = HashMap::new();

    for entry in entries {
        let key = (entry.metadata.base_title.clone(), entry.metadata.disc_number);
        if let Some(&position) = index.get(&key) {
            groups[position].entries.push(entry);
        } else {
            index.insert(key, groups.len());
            groups.push(TitleGroup {
                base_title: entry.metadata.base_title.clone(),
                disc_number: entry.metadata.disc_number,
                entries: vec![entry],
            });
        }
    }

    groups
}

fn pick_best(group: TitleGroup, home_country: Option<&str>, result: &mut SelectionResult, sink: &dyn EventSink) {
    let mut entries = group.entries;

    if let Some(home) = home_country
        && let Some(home_release) = entries
            .iter()
            .find(|entry| has_region_tag(entry, home))
            .map(|entry| entry.record.name.clone())
    {
        let (europe, rest): (Vec<_>, Vec<_>) = entries
            .into_iter()
            .partition(|entry| has_region_tag(entry, "Europe") && !has_region_tag(entry, home));
        for entry in europe {
            discard(
                entry.record,
                DiscardReason::CountryRelease {
                    by: home_release.clone(),
                    country: home.to_string(),
                },
                result,
                sink,
            );
        }
        entries = rest;
    }

    entries.sort_by_key(|entry| entry.rank);
    let mut entries = entries.into_iter();
    let Some(best) = entries.next() else {
        return;
    };
    for entry in entries {
        discard(
            entry.record,
            DiscardReason::Superseded {
                by: best.record.name.clone(),
                region: best.metadata.region.clone(),
            },
            result,
            sink,
        );
    }
    result.selected.push(best.record);
}

fn has_region_tag(entry: &RankedEntry, region: &str) -> bool {
    entry.metadata.region_tags.iter().any(|tag| tag == region)
}

fn discard(record: FileRecord, reason: DiscardReason, result: &mut SelectionResult, sink: &dyn EventSink) {
    sink.emit(&CatalogEvent::Superseded {
        record: &record,
        reason: &reason,
    });
    result.discarded.push((record, reason));
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    use crate::catalog::policy::Preset;

    fn records(names: &[&str]) -> Vec<FileRecord> {
        names
            .iter()
            .map(|name| FileRecord::new(*name, format!("https://example.com/{name}"), 100))
            .collect()
    }

    fn names(records: &[FileRecord]) -> Vec<&str> {
        records.iter().map(|record| record.name.as_str()).collect()
    }

    #[test]
    fn spain_beats_europe_and_japan() {
        let input = records(&[
            "Zelda (Spain).zip",
            "Zelda (Europe)(En,Fr,De,Es,It).zip",
            "Zelda (Japan).zip",
        ]);
        let result = select(&input, &PriorityPolicy::preset(Preset::Spanish), &());
        assert_eq!(names(&result.selected), vec!["Zelda (Spain).zip"]);
        assert_eq!(result.discarded.len(), 2);
        for (_, reason) in &result.discarded {
            assert!(reason.to_string().contains("superseded by Spain"), "{reason}");
        }
    }

    #[test]
    fn spain_beats_europe_regardless_of_order() {
        let input = records(&["Zelda (Europe) (En,Es).zip", "Zelda (Spain).zip"]);
        let result = select(&input, &PriorityPolicy::preset(Preset::Spanish), &());
        assert_eq!(names(&result.selected), vec!["Zelda (Spain).zip"]);
        assert!(matches!(
            result.discarded[0].1,
            DiscardReason::CountryRelease { ref country, .. } if country == "Spain"
        ));
    }

    #[test]
    fn europe_selected_without_spain_release() {
        let input = records(&["Zelda (Japan).zip", "Zelda (Europe) (En,Es).zip"]);
        let result = select(&input, &PriorityPolicy::preset(Preset::Spanish), &());
        assert_eq!(names(&result.selected), vec!["Zelda (Europe) (En,Es).zip"]);
        assert_eq!(
            result.discarded[0].1.to_string(),
            "lower priority, superseded by Europe: Zelda (Europe) (En,Es).zip"
        );
    }

    #[test]
    fn ties_keep_first_seen() {
        let input = records(&["Tetris (Rev A).zip", "Tetris.zip"]);
        let result = select(&input, &PriorityPolicy::no_filter(), &());
        assert_eq!(names(&result.selected), vec!["Tetris (Rev A).zip"]);
        assert_eq!(
            result.discarded[0].1.to_string(),
            "lower priority, superseded by Tetris (Rev A).zip"
        );
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let input = records(&["B (Spain).zip", "A (Spain).zip", "B (Japan).zip"]);
        let result = select(&input, &PriorityPolicy::preset(Preset::Spanish), &());
        assert_eq!(names(&result.selected), vec!["B (Spain).zip", "A (Spain).zip"]);
    }

    #[test]
    fn every_disc_is_selected() {
        let input = records(&[
            "Final Fantasy VII (Disc 1) (Spain).zip",
            "Final Fantasy VII (Disc 2) (Spain).zip",
            "Final Fantasy VII (Disc 1) (Europe).zip",
        ]);
        let result = select(&input, &PriorityPolicy::preset(Preset::Spanish), &());
        assert_eq!(
            names(&result.selected),
            vec![
                "Final Fantasy VII (Disc 1) (Spain).zip",
                "Final Fantasy VII (Disc 2) (Spain).zip"
            ]
        );
    }

    #[test]
    fn invalid_records_are_reported() {
        let events = RefCell::new(Vec::new());
        let sink = |event: &CatalogEvent<'_>| {
            if let CatalogEvent::Rejected { record, reason } = event {
                events.borrow_mut().push(format!("{}: {reason}", record.name));
            }
        };
        let input = records(&["Puzzle (Europe)(En,Fr,De).zip", "Puzzle (USA).zip", "Puzzle (Spain) (Demo).zip"]);
        let result = select(&input, &PriorityPolicy::preset(Preset::Spanish), &sink);
        assert!(result.selected.is_empty());
        assert_eq!(result.invalid.len(), 3);
        assert_eq!(result.total_records(), 3);
        let events = events.into_inner();
        assert_eq!(events.len(), 3);
        assert!(events[0].contains("Es (Spanish)"));
        assert!(events[2].contains("demo/variant"));
    }

    #[test]
    fn group_by_title_merges_regional_releases() {
        let entries: Vec<RankedEntry> = records(&["Game (Spain).zip", "Game (Europe)(En,Es).zip", "Other (Spain).zip"])
            .into_iter()
            .map(|record| RankedEntry {
                metadata: parse(&record.name),
                record,
                rank: 1,
            })
            .collect();
        let groups = group_by_title(entries);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].base_title, "Game");
        assert_eq!(groups[0].entries.len(), 2);
    }
}

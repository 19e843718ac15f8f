//! Titles released in a single non-priority country.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::catalog::error::PolicyError;
use crate::catalog::events::{CatalogEvent, EventSink, ExclusiveRejection};
use crate::catalog::keywords::{Fingerprint, extract_keywords, is_numeric_token, jaccard, keyword_set};
use crate::catalog::parse::base_title;
use crate::catalog::patterns::{
    DEFAULT_EXCLUSIVE_COUNTRIES, EXCLUSIVE_COUNTRIES, EXCLUSIVE_MERGE_SIMILARITY, NON_EXCLUSIVE_COUNTRIES,
    RE_EXCLUSIVE_COUNTRIES, UTILITY_MARKERS, country_preference,
};
use crate::catalog::record::FileRecord;

/// Exclusive records per country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusiveSet {
    by_country: BTreeMap<String, Vec<FileRecord>>,
}

impl ExclusiveSet {
    #[must_use]
    pub fn get(&self, country: &str) -> &[FileRecord] {
        self.by_country.get(country).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.by_country.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[FileRecord])> {
        self.by_country
            .iter()
            .map(|(country, records)| (country.as_str(), records.as_slice()))
    }

    /// Total number of exclusive records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_country.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_country.is_empty()
    }

    /// All exclusive records, grouped by country in alphabetical order.
    #[must_use]
    pub fn records(&self) -> Vec<FileRecord> {
        self.by_country.values().flatten().cloned().collect()
    }

    #[must_use]
    pub fn into_map(self) -> BTreeMap<String, Vec<FileRecord>> {
        self.by_country
    }
}

/// Countries of the exclusive country table matched by a file name.
///
/// An empty result means the country is unknown.
#[must_use]
pub fn detect_countries(filename: &str) -> Vec<&'static str> {
    RE_EXCLUSIVE_COUNTRIES
        .iter()
        .filter(|(_, regex)| regex.is_match(filename))
        .map(|(country, _)| *country)
        .collect()
}

/// Finds exclusive titles and limits them to an allow-list of countries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusiveDetector {
    /// `None` reports every country.
    allowed_countries: Option<Vec<String>>,
}

impl Default for ExclusiveDetector {
    fn default() -> Self {
        Self {
            allowed_countries: Some(DEFAULT_EXCLUSIVE_COUNTRIES.iter().map(ToString::to_string).collect()),
        }
    }
}

impl ExclusiveDetector {
    /// Build a detector for the given countries.
    ///
    /// An empty list uses the default countries, `all` removes the restriction.
    ///
    /// # Errors
    /// Returns an error for a country missing from the exclusive country table.
    pub fn new(countries: &[String]) -> Result<Self, PolicyError> {
        if countries.is_empty() {
            return Ok(Self::default());
        }
        if countries.iter().any(|country| country.trim().eq_ignore_ascii_case("all")) {
            return Ok(Self::all_countries());
        }
        let mut allowed: Vec<String> = Vec::new();
        for country in countries {
            let name = EXCLUSIVE_COUNTRIES
                .iter()
                .map(|(name, _, _)| *name)
                .find(|name| name.eq_ignore_ascii_case(country.trim()))
                .ok_or_else(|| PolicyError::UnknownCountry(country.trim().to_string()))?;
            if !allowed.iter().any(|c| c == name) {
                allowed.push(name.to_string());
            }
        }
        Ok(Self {
            allowed_countries: Some(allowed),
        })
    }

    #[must_use]
    pub const fn all_countries() -> Self {
        Self {
            allowed_countries: None,
        }
    }

    #[must_use]
    pub fn allowed_countries(&self) -> Option<&[String]> {
        self.allowed_countries.as_deref()
    }

    fn is_allowed(&self, country: &str) -> bool {
        self.allowed_countries
            .as_ref()
            .is_none_or(|allowed| allowed.iter().any(|c| c == country))
    }

    /// Find titles released in exactly one country that are missing from the priority selection.
    #[must_use]
    pub fn detect(&self, all: &[FileRecord], priority: &[FileRecord], sink: &dyn EventSink) -> ExclusiveSet {
        let priority_fingerprints: HashSet<Fingerprint> = priority
            .iter()
            .map(|record| Fingerprint::of(&record.name))
            .filter(|fingerprint| !fingerprint.is_empty())
            .collect();
        let priority_numbers: HashSet<&str> = priority_fingerprints
            .iter()
            .flat_map(Fingerprint::digit_tokens)
            .collect();

        let candidates: Vec<Candidate> = group_countries(all)
            .into_iter()
            .filter_map(TitleCountries::into_candidate)
            .filter(|candidate| match candidate.rejection(&priority_fingerprints, &priority_numbers) {
                Some(rejection) => {
                    sink.emit(&CatalogEvent::ExclusiveRejected {
                        title: &candidate.title,
                        country: candidate.country,
                        rejection,
                    });
                    false
                }
                None => true,
            })
            .collect();

        let mut by_country: BTreeMap<String, Vec<FileRecord>> = BTreeMap::new();
        let mut removed = 0;
        for candidate in keep_preferred_countries(candidates, sink) {
            if self.is_allowed(candidate.country) {
                by_country
                    .entry(candidate.country.to_string())
                    .or_default()
                    .extend(candidate.records);
            } else {
                removed += candidate.records.len();
            }
        }

        if let Some(allowed) = &self.allowed_countries {
            sink.emit(&CatalogEvent::CountriesFiltered { allowed, removed });
        }

        ExclusiveSet { by_country }
    }
}

struct TitleCountries {
    title: String,
    records: Vec<(FileRecord, Vec<&'static str>)>,
}

impl TitleCountries {
    fn into_candidate(self) -> Option<Candidate> {
        let countries: BTreeSet<&'static str> = self
            .records
            .iter()
            .flat_map(|(_, countries)| countries.iter().copied())
            .filter(|country| !NON_EXCLUSIVE_COUNTRIES.contains(country))
            .collect();
        if countries.len() != 1 {
            return None;
        }
        let country = countries.into_iter().next()?;
        let records = self
            .records
            .into_iter()
            .filter(|(_, countries)| countries.contains(&country))
            .map(|(record, _)| record)
            .collect();
        Some(Candidate {
            fingerprint: Fingerprint::of(&self.title),
            title: self.title,
            country,
            records,
        })
    }
}

struct Candidate {
    title: String,
    country: &'static str,
    fingerprint: Fingerprint,
    records: Vec<FileRecord>,
}

impl Candidate {
    fn rejection(
        &self,
        priority_fingerprints: &HashSet<Fingerprint>,
        priority_numbers: &HashSet<&str>,
    ) -> Option<ExclusiveRejection> {
        let lowercase = self.title.to_lowercase();
        if let Some(marker) = UTILITY_MARKERS.iter().copied().find(|marker| lowercase.contains(*marker)) {
            return Some(ExclusiveRejection::UtilityTitle { marker });
        }
        if priority_fingerprints.contains(&self.fingerprint) {
            return Some(ExclusiveRejection::PriorityDuplicate);
        }
        extract_keywords(&self.title)
            .into_iter()
            .filter(|word| is_numeric_token(word))
            .find(|word| priority_numbers.contains(word.as_str()))
            .map(|number| ExclusiveRejection::NumberedSeries { number })
    }
}

/// Group records by base title in first-seen order, tagging each with its countries.
fn group_countries(records: &[FileRecord]) -> Vec<TitleCountries> {
    let mut groups: Vec<TitleCountries> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for record in records {
        let title = base_title(&record.name);
        let countries = detect_countries(&record.name);
        if let Some(&position) = index.get(&title) {
            groups[position].records.push((record.clone(), countries));
        } else {
            index.insert(title.clone(), groups.len());
            groups.push(TitleCountries {
                title,
                records: vec![(record.clone(), countries)],
            });
        }
    }
    groups
}

/// Keep one country per fingerprint, chosen by country preference.
fn keep_preferred_countries(candidates: Vec<Candidate>, sink: &dyn EventSink) -> Vec<Candidate> {
    let mut preferred: HashMap<Fingerprint, (&'static str, String)> = HashMap::new();
    for candidate in candidates.iter().filter(|candidate| !candidate.fingerprint.is_empty()) {
        preferred
            .entry(candidate.fingerprint.clone())
            .and_modify(|(country, title)| {
                if country_preference(candidate.country) < country_preference(*country) {
                    *country = candidate.country;
                    title.clone_from(&candidate.title);
                }
            })
            .or_insert_with(|| (candidate.country, candidate.title.clone()));
    }

    candidates
        .into_iter()
        .filter(|candidate| match preferred.get(&candidate.fingerprint) {
            Some((country, title)) if *country != candidate.country => {
                sink.emit(&CatalogEvent::CrossCountryDuplicate {
                    title: &candidate.title,
                    kept: &format!("{title} ({country})"),
                    dropped: candidate.country,
                });
                false
            }
            _ => true,
        })
        .collect()
}

/// Result of merging chosen exclusives into the selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    /// Added exclusives first, then the selection.
    pub records: Vec<FileRecord>,
    pub added: Vec<FileRecord>,
    /// Skipped exclusive, the similar selected title and their similarity.
    pub skipped: Vec<(FileRecord, String, f64)>,
}

/// Prepend exclusives to the selection unless a selected title is already similar.
#[must_use]
pub fn merge_exclusives(selected: &[FileRecord], chosen: &[FileRecord], sink: &dyn EventSink) -> MergeOutcome {
    let selected_keywords: Vec<(HashSet<String>, &str)> = selected
        .iter()
        .map(|record| (keyword_set(&record.name), record.name.as_str()))
        .collect();

    let mut outcome = MergeOutcome::default();
    for record in chosen {
        let keywords = keyword_set(&record.name);
        let most_similar = selected_keywords
            .iter()
            .map(|(selected, name)| (jaccard(&keywords, selected), *name))
            .max_by(|a, b| a.0.total_cmp(&b.0));

        match most_similar {
            Some((similarity, name)) if similarity >= EXCLUSIVE_MERGE_SIMILARITY => {
                sink.emit(&CatalogEvent::ExclusiveSkipped {
                    record,
                    similar_to: name,
                    similarity,
                });
                outcome.skipped.push((record.clone(), name.to_string(), similarity));
            }
            _ => outcome.added.push(record.clone()),
        }
    }

    outcome.records = outcome.added.iter().chain(selected).cloned().collect();
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;

    fn records(names: &[&str]) -> Vec<FileRecord> {
        names
            .iter()
            .map(|name| FileRecord::new(*name, format!("https://example.com/{name}"), 100))
            .collect()
    }

    fn names(records: &[FileRecord]) -> Vec<&str> {
        records.iter().map(|record| record.name.as_str()).collect()
    }

    fn detector(countries: &[&str]) -> ExclusiveDetector {
        let countries: Vec<String> = countries.iter().map(ToString::to_string).collect();
        ExclusiveDetector::new(&countries).expect("valid countries")
    }

    #[test]
    fn single_country_title_is_exclusive() {
        let all = records(&["Racer (USA).zip"]);
        let exclusives = detector(&["USA"]).detect(&all, &[], &());
        assert_eq!(names(exclusives.get("USA")), vec!["Racer (USA).zip"]);
        assert_eq!(exclusives.len(), 1);
    }

    #[test]
    fn europe_does_not_count_as_a_country() {
        let all = records(&["Ninja (Japan).zip", "Ninja (Europe).zip", "Pirates (Europe).zip"]);
        let exclusives = ExclusiveDetector::all_countries().detect(&all, &[], &());
        assert_eq!(names(exclusives.get("Japan")), vec!["Ninja (Japan).zip"]);
        assert!(exclusives.get("Europe").is_empty());
    }

    #[test]
    fn multi_country_titles_are_not_exclusive() {
        let all = records(&["Ninja (Japan).zip", "Ninja (USA).zip"]);
        assert!(ExclusiveDetector::all_countries().detect(&all, &[], &()).is_empty());
    }

    #[test]
    fn unknown_country_titles_are_not_exclusive() {
        let all = records(&["Ninja.zip", "Captain America (Beta Version).zip"]);
        assert!(ExclusiveDetector::all_countries().detect(&all, &[], &()).is_empty());
    }

    #[test]
    fn every_disc_of_an_exclusive_is_kept() {
        let all = records(&["Saga (Disc 1) (Japan).zip", "Saga (Disc 2) (Japan).zip"]);
        let exclusives = detector(&["Japan"]).detect(&all, &[], &());
        assert_eq!(exclusives.get("Japan").len(), 2);
    }

    #[test]
    fn utility_titles_are_rejected() {
        let rejected = RefCell::new(Vec::new());
        let sink = |event: &CatalogEvent<'_>| {
            if let CatalogEvent::ExclusiveRejected { rejection, .. } = event {
                rejected.borrow_mut().push(rejection.clone());
            }
        };
        let all = records(&["Action Replay Pro (Japan).zip", "Sound Sample Disc (Korea).zip"]);
        let exclusives = ExclusiveDetector::default().detect(&all, &[], &sink);
        assert!(exclusives.is_empty());
        assert_eq!(
            rejected.into_inner(),
            vec![
                ExclusiveRejection::UtilityTitle {
                    marker: "action replay"
                },
                ExclusiveRejection::UtilityTitle { marker: "sample" },
            ]
        );
    }

    #[test]
    fn priority_fingerprints_are_rejected() {
        let all = records(&["Super Puzzle Fighter (Japan).zip", "Dragon Quest (Japan).zip"]);
        let priority = records(&["Super Puzzle Fighter (Spain).zip"]);
        let exclusives = detector(&["Japan"]).detect(&all, &priority, &());
        assert_eq!(names(exclusives.get("Japan")), vec!["Dragon Quest (Japan).zip"]);
    }

    #[test]
    fn shared_numbers_are_rejected_as_numbered_series() {
        let rejected = RefCell::new(Vec::new());
        let sink = |event: &CatalogEvent<'_>| {
            if let CatalogEvent::ExclusiveRejected { rejection, .. } = event {
                rejected.borrow_mut().push(rejection.clone());
            }
        };
        let all = records(&["GoldenEye 007 Special (Japan).zip"]);
        let priority = records(&["GoldenEye 007 (Spain).zip"]);
        let exclusives = detector(&["Japan"]).detect(&all, &priority, &sink);
        assert!(exclusives.is_empty());
        assert_eq!(
            rejected.into_inner(),
            vec![ExclusiveRejection::NumberedSeries {
                number: "007".to_string()
            }]
        );
    }

    #[test]
    fn cross_country_duplicates_keep_preferred_country() {
        let all = records(&[
            "Super Street Racer Turbo Special (Korea).zip",
            "Super Street Racer Turbo Edition (Japan).zip",
        ]);
        let exclusives = ExclusiveDetector::all_countries().detect(&all, &[], &());
        assert_eq!(
            names(exclusives.get("Japan")),
            vec!["Super Street Racer Turbo Edition (Japan).zip"]
        );
        assert!(exclusives.get("Korea").is_empty());
    }

    #[test]
    fn allow_list_filters_countries() {
        let all = records(&["Ninja (Japan).zip", "Racer (USA).zip", "Chef (Korea).zip"]);
        let exclusives = ExclusiveDetector::default().detect(&all, &[], &());
        assert_eq!(exclusives.countries().collect::<Vec<_>>(), vec!["Japan", "Korea"]);
        assert_eq!(exclusives.len(), 2);
    }

    #[test]
    fn detector_countries_are_validated() {
        assert_eq!(detector(&["japan", "Japan"]).allowed_countries(), Some(&["Japan".to_string()][..]));
        assert_eq!(detector(&["ALL"]).allowed_countries(), None);
        assert_eq!(detector(&[]), ExclusiveDetector::default());
        assert_eq!(
            ExclusiveDetector::new(&["Narnia".to_string()]),
            Err(PolicyError::UnknownCountry("Narnia".to_string()))
        );
    }

    #[test]
    fn detect_countries_uses_groups_and_language_codes() {
        assert_eq!(detect_countries("Juego (Es).zip"), vec!["Spain"]);
        assert_eq!(detect_countries("Game (USA, Europe).zip"), vec!["USA", "Europe"]);
        assert!(detect_countries("Captain America.zip").is_empty());
    }

    #[test]
    fn merge_prepends_new_exclusives() {
        let selected = records(&["Zelda (Spain).zip"]);
        let chosen = records(&["Dragon Quest (Japan).zip"]);
        let outcome = merge_exclusives(&selected, &chosen, &());
        assert_eq!(
            names(&outcome.records),
            vec!["Dragon Quest (Japan).zip", "Zelda (Spain).zip"]
        );
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn merge_skips_similar_exclusives() {
        let selected = records(&["Mario Party 4 (Spain).zip"]);
        let chosen = records(&["Mario Party 4 Deluxe (Japan).zip"]);
        let outcome = merge_exclusives(&selected, &chosen, &());
        assert_eq!(names(&outcome.records), vec!["Mario Party 4 (Spain).zip"]);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].1, "Mario Party 4 (Spain).zip");
    }
}

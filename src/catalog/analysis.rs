//! Overview of the languages, regions and countries present in a listing.

use std::collections::BTreeMap;

use crate::catalog::parse::{has_exact_group, has_group_part, language_tags, region_tags};
use crate::catalog::patterns::{CONTINENTS, LANGUAGES, REGION_TOKENS};
use crate::catalog::record::FileRecord;

const MAX_EXAMPLES: usize = 3;

/// Number of matching files with a few example names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountEntry {
    pub count: usize,
    pub examples: Vec<String>,
}

impl CountEntry {
    fn add(&mut self, name: &str) {
        self.count += 1;
        if self.examples.len() < MAX_EXAMPLES {
            self.examples.push(name.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogAnalysis {
    pub total: usize,
    /// Keyed by language code.
    pub languages: BTreeMap<String, CountEntry>,
    /// Keyed by continent name.
    pub regions: BTreeMap<String, CountEntry>,
    /// Keyed by exact country tag.
    pub countries: BTreeMap<String, CountEntry>,
}

impl CatalogAnalysis {
    /// Entries sorted by descending count, then by key.
    #[must_use]
    pub fn by_count(entries: &BTreeMap<String, CountEntry>) -> Vec<(&str, &CountEntry)> {
        let mut sorted: Vec<(&str, &CountEntry)> = entries.iter().map(|(key, entry)| (key.as_str(), entry)).collect();
        sorted.sort_by(|a, b| b.1.count.cmp(&a.1.count).then_with(|| a.0.cmp(b.0)));
        sorted
    }
}

/// Count files per language, continent and country.
///
/// A file counts for a language when it lists the code in a language group
/// or carries a region tag of a country where that language is spoken.
#[must_use]
pub fn analyze_catalog(records: &[FileRecord]) -> CatalogAnalysis {
    let mut analysis = CatalogAnalysis {
        total: records.len(),
        ..CatalogAnalysis::default()
    };

    for record in records {
        let name = record.name.as_str();
        let languages = language_tags(name);
        let regions = region_tags(name);

        for (code, _, countries) in LANGUAGES {
            if languages.contains(*code) || regions.iter().any(|region| countries.contains(&region.as_str())) {
                analysis.languages.entry((*code).to_string()).or_default().add(name);
            }
        }

        for (continent, members) in CONTINENTS {
            if has_group_part(name, members) {
                analysis.regions.entry((*continent).to_string()).or_default().add(name);
            }
        }

        for country in REGION_TOKENS {
            if has_exact_group(name, country) {
                analysis.countries.entry((*country).to_string()).or_default().add(name);
            }
        }
    }

    analysis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(names: &[&str]) -> Vec<FileRecord> {
        names
            .iter()
            .map(|name| FileRecord::new(*name, format!("https://example.com/{name}"), 1))
            .collect()
    }

    #[test]
    fn counts_languages_regions_and_countries() {
        let analysis = analyze_catalog(&records(&[
            "Zelda (Spain).zip",
            "Mario (Europe) (En,Fr,Es).zip",
            "Racer (USA).zip",
            "Ninja (Japan).zip",
        ]));
        assert_eq!(analysis.total, 4);
        assert_eq!(analysis.languages["Es"].count, 2);
        assert_eq!(analysis.languages["En"].count, 2);
        assert_eq!(analysis.languages["Ja"].count, 1);
        assert!(!analysis.languages.contains_key("De"));
        assert_eq!(analysis.regions["Europe"].count, 2);
        assert_eq!(analysis.regions["Asia"].count, 1);
        assert_eq!(analysis.countries["Spain"].count, 1);
        assert_eq!(analysis.countries["Europe"].count, 1);
        assert!(!analysis.countries.contains_key("Germany"));
    }

    #[test]
    fn examples_are_limited() {
        let names: Vec<String> = (1..=5).map(|n| format!("Game {n} (Spain).zip")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let analysis = analyze_catalog(&records(&names));
        let spain = &analysis.countries["Spain"];
        assert_eq!(spain.count, 5);
        assert_eq!(spain.examples.len(), MAX_EXAMPLES);
        assert_eq!(spain.examples[0], "Game 1 (Spain).zip");
    }

    #[test]
    fn by_count_sorts_descending() {
        let analysis = analyze_catalog(&records(&["A (Spain).zip", "B (Spain).zip", "C (Japan).zip"]));
        let sorted = CatalogAnalysis::by_count(&analysis.countries);
        assert_eq!(sorted[0].0, "Spain");
        assert_eq!(sorted[1].0, "Japan");
    }
}

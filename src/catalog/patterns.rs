//! Named pattern tables shared by every catalog component.
//!
//! All region, country, language, stopword and genre vocabularies live here so the
//! parser, selector, detector and matcher agree on the same grammar.

use std::sync::LazyLock;

use regex::Regex;

/// Rank given to records whose region has no configured priority.
pub const UNRANKED: u32 = 999;

/// Preference used for countries missing from [`COUNTRY_PREFERENCE`].
pub const UNLISTED_COUNTRY_PREFERENCE: usize = 99;

/// Number of leading keywords that make up a title fingerprint.
pub const FINGERPRINT_LENGTH: usize = 4;

/// Minimum keyword-overlap score for a similar library match.
pub const MIN_SIMILARITY_SCORE: f64 = 0.70;

/// Minimum Jaccard similarity for an exclusive to count as a copy of a selected title.
pub const EXCLUSIVE_MERGE_SIMILARITY: f64 = 0.6;

/// Region and country tags recognized inside parenthesized groups.
pub const REGION_TOKENS: &[&str] = &[
    "Spain",
    "Europe",
    "Japan",
    "USA",
    "France",
    "Germany",
    "Italy",
    "UK",
    "Asia",
    "Australia",
    "Brazil",
    "China",
    "Korea",
    "Netherlands",
    "Poland",
    "Russia",
    "Scandinavia",
    "World",
    "Portugal",
];

/// Continent-like regions and the tags that belong to them.
pub const CONTINENTS: &[(&str, &[&str])] = &[
    (
        "Europe",
        &[
            "Europe",
            "Spain",
            "France",
            "Germany",
            "Italy",
            "UK",
            "Netherlands",
            "Poland",
            "Russia",
            "Scandinavia",
        ],
    ),
    ("USA", &["USA", "U", "Brazil", "America"]),
    ("Asia", &["Japan", "China", "Korea", "Asia"]),
    ("Oceania", &["Australia", "Oceania"]),
    ("World", &["World"]),
];

/// Language code, display name and the countries whose releases imply that language.
pub const LANGUAGES: &[(&str, &str, &[&str])] = &[
    ("Es", "Spanish", &["Spain"]),
    ("En", "English", &["USA", "UK", "Australia"]),
    ("Fr", "French", &["France"]),
    ("De", "German", &["Germany"]),
    ("It", "Italian", &["Italy"]),
    ("Ja", "Japanese", &["Japan"]),
    ("Pt", "Portuguese", &["Portugal", "Brazil"]),
    ("Nl", "Dutch", &["Netherlands"]),
    ("Ru", "Russian", &["Russia"]),
    ("Ko", "Korean", &["Korea"]),
    ("Zh", "Chinese", &["China"]),
    ("Pl", "Polish", &["Poland"]),
    ("Sv", "Swedish", &[]),
    ("No", "Norwegian", &[]),
    ("Da", "Danish", &[]),
    ("Fi", "Finnish", &[]),
];

/// Country tags used by the exclusive detector.
///
/// Each entry lists the words that identify the country inside a parenthesized group
/// and the single-language groups, like `(Es)`, that imply it.
pub const EXCLUSIVE_COUNTRIES: &[(&str, &[&str], &[&str])] = &[
    ("Japan", &["Japan"], &["Jp", "Ja"]),
    ("USA", &["USA", "America"], &[]),
    ("Spain", &["Spain"], &["Es"]),
    ("France", &["France"], &["Fr"]),
    ("Germany", &["Germany"], &["De"]),
    ("Italy", &["Italy"], &["It"]),
    ("UK", &["UK", "United Kingdom"], &[]),
    ("Korea", &["Korea"], &["Ko"]),
    ("China", &["China"], &["Zh"]),
    ("Brazil", &["Brazil", "Brasil"], &[]),
    ("Australia", &["Australia"], &[]),
    ("Europe", &["Europe"], &[]),
];

/// Countries that never make a title exclusive on their own.
pub const NON_EXCLUSIVE_COUNTRIES: &[&str] = &["Europe"];

/// Which country keeps a title found exclusive in several countries, best first.
pub const COUNTRY_PREFERENCE: &[&str] = &[
    "USA",
    "Japan",
    "UK",
    "Germany",
    "France",
    "Spain",
    "Italy",
    "Australia",
    "Korea",
    "China",
    "Brazil",
];

/// Countries whose exclusives are reported when no allow-list is configured.
pub const DEFAULT_EXCLUSIVE_COUNTRIES: &[&str] = &["Japan", "Korea"];

/// Lowercase title fragments that mark utilities and non-games.
pub const UTILITY_MARKERS: &[&str] = &[
    "demo",
    "preview",
    "beta",
    "sample",
    "promo",
    "action replay",
    "gameshark",
    "cheat",
];

/// Articles, conjunctions and prepositions ignored by keyword extraction.
pub const STOPWORDS: &[&str] = &[
    // English
    "the", "a", "an", "and", "or", "of", "in", "on", "at", "to", "for", "with", "by",
    // Spanish
    "el", "la", "los", "las", "de", "del", "y", "o", "en", "con", "por", "para",
    // French
    "le", "les", "du", "et", "ou", "avec", "pour", "par",
    // German
    "der", "die", "das", "den", "und", "oder", "von", "mit", "für", "auf",
    // Italian
    "il", "lo", "gli", "di", "e", "per", "da",
];

/// Sport keywords that tell otherwise similar titles apart.
pub const SPORT_KEYWORDS: &[&str] = &[
    "boxing",
    "tennis",
    "football",
    "soccer",
    "basketball",
    "baseball",
    "hockey",
    "racing",
    "golf",
    "cricket",
    "rugby",
    "volleyball",
    "wrestling",
];

/// Roman numerals that survive keyword extraction, with their value.
pub const ROMAN_NUMERALS: &[(&str, u32)] = &[
    ("ii", 2),
    ("iii", 3),
    ("iv", 4),
    ("vi", 6),
    ("vii", 7),
    ("viii", 8),
    ("ix", 9),
    ("xi", 11),
    ("xii", 12),
    ("xiii", 13),
    ("xiv", 14),
    ("xv", 15),
    ("xvi", 16),
];

/// Keyword tokens that come from archive extensions rather than the title.
pub const ARCHIVE_EXTENSION_TOKENS: &[&str] = &["zip", "rar", "7z"];

/// Regex to match a trailing file extension like `.zip` or `.7z`
pub static RE_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(?:[a-z][a-z0-9]{1,3}|7z)$").expect("Invalid extension regex"));

/// Regex to match a parenthesized disc marker like `(Disc 2)`
pub static RE_DISC_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\(Disc\s*\d+\)").expect("Invalid disc group regex"));

/// Regex to match a bare disc marker and capture its number
pub static RE_DISC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bDisc\s*(\d+)").expect("Invalid disc regex"));

/// Regex to match a parenthesized group and capture its contents
pub static RE_PAREN_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]*)\)").expect("Invalid parenthesis regex"));

/// Regex to match title separators, including straight and curly apostrophes
pub static RE_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_.:,'\u{2019}]+").expect("Invalid separator regex"));

/// Regex to match runs of whitespace
pub static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Regex to match a multi-code language group like `(En,Fr,De)`
pub static RE_LANGUAGE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z][a-z](?:,[A-Z][a-z])+)\)").expect("Invalid language group regex"));

/// Regex to match the contents of a group that only lists language codes, like `Es` or `En,Es`
pub static RE_LANGUAGE_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z](?:,[A-Z][a-z])*$").expect("Invalid language list regex"));

/// Regex to match demo, revision and other variant markers
pub static RE_DEMO_VARIANT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\((?:Demo\s*\d*|EDC|Unl|Alt|Rev\s*\d+|Beta)\)").expect("Invalid demo regex")
});

/// Per-country regexes for the exclusive detector, in [`EXCLUSIVE_COUNTRIES`] order.
pub static RE_EXCLUSIVE_COUNTRIES: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    EXCLUSIVE_COUNTRIES
        .iter()
        .map(|(country, words, codes)| {
            let mut alternatives: Vec<String> = words
                .iter()
                .map(|word| format!(r"\([^)]*\b{}\b[^)]*\)", regex::escape(word)))
                .collect();
            alternatives.extend(codes.iter().map(|code| format!(r"\({}\)", regex::escape(code))));
            let pattern = format!("(?i){}", alternatives.join("|"));
            (*country, Regex::new(&pattern).expect("Invalid country regex"))
        })
        .collect()
});

/// Find the canonical spelling of a region or country tag.
#[must_use]
pub fn canonical_region_token(tag: &str) -> Option<&'static str> {
    let tag = tag.trim();
    REGION_TOKENS
        .iter()
        .copied()
        .find(|token| token.eq_ignore_ascii_case(tag))
}

/// Find the member tags of a continent-like region.
#[must_use]
pub fn continent_members(region: &str) -> Option<&'static [&'static str]> {
    CONTINENTS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(region.trim()))
        .map(|(_, members)| *members)
}

/// Display name for a language code.
#[must_use]
pub fn language_name(code: &str) -> Option<&'static str> {
    LANGUAGES
        .iter()
        .find(|(language, _, _)| language.eq_ignore_ascii_case(code))
        .map(|(_, name, _)| *name)
}

/// Position of a country in [`COUNTRY_PREFERENCE`], lower is better.
#[must_use]
pub fn country_preference(country: &str) -> usize {
    COUNTRY_PREFERENCE
        .iter()
        .position(|c| *c == country)
        .unwrap_or(UNLISTED_COUNTRY_PREFERENCE)
}

/// Value of a roman numeral keyword.
#[must_use]
pub fn roman_value(word: &str) -> Option<u32> {
    ROMAN_NUMERALS
        .iter()
        .find(|(numeral, _)| *numeral == word)
        .map(|(_, value)| *value)
}

#[must_use]
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

#[must_use]
pub fn is_sport_keyword(word: &str) -> bool {
    SPORT_KEYWORDS.contains(&word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_region_token_ignores_case() {
        assert_eq!(canonical_region_token("spain"), Some("Spain"));
        assert_eq!(canonical_region_token(" uk "), Some("UK"));
        assert_eq!(canonical_region_token("Atlantis"), None);
    }

    #[test]
    fn europe_contains_member_countries() {
        let members = continent_members("europe").expect("europe");
        assert!(members.contains(&"Spain"));
        assert!(members.contains(&"Scandinavia"));
        assert!(!members.contains(&"Japan"));
    }

    #[test]
    fn usa_is_preferred_over_japan() {
        assert!(country_preference("USA") < country_preference("Japan"));
        assert_eq!(country_preference("Portugal"), UNLISTED_COUNTRY_PREFERENCE);
    }

    #[test]
    fn country_regex_matches_tags_only_inside_groups() {
        let (_, usa) = RE_EXCLUSIVE_COUNTRIES
            .iter()
            .find(|(country, _)| *country == "USA")
            .expect("usa");
        assert!(usa.is_match("Racer (USA).zip"));
        assert!(usa.is_match("Racer (USA, Europe).zip"));
        assert!(!usa.is_match("Captain America (Japan).zip"));
    }

    #[test]
    fn country_regex_matches_single_language_group() {
        let (_, spain) = RE_EXCLUSIVE_COUNTRIES
            .iter()
            .find(|(country, _)| *country == "Spain")
            .expect("spain");
        assert!(spain.is_match("Juego (Europe) (Es).zip"));
        assert!(!spain.is_match("Game (Europe) (En,Es).zip"));
    }

    #[test]
    fn demo_variant_regex() {
        for name in [
            "Game (Demo).zip",
            "Game (demo 2).zip",
            "Game (EDC).zip",
            "Game (Unl).zip",
            "Game (Rev 1).zip",
            "Game (Beta).zip",
            "Game (Alt).zip",
        ] {
            assert!(RE_DEMO_VARIANT.is_match(name), "{name}");
        }
        assert!(!RE_DEMO_VARIANT.is_match("Demolition Racer (Europe).zip"));
    }
}

//! Region and language priority policy.
//!
//! A [`PriorityPolicy`] is built once per run, either from a [`Preset`] or from a
//! [`CustomSelection`], and is read-only afterwards. Building validates every value,
//! so record classification itself never fails.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::catalog::error::PolicyError;
use crate::catalog::parse::{
    ParsedMetadata, Region, accepts_language, contains_language_code, group_region_tokens, has_exact_group,
    has_group_part, has_language_group, paren_groups, parse,
};
use crate::catalog::patterns::{CONTINENTS, UNRANKED, canonical_region_token, continent_members, language_name};
use crate::catalog::record::FileRecord;

/// Which records a policy accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterMode {
    /// Every record is valid.
    None,
    /// A group must equal the country tag exactly.
    Country { country: String },
    /// Some group part must be the region or one of its member countries.
    Region { region: String },
    /// The exact region tag must be present, plus the language code when one is set.
    RegionLanguage { region: String, language: Option<String> },
    /// The exact region tag must be present and no multi-code language group.
    RegionOnly { region: String },
    /// The language code must appear as a whole word.
    Language { language: String },
    /// Only the listed regions are allowed, ranked in list order.
    ///
    /// A Europe release must list `language` when it carries a language group,
    /// and a `home_country` release beats every Europe release of the same title.
    Preferred {
        regions: Vec<String>,
        language: Option<String>,
        home_country: Option<String>,
    },
}

impl FilterMode {
    fn describe(&self) -> String {
        match self {
            Self::None => "All files (No filter)".to_string(),
            Self::Country { country } => format!("Country: {country}"),
            Self::Region { region } => format!("Region: {region}"),
            Self::RegionLanguage {
                region,
                language: Some(language),
            } => format!("Region: {region} (Language: {language})"),
            Self::RegionLanguage { region, language: None } => format!("Region: {region}"),
            Self::RegionOnly { region } => format!("Region: {region} (No language tags)"),
            Self::Language { language } => format!("Language: {language}"),
            Self::Preferred { regions, .. } => format!("Preferred: {}", regions.join(" > ")),
        }
    }
}

/// Predefined single-language policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Spanish,
    English,
    French,
    German,
    Italian,
    Japanese,
}

impl Preset {
    pub const ALL: [Self; 6] = [
        Self::Spanish,
        Self::English,
        Self::French,
        Self::German,
        Self::Italian,
        Self::Japanese,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Spanish => "spanish",
            Self::English => "english",
            Self::French => "french",
            Self::German => "german",
            Self::Italian => "italian",
            Self::Japanese => "japanese",
        }
    }

    const fn regions(self) -> &'static [&'static str] {
        match self {
            Self::Spanish => &["Spain", "Europe", "Japan"],
            Self::English => &["Europe", "USA", "Japan"],
            Self::French => &["France", "Europe", "Japan"],
            Self::German => &["Germany", "Europe", "Japan"],
            Self::Italian => &["Italy", "Europe", "Japan"],
            Self::Japanese => &["Japan"],
        }
    }

    const fn language(self) -> Option<&'static str> {
        match self {
            Self::Spanish => Some("Es"),
            Self::English => Some("En"),
            Self::French => Some("Fr"),
            Self::German => Some("De"),
            Self::Italian => Some("It"),
            Self::Japanese => None,
        }
    }

    const fn home_country(self) -> Option<&'static str> {
        match self {
            Self::Spanish => Some("Spain"),
            Self::English => None,
            Self::French => Some("France"),
            Self::German => Some("Germany"),
            Self::Italian => Some("Italy"),
            Self::Japanese => Some("Japan"),
        }
    }

    fn label(self) -> String {
        let regions = self.regions().join(" > ");
        match self.language().and_then(language_name) {
            Some(language) => format!("{language} ({regions})"),
            None => format!("Japanese ({regions} only)"),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Preset {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| PolicyError::UnknownPreset(name.to_string()))
    }
}

/// Free-form policy choices from the command line or the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomSelection {
    pub country: Option<String>,
    pub region: Option<String>,
    pub language: Option<String>,
    pub region_only: bool,
}

impl CustomSelection {
    /// True if nothing was chosen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        non_blank(self.country.as_deref()).is_none()
            && non_blank(self.region.as_deref()).is_none()
            && non_blank(self.language.as_deref()).is_none()
            && !self.region_only
    }

    /// Resolve the selection into a filter mode.
    ///
    /// # Errors
    /// Returns an error for conflicting choices or unknown values.
    pub fn filter_mode(&self) -> Result<FilterMode, PolicyError> {
        let country = non_blank(self.country.as_deref());
        let region = non_blank(self.region.as_deref());
        let language = non_blank(self.language.as_deref());

        if let Some(country) = country {
            if region.is_some() || language.is_some() || self.region_only {
                return Err(PolicyError::ConflictingSelection(format!(
                    "country '{country}' cannot be combined with a region or language"
                )));
            }
            return Ok(FilterMode::Country {
                country: country.to_string(),
            });
        }

        match (region, language, self.region_only) {
            (None, _, true) => Err(PolicyError::RegionOnlyWithoutRegion),
            (Some(region), Some(language), true) => Err(PolicyError::ConflictingSelection(format!(
                "region-only filter for '{region}' excludes language '{language}'"
            ))),
            (Some(region), None, true) => Ok(FilterMode::RegionOnly {
                region: region.to_string(),
            }),
            (Some(region), Some(language), false) => Ok(FilterMode::RegionLanguage {
                region: region.to_string(),
                language: Some(language.to_string()),
            }),
            (Some(region), None, false) => Ok(FilterMode::Region {
                region: region.to_string(),
            }),
            (None, Some(language), false) => Ok(FilterMode::Language {
                language: language.to_string(),
            }),
            (None, None, false) => Ok(FilterMode::None),
        }
    }
}

/// Outcome of checking one record against a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Valid { region: Region, rank: u32 },
    Invalid(InvalidReason),
}

/// Why a record was rejected by the active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    DemoOrVariant,
    ExcludedRegion { region: String },
    MissingLanguage { region: String, language: String },
    NotCountry { country: String },
    NotRegion { region: String },
    LanguageAnnotated { region: String },
    MissingLanguageCode { language: String },
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DemoOrVariant => write!(f, "excluded: demo/variant"),
            Self::ExcludedRegion { region } => write!(f, "individual region not allowed: {region}"),
            Self::MissingLanguage { region, language } => match language_name(language) {
                Some(name) => write!(f, "{region} release missing language {language} ({name})"),
                None => write!(f, "{region} release missing language {language}"),
            },
            Self::NotCountry { country } => write!(f, "not from selected country: {country}"),
            Self::NotRegion { region } => write!(f, "not from selected region: {region}"),
            Self::LanguageAnnotated { region } => write!(f, "{region} release carries language tags"),
            Self::MissingLanguageCode { language } => write!(f, "does not contain language: {language}"),
        }
    }
}

/// Validated region and language policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityPolicy {
    name: String,
    mode: FilterMode,
    region_rank: HashMap<String, u32>,
    default_rank: u32,
    include_demos: bool,
}

impl PriorityPolicy {
    /// Build a policy from a filter mode, validating and normalizing its values.
    ///
    /// # Errors
    /// Returns an error for unknown regions or countries and malformed language codes.
    pub fn new(mode: FilterMode) -> Result<Self, PolicyError> {
        let mode = validate_mode(mode)?;
        let name = mode.describe();
        Ok(Self::from_valid_mode(name, mode))
    }

    #[must_use]
    pub fn preset(preset: Preset) -> Self {
        let mode = FilterMode::Preferred {
            regions: preset.regions().iter().map(ToString::to_string).collect(),
            language: preset.language().map(ToString::to_string),
            home_country: preset.home_country().map(ToString::to_string),
        };
        Self::from_valid_mode(preset.label(), mode)
    }

    /// Build a policy from free-form choices.
    ///
    /// # Errors
    /// Returns an error for conflicting or unknown choices.
    pub fn custom(selection: &CustomSelection) -> Result<Self, PolicyError> {
        Self::new(selection.filter_mode()?)
    }

    #[must_use]
    pub fn no_filter() -> Self {
        Self::from_valid_mode(FilterMode::None.describe(), FilterMode::None)
    }

    /// Accept demo and variant records instead of rejecting them.
    #[must_use]
    pub const fn with_demos(mut self, include_demos: bool) -> Self {
        self.include_demos = include_demos;
        self
    }

    fn from_valid_mode(name: String, mode: FilterMode) -> Self {
        let mut region_rank = HashMap::new();
        match &mode {
            FilterMode::None | FilterMode::Language { .. } => {}
            FilterMode::Country { country } => {
                region_rank.insert(country.clone(), 1);
            }
            FilterMode::Region { region } => {
                for member in continent_members(region).unwrap_or_default() {
                    region_rank.insert((*member).to_string(), 2);
                }
                region_rank.insert(region.clone(), 1);
            }
            FilterMode::RegionLanguage { region, .. } | FilterMode::RegionOnly { region } => {
                region_rank.insert(region.clone(), 1);
            }
            FilterMode::Preferred { regions, .. } => {
                for (rank, region) in (1..).zip(regions) {
                    region_rank.entry(region.clone()).or_insert(rank);
                }
            }
        }
        Self {
            name,
            mode,
            region_rank,
            default_rank: UNRANKED,
            include_demos: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn mode(&self) -> &FilterMode {
        &self.mode
    }

    #[must_use]
    pub const fn default_rank(&self) -> u32 {
        self.default_rank
    }

    #[must_use]
    pub const fn include_demos(&self) -> bool {
        self.include_demos
    }

    #[must_use]
    pub fn region(&self) -> Option<&str> {
        match &self.mode {
            FilterMode::Region { region }
            | FilterMode::RegionLanguage { region, .. }
            | FilterMode::RegionOnly { region } => Some(region),
            _ => None,
        }
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        match &self.mode {
            FilterMode::RegionLanguage { language, .. } | FilterMode::Preferred { language, .. } => {
                language.as_deref()
            }
            FilterMode::Language { language } => Some(language),
            _ => None,
        }
    }

    #[must_use]
    pub fn specific_country(&self) -> Option<&str> {
        match &self.mode {
            FilterMode::Country { country } => Some(country),
            _ => None,
        }
    }

    #[must_use]
    pub fn home_country(&self) -> Option<&str> {
        match &self.mode {
            FilterMode::Preferred { home_country, .. } => home_country.as_deref(),
            _ => None,
        }
    }

    /// Rank of a single region tag.
    #[must_use]
    pub fn rank_of(&self, region: &str) -> u32 {
        self.region_rank.get(region).copied().unwrap_or(self.default_rank)
    }

    /// Best rank among the region tags of a file.
    #[must_use]
    pub fn rank(&self, metadata: &ParsedMetadata) -> u32 {
        metadata
            .region_tags
            .iter()
            .filter_map(|tag| self.region_rank.get(tag).copied())
            .min()
            .unwrap_or(self.default_rank)
    }

    /// Check a record against this policy.
    #[must_use]
    pub fn classify(&self, record: &FileRecord) -> Classification {
        self.classify_parsed(&record.name, &parse(&record.name))
    }

    /// Check an already parsed file name against this policy.
    #[must_use]
    pub fn classify_parsed(&self, name: &str, metadata: &ParsedMetadata) -> Classification {
        if metadata.is_demo_or_variant && !self.include_demos {
            return Classification::Invalid(InvalidReason::DemoOrVariant);
        }
        match self.check_filter(name) {
            Ok(()) => Classification::Valid {
                region: metadata.region.clone(),
                rank: self.rank(metadata),
            },
            Err(reason) => Classification::Invalid(reason),
        }
    }

    fn check_filter(&self, name: &str) -> Result<(), InvalidReason> {
        match &self.mode {
            FilterMode::None => Ok(()),
            FilterMode::Country { country } => {
                if has_exact_group(name, country) {
                    Ok(())
                } else {
                    Err(InvalidReason::NotCountry {
                        country: country.clone(),
                    })
                }
            }
            FilterMode::Region { region } => {
                let members = continent_members(region).unwrap_or_default();
                if has_group_part(name, members) || has_group_part(name, &[region.as_str()]) {
                    Ok(())
                } else {
                    Err(InvalidReason::NotRegion { region: region.clone() })
                }
            }
            FilterMode::RegionLanguage { region, language } => {
                if !has_exact_group(name, region) {
                    return Err(InvalidReason::NotRegion { region: region.clone() });
                }
                match language {
                    Some(language) if !contains_language_code(name, language) => {
                        Err(InvalidReason::MissingLanguage {
                            region: region.clone(),
                            language: language.clone(),
                        })
                    }
                    _ => Ok(()),
                }
            }
            FilterMode::RegionOnly { region } => {
                if !has_exact_group(name, region) {
                    Err(InvalidReason::NotRegion { region: region.clone() })
                } else if has_language_group(name) {
                    Err(InvalidReason::LanguageAnnotated { region: region.clone() })
                } else {
                    Ok(())
                }
            }
            FilterMode::Language { language } => {
                if contains_language_code(name, language) {
                    Ok(())
                } else {
                    Err(InvalidReason::MissingLanguageCode {
                        language: language.clone(),
                    })
                }
            }
            FilterMode::Preferred { regions, language, .. } => check_preferred(name, regions, language.as_deref()),
        }
    }
}

impl Default for PriorityPolicy {
    fn default() -> Self {
        Self::no_filter()
    }
}

impl fmt::Display for PriorityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Groups with known region tokens must name an allowed region.
/// A Europe group must come with the preferred language when a language group is present.
fn check_preferred(name: &str, regions: &[String], language: Option<&str>) -> Result<(), InvalidReason> {
    let europe_allowed = regions.iter().any(|region| region == "Europe");
    for group in paren_groups(name) {
        let tokens = group_region_tokens(group);
        let Some(first) = tokens.first() else {
            continue;
        };
        if !tokens.iter().any(|token| regions.iter().any(|region| region == token)) {
            return Err(InvalidReason::ExcludedRegion {
                region: (*first).to_string(),
            });
        }
        if europe_allowed
            && tokens.contains(&"Europe")
            && let Some(language) = language
            && !accepts_language(name, language)
        {
            return Err(InvalidReason::MissingLanguage {
                region: "Europe".to_string(),
                language: language.to_string(),
            });
        }
    }
    Ok(())
}

fn validate_mode(mode: FilterMode) -> Result<FilterMode, PolicyError> {
    Ok(match mode {
        FilterMode::None => FilterMode::None,
        FilterMode::Country { country } => FilterMode::Country {
            country: canonical_country(&country)?,
        },
        FilterMode::Region { region } => FilterMode::Region {
            region: canonical_region(&region)?,
        },
        FilterMode::RegionLanguage { region, language } => FilterMode::RegionLanguage {
            region: canonical_region(&region)?,
            language: language.as_deref().map(normalize_language_code).transpose()?,
        },
        FilterMode::RegionOnly { region } => FilterMode::RegionOnly {
            region: canonical_region(&region)?,
        },
        FilterMode::Language { language } => FilterMode::Language {
            language: normalize_language_code(&language)?,
        },
        FilterMode::Preferred {
            regions,
            language,
            home_country,
        } => {
            if regions.is_empty() {
                return Err(PolicyError::EmptyPreferredRegions);
            }
            let regions = regions
                .iter()
                .map(|region| {
                    canonical_region_token(region)
                        .map(ToString::to_string)
                        .ok_or_else(|| PolicyError::UnknownRegion(region.clone()))
                })
                .collect::<Result<Vec<_>, _>>()?;
            let home_country = home_country.as_deref().map(canonical_country).transpose()?;
            if let Some(home) = &home_country
                && !regions.contains(home)
            {
                return Err(PolicyError::HomeCountryNotPreferred(home.clone()));
            }
            FilterMode::Preferred {
                regions,
                language: language.as_deref().map(normalize_language_code).transpose()?,
                home_country,
            }
        }
    })
}

/// Canonical spelling of a country tag.
///
/// # Errors
/// Returns an error if the tag is not a known country or region tag.
pub fn canonical_country(country: &str) -> Result<String, PolicyError> {
    canonical_region_token(country)
        .map(ToString::to_string)
        .ok_or_else(|| PolicyError::UnknownCountry(country.trim().to_string()))
}

/// Canonical spelling of a continent or country tag.
///
/// # Errors
/// Returns an error if the name is neither.
pub fn canonical_region(region: &str) -> Result<String, PolicyError> {
    let trimmed = region.trim();
    CONTINENTS
        .iter()
        .map(|(name, _)| *name)
        .find(|name| name.eq_ignore_ascii_case(trimmed))
        .or_else(|| canonical_region_token(trimmed))
        .map(ToString::to_string)
        .ok_or_else(|| PolicyError::UnknownRegion(trimmed.to_string()))
}

/// Normalize a language code to `Xx` capitalization.
///
/// ```rust
/// use rom_tools::catalog::policy::normalize_language_code;
///
/// assert_eq!(normalize_language_code("es").unwrap(), "Es");
/// assert!(normalize_language_code("spanish").is_err());
/// ```
///
/// # Errors
/// Returns an error unless the code is exactly two ASCII letters.
pub fn normalize_language_code(code: &str) -> Result<String, PolicyError> {
    let trimmed = code.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(first), Some(second), None) if first.is_ascii_alphabetic() && second.is_ascii_alphabetic() => {
            Ok(format!("{}{}", first.to_ascii_uppercase(), second.to_ascii_lowercase()))
        }
        _ => Err(PolicyError::InvalidLanguageCode(trimmed.to_string())),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> FileRecord {
        FileRecord::new(name, format!("https://example.com/{name}"), 1024)
    }

    fn rank_of(policy: &PriorityPolicy, name: &str) -> u32 {
        match policy.classify(&record(name)) {
            Classification::Valid { rank, .. } => rank,
            Classification::Invalid(reason) => panic!("{name} should be valid, got: {reason}"),
        }
    }

    fn reason_of(policy: &PriorityPolicy, name: &str) -> InvalidReason {
        match policy.classify(&record(name)) {
            Classification::Valid { .. } => panic!("{name} should be invalid"),
            Classification::Invalid(reason) => reason,
        }
    }

    #[test]
    fn preset_names_parse_case_insensitively() {
        assert_eq!("Spanish".parse::<Preset>(), Ok(Preset::Spanish));
        assert_eq!(" JAPANESE ".parse::<Preset>(), Ok(Preset::Japanese));
        assert_eq!(
            "klingon".parse::<Preset>(),
            Err(PolicyError::UnknownPreset("klingon".to_string()))
        );
    }

    #[test]
    fn spanish_preset_ranks_regions() {
        let policy = PriorityPolicy::preset(Preset::Spanish);
        assert_eq!(rank_of(&policy, "Zelda (Spain).zip"), 1);
        assert_eq!(rank_of(&policy, "Zelda (Europe) (En,Fr,De,Es,It).zip"), 2);
        assert_eq!(rank_of(&policy, "Zelda (Japan).zip"), 3);
        assert_eq!(rank_of(&policy, "Zelda.zip"), UNRANKED);
        assert_eq!(policy.language(), Some("Es"));
        assert_eq!(policy.home_country(), Some("Spain"));
    }

    #[test]
    fn spanish_preset_rejects_excluded_regions() {
        let policy = PriorityPolicy::preset(Preset::Spanish);
        for (name, region) in [
            ("Zelda (USA).zip", "USA"),
            ("Zelda (France).zip", "France"),
            ("Zelda (World).zip", "World"),
            ("Zelda (Korea).zip", "Korea"),
        ] {
            assert_eq!(
                reason_of(&policy, name),
                InvalidReason::ExcludedRegion {
                    region: region.to_string()
                }
            );
        }
    }

    #[test]
    fn excluded_tag_is_accepted_next_to_allowed_tag() {
        let policy = PriorityPolicy::preset(Preset::Spanish);
        assert_eq!(rank_of(&policy, "Zelda (USA, Europe).zip"), 2);
        assert_eq!(rank_of(&policy, "Zelda (Japan, USA).zip"), 3);
    }

    #[test]
    fn europe_requires_language_when_language_group_present() {
        let policy = PriorityPolicy::preset(Preset::Spanish);
        let reason = reason_of(&policy, "Puzzle (Europe) (En,Fr,De).zip");
        assert_eq!(
            reason,
            InvalidReason::MissingLanguage {
                region: "Europe".to_string(),
                language: "Es".to_string()
            }
        );
        assert!(reason.to_string().contains("Spanish"));
        assert_eq!(rank_of(&policy, "Puzzle (Europe).zip"), 2);
    }

    #[test]
    fn demos_are_invalid_unless_included() {
        let policy = PriorityPolicy::preset(Preset::Spanish);
        assert_eq!(reason_of(&policy, "Zelda (Spain) (Demo).zip"), InvalidReason::DemoOrVariant);
        let policy = policy.with_demos(true);
        assert_eq!(rank_of(&policy, "Zelda (Spain) (Demo).zip"), 1);
    }

    #[test]
    fn english_preset_accepts_usa() {
        let policy = PriorityPolicy::preset(Preset::English);
        assert_eq!(rank_of(&policy, "Racer (Europe) (En,Fr).zip"), 1);
        assert_eq!(rank_of(&policy, "Racer (USA).zip"), 2);
        assert!(matches!(
            reason_of(&policy, "Racer (Spain).zip"),
            InvalidReason::ExcludedRegion { .. }
        ));
    }

    #[test]
    fn japanese_preset_rejects_europe() {
        let policy = PriorityPolicy::preset(Preset::Japanese);
        assert_eq!(rank_of(&policy, "Racer (Japan).zip"), 1);
        assert_eq!(
            reason_of(&policy, "Racer (Europe).zip"),
            InvalidReason::ExcludedRegion {
                region: "Europe".to_string()
            }
        );
    }

    #[test]
    fn country_mode_requires_exact_group() {
        let policy = PriorityPolicy::custom(&CustomSelection {
            country: Some("usa".to_string()),
            ..CustomSelection::default()
        })
        .expect("valid policy");
        assert_eq!(policy.specific_country(), Some("USA"));
        assert_eq!(policy.name(), "Country: USA");
        assert_eq!(rank_of(&policy, "Racer (USA).zip"), 1);
        assert!(matches!(
            reason_of(&policy, "Racer (USA, Europe).zip"),
            InvalidReason::NotCountry { .. }
        ));
    }

    #[test]
    fn region_mode_accepts_member_countries() {
        let policy = PriorityPolicy::new(FilterMode::Region {
            region: "europe".to_string(),
        })
        .expect("valid policy");
        assert_eq!(policy.region(), Some("Europe"));
        assert_eq!(rank_of(&policy, "Game (Europe).zip"), 1);
        assert_eq!(rank_of(&policy, "Game (Spain).zip"), 2);
        assert_eq!(rank_of(&policy, "Game (USA, France).zip"), 2);
        assert!(matches!(reason_of(&policy, "Game (Japan).zip"), InvalidReason::NotRegion { .. }));
    }

    #[test]
    fn region_language_mode_requires_exact_region_and_code() {
        let policy = PriorityPolicy::custom(&CustomSelection {
            region: Some("Europe".to_string()),
            language: Some("es".to_string()),
            ..CustomSelection::default()
        })
        .expect("valid policy");
        assert_eq!(policy.name(), "Region: Europe (Language: Es)");
        assert_eq!(rank_of(&policy, "Game (Europe) (En,Es).zip"), 1);
        assert!(matches!(
            reason_of(&policy, "Game (Spain) (Es).zip"),
            InvalidReason::NotRegion { .. }
        ));
        assert!(matches!(
            reason_of(&policy, "Game (Europe) (En,Fr).zip"),
            InvalidReason::MissingLanguage { .. }
        ));
        assert_eq!(
            reason_of(&policy, "Game (USA, Europe) (En,Es).zip"),
            InvalidReason::NotRegion {
                region: "Europe".to_string()
            }
        );
    }

    #[test]
    fn region_language_mode_without_language() {
        let policy = PriorityPolicy::new(FilterMode::RegionLanguage {
            region: "USA".to_string(),
            language: None,
        })
        .expect("valid policy");
        assert_eq!(rank_of(&policy, "Game (USA) (En,Fr).zip"), 1);
    }

    #[test]
    fn region_only_mode_rejects_language_groups() {
        let policy = PriorityPolicy::custom(&CustomSelection {
            region: Some("Europe".to_string()),
            region_only: true,
            ..CustomSelection::default()
        })
        .expect("valid policy");
        assert_eq!(rank_of(&policy, "Game (Europe).zip"), 1);
        assert_eq!(
            reason_of(&policy, "Game (Europe) (En,Fr,De).zip"),
            InvalidReason::LanguageAnnotated {
                region: "Europe".to_string()
            }
        );
        assert_eq!(
            reason_of(&policy, "Game (USA, Europe).zip"),
            InvalidReason::NotRegion {
                region: "Europe".to_string()
            }
        );
    }

    #[test]
    fn language_mode_matches_whole_words() {
        let policy = PriorityPolicy::custom(&CustomSelection {
            language: Some("FR".to_string()),
            ..CustomSelection::default()
        })
        .expect("valid policy");
        assert_eq!(policy.language(), Some("Fr"));
        assert_eq!(rank_of(&policy, "Jeu (Europe) (En,Fr).zip"), UNRANKED);
        assert!(matches!(
            reason_of(&policy, "Fruit Ninja (USA).zip"),
            InvalidReason::MissingLanguageCode { .. }
        ));
    }

    #[test]
    fn empty_selection_is_no_filter() {
        let selection = CustomSelection {
            country: Some("  ".to_string()),
            ..CustomSelection::default()
        };
        assert!(selection.is_empty());
        let policy = PriorityPolicy::custom(&selection).expect("valid policy");
        assert_eq!(policy.mode(), &FilterMode::None);
        assert_eq!(policy.name(), "All files (No filter)");
    }

    #[test]
    fn conflicting_selections_fail() {
        let result = PriorityPolicy::custom(&CustomSelection {
            country: Some("Spain".to_string()),
            region: Some("Europe".to_string()),
            ..CustomSelection::default()
        });
        assert!(matches!(result, Err(PolicyError::ConflictingSelection(_))));

        let result = PriorityPolicy::custom(&CustomSelection {
            region_only: true,
            ..CustomSelection::default()
        });
        assert_eq!(result, Err(PolicyError::RegionOnlyWithoutRegion));
    }

    #[test]
    fn unknown_values_fail() {
        let result = PriorityPolicy::custom(&CustomSelection {
            country: Some("Atlantis".to_string()),
            ..CustomSelection::default()
        });
        assert_eq!(result, Err(PolicyError::UnknownCountry("Atlantis".to_string())));

        let result = PriorityPolicy::custom(&CustomSelection {
            region: Some("Middle Earth".to_string()),
            ..CustomSelection::default()
        });
        assert_eq!(result, Err(PolicyError::UnknownRegion("Middle Earth".to_string())));

        let result = PriorityPolicy::custom(&CustomSelection {
            language: Some("Esp".to_string()),
            ..CustomSelection::default()
        });
        assert_eq!(result, Err(PolicyError::InvalidLanguageCode("Esp".to_string())));
    }

    #[test]
    fn preferred_mode_validation() {
        let result = PriorityPolicy::new(FilterMode::Preferred {
            regions: Vec::new(),
            language: None,
            home_country: None,
        });
        assert_eq!(result, Err(PolicyError::EmptyPreferredRegions));

        let result = PriorityPolicy::new(FilterMode::Preferred {
            regions: vec!["Europe".to_string()],
            language: Some("en".to_string()),
            home_country: Some("UK".to_string()),
        });
        assert_eq!(result, Err(PolicyError::HomeCountryNotPreferred("UK".to_string())));

        let policy = PriorityPolicy::new(FilterMode::Preferred {
            regions: vec!["uk".to_string(), "europe".to_string()],
            language: Some("en".to_string()),
            home_country: Some("UK".to_string()),
        })
        .expect("valid policy");
        assert_eq!(policy.name(), "Preferred: UK > Europe");
        assert_eq!(policy.rank_of("Europe"), 2);
    }
}

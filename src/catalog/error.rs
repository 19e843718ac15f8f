use thiserror::Error;

/// Invalid policy configuration, raised before any record is processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("Unknown preset '{0}', expected one of: spanish, english, french, german, italian, japanese")]
    UnknownPreset(String),

    #[error("Unknown country '{0}'")]
    UnknownCountry(String),

    #[error("Unknown region '{0}', expected a continent (Europe, USA, Asia, Oceania, World) or a country")]
    UnknownRegion(String),

    #[error("Invalid language code '{0}', expected two letters like Es or En")]
    InvalidLanguageCode(String),

    #[error("Conflicting selection: {0}")]
    ConflictingSelection(String),

    #[error("Region-only filter requires a region")]
    RegionOnlyWithoutRegion,

    #[error("Preferred region list is empty")]
    EmptyPreferredRegions,

    #[error("Home country '{0}' is not one of the preferred regions")]
    HomeCountryNotPreferred(String),
}

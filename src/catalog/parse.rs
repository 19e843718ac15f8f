//! Filename grammar: base title, region tags, language tags, disc number and variant markers.

use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::patterns::{
    RE_DEMO_VARIANT, RE_DISC, RE_DISC_GROUP, RE_EXTENSION, RE_LANGUAGE_GROUP, RE_LANGUAGE_LIST, RE_PAREN_GROUP,
    RE_SEPARATORS, RE_WHITESPACE, REGION_TOKENS,
};

/// Detected release region.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Known(String),
    Unknown,
}

impl Region {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(region) => region,
            Self::Unknown => "Unknown",
        }
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata derived from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMetadata {
    pub base_title: String,
    /// First known region tag in filename order.
    pub region: Region,
    /// Every known region tag in filename order, without duplicates.
    pub region_tags: Vec<String>,
    pub language_tags: BTreeSet<String>,
    pub disc_number: Option<u32>,
    pub is_demo_or_variant: bool,
}

/// Parse all metadata from a file name.
#[must_use]
pub fn parse(filename: &str) -> ParsedMetadata {
    ParsedMetadata {
        base_title: base_title(filename),
        region: detect_region(filename),
        region_tags: region_tags(filename),
        language_tags: language_tags(filename),
        disc_number: disc_number(filename),
        is_demo_or_variant: is_demo_or_variant(filename),
    }
}

/// File name without extension, disc markers and parenthesized annotations.
///
/// Falls back to the unmodified name if nothing is left after stripping.
///
/// ```rust
/// use rom_tools::catalog::parse::base_title;
///
/// assert_eq!(base_title("Game (Spain).zip"), "Game");
/// assert_eq!(base_title("Game (Europe)(En,Es).zip"), "Game");
/// assert_eq!(base_title("Final Fantasy VII (Disc 2) (Spain).zip"), "Final Fantasy VII");
/// ```
#[must_use]
pub fn base_title(filename: &str) -> String {
    let title = normalized_title(filename);
    if title.is_empty() { filename.to_string() } else { title }
}

/// Title text with extension, disc markers and groups removed, separators collapsed to single spaces.
#[must_use]
pub fn normalized_title(filename: &str) -> String {
    let without_extension = strip_extension(filename);
    let without_disc_groups = RE_DISC_GROUP.replace_all(without_extension, " ");
    let without_disc = RE_DISC.replace_all(&without_disc_groups, " ");
    let without_groups = RE_PAREN_GROUP.replace_all(&without_disc, " ");
    let separated = RE_SEPARATORS.replace_all(&without_groups, " ");
    RE_WHITESPACE.replace_all(&separated, " ").trim().to_string()
}

/// File name without a trailing extension.
#[must_use]
pub fn strip_extension(filename: &str) -> &str {
    RE_EXTENSION
        .find(filename)
        .map_or(filename, |extension| &filename[..extension.start()])
}

/// Contents of every parenthesized group, in filename order.
pub fn paren_groups(filename: &str) -> impl Iterator<Item = &str> {
    RE_PAREN_GROUP
        .captures_iter(filename)
        .filter_map(|captures| captures.get(1))
        .map(|group| group.as_str())
}

/// Words of a group split on anything that is not a letter, digit or underscore.
pub fn group_words(group: &str) -> impl Iterator<Item = &str> {
    group
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|word| !word.is_empty())
}

/// Comma separated parts of a group, trimmed.
pub fn group_parts(group: &str) -> impl Iterator<Item = &str> {
    group.split(',').map(str::trim).filter(|part| !part.is_empty())
}

/// Known region tokens of a single group, in order of appearance.
#[must_use]
pub fn group_region_tokens(group: &str) -> Vec<&'static str> {
    group_words(group)
        .filter_map(|word| REGION_TOKENS.iter().copied().find(|token| *token == word))
        .collect()
}

/// Every known region tag in filename order, without duplicates.
#[must_use]
pub fn region_tags(filename: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for group in paren_groups(filename) {
        for token in group_region_tokens(group) {
            if !tags.iter().any(|tag| tag == token) {
                tags.push(token.to_string());
            }
        }
    }
    tags
}

/// Region of the first group that contains a known region token.
#[must_use]
pub fn detect_region(filename: &str) -> Region {
    paren_groups(filename)
        .find_map(|group| group_region_tokens(group).first().copied())
        .map_or(Region::Unknown, |token| Region::Known(token.to_string()))
}

/// True if the name carries a multi-code language group like `(En,Fr,De)`.
#[must_use]
pub fn has_language_group(filename: &str) -> bool {
    RE_LANGUAGE_GROUP.is_match(filename)
}

/// Language codes of the first multi-code language group.
#[must_use]
pub fn language_group_codes(filename: &str) -> Option<Vec<&str>> {
    RE_LANGUAGE_GROUP
        .captures(filename)
        .and_then(|captures| captures.get(1))
        .map(|group| group.as_str().split(',').collect())
}

/// All language codes listed in language-only groups, like `(Es)` or `(En,Es)`.
#[must_use]
pub fn language_tags(filename: &str) -> BTreeSet<String> {
    paren_groups(filename)
        .filter(|group| RE_LANGUAGE_LIST.is_match(group))
        .flat_map(|group| group.split(','))
        .map(ToString::to_string)
        .collect()
}

/// True if the name has no multi-code language group, or one that lists `code`.
#[must_use]
pub fn accepts_language(filename: &str, code: &str) -> bool {
    language_group_codes(filename).is_none_or(|codes| codes.iter().any(|c| c.eq_ignore_ascii_case(code)))
}

/// Case-insensitive whole-word search for a language code anywhere in the name.
#[must_use]
pub fn contains_language_code(filename: &str, code: &str) -> bool {
    group_words(filename).any(|word| word.eq_ignore_ascii_case(code))
}

/// True if some group equals `tag`, ignoring case.
#[must_use]
pub fn has_exact_group(filename: &str, tag: &str) -> bool {
    paren_groups(filename).any(|group| group.trim().eq_ignore_ascii_case(tag))
}

/// True if some comma separated part of some group equals one of `tags`, ignoring case.
#[must_use]
pub fn has_group_part(filename: &str, tags: &[&str]) -> bool {
    paren_groups(filename)
        .flat_map(group_parts)
        .any(|part| tags.iter().any(|tag| tag.eq_ignore_ascii_case(part)))
}

/// Number of the first `Disc N` marker.
#[must_use]
pub fn disc_number(filename: &str) -> Option<u32> {
    RE_DISC
        .captures(filename)
        .and_then(|captures| captures.get(1))
        .and_then(|number| number.as_str().parse().ok())
}

#[must_use]
pub fn is_demo_or_variant(filename: &str) -> bool {
    RE_DEMO_VARIANT.is_match(filename)
}

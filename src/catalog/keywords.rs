//! Significant title tokens for fuzzy comparison.

use std::collections::HashSet;
use std::fmt;
use std::hash::BuildHasher;

use itertools::Itertools;

use crate::catalog::parse::normalized_title;
use crate::catalog::patterns::{FINGERPRINT_LENGTH, is_stopword, roman_value};

/// Sorted first keywords of a title, used as a coarse duplicate key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(Vec<String>);

impl Fingerprint {
    #[must_use]
    pub fn of(title: &str) -> Self {
        Self::from_keywords(&extract_keywords(title))
    }

    #[must_use]
    pub fn from_keywords(keywords: &[String]) -> Self {
        let mut words: Vec<String> = keywords.iter().take(FINGERPRINT_LENGTH).cloned().collect();
        words.sort();
        Self(words)
    }

    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tokens that contain a digit.
    pub fn digit_tokens(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .map(String::as_str)
            .filter(|word| word.chars().any(|c| c.is_ascii_digit()))
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.join(", "))
    }
}

/// Extract the significant lowercase words of a title or file name.
///
/// Numeric tokens of any length are always kept.
///
/// ```rust
/// use rom_tools::catalog::keywords::extract_keywords;
///
/// assert_eq!(extract_keywords("FIFA 99 (Spain).zip"), vec!["fifa", "99"]);
/// assert_eq!(extract_keywords("The Legend of Zelda"), vec!["legend", "zelda"]);
/// ```
#[must_use]
pub fn extract_keywords(title: &str) -> Vec<String> {
    normalized_title(title)
        .to_lowercase()
        .split_whitespace()
        .filter(|word| !is_stopword(word))
        .filter(|word| is_keyword(word))
        .unique()
        .map(ToString::to_string)
        .collect()
}

/// Keywords as a set.
#[must_use]
pub fn keyword_set(title: &str) -> HashSet<String> {
    extract_keywords(title).into_iter().collect()
}

fn is_keyword(word: &str) -> bool {
    is_numeric_token(word) || (word.chars().count() >= 2 && word.chars().all(char::is_alphabetic))
}

/// True if the word is made of ASCII digits only.
#[must_use]
pub fn is_numeric_token(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_ascii_digit())
}

/// Normalized number of a digit or roman numeral keyword.
///
/// Digit strings are returned as they are, roman numerals as their decimal value.
#[must_use]
pub fn number_value(word: &str) -> Option<String> {
    if is_numeric_token(word) {
        Some(word.to_string())
    } else {
        roman_value(word).map(|value| value.to_string())
    }
}

/// Normalized numbers found among the keywords.
pub fn number_tokens<'a>(keywords: impl IntoIterator<Item = &'a String>) -> HashSet<String> {
    keywords.into_iter().filter_map(|word| number_value(word)).collect()
}

/// Jaccard similarity of two keyword sets, zero when both are empty.
#[must_use]
pub fn jaccard<S: BuildHasher>(a: &HashSet<String, S>, b: &HashSet<String, S>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

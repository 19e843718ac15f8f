//! Directory listing pages: file links, human-readable sizes and URL handling.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use url::Url;

use crate::catalog::FileRecord;

/// File extensions accepted when none are configured.
pub const DEFAULT_EXTENSIONS: &[&str] = &["zip"];

/// Regex to match one table row
static RE_TABLE_ROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<tr[^>]*>(.*?)</tr>").expect("Invalid table row regex"));

/// Regex to match one table cell and capture its contents
static RE_TABLE_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<td[^>]*>(.*?)</td>").expect("Invalid table cell regex"));

/// Regex to match an anchor and capture its href
static RE_ANCHOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)')[^>]*>"#).expect("Invalid anchor regex")
});

/// Regex to match any HTML tag
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("Invalid tag regex"));

/// Regex to match a size like `1.5 MiB`
static RE_SIZE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([0-9]+(?:\.[0-9]+)?)\s*(b|kb|kib|mb|mib|gb|gib|tb|tib)?$").expect("Invalid size regex")
});

/// Parse a human-readable size into bytes.
///
/// Units are 1024 based and case-insensitive. Commas are ignored.
/// A dash, an empty string or anything unparsable is zero.
///
/// ```rust
/// use rom_tools::listing::parse_size;
///
/// assert_eq!(parse_size("1.5 KiB"), 1536);
/// assert_eq!(parse_size("2 MB"), 2 * 1024 * 1024);
/// assert_eq!(parse_size("-"), 0);
/// ```
#[must_use]
pub fn parse_size(text: &str) -> u64 {
    let cleaned = text.replace(',', "");
    let Some(captures) = RE_SIZE.captures(cleaned.trim()) else {
        return 0;
    };
    let Some(value) = captures.get(1).and_then(|value| value.as_str().parse::<f64>().ok()) else {
        return 0;
    };
    let multiplier: u64 = match captures
        .get(2)
        .map(|unit| unit.as_str().to_ascii_lowercase())
        .as_deref()
    {
        Some("kb" | "kib") => 1024,
        Some("mb" | "mib") => 1024 * 1024,
        Some("gb" | "gib") => 1024 * 1024 * 1024,
        Some("tb" | "tib") => 1024 * 1024 * 1024 * 1024,
        _ => 1,
    };
    (value * multiplier as f64) as u64
}

/// Extract file records from a directory listing page.
///
/// Links are returned in document order. Sizes are read from the second cell of
/// the table row that holds the link. Links outside tables get size zero.
#[must_use]
pub fn parse_listing(html: &str, base_url: &str, extensions: &[&str]) -> Vec<FileRecord> {
    let extensions: Vec<String> = if extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|ext| format!(".{ext}")).collect()
    } else {
        extensions
            .iter()
            .map(|ext| format!(".{}", ext.trim_start_matches('.').to_lowercase()))
            .collect()
    };

    let mut row_sizes: HashMap<String, u64> = HashMap::new();
    for row in RE_TABLE_ROW.captures_iter(html).filter_map(|captures| captures.get(1)) {
        let cells: Vec<&str> = RE_TABLE_CELL
            .captures_iter(row.as_str())
            .filter_map(|captures| captures.get(1))
            .map(|cell| cell.as_str())
            .collect();
        let Some(href) = cells.first().and_then(|cell| anchor_href(cell)) else {
            continue;
        };
        let size = cells.get(1).map_or(0, |cell| parse_size(&cell_text(cell)));
        row_sizes.insert(href, size);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    for href in RE_ANCHOR.captures_iter(html).filter_map(|captures| {
        captures
            .get(1)
            .or_else(|| captures.get(2))
            .map(|href| html_escape::decode_html_entities(href.as_str()).to_string())
    }) {
        let Some(name) = name_from_href(&href) else {
            continue;
        };
        let lowercase = name.to_lowercase();
        if !extensions.iter().any(|ext| lowercase.ends_with(ext.as_str())) {
            continue;
        }
        let url = join_url(base_url, &href);
        if !seen.insert(url.clone()) {
            continue;
        }
        let size = row_sizes.get(&href).copied().unwrap_or(0);
        records.push(FileRecord::new(name, url, size));
    }
    records
}

/// Parse a saved listing in JSON format.
///
/// # Errors
/// Returns an error if the text is not a JSON list of file records.
pub fn parse_listing_json(json: &str) -> Result<Vec<FileRecord>> {
    serde_json::from_str(json).context("Failed to parse listing JSON")
}

/// Check that a listing URL uses http or https.
///
/// # Errors
/// Returns an error for an unparsable URL, any other scheme or a missing host.
pub fn validate_url(url: &str) -> Result<Url> {
    let url = url.trim();
    let parsed = Url::parse(url).with_context(|| format!("Invalid URL '{url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("Invalid URL '{url}': only http and https are supported");
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        anyhow::bail!("Invalid URL '{url}': missing host");
    }
    Ok(parsed)
}

/// Resolve a link against the listing URL.
///
/// An empty or unparsable base keeps the link unchanged.
///
/// ```rust
/// use rom_tools::listing::join_url;
///
/// assert_eq!(join_url("https://host/files/a/", "../b/Game.zip"), "https://host/files/b/Game.zip");
/// assert_eq!(join_url("https://host/files/index.html", "Game.zip"), "https://host/files/Game.zip");
/// ```
#[must_use]
pub fn join_url(base_url: &str, href: &str) -> String {
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map_or_else(|_| href.to_string(), String::from)
}

/// Decoded file name from the last path segment of a link.
fn name_from_href(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or_default();
    let segment = path.rsplit('/').next().unwrap_or_default();
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(segment).map_or_else(|_| segment.to_string(), |name| name.into_owned());
    Some(decoded.nfc().collect())
}

fn anchor_href(cell: &str) -> Option<String> {
    RE_ANCHOR
        .captures(cell)
        .and_then(|captures| captures.get(1).or_else(|| captures.get(2)))
        .map(|href| html_escape::decode_html_entities(href.as_str()).to_string())
}

fn cell_text(cell: &str) -> String {
    let stripped = RE_TAG.replace_all(cell, "");
    html_escape::decode_html_entities(&stripped).trim().to_string()
}

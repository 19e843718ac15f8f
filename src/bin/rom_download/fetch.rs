//! Load the file listing from a URL or a saved file.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use url::Url;

use rom_tools::catalog::FileRecord;
use rom_tools::listing;

use crate::config::ListingSource;

/// Timeout for a single HTTP request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client.
///
/// # Errors
/// Returns an error if the client cannot be created.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(REQUEST_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")
}

/// Fetch or read the listing and extract the file records.
///
/// # Errors
/// Returns an error if the listing cannot be fetched, read or parsed.
pub async fn load_listing(client: &Client, source: &ListingSource) -> Result<Vec<FileRecord>> {
    match source {
        ListingSource::Url(url) => {
            let (base_url, html) = fetch_listing_html(client, url).await?;
            Ok(listing::parse_listing(&html, base_url.as_str(), &[]))
        }
        ListingSource::File(path) => read_listing_file(path),
    }
}

/// Fetch the listing page.
///
/// Returns the final URL after redirects, which relative links resolve against.
async fn fetch_listing_html(client: &Client, url: &str) -> Result<(Url, String)> {
    let url = listing::validate_url(url)?;
    let response = client
        .get(url.clone())
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .with_context(|| format!("Failed to fetch listing {url}"))?
        .error_for_status()
        .with_context(|| format!("Listing request failed for {url}"))?;
    let base_url = response.url().clone();
    let html = response.text().await.context("Failed to read listing response")?;
    Ok((base_url, html))
}

/// Read a saved listing: JSON records or an HTML page.
///
/// Relative links in a saved HTML page are kept as they are.
///
/// # Errors
/// Returns an error if the file cannot be read or the JSON is invalid.
pub fn read_listing_file(path: &Path) -> Result<Vec<FileRecord>> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read listing file {}", path.display()))?;
    if rom_tools::path_to_file_extension_string(path).eq_ignore_ascii_case("json") {
        listing::parse_listing_json(&content).with_context(|| format!("Invalid listing file {}", path.display()))
    } else {
        Ok(listing::parse_listing(&content, "", &[]))
    }
}

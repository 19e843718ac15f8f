//! romdl - Download preferred regional ROM releases from an archive directory listing.
//!
//! Fetches a directory listing, keeps one preferred release per title according to a
//! language preset or a custom region filter, skips titles already in the local library,
//! and downloads the rest.

mod config;
mod download;
mod extract;
mod fetch;
mod logger;
mod rom_download;
mod scan;
mod stats;

use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::rom_download::RomDownload;

/// Download preferred regional ROM releases from an archive directory listing.
///
/// One release is kept for each title according to the chosen preset or custom filter.
/// Files that already exist in the output directory are skipped.
#[derive(Parser)]
#[command(
    author,
    version,
    name = env!("CARGO_BIN_NAME"),
    about = "Download preferred regional ROM releases from an archive directory listing"
)]
pub struct RomDownloadArgs {
    /// Directory listing URL
    pub url: Option<String>,

    /// Read the listing from a saved HTML or JSON file instead of fetching it
    #[arg(short = 'f', long, name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub listing: Option<PathBuf>,

    /// Language preset: spanish, english, french, german, italian, japanese
    #[arg(short = 's', long, value_name = "PRESET")]
    pub preset: Option<String>,

    /// Only accept releases for this exact country
    #[arg(short = 'c', long, name = "COUNTRY", conflicts_with = "preset")]
    pub country: Option<String>,

    /// Accept releases from this region or continent
    #[arg(short = 'R', long, value_name = "REGION", conflicts_with = "preset")]
    pub region: Option<String>,

    /// Two-letter language code that must be present
    #[arg(short = 'L', long, name = "CODE", conflicts_with = "preset")]
    pub language: Option<String>,

    /// Only accept releases tagged exactly with the region
    #[arg(short = 'O', long)]
    pub region_only: bool,

    /// Include demos, betas, prototypes and other variants
    #[arg(short = 'D', long)]
    pub demos: bool,

    /// Add titles that were only released in another country
    #[arg(short = 'E', long)]
    pub exclusives: bool,

    /// Countries to accept exclusive titles from, or "all"
    #[arg(short = 'x', long = "exclusive", num_args = 1, action = clap::ArgAction::Append, name = "EXCLUSIVE_COUNTRY")]
    pub exclusive_countries: Vec<String>,

    /// Only consider files whose name contains this text
    #[arg(short = 't', long, name = "TITLE")]
    pub title: Option<String>,

    /// Output directory
    #[arg(short = 'o', long, name = "DIR", value_hint = clap::ValueHint::DirPath)]
    pub output: Option<String>,

    /// Extract downloaded archives
    #[arg(short = 'e', long)]
    pub extract: bool,

    /// Move extracted archives to the trash
    #[arg(short = 'd', long, requires = "extract")]
    pub delete: bool,

    /// Also download titles that look similar to something already in the library
    #[arg(short = 'k', long)]
    pub include_similar: bool,

    /// Maximum number of files to download
    #[arg(short = 'n', long, name = "COUNT")]
    pub max_files: Option<usize>,

    /// Only print what would be downloaded
    #[arg(short = 'p', long)]
    pub print: bool,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Generate shell completion
    #[arg(short = 'l', long, name = "SHELL")]
    pub completion: Option<Shell>,

    /// Print verbose output
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = RomDownloadArgs::parse();
    if let Some(ref shell) = args.completion {
        rom_tools::generate_shell_completion(*shell, RomDownloadArgs::command(), true, env!("CARGO_BIN_NAME"))
    } else {
        RomDownload::new(args)?.run().await
    }
}

#[cfg(test)]
mod cli_args_tests {
    use super::*;

    #[test]
    fn empty_by_default() {
        let args = RomDownloadArgs::try_parse_from(["test"]).expect("should parse");
        assert!(args.url.is_none());
        assert!(args.listing.is_none());
        assert!(args.preset.is_none());
        assert!(args.exclusive_countries.is_empty());
        assert!(!args.demos);
        assert!(!args.exclusives);
        assert!(!args.extract);
        assert!(!args.print);
        assert!(!args.verbose);
    }

    #[test]
    fn parses_url_and_preset() {
        let args = RomDownloadArgs::try_parse_from(["test", "https://example.com/files/", "-s", "spanish"])
            .expect("should parse");
        assert_eq!(args.url.as_deref(), Some("https://example.com/files/"));
        assert_eq!(args.preset.as_deref(), Some("spanish"));
    }

    #[test]
    fn parses_custom_selection() {
        let args = RomDownloadArgs::try_parse_from(["test", "-R", "Europe", "-L", "es"]).expect("should parse");
        assert_eq!(args.region.as_deref(), Some("Europe"));
        assert_eq!(args.language.as_deref(), Some("es"));

        let args = RomDownloadArgs::try_parse_from(["test", "--region", "Spain", "--region-only"]).expect("should parse");
        assert!(args.region_only);
    }

    #[test]
    fn preset_conflicts_with_custom_selection() {
        assert!(RomDownloadArgs::try_parse_from(["test", "-s", "english", "-c", "USA"]).is_err());
        assert!(RomDownloadArgs::try_parse_from(["test", "-s", "english", "-R", "Europe"]).is_err());
    }

    #[test]
    fn delete_requires_extract() {
        assert!(RomDownloadArgs::try_parse_from(["test", "-d"]).is_err());
        let args = RomDownloadArgs::try_parse_from(["test", "-ed"]).expect("should parse");
        assert!(args.extract);
        assert!(args.delete);
    }

    #[test]
    fn parses_multiple_exclusive_countries() {
        let args = RomDownloadArgs::try_parse_from(["test", "-E", "-x", "Japan", "-x", "China"]).expect("should parse");
        assert!(args.exclusives);
        assert_eq!(args.exclusive_countries, vec!["Japan", "China"]);
    }

    #[test]
    fn parses_combined_flags() {
        let args = RomDownloadArgs::try_parse_from(["test", "-Dkpyv"]).expect("should parse");
        assert!(args.demos);
        assert!(args.include_similar);
        assert!(args.print);
        assert!(args.yes);
        assert!(args.verbose);
    }

    #[test]
    fn parses_max_files_and_output() {
        let args = RomDownloadArgs::try_parse_from(["test", "-n", "5", "-o", "/tmp/roms"]).expect("should parse");
        assert_eq!(args.max_files, Some(5));
        assert_eq!(args.output.as_deref(), Some("/tmp/roms"));
        assert!(RomDownloadArgs::try_parse_from(["test", "-n", "many"]).is_err());
    }

    #[test]
    fn parses_listing_file_and_title() {
        let args =
            RomDownloadArgs::try_parse_from(["test", "-f", "listing.html", "-t", "zelda"]).expect("should parse");
        assert_eq!(args.listing, Some(PathBuf::from("listing.html")));
        assert_eq!(args.title.as_deref(), Some("zelda"));
    }
}

//! Configuration module for romdl.
//!
//! Handles reading configuration from CLI arguments and the user config file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use rom_tools::catalog::{CustomSelection, ExclusiveDetector, Preset, PriorityPolicy};

use crate::RomDownloadArgs;

/// Default output directory, relative to the current working directory.
const DEFAULT_OUTPUT_DIR: &str = "downloads";

/// User configuration from the config file.
#[derive(Debug, Default, Deserialize)]
pub struct RomDownloadConfig {
    /// Default listing URL.
    #[serde(default)]
    url: Option<String>,
    /// Language preset name.
    #[serde(default)]
    preset: Option<String>,
    /// Exact country filter.
    #[serde(default)]
    country: Option<String>,
    /// Region or continent filter.
    #[serde(default)]
    region: Option<String>,
    /// Required language code.
    #[serde(default)]
    language: Option<String>,
    /// Only accept releases tagged exactly with the region.
    #[serde(default)]
    region_only: bool,
    /// Include demos and other variants.
    #[serde(default)]
    include_demos: bool,
    /// Add exclusive titles from other countries.
    #[serde(default)]
    exclusives: bool,
    /// Countries to accept exclusive titles from.
    #[serde(default)]
    exclusive_countries: Vec<String>,
    /// Output directory.
    #[serde(default)]
    output: Option<String>,
    /// Extract downloaded archives.
    #[serde(default)]
    extract: bool,
    /// Move extracted archives to the trash.
    #[serde(default)]
    delete_archives: bool,
    /// Download titles similar to existing library items.
    #[serde(default)]
    include_similar: bool,
    /// Maximum number of files to download.
    #[serde(default)]
    max_files: Option<usize>,
    /// Only print what would be downloaded.
    #[serde(default)]
    dryrun: bool,
    /// Skip confirmation prompt.
    #[serde(default)]
    yes: bool,
    /// Enable verbose output by default.
    #[serde(default)]
    verbose: bool,
    /// Write a run log file.
    #[serde(default)]
    log: Option<bool>,
}

/// Wrapper needed for parsing the config file section.
#[derive(Debug, Default, Deserialize)]
struct UserConfig {
    #[serde(default)]
    romdl: RomDownloadConfig,
}

/// Where the file listing comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingSource {
    Url(String),
    File(PathBuf),
}

/// Final config combined from CLI arguments and user config file.
#[derive(Debug)]
pub struct Config {
    pub source: ListingSource,
    /// Validated selection policy.
    pub policy: PriorityPolicy,
    /// Exclusive title detection, `None` when disabled.
    pub exclusives: Option<ExclusiveDetector>,
    pub title: Option<String>,
    pub output: PathBuf,
    pub extract: bool,
    pub delete: bool,
    pub include_similar: bool,
    pub max_files: Option<usize>,
    pub dryrun: bool,
    pub yes: bool,
    pub verbose: bool,
    pub log: bool,
}

impl RomDownloadConfig {
    /// Try to read user config from the file if it exists.
    /// Otherwise, fall back to default config.
    ///
    /// # Errors
    /// Returns an error if config file exists but cannot be read or parsed.
    pub fn get_user_config() -> Result<Self> {
        match rom_tools::config::read_user_config_file()? {
            Some(content) => Self::from_toml_str(&content).with_context(|| {
                format!(
                    "Invalid config file {}",
                    rom_tools::config::CONFIG_PATH
                        .as_deref()
                        .map(rom_tools::path_to_string)
                        .unwrap_or_default()
                )
            }),
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns an error if the TOML string is invalid.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str::<UserConfig>(toml_str)
            .map(|config| config.romdl)
            .map_err(|e| anyhow::anyhow!("Failed to parse config: {e}"))
    }

    fn custom_selection(&self) -> CustomSelection {
        CustomSelection {
            country: self.country.clone(),
            region: self.region.clone(),
            language: self.language.clone(),
            region_only: self.region_only,
        }
    }
}

impl Config {
    /// Create config from given command line args and user config file.
    ///
    /// # Errors
    /// Returns an error if the policy settings are invalid or no listing source is given.
    pub fn try_from_args(args: RomDownloadArgs, user_config: RomDownloadConfig) -> Result<Self> {
        let source = match (args.listing, args.url.or_else(|| user_config.url.clone())) {
            (Some(path), _) => ListingSource::File(path),
            (None, Some(url)) => {
                rom_tools::listing::validate_url(&url)?;
                ListingSource::Url(url.trim().to_string())
            }
            (None, None) => anyhow::bail!("No listing URL given. Pass a URL or use --listing with a saved file"),
        };

        let cli_selection = CustomSelection {
            country: args.country,
            region: args.region,
            language: args.language,
            region_only: args.region_only,
        };
        let include_demos = args.demos || user_config.include_demos;
        let policy = Self::build_policy(args.preset.as_deref(), &cli_selection, &user_config)?
            .with_demos(include_demos);

        let exclusive_countries = if args.exclusive_countries.is_empty() {
            user_config.exclusive_countries.clone()
        } else {
            args.exclusive_countries
        };
        let exclusives = if args.exclusives || user_config.exclusives {
            Some(ExclusiveDetector::new(&exclusive_countries)?)
        } else {
            None
        };

        let output = rom_tools::resolve_output_dir(
            args.output.as_deref().or(user_config.output.as_deref()),
            DEFAULT_OUTPUT_DIR,
        )?;

        let extract = args.extract || user_config.extract;
        let delete = extract && (args.delete || user_config.delete_archives);
        let title = args
            .title
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty());

        Ok(Self {
            source,
            policy,
            exclusives,
            title,
            output,
            extract,
            delete,
            include_similar: args.include_similar || user_config.include_similar,
            max_files: args.max_files.or(user_config.max_files).filter(|count| *count > 0),
            dryrun: args.print || user_config.dryrun,
            yes: args.yes || user_config.yes,
            verbose: args.verbose || user_config.verbose,
            log: user_config.log.unwrap_or(true),
        })
    }

    /// Explicit preset first, then a custom selection from the command line,
    /// then the config file preset or custom selection.
    fn build_policy(
        preset: Option<&str>,
        cli_selection: &CustomSelection,
        user_config: &RomDownloadConfig,
    ) -> Result<PriorityPolicy> {
        if let Some(name) = preset {
            return Ok(PriorityPolicy::preset(name.parse::<Preset>()?));
        }
        if !cli_selection.is_empty() {
            return Ok(PriorityPolicy::custom(cli_selection)?);
        }
        if let Some(name) = user_config.preset.as_deref() {
            return Ok(PriorityPolicy::preset(name.parse::<Preset>()?));
        }
        let config_selection = user_config.custom_selection();
        if config_selection.is_empty() {
            Ok(PriorityPolicy::no_filter())
        } else {
            Ok(PriorityPolicy::custom(&config_selection)?)
        }
    }
}

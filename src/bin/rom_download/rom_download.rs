use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use colored::Colorize;

use rom_tools::catalog::{
    CatalogAnalysis, CatalogEvent, CountEntry, EventSink, ExclusiveRejection, ExclusiveSet, FileRecord, LibraryReport,
    MatchClassification, SelectionResult, analyze_catalog, filter_by_title, merge_exclusives, select, total_size,
};
use rom_tools::{print_error, print_warning};

use crate::RomDownloadArgs;
use crate::config::{Config, ListingSource, RomDownloadConfig};
use crate::download::{DownloadResult, Downloader};
use crate::extract::{ExtractResult, extract_and_clean};
use crate::fetch;
use crate::logger::FileLogger;
use crate::scan;
use crate::stats::RunStats;

const MAX_DISCARDED_SHOWN: usize = 20;
const MAX_INVALID_SHOWN: usize = 10;
const MAX_EXCLUSIVES_SHOWN: usize = 15;
const SEPARATOR_WIDTH: usize = 80;

pub struct RomDownload {
    config: Config,
}

/// Prints catalog events when verbose output is enabled.
struct ConsoleSink {
    verbose: bool,
}

impl EventSink for ConsoleSink {
    fn emit(&self, event: &CatalogEvent<'_>) {
        if !self.verbose {
            return;
        }
        match event {
            // Rejections and supersessions are listed in the preview tables
            CatalogEvent::Rejected { .. } | CatalogEvent::Superseded { .. } => {}
            CatalogEvent::ExclusiveRejected {
                title,
                country,
                rejection,
            } => {
                let reason = match rejection {
                    ExclusiveRejection::UtilityTitle { marker } => format!("utility title ({marker})"),
                    ExclusiveRejection::PriorityDuplicate => "already in selection".to_string(),
                    ExclusiveRejection::NumberedSeries { number } => format!("shares number {number} with selection"),
                };
                println!("{}", format!("Exclusive rejected: {title} ({country}): {reason}").dimmed());
            }
            CatalogEvent::CrossCountryDuplicate { title, kept, dropped } => {
                println!(
                    "{}",
                    format!("Exclusive in several countries: {title}, keeping {kept} over {dropped}").dimmed()
                );
            }
            CatalogEvent::CountriesFiltered { allowed, removed } => {
                println!(
                    "{}",
                    format!("Removed {removed} exclusives outside {}", allowed.join(", ")).dimmed()
                );
            }
            CatalogEvent::ExclusiveSkipped {
                record,
                similar_to,
                similarity,
            } => {
                println!(
                    "{}",
                    format!(
                        "Exclusive skipped: {} is similar to {similar_to} ({:.0}%)",
                        record.name,
                        similarity * 100.0
                    )
                    .dimmed()
                );
            }
            CatalogEvent::LibraryMatch { record, classification } => match classification {
                MatchClassification::New => {}
                MatchClassification::ExactMatch { existing } => {
                    println!("{}", format!("Already in library: {} ({existing})", record.name).dimmed());
                }
                MatchClassification::Similar { existing, score, .. } => {
                    println!(
                        "{}",
                        format!("Similar in library: {} ~ {existing} ({:.0}%)", record.name, score * 100.0).dimmed()
                    );
                }
            },
        }
    }
}

impl RomDownload {
    /// Create the workflow from command line arguments and the user config file.
    ///
    /// # Errors
    /// Returns an error if the config file or the given options are invalid.
    pub fn new(args: RomDownloadArgs) -> Result<Self> {
        let user_config = RomDownloadConfig::get_user_config()?;
        let config = Config::try_from_args(args, user_config)?;
        Ok(Self { config })
    }

    pub async fn run(self) -> Result<()> {
        let start = Instant::now();
        let sink = ConsoleSink {
            verbose: self.config.verbose,
        };

        let client = fetch::build_client()?;
        match &self.config.source {
            ListingSource::Url(url) => println!("Fetching listing: {}", url.cyan()),
            ListingSource::File(path) => println!("Reading listing: {}", path.display().to_string().cyan()),
        }
        let mut records = fetch::load_listing(&client, &self.config.source).await?;
        println!("Found {} files", records.len());

        if let Some(title) = &self.config.title {
            records = filter_by_title(&records, title);
            println!("Files matching \"{title}\": {}", records.len());
        }
        if records.is_empty() {
            print_warning!("No files to process");
            return Ok(());
        }

        if self.config.verbose {
            print_analysis(&analyze_catalog(&records));
        }

        let selection = select(&records, &self.config.policy, &sink);
        print_selection(&selection, self.config.policy.name());

        let mut candidates = selection.selected.clone();
        if let Some(detector) = &self.config.exclusives {
            let exclusives = detector.detect(&records, &selection.selected, &sink);
            print_exclusives(&exclusives);
            let merged = merge_exclusives(&selection.selected, &exclusives.records(), &sink);
            if !merged.added.is_empty() || !merged.skipped.is_empty() {
                println!(
                    "Exclusives added: {}, skipped as similar: {}",
                    merged.added.len().to_string().green(),
                    merged.skipped.len()
                );
            }
            candidates = merged.records;
        }

        let library = scan::scan_library(&self.config.output)?;
        let report = library.index().classify_all(&candidates, &sink);
        if !library.is_empty() {
            print_library_report(&report, library.len(), self.config.include_similar);
        }

        let mut downloads = report.downloads(&candidates, self.config.include_similar);
        if let Some(max_files) = self.config.max_files
            && downloads.len() > max_files
        {
            println!("Limiting to the first {max_files} of {} files", downloads.len());
            downloads.truncate(max_files);
        }

        if downloads.is_empty() {
            println!("{}", "Nothing to download".green());
            return Ok(());
        }

        print_download_plan(&downloads);

        if self.config.dryrun {
            return Ok(());
        }
        if !self.config.yes
            && !rom_tools::confirm_with_user(
                &format!("Download {} files to {}?", downloads.len(), self.config.output.display()),
                false,
            )
            .context("Failed to read input")?
        {
            println!("Cancelled");
            return Ok(());
        }

        fs::create_dir_all(&self.config.output)
            .with_context(|| format!("Failed to create output directory {}", self.config.output.display()))?;

        let mut logger = if self.config.log {
            match FileLogger::new() {
                Ok(logger) => Some(logger),
                Err(error) => {
                    print_warning!("Run log disabled: {error:#}");
                    None
                }
            }
        } else {
            None
        };
        if let Some(logger) = &mut logger {
            logger.log_init(&self.config, downloads.len(), total_size(&downloads));
        }

        let mut stats = RunStats::default();
        let archives = self.download_files(&client, &downloads, &mut stats, logger.as_mut()).await;

        if self.config.extract {
            self.extract_archives(&archives, &mut stats, logger.as_mut());
        }

        stats.total_duration = start.elapsed();
        stats.print_summary();
        if let Some(logger) = &mut logger {
            logger.log_stats(&stats);
            if self.config.verbose {
                println!("Log file: {}", logger.path().display());
            }
        }
        Ok(())
    }

    /// Download files in order and return the paths of the archives now on disk.
    async fn download_files(
        &self,
        client: &reqwest::Client,
        downloads: &[FileRecord],
        stats: &mut RunStats,
        mut logger: Option<&mut FileLogger>,
    ) -> Vec<PathBuf> {
        let downloader = Downloader::new(client, &self.config.output, true);
        let width = downloads.len().to_string().len();
        let mut archives = Vec::new();

        for (number, record) in (1..).zip(downloads) {
            let file_index = format!("[{number:>width$}/{}]", downloads.len());
            println!("{} {}", file_index.bold(), record.name);
            if let Some(logger) = logger.as_deref_mut() {
                logger.log_start(record, &file_index);
            }

            let result = downloader.download(record).await;
            match &result {
                DownloadResult::Downloaded { path, bytes, duration } => {
                    if self.config.verbose {
                        println!(
                            "{}",
                            format!(
                                "Downloaded {} in {}",
                                rom_tools::format_size(*bytes),
                                rom_tools::format_duration(*duration)
                            )
                            .green()
                        );
                    }
                    if let Some(logger) = logger.as_deref_mut() {
                        logger.log_success(record, &file_index, *bytes, *duration);
                    }
                    archives.push(path.clone());
                }
                DownloadResult::AlreadyExists { path } => {
                    println!("{}", "Already exists, skipping".yellow());
                    if let Some(logger) = logger.as_deref_mut() {
                        logger.log_skip(record, &file_index);
                    }
                    archives.push(path.clone());
                }
                DownloadResult::Failed { error } => {
                    print_error!("Failed to download {}: {error}", record.name);
                    if let Some(logger) = logger.as_deref_mut() {
                        logger.log_failure(record, &file_index, error);
                    }
                }
            }
            stats.add_download(&result);
        }

        archives
    }

    fn extract_archives(&self, archives: &[PathBuf], stats: &mut RunStats, mut logger: Option<&mut FileLogger>) {
        let archives: Vec<&PathBuf> = archives
            .iter()
            .filter(|path| rom_tools::path_to_file_extension_string(path) == "zip")
            .collect();
        if archives.is_empty() {
            return;
        }

        println!("{}", format!("\nExtracting {} archives", archives.len()).bold());
        for archive in archives {
            let result = extract_and_clean(archive, self.config.delete);
            match &result {
                ExtractResult::Extracted {
                    directory,
                    files,
                    trashed,
                } => {
                    println!(
                        "{} {} ({files} files)",
                        "Extracted".green(),
                        rom_tools::path_to_filename_string(archive)
                    );
                    if let Some(logger) = logger.as_deref_mut() {
                        logger.log_extract(archive, directory, *files, *trashed);
                    }
                }
                ExtractResult::Failed { error } => {
                    print_error!("Failed to extract {}: {error}", archive.display());
                    if let Some(logger) = logger.as_deref_mut() {
                        logger.log_extract_failure(archive, error);
                    }
                }
            }
            stats.add_extract(&result);
        }
    }
}

fn print_separator() {
    println!("{}", "-".repeat(SEPARATOR_WIDTH).cyan());
}

fn print_counts(heading: &str, entries: &BTreeMap<String, CountEntry>) {
    if entries.is_empty() {
        return;
    }
    println!("{}", heading.cyan());
    for (key, entry) in CatalogAnalysis::by_count(entries) {
        println!("  {key:<12} {:>6}  {}", entry.count, entry.examples.join(", ").dimmed());
    }
}

fn print_analysis(analysis: &CatalogAnalysis) {
    println!("{}", format!("\nCatalog contents ({} files)", analysis.total).bold());
    print_separator();
    print_counts("Regions:", &analysis.regions);
    print_counts("Countries:", &analysis.countries);
    print_counts("Languages:", &analysis.languages);
}

fn print_selection(selection: &SelectionResult, policy_name: &str) {
    println!("{}", format!("\nSelection: {policy_name}").bold().magenta());
    print_separator();

    println!(
        "{}",
        format!(
            "Selected: {} files, {}",
            selection.selected.len(),
            rom_tools::format_size(selection.selected_size())
        )
        .green()
        .bold()
    );

    if !selection.discarded.is_empty() {
        println!("{}", format!("\nDiscarded: {}", selection.discarded.len()).yellow().bold());
        for (record, reason) in selection.discarded.iter().take(MAX_DISCARDED_SHOWN) {
            println!("  {}", record.name);
            println!("    {}", reason.to_string().yellow());
        }
        if selection.discarded.len() > MAX_DISCARDED_SHOWN {
            println!(
                "{}",
                format!("  ... and {} more", selection.discarded.len() - MAX_DISCARDED_SHOWN).yellow()
            );
        }
    }

    if !selection.invalid.is_empty() {
        println!("{}", format!("\nInvalid: {}", selection.invalid.len()).red().bold());
        for (record, reason) in selection.invalid.iter().take(MAX_INVALID_SHOWN) {
            println!("  {}", record.name);
            println!("    {}", reason.to_string().red());
        }
        if selection.invalid.len() > MAX_INVALID_SHOWN {
            println!(
                "{}",
                format!("  ... and {} more", selection.invalid.len() - MAX_INVALID_SHOWN).red()
            );
        }
    }
}

fn print_exclusives(exclusives: &ExclusiveSet) {
    if exclusives.is_empty() {
        println!("No exclusive titles found");
        return;
    }
    println!("{}", "\nExclusive titles".bold().magenta());
    print_separator();
    for (country, records) in exclusives.iter() {
        println!("{}", format!("{country} ({})", records.len()).green().bold());
        for record in records.iter().take(MAX_EXCLUSIVES_SHOWN) {
            println!("  {}", record.name);
        }
        if records.len() > MAX_EXCLUSIVES_SHOWN {
            println!(
                "{}",
                format!("  ... and {} more", records.len() - MAX_EXCLUSIVES_SHOWN).yellow()
            );
        }
    }
}

fn print_library_report(report: &LibraryReport, library_size: usize, include_similar: bool) {
    println!("{}", format!("\nLibrary: {library_size} existing items").bold().magenta());
    print_separator();
    println!("New:             {}", report.new.len().to_string().green());
    println!("Already present: {}", report.exact.len());
    println!("Similar:         {}", report.similar.len().to_string().yellow());
    for similar in &report.similar {
        println!(
            "  {} {} {}",
            similar.record.name,
            "~".yellow(),
            similar.existing.dimmed()
        );
        println!(
            "    {}",
            format!(
                "{:.0}% match on: {}",
                similar.score * 100.0,
                similar.matching_keywords.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
            )
            .dimmed()
        );
    }
    if !report.similar.is_empty() && !include_similar {
        println!("{}", "Similar titles are skipped, use --include-similar to download them".dimmed());
    }
}

fn print_download_plan(downloads: &[FileRecord]) {
    println!(
        "{}",
        format!(
            "\nFiles to download: {} ({})",
            downloads.len(),
            rom_tools::format_size(total_size(downloads))
        )
        .bold()
        .green()
    );
    print_separator();
    let width = downloads.len().to_string().len();
    for (number, record) in (1..).zip(downloads) {
        println!(
            "{number:>width$}. {} {}",
            format!("[{:>10}]", rom_tools::format_size(record.size)).green(),
            record.name
        );
    }
}

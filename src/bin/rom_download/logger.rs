use std::fs;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;

use rom_tools::catalog::FileRecord;

use crate::config::{Config, ListingSource};
use crate::stats::RunStats;

/// Simple file logger for download runs with buffered writes
pub struct FileLogger {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl FileLogger {
    /// Create a new file logger, writing to ~/logs/rom-tools/romdl_<timestamp>.log
    pub(crate) fn new() -> Result<Self> {
        let log_dir = rom_tools::config::LOG_DIR
            .as_deref()
            .context("Failed to get home directory")?;
        Self::in_directory(log_dir)
    }

    fn in_directory(log_dir: &Path) -> Result<Self> {
        if !log_dir.exists() {
            fs::create_dir_all(log_dir).context("Failed to create log directory")?;
        }

        let log_path = log_dir.join(format!("romdl_{}.log", Local::now().format("%Y-%m-%d_%H-%M-%S")));

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .with_context(|| format!("Failed to create log file: {}", log_path.display()))?;

        Ok(Self {
            writer: BufWriter::new(file),
            path: log_path,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Log the run settings
    pub(crate) fn log_init(&mut self, config: &Config, file_count: usize, total_size: u64) {
        let source = match &config.source {
            ListingSource::Url(url) => url.clone(),
            ListingSource::File(path) => path.display().to_string(),
        };
        let _ = writeln!(self.writer, "[{}] INIT \"{source}\"", Self::timestamp());
        let _ = writeln!(self.writer, "  policy: {}", config.policy.name());
        let _ = writeln!(self.writer, "  include_demos: {}", config.policy.include_demos());
        if let Some(detector) = &config.exclusives {
            let _ = writeln!(
                self.writer,
                "  exclusives: {}",
                detector
                    .allowed_countries()
                    .map_or_else(|| "all".to_string(), |countries| countries.join(", "))
            );
        }
        if let Some(title) = &config.title {
            let _ = writeln!(self.writer, "  title: {title}");
        }
        let _ = writeln!(self.writer, "  output: {}", config.output.display());
        let _ = writeln!(self.writer, "  extract: {}", config.extract);
        let _ = writeln!(self.writer, "  delete: {}", config.delete);
        let _ = writeln!(self.writer, "  include_similar: {}", config.include_similar);
        if let Some(max_files) = config.max_files {
            let _ = writeln!(self.writer, "  max_files: {max_files}");
        }
        let _ = writeln!(
            self.writer,
            "  files: {file_count} ({})",
            rom_tools::format_size(total_size)
        );
        let _ = self.writer.flush();
    }

    /// Log when starting a download
    pub(crate) fn log_start(&mut self, record: &FileRecord, file_index: &str) {
        let _ = writeln!(
            self.writer,
            "[{}] START   {file_index} - \"{}\" | {}",
            Self::timestamp(),
            record.name,
            record.url
        );
        let _ = self.writer.flush();
    }

    /// Log when a download finishes successfully
    pub(crate) fn log_success(&mut self, record: &FileRecord, file_index: &str, bytes: u64, duration: Duration) {
        let _ = writeln!(
            self.writer,
            "[{}] SUCCESS {file_index} - \"{}\" | {} | Time: {}",
            Self::timestamp(),
            record.name,
            rom_tools::format_size(bytes),
            rom_tools::format_duration(duration)
        );
        let _ = self.writer.flush();
    }

    /// Log when a file already exists
    pub(crate) fn log_skip(&mut self, record: &FileRecord, file_index: &str) {
        let _ = writeln!(
            self.writer,
            "[{}] SKIP    {file_index} - \"{}\" | Already exists",
            Self::timestamp(),
            record.name
        );
        let _ = self.writer.flush();
    }

    /// Log when a download fails
    pub(crate) fn log_failure(&mut self, record: &FileRecord, file_index: &str, error: &str) {
        let _ = writeln!(
            self.writer,
            "[{}] ERROR   {file_index} - \"{}\" | {error}",
            Self::timestamp(),
            record.name
        );
        let _ = self.writer.flush();
    }

    /// Log an archive extraction
    pub(crate) fn log_extract(&mut self, archive: &Path, directory: &Path, files: usize, trashed: bool) {
        let _ = writeln!(
            self.writer,
            "[{}] EXTRACT \"{}\" -> \"{}\" | {files} files{}",
            Self::timestamp(),
            archive.display(),
            directory.display(),
            if trashed { " | archive trashed" } else { "" }
        );
        let _ = self.writer.flush();
    }

    /// Log a failed extraction
    pub(crate) fn log_extract_failure(&mut self, archive: &Path, error: &str) {
        let _ = writeln!(
            self.writer,
            "[{}] ERROR   EXTRACT \"{}\" | {error}",
            Self::timestamp(),
            archive.display()
        );
        let _ = self.writer.flush();
    }

    /// Log final statistics
    pub(crate) fn log_stats(&mut self, stats: &RunStats) {
        let _ = writeln!(self.writer, "[{}] STATISTICS", Self::timestamp());
        let _ = writeln!(self.writer, "  Files downloaded: {}", stats.files_downloaded);
        let _ = writeln!(self.writer, "  Files skipped:    {}", stats.files_skipped);
        let _ = writeln!(self.writer, "  Files failed:     {}", stats.files_failed);
        let _ = writeln!(
            self.writer,
            "  Downloaded size:  {}",
            rom_tools::format_size(stats.bytes_downloaded)
        );
        if stats.archives_extracted > 0 || stats.archives_failed > 0 {
            let _ = writeln!(self.writer, "  Archives extracted: {}", stats.archives_extracted);
            let _ = writeln!(self.writer, "  Archives failed:    {}", stats.archives_failed);
            let _ = writeln!(self.writer, "  Archives trashed:   {}", stats.archives_trashed);
        }
        let _ = writeln!(
            self.writer,
            "  Total time: {}",
            rom_tools::format_duration(stats.total_duration)
        );
        let _ = writeln!(self.writer, "[{}] END", Self::timestamp());
        let _ = self.writer.flush();
    }
}

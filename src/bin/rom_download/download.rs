//! Sequential file downloads with a progress bar.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;

use rom_tools::catalog::FileRecord;

const PROGRESS_BAR_CHARS: &str = "=>-";
const PROGRESS_BAR_TEMPLATE: &str =
    "[{elapsed_precise}] {bar:60.magenta/blue} {bytes}/{total_bytes} {bytes_per_sec} {eta}";

/// Suffix for files that are still being written.
const PARTIAL_SUFFIX: &str = ".part";

/// Outcome of downloading a single file.
#[derive(Debug)]
pub enum DownloadResult {
    Downloaded {
        path: PathBuf,
        bytes: u64,
        duration: Duration,
    },
    AlreadyExists {
        path: PathBuf,
    },
    Failed {
        error: String,
    },
}

/// Downloads records into the output directory one at a time.
pub struct Downloader<'a> {
    client: &'a Client,
    output: &'a Path,
    show_progress: bool,
}

impl<'a> Downloader<'a> {
    pub const fn new(client: &'a Client, output: &'a Path, show_progress: bool) -> Self {
        Self {
            client,
            output,
            show_progress,
        }
    }

    /// Local path for a listing record.
    pub fn destination(&self, record: &FileRecord) -> PathBuf {
        self.output.join(rom_tools::safe_file_name(&record.name))
    }

    /// Download a single record.
    ///
    /// Errors are returned as [`DownloadResult::Failed`] so the caller can continue with the next file.
    pub async fn download(&self, record: &FileRecord) -> DownloadResult {
        let path = self.destination(record);
        if path.exists() {
            return DownloadResult::AlreadyExists { path };
        }

        let partial_path = partial_path(&path);
        let start = Instant::now();
        match self.stream_to_file(record, &partial_path).await {
            Ok(bytes) => match fs::rename(&partial_path, &path) {
                Ok(()) => DownloadResult::Downloaded {
                    path,
                    bytes,
                    duration: start.elapsed(),
                },
                Err(error) => {
                    let _ = fs::remove_file(&partial_path);
                    DownloadResult::Failed {
                        error: format!("Failed to rename {}: {error}", partial_path.display()),
                    }
                }
            },
            Err(error) => {
                let _ = fs::remove_file(&partial_path);
                DownloadResult::Failed {
                    error: format!("{error:#}"),
                }
            }
        }
    }

    async fn stream_to_file(&self, record: &FileRecord, partial_path: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(&record.url)
            .send()
            .await
            .context("Failed to send request")?
            .error_for_status()
            .context("HTTP error")?;

        let expected_size = response.content_length();
        let total_size = expected_size.unwrap_or(record.size);
        let progress_bar = self.progress_bar(total_size)?;

        let file = File::create(partial_path)
            .with_context(|| format!("Failed to create file {}", partial_path.display()))?;
        let mut writer = BufWriter::new(file);
        let mut bytes: u64 = 0;

        while let Some(chunk) = response.chunk().await.context("Error downloading chunk")? {
            writer.write_all(&chunk).context("Failed to write to file")?;
            bytes += chunk.len() as u64;
            progress_bar.inc(chunk.len() as u64);
        }
        writer.flush().context("Failed to write to file")?;
        progress_bar.finish_and_clear();

        if let Some(expected) = expected_size
            && bytes != expected
        {
            anyhow::bail!("Incomplete download: got {bytes} of {expected} bytes");
        }
        Ok(bytes)
    }

    fn progress_bar(&self, total_size: u64) -> Result<ProgressBar> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(total_size);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template(PROGRESS_BAR_TEMPLATE)
                .context("Failed to set progress bar template")?
                .progress_chars(PROGRESS_BAR_CHARS),
        );
        Ok(progress_bar)
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destination_uses_safe_file_name() {
        let client = Client::new();
        let downloader = Downloader::new(&client, Path::new("/roms"), false);
        let record = FileRecord::new("Disk 1/2 (Japan).zip", "https://example.com/x.zip", 0);
        assert_eq!(downloader.destination(&record), PathBuf::from("/roms/Disk 1_2 (Japan).zip"));
    }

    #[test]
    fn partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/roms/Zelda (Spain).zip")),
            PathBuf::from("/roms/Zelda (Spain).zip.part")
        );
    }

    #[tokio::test]
    async fn existing_file_is_not_downloaded() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("Zelda (Spain).zip"), b"data").expect("write");

        let client = Client::new();
        let downloader = Downloader::new(&client, dir.path(), false);
        let record = FileRecord::new("Zelda (Spain).zip", "http://127.0.0.1:9/Zelda.zip", 4);
        let result = downloader.download(&record).await;
        assert!(matches!(result, DownloadResult::AlreadyExists { .. }));
    }

    #[tokio::test]
    async fn failed_download_leaves_no_partial_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let client = Client::new();
        let downloader = Downloader::new(&client, dir.path(), false);
        let record = FileRecord::new("Mario (Europe).zip", "http://127.0.0.1:9/Mario.zip", 4);
        let result = downloader.download(&record).await;
        assert!(matches!(result, DownloadResult::Failed { .. }));
        assert!(!dir.path().join("Mario (Europe).zip.part").exists());
        assert!(!dir.path().join("Mario (Europe).zip").exists());
    }
}

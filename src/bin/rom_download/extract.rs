//! Zip archive extraction.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use zip::ZipArchive;

/// Outcome of extracting a single archive.
#[derive(Debug)]
pub enum ExtractResult {
    Extracted {
        directory: PathBuf,
        files: usize,
        trashed: bool,
    },
    Failed {
        error: String,
    },
}

/// Extract an archive next to itself and optionally move it to the trash afterwards.
pub fn extract_and_clean(archive_path: &Path, delete: bool) -> ExtractResult {
    match extract_archive(archive_path) {
        Ok((directory, files)) => {
            let trashed = delete && move_to_trash(archive_path);
            ExtractResult::Extracted {
                directory,
                files,
                trashed,
            }
        }
        Err(error) => ExtractResult::Failed {
            error: format!("{error:#}"),
        },
    }
}

/// Extract all entries into a directory named after the archive stem.
///
/// Entries whose path would leave the target directory are skipped.
/// Returns the target directory and the number of extracted files.
///
/// # Errors
/// Returns an error if the archive cannot be opened or an entry cannot be written.
pub fn extract_archive(archive_path: &Path) -> Result<(PathBuf, usize)> {
    let file =
        File::open(archive_path).with_context(|| format!("Failed to open archive {}", archive_path.display()))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).context("Failed to open ZIP archive")?;

    let target_dir = extract_directory(archive_path)?;
    fs::create_dir_all(&target_dir)
        .with_context(|| format!("Failed to create directory {}", target_dir.display()))?;

    let mut files = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).context("Failed to read ZIP entry")?;
        let Some(relative_path) = entry.enclosed_name() else {
            rom_tools::print_warning!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        let output_path = target_dir.join(relative_path);

        if entry.is_dir() {
            fs::create_dir_all(&output_path)
                .with_context(|| format!("Failed to create directory {}", output_path.display()))?;
            continue;
        }
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let mut output_file = File::create(&output_path)
            .with_context(|| format!("Failed to create file {}", output_path.display()))?;
        io::copy(&mut entry, &mut output_file)
            .with_context(|| format!("Failed to extract {}", output_path.display()))?;
        files += 1;
    }

    Ok((target_dir, files))
}

fn extract_directory(archive_path: &Path) -> Result<PathBuf> {
    let stem = rom_tools::path_to_file_stem_string(archive_path);
    if stem.is_empty() {
        anyhow::bail!("Invalid archive name: {}", archive_path.display());
    }
    let parent = archive_path.parent().unwrap_or_else(|| Path::new("."));
    Ok(parent.join(stem))
}

fn move_to_trash(path: &Path) -> bool {
    match trash::delete(path) {
        Ok(()) => true,
        Err(error) => {
            rom_tools::print_error!("Failed to move archive to trash {}: {error}", path.display());
            false
        }
    }
}

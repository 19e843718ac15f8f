//! Read the existing library from the output directory.

use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use rom_tools::catalog::LibraryIndex;

/// Archive names and directory names directly under the output directory.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LibraryListing {
    pub archives: Vec<String>,
    pub directories: Vec<String>,
}

impl LibraryListing {
    pub fn index(&self) -> LibraryIndex {
        LibraryIndex::new(&self.archives, &self.directories)
    }

    pub const fn len(&self) -> usize {
        self.archives.len() + self.directories.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.archives.is_empty() && self.directories.is_empty()
    }
}

/// List the top level of the output directory.
///
/// Hidden entries and files other than zip archives are ignored.
/// A missing directory is an empty library.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn scan_library(directory: &Path) -> Result<LibraryListing> {
    let mut listing = LibraryListing::default();
    if !directory.exists() {
        return Ok(listing);
    }

    for entry in WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !rom_tools::is_hidden(entry))
    {
        let entry = entry.with_context(|| format!("Failed to read library directory {}", directory.display()))?;
        let path = entry.path();
        let name = rom_tools::get_normalized_entry_name(path)?;
        if entry.file_type().is_dir() {
            listing.directories.push(name);
        } else if entry.file_type().is_file() && rom_tools::path_to_file_extension_string(path) == "zip" {
            listing.archives.push(name);
        }
    }

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn lists_archives_and_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("Zelda (Spain).zip"), b"").expect("write");
        fs::write(dir.path().join("Mario (Europe).ZIP"), b"").expect("write");
        fs::write(dir.path().join("notes.txt"), b"").expect("write");
        fs::write(dir.path().join(".hidden.zip"), b"").expect("write");
        fs::create_dir(dir.path().join("Metroid (Europe)")).expect("create dir");
        fs::create_dir(dir.path().join(".cache")).expect("create dir");
        fs::create_dir_all(dir.path().join("Metroid (Europe)").join("Inner (USA)")).expect("create dir");

        let listing = scan_library(dir.path()).expect("should scan");
        assert_eq!(listing.archives, vec!["Mario (Europe).ZIP", "Zelda (Spain).zip"]);
        assert_eq!(listing.directories, vec!["Metroid (Europe)"]);
        assert_eq!(listing.len(), 3);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().expect("temp dir");
        let listing = scan_library(&dir.path().join("missing")).expect("should scan");
        assert_eq!(listing, LibraryListing::default());
        assert!(listing.index().is_empty());
    }

    #[test]
    fn nfd_names_are_normalized() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("Pok\u{e9}mon (Spain).zip"), b"").expect("write");
        fs::create_dir(dir.path().join("Cafe\u{301} (France)")).expect("create dir");

        let listing = scan_library(dir.path()).expect("should scan");
        assert_eq!(listing.archives, vec!["Pok\u{e9}mon (Spain).zip"]);
        assert_eq!(listing.directories, vec!["Caf\u{e9} (France)"]);
    }
}

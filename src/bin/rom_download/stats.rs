use std::time::Duration;

use colored::Colorize;

use crate::download::DownloadResult;
use crate::extract::ExtractResult;

/// Statistics for the download run
#[derive(Debug, Default)]
pub struct RunStats {
    pub(crate) files_downloaded: usize,
    pub(crate) files_skipped: usize,
    pub(crate) files_failed: usize,
    pub(crate) bytes_downloaded: u64,
    pub(crate) archives_extracted: usize,
    pub(crate) archives_failed: usize,
    pub(crate) files_extracted: usize,
    pub(crate) archives_trashed: usize,
    pub(crate) total_duration: Duration,
}

impl RunStats {
    pub(crate) const fn add_download(&mut self, result: &DownloadResult) {
        match result {
            DownloadResult::Downloaded { bytes, .. } => {
                self.files_downloaded += 1;
                self.bytes_downloaded += *bytes;
            }
            DownloadResult::AlreadyExists { .. } => self.files_skipped += 1,
            DownloadResult::Failed { .. } => self.files_failed += 1,
        }
    }

    pub(crate) const fn add_extract(&mut self, result: &ExtractResult) {
        match result {
            ExtractResult::Extracted { files, trashed, .. } => {
                self.archives_extracted += 1;
                self.files_extracted += *files;
                if *trashed {
                    self.archives_trashed += 1;
                }
            }
            ExtractResult::Failed { .. } => self.archives_failed += 1,
        }
    }

    pub(crate) const fn total_files(&self) -> usize {
        self.files_downloaded + self.files_skipped + self.files_failed
    }

    pub(crate) fn print_summary(&self) {
        println!("{}", "\n--- Download Summary ---".bold().magenta());
        println!("Files downloaded:       {}", self.files_downloaded);
        println!("Files already present:  {}", self.files_skipped);
        println!(
            "Files failed:           {}",
            if self.files_failed > 0 {
                self.files_failed.to_string().red()
            } else {
                "0".normal()
            }
        );
        println!("Downloaded size:        {}", rom_tools::format_size(self.bytes_downloaded));

        if self.archives_extracted > 0 || self.archives_failed > 0 {
            println!();
            println!("Archives extracted:     {}", self.archives_extracted);
            println!("Files extracted:        {}", self.files_extracted);
            println!(
                "Extraction failures:    {}",
                if self.archives_failed > 0 {
                    self.archives_failed.to_string().red()
                } else {
                    "0".normal()
                }
            );
            if self.archives_trashed > 0 {
                println!("Archives trashed:       {}", self.archives_trashed);
            }
        }
        println!();

        println!(
            "Total time:             {}",
            rom_tools::format_duration(self.total_duration)
        );
    }
}

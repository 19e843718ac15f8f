//! Title deduplication and priority selection for ROM archive listings.
//!
//! Everything in this module is pure, synchronous computation over in-memory
//! lists: no network, no filesystem and no printing. Progress is reported through
//! an [`EventSink`].
//!
//! ```rust
//! use rom_tools::catalog::{FileRecord, PriorityPolicy, Preset, select};
//!
//! let records: Vec<FileRecord> = ["Zelda (Spain).zip", "Zelda (Europe) (En,Es).zip", "Zelda (Japan).zip"]
//!     .into_iter()
//!     .map(|name| FileRecord::new(name, format!("https://example.com/{name}"), 0))
//!     .collect();
//!
//! let result = select(&records, &PriorityPolicy::preset(Preset::Spanish), &());
//! assert_eq!(result.selected[0].name, "Zelda (Spain).zip");
//! assert_eq!(result.discarded.len(), 2);
//! ```

pub mod analysis;
pub mod error;
pub mod events;
pub mod exclusive;
pub mod keywords;
pub mod library;
pub mod parse;
pub mod patterns;
pub mod policy;
pub mod record;
pub mod select;

pub use analysis::{CatalogAnalysis, CountEntry, analyze_catalog};
pub use error::PolicyError;
pub use events::{CatalogEvent, EventSink, ExclusiveRejection};
pub use exclusive::{ExclusiveDetector, ExclusiveSet, MergeOutcome, merge_exclusives};
pub use keywords::{Fingerprint, extract_keywords};
pub use library::{LibraryIndex, LibraryReport, MatchClassification, SimilarMatch, classify_candidates};
pub use parse::{ParsedMetadata, Region, parse};
pub use policy::{Classification, CustomSelection, FilterMode, InvalidReason, Preset, PriorityPolicy};
pub use record::{FileRecord, filter_by_title, total_size};
pub use select::{DiscardReason, SelectionResult, TitleGroup, select};

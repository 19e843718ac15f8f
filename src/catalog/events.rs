//! Structured progress events emitted by the catalog components.
//!
//! The catalog never prints. Callers pass an [`EventSink`] and decide how to present events.

use crate::catalog::library::MatchClassification;
use crate::catalog::policy::InvalidReason;
use crate::catalog::record::FileRecord;
use crate::catalog::select::DiscardReason;

/// Something the catalog decided about a record or title.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent<'a> {
    /// A record failed the active filter.
    Rejected {
        record: &'a FileRecord,
        reason: &'a InvalidReason,
    },
    /// A valid record lost to a better release of the same title.
    Superseded {
        record: &'a FileRecord,
        reason: &'a DiscardReason,
    },
    /// A candidate exclusive title was dropped.
    ExclusiveRejected {
        title: &'a str,
        country: &'a str,
        rejection: ExclusiveRejection,
    },
    /// The same exclusive exists in several countries, the preferred country was kept.
    CrossCountryDuplicate {
        title: &'a str,
        kept: &'a str,
        dropped: &'a str,
    },
    /// Exclusives outside the allowed countries were removed.
    CountriesFiltered { allowed: &'a [String], removed: usize },
    /// A chosen exclusive is too similar to a selected title.
    ExclusiveSkipped {
        record: &'a FileRecord,
        similar_to: &'a str,
        similarity: f64,
    },
    /// A candidate already exists in the local library.
    LibraryMatch {
        record: &'a FileRecord,
        classification: &'a MatchClassification,
    },
}

/// Why a candidate exclusive title was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusiveRejection {
    /// Title looks like a demo, cheat device or other utility.
    UtilityTitle { marker: &'static str },
    /// Same fingerprint as a title in the priority selection.
    PriorityDuplicate,
    /// Shares a number with a title in the priority selection.
    NumberedSeries { number: String },
}

/// Receiver for catalog events.
pub trait EventSink {
    fn emit(&self, event: &CatalogEvent<'_>);
}

/// Discards every event.
impl EventSink for () {
    fn emit(&self, _event: &CatalogEvent<'_>) {}
}

impl<F> EventSink for F
where
    F: Fn(&CatalogEvent<'_>),
{
    fn emit(&self, event: &CatalogEvent<'_>) {
        self(event);
    }
}

//! Snapshot workflow
//!
//! Countries are processed strictly one at a time:
//! 1. Resolve every field through its strategy chain (`resolvers`)
//! 2. Sticky-merge staleness-tolerant fields against the previous snapshot
//! 3. Score the record
//! 4. After the last country, write the snapshot once
//!
//! Per-country failures never abort the run; only storage and setup
//! failures are fatal.

pub mod pipeline;
pub mod storage;

use chrono::{Datelike, NaiveDate};

pub use pipeline::{Pipeline, PipelineConfig, Sources};

/// Run-wide dates, computed once and passed explicitly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunContext {
    /// Date the run treats as "now" for upcoming/past election splits
    pub today: NaiveDate,
    /// Report year for the freedom rating window
    pub reference_year: i32,
}

impl RunContext {
    /// Reference year defaults to the year before `today`
    pub fn new(today: NaiveDate, reference_year: Option<i32>) -> Self {
        Self {
            today,
            reference_year: reference_year.unwrap_or(today.year() - 1),
        }
    }
}

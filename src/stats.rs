//! # Statistics Module
//!
//! Questo modulo aggrega le dimensioni prima/dopo di tutti i job di un batch.
//!
//! ## Regole:
//! - `total_before`: somma di `bytes_before`
//! - `total_after`: somma delle dimensioni effettive (artifact se presente e > 0,
//!   altrimenti la dimensione originale)
//! - `percent_saved`: (after - before) / before * 100, negativo = riduzione
//! - Batch vuoto o file tutti a zero byte: 0%
//! - Megabyte decimali (1 MB = 1.000.000 byte)
//!
//! ## Esempio:
//! ```rust,ignore
//! let summary = summarize(&jobs);
//! println!("{}", summary); // Reduced 3.00 MB to 2.40 MB (-20.0%)
//! ```

use serde::Serialize;
use std::fmt;

use crate::job::{CompressionJob, JobOutcome};

const BYTES_PER_MB: f64 = 1_000_000.0;

/// Aggregate result of a batch
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    pub files: usize,
    pub files_reduced: usize,
    pub files_failed: usize,
    pub files_cancelled: usize,
    pub total_before: u64,
    pub total_after: u64,
    pub percent_saved: f64,
}

impl BatchSummary {
    pub fn mb_before(&self) -> f64 {
        to_megabytes(self.total_before)
    }

    pub fn mb_after(&self) -> f64 {
        to_megabytes(self.total_after)
    }

    pub fn bytes_saved(&self) -> u64 {
        self.total_before.saturating_sub(self.total_after)
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reduced {:.2} MB to {:.2} MB ({:+.1}%)",
            self.mb_before(),
            self.mb_after(),
            self.percent_saved
        )
    }
}

/// Convert bytes to decimal megabytes
pub fn to_megabytes(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Percentage change from `before` to `after`; zero when there is nothing to compare
pub fn percent_change(before: u64, after: u64) -> f64 {
    if before == 0 {
        0.0
    } else {
        (after as f64 - before as f64) / before as f64 * 100.0
    }
}

/// Sum sizes across jobs and compute the savings
pub fn summarize(jobs: &[CompressionJob]) -> BatchSummary {
    let mut summary = BatchSummary {
        files: jobs.len(),
        ..Default::default()
    };

    for job in jobs {
        summary.total_before += job.bytes_before();
        summary.total_after += job.effective_size();

        if job.effective_size() < job.bytes_before() {
            summary.files_reduced += 1;
        }
        if job.is_failure() {
            summary.files_failed += 1;
        }
        if job.outcome() == &JobOutcome::Cancelled {
            summary.files_cancelled += 1;
        }
    }

    summary.percent_saved = percent_change(summary.total_before, summary.total_after);
    summary
}

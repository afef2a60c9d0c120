//! # Compression Job
//!
//! One file's trip through the external tool: its size before, the size of
//! the artifact the tool left behind (if any), and how the run ended.

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::MinifyError;

/// How a job's tool run ended
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum JobOutcome {
    /// Not run yet
    #[default]
    Pending,
    /// The tool ran and exited (whatever its exit code)
    Completed,
    /// The tool could not be launched or awaited
    Failed(String),
    /// The tool was killed after exceeding the per-file timeout
    TimedOut,
    /// The batch was cancelled before or while this job ran
    Cancelled,
}

/// Result of running the tool on a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskReport {
    pub exit_code: Option<i32>,
    pub bytes_after: Option<u64>,
    pub outcome: JobOutcome,
}

impl TaskReport {
    pub fn completed(exit_code: Option<i32>, bytes_after: Option<u64>) -> Self {
        Self {
            exit_code,
            bytes_after,
            outcome: JobOutcome::Completed,
        }
    }

    pub fn aborted(outcome: JobOutcome) -> Self {
        Self {
            exit_code: None,
            bytes_after: None,
            outcome,
        }
    }
}

/// A single file to minify
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressionJob {
    source_path: PathBuf,
    bytes_before: u64,
    bytes_after: Option<u64>,
    exit_code: Option<i32>,
    outcome: JobOutcome,
}

impl CompressionJob {
    pub fn new(source_path: impl Into<PathBuf>, bytes_before: u64) -> Self {
        Self {
            source_path: source_path.into(),
            bytes_before,
            bytes_after: None,
            exit_code: None,
            outcome: JobOutcome::Pending,
        }
    }

    /// Create a job, reading the current size of the source file
    pub async fn from_path(path: &Path) -> Result<Self, MinifyError> {
        let metadata = tokio::fs::metadata(path).await?;
        Ok(Self::new(path, metadata.len()))
    }

    /// Create jobs for every readable path, keeping the input order.
    ///
    /// Paths that cannot be stat'ed are skipped with a warning.
    pub async fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Vec<Self> {
        let mut jobs = Vec::with_capacity(paths.len());
        for path in paths {
            match Self::from_path(path.as_ref()).await {
                Ok(job) => jobs.push(job),
                Err(e) => warn!("Skipping {}: {}", path.as_ref().display(), e),
            }
        }
        jobs
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn bytes_before(&self) -> u64 {
        self.bytes_before
    }

    pub fn bytes_after(&self) -> Option<u64> {
        self.bytes_after
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn outcome(&self) -> &JobOutcome {
        &self.outcome
    }

    pub fn is_done(&self) -> bool {
        self.outcome != JobOutcome::Pending
    }

    /// Size this file counts for once the batch is over.
    ///
    /// A missing or zero-sized artifact counts as "unchanged", never as zero.
    pub fn effective_size(&self) -> u64 {
        match self.bytes_after {
            Some(after) if after > 0 => after,
            _ => self.bytes_before,
        }
    }

    /// Whether the file counts as a per-file failure
    pub fn is_failure(&self) -> bool {
        match self.outcome {
            JobOutcome::Completed => self.exit_code != Some(0),
            JobOutcome::Failed(_) | JobOutcome::TimedOut => true,
            JobOutcome::Pending | JobOutcome::Cancelled => false,
        }
    }

    /// Record the result of the tool run. Only the first report is kept.
    pub fn complete(&mut self, report: TaskReport) {
        if self.is_done() {
            warn!("Ignoring second result for {}", self.source_path.display());
            return;
        }
        self.exit_code = report.exit_code;
        self.bytes_after = report.bytes_after;
        self.outcome = report.outcome;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_size() {
        let mut job = CompressionJob::new("a.png", 1000);
        assert_eq!(job.effective_size(), 1000);

        job.complete(TaskReport::completed(Some(0), Some(400)));
        assert_eq!(job.effective_size(), 400);
        assert_eq!(job.exit_code(), Some(0));
        assert!(!job.is_failure());
    }

    #[test]
    fn test_zero_sized_artifact_counts_as_unchanged() {
        let mut job = CompressionJob::new("a.png", 1000);
        job.complete(TaskReport::completed(Some(0), Some(0)));
        assert_eq!(job.effective_size(), 1000);
    }

    #[test]
    fn test_complete_only_once() {
        let mut job = CompressionJob::new("a.png", 1000);
        job.complete(TaskReport::completed(Some(99), None));
        job.complete(TaskReport::completed(Some(0), Some(10)));

        assert_eq!(job.exit_code(), Some(99));
        assert_eq!(job.bytes_after(), None);
        assert!(job.is_failure());
    }

    #[test]
    fn test_failure_classification() {
        let mut cancelled = CompressionJob::new("a.png", 10);
        cancelled.complete(TaskReport::aborted(JobOutcome::Cancelled));
        assert!(!cancelled.is_failure());

        let mut timed_out = CompressionJob::new("b.png", 10);
        timed_out.complete(TaskReport::aborted(JobOutcome::TimedOut));
        assert!(timed_out.is_failure());

        assert!(!CompressionJob::new("c.png", 10).is_failure());
    }

    #[tokio::test]
    async fn test_from_paths_reads_sizes_and_skips_missing() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let a = temp_dir.path().join("a.png");
        let b = temp_dir.path().join("b.png");
        std::fs::write(&a, vec![0u8; 1000]).unwrap();
        std::fs::write(&b, vec![0u8; 2000]).unwrap();
        let missing = temp_dir.path().join("missing.png");

        let jobs = CompressionJob::from_paths(&[a.clone(), missing, b.clone()]).await;

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].source_path(), a.as_path());
        assert_eq!(jobs[0].bytes_before(), 1000);
        assert_eq!(jobs[1].source_path(), b.as_path());
        assert_eq!(jobs[1].bytes_before(), 2000);
        assert_eq!(jobs[1].outcome(), &JobOutcome::Pending);
    }
}

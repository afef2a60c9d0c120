//! # Batch Runner Main Orchestrator
//!
//! Orchestratore del batch: guida una lista ordinata di job attraverso il tool
//! esterno, un processo per file.
//!
//! ## Modalità:
//! - **Sequenziale** (`workers == 1`, default): un solo processo alla volta; tutte
//!   le righe del file N, incluso il marker di fine, precedono quelle del file N+1
//! - **Pool limitato** (`workers > 1`): fino a `workers` processi in parallelo
//!   limitati da un `Semaphore`; le righe si alternano in ordine di completamento e
//!   restano attribuibili tramite `LogLine::source`
//!
//! ## Errori:
//! - Path del tool vuoto o qualità fuori range: il batch non parte
//! - Batch già in corso: `MinifyError::AlreadyRunning`
//! - Errori per singolo file: finiscono nel log e nelle statistiche, il batch continua
//!
//! ## Cancellazione:
//! `Canceller::cancel()` termina il processo in corso e salta i job rimanenti;
//! i job già completati mantengono le loro statistiche.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::config::{Config, DEFAULT_ARTIFACT_SUFFIX};
use crate::error::MinifyError;
use crate::job::{CompressionJob, JobOutcome, TaskReport};
use crate::log::OutputSink;
use crate::runner::task_runner::TaskRunner;
use crate::stats::{summarize, BatchSummary};

/// Options that stay fixed across batches
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub artifact_suffix: String,
    pub skip_if_larger: bool,
    pub workers: usize,
    pub timeout: Option<Duration>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
            skip_if_larger: true,
            workers: 1,
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl From<&Config> for RunnerOptions {
    fn from(config: &Config) -> Self {
        Self {
            artifact_suffix: config.artifact_suffix.clone(),
            skip_if_larger: config.skip_if_larger,
            workers: config.workers.max(1),
            timeout: (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs)),
        }
    }
}

/// Handle that stops a running batch
#[derive(Debug, Clone)]
pub struct Canceller {
    cancelled: Arc<AtomicBool>,
    stop_sender: broadcast::Sender<()>,
}

impl Canceller {
    fn new() -> Self {
        let (stop_sender, _) = broadcast::channel(16);
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            stop_sender,
        }
    }

    /// Kill the in-flight tool process and skip the remaining jobs
    pub fn cancel(&self) {
        info!("Cancelling batch");
        self.cancelled.store(true, Ordering::SeqCst);
        // No receivers just means nothing is running
        let _ = self.stop_sender.send(());
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    fn subscribe(&self) -> broadcast::Receiver<()> {
        self.stop_sender.subscribe()
    }
}

/// Clears the running flag and any pending cancel when the batch ends, however it ends
struct RunningGuard {
    flag: Arc<AtomicBool>,
    canceller: Canceller,
}

impl RunningGuard {
    fn acquire(flag: &Arc<AtomicBool>, canceller: &Canceller) -> Result<Self, MinifyError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| MinifyError::AlreadyRunning)?;
        Ok(Self {
            flag: flag.clone(),
            canceller: canceller.clone(),
        })
    }
}

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.canceller.reset();
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Aborts pool workers still alive when the batch future goes away
struct WorkerHandles(Vec<JoinHandle<TaskReport>>);

impl Drop for WorkerHandles {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

/// Drives batches of compression jobs through the external tool
pub struct BatchRunner {
    options: RunnerOptions,
    running: Arc<AtomicBool>,
    canceller: Canceller,
}

impl BatchRunner {
    pub fn new(options: RunnerOptions) -> Self {
        Self {
            options,
            running: Arc::new(AtomicBool::new(false)),
            canceller: Canceller::new(),
        }
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// True while a batch is in progress
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn canceller(&self) -> Canceller {
        self.canceller.clone()
    }

    /// Run the tool over every job and return the aggregate summary.
    ///
    /// Fails only if the batch cannot start; per-file problems are written to
    /// `sink` and recorded on the jobs.
    pub async fn run(
        &self,
        tool_path: &Path,
        jobs: &mut [CompressionJob],
        quality: u8,
        sink: Arc<dyn OutputSink>,
    ) -> Result<BatchSummary, MinifyError> {
        if tool_path.as_os_str().is_empty() {
            return Err(MinifyError::Configuration("Path is blank!".to_string()));
        }
        if quality > 100 {
            return Err(MinifyError::Configuration(format!(
                "Quality must be between 0 and 100, got {}",
                quality
            )));
        }

        // A cancel issued before this point still applies to this batch
        let _running = RunningGuard::acquire(&self.running, &self.canceller)?;

        let task = TaskRunner::new(
            tool_path.to_path_buf(),
            quality,
            self.options.artifact_suffix.clone(),
            self.options.skip_if_larger,
            self.options.timeout,
        );

        info!(
            "Running {} on {} files (quality {}, {} workers)",
            tool_path.display(),
            jobs.len(),
            quality,
            self.options.workers
        );

        if self.options.workers > 1 && jobs.len() > 1 {
            self.run_concurrent(&task, jobs, sink).await;
        } else {
            self.run_sequential(&task, jobs, sink.as_ref()).await;
        }

        let summary = summarize(jobs);
        info!("{}", summary);
        Ok(summary)
    }

    /// One process at a time, in input order
    async fn run_sequential(&self, task: &TaskRunner, jobs: &mut [CompressionJob], sink: &dyn OutputSink) {
        let mut stop = self.canceller.subscribe();

        for job in jobs.iter_mut() {
            if self.canceller.is_cancelled() {
                job.complete(TaskReport::aborted(JobOutcome::Cancelled));
                continue;
            }
            let report = task.run(job.source_path(), sink, Some(&mut stop)).await;
            job.complete(report);
        }
    }

    /// Up to `workers` processes at once; results are written back by index
    async fn run_concurrent(&self, task: &TaskRunner, jobs: &mut [CompressionJob], sink: Arc<dyn OutputSink>) {
        let permits = self.options.workers.min(jobs.len()).min(Semaphore::MAX_PERMITS);
        let semaphore = Arc::new(Semaphore::new(permits));
        let mut handles = WorkerHandles(Vec::with_capacity(jobs.len()));

        for job in jobs.iter() {
            let source = job.source_path().to_path_buf();
            let task = task.clone();
            let sink = sink.clone();
            let semaphore = semaphore.clone();
            let canceller = self.canceller.clone();
            let mut stop = self.canceller.subscribe();

            handles.0.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return TaskReport::aborted(JobOutcome::Cancelled),
                };
                if canceller.is_cancelled() {
                    return TaskReport::aborted(JobOutcome::Cancelled);
                }
                task.run(&source, sink.as_ref(), Some(&mut stop)).await
            }));
        }

        let reports = futures::future::join_all(handles.0.iter_mut()).await;

        for (job, report) in jobs.iter_mut().zip(reports) {
            match report {
                Ok(report) => job.complete(report),
                Err(e) => {
                    error!("Worker for {} panicked: {}", job.source_path().display(), e);
                    job.complete(TaskReport::aborted(JobOutcome::Failed(e.to_string())));
                }
            }
        }
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::new(RunnerOptions::default())
    }
}

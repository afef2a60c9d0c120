//! # PNG Minify Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Verifica che il binario pngquant configurato sia compatibile
//! - Esegue pngquant su una lista ordinata di PNG, un processo per file
//! - Inoltra l'output del tool a un sink fornito dall'host
//! - Calcola le statistiche di riduzione del batch
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom
//! - `tool_verifier`: Controllo presenza e versione del tool
//! - `job`: Stato di un singolo file del batch
//! - `log`: Righe di log e sink
//! - `runner`: Orchestratore del batch e worker per singolo file
//! - `stats`: Aggregazione delle dimensioni e percentuale risparmiata
//! - `file_manager`: Discovery dei PNG (lato host)
//! - `json_output`: Eventi JSON per host programmatici
//! - `progress`: Progress bar per la CLI
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use png_minify::{BatchRunner, CompressionJob, SharedLog, ToolVerifier};
//!
//! let tool = ToolVerifier::default().check(Some(&tool_path))?;
//! let mut jobs = CompressionJob::from_paths(&files).await;
//! let log = SharedLog::new();
//! let summary = BatchRunner::default().run(&tool, &mut jobs, 80, Arc::new(log.clone())).await?;
//! println!("{}", summary);
//! ```

pub mod config;
pub mod error;
pub mod file_manager;
pub mod job;
pub mod json_output;
pub mod log;
pub mod progress;
pub mod runner;
pub mod stats;
pub mod tool_verifier;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::Config;
pub use error::MinifyError;
pub use job::{CompressionJob, JobOutcome};
pub use log::{LogKind, LogLine, OutputSink, SharedLog};
pub use runner::{BatchRunner, Canceller, RunnerOptions};
pub use stats::{summarize, BatchSummary};
pub use tool_verifier::ToolVerifier;

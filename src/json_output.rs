//! # JSON Output Module
//!
//! Questo modulo gestisce l'output strutturato in JSON per host programmatici
//! (editor, script) che leggono lo stdout del processo.
//!
//! ## Responsabilità:
//! - Emette un messaggio JSON per riga per ogni evento del batch
//! - Converte le `LogLine` del runner in eventi tipizzati tramite `JsonSink`
//! - Riporta dimensioni per file e riepilogo finale
//!
//! ## Tipi di messaggi:
//! - `start`: Inizio del batch
//! - `file_start`: Il tool è stato avviato su un file
//! - `output`: Una riga scritta dal tool su stdout o stderr
//! - `file_failed`: Il file non è stato elaborato (avvio fallito, timeout, cancellazione)
//! - `file_finished`: Il tool è terminato
//! - `file_result`: Dimensioni prima/dopo di un file
//! - `complete`: Fine del batch con statistiche finali
//! - `error`: Errore che impedisce l'avvio del batch

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::job::CompressionJob;
use crate::log::{LogKind, LogLine, OutputSink};
use crate::stats::{percent_change, BatchSummary};

/// Stream a tool output line came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stream {
    Stdout,
    Stderr,
}

/// Tipo di messaggio JSON
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// Inizio del batch
    Start {
        tool_path: PathBuf,
        total_files: usize,
        quality: u8,
        workers: usize,
    },

    /// Il tool è stato avviato su un file
    FileStart { path: PathBuf },

    /// Riga prodotta dal tool
    Output {
        path: PathBuf,
        stream: Stream,
        line: String,
    },

    /// Il file non è stato elaborato
    FileFailed { path: PathBuf, reason: String },

    /// Il tool è terminato
    FileFinished { path: PathBuf, exit_code: Option<i32> },

    /// Dimensioni di un file a fine batch
    FileResult {
        path: PathBuf,
        bytes_before: u64,
        bytes_after: Option<u64>,
        exit_code: Option<i32>,
        percent_saved: f64,
    },

    /// Batch completato
    Complete {
        files: usize,
        files_reduced: usize,
        files_failed: usize,
        files_cancelled: usize,
        total_before: u64,
        total_after: u64,
        percent_saved: f64,
        duration_seconds: f64,
    },

    /// Errore generale
    Error {
        message: String,
        details: Option<String>,
    },
}

impl JsonMessage {
    /// Emette il messaggio JSON su stdout
    pub fn emit(&self) {
        if let Ok(json) = serde_json::to_string(self) {
            println!("{}", json);
        }
    }

    pub fn start(tool_path: PathBuf, total_files: usize, quality: u8, workers: usize) -> Self {
        Self::Start {
            tool_path,
            total_files,
            quality,
            workers,
        }
    }

    pub fn file_result(job: &CompressionJob) -> Self {
        Self::FileResult {
            path: job.source_path().to_path_buf(),
            bytes_before: job.bytes_before(),
            bytes_after: job.bytes_after(),
            exit_code: job.exit_code(),
            percent_saved: percent_change(job.bytes_before(), job.effective_size()),
        }
    }

    pub fn complete(summary: &BatchSummary, duration_seconds: f64) -> Self {
        Self::Complete {
            files: summary.files,
            files_reduced: summary.files_reduced,
            files_failed: summary.files_failed,
            files_cancelled: summary.files_cancelled,
            total_before: summary.total_before,
            total_after: summary.total_after,
            percent_saved: summary.percent_saved,
            duration_seconds,
        }
    }

    pub fn error(message: String, details: Option<String>) -> Self {
        Self::Error { message, details }
    }
}

impl From<&LogLine> for JsonMessage {
    fn from(line: &LogLine) -> Self {
        let path = line.source.clone();
        match &line.kind {
            LogKind::Started => Self::FileStart { path },
            LogKind::Stdout(text) => Self::Output {
                path,
                stream: Stream::Stdout,
                line: text.clone(),
            },
            LogKind::Stderr(text) => Self::Output {
                path,
                stream: Stream::Stderr,
                line: text.clone(),
            },
            LogKind::Failed(reason) => Self::FileFailed {
                path,
                reason: reason.clone(),
            },
            LogKind::Finished(exit_code) => Self::FileFinished {
                path,
                exit_code: *exit_code,
            },
        }
    }
}

/// Sink che emette ogni riga del batch come evento JSON su stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSink;

impl OutputSink for JsonSink {
    fn emit(&self, line: &LogLine) {
        JsonMessage::from(line).emit();
    }
}

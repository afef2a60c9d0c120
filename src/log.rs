//! # Output Log Module
//!
//! Linee di log prodotte durante un batch e i sink che le ricevono.
//!
//! ## Responsabilità:
//! - `LogLine`: una riga attribuita al file sorgente che l'ha prodotta
//! - `OutputSink`: trait implementato da chi consuma il log (closure, buffer, progress bar)
//! - `SharedLog`: buffer condiviso e thread-safe che l'host può leggere in ogni momento
//!
//! ## Formato testuale:
//! ```text
//! [Running] images/logo.png
//! [Error] images/logo.png:
//! [Error]   read 12KB file
//! [Finished] Error code: 0
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// What a log line reports about its source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogKind {
    /// The tool is about to be launched for this file
    Started,
    /// A line the tool wrote on stdout
    Stdout(String),
    /// A line the tool wrote on stderr
    Stderr(String),
    /// The file could not be processed (launch failure, timeout, cancellation)
    Failed(String),
    /// The tool run is over; `None` when no exit code is available
    Finished(Option<i32>),
}

/// A single line of batch output, attributed to its source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub source: PathBuf,
    pub kind: LogKind,
}

impl LogLine {
    pub fn new(source: &Path, kind: LogKind) -> Self {
        Self {
            source: source.to_path_buf(),
            kind,
        }
    }

    pub fn started(source: &Path) -> Self {
        Self::new(source, LogKind::Started)
    }

    pub fn finished(source: &Path, exit_code: Option<i32>) -> Self {
        Self::new(source, LogKind::Finished(exit_code))
    }

    pub fn failed(source: &Path, reason: impl Into<String>) -> Self {
        Self::new(source, LogKind::Failed(reason.into()))
    }

    pub fn is_started(&self) -> bool {
        matches!(self.kind, LogKind::Started)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.kind, LogKind::Finished(_))
    }

    /// Render the line prefixed with its source file name.
    ///
    /// Used when several files run at once and lines interleave.
    pub fn tagged(&self) -> String {
        let name = self
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string());
        format!("[{}] {}", name, self)
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LogKind::Started => write!(f, "[Running] {}", self.source.display()),
            LogKind::Stdout(line) => write!(f, "{}", line),
            LogKind::Stderr(line) => write!(f, "[Error] {}", line),
            LogKind::Failed(reason) => write!(f, "[Failed] {}", reason),
            LogKind::Finished(Some(code)) => write!(f, "[Finished] Error code: {}", code),
            LogKind::Finished(None) => write!(f, "[Finished] No exit code"),
        }
    }
}

/// Receives batch output as it is produced
pub trait OutputSink: Send + Sync {
    fn emit(&self, line: &LogLine);
}

impl<F> OutputSink for F
where
    F: Fn(&LogLine) + Send + Sync,
{
    fn emit(&self, line: &LogLine) {
        self(line)
    }
}

/// Log buffer shared between the runner and the host
#[derive(Debug, Clone, Default)]
pub struct SharedLog {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl SharedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every line received so far
    pub fn lines(&self) -> Vec<LogLine> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// The whole log as display text, one line per entry
    pub fn render(&self) -> String {
        self.lines()
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputSink for SharedLog {
    fn emit(&self, line: &LogLine) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_markers() {
        let source = Path::new("art/logo.png");
        assert_eq!(LogLine::started(source).to_string(), "[Running] art/logo.png");
        assert_eq!(LogLine::finished(source, Some(0)).to_string(), "[Finished] Error code: 0");
        assert_eq!(LogLine::finished(source, None).to_string(), "[Finished] No exit code");
        assert_eq!(
            LogLine::new(source, LogKind::Stderr("  read 12KB file".to_string())).to_string(),
            "[Error]   read 12KB file"
        );
        assert_eq!(LogLine::failed(source, "timed out").to_string(), "[Failed] timed out");
    }

    #[test]
    fn test_tagged_uses_file_name() {
        let line = LogLine::finished(Path::new("art/logo.png"), Some(99));
        assert_eq!(line.tagged(), "[logo.png] [Finished] Error code: 99");
    }

    #[test]
    fn test_shared_log_collects_in_order() {
        let log = SharedLog::new();
        assert!(log.is_empty());

        let source = Path::new("a.png");
        log.emit(&LogLine::started(source));
        log.emit(&LogLine::new(source, LogKind::Stdout("ok".to_string())));
        log.emit(&LogLine::finished(source, Some(0)));

        assert_eq!(log.len(), 3);
        assert_eq!(log.render(), "[Running] a.png\nok\n[Finished] Error code: 0");

        let host_view = log.clone();
        log.clear();
        assert!(host_view.is_empty());
    }

    #[test]
    fn test_closure_sink() {
        let count = Arc::new(Mutex::new(0usize));
        let counter = count.clone();
        let sink = move |_: &LogLine| *counter.lock().unwrap() += 1;

        sink.emit(&LogLine::started(Path::new("a.png")));
        sink.emit(&LogLine::finished(Path::new("a.png"), Some(0)));
        assert_eq!(*count.lock().unwrap(), 2);
    }
}

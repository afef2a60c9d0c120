//! # Progress Tracking Module
//!
//! Questo modulo gestisce il feedback visuale del batch sulla console.
//!
//! ## Responsabilità:
//! - Progress bar con `indicatif`, avanzata a ogni marker di fine file
//! - Stampa delle righe del tool sopra la barra senza corromperla
//! - Prefisso con il nome del file quando più processi girano in parallelo
//!
//! ## Visual feedback:
//! ```text
//! [Running] assets/logo.png
//! [Error]   read 12KB file
//! [Finished] Error code: 0
//! ⠋ [00:00:03] [=========>------------------------------] 3/12 (25%) logo.png
//! ```

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::log::{LogLine, OutputSink};

/// Console sink: a progress bar with the tool output printed above it
#[derive(Clone)]
pub struct ProgressManager {
    bar: ProgressBar,
    tagged: bool,
}

impl ProgressManager {
    /// Create a new progress manager for `total_files` files
    pub fn new(total_files: u64, tagged: bool) -> Self {
        let bar = ProgressBar::new(total_files);

        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        {
            bar.set_style(style.progress_chars("=>-"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar, tagged }
    }

    /// A manager that draws nothing, for tests and non-interactive runs
    pub fn hidden(total_files: u64) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(total_files);
        Self { bar, tagged: false }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Finish with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl OutputSink for ProgressManager {
    fn emit(&self, line: &LogLine) {
        let text = if self.tagged { line.tagged() } else { line.to_string() };
        self.bar.println(text);

        if line.is_started() {
            let name = line
                .source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.bar.set_message(name);
        } else if line.is_finished() {
            self.bar.inc(1);
        }
    }
}

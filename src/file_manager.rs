//! # File Management Module
//!
//! Questo modulo gestisce la discovery dei PNG da passare al batch.
//!
//! ## Responsabilità:
//! - Discovery ricorsiva di file `*.png` in una directory
//! - Esclusione degli artifact già prodotti dal tool (es. `logo-fs8.png`)
//! - Ordine deterministico (ordinamento per path) così il log segue sempre lo stesso ordine
//!
//! ## Esempio:
//! ```rust,ignore
//! let files = FileManager::find_png_files(Path::new("assets"), "-fs8")?;
//! let jobs = CompressionJob::from_paths(&files).await;
//! ```

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

use crate::runner::PathResolver;

/// Manages file discovery
pub struct FileManager;

impl FileManager {
    /// Find all PNG files under a directory, skipping artifacts left by earlier runs
    pub fn find_png_files(dir: &Path, artifact_suffix: &str) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(anyhow::anyhow!("Not a directory: {}", dir.display()));
        }

        let mut files = Vec::new();

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !Self::is_png(path) {
                continue;
            }
            if PathResolver::is_artifact(path, artifact_suffix) {
                debug!("Skipping artifact {}", path.display());
                continue;
            }
            files.push(path.to_path_buf());
        }

        Ok(files)
    }

    /// Check if a file has a PNG extension (case-insensitive)
    pub fn is_png(path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.eq_ignore_ascii_case("png"))
            .unwrap_or(false)
    }
}

//! # Path Resolution Module
//!
//! Centralizza il calcolo del path dell'artifact scritto dal tool.
//! Il tool salva `<nome><suffisso>.<ext>` nella stessa directory del sorgente;
//! il suffisso è configurabile perché dipende dalla versione e dai flag del tool.

use std::path::{Path, PathBuf};
use tracing::debug;

/// Utility per calcolare i path degli artifact in modo centralizzato
pub struct PathResolver;

impl PathResolver {
    /// Path dell'artifact atteso per un file sorgente
    pub fn artifact_path(source: &Path, suffix: &str) -> Option<PathBuf> {
        let file_stem = source.file_stem()?.to_string_lossy();

        let filename = match source.extension() {
            Some(ext) => format!("{}{}.{}", file_stem, suffix, ext.to_string_lossy()),
            None => format!("{}{}", file_stem, suffix),
        };

        Some(source.with_file_name(filename))
    }

    /// Vero se il file è già un artifact prodotto dal tool
    pub fn is_artifact(path: &Path, suffix: &str) -> bool {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().ends_with(suffix))
            .unwrap_or(false)
    }

    /// Dimensione dell'artifact se esiste su disco
    pub async fn artifact_size(source: &Path, suffix: &str) -> Option<u64> {
        let artifact = Self::artifact_path(source, suffix)?;

        match tokio::fs::metadata(&artifact).await {
            Ok(metadata) if metadata.is_file() => {
                debug!("Found {}, {} bytes", artifact.display(), metadata.len());
                Some(metadata.len())
            }
            _ => {
                debug!("Could not find {}", artifact.display());
                None
            }
        }
    }
}

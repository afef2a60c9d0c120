//! # Error Types Module
//!
//! Questo modulo definisce i tipi di errore della libreria.
//!
//! ## Categorie di errori:
//! - `Configuration`: path del tool vuoto, qualità fuori range, config invalida
//! - `IncompatibleTool`: il tool risponde ma manca il marker di versione atteso
//! - `ToolLaunch`: il processo non può essere avviato (path inesistente, permessi)
//! - `AlreadyRunning`: un batch è già in corso sullo stesso runner
//! - `Io`: errori di I/O generici
//!
//! Solo `Configuration`, `IncompatibleTool` e `AlreadyRunning` impediscono l'avvio
//! di un batch. Gli errori per singolo file finiscono nel log e nelle statistiche,
//! non vengono mai propagati al chiamante.
//!
//! ## Esempio:
//! ```rust,ignore
//! if quality > 100 {
//!     return Err(MinifyError::Configuration("quality must be 0-100".to_string()));
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for batch minification
#[derive(thiserror::Error, Debug)]
pub enum MinifyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Compatible pngquant not found at {} (expected '{marker}' in its output)", .path.display())]
    IncompatibleTool { path: PathBuf, marker: String },

    #[error("Failed to launch {}: {source}", .path.display())]
    ToolLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("A batch is already running")]
    AlreadyRunning,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

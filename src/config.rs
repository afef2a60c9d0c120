//! # Configuration Management Module
//!
//! Questo modulo gestisce tutta la configurazione dell'applicazione.
//!
//! ## Responsabilità:
//! - Definisce la struct `Config` con tutti i parametri del batch
//! - Fornisce validazione dei parametri di input
//! - Supporta caricamento/salvataggio configurazione da/verso file JSON
//! - Fornisce valori di default sensati per tutti i parametri
//!
//! ## Parametri di configurazione:
//! - `tool_path`: Path del binario pngquant (default: None = cerca nel PATH)
//! - `quality`: Qualità passata a `--quality` (0-100, default: 100)
//! - `artifact_suffix`: Suffisso del file prodotto dal tool (default: "-fs8")
//! - `skip_if_larger`: Passa `--skip-if-larger` al tool (default: true)
//! - `version_marker`: Stringa attesa nell'output del tool (default: "pngquant, 2.")
//! - `workers`: Numero di processi paralleli (default: 1 = sequenziale)
//! - `timeout_secs`: Timeout per file in secondi (default: 120, 0 = nessuno)
//! - `json_output`: Eventi JSON su stdout invece del log testuale
//!
//! ## Validazione:
//! - Controlla che quality sia 0-100
//! - Controlla che artifact_suffix non sia vuoto
//! - Controlla che version_marker non sia vuoto
//! - Controlla che workers sia > 0
//!
//! ## Esempio:
//! ```rust,ignore
//! let config = Config {
//!     quality: 80,
//!     workers: 4,
//!     ..Default::default()
//! };
//! config.validate()?;
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::tool_verifier::DEFAULT_VERSION_MARKER;

/// Suffix pngquant inserts before the extension of its output file
pub const DEFAULT_ARTIFACT_SUFFIX: &str = "-fs8";

/// Configuration for a minification batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the pngquant binary (None = look it up on PATH)
    pub tool_path: Option<PathBuf>,
    /// Quality passed to `--quality` (0-100)
    pub quality: u8,
    /// Suffix of the artifact written next to each source file
    pub artifact_suffix: String,
    /// Ask the tool not to write artifacts bigger than the source
    pub skip_if_larger: bool,
    /// Substring the tool must print when launched without arguments
    pub version_marker: String,
    /// Number of concurrent tool processes (1 = sequential)
    pub workers: usize,
    /// Per-file timeout in seconds (0 = no timeout)
    pub timeout_secs: u64,
    /// Output progress and status as JSON for programmatic use
    pub json_output: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool_path: None,
            quality: 100,
            artifact_suffix: DEFAULT_ARTIFACT_SUFFIX.to_string(),
            skip_if_larger: true,
            version_marker: DEFAULT_VERSION_MARKER.to_string(),
            workers: 1,
            timeout_secs: 120,
            json_output: false,
        }
    }
}

impl Config {
    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.quality > 100 {
            return Err(anyhow::anyhow!("Quality must be between 0 and 100"));
        }

        if self.artifact_suffix.is_empty() {
            return Err(anyhow::anyhow!("Artifact suffix must not be empty"));
        }

        if self.version_marker.is_empty() {
            return Err(anyhow::anyhow!("Version marker must not be empty"));
        }

        if self.workers == 0 {
            return Err(anyhow::anyhow!("Number of workers must be greater than 0"));
        }

        if let Some(ref tool_path) = self.tool_path {
            if tool_path.as_os_str().is_empty() {
                return Err(anyhow::anyhow!("Tool path must not be empty when set"));
            }
        }

        Ok(())
    }

    /// Default location of the configuration file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("png-minify").join("config.json"))
    }

    /// Load configuration from file, falling back to defaults when it does not exist
    pub async fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }
}

//! # Tool Verifier
//!
//! Gates a batch on the presence of a compatible pngquant binary:
//! - Blank paths are rejected before anything is spawned
//! - The binary is launched without arguments and its stderr is captured
//! - The captured text must contain the expected version marker
//!
//! Verification is blocking on purpose: it runs once per user action,
//! before the batch starts.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

use crate::error::MinifyError;

/// Marker printed by pngquant 2.x in its usage banner
pub const DEFAULT_VERSION_MARKER: &str = "pngquant, 2.";

/// Checks that an external binary is a compatible pngquant
#[derive(Debug, Clone)]
pub struct ToolVerifier {
    version_marker: String,
}

impl ToolVerifier {
    /// Create a verifier looking for the given version marker
    pub fn new(version_marker: impl Into<String>) -> Self {
        Self {
            version_marker: version_marker.into(),
        }
    }

    pub fn version_marker(&self) -> &str {
        &self.version_marker
    }

    /// Returns true only if the binary at `path` prints the version marker
    pub fn verify(&self, path: Option<&Path>) -> bool {
        match self.check(path) {
            Ok(_) => true,
            Err(e) => {
                warn!("Tool verification failed: {}", e);
                false
            }
        }
    }

    /// Like [`verify`](Self::verify), but reports why the tool was rejected
    pub fn check(&self, path: Option<&Path>) -> Result<PathBuf, MinifyError> {
        let path = match path {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => {
                return Err(MinifyError::Configuration("Path is blank!".to_string()));
            }
        };

        debug!("Verifying tool at {}", path.display());

        let output = Command::new(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| MinifyError::ToolLaunch {
                path: path.to_path_buf(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!("Tool exited with {:?}, stderr: {}", output.status.code(), stderr.trim());

        if stderr.contains(&self.version_marker) {
            Ok(path.to_path_buf())
        } else {
            Err(MinifyError::IncompatibleTool {
                path: path.to_path_buf(),
                marker: self.version_marker.clone(),
            })
        }
    }

    /// Find a tool by name in the system PATH
    pub fn resolve(tool_name: &str) -> Option<PathBuf> {
        let extension = if cfg!(windows) { ".exe" } else { "" };
        let tool_with_ext = format!("{}{}", tool_name, extension);

        let found = env::split_paths(&env::var_os("PATH")?)
            .map(|dir| dir.join(&tool_with_ext))
            .find(|path| path.is_file());

        match found {
            Some(ref path) => debug!("Resolved {} -> {}", tool_name, path.display()),
            None => warn!("Tool not found in PATH: {}", tool_name),
        }

        found
    }
}

impl Default for ToolVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION_MARKER)
    }
}

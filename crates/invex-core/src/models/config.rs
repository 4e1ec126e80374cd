//! Configuration structures for the invex pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for invex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Record store configuration.
    pub store: StoreConfig,

    /// Extraction gateway configuration.
    pub extraction: ExtractionConfig,

    /// Export and rendering configuration.
    pub export: ExportConfig,
}

/// Record store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON collection file.
    pub path: PathBuf,

    /// Pretty-print the collection (two-space indent).
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("invoices.json"),
            pretty: true,
        }
    }
}

/// Extraction gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Base URL of the generative language API.
    pub base_url: String,

    /// Model name.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Per-file timeout in seconds.
    pub timeout_secs: u64,

    /// Maximum number of files extracted concurrently.
    pub max_concurrency: usize,

    /// Maximum accepted PDF size in bytes.
    pub max_file_size: usize,

    /// Keep the source PDF in the stored record.
    pub retain_pdf: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 120,
            max_concurrency: 4,
            max_file_size: 5 * 1024 * 1024,
            retain_pdf: true,
        }
    }
}

impl ExtractionConfig {
    /// Per-file timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Export and rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Text shown for empty fields.
    pub placeholder: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            placeholder: crate::models::record::PLACEHOLDER.to_string(),
        }
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

//! CLI subcommands.

pub mod config;
pub mod export;
pub mod extract;
pub mod records;
mod render;

use std::path::{Path, PathBuf};

use console::{Term, style};
use tracing::debug;

use invex_core::models::config::InvexConfig;
use invex_core::store::JsonRecordStore;

/// Configuration and store shared by the record commands.
pub struct Context {
    pub config: InvexConfig,
    pub store: JsonRecordStore,
}

impl Context {
    /// Load configuration (explicit path, else the default file if present)
    /// and open the store.
    pub fn load(config_path: Option<&Path>, store_override: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => InvexConfig::from_file(path)?,
            None => {
                let default_path = default_config_path();
                if default_path.exists() {
                    debug!("Using config from {}", default_path.display());
                    InvexConfig::from_file(&default_path)?
                } else {
                    InvexConfig::default()
                }
            }
        };

        if let Some(path) = store_override {
            config.store.path = path;
        }

        let store = JsonRecordStore::from_config(&config.store);
        debug!("Using store at {}", store.path().display());

        Ok(Self { config, store })
    }

    /// Placeholder for empty fields.
    pub fn placeholder(&self) -> &str {
        &self.config.export.placeholder
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("invex")
        .join("config.json")
}

/// Ask for a yes/no confirmation unless `assume_yes` is set.
pub fn confirm(prompt: &str, assume_yes: bool) -> anyhow::Result<bool> {
    if assume_yes {
        return Ok(true);
    }

    let term = Term::stderr();
    term.write_str(&format!("{} {} [y/N] ", style("?").yellow(), prompt))?;
    let answer = term.read_line()?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

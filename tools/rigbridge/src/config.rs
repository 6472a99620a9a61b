//! rigbridge.toml configuration
//!
//! ```toml
//! [import]
//! up_axis = "z"
//!
//! [export]
//! up_axis = "z"
//! frame_rate = 30
//! grouping = "data_path"
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::export::ExportSettings;
use crate::import::ImportSettings;

/// Default config file name looked up next to the working directory
pub const CONFIG_FILE_NAME: &str = "rigbridge.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub import: ImportSettings,
    #[serde(default)]
    pub export: ExportSettings,
}

/// Parse a config from TOML text.
pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Load a config file.
pub fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {:?}", path))?;
    parse_config(&text).with_context(|| format!("Failed to parse config: {:?}", path))
}

/// Load the config at `path`, or `rigbridge.toml` if present, or defaults.
pub fn resolve_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => {
            let default_path = Path::new(CONFIG_FILE_NAME);
            if default_path.exists() {
                tracing::info!("Using {:?}", default_path);
                load_config(default_path)
            } else {
                Ok(Config::default())
            }
        }
    }
}

//! CLI subcommands.

pub mod batch;
pub mod config;
pub mod output;
pub mod parse;
pub mod preprocess;
pub mod scan;

use std::path::Path;

use boleta_core::BoletaConfig;
use tracing::debug;

/// Load the explicit config file, else the user config if present, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<BoletaConfig> {
    if let Some(path) = config_path {
        return Ok(BoletaConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(BoletaConfig::from_file(&default_path)?)
    } else {
        Ok(BoletaConfig::default())
    }
}

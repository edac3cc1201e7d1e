//! File-backed configuration loading.
//!
//! JSON (`.json`) and YAML (`.yaml` / `.yml`) are accepted; any other
//! extension is parsed as JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::layout::LayoutConfig;
use crate::reconstruct::ReconstructionConfig;
use crate::slot_mapper::{MatchNumberTable, SlotIndexMapper};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref() {
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::Json,
        }
    }
}

pub fn parse_config<T: DeserializeOwned>(text: &str, format: ConfigFormat) -> Result<T> {
    match format {
        ConfigFormat::Json => Ok(serde_json::from_str(text)?),
        ConfigFormat::Yaml => Ok(serde_yaml::from_str(text)?),
    }
}

pub fn load_config_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    let value = parse_config(&text, ConfigFormat::from_path(path))?;
    log::debug!("Loaded config from {}", path.display());
    Ok(value)
}

/// All tunables in one document; every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BracketConfig {
    pub layout: LayoutConfig,
    pub reconstruction: ReconstructionConfig,
    pub match_numbers: MatchNumberTable,
}

impl BracketConfig {
    /// Load and validate the layout section and the match number table.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = load_config_file(path)?;
        config.layout.validate()?;
        SlotIndexMapper::from_table(config.match_numbers.clone())?;
        Ok(config)
    }
}

use std::path::Path;
use derive_more::*;
use serde::{Deserialize, Serialize};

/// Settings for the tool, usually read from a YAML file.
/// Every field is optional in the file.
#[derive(Clone, PartialEq, Default, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub check: CheckSettings,
    pub collect: CollectSettings,
}

impl Settings {
    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let settings = serde_yaml::from_str(source)?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        let settings = Self::from_yaml(&source)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

/// Which integrity checks to run on a tileset.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckSettings {
    /// Resolve every image and confirm the file exists and decodes.
    pub images: bool,
    /// Compare declared image sizes against the decoded bitmaps.
    pub dimensions: bool,
    /// Require collection tile ids to run 0..n without gaps.
    pub contiguous_ids: bool,
    /// Warn when a tile image is larger than the nominal tile size.
    pub grid_bounds: bool,
    /// Format versions Tiled has written.
    pub supported_versions: Vec<String>,
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            images: true,
            dimensions: true,
            contiguous_ids: true,
            grid_bounds: true,
            supported_versions: ["1.0", "1.1", "1.2", "1.4", "1.5", "1.6", "1.7", "1.8", "1.9", "1.10"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Defaults applied when building a collection tileset from image files.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectSettings {
    pub extensions: Vec<String>,
    pub version: String,
    pub tiled_version: String,
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            extensions: vec![String::from("png")],
            version: String::from("1.8"),
            tiled_version: String::from("1.8.2"),
        }
    }
}

#[derive(Error, Display, From, Debug)]
pub enum ConfigError {
    #[display(fmt="{_0}")]
    Io(std::io::Error),
    #[display(fmt="{_0}")]
    Yaml(serde_yaml::Error),
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor configuration: skin parameters, canvas and view defaults.

use crate::geometry::{LayoutGeometry, ViewBox};
use egui::vec2;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current configuration format version
pub const CONFIG_FORMAT_VERSION: u32 = 1;

/// Sizes used to lay out nodes, slots and groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinParams {
    /// Node width
    pub node_width: f32,
    /// Height of the node header (name row)
    pub header_height: f32,
    /// Height of one slot row
    pub slot_height: f32,
    /// Padding below the last slot row
    pub node_padding: f32,
    /// Margin between a group frame and its nodes
    pub group_padding: f32,
}

impl Default for SkinParams {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            header_height: 24.0,
            slot_height: 22.0,
            node_padding: 6.0,
            group_padding: 12.0,
        }
    }
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Format version
    pub version: u32,
    /// Canvas width in screen space
    pub canvas_width: f32,
    /// Canvas height in screen space
    pub canvas_height: f32,
    /// Initial view transform
    pub view: ViewBox,
    /// Skin parameters
    pub skin: SkinParams,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION,
            canvas_width: 800.0,
            canvas_height: 600.0,
            view: ViewBox::default(),
            skin: SkinParams::default(),
        }
    }
}

impl EditorConfig {
    /// Parse from RON text
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: EditorConfig = ron::from_str(content)?;
        if config.version > CONFIG_FORMAT_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: config.version,
                supported: CONFIG_FORMAT_VERSION,
            });
        }
        Ok(config)
    }

    /// Serialize to pretty RON text
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        let pretty = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        Ok(ron::ser::to_string_pretty(self, pretty)?)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_ron_str(&content)?;
        tracing::debug!("Loaded editor config from {:?}", path);
        Ok(config)
    }

    /// Save to a RON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        std::fs::write(path, self.to_ron_string()?)?;
        Ok(())
    }

    /// Geometry provider for this configuration
    pub fn layout(&self) -> LayoutGeometry {
        LayoutGeometry::new(
            self.skin.clone(),
            self.view,
            vec2(self.canvas_width, self.canvas_height),
        )
    }
}

/// Error when loading or saving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File system error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization failure
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// File written by a newer version
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Highest supported version
        supported: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EditorConfig::default();
        assert_eq!(config.version, CONFIG_FORMAT_VERSION);
        assert_eq!(config.layout().canvas, vec2(800.0, 600.0));
    }

    #[test]
    fn test_serialization() {
        let mut config = EditorConfig::default();
        config.skin.node_width = 240.0;
        let ron_str = config.to_ron_string().unwrap();
        let loaded = EditorConfig::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = EditorConfig::from_ron_str("(canvas_width: 1024.0)").unwrap();
        assert_eq!(loaded.canvas_width, 1024.0);
        assert_eq!(loaded.skin, SkinParams::default());
    }

    #[test]
    fn test_newer_version_rejected() {
        let result = EditorConfig::from_ron_str("(version: 99)");
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion { found: 99, .. })));
    }
}

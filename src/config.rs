//! Configuration management for the resume tailor

use crate::error::{Result, TailorError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub filler: FillerConfig,
    pub hyperlinks: HyperlinkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FillerConfig {
    /// Upper bound on scan/resolve passes per paragraph
    pub max_passes: usize,
    /// Replace `{{TOKEN}}` markers with no profile value by an empty string
    pub clear_unresolved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperlinkConfig {
    /// Hex RGB color applied to inserted links
    pub color: String,
    /// `w:u` value applied to inserted links
    pub underline: String,
    /// Scheme prefixed to URLs written without one
    pub default_scheme: String,
    pub tokens: Vec<LinkToken>,
}

/// A placeholder rendered as a hyperlink instead of plain text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkToken {
    pub token: String,
    pub label: String,
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            max_passes: 20,
            clear_unresolved: true,
        }
    }
}

impl Default for HyperlinkConfig {
    fn default() -> Self {
        Self {
            color: "0563C1".to_string(),
            underline: "single".to_string(),
            default_scheme: "https".to_string(),
            tokens: vec![
                LinkToken {
                    token: "GITHUB".to_string(),
                    label: "Github".to_string(),
                },
                LinkToken {
                    token: "LINKEDIN".to_string(),
                    label: "Linkedin".to_string(),
                },
            ],
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, the user config file, or defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let config_path = Self::config_path();
                if config_path.exists() {
                    Self::load_from(&config_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TailorError::Configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| TailorError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-tailor")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.filler.max_passes == 0 {
            return Err(TailorError::Configuration(
                "filler.max_passes must be at least 1".to_string(),
            ));
        }
        if self.hyperlinks.default_scheme.is_empty() {
            return Err(TailorError::Configuration(
                "hyperlinks.default_scheme must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

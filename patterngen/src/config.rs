//! patterngen configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::render::UndefinedPolicy;

/// Project-local config file name
pub const LOCAL_CONFIG: &str = ".patterngen.yml";

/// Main patterngen configuration
///
/// Every value can be overridden from the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the pattern tree
    #[serde(rename = "patterns-dir")]
    pub patterns_dir: PathBuf,

    /// Pattern category (creational, structural, behavioral)
    #[serde(rename = "general-group")]
    pub general_group: String,

    /// Pattern name within the category
    pub pattern: String,

    /// Language suffix of the template to render (`<pattern>.<language>.j2`)
    #[serde(rename = "target-language")]
    pub target_language: String,

    /// Directory for generated files; empty prints to stdout
    #[serde(rename = "output-dir")]
    pub output_dir: PathBuf,

    /// Behavior on undefined template variables
    pub undefined: UndefinedPolicy,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            patterns_dir: PathBuf::from("patterns"),
            general_group: "creational".to_string(),
            pattern: "singleton".to_string(),
            target_language: "swift".to_string(),
            output_dir: PathBuf::new(),
            undefined: UndefinedPolicy::Strict,
            log_level: None,
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// 1. Explicit `--config` path
    /// 2. `./.patterngen.yml`
    /// 3. `~/.config/patterngen/patterngen.yml`
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("patterngen").join("patterngen.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content).context(format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }
}

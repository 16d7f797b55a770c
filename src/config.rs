use crate::paths::write_atomic;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

pub const DEFAULT_SUBDIRECTORY: &str = "PDFile";

/// How hard to work on output size when compression is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    High,
}

impl Quality {
    fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Some(Quality::Low),
            "medium" => Some(Quality::Medium),
            "high" => Some(Quality::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionConfig {
    pub enabled: bool,
    pub quality: Quality,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig {
            enabled: true,
            quality: Quality::Medium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputConfig {
    pub use_subdirectory: bool,
    pub subdirectory_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            use_subdirectory: true,
            subdirectory_name: DEFAULT_SUBDIRECTORY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub compression: CompressionConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Rebuild a config from arbitrary JSON, field by field.
    ///
    /// Anything missing or of the wrong type keeps its default; unknown keys are dropped.
    pub fn from_json(value: &Value) -> Self {
        let mut config = Config::default();

        if let Some(compression) = value.get("compression") {
            if let Some(enabled) = compression.get("enabled").and_then(Value::as_bool) {
                config.compression.enabled = enabled;
            }
            if let Some(quality) = compression
                .get("quality")
                .and_then(Value::as_str)
                .and_then(Quality::parse)
            {
                config.compression.quality = quality;
            }
        }

        if let Some(output) = value.get("output") {
            if let Some(use_sub) = output.get("useSubdirectory").and_then(Value::as_bool) {
                config.output.use_subdirectory = use_sub;
            }
            if let Some(name) = output
                .get("subdirectoryName")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|name| is_valid_dir_name(name))
            {
                config.output.subdirectory_name = name.to_string();
            }
        }

        config
    }
}

fn is_valid_dir_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// The on-disk location of the configuration file.
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        ConfigStore { path: path.into() }
    }

    /// `<config dir>/pdfile/config.json` for the current user.
    pub fn user_default() -> Self {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        ConfigStore::new(base.join("pdfile").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, falling back to defaults if the file is missing or unreadable.
    pub fn load(&self) -> Config {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "using default config");
                return Config::default();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Config::from_json(&value),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "malformed config, using defaults");
                Config::default()
            }
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, json.as_bytes())
            .with_context(|| format!("Failed to write config: {}", self.path.display()))
    }

    /// Overwrite the file with the built-in defaults.
    pub fn reset(&self) -> Result<Config> {
        let config = Config::default();
        self.save(&config)?;
        Ok(config)
    }
}

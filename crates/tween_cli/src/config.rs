//! Tween CLI configuration file handling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tween_animation::EngineConfig;

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "tween.toml";

/// Top-level CLI configuration (tween.toml)
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Synthetic frame driver settings
#[derive(Debug, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Simulated display refresh rate
    #[serde(default = "default_fps")]
    pub fps: u32,
}

fn default_fps() -> u32 {
    60
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { fps: default_fps() }
    }
}

impl CliConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: CliConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config.validate()?;

        Ok(config)
    }

    /// Load `path` if given, else `tween.toml` from the working directory if
    /// present, else defaults
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.simulation.fps == 0 {
            anyhow::bail!("simulation.fps must be greater than zero");
        }
        Ok(())
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

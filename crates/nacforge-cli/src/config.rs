//! Project file (`nacforge.toml`) handling

use std::path::{Path, PathBuf};

use nacforge::DeploymentSettings;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Deployment settings at the top level plus an `[output]` table
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProjectConfig {
    #[serde(flatten)]
    pub settings: DeploymentSettings,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Where generated files and snapshots go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated configuration files
    pub dir: PathBuf,

    /// Snapshot store file
    pub snapshots: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("generated"),
            snapshots: PathBuf::from(".nacforge/snapshots.json"),
        }
    }
}

impl ProjectConfig {
    pub fn new(settings: DeploymentSettings) -> Self {
        Self {
            settings,
            output: OutputConfig::default(),
        }
    }

    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CliError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|e| CliError::ConfigRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_str(&content, path)
    }

    /// Parse configuration from a string
    pub fn from_str(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Render as TOML, settings first then `[output]`
    pub fn to_toml(&self) -> Result<String> {
        let mut out = self.settings.to_toml()?;
        let output = toml::to_string_pretty(&self.output).map_err(|e| CliError::InvalidValue {
            field: "output".to_string(),
            message: e.to_string(),
        })?;
        out.push_str("\n[output]\n");
        out.push_str(&output);
        Ok(out)
    }

    /// Output directory, relative paths resolved against the config file's directory
    pub fn output_dir(&self, config_path: &Path) -> PathBuf {
        resolve(config_path, &self.output.dir)
    }

    pub fn snapshot_path(&self, config_path: &Path) -> PathBuf {
        resolve(config_path, &self.output.snapshots)
    }
}

fn resolve(config_path: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match config_path.parent() {
        Some(base) if !base.as_os_str().is_empty() => base.join(path),
        _ => path.to_path_buf(),
    }
}

//! Configuration for the CLI
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (refschema.toml)
//! - Environment variables (REFSCHEMA_*)
//!
//! ## Example config file (refschema.toml):
//! ```toml
//! [schemas]
//! dir = "./schemas"
//!
//! [output]
//! format = "text"
//!
//! [validation]
//! fail_fast = false
//! max_ref_depth = 64
//! ```
//!
//! The library core takes no global configuration; these settings only drive
//! the `refschema` binary.

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Schema pre-registration settings
    #[serde(default)]
    pub schemas: SchemasConfig,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Validation settings
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// Schema pre-registration settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemasConfig {
    /// Directory of *.json documents to register before validating
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Output settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Report format
    #[serde(default)]
    pub format: OutputFormat,
}

/// Report format for validation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Stop at the first invalid data document
    #[serde(default)]
    pub fail_fast: bool,

    /// Cap on the $ref chain length
    #[serde(default = "default_max_ref_depth")]
    pub max_ref_depth: usize,
}

fn default_max_ref_depth() -> usize {
    64
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            max_ref_depth: default_max_ref_depth(),
        }
    }
}

impl CliConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["refschema.toml", ".refschema.toml", "config/refschema.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "refschema", "refschema") {
            let xdg_config = config_dir.config_dir().join("refschema.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("REFSCHEMA")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

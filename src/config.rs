//! Configuration for the schema compiler
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (avsc.toml)
//! - Environment variables (AVSC__*)
//!
//! ## Example config file (avsc.toml):
//! ```toml
//! [compiler]
//! mode = "accumulate_all"
//! max_depth = 128
//!
//! [output]
//! format = "compact"
//! fingerprint = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::diagnostics::ErrorMode;
use crate::json::DEFAULT_MAX_DEPTH;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CompilerConfig {
    /// Compilation settings
    #[serde(default)]
    pub compiler: CompilerSection,

    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[compiler]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompilerSection {
    /// Stop at the first error or collect all of them
    #[serde(default)]
    pub mode: ErrorMode,

    /// Deepest array/object nesting the parser accepts
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

/// `[output]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Print the schema fingerprint after each schema
    #[serde(default)]
    pub fingerprint: bool,
}

/// Output format for canonical JSON
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    pub fn is_pretty(&self) -> bool {
        matches!(self, OutputFormat::Pretty)
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            mode: ErrorMode::default(),
            max_depth: default_max_depth(),
        }
    }
}

impl CompilerConfig {
    /// Load configuration, layering an explicit file over the default locations
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = ["avsc.toml", ".avsc.toml", "config/avsc.toml"];
        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(dirs) = directories::ProjectDirs::from("org", "avro", "avsc") {
            let xdg_config = dirs.config_dir().join("avsc.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        // AVSC__COMPILER__MODE=accumulate_all
        builder = builder.add_source(
            Environment::with_prefix("AVSC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Load only the given file, without default locations or environment.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from(path).required(true))
            .build()?
            .try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

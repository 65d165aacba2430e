//! Configuration management for the IR tool
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (openapi-ir.toml)
//! - Environment variables (OPENAPI_IR__*)
//!
//! ## Example config file (openapi-ir.toml):
//! ```toml
//! [output]
//! format = "compact"
//! include_meta = false
//!
//! [transform]
//! default_schemes = ["https"]
//! emit_inline_types = true
//! map_operation_io = true
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::transform::TransformOptions;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrConfig {
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Transformation settings
    #[serde(default)]
    pub transform: TransformOptions,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output format (pretty or compact)
    #[serde(default)]
    pub format: OutputFormat,

    /// Attach provenance metadata (digest, source, timestamp)
    #[serde(default = "default_true")]
    pub include_meta: bool,
}

/// Output format for JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pretty,
            include_meta: true,
        }
    }
}

impl IrConfig {
    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "openapi-ir.toml",
            ".openapi-ir.toml",
            "config/openapi-ir.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        // Load from XDG config directory
        if let Some(config_dir) = directories::ProjectDirs::from("dev", "familiar", "openapi-ir") {
            let xdg_config = config_dir.config_dir().join("openapi-ir.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("OPENAPI_IR")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("transform.default_schemes")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

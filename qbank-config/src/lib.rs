//! Shared configuration loader for the qbank tools.
//!
//! `defaults/qbank.default.toml` is embedded into every binary so that docs and
//! runtime behavior stay in sync. Applications layer user-specific files on top
//! of those defaults via [`Loader`] before deserializing into [`QbankConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/qbank.default.toml");

/// Name of the optional per-project configuration file.
pub const PROJECT_FILE: &str = "qbank.toml";

/// Top-level configuration consumed by qbank applications.
#[derive(Debug, Clone, Deserialize)]
pub struct QbankConfig {
    pub convert: ConvertConfig,
    pub inspect: InspectConfig,
    pub logging: LoggingConfig,
}

/// Format-specific conversion knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct ConvertConfig {
    pub json: JsonConfig,
    pub gift: GiftConfig,
    pub files: FilesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonConfig {
    pub pretty: bool,
    pub embed_files: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GiftConfig {
    pub comments: bool,
}

/// Where referenced files come from and how embedded ones are named.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    pub embed_prefix: String,
    /// Empty means "next to the input file".
    pub base_dir: String,
}

/// Controls inspect output.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectConfig {
    pub treeviz: TreevizConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TreevizConfig {
    pub show_dbids: bool,
    pub show_tags: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// A `tracing` filter directive such as `warn` or `qbank_babel=debug`.
    pub level: String,
}

impl QbankConfig {
    /// Serializer parameters implied by the configuration for `format`.
    ///
    /// Formats without configurable knobs get an empty map.
    pub fn format_options(&self, format: &str) -> HashMap<String, String> {
        let mut options = HashMap::new();
        match format {
            "json" => {
                let json = &self.convert.json;
                options.insert("pretty".to_string(), json.pretty.to_string());
                if json.embed_files {
                    let files = &self.convert.files;
                    options.insert("embed-files".to_string(), "true".to_string());
                    options.insert("embed-prefix".to_string(), files.embed_prefix.clone());
                    if !files.base_dir.is_empty() {
                        options.insert("base-dir".to_string(), files.base_dir.clone());
                    }
                }
            }
            "gift" => {
                options.insert("comments".to_string(), self.convert.gift.comments.to_string());
            }
            "treeviz" => {
                let treeviz = &self.inspect.treeviz;
                options.insert("show-dbids".to_string(), treeviz.show_dbids.to_string());
                options.insert("show-tags".to_string(), treeviz.show_tags.to_string());
            }
            _ => {}
        }
        options
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<QbankConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<QbankConfig, ConfigError> {
    Loader::new().build()
}

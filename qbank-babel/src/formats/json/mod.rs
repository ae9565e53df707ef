//! Native JSON format
//!
//! A direct serde reflection of the category tree: every field, enums by variant name.
//! Identity handles are not stored; loading assigns fresh ones and relinks parents, so
//! a tree written and read back compares equal to the original.
//!
//! Parameters:
//!
//! - `pretty` (default `true`): indented output
//! - `embed-files` (default `false`): inline the content of every referenced file as
//!   base64 so the output is self-contained
//! - `embed-prefix`: exported path prefix for embedded files (default `@@PLUGINFILE@@/`)
//! - `base-dir`: where files without inline data are looked up

use crate::error::FormatError;
use crate::format::{flag, reject_unknown, Format};
use qbank_core::files::FileRegistry;
use qbank_core::{Category, PLUGINFILE_PREFIX};
use std::collections::HashMap;

const PARAMS: &[&str] = &["pretty", "embed-files", "embed-prefix", "base-dir"];

pub fn parse_json(source: &str) -> Result<Category, FormatError> {
    serde_json::from_str(source).map_err(|err| FormatError::ParseError(err.to_string()))
}

pub fn serialize_json(bank: &Category, pretty: bool) -> Result<String, FormatError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(bank)
    } else {
        serde_json::to_string(bank)
    };
    rendered.map_err(|err| FormatError::SerializationError(err.to_string()))
}

/// Give every file reference in the tree inline data and its exported path.
///
/// Stops at the first file that has no data and cannot be read.
pub fn embed_files(bank: &mut Category, registry: &mut FileRegistry) -> Result<(), FormatError> {
    for file in bank.files_mut() {
        let (id, path) = registry.embed(file)?;
        let content = &registry.files()[id].content;
        *file = file.clone().with_data(content);
        file.path = path;
    }
    Ok(())
}

/// Format implementation for the native JSON format
pub struct JsonFormat;

impl Format for JsonFormat {
    fn name(&self) -> &str {
        "json"
    }

    fn description(&self) -> &str {
        "Native lossless JSON reflection of the question bank"
    }

    fn file_extensions(&self) -> &[&str] {
        &["json"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Category, FormatError> {
        parse_json(source)
    }

    fn serialize(&self, bank: &Category) -> Result<String, FormatError> {
        serialize_json(bank, true)
    }

    fn serialize_with_options(
        &self,
        bank: &Category,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        reject_unknown(self.name(), options, PARAMS)?;
        let pretty = flag(options, "pretty", true);
        if !flag(options, "embed-files", false) {
            return serialize_json(bank, pretty);
        }

        let prefix = options
            .get("embed-prefix")
            .map(String::as_str)
            .unwrap_or(PLUGINFILE_PREFIX);
        let mut registry = FileRegistry::new(prefix);
        if let Some(dir) = options.get("base-dir") {
            registry = registry.with_base_dir(dir);
        }
        let mut copy = bank.clone();
        embed_files(&mut copy, &mut registry)?;
        tracing::debug!(files = registry.len(), "embedded files into JSON output");
        serialize_json(&copy, pretty)
    }
}

//! Format trait definition
//!
//! This module defines the core Format trait that all format implementations must implement.
//! A format reads a whole file into a category tree and writes a tree back out.

use crate::error::FormatError;
use qbank_core::Category;
use std::collections::HashMap;

/// Trait for question bank formats
///
/// Implementors provide conversion between a file's text and a [`Category`] tree.
/// Formats can support parsing, serialization, or both.
///
/// # Examples
///
/// ```ignore
/// struct MyFormat;
///
/// impl Format for MyFormat {
///     fn name(&self) -> &str {
///         "my-format"
///     }
///
///     fn supports_serialization(&self) -> bool {
///         true
///     }
///
///     fn serialize(&self, bank: &Category) -> Result<String, FormatError> {
///         Ok(bank.name().to_string())
///     }
/// }
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "json", "gift", "aiken")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot.
    /// Used for automatic format detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Whether this format supports parsing (source → Category)
    fn supports_parsing(&self) -> bool {
        false
    }

    /// Whether this format supports serialization (Category → source)
    fn supports_serialization(&self) -> bool {
        false
    }

    /// Parse source text into a category tree
    fn parse(&self, _source: &str) -> Result<Category, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support parsing",
            self.name()
        )))
    }

    /// Serialize a category tree into source text
    fn serialize(&self, _bank: &Category) -> Result<String, FormatError> {
        Err(FormatError::NotSupported(format!(
            "Format '{}' does not support serialization",
            self.name()
        )))
    }

    /// Serialize, optionally using extra parameters.
    ///
    /// Formats without parameters can rely on the default implementation, which
    /// delegates to [`Format::serialize`] and rejects any parameter.
    fn serialize_with_options(
        &self,
        bank: &Category,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        if options.is_empty() {
            self.serialize(bank)
        } else {
            Err(FormatError::NotSupported(format!(
                "Format '{}' does not support extra parameters",
                self.name()
            )))
        }
    }
}

/// Read a boolean parameter; anything but `"false"` counts as set.
pub(crate) fn flag(options: &HashMap<String, String>, key: &str, default: bool) -> bool {
    options
        .get(key)
        .map(|value| !value.eq_ignore_ascii_case("false"))
        .unwrap_or(default)
}

/// Fail on parameters a format does not know.
pub(crate) fn reject_unknown(
    format: &str,
    options: &HashMap<String, String>,
    known: &[&str],
) -> Result<(), FormatError> {
    let mut unknown: Vec<&str> = options
        .keys()
        .map(String::as_str)
        .filter(|key| !known.contains(key))
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    unknown.sort_unstable();
    Err(FormatError::NotSupported(format!(
        "Format '{format}' does not support parameter(s): {}",
        unknown.join(", ")
    )))
}

//! GIFT format
//!
//! Moodle's plain-text question syntax:
//!
//! ```text
//! $CATEGORY: $course$/top/Arithmetic
//!
//! ::Q1:: What is 8? {#8:2}
//!
//! ::Q2::[html]Pick <b>one</b> {
//!     =right#feedback
//!     ~wrong
//! }
//! ```
//!
//! Readable kinds: description, essay, true/false, numerical, short answer,
//! multiple choice and matching. The same set is written back; other kinds are skipped.
//!
//! Parameters: `comments` (default `false`) writes a `// question:` line before each
//! question.

pub mod parser;
pub mod serializer;

use crate::error::FormatError;
use crate::format::{flag, reject_unknown, Format};
use qbank_core::Category;
use std::collections::HashMap;

pub use parser::parse_gift_bank;
pub use serializer::serialize_gift;

/// Format implementation for GIFT
pub struct GiftFormat;

impl Format for GiftFormat {
    fn name(&self) -> &str {
        "gift"
    }

    fn description(&self) -> &str {
        "Moodle GIFT plain-text question format"
    }

    fn file_extensions(&self) -> &[&str] {
        &["gift"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Category, FormatError> {
        parse_gift_bank(source)
    }

    fn serialize(&self, bank: &Category) -> Result<String, FormatError> {
        serialize_gift(bank, false)
    }

    fn serialize_with_options(
        &self,
        bank: &Category,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        reject_unknown(self.name(), options, &["comments"])?;
        serialize_gift(bank, flag(options, "comments", false))
    }
}

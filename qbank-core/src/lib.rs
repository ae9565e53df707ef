//! Core model for question banks
//!
//!     This crate holds the two halves every format conversion goes through: rich text with
//!     its embedded markup, and the category/question tree. It never reads or writes a whole
//!     file format; that is qbank-babel's job.
//!
//! Rich text
//!
//!     Question bodies, feedback and hints are [`FText`] values: literal text interleaved with
//!     typed inline objects (cloze markers, `[[N]]` gaps, calculated variables and formulas,
//!     `$$` math and file references). Format readers build them with [`text::parse`] and a
//!     [`Delimiters`] table naming which constructs are live; writers get the source back with
//!     [`FText::render`], which re-applies the escaping the same table implies.
//!
//!     All scanners share one escape rule, implemented once in [`text::cursor`]: a backslash
//!     escapes the next character unless it was itself escaped.
//!
//! Data model
//!
//!     .
//!     ├── model/answer.rs     # answer and option value types
//!     ├── model/question.rs   # Question + closed QuestionKind enum
//!     ├── model/category.rs   # the category tree
//!     ├── model/dataset.rs    # calculated-question datasets
//!     └── model/numeric.rs    # numeric ranges and tolerances
//!
//!     Categories own their children; parent links are identity handles set only by the
//!     category mutation methods.
//!
//! Logging
//!
//!     Recoverable oddities (a stray brace, an ambiguous GIFT block) are reported through
//!     `tracing` and parsing carries on. This crate never installs a subscriber.

pub mod enums;
pub mod error;
pub mod files;
pub mod model;
pub mod text;

pub use enums::{ClozeFormat, TextFormat};
pub use error::{MarkupError, ModelError};
pub use files::{FileRef, FileRegistry, PLUGINFILE_PREFIX};
pub use model::{Category, Question, QuestionKind, QuestionType};
pub use text::{Delimiters, FText, Parsed, Segment};

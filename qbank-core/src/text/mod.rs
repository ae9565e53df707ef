//! Rich text and the markup scanners that build it
//!
//! - [`cursor`]: the shared single-pass scanner and escape rule
//! - [`markup`]: raw text to [`FText`] for a given [`Delimiters`] table
//! - [`cloze`]: embedded answer groups
//! - [`gift`]: GIFT question blocks
//! - [`substitute`]: `[name]` placeholders
//! - [`expr`]: calculated-question formulas

pub mod cloze;
pub mod cursor;
pub mod expr;
pub mod ftext;
pub mod gift;
pub mod markup;
pub mod substitute;

pub use ftext::{FText, Segment};
pub use markup::{parse, parse_text, Delimiters, Parsed};

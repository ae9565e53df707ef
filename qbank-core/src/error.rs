//! Error types for markup parsing and model validation

use thiserror::Error;

/// Errors raised while scanning markup embedded in rich text.
///
/// Offsets are character (not byte) positions into the scanned input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MarkupError {
    /// A block was opened but its closing delimiter never appeared.
    #[error("unterminated markup at offset {offset}: expected one of {expected:?}")]
    Unterminated { offset: usize, expected: String },
    /// Input ended inside a construct that needs more characters.
    #[error("unexpected end of input at offset {offset}")]
    UnexpectedEnd { offset: usize },
    /// A weight, grade or numeric answer could not be read as a number.
    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { offset: usize, text: String },
    #[error("unexpected '{found}' at offset {offset}")]
    Unexpected { offset: usize, found: char },
}

impl MarkupError {
    pub fn offset(&self) -> usize {
        match self {
            MarkupError::Unterminated { offset, .. }
            | MarkupError::UnexpectedEnd { offset }
            | MarkupError::InvalidNumber { offset, .. }
            | MarkupError::Unexpected { offset, .. } => *offset,
        }
    }
}

/// Invariant violations on the question bank model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("a category named '{0}' already exists here")]
    DuplicateName(String),
    #[error("drag item {number} sets both a group and a number of drags")]
    ConflictingDragMode { number: u32 },
    #[error("{hints} hints given but only {max_tries} tries allowed")]
    TooManyHints { hints: usize, max_tries: u32 },
    #[error("body has {markers} markers but there are {options} option groups")]
    MarkerMismatch { markers: usize, options: usize },
    #[error("option group {group} has no choice with a non-zero fraction")]
    NoCorrectChoice { group: usize },
    #[error("exactly one of true/false must carry fraction 100 (true={true_fraction}, false={false_fraction})")]
    TrueFalseFractions {
        true_fraction: f64,
        false_fraction: f64,
    },
    #[error("file '{0}' has no embedded data and could not be read")]
    MissingFile(String),
    #[error("invalid numeric answer '{0}'")]
    InvalidNumber(String),
    #[error("cannot evaluate formula '{0}'")]
    Formula(String),
    #[error("dataset '{0}' has no item {1}")]
    MissingDatasetItem(String, u32),
    #[error("template: {0}")]
    Template(#[from] MarkupError),
    #[error("sub-question {index}: {source}")]
    Sub {
        index: usize,
        #[source]
        source: Box<ModelError>,
    },
}

//! Answer and option value types owned by questions

use super::numeric::{format_number, parse_numeric};
use crate::enums::{ClozeFormat, ShapeType, TextFormat, ToleranceFormat, ToleranceType};
use crate::error::ModelError;
use crate::files::FileRef;
use crate::text::cloze::CHOICE_ESCAPES;
use crate::text::cursor::escape;
use crate::text::ftext::FText;
use crate::text::markup::Delimiters;
use serde::{Deserialize, Serialize};

/// A scored choice. `fraction` is a percentage of the question grade; negative
/// values are penalties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub fraction: f64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FText>,
    #[serde(default)]
    pub formatting: TextFormat,
}

impl Answer {
    pub fn new(fraction: f64, text: impl Into<String>) -> Self {
        Self {
            fraction,
            text: text.into(),
            feedback: None,
            formatting: TextFormat::Auto,
        }
    }

    pub fn with_feedback(mut self, feedback: FText) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn is_correct(&self) -> bool {
        self.fraction >= 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericalAnswer {
    pub answer: Answer,
    /// Absolute tolerance around the value in `answer.text`.
    pub tolerance: f64,
}

impl NumericalAnswer {
    pub fn new(fraction: f64, value: f64, tolerance: f64) -> Self {
        Self {
            answer: Answer::new(fraction, format_number(value)),
            tolerance,
        }
    }

    /// Build from any of the accepted numeric forms (`8`, `8:2`, `6..10`).
    pub fn parse(fraction: f64, text: &str) -> Result<Self, ModelError> {
        let (value, tolerance) = parse_numeric(text)?;
        Ok(Self::new(fraction, value, tolerance))
    }

    pub fn value(&self) -> Result<f64, ModelError> {
        parse_numeric(&self.answer.text).map(|(value, _)| value)
    }

    /// Whether `response` falls within the tolerance window.
    pub fn accepts(&self, response: f64) -> bool {
        match self.value() {
            Ok(value) => (response - value).abs() <= self.tolerance,
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedAnswer {
    pub numeric: NumericalAnswer,
    #[serde(default)]
    pub tolerance_type: ToleranceType,
    #[serde(default)]
    pub answer_format: ToleranceFormat,
    pub answer_length: u32,
}

impl CalculatedAnswer {
    pub fn new(fraction: f64, formula: impl Into<String>, tolerance: f64) -> Self {
        Self {
            numeric: NumericalAnswer {
                answer: Answer::new(fraction, formula),
                tolerance,
            },
            tolerance_type: ToleranceType::default(),
            answer_format: ToleranceFormat::default(),
            answer_length: 2,
        }
    }
}

/// One embedded answer group of a cloze text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClozeItem {
    /// Characters of literal body text that precede the group.
    pub start: usize,
    pub grade: u32,
    pub format: ClozeFormat,
    pub opts: Vec<Answer>,
}

impl ClozeItem {
    pub fn new(format: ClozeFormat, opts: Vec<Answer>) -> Self {
        Self {
            start: 0,
            grade: 1,
            format,
            opts,
        }
    }

    /// Canonical source form: explicit grade, long format name, explicit prefixes.
    pub fn to_cloze(&self) -> String {
        let mut out = format!("{{{}:{}:", self.grade, self.format.name());
        for opt in &self.opts {
            out.push_str(&fraction_prefix(opt.fraction, &opt.text));
            out.push_str(&escape(&opt.text, CHOICE_ESCAPES, true));
            if let Some(feedback) = &opt.feedback {
                out.push('#');
                let source = feedback.to_source(TextFormat::Plain, &Delimiters::NONE);
                out.push_str(&escape(&source, CHOICE_ESCAPES, true));
            }
        }
        out.push('}');
        out
    }

    pub fn has_correct_choice(&self) -> bool {
        self.opts.iter().any(|opt| opt.fraction != 0.0)
    }

    /// Numeric choices normalized to value and tolerance.
    pub fn numeric_options(&self) -> Result<Vec<NumericalAnswer>, ModelError> {
        self.opts
            .iter()
            .map(|opt| {
                let mut numeric = NumericalAnswer::parse(opt.fraction, &opt.text)?;
                numeric.answer.feedback = opt.feedback.clone();
                Ok(numeric)
            })
            .collect()
    }
}

/// Choice prefix for `fraction`: `=` for full credit, `~` for none, `~%N%` otherwise.
pub fn fraction_prefix(fraction: f64, text: &str) -> String {
    if fraction == 100.0 {
        "=".to_string()
    } else if fraction == 0.0 && !text.starts_with('%') {
        "~".to_string()
    } else {
        format!("~%{}%", format_number(fraction))
    }
}

/// Draggable item for drag-and-drop questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragItem {
    pub number: u32,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<FileRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_of_drags: Option<u32>,
    #[serde(default)]
    pub unlimited: bool,
}

impl DragItem {
    /// An item is either grouped (text and image drags) or counted (markers), never both.
    pub fn new(
        number: u32,
        text: impl Into<String>,
        group: Option<u32>,
        no_of_drags: Option<u32>,
    ) -> Result<Self, ModelError> {
        if group.is_some() && no_of_drags.is_some() {
            return Err(ModelError::ConflictingDragMode { number });
        }
        Ok(Self {
            number,
            text: text.into(),
            image: None,
            group,
            no_of_drags,
            unlimited: false,
        })
    }

    pub fn with_image(mut self, image: FileRef) -> Self {
        self.image = Some(image);
        self
    }

    pub fn check(&self) -> Result<(), ModelError> {
        if self.group.is_some() && self.no_of_drags.is_some() {
            return Err(ModelError::ConflictingDragMode {
                number: self.number,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropZone {
    pub shape: ShapeType,
    pub coords: Vec<(i32, i32)>,
    /// Index of the drag item that belongs in this zone.
    pub choice: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Matching pair: prompt and the answer it maps to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subquestion {
    pub text: FText,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    pub text: String,
    pub group: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Hint {
    pub text: FText,
    #[serde(default)]
    pub show_correct: bool,
    #[serde(default)]
    pub clear_wrong: bool,
    #[serde(default)]
    pub state_incorrect: bool,
}

impl Hint {
    pub fn new(text: FText) -> Self {
        Self {
            text,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    pub multiplier: f64,
}

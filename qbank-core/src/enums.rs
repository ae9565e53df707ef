//! Closed enumerations shared across the model
//!
//! Every enum serializes by variant name, which is what the native JSON format
//! stores on disk.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared format of a piece of rich text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TextFormat {
    Plain,
    #[default]
    Html,
    Markdown,
    /// Moodle "auto-format": plain text where cloze and escapes are live.
    Auto,
}

impl TextFormat {
    /// Name used by GIFT `[format]` prefixes and Moodle `format` attributes.
    pub fn name(self) -> &'static str {
        match self {
            TextFormat::Plain => "plain",
            TextFormat::Html => "html",
            TextFormat::Markdown => "markdown",
            TextFormat::Auto => "moodle",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "plain" | "plain_text" => Some(TextFormat::Plain),
            "html" => Some(TextFormat::Html),
            "markdown" => Some(TextFormat::Markdown),
            "moodle" | "moodle_auto_format" | "auto" => Some(TextFormat::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShuffleType {
    #[default]
    Always,
    LastTry,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShowAnswer {
    #[default]
    Never,
    Always,
    AfterLastTry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShowUnits {
    #[default]
    TextInput,
    MultiChoice,
    Dropdown,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Grading {
    #[default]
    Ignore,
    Response,
    Question,
}

/// Visibility of a calculated-question dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Private,
    Shared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Distribution {
    #[default]
    Uniform,
    LogUniform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToleranceType {
    #[default]
    Relative,
    Nominal,
    Geometric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToleranceFormat {
    #[default]
    Decimals,
    SignificantFigures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ResponseFormat {
    #[default]
    Html,
    Plain,
    Monospaced,
    EditorFilePicker,
    NoInline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Numbering {
    None,
    #[default]
    Alpha,
    AlphaUpper,
    Decimal,
    Roman,
    RomanUpper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShapeType {
    #[default]
    Rectangle,
    Ellipse,
    Polygon,
}

/// Sub-format of one embedded (cloze) answer group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClozeFormat {
    ShortAnswer,
    ShortAnswerCase,
    Numerical,
    MultiChoice,
    MultiChoiceVertical,
    MultiChoiceHorizontal,
    MultiResponse,
    MultiResponseHorizontal,
    MultiChoiceShuffled,
    MultiChoiceVerticalShuffled,
    MultiChoiceHorizontalShuffled,
    MultiResponseShuffled,
    MultiResponseHorizontalShuffled,
}

impl ClozeFormat {
    /// Canonical Moodle name, as written back by renderers.
    pub fn name(self) -> &'static str {
        match self {
            ClozeFormat::ShortAnswer => "SHORTANSWER",
            ClozeFormat::ShortAnswerCase => "SHORTANSWER_C",
            ClozeFormat::Numerical => "NUMERICAL",
            ClozeFormat::MultiChoice => "MULTICHOICE",
            ClozeFormat::MultiChoiceVertical => "MULTICHOICE_V",
            ClozeFormat::MultiChoiceHorizontal => "MULTICHOICE_H",
            ClozeFormat::MultiResponse => "MULTIRESPONSE",
            ClozeFormat::MultiResponseHorizontal => "MULTIRESPONSE_H",
            ClozeFormat::MultiChoiceShuffled => "MULTICHOICE_S",
            ClozeFormat::MultiChoiceVerticalShuffled => "MULTICHOICE_VS",
            ClozeFormat::MultiChoiceHorizontalShuffled => "MULTICHOICE_HS",
            ClozeFormat::MultiResponseShuffled => "MULTIRESPONSE_S",
            ClozeFormat::MultiResponseHorizontalShuffled => "MULTIRESPONSE_HS",
        }
    }

    /// Accepts both the long names and the Moodle abbreviations.
    pub fn from_name(name: &str) -> Option<Self> {
        let format = match name {
            "SHORTANSWER" | "SA" | "MW" => ClozeFormat::ShortAnswer,
            "SHORTANSWER_C" | "SAC" | "MWC" => ClozeFormat::ShortAnswerCase,
            "NUMERICAL" | "NM" => ClozeFormat::Numerical,
            "MULTICHOICE" | "MC" => ClozeFormat::MultiChoice,
            "MULTICHOICE_V" | "MCV" => ClozeFormat::MultiChoiceVertical,
            "MULTICHOICE_H" | "MCH" => ClozeFormat::MultiChoiceHorizontal,
            "MULTIRESPONSE" | "MR" => ClozeFormat::MultiResponse,
            "MULTIRESPONSE_H" | "MRH" => ClozeFormat::MultiResponseHorizontal,
            "MULTICHOICE_S" | "MCS" => ClozeFormat::MultiChoiceShuffled,
            "MULTICHOICE_VS" | "MCVS" => ClozeFormat::MultiChoiceVerticalShuffled,
            "MULTICHOICE_HS" | "MCHS" => ClozeFormat::MultiChoiceHorizontalShuffled,
            "MULTIRESPONSE_S" | "MRS" => ClozeFormat::MultiResponseShuffled,
            "MULTIRESPONSE_HS" | "MRHS" => ClozeFormat::MultiResponseHorizontalShuffled,
            _ => return None,
        };
        Some(format)
    }

    pub fn is_numerical(self) -> bool {
        self == ClozeFormat::Numerical
    }
}

impl fmt::Display for ClozeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloze_abbreviations_resolve_to_long_names() {
        assert_eq!(ClozeFormat::from_name("SA"), Some(ClozeFormat::ShortAnswer));
        assert_eq!(ClozeFormat::from_name("MCVS").map(ClozeFormat::name), Some("MULTICHOICE_VS"));
        assert_eq!(ClozeFormat::from_name("NM"), Some(ClozeFormat::Numerical));
        assert_eq!(ClozeFormat::from_name("shortanswer"), None);
    }

    #[test]
    fn text_format_names() {
        assert_eq!(TextFormat::from_name("moodle"), Some(TextFormat::Auto));
        assert_eq!(TextFormat::from_name(" HTML "), Some(TextFormat::Html));
        assert_eq!(TextFormat::Markdown.name(), "markdown");
        assert_eq!(TextFormat::from_name("rtf"), None);
    }
}

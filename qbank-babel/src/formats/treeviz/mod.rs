//! Treeviz formatter for question banks
//!
//! A visual tree of the bank: categories, their questions and each question's answers,
//! one node per line with box-drawing connectors and an icon per node type.
//!
//! ```text
//! ⧉ top (3 questions, 2 categories)
//! ├─ ⊤ [truefalse] Sky: The sky is blue
//! │ ├─ ✓ true
//! │ └─ ✗ false
//! └─ § maths (2 questions)
//!   └─ # [numerical] Eight: What is 8?
//!     └─ ✓ 8 ± 2
//! ```
//!
//! Question previews are truncated to 30 characters.
//!
//! Parameters: `show-dbids` and `show-tags` (both default `false`).

use super::common::{choice_lines, preview};
use super::icons::get_icon;
use crate::error::FormatError;
use crate::format::{flag, reject_unknown, Format};
use qbank_core::{Category, Question};
use std::collections::HashMap;

const PREVIEW_LEN: usize = 30;

#[derive(Debug, Clone, Copy, Default)]
struct Params {
    show_dbids: bool,
    show_tags: bool,
}

fn format_question(question: &Question, prefix: &str, is_last: bool, params: Params) -> String {
    let connector = if is_last { "└─" } else { "├─" };
    let qtype = question.question_type().name();
    let mut label = format!("[{qtype}] {}", question.name);
    if params.show_dbids {
        if let Some(dbid) = question.dbid {
            label.push_str(&format!(" #{dbid}"));
        }
    }
    let body = preview(&question.body, PREVIEW_LEN);
    if !body.is_empty() {
        label.push_str(&format!(": {body}"));
    }
    if params.show_tags && !question.tags.is_empty() {
        let tags: Vec<&str> = question.tags.iter().map(String::as_str).collect();
        label.push_str(&format!(" ({})", tags.join(", ")));
    }

    let mut output = format!("{prefix}{connector} {} {label}\n", get_icon(qtype));
    let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    let lines = choice_lines(&question.kind);
    for (i, line) in lines.iter().enumerate() {
        let connector = if i == lines.len() - 1 { "└─" } else { "├─" };
        output.push_str(&format!(
            "{child_prefix}{connector} {} {}\n",
            get_icon(line.icon_key()),
            line.label
        ));
    }
    output
}

fn format_category(cat: &Category, prefix: &str, params: Params) -> String {
    let mut output = String::new();
    let count = cat.questions().len() + cat.subcats().len();
    for (i, question) in cat.questions().iter().enumerate() {
        output.push_str(&format_question(question, prefix, i == count - 1, params));
    }
    for (j, subcat) in cat.subcats().iter().enumerate() {
        let is_last = cat.questions().len() + j == count - 1;
        let connector = if is_last { "└─" } else { "├─" };
        output.push_str(&format!(
            "{prefix}{connector} {} {} ({} questions)\n",
            get_icon("Category"),
            subcat.name(),
            subcat.get_size(true)
        ));
        let child_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
        output.push_str(&format_category(subcat, &child_prefix, params));
    }
    output
}

pub fn to_treeviz_str(bank: &Category) -> String {
    to_treeviz_str_with_params(bank, &HashMap::new())
}

/// Convert a bank to treeviz string with optional parameters
pub fn to_treeviz_str_with_params(bank: &Category, params: &HashMap<String, String>) -> String {
    let params = Params {
        show_dbids: flag(params, "show-dbids", false),
        show_tags: flag(params, "show-tags", false),
    };
    let categories = bank.walk().count() - 1;
    let output = format!(
        "{} {} ({} questions, {} categories)\n",
        get_icon("Bank"),
        bank.name(),
        bank.get_size(true),
        categories
    );
    output + &format_category(bank, "", params)
}

/// Format implementation for treeviz format
pub struct TreevizFormat;

impl Format for TreevizFormat {
    fn name(&self) -> &str {
        "treeviz"
    }

    fn description(&self) -> &str {
        "Visual tree representation with indentation and Unicode icons"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tree", "treeviz"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, bank: &Category) -> Result<String, FormatError> {
        Ok(to_treeviz_str(bank))
    }

    fn serialize_with_options(
        &self,
        bank: &Category,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        reject_unknown(self.name(), options, &["show-dbids", "show-tags"])?;
        Ok(to_treeviz_str_with_params(bank, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_core::model::{Numerical, NumericalAnswer, Options, TrueFalse};
    use qbank_core::{FText, QuestionKind, TextFormat};

    fn sample() -> Category {
        let mut bank = Category::new("top");
        let mut sky = Question::new("Sky", QuestionKind::TrueFalse(TrueFalse::default()))
            .with_body(FText::from_text(TextFormat::Plain, "The sky is blue"));
        sky.dbid = Some(4);
        sky.tags.insert("nature".to_string());
        bank.add_question(sky).unwrap();

        let eight = Question::new(
            "Eight",
            QuestionKind::Numerical(Numerical {
                options: Options::new(vec![NumericalAnswer::new(100.0, 8.0, 2.0)]),
                ..Numerical::default()
            }),
        )
        .with_body(FText::from_text(TextFormat::Plain, "What is 8?"));
        bank.get_or_create_path("maths").add_question(eight).unwrap();
        bank
    }

    #[test]
    fn test_tree_layout() {
        insta::assert_snapshot!(to_treeviz_str(&sample()), @r###"
        ⧉ top (2 questions, 1 categories)
        ├─ ⊤ [truefalse] Sky: The sky is blue
        │ ├─ ✓ true
        │ └─ ✗ false
        └─ § maths (1 questions)
          └─ # [numerical] Eight: What is 8?
            └─ ✓ 8 ± 2
        "###);
    }

    #[test]
    fn test_dbids_and_tags() {
        let mut params = HashMap::new();
        params.insert("show-dbids".to_string(), "true".to_string());
        params.insert("show-tags".to_string(), "true".to_string());
        let output = to_treeviz_str_with_params(&sample(), &params);
        assert!(output.contains("[truefalse] Sky #4: The sky is blue (nature)"));
    }

    #[test]
    fn test_empty_bank() {
        assert_eq!(
            to_treeviz_str(&Category::new("top")),
            "⧉ top (0 questions, 0 categories)\n"
        );
    }
}

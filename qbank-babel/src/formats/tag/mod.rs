//! XML-like tag serialization of the bank tree
//!
//! ## Format
//!
//! - Category → `<category name="...">`, questions first, then sub-categories
//! - Question → `<question type="..." name="...">` with `<body>` and one child per answer
//! - Answers → `<choice fraction="...">`, unscored entries → `<item>`
//!
//! ## Example
//!
//! ```text
//! <category name="top">
//!   <question type="truefalse" name="Sky">
//!     <body>The sky is blue</body>
//!     <choice fraction="100">true</choice>
//!     <choice fraction="0">false</choice>
//!   </question>
//! </category>
//! ```

use super::common::choice_lines;
use crate::error::FormatError;
use crate::format::{flag, reject_unknown, Format};
use qbank_core::model::numeric::format_number;
use qbank_core::text::gift::show_gaps;
use qbank_core::{Category, Question};
use std::collections::HashMap;

fn format_category(cat: &Category, indent_level: usize, full: bool) -> String {
    let indent = "  ".repeat(indent_level);
    let mut output = format!("{indent}<category name=\"{}\">", escape_xml(cat.name()));

    if cat.questions().is_empty() && cat.subcats().is_empty() && (!full || cat.metadata.is_empty()) {
        output.push_str("</category>\n");
        return output;
    }
    output.push('\n');

    if full {
        for (key, value) in &cat.metadata {
            output.push_str(&format!(
                "{indent}  <meta key=\"{}\">{}</meta>\n",
                escape_xml(key),
                escape_xml(value)
            ));
        }
    }
    for question in cat.questions() {
        output.push_str(&format_question(question, indent_level + 1, full));
    }
    for subcat in cat.subcats() {
        output.push_str(&format_category(subcat, indent_level + 1, full));
    }
    output.push_str(&format!("{indent}</category>\n"));
    output
}

fn format_question(question: &Question, indent_level: usize, full: bool) -> String {
    let indent = "  ".repeat(indent_level);
    let dbid = question
        .dbid
        .map(|id| format!(" dbid=\"{id}\""))
        .unwrap_or_default();
    let mut output = format!(
        "{indent}<question type=\"{}\" name=\"{}\"{dbid}>\n",
        question.question_type(),
        escape_xml(&question.name)
    );
    output.push_str(&format!(
        "{indent}  <body>{}</body>\n",
        escape_xml(&show_gaps(&question.body.to_string()))
    ));

    for line in choice_lines(&question.kind) {
        match line.fraction {
            Some(fraction) => output.push_str(&format!(
                "{indent}  <choice fraction=\"{}\">{}</choice>\n",
                format_number(fraction),
                escape_xml(&line.label)
            )),
            None => output.push_str(&format!("{indent}  <item>{}</item>\n", escape_xml(&line.label))),
        }
    }

    if full {
        for tag in &question.tags {
            output.push_str(&format!("{indent}  <tag>{}</tag>\n", escape_xml(tag)));
        }
        if !question.remarks.is_empty() {
            output.push_str(&format!(
                "{indent}  <remarks>{}</remarks>\n",
                escape_xml(&question.remarks.to_string())
            ));
        }
        for hint in &question.free_hints {
            output.push_str(&format!("{indent}  <hint>{}</hint>\n", escape_xml(&hint.to_string())));
        }
    }

    output.push_str(&format!("{indent}</question>\n"));
    output
}

/// Serialize a bank to tag format
pub fn serialize_bank(bank: &Category) -> String {
    serialize_bank_with_params(bank, &HashMap::new())
}

/// Serialize a bank to tag format with optional parameters
///
/// # Parameters
///
/// - `"full"`: when `"true"`, also writes category metadata, question tags, general
///   feedback and hints
pub fn serialize_bank_with_params(bank: &Category, params: &HashMap<String, String>) -> String {
    let full = flag(params, "full", false);
    let mut result = format_category(bank, 0, full);
    if result.ends_with('\n') {
        result.pop();
    }
    result
}

/// Escape XML special characters
fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\"', "&quot;")
        .replace('\'', "&apos;")
}

/// Format implementation for XML-like tag format
pub struct TagFormat;

impl Format for TagFormat {
    fn name(&self) -> &str {
        "tag"
    }

    fn description(&self) -> &str {
        "XML-like tag format with hierarchical structure"
    }

    fn file_extensions(&self) -> &[&str] {
        &["tag", "xml"]
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn serialize(&self, bank: &Category) -> Result<String, FormatError> {
        Ok(serialize_bank(bank))
    }

    fn serialize_with_options(
        &self,
        bank: &Category,
        options: &HashMap<String, String>,
    ) -> Result<String, FormatError> {
        reject_unknown(self.name(), options, &["full"])?;
        Ok(serialize_bank_with_params(bank, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_core::model::TrueFalse;
    use qbank_core::{FText, QuestionKind, TextFormat};

    fn sky() -> Question {
        let mut question = Question::new("Sky", QuestionKind::TrueFalse(TrueFalse::default()))
            .with_body(FText::from_text(TextFormat::Plain, "The sky is <blue>"));
        question.tags.insert("nature".to_string());
        question
    }

    #[test]
    fn test_serialize_question() {
        let mut bank = Category::new("top");
        bank.add_question(sky()).unwrap();

        insta::assert_snapshot!(serialize_bank(&bank), @r###"
        <category name="top">
          <question type="truefalse" name="Sky">
            <body>The sky is &lt;blue&gt;</body>
            <choice fraction="100">true</choice>
            <choice fraction="0">false</choice>
          </question>
        </category>
        "###);
    }

    #[test]
    fn test_empty_category() {
        let mut bank = Category::new("top");
        bank.get_or_create_path("empty");
        assert_eq!(
            serialize_bank(&bank),
            "<category name=\"top\">\n  <category name=\"empty\"></category>\n</category>"
        );
    }

    #[test]
    fn test_full_adds_tags() {
        let mut bank = Category::new("top");
        bank.add_question(sky()).unwrap();
        let mut params = HashMap::new();
        params.insert("full".to_string(), "true".to_string());

        let result = serialize_bank_with_params(&bank, &params);
        assert!(result.contains("<tag>nature</tag>"));
        assert!(!serialize_bank(&bank).contains("<tag>"));
    }
}

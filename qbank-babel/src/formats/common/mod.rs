//! Common utilities for the inspection formats
//!
//! This module provides shared functionality for formats that display the bank tree,
//! particularly diagnostic formats like treeviz and tag.

use qbank_core::model::numeric::format_number;
use qbank_core::text::gift::show_gaps;
use qbank_core::{FText, QuestionKind};

/// One line of a question's answer summary.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceLine {
    /// Credit for the choice; `None` for entries that are not scored on their own.
    pub fraction: Option<f64>,
    pub label: String,
}

impl ChoiceLine {
    fn scored(fraction: f64, label: impl Into<String>) -> Self {
        Self {
            fraction: Some(fraction),
            label: label.into(),
        }
    }

    fn plain(label: impl Into<String>) -> Self {
        Self {
            fraction: None,
            label: label.into(),
        }
    }

    /// Icon key for [`super::icons::get_icon`].
    pub fn icon_key(&self) -> &'static str {
        match self.fraction {
            Some(f) if f >= 100.0 => "Right",
            Some(f) if f > 0.0 => "Partial",
            Some(_) => "Wrong",
            None => "Other",
        }
    }
}

/// Flattened view of the answers of any question kind.
pub fn choice_lines(kind: &QuestionKind) -> Vec<ChoiceLine> {
    match kind {
        QuestionKind::Description | QuestionKind::Essay(_) => Vec::new(),
        QuestionKind::TrueFalse(tf) => vec![
            ChoiceLine::scored(tf.true_ans.fraction, "true"),
            ChoiceLine::scored(tf.false_ans.fraction, "false"),
        ],
        QuestionKind::Numerical(q) => q
            .options
            .items
            .iter()
            .map(|a| ChoiceLine::scored(a.answer.fraction, numeric_label(&a.answer.text, a.tolerance)))
            .collect(),
        QuestionKind::Calculated(q) => q
            .options
            .items
            .iter()
            .map(|a| ChoiceLine::scored(a.numeric.answer.fraction, format!("={}", a.numeric.answer.text)))
            .collect(),
        QuestionKind::CalculatedMultichoice(q) => q
            .options
            .items
            .iter()
            .map(|a| ChoiceLine::scored(a.numeric.answer.fraction, format!("={}", a.numeric.answer.text)))
            .collect(),
        QuestionKind::Multichoice(q) => q
            .options
            .items
            .iter()
            .map(|a| ChoiceLine::scored(a.fraction, a.text.clone()))
            .collect(),
        QuestionKind::ShortAnswer(q) => q
            .options
            .items
            .iter()
            .map(|a| ChoiceLine::scored(a.fraction, a.text.clone()))
            .collect(),
        QuestionKind::Matching(q) => q
            .options
            .items
            .iter()
            .map(|sub| ChoiceLine::plain(format!("{} -> {}", sub.text, sub.answer)))
            .collect(),
        QuestionKind::RandomMatching(q) => vec![ChoiceLine::plain(format!(
            "choose {} (subcategories: {})",
            q.choose, q.subcats
        ))],
        QuestionKind::MissingWord(q) => q
            .options
            .items
            .iter()
            .enumerate()
            .map(|(idx, opt)| ChoiceLine::plain(format!("[[{}]] {} (group {})", idx + 1, opt.text, opt.group)))
            .collect(),
        QuestionKind::Embedded(q) => q
            .options
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| ChoiceLine::plain(format!("#{} {}", idx + 1, item.to_cloze())))
            .collect(),
        QuestionKind::DragAndDropText(q) => drag_lines(&q.options.items),
        QuestionKind::DragAndDropImage(q) => drag_lines(&q.options.items),
        QuestionKind::DragAndDropMarker(q) => drag_lines(&q.options.items),
        QuestionKind::Problem(problem) => problem
            .subquestions
            .iter()
            .map(|sub| ChoiceLine::plain(format!("{} [{}]", sub.name, sub.question_type())))
            .collect(),
    }
}

fn drag_lines(items: &[qbank_core::model::DragItem]) -> Vec<ChoiceLine> {
    items
        .iter()
        .map(|item| ChoiceLine::plain(format!("{}. {}", item.number, item.text)))
        .collect()
}

fn numeric_label(value: &str, tolerance: f64) -> String {
    if tolerance == 0.0 {
        value.to_string()
    } else {
        format!("{value} ± {}", format_number(tolerance))
    }
}

/// Single-line preview of rich text, cut at `max` characters.
pub fn preview(text: &FText, max: usize) -> String {
    let flat = show_gaps(&text.to_string()).split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max {
        return flat;
    }
    let cut: String = flat.chars().take(max).collect();
    format!("{cut}…")
}

//! Inspect views
//!
//! Each view renders a loaded bank for a human (or a diff) without converting it to
//! an interchange format:
//!
//! - `treeviz`: tree visualization with Unicode icons (default)
//! - `tag`: XML-like tags, `--extra-full` adds metadata, tags and hints
//! - `json`: the native JSON form
//! - `stats`: sizes and a per-type question count, as JSON
//!
//! ## Extra Parameters
//!
//! Views accept extra parameters via `--extra-<name> [value]`, passed on untouched to the
//! underlying serializer. Example: `qbank inspect bank.gift treeviz --extra-show-tags`

use qbank_babel::format::Format;
use qbank_babel::formats::{JsonFormat, TagFormat, TreevizFormat};
use qbank_core::{Category, QuestionType};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

/// All available inspect views
pub const AVAILABLE_VIEWS: &[&str] = &["treeviz", "tag", "json", "stats"];

/// Render `bank` with the named view
pub fn execute_view(
    bank: &Category,
    view: &str,
    extra_params: &HashMap<String, String>,
) -> Result<String, String> {
    let rendered = match view {
        "treeviz" => TreevizFormat.serialize_with_options(bank, extra_params),
        "tag" => TagFormat.serialize_with_options(bank, extra_params),
        "json" => JsonFormat.serialize_with_options(bank, extra_params),
        "stats" => {
            if let Some(key) = extra_params.keys().next() {
                return Err(format!("View 'stats' takes no parameters (got '{key}')"));
            }
            return serde_json::to_string_pretty(&stats(bank))
                .map(|text| text + "\n")
                .map_err(|e| format!("JSON serialization failed: {e}"));
        }
        other => return Err(format!("Unknown view '{other}'")),
    };
    rendered
        .map(|mut text| {
            if !text.ends_with('\n') {
                text.push('\n');
            }
            text
        })
        .map_err(|e| e.to_string())
}

fn stats(bank: &Category) -> serde_json::Value {
    let mut types: BTreeMap<&str, usize> = BTreeMap::new();
    for (_, cat) in bank.walk() {
        for question in cat.questions() {
            *types.entry(question.question_type().name()).or_default() += 1;
        }
    }
    let numbered = bank.get_dbids().len();
    json!({
        "categories": bank.walk().count(),
        "questions": bank.get_size(true),
        "depth": bank.get_depth(),
        "with_dbid": numbered,
        "types": types,
    })
}

/// Names accepted by `find --type`.
pub fn question_type_names() -> Vec<&'static str> {
    QuestionType::ALL.iter().map(|ty| ty.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_core::{Question, QuestionKind};

    fn sample() -> Category {
        let mut bank = Category::new("top");
        bank.add_question(Question::new("intro", QuestionKind::Description))
            .unwrap();
        bank.get_or_create_path("a/b")
            .add_question(Question::new("q", QuestionKind::new(QuestionType::Essay)))
            .unwrap();
        bank
    }

    #[test]
    fn test_stats_counts() {
        let output = execute_view(&sample(), "stats", &HashMap::new()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["categories"], 3);
        assert_eq!(value["questions"], 2);
        assert_eq!(value["depth"], 3);
        assert_eq!(value["types"]["essay"], 1);
        assert_eq!(value["types"]["description"], 1);
    }

    #[test]
    fn test_views_end_with_newline() {
        for view in AVAILABLE_VIEWS {
            let output = execute_view(&sample(), view, &HashMap::new()).unwrap();
            assert!(output.ends_with('\n'), "{view}");
        }
    }

    #[test]
    fn test_unknown_view_and_params() {
        assert!(execute_view(&sample(), "nodemap", &HashMap::new()).is_err());
        let mut params = HashMap::new();
        params.insert("bogus".to_string(), "true".to_string());
        assert!(execute_view(&sample(), "treeviz", &params).is_err());
        assert!(execute_view(&sample(), "stats", &params).is_err());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(question_type_names().len(), QuestionType::ALL.len());
        assert!(question_type_names().contains(&"multichoice"));
    }
}

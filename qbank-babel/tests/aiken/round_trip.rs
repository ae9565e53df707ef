//! Aiken file → bank → Aiken file

use qbank_babel::formats::aiken::{parse_aiken, serialize_aiken};
use qbank_core::{Category, QuestionKind};
use std::path::PathBuf;

const MOOC_STEM: &str = "During the month of September 2013, Moodle ran a successful MOOC for teachers new to Moodle. What was the name of the course?";

fn load_fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("aiken")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"))
}

/// Stem and index of the fully correct option of every question.
fn summary(bank: &Category) -> Vec<(String, usize)> {
    bank.questions()
        .iter()
        .map(|question| {
            let QuestionKind::Multichoice(mc) = &question.kind else {
                panic!("expected multichoice, got {}", question.question_type());
            };
            let correct: Vec<usize> = mc
                .options
                .items
                .iter()
                .enumerate()
                .filter(|(_, answer)| answer.fraction == 100.0)
                .map(|(idx, _)| idx)
                .collect();
            assert_eq!(correct.len(), 1, "one right answer in {}", question.name);
            (question.body.literal_text(), correct[0])
        })
        .collect()
}

#[test]
fn test_fixture_parses() {
    let bank = parse_aiken(&load_fixture("moodle.aiken")).unwrap();
    assert_eq!(bank.questions().len(), 5);

    let mooc = &bank.questions()[1];
    assert_eq!(mooc.body.literal_text(), MOOC_STEM);
    let QuestionKind::Multichoice(mc) = &mooc.kind else {
        panic!("expected multichoice");
    };
    let options: Vec<(&str, f64)> = mc
        .options
        .items
        .iter()
        .map(|answer| (answer.text.as_str(), answer.fraction))
        .collect();
    assert_eq!(
        options,
        vec![
            ("Teaching with Moodle", 100.0),
            ("Moodle for teachers", 0.0),
            ("Moodle MOOC", 0.0),
        ]
    );
}

#[test]
fn test_round_trip_keeps_stems_and_answers() {
    let bank = parse_aiken(&load_fixture("moodle.aiken")).unwrap();
    let written = serialize_aiken(&bank).unwrap();
    let reparsed = parse_aiken(&written).unwrap();

    assert_eq!(summary(&reparsed), summary(&bank));
    assert_eq!(summary(&reparsed)[1], (MOOC_STEM.to_string(), 0));
    assert_eq!(serialize_aiken(&reparsed).unwrap(), written);
}

#[test]
fn test_categories_are_flattened() {
    let mut bank = parse_aiken(&load_fixture("moodle.aiken")).unwrap();
    let moved = bank.pop_question(0).unwrap();
    bank.get_or_create_path("nested/deeper")
        .add_question(moved)
        .unwrap();

    let reparsed = parse_aiken(&serialize_aiken(&bank).unwrap()).unwrap();
    assert_eq!(reparsed.questions().len(), 5);
    assert!(reparsed.subcats().is_empty());
}

//! Import tests for GIFT format (GIFT → bank)

use super::load_fixture;
use qbank_babel::formats::gift::parse_gift_bank;
use qbank_core::{Category, Question, QuestionType};

fn sample() -> Category {
    parse_gift_bank(&load_fixture("sample.gift")).expect("Should parse GIFT")
}

fn find<'a>(cat: &'a Category, name: &str) -> &'a Question {
    cat.questions()
        .iter()
        .find(|q| q.name == name)
        .unwrap_or_else(|| panic!("no question {name}"))
}

#[test]
fn test_categories() {
    let bank = sample();
    assert_eq!(bank.name(), "top");
    assert!(bank.questions().is_empty());

    let general = bank.subcat("General").unwrap();
    assert_eq!(general.questions().len(), 3);
    assert_eq!(general.subcat("Fill").unwrap().questions().len(), 3);
    assert_eq!(bank.get_size(true), 6);
}

#[test]
fn test_question_kinds() {
    let bank = sample();
    let general = bank.subcat("General").unwrap();
    let fill = general.subcat("Fill").unwrap();

    assert_eq!(find(general, "Grant").question_type(), QuestionType::Multichoice);
    assert_eq!(find(general, "Sky").question_type(), QuestionType::TrueFalse);
    assert_eq!(find(general, "Eight").question_type(), QuestionType::Numerical);
    assert_eq!(find(fill, "Two").question_type(), QuestionType::ShortAnswer);
    assert_eq!(find(fill, "Capitals").question_type(), QuestionType::Matching);
    assert_eq!(find(fill, "Story").question_type(), QuestionType::Essay);
}

#[test]
fn test_numeric_value_and_tolerance() {
    let bank = sample();
    let eight = find(bank.subcat("General").unwrap(), "Eight");
    let qbank_core::QuestionKind::Numerical(numerical) = &eight.kind else {
        panic!("expected numerical");
    };
    assert_eq!(numerical.options.items.len(), 1);
    let answer = &numerical.options.items[0];
    assert_eq!(answer.answer.text, "8");
    assert_eq!(answer.tolerance, 2.0);
    assert_eq!(answer.answer.fraction, 100.0);
}

#[test]
fn test_every_question_checks() {
    let bank = sample();
    assert!(bank.check_all().is_empty(), "{:?}", bank.check_all());
}

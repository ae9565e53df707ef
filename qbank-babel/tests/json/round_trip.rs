//! Bank → JSON → bank for every question kind

use qbank_babel::formats::json::{parse_json, serialize_json};
use qbank_core::model::{Answer, Multichoice, Options};
use qbank_core::{Category, FText, Question, QuestionKind, QuestionType, TextFormat};

fn full_tree() -> Category {
    let mut bank = Category::new("top");
    bank.metadata.insert("course".to_string(), "101".to_string());
    for (idx, ty) in QuestionType::ALL.into_iter().enumerate() {
        let path = if idx % 2 == 0 { "even" } else { "odd/deeper" };
        let question = Question::new(ty.name(), QuestionKind::new(ty))
            .with_body(FText::from_text(TextFormat::Html, format!("<p>Question {idx}</p>")));
        bank.get_or_create_path(path).add_question(question).unwrap();
    }

    let mut tagged = Question::new(
        "tagged",
        QuestionKind::Multichoice(Multichoice {
            options: Options::new(vec![Answer::new(100.0, "yes"), Answer::new(-33.333, "no")]),
            ..Multichoice::default()
        }),
    );
    tagged.tags.insert("review".to_string());
    tagged.default_grade = 2.5;
    tagged.time_lim = 60;
    tagged.free_hints.push(FText::from_text(TextFormat::Plain, "think"));
    bank.add_question(tagged).unwrap();
    bank.gen_dbids();
    bank
}

#[test]
fn test_round_trip_every_kind() {
    let bank = full_tree();
    for pretty in [true, false] {
        let json = serialize_json(&bank, pretty).unwrap();
        let loaded = parse_json(&json).unwrap();
        assert_eq!(loaded, bank);
        assert_eq!(loaded.get_size(true), QuestionType::ALL.len() + 1);
    }
}

#[test]
fn test_loading_relinks_parents() {
    let loaded = parse_json(&serialize_json(&full_tree(), true).unwrap()).unwrap();
    let odd = loaded.subcat("odd").unwrap();
    let deeper = odd.subcat("deeper").unwrap();
    assert_eq!(odd.parent(), Some(loaded.id()));
    assert_eq!(deeper.parent(), Some(odd.id()));
    for question in deeper.questions() {
        assert_eq!(question.parent(), Some(deeper.id()));
    }
}

#[test]
fn test_dbids_survive() {
    let bank = full_tree();
    let loaded = parse_json(&serialize_json(&bank, false).unwrap()).unwrap();
    assert_eq!(loaded.get_dbids(), bank.get_dbids());
    assert_eq!(loaded.get_dbids().len(), QuestionType::ALL.len() + 1);
}

//! Aiken format
//!
//! One multiple-choice question per group of lines:
//!
//! ```text
//! What is the capital of France?
//! A. Lyon
//! B) Paris
//! ANSWER: B
//! ```
//!
//! Stem lines run until the first option line (`X.` or `X)` followed by a space,
//! `X` an uppercase letter). Blank lines are ignored. Aiken has no categories, so
//! parsing yields a single root and writing flattens the tree. Only single-answer
//! multiple choice questions are written; everything else is skipped with a warning.

use crate::error::FormatError;
use crate::format::Format;
use qbank_core::model::{Answer, Multichoice, Options};
use qbank_core::text::gift::show_gaps;
use qbank_core::{Category, FText, Question, QuestionKind, TextFormat};

const ROOT_NAME: &str = "top";
const NAME_LEN: usize = 40;
const LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Default)]
struct Pending {
    stem: Vec<String>,
    options: Vec<(char, String)>,
    line: usize,
}

pub fn parse_aiken(source: &str) -> Result<Category, FormatError> {
    let mut root = Category::new(ROOT_NAME);
    let mut pending = Pending::default();

    for (idx, raw) in source.lines().enumerate() {
        let line = raw.trim();
        let number = idx + 1;
        if line.is_empty() {
            continue;
        }
        if pending.stem.is_empty() {
            pending.line = number;
            pending.stem.push(line.to_string());
            continue;
        }
        if let Some(letter) = line.strip_prefix("ANSWER:") {
            let question = finish(std::mem::take(&mut pending), letter.trim(), number)?;
            root.add_question(question)
                .map_err(|q| FormatError::ParseError(format!("question '{}' added twice", q.name)))?;
            continue;
        }
        match option_line(line) {
            Some(option) => pending.options.push(option),
            None if pending.options.is_empty() => pending.stem.push(line.to_string()),
            None => {
                return Err(FormatError::ParseError(format!(
                    "line {number}: expected an option or ANSWER line"
                )))
            }
        }
    }

    if !pending.stem.is_empty() {
        return Err(FormatError::ParseError(format!(
            "line {}: question has no ANSWER line",
            pending.line
        )));
    }
    Ok(root)
}

fn option_line(line: &str) -> Option<(char, String)> {
    let mut chars = line.chars();
    let letter = chars.next().filter(char::is_ascii_uppercase)?;
    if !matches!(chars.next(), Some('.') | Some(')')) {
        return None;
    }
    let rest = chars.as_str();
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some((letter, rest.trim().to_string()))
}

fn finish(pending: Pending, letter: &str, number: usize) -> Result<Question, FormatError> {
    if pending.options.is_empty() {
        return Err(FormatError::ParseError(format!(
            "line {number}: question has no options"
        )));
    }
    let correct = letter.chars().next();
    if !pending.options.iter().any(|(l, _)| Some(*l) == correct) {
        return Err(FormatError::ParseError(format!(
            "line {number}: ANSWER '{letter}' names no option"
        )));
    }

    let answers = pending
        .options
        .into_iter()
        .map(|(l, text)| {
            let fraction = if Some(l) == correct { 100.0 } else { 0.0 };
            Answer::new(fraction, text)
        })
        .collect();
    let stem = pending.stem.join("\n");
    let name: String = stem.chars().take(NAME_LEN).collect();
    let kind = QuestionKind::Multichoice(Multichoice {
        options: Options::new(answers),
        ..Multichoice::default()
    });
    Ok(Question::new(name.trim(), kind).with_body(FText::from_text(TextFormat::Plain, stem)))
}

pub fn serialize_aiken(bank: &Category) -> Result<String, FormatError> {
    let mut out = String::new();
    for (_, cat) in bank.walk() {
        for question in cat.questions() {
            match aiken_block(question) {
                Some(block) => {
                    out.push_str(&block);
                    out.push('\n');
                }
                None => tracing::warn!(
                    question = %question.name,
                    qtype = %question.question_type(),
                    "not a single-answer multiple choice question, skipped"
                ),
            }
        }
    }
    Ok(out)
}

fn aiken_block(question: &Question) -> Option<String> {
    let QuestionKind::Multichoice(mc) = &question.kind else {
        return None;
    };
    let items = &mc.options.items;
    if !mc.single || items.is_empty() || items.len() > LETTERS.len() {
        return None;
    }
    let correct = mc.correct_index()?;
    if items.iter().filter(|answer| answer.is_correct()).count() > 1 {
        return None;
    }

    let mut block = one_line(&show_gaps(&question.body.to_string()));
    block.push('\n');
    for (letter, answer) in LETTERS.chars().zip(items) {
        block.push_str(&format!("{letter}. {}\n", one_line(&answer.text)));
    }
    let answer = LETTERS.chars().nth(correct)?;
    block.push_str(&format!("ANSWER: {answer}\n"));
    Some(block)
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Format implementation for Aiken
pub struct AikenFormat;

impl Format for AikenFormat {
    fn name(&self) -> &str {
        "aiken"
    }

    fn description(&self) -> &str {
        "Aiken single-answer multiple choice format"
    }

    fn file_extensions(&self) -> &[&str] {
        &["aiken"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Category, FormatError> {
        parse_aiken(source)
    }

    fn serialize(&self, bank: &Category) -> Result<String, FormatError> {
        serialize_aiken(bank)
    }
}

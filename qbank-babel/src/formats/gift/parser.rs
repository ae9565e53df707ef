//! GIFT file → category tree
//!
//! The block syntax is read by `qbank_core::text::gift`; this module maps each parsed
//! block onto a question and files it under the current `$CATEGORY:` path.

use crate::error::FormatError;
use qbank_core::model::{
    Essay, Matching, Multichoice, Numerical, Options, ShortAnswer, Subquestion, TrueFalse,
};
use qbank_core::text::gift::{parse_gift, GiftAnswer, GiftEntry, GiftItem};
use qbank_core::text::parse_text;
use qbank_core::{Category, Delimiters, FText, Question, QuestionKind, TextFormat};

/// Name of the root category of a parsed file.
pub const ROOT_NAME: &str = "top";

const NAME_LEN: usize = 40;

pub fn parse_gift_bank(source: &str) -> Result<Category, FormatError> {
    let mut root = Category::new(ROOT_NAME);
    let mut path = String::new();

    for entry in parse_gift(source)? {
        match entry {
            GiftEntry::Category(raw) => {
                path = category_path(&raw);
                root.get_or_create_path(&path);
            }
            GiftEntry::Question(item) => {
                let question = to_question(item)?;
                root.get_or_create_path(&path)
                    .add_question(question)
                    .map_err(|q| FormatError::ParseError(format!("question '{}' added twice", q.name)))?;
            }
        }
    }
    Ok(root)
}

/// Drop Moodle context markers (`$course$`) and the implicit root from a path.
fn category_path(raw: &str) -> String {
    let mut parts: Vec<&str> = raw
        .split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .skip_while(|part| part.len() > 1 && part.starts_with('$') && part.ends_with('$'))
        .collect();
    if parts.first() == Some(&ROOT_NAME) {
        parts.remove(0);
    }
    parts.join("/")
}

fn to_question(item: GiftItem) -> Result<Question, FormatError> {
    let format = item.format;
    let rich = |text: &str| parse_text(text, format, &Delimiters::rich());
    let feedback = |text: String| FText::from_text(format, text);

    let body = rich(&item.question_text())?;
    let name = item
        .title
        .clone()
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| item.header.chars().take(NAME_LEN).collect::<String>().trim().to_string());

    let kind = match item.answer {
        GiftAnswer::Description => QuestionKind::Description,
        GiftAnswer::Essay => QuestionKind::Essay(Essay::default()),
        GiftAnswer::TrueFalse {
            correct,
            wrong_feedback,
            right_feedback,
        } => {
            let mut tf = TrueFalse::default();
            tf.set_correct(correct);
            let (right, wrong) = if correct {
                (&mut tf.true_ans, &mut tf.false_ans)
            } else {
                (&mut tf.false_ans, &mut tf.true_ans)
            };
            right.feedback = right_feedback.map(feedback);
            wrong.feedback = wrong_feedback.map(feedback);
            QuestionKind::TrueFalse(tf)
        }
        GiftAnswer::Numerical(answers) => QuestionKind::Numerical(Numerical {
            options: Options::new(answers),
            ..Numerical::default()
        }),
        GiftAnswer::ShortAnswer(answers) => QuestionKind::ShortAnswer(ShortAnswer {
            options: Options::new(answers),
            ..ShortAnswer::default()
        }),
        GiftAnswer::Multichoice { choices, single } => QuestionKind::Multichoice(Multichoice {
            options: Options::new(choices),
            single,
            ..Multichoice::default()
        }),
        GiftAnswer::Matching(pairs) => {
            let subquestions = pairs
                .into_iter()
                .map(|(left, answer)| Subquestion {
                    text: FText::from_text(format, left),
                    answer,
                })
                .collect();
            QuestionKind::Matching(Matching {
                options: Options::new(subquestions),
            })
        }
    };

    let mut question = Question::new(name, kind).with_body(body);
    if let Some(general) = &item.general_feedback {
        question.remarks = rich(general)?;
    }
    if item.ambiguous {
        tracing::debug!(question = %question.name, "kept ambiguous GIFT block as short answer");
    }
    Ok(question)
}

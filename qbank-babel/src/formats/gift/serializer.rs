//! Category tree → GIFT file
//!
//! Every category holding questions gets a `$CATEGORY:` line. Question kinds GIFT
//! cannot express (cloze, calculated, drag and drop, ...) are skipped with a warning.

use super::parser::ROOT_NAME;
use crate::error::FormatError;
use qbank_core::model::answer::fraction_prefix;
use qbank_core::model::numeric::format_number;
use qbank_core::model::{Answer, NumericalAnswer};
use qbank_core::text::cursor::escape_leading_bracket;
use qbank_core::text::gift::{escape_gift, TAIL_MARKER};
use qbank_core::{Category, Delimiters, FText, Question, QuestionKind, TextFormat};

pub fn serialize_gift(bank: &Category, comments: bool) -> Result<String, FormatError> {
    let mut out = String::new();
    for (path, cat) in bank.walk() {
        if cat.questions().is_empty() {
            continue;
        }
        out.push_str(&format!("$CATEGORY: $course$/{}\n\n", category_path(bank, &path)));
        for question in cat.questions() {
            let Some(block) = answer_block(question) else {
                tracing::warn!(
                    question = %question.name,
                    qtype = %question.question_type(),
                    "question type has no GIFT form, skipped"
                );
                continue;
            };
            if comments {
                match question.dbid {
                    Some(dbid) => out.push_str(&format!("// question: {dbid}  name: {}\n", question.name)),
                    None => out.push_str(&format!("// question: name: {}\n", question.name)),
                }
            }
            out.push_str(&format!("::{}::", escape_gift(&question.name)));
            if question.body.format != TextFormat::Auto {
                out.push_str(&format!("[{}]", question.body.format.name()));
            }
            let body = escape_leading_bracket(text(&question.body).trim_start());
            match body.split_once(TAIL_MARKER) {
                Some((head, tail)) => {
                    out.push_str(head.trim_end());
                    out.push_str(&block);
                    if !tail.trim().is_empty() {
                        out.push(' ');
                        out.push_str(tail.trim_start());
                    }
                }
                None => {
                    out.push_str(&body);
                    out.push_str(&block);
                }
            }
            out.push_str("\n\n");
        }
    }
    Ok(out)
}

/// Path under the implicit `top` root that GIFT readers assume.
fn category_path(bank: &Category, path: &str) -> String {
    match path.strip_prefix(bank.name()) {
        Some(rest) => format!("{ROOT_NAME}{rest}"),
        None => path.to_string(),
    }
}

fn text(ftext: &FText) -> String {
    escape_gift(&ftext.to_source(TextFormat::Plain, &Delimiters::rich()))
}

fn feedback(answer: &Answer) -> String {
    match &answer.feedback {
        Some(feedback) if !feedback.is_empty() => format!("#{}", text(feedback)),
        _ => String::new(),
    }
}

/// The `{...}` block, or an empty string for a description. `None` when the
/// question kind has no GIFT form.
fn answer_block(question: &Question) -> Option<String> {
    let mut lines: Vec<String> = match &question.kind {
        QuestionKind::Description => return Some(String::new()),
        QuestionKind::Essay(_) => Vec::new(),
        QuestionKind::TrueFalse(tf) => {
            let (right, wrong) = if tf.correct() {
                (&tf.true_ans, &tf.false_ans)
            } else {
                (&tf.false_ans, &tf.true_ans)
            };
            let word = if tf.correct() { "TRUE" } else { "FALSE" };
            let mut line = word.to_string();
            if right.feedback.is_some() || wrong.feedback.is_some() {
                line.push_str(&format!("#{}", optional_text(&wrong.feedback)));
                line.push_str(&format!("#{}", optional_text(&right.feedback)));
            }
            vec![line]
        }
        QuestionKind::Numerical(q) => numerical_lines(&q.options.items),
        QuestionKind::Multichoice(q) => {
            let items = &q.options.items;
            // An all-`~` block with weights reads back as multiple answer.
            let promoted = if q.single && !items.iter().any(|answer| answer.fraction == 100.0) {
                items
                    .iter()
                    .enumerate()
                    .filter(|(_, answer)| answer.fraction > 0.0)
                    .max_by(|(_, a), (_, b)| a.fraction.total_cmp(&b.fraction))
                    .map(|(idx, _)| idx)
            } else {
                None
            };
            items
                .iter()
                .enumerate()
                .map(|(idx, answer)| {
                    let prefix = if promoted == Some(idx) {
                        full_prefix(answer.fraction)
                    } else if q.single {
                        fraction_prefix(answer.fraction, &answer.text)
                    } else {
                        format!("~%{}%", format_number(answer.fraction))
                    };
                    format!("{prefix}{}{}", escape_gift(&answer.text), feedback(answer))
                })
                .collect()
        }
        QuestionKind::ShortAnswer(q) => q
            .options
            .items
            .iter()
            .map(|answer| format!("{}{}{}", full_prefix(answer.fraction), escape_gift(&answer.text), feedback(answer)))
            .collect(),
        QuestionKind::Matching(q) => q
            .options
            .items
            .iter()
            .map(|sub| format!("={} -> {}", text(&sub.text), escape_gift(&sub.answer)))
            .collect(),
        _ => return None,
    };

    if !question.remarks.is_empty() {
        lines.push(format!("####{}", text(&question.remarks)));
    }
    if lines.is_empty() {
        return Some(" {}".to_string());
    }
    if lines.len() == 1 {
        return Some(format!(" {{{}}}", lines[0]));
    }
    let mut block = String::from(" {\n");
    for line in lines {
        block.push('\t');
        block.push_str(&line);
        block.push('\n');
    }
    block.push('}');
    Some(block)
}

fn optional_text(ftext: &Option<FText>) -> String {
    ftext.as_ref().map(text).unwrap_or_default()
}

/// `=` for full credit, `=%N%` otherwise.
fn full_prefix(fraction: f64) -> String {
    if fraction == 100.0 {
        "=".to_string()
    } else {
        format!("=%{}%", format_number(fraction))
    }
}

fn numerical_lines(answers: &[NumericalAnswer]) -> Vec<String> {
    let value = |answer: &NumericalAnswer| {
        if answer.tolerance == 0.0 {
            answer.answer.text.clone()
        } else {
            format!("{}:{}", answer.answer.text, format_number(answer.tolerance))
        }
    };
    match answers {
        [only] if only.answer.fraction == 100.0 => {
            vec![format!("#{}{}", value(only), feedback(&only.answer))]
        }
        _ => {
            let mut lines = vec!["#".to_string()];
            lines.extend(answers.iter().map(|answer| {
                format!(
                    "{}{}{}",
                    full_prefix(answer.answer.fraction),
                    value(answer),
                    feedback(&answer.answer)
                )
            }));
            lines
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::gift::parse_gift_bank;
    use qbank_core::model::{Multichoice, Options, TrueFalse};

    #[test]
    fn test_multichoice_block() {
        let mut right = Answer::new(100.0, "a=b");
        right.feedback = Some(FText::from_text(TextFormat::Auto, "yes"));
        let kind = QuestionKind::Multichoice(Multichoice {
            options: Options::new(vec![right, Answer::new(0.0, "c"), Answer::new(25.0, "d")]),
            ..Multichoice::default()
        });
        let mut bank = Category::new("top");
        bank.add_question(
            Question::new("Pick", kind).with_body(FText::from_text(TextFormat::Auto, "Which: one?")),
        )
        .unwrap();

        let gift = serialize_gift(&bank, false).unwrap();
        assert_eq!(
            gift,
            "$CATEGORY: $course$/top\n\n::Pick::Which\\: one? {\n\t=a\\=b#yes\n\t~c\n\t~%25%d\n}\n\n"
        );
    }

    #[test]
    fn test_partial_credit_single_answer_keeps_single() {
        let kind = QuestionKind::Multichoice(Multichoice {
            options: Options::new(vec![Answer::new(0.0, "a"), Answer::new(50.0, "b"), Answer::new(25.0, "c")]),
            single: true,
            ..Multichoice::default()
        });
        let mut bank = Category::new("top");
        bank.add_question(Question::new("Half", kind).with_body(FText::from_text(TextFormat::Auto, "Pick")))
            .unwrap();

        let gift = serialize_gift(&bank, false).unwrap();
        assert!(gift.contains("\t~a\n\t=%50%b\n\t~%25%c\n"));
        let back = parse_gift_bank(&gift).unwrap();
        let QuestionKind::Multichoice(mc) = &back.questions()[0].kind else {
            panic!("expected multichoice");
        };
        assert!(mc.single);
        let fractions: Vec<f64> = mc.options.items.iter().map(|answer| answer.fraction).collect();
        assert_eq!(fractions, vec![0.0, 50.0, 25.0]);
    }

    #[test]
    fn test_tail_text_follows_answer_block() {
        let source = "::Cost::Moodle costs {~lots =nothing} to use.";
        let bank = parse_gift_bank(source).unwrap();
        let gift = serialize_gift(&bank, false).unwrap();
        assert_eq!(
            gift,
            "$CATEGORY: $course$/top\n\n::Cost::Moodle costs {\n\t~lots\n\t=nothing\n} to use.\n\n"
        );
        assert_eq!(parse_gift_bank(&gift).unwrap(), bank);
    }

    #[test]
    fn test_leading_bracket_is_escaped() {
        let bank = parse_gift_bank("::List::\\[1, 2] is a list {T}").unwrap();
        assert_eq!(bank.questions()[0].body.format, TextFormat::Auto);
        assert_eq!(bank.questions()[0].body.literal_text(), "[1, 2] is a list");

        let gift = serialize_gift(&bank, false).unwrap();
        assert!(gift.contains("::List::\\[1, 2] is a list {TRUE}"));
        assert_eq!(parse_gift_bank(&gift).unwrap(), bank);
    }

    #[test]
    fn test_true_false_and_comment() {
        let mut tf = TrueFalse::default();
        tf.set_correct(false);
        let mut question = Question::new("TF", QuestionKind::TrueFalse(tf))
            .with_body(FText::from_text(TextFormat::Auto, "Grass is red"));
        question.dbid = Some(7);
        let mut bank = Category::new("bank");
        bank.get_or_create_path("sub").add_question(question).unwrap();

        let gift = serialize_gift(&bank, true).unwrap();
        assert_eq!(
            gift,
            "$CATEGORY: $course$/top/sub\n\n// question: 7  name: TF\n::TF::Grass is red {FALSE}\n\n"
        );
    }

    #[test]
    fn test_numerical_single_and_multiple() {
        let single = vec![NumericalAnswer::new(100.0, 8.0, 2.0)];
        assert_eq!(numerical_lines(&single), vec!["#8:2"]);

        let multiple = vec![
            NumericalAnswer::new(100.0, 3.14, 0.0),
            NumericalAnswer::new(50.0, 3.0, 0.5),
        ];
        assert_eq!(numerical_lines(&multiple), vec!["#", "=3.14", "=%50%3:0.5"]);
    }

    #[test]
    fn test_unsupported_kind_is_skipped() {
        let mut bank = Category::new("top");
        bank.add_question(Question::new("cloze", QuestionKind::new(qbank_core::QuestionType::Embedded)))
            .unwrap();
        assert_eq!(serialize_gift(&bank, false).unwrap(), "$CATEGORY: $course$/top\n\n");
    }
}

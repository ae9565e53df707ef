//! GIFT reader
//!
//! Two levels:
//!
//! - a line reader splits the file into question blocks, `$CATEGORY:` directives and
//!   comments (`ExpectHeader -> InBlock -> InAnswerList -> Tail`, a blank line outside an
//!   answer list closes the block)
//! - a character scanner turns one block into a [`GiftItem`]
//!
//! Both use the cursor escape rule with `~ = # { } :` as escapable characters.

use super::cloze::read_prefix;
use super::cursor::{escape, Cursor};
use super::ftext::FText;
use crate::enums::TextFormat;
use crate::error::MarkupError;
use crate::model::answer::{Answer, NumericalAnswer};

pub const GIFT_ESCAPES: &[char] = &['~', '=', '#', '{', '}', ':'];

/// Separates the header from text that followed the answer block.
pub const TAIL_MARKER: char = '\u{FFFC}';

/// How [`TAIL_MARKER`] is shown by writers with no answer block to put in its place.
pub const GAP: &str = "_____";

/// `text` with every [`TAIL_MARKER`] shown as [`GAP`].
pub fn show_gaps(text: &str) -> String {
    text.replace(TAIL_MARKER, &format!(" {GAP} "))
}

const CHOICE_END: &[char] = &['~', '=', '#'];

#[derive(Debug, Clone, PartialEq)]
pub enum GiftAnswer {
    /// No answer block at all.
    Description,
    /// Empty answer block.
    Essay,
    TrueFalse {
        correct: bool,
        wrong_feedback: Option<String>,
        right_feedback: Option<String>,
    },
    Numerical(Vec<NumericalAnswer>),
    ShortAnswer(Vec<Answer>),
    Multichoice {
        choices: Vec<Answer>,
        single: bool,
    },
    Matching(Vec<(String, String)>),
}

/// One parsed question block. Text fields are unescaped.
#[derive(Debug, Clone, PartialEq)]
pub struct GiftItem {
    pub title: Option<String>,
    pub format: TextFormat,
    pub header: String,
    pub answer: GiftAnswer,
    pub general_feedback: Option<String>,
    pub tail: String,
    /// Set when the choices could be read as either matching or short answer.
    pub ambiguous: bool,
}

impl GiftItem {
    /// Header and tail joined by [`TAIL_MARKER`]; the header alone when there is no tail.
    pub fn question_text(&self) -> String {
        if self.tail.is_empty() {
            self.header.clone()
        } else {
            format!("{}{}{}", self.header, TAIL_MARKER, self.tail)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GiftEntry {
    /// `$CATEGORY:` path, `/`-separated.
    Category(String),
    Question(GiftItem),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    ExpectHeader,
    InBlock,
    InAnswerList,
    Tail,
}

/// Read a whole GIFT file.
pub fn parse_gift(source: &str) -> Result<Vec<GiftEntry>, MarkupError> {
    let mut entries = Vec::new();
    let mut state = LineState::ExpectHeader;
    let mut block = String::new();
    let mut block_base = 0;
    let mut offset = 0;

    for line in source.split('\n') {
        let line_len = line.chars().count() + 1;
        let trimmed = line.trim();
        let comment = trimmed.starts_with("//");
        match state {
            LineState::ExpectHeader => {
                if trimmed.is_empty() || comment {
                } else if let Some(path) = trimmed.strip_prefix("$CATEGORY:") {
                    entries.push(GiftEntry::Category(path.trim().to_string()));
                } else {
                    block_base = offset;
                    block.push_str(line);
                    state = line_state(LineState::InBlock, line);
                }
            }
            LineState::InBlock | LineState::Tail if trimmed.is_empty() => {
                entries.push(GiftEntry::Question(parse_item(&block, block_base)?));
                block.clear();
                state = LineState::ExpectHeader;
            }
            _ => {
                block.push('\n');
                if comment {
                    block.push_str(&" ".repeat(line.chars().count()));
                } else {
                    block.push_str(line);
                    state = line_state(state, line);
                }
            }
        }
        offset += line_len;
    }

    if state == LineState::InAnswerList {
        return Err(MarkupError::UnexpectedEnd { offset: offset.saturating_sub(1) });
    }
    if !block.trim().is_empty() {
        entries.push(GiftEntry::Question(parse_item(&block, block_base)?));
    }
    Ok(entries)
}

fn line_state(mut state: LineState, line: &str) -> LineState {
    let mut cursor = Cursor::new(line);
    while let Some(ch) = cursor.scan_until(&['{', '}']) {
        state = match (state, ch) {
            (_, '{') => LineState::InAnswerList,
            (LineState::InAnswerList, '}') => LineState::Tail,
            (other, _) => other,
        };
        cursor.advance();
    }
    state
}

/// Parse one question block; `base` is its offset in the file.
pub fn parse_item(text: &str, base: usize) -> Result<GiftItem, MarkupError> {
    let mut cursor = Cursor::with_base(text, base);
    cursor.skip_whitespace();

    let mut title = None;
    if cursor.eat("::") {
        let (name, _) = cursor.read_literal(&[':'], GIFT_ESCAPES);
        if !cursor.eat("::") {
            return Err(MarkupError::Unterminated {
                offset: cursor.offset(),
                expected: "::".to_string(),
            });
        }
        title = Some(name.trim().to_string());
        cursor.skip_whitespace();
    }

    let mut format = TextFormat::Auto;
    if cursor.peek() == Some('[') {
        let open = cursor.offset();
        cursor.advance();
        let (name, stop) = cursor.read_raw_until(&[']']);
        if stop.is_none() {
            return Err(MarkupError::Unterminated {
                offset: open,
                expected: "]".to_string(),
            });
        }
        cursor.advance();
        format = TextFormat::from_name(&name).unwrap_or_else(|| {
            tracing::warn!(offset = open, format = %name, "unknown GIFT text format");
            TextFormat::Auto
        });
        cursor.skip_whitespace();
    }
    cursor.skip_bracket_escape();

    let (header, stop) = cursor.read_literal(&['{'], GIFT_ESCAPES);
    let mut item = GiftItem {
        title,
        format,
        header: header.trim().to_string(),
        answer: GiftAnswer::Description,
        general_feedback: None,
        tail: String::new(),
        ambiguous: false,
    };
    if stop.is_none() {
        return Ok(item);
    }

    let open = cursor.offset();
    cursor.advance();
    let block_base = cursor.offset();
    let (block, stop) = cursor.read_raw_until(&['}']);
    if stop.is_none() {
        return Err(MarkupError::Unterminated {
            offset: open,
            expected: "}".to_string(),
        });
    }
    cursor.advance();
    let (tail, _) = cursor.read_literal(&[], GIFT_ESCAPES);
    item.tail = tail.trim().to_string();

    parse_block(&block, block_base, &mut item)?;
    Ok(item)
}

fn parse_block(block: &str, base: usize, item: &mut GiftItem) -> Result<(), MarkupError> {
    let mut cursor = Cursor::with_base(block, base);
    cursor.skip_whitespace();

    if cursor.is_eof() {
        item.answer = GiftAnswer::Essay;
        return Ok(());
    }
    if cursor.peek() == Some('#') && !cursor.starts_with("####") {
        cursor.advance();
        return parse_numerical(&mut cursor, item);
    }
    if let Some(correct) = true_false_word(&cursor) {
        return parse_true_false(&mut cursor, correct, item);
    }

    let choices = scan_choices(&mut cursor, item)?;
    classify(choices, item);
    Ok(())
}

fn true_false_word(cursor: &Cursor) -> Option<bool> {
    let rest = cursor.rest();
    let word = rest.split(|ch: char| ch == '#' || ch.is_whitespace()).next()?;
    match word {
        "T" | "TRUE" => Some(true),
        "F" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_true_false(cursor: &mut Cursor, correct: bool, item: &mut GiftItem) -> Result<(), MarkupError> {
    cursor.scan_until(&['#']);
    let mut feedbacks = Vec::new();
    loop {
        cursor.skip_whitespace();
        if cursor.is_eof() {
            break;
        }
        if cursor.starts_with("####") {
            cursor.advance_by(4);
            item.general_feedback = Some(read_rest(cursor));
            break;
        }
        if cursor.eat("#") {
            let (text, _) = cursor.read_literal(&['#'], GIFT_ESCAPES);
            feedbacks.push(text.trim().to_string());
        } else {
            cursor.advance();
        }
    }
    let mut feedbacks = feedbacks.into_iter();
    item.answer = GiftAnswer::TrueFalse {
        correct,
        wrong_feedback: feedbacks.next().filter(|text| !text.is_empty()),
        right_feedback: feedbacks.next().filter(|text| !text.is_empty()),
    };
    Ok(())
}

fn parse_numerical(cursor: &mut Cursor, item: &mut GiftItem) -> Result<(), MarkupError> {
    cursor.skip_whitespace();
    let mut answers = Vec::new();
    if matches!(cursor.peek(), Some('=') | Some('~')) {
        for choice in scan_choices(cursor, item)? {
            answers.push(numeric_answer(choice.answer, choice.offset)?);
        }
    } else {
        let offset = cursor.offset();
        let (text, stop) = cursor.read_literal(&['#'], GIFT_ESCAPES);
        let mut answer = Answer::new(100.0, text.trim());
        if stop.is_some() {
            if cursor.starts_with("####") {
                cursor.advance_by(4);
                item.general_feedback = Some(read_rest(cursor));
            } else {
                cursor.advance();
                let (feedback, _) = cursor.read_literal(&['#'], GIFT_ESCAPES);
                answer.feedback = Some(FText::from_text(item.format, feedback.trim()));
                if cursor.eat("####") {
                    item.general_feedback = Some(read_rest(cursor));
                }
            }
        }
        answers.push(numeric_answer(answer, offset)?);
    }
    item.answer = GiftAnswer::Numerical(answers);
    Ok(())
}

fn numeric_answer(answer: Answer, offset: usize) -> Result<NumericalAnswer, MarkupError> {
    let mut numeric =
        NumericalAnswer::parse(answer.fraction, &answer.text).map_err(|_| MarkupError::InvalidNumber {
            offset,
            text: answer.text.clone(),
        })?;
    numeric.answer.feedback = answer.feedback;
    Ok(numeric)
}

struct Choice {
    answer: Answer,
    tilde: bool,
    offset: usize,
}

fn scan_choices(cursor: &mut Cursor, item: &mut GiftItem) -> Result<Vec<Choice>, MarkupError> {
    let mut choices = Vec::new();
    loop {
        cursor.skip_whitespace();
        if cursor.is_eof() {
            break;
        }
        if cursor.starts_with("####") {
            cursor.advance_by(4);
            item.general_feedback = Some(read_rest(cursor));
            break;
        }
        let offset = cursor.offset();
        let tilde = cursor.peek() == Some('~');
        let fraction = read_prefix(cursor)?;
        let (text, stop) = cursor.read_literal(CHOICE_END, GIFT_ESCAPES);
        let mut answer = Answer::new(fraction, text.trim());
        answer.formatting = item.format;
        if stop == Some('#') && !cursor.starts_with("####") {
            cursor.advance();
            let (feedback, _) = cursor.read_literal(CHOICE_END, GIFT_ESCAPES);
            answer.feedback = Some(FText::from_text(item.format, feedback.trim()));
        }
        choices.push(Choice {
            answer,
            tilde,
            offset,
        });
    }
    Ok(choices)
}

fn classify(choices: Vec<Choice>, item: &mut GiftItem) {
    if choices.is_empty() {
        item.answer = GiftAnswer::Essay;
        return;
    }
    if choices.iter().any(|choice| choice.tilde) {
        let all_tilde = choices.iter().all(|choice| choice.tilde);
        let weighted = choices.iter().any(|choice| choice.answer.fraction > 0.0);
        item.answer = GiftAnswer::Multichoice {
            single: !(all_tilde && weighted),
            choices: choices.into_iter().map(|choice| choice.answer).collect(),
        };
        return;
    }

    let arrows = choices
        .iter()
        .filter(|choice| choice.answer.text.contains("->"))
        .count();
    if arrows == choices.len() && arrows > 1 {
        let pairs = choices
            .into_iter()
            .filter_map(|choice| {
                let (left, right) = choice.answer.text.split_once("->")?;
                Some((left.trim().to_string(), right.trim().to_string()))
            })
            .collect();
        item.answer = GiftAnswer::Matching(pairs);
        return;
    }
    if arrows > 0 {
        item.ambiguous = true;
        tracing::warn!(
            title = item.title.as_deref().unwrap_or(""),
            "ambiguous GIFT block: '->' in some choices only, read as short answer"
        );
    }
    item.answer = GiftAnswer::ShortAnswer(choices.into_iter().map(|choice| choice.answer).collect());
}

fn read_rest(cursor: &mut Cursor) -> String {
    let (text, _) = cursor.read_literal(&[], GIFT_ESCAPES);
    text.trim().to_string()
}

/// Escape literal text for a GIFT file.
pub fn escape_gift(text: &str) -> String {
    escape(text, GIFT_ESCAPES, true)
}

//! Embedded answer groups: `{weight:FORMAT:choices}`
//!
//! A choice is a prefix (`=` full credit, `~` none, `~%N%` or `=%N%` partial)
//! followed by its text and an optional `#feedback`. Inside choices the characters
//! `{ } ~ = #` must be backslash-escaped to appear literally.

use super::cursor::Cursor;
use super::ftext::FText;
use crate::enums::{ClozeFormat, TextFormat};
use crate::error::MarkupError;
use crate::model::answer::{Answer, ClozeItem};

pub const CHOICE_ESCAPES: &[char] = &['{', '}', '~', '=', '#'];
const CHOICE_END: &[char] = &['~', '=', '#'];

/// Whether the inside of a brace pair has a `weight?:FORMAT:` header with a known
/// format name.
pub fn looks_like_group(inner: &str) -> bool {
    let Some((weight, rest)) = inner.split_once(':') else {
        return false;
    };
    if !weight.chars().all(|ch| ch.is_ascii_digit()) {
        return false;
    }
    match rest.split_once(':') {
        Some((name, _)) => ClozeFormat::from_name(name).is_some(),
        None => false,
    }
}

/// Parse the inside of a group. `base` is the offset of `inner` in the full input;
/// `start` is the number of literal characters preceding the group.
pub fn parse_group(inner: &str, base: usize, start: usize) -> Result<ClozeItem, MarkupError> {
    let mut cursor = Cursor::with_base(inner, base);

    let (weight, _) = cursor.read_raw_until(&[':']);
    let grade = if weight.is_empty() {
        1
    } else {
        weight.parse().map_err(|_| MarkupError::InvalidNumber {
            offset: base,
            text: weight.clone(),
        })?
    };
    cursor.advance();

    let name_offset = cursor.offset();
    let (name, _) = cursor.read_raw_until(&[':']);
    let format = ClozeFormat::from_name(&name).ok_or_else(|| MarkupError::InvalidNumber {
        offset: name_offset,
        text: name.clone(),
    })?;
    cursor.advance();

    let opts = parse_choices(&mut cursor)?;
    Ok(ClozeItem {
        start,
        grade,
        format,
        opts,
    })
}

/// Scan `~`/`=` choices until the cursor runs out.
pub fn parse_choices(cursor: &mut Cursor) -> Result<Vec<Answer>, MarkupError> {
    let mut opts = Vec::new();
    while !cursor.is_eof() {
        let fraction = read_prefix(cursor)?;
        let (text, stop) = cursor.read_literal(CHOICE_END, CHOICE_ESCAPES);
        let mut answer = Answer::new(fraction, text);
        if stop == Some('#') {
            cursor.advance();
            let (feedback, _) = cursor.read_literal(&['~', '='], CHOICE_ESCAPES);
            answer.feedback = Some(FText::from_text(TextFormat::Auto, feedback));
        }
        opts.push(answer);
    }
    Ok(opts)
}

/// Fraction introduced by the prefix under the cursor.
pub fn read_prefix(cursor: &mut Cursor) -> Result<f64, MarkupError> {
    let full = if cursor.eat("=") {
        true
    } else if cursor.eat("~") {
        false
    } else {
        tracing::warn!(
            offset = cursor.offset(),
            "choice without '=' or '~' prefix, scored as 0"
        );
        return Ok(0.0);
    };
    if !cursor.eat("%") {
        return Ok(if full { 100.0 } else { 0.0 });
    }
    let offset = cursor.offset();
    let (weight, stop) = cursor.read_raw_until(&['%']);
    if stop.is_none() {
        return Err(MarkupError::Unterminated {
            offset,
            expected: "%".to_string(),
        });
    }
    cursor.advance();
    weight
        .trim()
        .parse::<f64>()
        .map_err(|_| MarkupError::InvalidNumber {
            offset,
            text: weight,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_detection() {
        assert!(looks_like_group("1:SA:=x"));
        assert!(looks_like_group(":MULTICHOICE:=x"));
        assert!(!looks_like_group("a:SA:=x"));
        assert!(!looks_like_group("1:NOPE:=x"));
        assert!(!looks_like_group("x"));
    }

    #[test]
    fn parses_weights_and_feedback() {
        let item = parse_group("2:MC:=right#well done~wrong~%25%half", 0, 7).unwrap();
        assert_eq!(item.grade, 2);
        assert_eq!(item.start, 7);
        assert_eq!(item.format, ClozeFormat::MultiChoice);
        let fractions: Vec<f64> = item.opts.iter().map(|opt| opt.fraction).collect();
        assert_eq!(fractions, vec![100.0, 0.0, 25.0]);
        assert_eq!(item.opts[0].text, "right");
        assert_eq!(
            item.opts[0].feedback,
            Some(FText::from_text(TextFormat::Auto, "well done"))
        );
    }

    #[test]
    fn escaped_delimiters_stay_in_choice_text() {
        let item = parse_group(r"1:SA:=a\~b\#c", 0, 0).unwrap();
        assert_eq!(item.opts.len(), 1);
        assert_eq!(item.opts[0].text, "a~b#c");
    }

    #[test]
    fn numeric_answers_keep_raw_text() {
        let item = parse_group("1:NM:=8:2~%50%6..10", 0, 0).unwrap();
        assert_eq!(item.opts[0].text, "8:2");
        assert_eq!(item.opts[1].text, "6..10");
        assert_eq!(item.opts[1].fraction, 50.0);
    }

    #[test]
    fn bad_weight_reports_offset() {
        let err = parse_group("1:SA:~%abc%x", 10, 0).unwrap_err();
        assert_eq!(
            err,
            MarkupError::InvalidNumber {
                offset: 17,
                text: "abc".into()
            }
        );
    }

    #[test]
    fn renders_back_in_canonical_form() {
        let item = parse_group(r":SA:=a\=b~%-50%c#no", 0, 0).unwrap();
        assert_eq!(item.to_cloze(), r"{1:SHORTANSWER:=a\=b~%-50%c#no}");
    }
}

//! Cloze text format
//!
//! Embedded-answer questions as plain text, one question per group of lines:
//!
//! ```text
//! $CATEGORY: top/Geography
//!
//! ::Capitals::Paris is in {1:MULTICHOICE:=France~Spain~%50%Belgium}
//! and Rome is in {2:SHORTANSWER:=Italy#Right}.
//! ```
//!
//! A blank line ends a question, `//` lines are comments. The optional `::title::`
//! escapes `:` with a backslash and may be followed by a `[format]` tag; the body
//! follows the usual cloze rules (`\{` and `\}` for literal braces). Groups are
//! always written back in canonical form. Only embedded questions are written.

use crate::error::FormatError;
use crate::format::Format;
use qbank_core::model::{Embedded, Options};
use qbank_core::text::cursor::{escape, escape_leading_bracket, Cursor};
use qbank_core::text::parse;
use qbank_core::{Category, Delimiters, MarkupError, Question, QuestionKind, TextFormat};

const ROOT_NAME: &str = "top";
const NAME_LEN: usize = 40;
const TITLE_ESCAPES: &[char] = &[':'];

pub fn parse_cloze(source: &str) -> Result<Category, FormatError> {
    let mut root = Category::new(ROOT_NAME);
    let mut path = String::new();
    let mut block: Vec<&str> = Vec::new();

    for line in source.lines().chain(std::iter::once("")) {
        let trimmed = line.trim();
        if trimmed.starts_with("//") {
            continue;
        }
        if trimmed.is_empty() {
            if !block.is_empty() {
                let question = to_question(&block.join("\n"))?;
                root.get_or_create_path(&path)
                    .add_question(question)
                    .map_err(|q| FormatError::ParseError(format!("question '{}' added twice", q.name)))?;
                block.clear();
            }
            continue;
        }
        match trimmed.strip_prefix("$CATEGORY:") {
            Some(raw) if block.is_empty() => {
                path = raw
                    .split('/')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .skip_while(|part| *part == ROOT_NAME)
                    .collect::<Vec<_>>()
                    .join("/");
                root.get_or_create_path(&path);
            }
            _ => block.push(line),
        }
    }
    Ok(root)
}

fn to_question(block: &str) -> Result<Question, FormatError> {
    let mut cursor = Cursor::new(block.trim_start());
    let mut title = None;
    if cursor.eat("::") {
        let (name, _) = cursor.read_literal(&[':'], TITLE_ESCAPES);
        if !cursor.eat("::") {
            return Err(MarkupError::Unterminated {
                offset: cursor.offset(),
                expected: "::".to_string(),
            }
            .into());
        }
        title = Some(name.trim().to_string());
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
            }
            .into());
        }
        cursor.advance();
        format = TextFormat::from_name(&name).unwrap_or_else(|| {
            tracing::warn!(offset = open, format = %name, "unknown text format");
            TextFormat::Auto
        });
    }
    cursor.skip_bracket_escape();

    let parsed = parse(&cursor.rest(), format, &Delimiters::cloze())?;
    let name = title.filter(|title| !title.is_empty()).unwrap_or_else(|| {
        let text: String = parsed.text.literal_text().chars().take(NAME_LEN).collect();
        text.trim().to_string()
    });
    let kind = QuestionKind::Embedded(Embedded {
        options: Options::new(parsed.groups),
    });
    Ok(Question::new(name, kind).with_body(parsed.text))
}

pub fn serialize_cloze(bank: &Category) -> Result<String, FormatError> {
    let mut out = String::new();
    for (path, cat) in bank.walk() {
        let mut wrote_header = false;
        for question in cat.questions() {
            let QuestionKind::Embedded(embedded) = &question.kind else {
                tracing::warn!(
                    question = %question.name,
                    qtype = %question.question_type(),
                    "not an embedded answer question, skipped"
                );
                continue;
            };
            if !wrote_header {
                let relative = path.strip_prefix(bank.name()).unwrap_or(&path);
                out.push_str(&format!("$CATEGORY: {ROOT_NAME}{relative}\n\n"));
                wrote_header = true;
            }
            let body = embedded.pure_text(&question.body);
            if body.lines().any(|line| line.trim().is_empty()) {
                tracing::warn!(question = %question.name, "blank line in body will split the question");
            }
            out.push_str(&format!("::{}::", escape(&question.name, TITLE_ESCAPES, false)));
            if question.body.format != TextFormat::Auto {
                out.push_str(&format!("[{}]", question.body.format.name()));
            }
            out.push_str(&escape_leading_bracket(&body));
            out.push_str("\n\n");
        }
    }
    Ok(out)
}

/// Format implementation for the cloze text format
pub struct ClozeFormat;

impl Format for ClozeFormat {
    fn name(&self) -> &str {
        "cloze"
    }

    fn description(&self) -> &str {
        "Embedded answer (cloze) questions as plain text"
    }

    fn file_extensions(&self) -> &[&str] {
        &["cloze"]
    }

    fn supports_parsing(&self) -> bool {
        true
    }

    fn supports_serialization(&self) -> bool {
        true
    }

    fn parse(&self, source: &str) -> Result<Category, FormatError> {
        parse_cloze(source)
    }

    fn serialize(&self, bank: &Category) -> Result<String, FormatError> {
        serialize_cloze(bank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbank_core::Segment;

    const SAMPLE: &str = "$CATEGORY: top/Geography\n\n// capitals\n::Capitals::Paris is in {1:MC:=France~Spain}\nand Rome in {2:SA:=Italy#Right}.\n\n::Escaped\\: title::A \\{literal\\} brace {:NUMERICAL:=8:2}\n";

    #[test]
    fn test_parse_groups_and_categories() {
        let bank = parse_cloze(SAMPLE).unwrap();
        let geo = bank.subcat("Geography").unwrap();
        assert_eq!(geo.questions().len(), 2);

        let first = &geo.questions()[0];
        assert_eq!(first.name, "Capitals");
        assert_eq!(first.body.cloze_markers(), 2);
        assert_eq!(first.check(), Ok(()));
        let QuestionKind::Embedded(embedded) = &first.kind else {
            panic!("expected embedded");
        };
        assert_eq!(embedded.options.items[1].grade, 2);
        assert_eq!(embedded.options.items[1].opts[0].text, "Italy");

        let second = &geo.questions()[1];
        assert_eq!(second.name, "Escaped: title");
        assert!(second.body.segments.iter().any(|s| *s == Segment::Text("A {literal} brace ".into())));
    }

    #[test]
    fn test_round_trip_is_canonical() {
        let bank = parse_cloze(SAMPLE).unwrap();
        let written = serialize_cloze(&bank).unwrap();
        assert_eq!(
            written,
            "$CATEGORY: top/Geography\n\n\
             ::Capitals::Paris is in {1:MULTICHOICE:=France~Spain}\nand Rome in {2:SHORTANSWER:=Italy#Right}.\n\n\
             ::Escaped\\: title::A \\{literal\\} brace {1:NUMERICAL:=8:2}\n\n"
        );
        assert_eq!(parse_cloze(&written).unwrap(), bank);
    }

    #[test]
    fn test_leading_bracket_is_not_a_format_tag() {
        let bank = parse_cloze("::Plain::\\[not a tag] is in {1:SA:=x}\n").unwrap();
        assert_eq!(bank.questions()[0].body.format, TextFormat::Auto);
        assert!(bank.questions()[0].body.literal_text().starts_with("[not a tag] is in"));

        let written = serialize_cloze(&bank).unwrap();
        assert!(written.contains("::Plain::\\[not a tag] is in"));
        let back = parse_cloze(&written).unwrap();
        assert_eq!(back.questions()[0].body.format, TextFormat::Auto);
        assert_eq!(back, bank);
    }

    #[test]
    fn test_unterminated_group() {
        assert!(matches!(
            parse_cloze("::Q::Broken {1:SA:=x\n"),
            Err(FormatError::ParseError(_))
        ));
    }
}

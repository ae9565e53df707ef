//! Markup parser: raw format text to [`FText`]
//!
//! A single left-to-right pass over the input. Literal text accumulates in a buffer
//! and is flushed whenever an inline object is recognised. Which objects are live is
//! decided by the [`Delimiters`] table the caller passes in:
//!
//! | construct                     | flag        | segment                 |
//! |-------------------------------|-------------|-------------------------|
//! | `{1:SHORTANSWER:=a~b}`        | `cloze`     | `Cloze(i)` + group `i`  |
//! | `{x}` / `{=x*2}`              | `variables` | `Variable` / `Formula`  |
//! | `[[3]]`                       | `blanks`    | `Blank(3)`              |
//! | `$$\frac{1}{2}$$`             | `math`      | `Math`                  |
//! | `@@PLUGINFILE@@/img.png`      | `files`     | `File`                  |
//!
//! Only braces take part in backslash escaping; the other constructs are recognised
//! by their literal prefix.

use super::cloze;
use super::cursor::{unescape, Cursor};
use super::ftext::{strip_cdata, FText, Segment};
use crate::enums::TextFormat;
use crate::error::MarkupError;
use crate::files::{FileRef, PLUGINFILE_PREFIX};
use crate::model::answer::ClozeItem;

const BRACE_ESCAPES: &[char] = &['{', '}'];
const FILE_NAME_END: &[char] = &['"', '\'', '(', ')', '<', '>', '?', '#'];

/// Which inline constructs are recognised while parsing (and escaped while rendering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Delimiters {
    pub cloze: bool,
    pub variables: bool,
    pub blanks: bool,
    pub math: bool,
    pub files: bool,
}

impl Delimiters {
    /// Everything literal.
    pub const NONE: Delimiters = Delimiters {
        cloze: false,
        variables: false,
        blanks: false,
        math: false,
        files: false,
    };

    /// Rich text with file references and math, no brace markup.
    pub fn rich() -> Self {
        Self {
            math: true,
            files: true,
            ..Self::NONE
        }
    }

    /// Cloze (embedded answers) bodies.
    pub fn cloze() -> Self {
        Self {
            cloze: true,
            ..Self::rich()
        }
    }

    /// Calculated question bodies with `{x}` placeholders.
    pub fn calculated() -> Self {
        Self {
            variables: true,
            ..Self::rich()
        }
    }

    /// Gap-select and drag-and-drop text bodies with `[[N]]` markers.
    pub fn gaps() -> Self {
        Self {
            blanks: true,
            ..Self::rich()
        }
    }

    fn braces_live(&self) -> bool {
        self.cloze || self.variables
    }

    /// Characters that must be backslash-escaped in literal text.
    pub fn escapable(&self) -> &'static [char] {
        if self.braces_live() {
            BRACE_ESCAPES
        } else {
            &[]
        }
    }
}

/// Result of parsing one raw text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Parsed {
    pub text: FText,
    /// Answer groups referenced by the `Cloze` segments, in order.
    pub groups: Vec<ClozeItem>,
}

/// Parse `raw`, declared as `format`, into formatted text.
///
/// Html input loses a CDATA wrapper spanning the whole string. A brace that is never
/// closed is an error; a stray closing brace is logged and kept as text.
pub fn parse(raw: &str, format: TextFormat, delims: &Delimiters) -> Result<Parsed, MarkupError> {
    let source = if format == TextFormat::Html {
        strip_cdata(raw)
    } else {
        raw
    };
    let mut scanner = Scanner {
        cursor: Cursor::new(source),
        delims,
        text: FText::new(format),
        buffer: String::new(),
        groups: Vec::new(),
        literal_len: 0,
    };
    scanner.run()?;
    Ok(Parsed {
        text: scanner.text,
        groups: scanner.groups,
    })
}

/// Shorthand for callers that have no embedded answer groups.
pub fn parse_text(raw: &str, format: TextFormat, delims: &Delimiters) -> Result<FText, MarkupError> {
    parse(raw, format, delims).map(|parsed| parsed.text)
}

struct Scanner<'a> {
    cursor: Cursor,
    delims: &'a Delimiters,
    text: FText,
    buffer: String,
    groups: Vec<ClozeItem>,
    /// Characters of literal text emitted so far; the start offset of cloze groups.
    literal_len: usize,
}

impl Scanner<'_> {
    fn run(&mut self) -> Result<(), MarkupError> {
        let escapable = self.delims.escapable();
        while let Some(ch) = self.cursor.peek() {
            if self.delims.files && self.cursor.starts_with(PLUGINFILE_PREFIX) {
                self.file();
                continue;
            }
            if self.delims.math && self.cursor.starts_with("$$") && self.math() {
                continue;
            }
            if self.delims.blanks && ch == '[' && self.blank() {
                continue;
            }
            if self.delims.braces_live() && !self.cursor.is_escaped() {
                if ch == '{' {
                    self.brace()?;
                    continue;
                }
                if ch == '}' {
                    tracing::warn!(
                        offset = self.cursor.offset(),
                        "character may be incorrectly placed: unmatched '}}'"
                    );
                }
            }
            let drop = ch == '\\' && !self.cursor.is_escaped() && self.cursor.escapes_next(escapable);
            if !drop {
                self.buffer.push(ch);
                self.literal_len += 1;
            }
            self.cursor.advance();
        }
        self.flush();
        Ok(())
    }

    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            let text = std::mem::take(&mut self.buffer);
            self.text.push_text(&text);
        }
    }

    fn emit(&mut self, segment: Segment) {
        self.flush();
        self.text.push(segment);
    }

    fn file(&mut self) {
        self.cursor.advance_by(PLUGINFILE_PREFIX.chars().count());
        let mut name = String::new();
        while let Some(ch) = self.cursor.peek() {
            if ch.is_whitespace() || FILE_NAME_END.contains(&ch) {
                break;
            }
            name.push(ch);
            self.cursor.advance();
        }
        self.emit(Segment::File(FileRef::pluginfile(name)));
    }

    /// `$$...$$`; an unclosed opener is kept as text.
    fn math(&mut self) -> bool {
        let rest = self.cursor.rest();
        let Some(end) = rest[2..].find("$$") else {
            tracing::warn!(
                offset = self.cursor.offset(),
                "character may be incorrectly placed: unclosed '$$'"
            );
            return false;
        };
        let tex = rest[2..2 + end].to_string();
        self.cursor.advance_by(tex.chars().count() + 4);
        self.emit(Segment::Math(tex));
        true
    }

    /// `[[N]]` gap marker.
    fn blank(&mut self) -> bool {
        if !self.cursor.starts_with("[[") {
            return false;
        }
        let mut len = 2;
        let mut digits = String::new();
        while let Some(ch) = self.cursor.peek_at(len) {
            if !ch.is_ascii_digit() {
                break;
            }
            digits.push(ch);
            len += 1;
        }
        let closed = self.cursor.peek_at(len) == Some(']') && self.cursor.peek_at(len + 1) == Some(']');
        let Ok(number) = digits.parse::<usize>() else {
            return false;
        };
        if !closed {
            return false;
        }
        self.cursor.advance_by(len + 2);
        self.emit(Segment::Blank(number));
        true
    }

    fn brace(&mut self) -> Result<(), MarkupError> {
        let open = self.cursor.offset();
        self.cursor.advance();
        let Some(inner) = self.read_group() else {
            return Err(MarkupError::Unterminated {
                offset: open,
                expected: "}".to_string(),
            });
        };

        if self.delims.variables {
            if let Some(expr) = inner.strip_prefix('=') {
                self.emit(Segment::Formula(expr.to_string()));
                return Ok(());
            }
            if is_identifier(&inner) {
                self.emit(Segment::Variable(inner));
                return Ok(());
            }
        }
        if self.delims.cloze && cloze::looks_like_group(&inner) {
            let item = cloze::parse_group(&inner, open + 1, self.literal_len)?;
            let idx = self.groups.len();
            self.groups.push(item);
            self.emit(Segment::Cloze(idx));
            return Ok(());
        }

        tracing::warn!(offset = open, "character may be incorrectly placed: '{{' opens no markup");
        let literal = format!("{{{}}}", unescape(&inner, BRACE_ESCAPES));
        self.literal_len += literal.chars().count();
        self.buffer.push_str(&literal);
        Ok(())
    }

    /// Raw content up to the `}` balancing the one just consumed, which is skipped.
    fn read_group(&mut self) -> Option<String> {
        let mut depth = 0usize;
        let mut inner = String::new();
        while let Some(ch) = self.cursor.peek() {
            if !self.cursor.is_escaped() {
                match ch {
                    '{' => depth += 1,
                    '}' if depth == 0 => {
                        self.cursor.advance();
                        return Some(inner);
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            inner.push(ch);
            self.cursor.advance();
        }
        None
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_alphanumeric() || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::ClozeFormat;

    fn segments(raw: &str, delims: Delimiters) -> Vec<Segment> {
        parse(raw, TextFormat::Auto, &delims).unwrap().text.segments
    }

    #[test]
    fn plain_text_is_one_segment() {
        assert_eq!(
            segments(r"a {b} \c", Delimiters::NONE),
            vec![Segment::Text(r"a {b} \c".into())]
        );
    }

    #[test]
    fn cloze_group_becomes_marker() {
        let parsed = parse(
            "Capital: {1:SHORTANSWER:=Berlin#Right~%50%Bonn}.",
            TextFormat::Auto,
            &Delimiters::cloze(),
        )
        .unwrap();
        assert_eq!(
            parsed.text.segments,
            vec![
                Segment::Text("Capital: ".into()),
                Segment::Cloze(0),
                Segment::Text(".".into())
            ]
        );
        let group = &parsed.groups[0];
        assert_eq!(group.start, 9);
        assert_eq!(group.format, ClozeFormat::ShortAnswer);
        assert_eq!(group.opts.len(), 2);
        assert_eq!(group.opts[1].fraction, 50.0);
    }

    #[test]
    fn escaped_brace_is_literal() {
        let parsed = parse(r"a \{1:SA:=x\} b", TextFormat::Auto, &Delimiters::cloze()).unwrap();
        assert!(parsed.groups.is_empty());
        assert_eq!(parsed.text.segments, vec![Segment::Text("a {1:SA:=x} b".into())]);
    }

    #[test]
    fn double_backslash_keeps_brace_live() {
        let parsed = parse(r"a \\{1:SA:=x}", TextFormat::Auto, &Delimiters::cloze()).unwrap();
        assert_eq!(parsed.groups.len(), 1);
        assert_eq!(
            parsed.text.segments,
            vec![Segment::Text(r"a \".into()), Segment::Cloze(0)]
        );
    }

    #[test]
    fn unterminated_brace_reports_offset() {
        let err = parse("abc {1:SA:=x", TextFormat::Auto, &Delimiters::cloze()).unwrap_err();
        assert_eq!(
            err,
            MarkupError::Unterminated {
                offset: 4,
                expected: "}".into()
            }
        );
    }

    #[test]
    fn stray_brace_content_stays_literal() {
        assert_eq!(
            segments("set {a, b} }", Delimiters::cloze()),
            vec![Segment::Text("set {a, b} }".into())]
        );
    }

    #[test]
    fn variables_and_formulas() {
        assert_eq!(
            segments("Area {r} is {=pi()*{r}^2}", Delimiters::calculated()),
            vec![
                Segment::Text("Area ".into()),
                Segment::Variable("r".into()),
                Segment::Text(" is ".into()),
                Segment::Formula("pi()*{r}^2".into()),
            ]
        );
    }

    #[test]
    fn blanks_math_and_files() {
        assert_eq!(
            segments(
                r#"[[1]] is $$x^2$$ <img src="@@PLUGINFILE@@/sq.png"> [[x]]"#,
                Delimiters::gaps()
            ),
            vec![
                Segment::Blank(1),
                Segment::Text(" is ".into()),
                Segment::Math("x^2".into()),
                Segment::Text(r#" <img src=""#.into()),
                Segment::File(FileRef::pluginfile("sq.png")),
                Segment::Text(r#""> [[x]]"#.into()),
            ]
        );
    }

    #[test]
    fn html_cdata_is_stripped_and_restored() {
        let raw = "<![CDATA[<p>{1:MC:=a~b}</p>]]>";
        let delims = Delimiters::cloze();
        let parsed = parse(raw, TextFormat::Html, &delims).unwrap();
        assert_eq!(parsed.text.segments[0], Segment::Text("<p>".into()));
        assert_eq!(parsed.text.to_source(TextFormat::Html, &delims), "<![CDATA[<p>{#1}</p>]]>");
    }

    #[test]
    fn render_reescapes_literal_braces() {
        let delims = Delimiters::cloze();
        let raw = r"a \{b\} \\{1:SA:=x}";
        let parsed = parse(raw, TextFormat::Auto, &delims).unwrap();
        assert_eq!(parsed.text.to_source(TextFormat::Auto, &delims), r"a \{b\} \\{#1}");
    }
}

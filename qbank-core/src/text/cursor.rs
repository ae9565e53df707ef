//! Single-pass character cursor with backslash escape tracking
//!
//! Every markup scanner in this crate walks its input through a [`Cursor`]. The cursor
//! owns two pieces of state: the current position and whether the character at that
//! position is escaped.
//!
//! Escape rule
//!
//!     The escape flag is recomputed on every step as `ch == '\\' && !escaped`, where
//!     `ch` is the character being stepped over. A backslash therefore escapes the next
//!     character unless it was itself escaped:
//!
//!         \{      escaped brace (literal `{`)
//!         \\{     literal backslash, then a live brace
//!         \\\{    literal backslash, then an escaped brace
//!
//!     Scanning never backtracks. `scan_until` and the `read_*` helpers stop on the first
//!     delimiter whose escape flag is clear, so escaped delimiters are skipped without any
//!     lookbehind.

/// Cursor over the characters of one input string.
#[derive(Debug, Clone)]
pub struct Cursor {
    chars: Vec<char>,
    pos: usize,
    escaped: bool,
    base: usize,
}

impl Cursor {
    pub fn new(text: &str) -> Self {
        Self::with_base(text, 0)
    }

    /// A cursor whose reported offsets start at `base`, for scanning a slice of a
    /// larger input.
    pub fn with_base(text: &str, base: usize) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            escaped: false,
            base,
        }
    }

    /// Offset of the current character in the original input.
    pub fn offset(&self) -> usize {
        self.base + self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    /// Whether the character under the cursor is preceded by an escaping backslash.
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }

    /// Step over the current character, updating the escape flag.
    pub fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.escaped = ch == '\\' && !self.escaped;
        self.pos += 1;
        Some(ch)
    }

    pub fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            if self.advance().is_none() {
                break;
            }
        }
    }

    /// Whether the input continues with `pattern` at the cursor (escape flag ignored).
    pub fn starts_with(&self, pattern: &str) -> bool {
        let mut idx = self.pos;
        for expected in pattern.chars() {
            match self.chars.get(idx) {
                Some(&ch) if ch == expected => idx += 1,
                _ => return false,
            }
        }
        true
    }

    /// Consume `pattern` if it appears unescaped at the cursor.
    pub fn eat(&mut self, pattern: &str) -> bool {
        if self.escaped || !self.starts_with(pattern) {
            return false;
        }
        self.advance_by(pattern.chars().count());
        true
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(ch) if ch.is_whitespace()) {
            self.advance();
        }
    }

    /// Whether the current character is one of `delims` and not escaped.
    pub fn at_delimiter(&self, delims: &[char]) -> bool {
        match self.peek() {
            Some(ch) => !self.escaped && delims.contains(&ch),
            None => false,
        }
    }

    /// Advance until an unescaped delimiter is under the cursor and return it without
    /// consuming it. Returns `None` when the input runs out first.
    pub fn scan_until(&mut self, delims: &[char]) -> Option<char> {
        while let Some(ch) = self.peek() {
            if !self.escaped && delims.contains(&ch) {
                return Some(ch);
            }
            self.advance();
        }
        None
    }

    /// Like [`Cursor::scan_until`] but returns the skipped characters verbatim,
    /// backslashes included.
    pub fn read_raw_until(&mut self, delims: &[char]) -> (String, Option<char>) {
        let start = self.pos;
        let stop = self.scan_until(delims);
        (self.chars[start..self.pos].iter().collect(), stop)
    }

    /// Read literal text up to an unescaped delimiter, removing the backslashes that
    /// escape a character in `escapable` or another backslash.
    pub fn read_literal(&mut self, delims: &[char], escapable: &[char]) -> (String, Option<char>) {
        let mut out = String::new();
        while let Some(ch) = self.peek() {
            if !self.escaped && delims.contains(&ch) {
                return (out, Some(ch));
            }
            if !(ch == '\\' && !self.escaped && self.escapes_next(escapable)) {
                out.push(ch);
            }
            self.advance();
        }
        (out, None)
    }

    /// Remaining input from the cursor to the end, verbatim.
    pub fn rest(&self) -> String {
        self.chars[self.pos.min(self.chars.len())..].iter().collect()
    }

    /// Step over the backslash that keeps a leading `[` from opening a `[format]` tag.
    pub fn skip_bracket_escape(&mut self) {
        if self.starts_with("\\[") {
            self.advance();
        }
    }

    /// Whether a backslash under the cursor escapes the following character.
    pub(crate) fn escapes_next(&self, escapable: &[char]) -> bool {
        if escapable.is_empty() {
            return false;
        }
        matches!(self.peek_at(1), Some(next) if next == '\\' || escapable.contains(&next))
    }
}

/// Remove escaping backslashes from `text` under the cursor escape rule.
pub fn unescape(text: &str, escapable: &[char]) -> String {
    let mut cursor = Cursor::new(text);
    cursor.read_literal(&[], escapable).0
}

/// Escape `text` so that [`unescape`] (or a cursor scan) reads it back unchanged.
///
/// `before_markup` marks text that is immediately followed by a live delimiter, in
/// which case a trailing backslash must be doubled.
pub fn escape(text: &str, escapable: &[char], before_markup: bool) -> String {
    if escapable.is_empty() {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (idx, &ch) in chars.iter().enumerate() {
        if escapable.contains(&ch) {
            out.push('\\');
            out.push(ch);
        } else if ch == '\\' {
            let doubled = match chars.get(idx + 1) {
                Some(&next) => next == '\\' || escapable.contains(&next),
                None => before_markup,
            };
            out.push('\\');
            if doubled {
                out.push('\\');
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Escape a `[` (or `\[`) at the start of already escaped body text so a reader
/// does not take it for a `[format]` tag.
pub fn escape_leading_bracket(text: &str) -> String {
    if text.starts_with('[') || text.starts_with("\\[") {
        format!("\\{text}")
    } else {
        text.to_string()
    }
}

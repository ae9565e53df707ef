//! Formatted text: literal text interleaved with typed inline objects

use super::cursor::escape;
use super::markup::Delimiters;
use crate::enums::TextFormat;
use crate::files::FileRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// One piece of a [`FText`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Segment {
    /// Literal text, already unescaped.
    Text(String),
    /// Reference to an image or other media file.
    File(FileRef),
    /// Position of an embedded answer group; the value indexes the owning
    /// question's option groups.
    Cloze(usize),
    /// Numbered `[[N]]` gap marker, `N` as written.
    Blank(usize),
    /// Calculated-question placeholder `{name}`.
    Variable(String),
    /// Calculated-question formula `{=expr}`.
    Formula(String),
    /// TeX math between `$$` delimiters.
    Math(String),
}

impl Segment {
    /// Whether this segment renders starting with a live `{`.
    fn opens_brace(&self) -> bool {
        matches!(
            self,
            Segment::Cloze(_) | Segment::Variable(_) | Segment::Formula(_)
        )
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Segment::Text(_))
    }
}

/// Rich text value owned by questions, answers and hints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FText {
    pub format: TextFormat,
    pub segments: Vec<Segment>,
}

impl FText {
    pub fn new(format: TextFormat) -> Self {
        Self {
            format,
            segments: Vec::new(),
        }
    }

    /// A text made of a single literal segment.
    pub fn from_text(format: TextFormat, text: impl Into<String>) -> Self {
        let mut ftext = Self::new(format);
        ftext.push_text(&text.into());
        ftext
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::from_text(TextFormat::Plain, text)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append literal text, merging with a trailing text segment.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(Segment::Text(existing)) = self.segments.last_mut() {
            existing.push_str(text);
        } else {
            self.segments.push(Segment::Text(text.to_string()));
        }
    }

    pub fn push(&mut self, segment: Segment) {
        match segment {
            Segment::Text(text) => self.push_text(&text),
            other => self.segments.push(other),
        }
    }

    /// Files referenced from this text, in document order (duplicates included).
    pub fn files(&self) -> impl Iterator<Item = &FileRef> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::File(file) => Some(file),
            _ => None,
        })
    }

    pub fn files_mut(&mut self) -> impl Iterator<Item = &mut FileRef> {
        self.segments.iter_mut().filter_map(|segment| match segment {
            Segment::File(file) => Some(file),
            _ => None,
        })
    }

    pub fn cloze_markers(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Cloze(_)))
            .count()
    }

    /// Numbers of the `[[N]]` markers in document order.
    pub fn blanks(&self) -> Vec<usize> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Blank(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Names of the `{name}` placeholders in document order.
    pub fn variables(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Variable(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Literal text only, with every inline object dropped.
    pub fn literal_text(&self) -> String {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Render for `target`, re-escaping literal text for `delims`.
    ///
    /// `embed_file` is called once per distinct file path, in document order, and its
    /// result is written in place of every reference to that path. Html output is
    /// wrapped in a CDATA section when it contains `&`, `<` or `>`.
    pub fn render<E, F>(&self, target: TextFormat, delims: &Delimiters, embed_file: F) -> Result<String, E>
    where
        F: FnMut(&FileRef) -> Result<String, E>,
    {
        self.render_with(target, delims, embed_file, |_| None)
    }

    /// [`FText::render`] where `splice` may supply the output for any inline object
    /// other than text and files.
    pub fn render_with<E, F, S>(
        &self,
        target: TextFormat,
        delims: &Delimiters,
        mut embed_file: F,
        mut splice: S,
    ) -> Result<String, E>
    where
        F: FnMut(&FileRef) -> Result<String, E>,
        S: FnMut(&Segment) -> Option<String>,
    {
        let escapable = delims.escapable();
        let mut out = String::new();
        let mut embedded: HashMap<&str, String> = HashMap::new();

        for (idx, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Text(text) => {
                    let before_markup = self
                        .segments
                        .get(idx + 1)
                        .is_some_and(Segment::opens_brace);
                    out.push_str(&escape(text, escapable, before_markup));
                }
                Segment::File(file) => {
                    if let Some(rendered) = embedded.get(file.path.as_str()) {
                        out.push_str(rendered);
                    } else {
                        let rendered = embed_file(file)?;
                        out.push_str(&rendered);
                        embedded.insert(file.path.as_str(), rendered);
                    }
                }
                other => match splice(other) {
                    Some(spliced) => out.push_str(&spliced),
                    None => out.push_str(&inline_source(other)),
                },
            }
        }

        if target == TextFormat::Html {
            out = wrap_cdata(out);
        }
        Ok(out)
    }

    /// Render with every file written back as its original path.
    pub fn to_source(&self, target: TextFormat, delims: &Delimiters) -> String {
        self.to_source_with(target, delims, |_| None)
    }

    /// [`FText::to_source`] with inline objects optionally replaced by `splice`.
    pub fn to_source_with<S>(&self, target: TextFormat, delims: &Delimiters, splice: S) -> String
    where
        S: FnMut(&Segment) -> Option<String>,
    {
        let rendered: Result<String, Infallible> =
            self.render_with(target, delims, |file| Ok(file.path.clone()), splice);
        match rendered {
            Ok(text) => text,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for Segment {
    /// Source form of the segment; files by path.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&inline_source(self))
    }
}

impl fmt::Display for FText {
    /// Linear, unescaped view used for searching and previews.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => f.write_str(text)?,
                Segment::File(file) => f.write_str(&file.name)?,
                other => f.write_str(&inline_source(other))?,
            }
        }
        Ok(())
    }
}

/// Source form of a non-text, non-file segment.
fn inline_source(segment: &Segment) -> String {
    match segment {
        Segment::Cloze(idx) => format!("{{#{}}}", idx + 1),
        Segment::Blank(n) => format!("[[{n}]]"),
        Segment::Variable(name) => format!("{{{name}}}"),
        Segment::Formula(expr) => format!("{{={expr}}}"),
        Segment::Math(tex) => format!("$${tex}$$"),
        Segment::Text(text) => text.clone(),
        Segment::File(file) => file.path.clone(),
    }
}

fn wrap_cdata(text: String) -> String {
    let needs_wrap = text.contains(['&', '<', '>']) && !text.starts_with(CDATA_OPEN);
    if needs_wrap {
        format!("{CDATA_OPEN}{text}{CDATA_CLOSE}")
    } else {
        text
    }
}

/// Strip a CDATA wrapper that spans the whole input.
pub(crate) fn strip_cdata(text: &str) -> &str {
    text.strip_prefix(CDATA_OPEN)
        .and_then(|inner| inner.strip_suffix(CDATA_CLOSE))
        .unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_text_merges_adjacent_literals() {
        let mut text = FText::new(TextFormat::Plain);
        text.push_text("a");
        text.push(Segment::Text("b".into()));
        text.push(Segment::Blank(1));
        text.push_text("c");
        assert_eq!(
            text.segments,
            vec![
                Segment::Text("ab".into()),
                Segment::Blank(1),
                Segment::Text("c".into())
            ]
        );
    }

    #[test]
    fn embed_called_once_per_distinct_file() {
        let mut text = FText::new(TextFormat::Plain);
        text.push(Segment::File(FileRef::pluginfile("a.png")));
        text.push_text(" and ");
        text.push(Segment::File(FileRef::pluginfile("b.png")));
        text.push_text(" again ");
        text.push(Segment::File(FileRef::pluginfile("a.png")));

        let mut calls = Vec::new();
        let out: Result<String, ()> = text.render(TextFormat::Plain, &Delimiters::default(), |file| {
            calls.push(file.name.clone());
            Ok(format!("<{}>", calls.len()))
        });

        assert_eq!(calls, vec!["a.png", "b.png"]);
        assert_eq!(out.unwrap(), "<1> and <2> again <1>");
    }

    #[test]
    fn embed_errors_propagate() {
        let mut text = FText::new(TextFormat::Plain);
        text.push(Segment::File(FileRef::pluginfile("gone.png")));
        let out: Result<String, &str> =
            text.render(TextFormat::Plain, &Delimiters::default(), |_| Err("missing"));
        assert_eq!(out, Err("missing"));
    }

    #[test]
    fn html_output_is_wrapped_once() {
        let text = FText::from_text(TextFormat::Html, "<p>x</p>");
        let delims = Delimiters::default();
        assert_eq!(text.to_source(TextFormat::Html, &delims), "<![CDATA[<p>x</p>]]>");
        assert_eq!(text.to_source(TextFormat::Plain, &delims), "<p>x</p>");

        let plain = FText::from_text(TextFormat::Html, "no markup");
        assert_eq!(plain.to_source(TextFormat::Html, &delims), "no markup");
    }

    #[test]
    fn display_linearizes_inline_objects() {
        let mut text = FText::new(TextFormat::Auto);
        text.push_text("Value ");
        text.push(Segment::Variable("x".into()));
        text.push_text(" in ");
        text.push(Segment::Cloze(0));
        assert_eq!(text.to_string(), "Value {x} in {#1}");
        assert_eq!(text.literal_text(), "Value  in ");
        assert_eq!(text.variables(), vec!["x"]);
    }
}

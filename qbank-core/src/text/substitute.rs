//! `[name]` placeholder substitution

use super::cursor::Cursor;
use super::expr::Expr;
use crate::error::MarkupError;
use std::collections::BTreeMap;
use std::fmt;

const PLACEHOLDER_ESCAPES: &[char] = &['[', ']'];

/// Value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Number(f64),
    Text(String),
    /// Printed as LaTeX.
    Symbolic(Expr),
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Number(value) => write!(f, "{value}"),
            VarValue::Text(text) => f.write_str(text),
            VarValue::Symbolic(expr) => f.write_str(&expr.to_latex()),
        }
    }
}

impl From<f64> for VarValue {
    fn from(value: f64) -> Self {
        VarValue::Number(value)
    }
}

impl From<&str> for VarValue {
    fn from(text: &str) -> Self {
        VarValue::Text(text.to_string())
    }
}

impl From<Expr> for VarValue {
    fn from(expr: Expr) -> Self {
        VarValue::Symbolic(expr)
    }
}

pub type Bindings = BTreeMap<String, VarValue>;

/// Replace every unescaped `[name]` bound in `bindings`.
///
/// Unbound names and brackets around anything that is not a name are kept as
/// written. `\[` and `\]` produce literal brackets.
pub fn substitute(template: &str, bindings: &Bindings) -> Result<String, MarkupError> {
    let mut cursor = Cursor::new(template);
    let mut out = String::with_capacity(template.len());
    loop {
        let (text, stop) = cursor.read_literal(&['['], PLACEHOLDER_ESCAPES);
        out.push_str(&text);
        if stop.is_none() {
            return Ok(out);
        }
        let open = cursor.offset();
        cursor.advance();
        let (name, close) = cursor.read_raw_until(&[']', '[']);
        match close {
            None => {
                return Err(MarkupError::Unterminated {
                    offset: open,
                    expected: "]".to_string(),
                });
            }
            Some('[') => {
                out.push('[');
                out.push_str(&name);
                continue;
            }
            Some(_) => {
                cursor.advance();
            }
        }
        match bindings.get(name.as_str()) {
            Some(value) if is_name(&name) => out.push_str(&value.to_string()),
            _ => {
                tracing::debug!(offset = open, name = %name, "placeholder left unbound");
                out.push('[');
                out.push_str(&name);
                out.push(']');
            }
        }
    }
}

fn is_name(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|ch| ch.is_alphanumeric() || ch == '_')
}

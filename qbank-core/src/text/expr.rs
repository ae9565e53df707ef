//! Arithmetic expressions used by calculated questions
//!
//! Formulas such as `{=2*{r}^2 + sqrt(3)}` parse into an [`Expr`] tree which can be
//! evaluated against variable bindings or printed as LaTeX. Grammar, loosest first:
//!
//!     expr   := term (('+' | '-') term)*
//!     term   := unary (('*' | '/') unary)*
//!     unary  := '-' unary | power
//!     power  := atom ('^' unary)?
//!     atom   := number | name | name '(' args ')' | '{' name '}' | '(' expr ')'

use super::cursor::Cursor;
use crate::error::MarkupError;
use crate::model::numeric::format_number;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Num(f64),
    Var(String),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Sub(Box<Expr>, Box<Expr>),
    Mul(Box<Expr>, Box<Expr>),
    Div(Box<Expr>, Box<Expr>),
    Pow(Box<Expr>, Box<Expr>),
    Call(String, Vec<Expr>),
}

impl Expr {
    pub fn parse(text: &str) -> Result<Expr, MarkupError> {
        let mut parser = ExprParser {
            cursor: Cursor::new(text),
        };
        let expr = parser.expr()?;
        parser.cursor.skip_whitespace();
        match parser.cursor.peek() {
            None => Ok(expr),
            Some(found) => Err(MarkupError::Unexpected {
                offset: parser.cursor.offset(),
                found,
            }),
        }
    }

    /// Evaluate with `lookup` resolving variables. `None` on an unbound variable,
    /// unknown function or non-finite result.
    pub fn eval(&self, lookup: &dyn Fn(&str) -> Option<f64>) -> Option<f64> {
        let value = match self {
            Expr::Num(value) => *value,
            Expr::Var(name) => lookup(name)?,
            Expr::Neg(inner) => -inner.eval(lookup)?,
            Expr::Add(l, r) => l.eval(lookup)? + r.eval(lookup)?,
            Expr::Sub(l, r) => l.eval(lookup)? - r.eval(lookup)?,
            Expr::Mul(l, r) => l.eval(lookup)? * r.eval(lookup)?,
            Expr::Div(l, r) => l.eval(lookup)? / r.eval(lookup)?,
            Expr::Pow(l, r) => l.eval(lookup)?.powf(r.eval(lookup)?),
            Expr::Call(name, args) => {
                let args = args
                    .iter()
                    .map(|arg| arg.eval(lookup))
                    .collect::<Option<Vec<f64>>>()?;
                call(name, &args)?
            }
        };
        value.is_finite().then_some(value)
    }

    /// Variable names in first-use order, without repeats.
    pub fn variables(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Num(_) => {}
            Expr::Var(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name.as_str());
                }
            }
            Expr::Neg(inner) => inner.collect_variables(names),
            Expr::Add(l, r) | Expr::Sub(l, r) | Expr::Mul(l, r) | Expr::Div(l, r) | Expr::Pow(l, r) => {
                l.collect_variables(names);
                r.collect_variables(names);
            }
            Expr::Call(_, args) => args.iter().for_each(|arg| arg.collect_variables(names)),
        }
    }

    pub fn to_latex(&self) -> String {
        match self {
            Expr::Num(value) => format_number(*value),
            Expr::Var(name) => name.clone(),
            Expr::Neg(inner) => format!("-{}", latex_paren(inner, 3)),
            Expr::Add(l, r) => format!("{} + {}", l.to_latex(), r.to_latex()),
            Expr::Sub(l, r) => format!("{} - {}", l.to_latex(), latex_paren(r, 2)),
            Expr::Mul(l, r) => format!("{} \\cdot {}", latex_paren(l, 2), latex_paren(r, 2)),
            Expr::Div(l, r) => format!("\\frac{{{}}}{{{}}}", l.to_latex(), r.to_latex()),
            Expr::Pow(l, r) if l.precedence() < 5 => {
                format!("\\left({}\\right)^{{{}}}", l.to_latex(), r.to_latex())
            }
            Expr::Pow(l, r) => format!("{}^{{{}}}", l.to_latex(), r.to_latex()),
            Expr::Call(name, args) => match (name.as_str(), args.as_slice()) {
                ("pi", []) => "\\pi".to_string(),
                ("sqrt", [arg]) => format!("\\sqrt{{{}}}", arg.to_latex()),
                (name, args) => {
                    let args: Vec<String> = args.iter().map(Expr::to_latex).collect();
                    format!("\\operatorname{{{name}}}\\left({}\\right)", args.join(", "))
                }
            },
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Add(..) | Expr::Sub(..) => 1,
            Expr::Mul(..) | Expr::Div(..) => 2,
            Expr::Neg(_) => 3,
            Expr::Pow(..) => 4,
            Expr::Num(value) if *value < 0.0 => 3,
            Expr::Num(_) | Expr::Var(_) | Expr::Call(..) => 5,
        }
    }

    /// Like [`Expr::precedence`] but `\frac` groups its operands itself.
    fn latex_precedence(&self) -> u8 {
        match self {
            Expr::Div(..) => 5,
            other => other.precedence(),
        }
    }
}

fn latex_paren(expr: &Expr, min: u8) -> String {
    if expr.latex_precedence() < min {
        format!("\\left({}\\right)", expr.to_latex())
    } else {
        expr.to_latex()
    }
}

fn call(name: &str, args: &[f64]) -> Option<f64> {
    let value = match (name, args) {
        ("pi", []) => std::f64::consts::PI,
        ("abs", [x]) => x.abs(),
        ("sqrt", [x]) => x.sqrt(),
        ("exp", [x]) => x.exp(),
        ("log", [x]) => x.ln(),
        ("log10", [x]) => x.log10(),
        ("sin", [x]) => x.sin(),
        ("cos", [x]) => x.cos(),
        ("tan", [x]) => x.tan(),
        ("round", [x, digits]) => {
            let scale = 10f64.powf(digits.trunc());
            (x * scale).round() / scale
        }
        ("pow", [x, y]) => x.powf(*y),
        ("min", [first, rest @ ..]) => rest.iter().fold(*first, |acc, v| acc.min(*v)),
        ("max", [first, rest @ ..]) => rest.iter().fold(*first, |acc, v| acc.max(*v)),
        _ => return None,
    };
    Some(value)
}

impl fmt::Display for Expr {
    /// Plain infix form, parenthesized only where precedence requires it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn side(f: &mut fmt::Formatter<'_>, expr: &Expr, min: u8) -> fmt::Result {
            if expr.precedence() < min {
                write!(f, "({expr})")
            } else {
                write!(f, "{expr}")
            }
        }
        match self {
            Expr::Num(value) => f.write_str(&format_number(*value)),
            Expr::Var(name) => f.write_str(name),
            Expr::Neg(inner) => {
                f.write_str("-")?;
                side(f, inner, 3)
            }
            Expr::Add(l, r) => {
                side(f, l, 1)?;
                f.write_str(" + ")?;
                side(f, r, 1)
            }
            Expr::Sub(l, r) => {
                side(f, l, 1)?;
                f.write_str(" - ")?;
                side(f, r, 2)
            }
            Expr::Mul(l, r) => {
                side(f, l, 2)?;
                f.write_str("*")?;
                side(f, r, 2)
            }
            Expr::Div(l, r) => {
                side(f, l, 2)?;
                f.write_str("/")?;
                side(f, r, 3)
            }
            Expr::Pow(l, r) => {
                side(f, l, 5)?;
                f.write_str("^")?;
                side(f, r, 4)
            }
            Expr::Call(name, args) => {
                write!(f, "{name}(")?;
                for (idx, arg) in args.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

struct ExprParser {
    cursor: Cursor,
}

impl ExprParser {
    fn peek_token(&mut self) -> Option<char> {
        self.cursor.skip_whitespace();
        self.cursor.peek()
    }

    fn expect(&mut self, ch: char) -> Result<(), MarkupError> {
        match self.peek_token() {
            Some(found) if found == ch => {
                self.cursor.advance();
                Ok(())
            }
            Some(found) => Err(MarkupError::Unexpected {
                offset: self.cursor.offset(),
                found,
            }),
            None => Err(MarkupError::Unterminated {
                offset: self.cursor.offset(),
                expected: ch.to_string(),
            }),
        }
    }

    fn expr(&mut self) -> Result<Expr, MarkupError> {
        let mut lhs = self.term()?;
        loop {
            match self.peek_token() {
                Some('+') => {
                    self.cursor.advance();
                    lhs = Expr::Add(Box::new(lhs), Box::new(self.term()?));
                }
                Some('-') => {
                    self.cursor.advance();
                    lhs = Expr::Sub(Box::new(lhs), Box::new(self.term()?));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn term(&mut self) -> Result<Expr, MarkupError> {
        let mut lhs = self.unary()?;
        loop {
            match self.peek_token() {
                Some('*') => {
                    self.cursor.advance();
                    lhs = Expr::Mul(Box::new(lhs), Box::new(self.unary()?));
                }
                Some('/') => {
                    self.cursor.advance();
                    lhs = Expr::Div(Box::new(lhs), Box::new(self.unary()?));
                }
                _ => return Ok(lhs),
            }
        }
    }

    fn unary(&mut self) -> Result<Expr, MarkupError> {
        if self.peek_token() == Some('-') {
            self.cursor.advance();
            return Ok(Expr::Neg(Box::new(self.unary()?)));
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, MarkupError> {
        let base = self.atom()?;
        if self.peek_token() == Some('^') {
            self.cursor.advance();
            return Ok(Expr::Pow(Box::new(base), Box::new(self.unary()?)));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Expr, MarkupError> {
        let next = self.peek_token();
        let offset = self.cursor.offset();
        match next {
            None => Err(MarkupError::UnexpectedEnd { offset }),
            Some('(') => {
                self.cursor.advance();
                let inner = self.expr()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some('{') => {
                self.cursor.advance();
                let name = self.name();
                if name.is_empty() {
                    return Err(MarkupError::UnexpectedEnd {
                        offset: self.cursor.offset(),
                    });
                }
                self.expect('}')?;
                Ok(Expr::Var(name))
            }
            Some(ch) if ch.is_ascii_digit() || ch == '.' => self.number(),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let name = self.name();
                if self.peek_token() != Some('(') {
                    return Ok(Expr::Var(name));
                }
                self.cursor.advance();
                let mut args = Vec::new();
                if self.peek_token() == Some(')') {
                    self.cursor.advance();
                    return Ok(Expr::Call(name, args));
                }
                loop {
                    args.push(self.expr()?);
                    if self.peek_token() == Some(',') {
                        self.cursor.advance();
                        continue;
                    }
                    self.expect(')')?;
                    return Ok(Expr::Call(name, args));
                }
            }
            Some(found) => Err(MarkupError::Unexpected { offset, found }),
        }
    }

    fn name(&mut self) -> String {
        self.cursor.skip_whitespace();
        let mut name = String::new();
        while let Some(ch) = self.cursor.peek() {
            if !(ch.is_alphanumeric() || ch == '_') {
                break;
            }
            name.push(ch);
            self.cursor.advance();
        }
        name
    }

    fn number(&mut self) -> Result<Expr, MarkupError> {
        let offset = self.cursor.offset();
        let mut text = String::new();
        while let Some(ch) = self.cursor.peek() {
            let exponent_sign = (ch == '-' || ch == '+') && text.ends_with(['e', 'E']);
            if !(ch.is_ascii_digit() || ch == '.' || ch == 'e' || ch == 'E' || exponent_sign) {
                break;
            }
            text.push(ch);
            self.cursor.advance();
        }
        text.parse::<f64>()
            .map(Expr::Num)
            .map_err(|_| MarkupError::InvalidNumber { offset, text })
    }
}

use std::fmt::{self, Display, Formatter, Write};

use serde_json::Value;

use crate::{JsonPointer, PointerSegment};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// `.name` or `['name']`
    Child(String),
    /// `[n]`
    Index(usize),
    /// `.*` or `[*]`
    Wildcard,
    /// `[?(...)]`
    Filter(FilterExpr),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A path relative to the current node (`@.a.b`).
    Current(JsonPointer),
    Literal(Value),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpr {
    Or(Box<FilterExpr>, Box<FilterExpr>),
    And(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    Exists(JsonPointer),
}

pub(crate) fn is_name_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'_' || ch == b'-' || ch == b'$'
}

fn write_quoted(f: &mut Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('\'')?;
    for ch in value.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            _ => f.write_char(ch)?,
        }
    }
    f.write_char('\'')
}

fn write_name(f: &mut Formatter<'_>, name: &str) -> fmt::Result {
    if !name.is_empty() && name.bytes().all(is_name_char) {
        write!(f, ".{}", name)
    } else {
        f.write_char('[')?;
        write_quoted(f, name)?;
        f.write_char(']')
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Child(name) => write_name(f, name),
            Segment::Index(index) => write!(f, "[{}]", index),
            Segment::Wildcard => f.write_str("[*]"),
            Segment::Filter(expr) => write!(f, "[?({})]", expr),
        }
    }
}

impl Display for CompareOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        })
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Current(pointer) => {
                f.write_char('@')?;
                for segment in pointer.iter() {
                    match segment {
                        PointerSegment::Key(key) => write_name(f, key)?,
                        PointerSegment::Index(index) => write!(f, "[{}]", index)?,
                    }
                }
                Ok(())
            }
            Operand::Literal(Value::String(s)) => write_quoted(f, s),
            Operand::Literal(value) => Display::fmt(value, f),
        }
    }
}

impl FilterExpr {
    fn precedence(&self) -> u8 {
        match self {
            FilterExpr::Or(..) => 0,
            FilterExpr::And(..) => 1,
            _ => 2,
        }
    }

    fn fmt_operand(&self, f: &mut Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({})", self)
        } else {
            Display::fmt(self, f)
        }
    }
}

impl Display for FilterExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Or(left, right) => {
                left.fmt_operand(f, 0)?;
                f.write_str(" || ")?;
                right.fmt_operand(f, 1)
            }
            FilterExpr::And(left, right) => {
                left.fmt_operand(f, 1)?;
                f.write_str(" && ")?;
                right.fmt_operand(f, 2)
            }
            FilterExpr::Not(expr) => {
                f.write_char('!')?;
                match **expr {
                    FilterExpr::Exists(_) => Display::fmt(expr, f),
                    _ => write!(f, "({})", expr),
                }
            }
            FilterExpr::Compare { left, op, right } => write!(f, "{} {} {}", left, op, right),
            FilterExpr::Exists(pointer) => Display::fmt(&Operand::Current(pointer.clone()), f),
        }
    }
}

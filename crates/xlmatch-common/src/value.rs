use std::{
    fmt::{self, Display},
    hash::{Hash, Hasher},
};

use crate::ExcelError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A resolved cell or argument value as seen by the lookup and criteria
/// routines.
///
/// `Empty` is a blank cell, `Missing` an argument position that exists but
/// was left out (`=VLOOKUP(A1,B1:C9,2,)`). The two are kept apart because
/// several functions treat them differently.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    Empty,
    Error(ExcelError),
    Missing,
}

/// Discriminant of a [`LiteralValue`], used wherever only the variant
/// matters (type-mismatch detection, diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Number,
    Text,
    Boolean,
    Empty,
    Error,
    Missing,
}

impl Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Boolean => "boolean",
            ValueKind::Empty => "blank",
            ValueKind::Error => "error",
            ValueKind::Missing => "missing",
        })
    }
}

impl Hash for LiteralValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind().hash(state);
        match self {
            LiteralValue::Number(n) => n.to_bits().hash(state),
            LiteralValue::Text(s) => s.hash(state),
            LiteralValue::Boolean(b) => b.hash(state),
            LiteralValue::Error(e) => e.hash(state),
            LiteralValue::Empty | LiteralValue::Missing => {}
        }
    }
}

impl Eq for LiteralValue {}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Number(n) => write!(f, "{n}"),
            LiteralValue::Text(s) => write!(f, "{s}"),
            LiteralValue::Boolean(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            LiteralValue::Error(e) => write!(f, "{}", e.kind),
            LiteralValue::Empty | LiteralValue::Missing => Ok(()),
        }
    }
}

impl LiteralValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            LiteralValue::Number(_) => ValueKind::Number,
            LiteralValue::Text(_) => ValueKind::Text,
            LiteralValue::Boolean(_) => ValueKind::Boolean,
            LiteralValue::Empty => ValueKind::Empty,
            LiteralValue::Error(_) => ValueKind::Error,
            LiteralValue::Missing => ValueKind::Missing,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LiteralValue::Error(_))
    }

    /// `Empty` or `Missing`.
    pub fn is_blank(&self) -> bool {
        matches!(self, LiteralValue::Empty | LiteralValue::Missing)
    }

    /// The numeric payload of a `Number`, nothing else.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            LiteralValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Turn an error value into `Err`, pass everything else through.
    pub fn into_result(self) -> Result<LiteralValue, ExcelError> {
        match self {
            LiteralValue::Error(e) => Err(e),
            other => Ok(other),
        }
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        LiteralValue::Number(n)
    }
}

impl From<i32> for LiteralValue {
    fn from(n: i32) -> Self {
        LiteralValue::Number(n as f64)
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        LiteralValue::Boolean(b)
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        LiteralValue::Text(s.to_string())
    }
}

impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        LiteralValue::Text(s)
    }
}

//! Excel-style error representation shared by every lookup and criteria
//! routine.
//!
//! - **`ExcelErrorKind`** : the canonical set of Excel error codes
//! - **`ExcelError`**     : the kind plus an optional human message
//!
//! Errors are values: a cell may hold one (`LiteralValue::Error`) and every
//! public operation returns one instead of panicking.

use std::{error::Error, fmt};

use crate::LiteralValue;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// All recognised Excel error codes.
///
/// **Note:** names are CamelCase (idiomatic Rust) while `Display`
/// renders them exactly as Excel shows them (`#DIV/0!`, …).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ExcelErrorKind {
    Null,
    Ref,
    Name,
    Value,
    Div,
    Na,
    Num,
}

impl fmt::Display for ExcelErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "#NULL!",
            Self::Ref => "#REF!",
            Self::Name => "#NAME?",
            Self::Value => "#VALUE!",
            Self::Div => "#DIV/0!",
            Self::Na => "#N/A",
            Self::Num => "#NUM!",
        })
    }
}

impl ExcelErrorKind {
    /// Parse an error literal such as `#N/A` (case-insensitive, surrounding
    /// whitespace ignored). Unknown text yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.trim().to_ascii_lowercase().as_str() {
            "#null!" => Self::Null,
            "#ref!" => Self::Ref,
            "#name?" => Self::Name,
            "#value!" => Self::Value,
            "#div/0!" => Self::Div,
            "#n/a" => Self::Na,
            "#num!" => Self::Num,
            _ => return None,
        })
    }
}

/// The single struct the API passes around.
///
/// * **kind**    – the mandatory Excel error code
/// * **message** – optional human explanation (never compared by callers
///   that only care about the code; use `kind` for that)
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExcelError {
    pub kind: ExcelErrorKind,
    pub message: Option<String>,
}

/* ───────────────────── Constructors & helpers ─────────────────────── */

impl From<ExcelErrorKind> for ExcelError {
    fn from(kind: ExcelErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }
}

impl ExcelError {
    /// Basic constructor (no message).
    pub fn new(kind: ExcelErrorKind) -> Self {
        kind.into()
    }

    pub fn new_na() -> Self {
        Self::new(ExcelErrorKind::Na)
    }

    pub fn new_value() -> Self {
        Self::new(ExcelErrorKind::Value)
    }

    pub fn new_ref() -> Self {
        Self::new(ExcelErrorKind::Ref)
    }

    pub fn new_num() -> Self {
        Self::new(ExcelErrorKind::Num)
    }

    pub fn new_div() -> Self {
        Self::new(ExcelErrorKind::Div)
    }

    /// Attach a human-readable explanation.
    pub fn with_message<S: Into<String>>(mut self, msg: S) -> Self {
        self.message = Some(msg.into());
        self
    }

    /// Build from an error literal; `None` when the text is not one.
    pub fn from_error_string(s: &str) -> Option<Self> {
        ExcelErrorKind::parse(s).map(Self::new)
    }
}

/* ───────────────────────── Display / Error ────────────────────────── */

impl fmt::Display for ExcelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref msg) = self.message {
            write!(f, ": {msg}")?;
        }
        Ok(())
    }
}

impl Error for ExcelError {}

impl From<ExcelError> for String {
    fn from(error: ExcelError) -> Self {
        format!("{error}")
    }
}

impl From<ExcelError> for LiteralValue {
    fn from(error: ExcelError) -> Self {
        LiteralValue::Error(error)
    }
}

impl PartialEq<str> for ExcelErrorKind {
    fn eq(&self, other: &str) -> bool {
        format!("{self}") == other
    }
}

impl PartialEq<&str> for ExcelError {
    fn eq(&self, other: &&str) -> bool {
        self.kind.to_string() == *other
    }
}

impl PartialEq<str> for ExcelError {
    fn eq(&self, other: &str) -> bool {
        self.kind.to_string() == other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_render_like_excel() {
        assert_eq!(ExcelErrorKind::Na.to_string(), "#N/A");
        assert_eq!(ExcelErrorKind::Div.to_string(), "#DIV/0!");
        assert_eq!(ExcelError::new_value(), "#VALUE!");
    }

    #[test]
    fn parse_is_case_insensitive_and_total() {
        assert_eq!(ExcelErrorKind::parse(" #n/a "), Some(ExcelErrorKind::Na));
        assert_eq!(ExcelErrorKind::parse("#REF!"), Some(ExcelErrorKind::Ref));
        assert_eq!(ExcelErrorKind::parse("#BOGUS"), None);
        assert!(ExcelError::from_error_string("abc").is_none());
    }

    #[test]
    fn message_is_shown_after_code() {
        let e = ExcelError::new_ref().with_message("column 4 outside 0..2");
        assert_eq!(e.to_string(), "#REF!: column 4 outside 0..2");
        assert_eq!(e.kind, ExcelErrorKind::Ref);
    }
}

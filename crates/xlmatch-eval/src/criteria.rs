//! Criteria predicates for the `*IF` / `*IFS` functions.
//!
//! A criteria argument is compiled once into a [`CriteriaPredicate`] and then
//! tested against every cell of its range. Text criteria may carry a leading
//! comparison operator (`=`, `<>`, `<`, `<=`, `>`, `>=`); the remainder is read
//! as a boolean, a number, an error literal, or text, in that order.

use std::cmp::Ordering;

use xlmatch_common::{ExcelError, ExcelErrorKind, LiteralValue};

use crate::coercion::{parse_bool_text, parse_number_text};
use crate::compare::cmp_text_ci;
use crate::wildcard::WildcardPattern;

/// Comparison operator of a criteria; `None` when the text had no prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CriteriaOp {
    None,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CriteriaOp {
    /// Split a leading operator off `text`, longest operator first.
    pub fn split(text: &str) -> (Self, &str) {
        const OPS: [(&str, CriteriaOp); 6] = [
            ("<>", CriteriaOp::Ne),
            ("<=", CriteriaOp::Le),
            (">=", CriteriaOp::Ge),
            ("<", CriteriaOp::Lt),
            (">", CriteriaOp::Gt),
            ("=", CriteriaOp::Eq),
        ];
        OPS.iter()
            .find_map(|(sym, op)| text.strip_prefix(sym).map(|rest| (*op, rest)))
            .unwrap_or((CriteriaOp::None, text))
    }

    /// Whether a cell that compares `ord` to the operand passes.
    pub fn evaluate(self, ord: Ordering) -> bool {
        match self {
            CriteriaOp::None | CriteriaOp::Eq => ord == Ordering::Equal,
            CriteriaOp::Ne => ord != Ordering::Equal,
            CriteriaOp::Lt => ord == Ordering::Less,
            CriteriaOp::Le => ord != Ordering::Greater,
            CriteriaOp::Gt => ord == Ordering::Greater,
            CriteriaOp::Ge => ord != Ordering::Less,
        }
    }

    /// Equality-only evaluation for pattern and error matches. Ordering
    /// operators never pass.
    pub fn evaluate_match(self, matched: bool) -> bool {
        match self {
            CriteriaOp::None | CriteriaOp::Eq => matched,
            CriteriaOp::Ne => !matched,
            CriteriaOp::Lt | CriteriaOp::Le | CriteriaOp::Gt | CriteriaOp::Ge => false,
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, CriteriaOp::None | CriteriaOp::Eq | CriteriaOp::Ne)
    }
}

/// A compiled criteria. Immutable; test cells with [`matches`].
///
/// [`matches`]: CriteriaPredicate::matches
#[derive(Debug, Clone, PartialEq)]
pub enum CriteriaPredicate {
    Number {
        op: CriteriaOp,
        value: f64,
    },
    Boolean {
        op: CriteriaOp,
        value: bool,
    },
    Error {
        op: CriteriaOp,
        kind: ExcelErrorKind,
    },
    Text {
        op: CriteriaOp,
        value: String,
        pattern: Option<WildcardPattern>,
    },
    /// Blank criteria: matches zero and empty text.
    Blank,
}

/// Compile a criteria value. An error value fails compilation with that
/// error.
pub fn parse_criteria(criteria: &LiteralValue) -> Result<CriteriaPredicate, ExcelError> {
    match criteria {
        LiteralValue::Number(n) => Ok(CriteriaPredicate::Number {
            op: CriteriaOp::None,
            value: *n,
        }),
        LiteralValue::Boolean(b) => Ok(CriteriaPredicate::Boolean {
            op: CriteriaOp::None,
            value: *b,
        }),
        LiteralValue::Empty | LiteralValue::Missing => Ok(CriteriaPredicate::Blank),
        LiteralValue::Error(e) => Err(e.clone()),
        LiteralValue::Text(s) => Ok(parse_text_criteria(s)),
    }
}

fn parse_text_criteria(text: &str) -> CriteriaPredicate {
    let (op, rest) = CriteriaOp::split(text);
    if let Some(value) = parse_bool_text(rest) {
        return CriteriaPredicate::Boolean { op, value };
    }
    if let Some(value) = parse_number_text(rest) {
        return CriteriaPredicate::Number { op, value };
    }
    if let Some(kind) = ExcelErrorKind::parse(rest) {
        return CriteriaPredicate::Error { op, kind };
    }
    let pattern = if op.is_equality() {
        WildcardPattern::parse(rest)
    } else {
        None
    };
    CriteriaPredicate::Text {
        op,
        value: rest.to_string(),
        pattern,
    }
}

impl CriteriaPredicate {
    pub fn matches(&self, cell: &LiteralValue) -> bool {
        match self {
            CriteriaPredicate::Number { op, value } => match cell {
                // -0.0 equals 0
                LiteralValue::Number(n) => n
                    .partial_cmp(value)
                    .map_or(*op == CriteriaOp::Ne, |ord| op.evaluate(ord)),
                _ => *op == CriteriaOp::Ne,
            },
            CriteriaPredicate::Boolean { op, value } => match cell {
                LiteralValue::Boolean(b) => op.evaluate(b.cmp(value)),
                _ => *op == CriteriaOp::Ne,
            },
            CriteriaPredicate::Error { op, kind } => match cell {
                LiteralValue::Error(e) => op.evaluate_match(e.kind == *kind),
                _ => *op == CriteriaOp::Ne,
            },
            CriteriaPredicate::Text { op, value, pattern } => {
                match_text(*op, value, pattern.as_ref(), cell)
            }
            CriteriaPredicate::Blank => match cell {
                LiteralValue::Number(n) => *n == 0.0,
                LiteralValue::Text(s) => s.is_empty(),
                _ => false,
            },
        }
    }
}

fn match_text(
    op: CriteriaOp,
    value: &str,
    pattern: Option<&WildcardPattern>,
    cell: &LiteralValue,
) -> bool {
    let tested = match cell {
        LiteralValue::Empty | LiteralValue::Missing => {
            return match op {
                CriteriaOp::None | CriteriaOp::Eq => value.is_empty(),
                CriteriaOp::Ne => !value.is_empty(),
                _ => false,
            };
        }
        LiteralValue::Text(s) => s,
        _ => return op == CriteriaOp::Ne,
    };
    if tested.is_empty() && value.is_empty() {
        // "" and "<>" match an empty string, "=" does not
        return matches!(op, CriteriaOp::None | CriteriaOp::Ne);
    }
    match pattern {
        Some(p) => op.evaluate_match(p.matches(tested)),
        None => op.evaluate(cmp_text_ci(tested, value)),
    }
}

//! Four-valued comparison of a lookup value against candidate cells.
//!
//! A [`CompareResult`] always reads "lookup value compared to candidate":
//! `LessThan` means the lookup value sorts before the candidate. Values of
//! different variants never order against each other; they report
//! [`CompareResult::TypeMismatch`] and the search algorithms branch on it.

use std::cmp::Ordering;

use xlmatch_common::{ExcelError, LiteralValue};

use crate::coercion;
use crate::wildcard::WildcardPattern;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareResult {
    LessThan,
    Equal,
    GreaterThan,
    TypeMismatch,
}

impl CompareResult {
    pub fn from_ordering(o: Ordering) -> Self {
        match o {
            Ordering::Less => CompareResult::LessThan,
            Ordering::Equal => CompareResult::Equal,
            Ordering::Greater => CompareResult::GreaterThan,
        }
    }

    /// Pattern matches only know "equal" and "not equal"; the latter is
    /// reported as `LessThan`.
    pub fn from_match(matched: bool) -> Self {
        if matched {
            CompareResult::Equal
        } else {
            CompareResult::LessThan
        }
    }

    pub fn is_type_mismatch(self) -> bool {
        self == CompareResult::TypeMismatch
    }
    pub fn is_less_than(self) -> bool {
        self == CompareResult::LessThan
    }
    pub fn is_equal(self) -> bool {
        self == CompareResult::Equal
    }
    pub fn is_greater_than(self) -> bool {
        self == CompareResult::GreaterThan
    }
}

/// Case-insensitive ordinal text ordering.
pub fn cmp_text_ci(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// A lookup value prepared for repeated comparison against candidates.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupComparer {
    Number(f64),
    Boolean(bool),
    Text {
        text: String,
        /// Present only when the comparer is wildcard-capable and the text
        /// uses wildcard syntax.
        pattern: Option<WildcardPattern>,
    },
}

impl LookupComparer {
    /// Strict comparer used by VLOOKUP, HLOOKUP and MATCH.
    ///
    /// A blank (or omitted) lookup value searches for `0`. Error values are
    /// returned as the error.
    pub fn new(target: &LiteralValue, wildcard: bool) -> Result<Self, ExcelError> {
        match target {
            LiteralValue::Number(n) => Ok(LookupComparer::Number(*n)),
            LiteralValue::Boolean(b) => Ok(LookupComparer::Boolean(*b)),
            LiteralValue::Text(s) => Ok(Self::text(s.clone(), wildcard)),
            LiteralValue::Empty | LiteralValue::Missing => Ok(LookupComparer::Number(0.0)),
            LiteralValue::Error(e) => Err(e.clone()),
        }
    }

    /// Tolerant comparer used by XLOOKUP and for ranking fallback
    /// candidates against each other.
    ///
    /// Booleans stay boolean and numbers stay numeric when `exact` is set.
    /// Everything else is coerced to text (blank becomes `""`), so it only
    /// ever equals or orders against text candidates.
    pub fn tolerant(
        target: &LiteralValue,
        exact: bool,
        wildcard: bool,
    ) -> Result<Self, ExcelError> {
        match target {
            LiteralValue::Boolean(b) => Ok(LookupComparer::Boolean(*b)),
            LiteralValue::Number(n) if exact => Ok(LookupComparer::Number(*n)),
            LiteralValue::Error(e) => Err(e.clone()),
            other => Ok(Self::text(coercion::to_text(other)?, wildcard)),
        }
    }

    fn text(text: String, wildcard: bool) -> Self {
        let pattern = if wildcard {
            WildcardPattern::parse(&text)
        } else {
            None
        };
        LookupComparer::Text { text, pattern }
    }

    pub fn compare_to(&self, candidate: &LiteralValue) -> CompareResult {
        match (self, candidate) {
            (LookupComparer::Number(a), LiteralValue::Number(b)) => {
                CompareResult::from_ordering(a.total_cmp(b))
            }
            (LookupComparer::Boolean(a), LiteralValue::Boolean(b)) => {
                CompareResult::from_ordering(a.cmp(b))
            }
            (LookupComparer::Text { pattern: Some(p), .. }, LiteralValue::Text(s)) => {
                CompareResult::from_match(p.matches(s))
            }
            (LookupComparer::Text { text, pattern: None }, LiteralValue::Text(s)) => {
                CompareResult::from_ordering(cmp_text_ci(text, s))
            }
            _ => CompareResult::TypeMismatch,
        }
    }
}

/// Strict, wildcard-free comparison of two values.
pub fn compare(target: &LiteralValue, other: &LiteralValue) -> CompareResult {
    match LookupComparer::new(target, false) {
        Ok(cmp) => cmp.compare_to(other),
        Err(_) => CompareResult::TypeMismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CompareResult::*;

    fn t(s: &str) -> LiteralValue {
        LiteralValue::Text(s.into())
    }

    #[test]
    fn boolean_ordering_and_cross_type() {
        assert_eq!(
            compare(&LiteralValue::Boolean(true), &LiteralValue::Boolean(false)),
            GreaterThan
        );
        assert_eq!(
            compare(&LiteralValue::Boolean(false), &LiteralValue::Boolean(false)),
            Equal
        );
        assert_eq!(
            compare(&LiteralValue::Number(1.0), &LiteralValue::Boolean(true)),
            TypeMismatch
        );
        assert_eq!(compare(&LiteralValue::Number(1.0), &t("1")), TypeMismatch);
    }

    #[test]
    fn numbers_and_text() {
        assert_eq!(compare(&LiteralValue::Number(2.0), &LiteralValue::Number(3.0)), LessThan);
        assert_eq!(compare(&LiteralValue::Number(3.0), &LiteralValue::Number(3.0)), Equal);
        assert_eq!(compare(&t("apple"), &t("APPLE")), Equal);
        assert_eq!(compare(&t("b"), &t("A")), GreaterThan);
        assert_eq!(compare(&t("a*"), &t("abc")), LessThan);
    }

    #[test]
    fn blank_lookup_value_searches_for_zero() {
        assert_eq!(compare(&LiteralValue::Empty, &LiteralValue::Number(0.0)), Equal);
        assert_eq!(compare(&LiteralValue::Missing, &LiteralValue::Number(-1.0)), GreaterThan);
        assert_eq!(compare(&LiteralValue::Number(0.0), &LiteralValue::Empty), TypeMismatch);
    }

    #[test]
    fn error_targets_do_not_compare() {
        let e = LiteralValue::Error(ExcelError::new_na());
        assert!(LookupComparer::new(&e, false).is_err());
        assert!(LookupComparer::tolerant(&e, true, false).is_err());
        assert_eq!(compare(&e, &e), TypeMismatch);
    }

    #[test]
    fn wildcard_comparer_only_reports_match() {
        let cmp = LookupComparer::new(&t("b?t"), true).unwrap();
        assert_eq!(cmp.compare_to(&t("BAT")), Equal);
        assert_eq!(cmp.compare_to(&t("zzz")), LessThan);
        assert_eq!(cmp.compare_to(&t("aaa")), LessThan);
        assert_eq!(cmp.compare_to(&LiteralValue::Number(1.0)), TypeMismatch);
    }

    #[test]
    fn tolerant_coerces_lookup_value_to_text() {
        let cmp = LookupComparer::tolerant(&LiteralValue::Number(5.0), false, false).unwrap();
        assert_eq!(cmp.compare_to(&t("5")), Equal);
        assert_eq!(cmp.compare_to(&LiteralValue::Number(5.0)), TypeMismatch);

        let exact = LookupComparer::tolerant(&LiteralValue::Number(5.0), true, false).unwrap();
        assert_eq!(exact.compare_to(&LiteralValue::Number(5.0)), Equal);

        let blank = LookupComparer::tolerant(&LiteralValue::Empty, true, false).unwrap();
        assert_eq!(blank.compare_to(&t("")), Equal);
        assert_eq!(blank.compare_to(&LiteralValue::Empty), TypeMismatch);
    }

    #[test]
    fn text_ordering_is_case_insensitive_beyond_ascii() {
        assert_eq!(cmp_text_ci("Äpfel", "äPFEL"), Ordering::Equal);
        assert_eq!(cmp_text_ci("abc", "abd"), Ordering::Less);
        assert_eq!(cmp_text_ci("ab", "a"), Ordering::Greater);
    }
}

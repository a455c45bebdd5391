//! Value coercion with spreadsheet rules.
//!
//! Every helper takes all six [`LiteralValue`] variants into account and
//! propagates error values unchanged.

use xlmatch_common::{ExcelError, LiteralValue};

use crate::traits::Range;

/// Parse text the way the spreadsheet reads a number typed into a cell:
/// surrounding whitespace is ignored, a sign, decimal point and exponent are
/// allowed, and words such as `inf`/`nan` are not numbers.
pub fn parse_number_text(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    if t
        .bytes()
        .any(|b| b.is_ascii_alphabetic() && b != b'e' && b != b'E')
    {
        return None;
    }
    t.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// `TRUE` / `FALSE`, case-insensitive, nothing else.
pub fn parse_bool_text(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("TRUE") {
        Some(true)
    } else if s.eq_ignore_ascii_case("FALSE") {
        Some(false)
    } else {
        None
    }
}

/// Coerce to `f64`:
/// - Number maps to itself
/// - Boolean maps to 1.0/0.0
/// - Empty / Missing map to 0.0
/// - numeric Text is parsed, other Text -> `#VALUE!`
/// - Error propagates
pub fn to_number(value: &LiteralValue) -> Result<f64, ExcelError> {
    match value {
        LiteralValue::Number(n) => Ok(*n),
        LiteralValue::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
        LiteralValue::Empty | LiteralValue::Missing => Ok(0.0),
        LiteralValue::Text(s) => parse_number_text(s).ok_or_else(|| {
            ExcelError::new_value().with_message(format!("cannot convert '{s}' to a number"))
        }),
        LiteralValue::Error(e) => Err(e.clone()),
    }
}

/// [`to_number`] rounded down to an integer.
pub fn to_int(value: &LiteralValue) -> Result<i64, ExcelError> {
    let n = sanitize_numeric(to_number(value)?)?;
    let floored = n.floor();
    if floored < i64::MIN as f64 || floored > i64::MAX as f64 {
        return Err(ExcelError::new_num());
    }
    Ok(floored as i64)
}

/// Render a number the way a cell shows it in General format: rounded to 15
/// significant digits, no trailing zeros, scientific form (`1.5E+21`) once
/// the decimal exponent leaves `-9..=19`.
pub fn number_to_text(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    let sci = format!("{n:.14e}");
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    if !(-9..=19).contains(&exp) {
        let mantissa = mantissa.trim_end_matches('0').trim_end_matches('.');
        let sign = if exp < 0 { '-' } else { '+' };
        return format!("{mantissa}E{sign}{:02}", exp.abs());
    }
    let rounded: f64 = sci.parse().unwrap_or(n);
    format!("{rounded}")
}

/// Coerce to text. Blank and missing become the empty string.
pub fn to_text(value: &LiteralValue) -> Result<String, ExcelError> {
    match value {
        LiteralValue::Text(s) => Ok(s.clone()),
        LiteralValue::Number(n) => Ok(number_to_text(*n)),
        LiteralValue::Boolean(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
        LiteralValue::Empty | LiteralValue::Missing => Ok(String::new()),
        LiteralValue::Error(e) => Err(e.clone()),
    }
}

/// NaN and infinities never reach a cell: they become `#NUM!`.
pub fn sanitize_numeric(n: f64) -> Result<f64, ExcelError> {
    if n.is_finite() {
        Ok(n)
    } else {
        Err(ExcelError::new_num())
    }
}

/// Pick the single cell of `range` that lines up with the evaluating cell.
///
/// A 1x1 range yields its cell. A column intersects the evaluating row, a
/// row the evaluating column, a block both. No intersection is `#VALUE!`.
pub fn implicit_intersection(
    range: &dyn Range,
    row: u32,
    col: u32,
) -> Result<LiteralValue, ExcelError> {
    let (height, width) = range.dimensions();
    if height == 0 || width == 0 {
        return Err(ExcelError::new_value().with_message("empty range"));
    }
    if height == 1 && width == 1 {
        return Ok(range.get(0, 0));
    }
    let (top, left) = range.origin();
    let rel_row = row.checked_sub(top).map(|r| r as usize).filter(|&r| r < height);
    let rel_col = col.checked_sub(left).map(|c| c as usize).filter(|&c| c < width);
    let hit = match (height, width) {
        (_, 1) => rel_row.map(|r| (r, 0)),
        (1, _) => rel_col.map(|c| (0, c)),
        _ => rel_row.zip(rel_col),
    };
    hit.map(|(r, c)| range.get(r, c)).ok_or_else(|| {
        ExcelError::new_value().with_message("implicit intersection failed")
    })
}

//! Argument schemas and the resolution rules shared by the lookup
//! functions.

use smallvec::{SmallVec, smallvec};
use xlmatch_common::{ArgKind, ExcelError, LiteralValue};

use crate::coercion::{self, parse_bool_text, parse_number_text};
use crate::lookup::{MatchMode, MatchType, SearchMode};
use crate::traits::{ArgumentHandle, FunctionContext, Range};
use crate::vector::{LineVector, SheetVector, create_vector};

/// What a function accepts in one argument slot.
#[derive(Clone, Debug)]
pub struct ArgSchema {
    pub kinds: SmallVec<[ArgKind; 2]>,
    pub required: bool,
    /// The last `n` slots repeat for variadic functions (`SUMIFS` pairs).
    pub repeating: Option<usize>,
}

impl ArgSchema {
    pub fn any() -> Self {
        Self {
            kinds: smallvec![ArgKind::Any],
            required: true,
            repeating: None,
        }
    }

    pub fn range() -> Self {
        Self {
            kinds: smallvec![ArgKind::Range],
            required: true,
            repeating: None,
        }
    }

    pub fn number_lenient_scalar() -> Self {
        Self {
            kinds: smallvec![ArgKind::Number],
            required: true,
            repeating: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn repeating(mut self, n: usize) -> Self {
        self.repeating = Some(n);
        self
    }
}

/// Check each argument against its slot. Only the structural `Range` kind
/// can fail here; scalar kinds are coerced by the function itself. An
/// omitted argument always fills an optional slot.
pub fn validate_args(args: &[ArgumentHandle<'_>], schema: &[ArgSchema]) -> Result<(), ExcelError> {
    if schema.is_empty() {
        return Ok(());
    }
    let repeat = schema
        .last()
        .and_then(|s| s.repeating)
        .filter(|n| *n > 0 && *n <= schema.len());
    for (idx, arg) in args.iter().enumerate() {
        let spec = if idx < schema.len() {
            &schema[idx]
        } else if let Some(n) = repeat {
            let start = schema.len() - n;
            &schema[start + (idx - start) % n]
        } else {
            return Err(ExcelError::new_value().with_message("Too many arguments"));
        };
        if !spec.required && arg.is_missing() {
            continue;
        }
        if !spec.kinds.iter().any(|k| arg.matches_kind(*k)) {
            let expected: Vec<String> = spec
                .kinds
                .iter()
                .map(|k| format!("{k:?}").to_lowercase())
                .collect();
            return Err(ExcelError::new_value().with_message(format!(
                "argument {} expects {}",
                idx + 1,
                expected.join(" or ")
            )));
        }
    }
    Ok(())
}

/// Collapse an argument to one value; error values come back as `Err`.
pub fn resolve_single_value(
    arg: &ArgumentHandle<'_>,
    ctx: &dyn FunctionContext,
) -> Result<LiteralValue, ExcelError> {
    arg.value(ctx)?.into_result()
}

/// 1-based column/row index argument of VLOOKUP/HLOOKUP, returned
/// zero-based.
///
/// Anything that fails to resolve, and text that is not a number, is
/// `#REF!`. Booleans read as 0/1. Fractions round down. Below 1 is
/// `#VALUE!`.
pub fn resolve_row_or_col_index_arg(
    arg: &ArgumentHandle<'_>,
    ctx: &dyn FunctionContext,
) -> Result<usize, ExcelError> {
    let value = resolve_single_value(arg, ctx).map_err(|_| ExcelError::new_ref())?;
    if let LiteralValue::Text(s) = &value {
        if parse_number_text(s).is_none() {
            return Err(ExcelError::new_ref().with_message(format!("'{s}' is not an index")));
        }
    }
    let one_based = coercion::to_int(&value)?;
    if one_based < 1 {
        return Err(ExcelError::new_value().with_message("index must be at least 1"));
    }
    usize::try_from(one_based - 1).map_err(|_| ExcelError::new_ref())
}

/// VLOOKUP/HLOOKUP `range_lookup`. Absent means approximate; an omitted
/// (`=VLOOKUP(A1,B:C,2,)`) or blank argument means exact.
pub fn resolve_range_lookup_arg(
    arg: Option<&ArgumentHandle<'_>>,
    ctx: &dyn FunctionContext,
) -> Result<bool, ExcelError> {
    let Some(arg) = arg else {
        return Ok(true);
    };
    match resolve_single_value(arg, ctx)? {
        LiteralValue::Missing | LiteralValue::Empty => Ok(false),
        LiteralValue::Boolean(b) => Ok(b),
        LiteralValue::Text(s) => {
            if s.is_empty() {
                return Err(ExcelError::new_value().with_message("empty range_lookup"));
            }
            parse_bool_text(&s).ok_or_else(|| {
                ExcelError::new_value().with_message(format!("'{s}' is not TRUE or FALSE"))
            })
        }
        LiteralValue::Number(n) => Ok(n != 0.0),
        LiteralValue::Error(e) => Err(e),
    }
}

/// Table argument of VLOOKUP/HLOOKUP: an area or single-cell reference.
pub fn resolve_table_array_arg<'a>(arg: &ArgumentHandle<'a>) -> Result<&'a dyn Range, ExcelError> {
    match arg {
        ArgumentHandle::Range(r) => Ok(*r),
        ArgumentHandle::Value(LiteralValue::Error(e)) => Err(e.clone()),
        _ => Err(ExcelError::new_value().with_message("table_array must be a reference")),
    }
}

/// MATCH `match_type`: truncated, then only its sign counts. Absent means
/// `1`, omitted or blank means `0`.
pub fn resolve_match_type(
    arg: Option<&ArgumentHandle<'_>>,
    ctx: &dyn FunctionContext,
) -> Result<MatchType, ExcelError> {
    let Some(arg) = arg else {
        return Ok(MatchType::LargestNotAbove);
    };
    let n = match resolve_single_value(arg, ctx)? {
        LiteralValue::Text(s) => parse_number_text(&s).ok_or_else(|| {
            ExcelError::new_value().with_message(format!("'{s}' is not a match type"))
        })?,
        other => coercion::to_number(&other)?,
    };
    Ok(MatchType::from_sign(n.trunc()))
}

/// MATCH `lookup_array`.
///
/// A 3-D single-cell reference searches across its sheets (one sheet reads
/// as a single value); areas must be one row or one column, else `#N/A`.
/// Scalars are `#N/A`, except text that is not a number, which is
/// `#VALUE!`.
pub fn resolve_lookup_vector<'a>(
    arg: &ArgumentHandle<'a>,
    ctx: &dyn FunctionContext,
) -> Result<LineVector<'a>, ExcelError> {
    match arg {
        ArgumentHandle::Range(r) => create_vector(*r)
            .ok_or_else(|| ExcelError::new_na().with_message("lookup_array is not one-dimensional")),
        ArgumentHandle::SheetRef { volume, row, col } => {
            if volume.sheet_count() == 1 {
                Ok(LineVector::Single(arg.value(ctx)?))
            } else {
                Ok(LineVector::Sheet(SheetVector::new(*volume, *row, *col)?))
            }
        }
        ArgumentHandle::Value(v) => match v {
            LiteralValue::Error(e) => Err(e.clone()),
            LiteralValue::Text(s) if parse_number_text(s).is_none() => Err(ExcelError::new_value()),
            _ => Err(ExcelError::new_na()),
        },
    }
}

/// Integer mode argument (XLOOKUP `match_mode` / `search_mode`); absent or
/// omitted takes `default`.
pub fn resolve_mode_code(
    arg: Option<&ArgumentHandle<'_>>,
    ctx: &dyn FunctionContext,
    default: i32,
) -> Result<i32, ExcelError> {
    let Some(arg) = arg.filter(|a| !a.is_missing()) else {
        return Ok(default);
    };
    let n = coercion::to_int(&resolve_single_value(arg, ctx)?)?;
    i32::try_from(n).map_err(|_| ExcelError::new_value().with_message(format!("invalid mode {n}")))
}

pub fn resolve_match_mode(
    arg: Option<&ArgumentHandle<'_>>,
    ctx: &dyn FunctionContext,
) -> Result<MatchMode, ExcelError> {
    MatchMode::try_from(resolve_mode_code(arg, ctx, 0)?)
}

pub fn resolve_search_mode(
    arg: Option<&ArgumentHandle<'_>>,
    ctx: &dyn FunctionContext,
) -> Result<SearchMode, ExcelError> {
    SearchMode::try_from(resolve_mode_code(arg, ctx, 1)?)
}

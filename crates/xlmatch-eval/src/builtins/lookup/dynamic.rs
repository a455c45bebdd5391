//! XLOOKUP(lookup_value, lookup_array, return_array, [if_not_found], [match_mode], [search_mode])
//!
//! - match_mode: 0 exact (default), -1 exact or next smaller, 1 exact or next
//!   larger, 2 wildcard (`*`, `?`, `~` escapes).
//! - search_mode: 1 first to last (default), -1 last to first, 2 binary over
//!   ascending data, -2 binary over descending data.
//! - lookup_array must be one row or one column; return_array must run the
//!   same way with the same length. Anything else is `#VALUE!`.
//! - if_not_found replaces `#N/A` only; other errors pass through.

use once_cell::sync::Lazy;
use xlmatch_common::{ExcelError, ExcelErrorKind, LiteralValue};

use crate::args::{ArgSchema, resolve_match_mode, resolve_search_mode, resolve_single_value};
use crate::function::{FnCaps, Function};
use crate::lookup::lookup_index;
use crate::traits::{ArgumentHandle, FunctionContext, Range};
use crate::vector::{ColumnVector, LineVector, RowVector, ValueVector, create_vector};

/// The return array as a vector running the same way as `lookup`.
fn aligned_return_vector<'a>(
    lookup: &LineVector<'_>,
    ret: &'a dyn Range,
) -> Result<LineVector<'a>, ExcelError> {
    let (rows, cols) = ret.dimensions();
    let mismatch = || {
        ExcelError::new_value().with_message(format!(
            "return_array is {rows}x{cols}, lookup_array has {} cells",
            lookup.size()
        ))
    };
    match lookup {
        LineVector::Column(_) if cols == 1 && rows == lookup.size() => {
            Ok(LineVector::Column(ColumnVector::new(ret, 0)?))
        }
        LineVector::Row(_) if rows == 1 && cols == lookup.size() => {
            Ok(LineVector::Row(RowVector::new(ret, 0)?))
        }
        _ => Err(mismatch()),
    }
}

/* ───────────────────────── XLOOKUP() ───────────────────────── */

#[derive(Debug)]
pub struct XLookupFn;

impl Function for XLookupFn {
    fn name(&self) -> &'static str {
        "XLOOKUP"
    }
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::LOOKUP
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        static SCHEMA: Lazy<Vec<ArgSchema>> = Lazy::new(|| {
            vec![
                // lookup_value
                ArgSchema::any(),
                // lookup_array
                ArgSchema::range(),
                // return_array
                ArgSchema::range(),
                // if_not_found
                ArgSchema::any().optional(),
                // match_mode
                ArgSchema::number_lenient_scalar().optional(),
                // search_mode
                ArgSchema::number_lenient_scalar().optional(),
            ]
        });
        &SCHEMA
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let lookup_value = resolve_single_value(&args[0], ctx)?;
        let lookup_vector = args[1]
            .range()
            .and_then(create_vector)
            .ok_or_else(|| {
                ExcelError::new_value().with_message("lookup_array must be one row or one column")
            })?;
        let ret = args[2]
            .range()
            .ok_or_else(|| ExcelError::new_value().with_message("return_array must be a range"))?;
        let return_vector = aligned_return_vector(&lookup_vector, ret)?;
        let match_mode = resolve_match_mode(args.get(4), ctx)?;
        let search_mode = resolve_search_mode(args.get(5), ctx)?;

        match lookup_index(&lookup_value, &lookup_vector, match_mode, search_mode) {
            Ok(idx) => Ok(return_vector.item(idx)),
            Err(e) if e.kind == ExcelErrorKind::Na => match args.get(3) {
                Some(fallback) if !fallback.is_missing() => resolve_single_value(fallback, ctx),
                _ => Err(e),
            },
            Err(e) => Err(e),
        }
    }
}

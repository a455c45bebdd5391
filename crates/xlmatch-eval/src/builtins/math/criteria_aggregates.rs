use once_cell::sync::Lazy;
use smallvec::SmallVec;
use xlmatch_common::{ExcelError, LiteralValue};

use crate::aggregate::{AggregateFn, aggregate_ifs};
use crate::args::ArgSchema;
use crate::function::{FnCaps, Function};
use crate::traits::{ArgumentHandle, FunctionContext, Range};

/*
Criteria-driven aggregation functions:
  - SUMIF(range, criteria, [sum_range])
  - COUNTIF(range, criteria)
  - AVERAGEIF(range, criteria, [average_range])
  - SUMIFS(sum_range, criteria_range1, criteria1, ...)
  - COUNTIFS(criteria_range1, criteria1, ...)
  - AVERAGEIFS(average_range, criteria_range1, criteria1, ...)
  - MAXIFS / MINIFS(value_range, criteria_range1, criteria1, ...)

Notes:
  * The *IFS forms need every range to have the same shape (#VALUE! otherwise).
  * SUMIF/AVERAGEIF take the shape of `range` and read their value range
    from its top-left cell, so `SUMIF(A1:A3,">0",B1)` sums B1:B3.
*/

/// A range read through a different shape, anchored at the top-left cell.
/// Cells past the end of the underlying range read as `Empty`.
#[derive(Debug)]
struct AnchoredRange<'a> {
    inner: &'a dyn Range,
    dims: (usize, usize),
}

impl Range for AnchoredRange<'_> {
    fn dimensions(&self) -> (usize, usize) {
        self.dims
    }
    fn get(&self, row: usize, col: usize) -> LiteralValue {
        if row >= self.dims.0 || col >= self.dims.1 {
            return LiteralValue::Empty;
        }
        self.inner.get(row, col)
    }
    fn origin(&self) -> (u32, u32) {
        self.inner.origin()
    }
}

fn range_arg<'a>(arg: &ArgumentHandle<'a>, idx: usize) -> Result<&'a dyn Range, ExcelError> {
    arg.range().ok_or_else(|| {
        ExcelError::new_value().with_message(format!("argument {} must be a range", idx + 1))
    })
}

type CriteriaPairs<'a> = SmallVec<[(&'a dyn Range, LiteralValue); 4]>;

/// `(criteria_range, criteria)` pairs from `args[start..]`. Criteria keep
/// error values so that they surface from criteria parsing.
fn collect_criteria<'a>(
    args: &[ArgumentHandle<'a>],
    start: usize,
    ctx: &dyn FunctionContext,
) -> Result<CriteriaPairs<'a>, ExcelError> {
    let rest = args.get(start..).unwrap_or_default();
    if rest.is_empty() || rest.len() % 2 != 0 {
        return Err(ExcelError::new_value().with_message(format!(
            "expected criteria_range/criteria pairs, got {} arguments",
            rest.len()
        )));
    }
    let mut pairs = CriteriaPairs::new();
    for (i, pair) in rest.chunks_exact(2).enumerate() {
        let range = range_arg(&pair[0], start + i * 2)?;
        pairs.push((range, pair[1].value(ctx)?));
    }
    Ok(pairs)
}

/// Shared body of SUMIF/COUNTIF/AVERAGEIF.
fn eval_single_criteria(
    func: AggregateFn,
    args: &[ArgumentHandle<'_>],
    ctx: &dyn FunctionContext,
) -> Result<LiteralValue, ExcelError> {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("single_criteria", ?func).entered();

    let range = range_arg(&args[0], 0)?;
    let criteria = args[1].value(ctx)?;
    let values = match args.get(2).filter(|a| !a.is_missing()) {
        Some(arg) => Some(AnchoredRange {
            inner: range_arg(arg, 2)?,
            dims: range.dimensions(),
        }),
        None => None,
    };
    let value_range: Option<&dyn Range> = match &values {
        Some(anchored) => Some(anchored),
        None if func == AggregateFn::Count => None,
        None => Some(range),
    };
    aggregate_ifs(func, value_range, &[(range, criteria)])
}

/// Shared body of the *IFS family. `has_value_range` is false for COUNTIFS.
fn eval_multi_criteria(
    func: AggregateFn,
    has_value_range: bool,
    args: &[ArgumentHandle<'_>],
    ctx: &dyn FunctionContext,
) -> Result<LiteralValue, ExcelError> {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("multi_criteria", ?func, args = args.len()).entered();

    let (value_range, start) = if has_value_range {
        (Some(range_arg(&args[0], 0)?), 1)
    } else {
        (None, 0)
    };
    let criteria = collect_criteria(args, start, ctx)?;
    aggregate_ifs(func, value_range, &criteria)
}

static SINGLE_CRITERIA_SCHEMA: Lazy<Vec<ArgSchema>> = Lazy::new(|| {
    vec![
        ArgSchema::range(),
        ArgSchema::any(),
        ArgSchema::range().optional(),
    ]
});

/* value_range, then repeating (criteria_range, criteria) */
static VALUE_IFS_SCHEMA: Lazy<Vec<ArgSchema>> = Lazy::new(|| {
    vec![
        ArgSchema::range(),
        ArgSchema::range(),
        ArgSchema::any().repeating(2),
    ]
});

static COUNTIFS_SCHEMA: Lazy<Vec<ArgSchema>> =
    Lazy::new(|| vec![ArgSchema::range(), ArgSchema::any().repeating(2)]);

fn criteria_caps() -> FnCaps {
    FnCaps::PURE | FnCaps::REDUCTION | FnCaps::STREAM_OK
}

/* ─────────────────────────── SUMIF() ──────────────────────────── */
#[derive(Debug)]
pub struct SumIfFn;
impl Function for SumIfFn {
    fn caps(&self) -> FnCaps {
        criteria_caps()
    }
    fn name(&self) -> &'static str {
        "SUMIF"
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &SINGLE_CRITERIA_SCHEMA
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_single_criteria(AggregateFn::Sum, args, ctx)
    }
}

/* ─────────────────────────── COUNTIF() ──────────────────────────── */
#[derive(Debug)]
pub struct CountIfFn;
impl Function for CountIfFn {
    fn caps(&self) -> FnCaps {
        criteria_caps()
    }
    fn name(&self) -> &'static str {
        "COUNTIF"
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &SINGLE_CRITERIA_SCHEMA[..2]
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_single_criteria(AggregateFn::Count, args, ctx)
    }
}

/* ─────────────────────────── AVERAGEIF() ──────────────────────────── */
#[derive(Debug)]
pub struct AverageIfFn;
impl Function for AverageIfFn {
    fn caps(&self) -> FnCaps {
        criteria_caps()
    }
    fn name(&self) -> &'static str {
        "AVERAGEIF"
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &SINGLE_CRITERIA_SCHEMA
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_single_criteria(AggregateFn::Average, args, ctx)
    }
}

/* ─────────────────────────── SUMIFS() ──────────────────────────── */
#[derive(Debug)]
pub struct SumIfsFn;
impl Function for SumIfsFn {
    fn caps(&self) -> FnCaps {
        criteria_caps()
    }
    fn name(&self) -> &'static str {
        "SUMIFS"
    }
    fn variadic(&self) -> bool {
        true
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &VALUE_IFS_SCHEMA
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_multi_criteria(AggregateFn::Sum, true, args, ctx)
    }
}

/* ─────────────────────────── COUNTIFS() ──────────────────────────── */
#[derive(Debug)]
pub struct CountIfsFn;
impl Function for CountIfsFn {
    fn caps(&self) -> FnCaps {
        criteria_caps()
    }
    fn name(&self) -> &'static str {
        "COUNTIFS"
    }
    fn variadic(&self) -> bool {
        true
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &COUNTIFS_SCHEMA
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_multi_criteria(AggregateFn::Count, false, args, ctx)
    }
}

/* ─────────────────────────── AVERAGEIFS() ──────────────────────────── */
#[derive(Debug)]
pub struct AverageIfsFn;
impl Function for AverageIfsFn {
    fn caps(&self) -> FnCaps {
        criteria_caps()
    }
    fn name(&self) -> &'static str {
        "AVERAGEIFS"
    }
    fn variadic(&self) -> bool {
        true
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &VALUE_IFS_SCHEMA
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_multi_criteria(AggregateFn::Average, true, args, ctx)
    }
}

/* ─────────────────────────── MAXIFS() / MINIFS() ──────────────────────────── */
#[derive(Debug)]
pub struct MaxIfsFn;
impl Function for MaxIfsFn {
    fn caps(&self) -> FnCaps {
        criteria_caps()
    }
    fn name(&self) -> &'static str {
        "MAXIFS"
    }
    fn variadic(&self) -> bool {
        true
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &VALUE_IFS_SCHEMA
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_multi_criteria(AggregateFn::Max, true, args, ctx)
    }
}

#[derive(Debug)]
pub struct MinIfsFn;
impl Function for MinIfsFn {
    fn caps(&self) -> FnCaps {
        criteria_caps()
    }
    fn name(&self) -> &'static str {
        "MINIFS"
    }
    fn variadic(&self) -> bool {
        true
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &VALUE_IFS_SCHEMA
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        eval_multi_criteria(AggregateFn::Min, true, args, ctx)
    }
}

pub fn register_builtins() {
    use std::sync::Arc;
    crate::function_registry::register(Arc::new(SumIfFn));
    crate::function_registry::register(Arc::new(CountIfFn));
    crate::function_registry::register(Arc::new(AverageIfFn));
    crate::function_registry::register(Arc::new(SumIfsFn));
    crate::function_registry::register(Arc::new(CountIfsFn));
    crate::function_registry::register(Arc::new(AverageIfsFn));
    crate::function_registry::register(Arc::new(MaxIfsFn));
    crate::function_registry::register(Arc::new(MinIfsFn));
}

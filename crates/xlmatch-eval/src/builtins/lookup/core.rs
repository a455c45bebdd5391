//! Classic lookup essentials: MATCH, VLOOKUP, HLOOKUP
//!
//! - VLOOKUP/HLOOKUP search the first column/row of the table. Approximate
//!   mode (the default) bisects and tolerates unsorted or mixed-type data the
//!   legacy way; exact mode scans forward and honours wildcards.
//! - The column/row index is resolved after the search, so a bad index only
//!   surfaces once the lookup value has been found.
//! - MATCH returns a 1-based position. Its approximate types scan linearly.

use once_cell::sync::Lazy;
use xlmatch_common::{ExcelError, LiteralValue};

use crate::args::{
    ArgSchema, resolve_lookup_vector, resolve_match_type, resolve_range_lookup_arg,
    resolve_row_or_col_index_arg, resolve_single_value, resolve_table_array_arg,
};
use crate::function::{FnCaps, Function};
use crate::lookup::{lookup_first_index_of_value, match_index_of_value};
use crate::traits::{ArgumentHandle, FunctionContext};
use crate::vector::{ColumnVector, RowVector, ValueVector};

/// value, table, index, [range_lookup]
static TABLE_LOOKUP_SCHEMA: Lazy<Vec<ArgSchema>> = Lazy::new(|| {
    vec![
        ArgSchema::any(),
        ArgSchema::any(),
        ArgSchema::number_lenient_scalar(),
        ArgSchema::any().optional(),
    ]
});

#[derive(Debug)]
pub struct MatchFn;
impl Function for MatchFn {
    fn name(&self) -> &'static str {
        "MATCH"
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
                ArgSchema::any(),
                // match_type (default 1)
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
        let vector = resolve_lookup_vector(&args[1], ctx)?;
        let match_type = resolve_match_type(args.get(2), ctx)?;
        let idx = match_index_of_value(&lookup_value, &vector, match_type)?;
        Ok(LiteralValue::Number((idx + 1) as f64))
    }
}

#[derive(Debug)]
pub struct VLookupFn;
impl Function for VLookupFn {
    fn name(&self) -> &'static str {
        "VLOOKUP"
    }
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::LOOKUP
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &TABLE_LOOKUP_SCHEMA
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let lookup_value = resolve_single_value(&args[0], ctx)?;
        let table = resolve_table_array_arg(&args[1])?;
        let is_range_lookup = resolve_range_lookup_arg(args.get(3), ctx)?;
        let row = lookup_first_index_of_value(
            &lookup_value,
            &ColumnVector::new(table, 0)?,
            is_range_lookup,
        )?;
        let col = resolve_row_or_col_index_arg(&args[2], ctx)?;
        Ok(ColumnVector::new(table, col)?.item(row))
    }
}

#[derive(Debug)]
pub struct HLookupFn;
impl Function for HLookupFn {
    fn name(&self) -> &'static str {
        "HLOOKUP"
    }
    fn caps(&self) -> FnCaps {
        FnCaps::PURE | FnCaps::LOOKUP
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &TABLE_LOOKUP_SCHEMA
    }
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let lookup_value = resolve_single_value(&args[0], ctx)?;
        let table = resolve_table_array_arg(&args[1])?;
        let is_range_lookup = resolve_range_lookup_arg(args.get(3), ctx)?;
        let col = lookup_first_index_of_value(
            &lookup_value,
            &RowVector::new(table, 0)?,
            is_range_lookup,
        )?;
        let row = resolve_row_or_col_index_arg(&args[2], ctx)?;
        Ok(RowVector::new(table, row)?.item(col))
    }
}

//! xlmatch-eval/src/function.rs
// The `Function` trait and its capability flags.

use xlmatch_common::{ExcelError, LiteralValue};

use crate::args::{ArgSchema, validate_args};
use crate::traits::{ArgumentHandle, FunctionContext};

bitflags::bitflags! {
    /// Describes the capabilities and properties of a function.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct FnCaps: u16 {
        /// Same output for the same input, no side effects.
        const PURE          = 0b0000_0000_0001;
        /// Reduces one or more ranges to a single value (`SUMIFS`).
        const REDUCTION     = 0b0000_0000_0100;
        /// Performs a lookup or search (`VLOOKUP`).
        const LOOKUP        = 0b0000_0010_0000;
        /// Reads its ranges cell by cell without materialising them.
        const STREAM_OK     = 0b0010_0000_0000;
    }
}

/// Object-safe trait for spreadsheet functions.
///
/// Implementations are stateless singletons: every call gets its own
/// arguments and context and keeps nothing afterwards.
pub trait Function: Send + Sync + 'static {
    /// Capability flags for this function
    fn caps(&self) -> FnCaps {
        FnCaps::PURE
    }

    fn name(&self) -> &'static str;

    /// Defaults to the number of required slots in [`Function::arg_schema`].
    fn min_args(&self) -> usize {
        self.arg_schema().iter().filter(|s| s.required).count()
    }
    fn variadic(&self) -> bool {
        false
    }
    fn arg_schema(&self) -> &'static [ArgSchema] {
        &[]
    }

    /// The scalar evaluation path, the only one required.
    fn eval_scalar<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError>;

    /// Check arity and argument shapes, then evaluate.
    fn dispatch<'a>(
        &self,
        args: &[ArgumentHandle<'a>],
        ctx: &dyn FunctionContext,
    ) -> Result<LiteralValue, ExcelError> {
        let schema = self.arg_schema();
        let too_many = !self.variadic() && !schema.is_empty() && args.len() > schema.len();
        if args.len() < self.min_args() || too_many {
            return Err(ExcelError::new_value().with_message(format!(
                "{} got {} arguments",
                self.name(),
                args.len()
            )));
        }
        validate_args(args, schema)?;

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!("dispatch", name = self.name(), args = args.len()).entered();

        self.eval_scalar(args, ctx)
    }
}

//! Meta crate that re-exports the xlmatch building blocks. Depend on this
//! crate and pick layers with feature flags, or reach for the underlying
//! crates directly.

#[cfg(feature = "common")]
pub use xlmatch_common as common;

#[cfg(feature = "eval")]
pub use xlmatch_eval as eval;

#[cfg(feature = "common")]
pub use xlmatch_common::{ExcelError, ExcelErrorKind, LiteralValue};

#[cfg(feature = "eval")]
pub use xlmatch_eval::{
    ArgumentHandle, CellContext, Function, FunctionContext, InMemoryRange, InMemoryVolume,
    Range, VolumeRange, builtins::load_builtins, function_registry,
};

/// Fetch a builtin by name, registering the builtins on first use.
#[cfg(feature = "eval")]
pub fn function(name: &str) -> Option<std::sync::Arc<dyn Function>> {
    load_builtins();
    function_registry::get(name)
}

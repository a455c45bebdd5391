//! Lookup and criteria engine for spreadsheet formulas.
//!
//! The host evaluator resolves references into [`traits::Range`] views and
//! hands them to the builtins through [`traits::ArgumentHandle`]s. Call
//! [`builtins::load_builtins`] once, then fetch functions by name from
//! [`function_registry`].

pub mod aggregate;
pub mod args;
pub mod coercion;
pub mod compare;
pub mod criteria;
pub mod function;
pub mod function_registry;
pub mod lookup;
pub mod traits;
pub mod vector;
pub mod wildcard;

pub mod builtins;

pub use aggregate::{AggregateFn, aggregate, aggregate_ifs};
pub use compare::{CompareResult, LookupComparer, compare};
pub use criteria::{CriteriaPredicate, parse_criteria};
pub use function::{FnCaps, Function};
pub use lookup::{
    MatchMode, MatchType, SearchMode, lookup_first_index_of_value, lookup_index,
    match_index_of_value,
};
pub use traits::{
    ArgumentHandle, CellContext, FunctionContext, InMemoryRange, InMemoryVolume, Range,
    VolumeRange,
};
pub use vector::{ColumnVector, LineVector, RowVector, SheetVector, ValueVector, create_vector};

//! xlmatch-eval – core traits (object-safe)
//!
//! The engine never owns cell storage: it reads through [`Range`] (2-D) and
//! [`VolumeRange`] (the same rectangle across consecutive sheets), and
//! receives function arguments as [`ArgumentHandle`]s that the host has
//! already resolved.

use std::fmt::Debug;

use xlmatch_common::{ArgKind, ExcelError, LiteralValue};

use crate::coercion;

/* ───────────────────────────── Range ───────────────────────────── */

/// Read-only rectangular view over resolved cell values.
///
/// Coordinates are zero-based and relative to the top-left cell.
pub trait Range: Debug + Send + Sync {
    /// `(rows, cols)`
    fn dimensions(&self) -> (usize, usize);

    /// Value at a relative coordinate. Out-of-bounds reads yield `Empty`.
    fn get(&self, row: usize, col: usize) -> LiteralValue;

    fn height(&self) -> usize {
        self.dimensions().0
    }

    fn width(&self) -> usize {
        self.dimensions().1
    }

    fn is_row(&self) -> bool {
        self.height() == 1
    }

    fn is_column(&self) -> bool {
        self.width() == 1
    }

    /// Absolute sheet coordinate of the top-left cell. Only implicit
    /// intersection looks at this.
    fn origin(&self) -> (u32, u32) {
        (0, 0)
    }

    /// Row-major walk over every cell.
    fn iter_cells<'a>(&'a self) -> Box<dyn Iterator<Item = LiteralValue> + 'a> {
        let (rows, cols) = self.dimensions();
        Box::new((0..rows).flat_map(move |r| (0..cols).map(move |c| self.get(r, c))))
    }
}

/* blanket dyn passthrough */
impl Range for Box<dyn Range> {
    fn dimensions(&self) -> (usize, usize) {
        (**self).dimensions()
    }
    fn get(&self, r: usize, c: usize) -> LiteralValue {
        (**self).get(r, c)
    }
    fn origin(&self) -> (u32, u32) {
        (**self).origin()
    }
}

/// The same rectangle read across a run of consecutive sheets
/// (`Sheet1:Sheet3!B2`).
pub trait VolumeRange: Debug + Send + Sync {
    fn first_sheet_index(&self) -> usize;
    fn last_sheet_index(&self) -> usize;
    /// `(rows, cols)` of the per-sheet rectangle.
    fn dimensions(&self) -> (usize, usize);
    /// `sheet` is an absolute sheet index in
    /// `first_sheet_index()..=last_sheet_index()`.
    fn get(&self, sheet: usize, row: usize, col: usize) -> LiteralValue;

    fn sheet_count(&self) -> usize {
        self.last_sheet_index() + 1 - self.first_sheet_index()
    }
}

/* simple Vec-backed range */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryRange {
    data: Vec<Vec<LiteralValue>>,
    origin: (u32, u32),
}

impl InMemoryRange {
    pub fn new(d: Vec<Vec<LiteralValue>>) -> Self {
        Self {
            data: d,
            origin: (0, 0),
        }
    }

    /// Single row.
    pub fn row(values: Vec<LiteralValue>) -> Self {
        Self::new(vec![values])
    }

    /// Single column.
    pub fn column(values: Vec<LiteralValue>) -> Self {
        Self::new(values.into_iter().map(|v| vec![v]).collect())
    }

    /// Place the range on the sheet (absolute row/col of the top-left cell).
    pub fn at(mut self, row: u32, col: u32) -> Self {
        self.origin = (row, col);
        self
    }
}

impl Range for InMemoryRange {
    fn dimensions(&self) -> (usize, usize) {
        (self.data.len(), self.data.first().map_or(0, |r| r.len()))
    }
    fn get(&self, r: usize, c: usize) -> LiteralValue {
        self.data
            .get(r)
            .and_then(|row| row.get(c))
            .cloned()
            .unwrap_or(LiteralValue::Empty)
    }
    fn origin(&self) -> (u32, u32) {
        self.origin
    }
}

/* Vec-backed 3-D range: one InMemoryRange per sheet */
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryVolume {
    first_sheet: usize,
    sheets: Vec<InMemoryRange>,
}

impl InMemoryVolume {
    /// `sheets[0]` sits at absolute sheet index `first_sheet`.
    pub fn new(first_sheet: usize, sheets: Vec<InMemoryRange>) -> Self {
        Self {
            first_sheet,
            sheets,
        }
    }
}

impl VolumeRange for InMemoryVolume {
    fn first_sheet_index(&self) -> usize {
        self.first_sheet
    }
    fn last_sheet_index(&self) -> usize {
        (self.first_sheet + self.sheets.len()).saturating_sub(1)
    }
    fn dimensions(&self) -> (usize, usize) {
        self.sheets.first().map_or((0, 0), |s| s.dimensions())
    }
    fn get(&self, sheet: usize, row: usize, col: usize) -> LiteralValue {
        sheet
            .checked_sub(self.first_sheet)
            .and_then(|i| self.sheets.get(i))
            .map_or(LiteralValue::Empty, |s| s.get(row, col))
    }
    fn sheet_count(&self) -> usize {
        self.sheets.len()
    }
}

/* ───────────────────────── Evaluation context ───────────────────────── */

/// What a function may ask of the host while it runs: only the coordinate
/// of the formula cell being evaluated.
pub trait FunctionContext: Send + Sync {
    /// Absolute `(row, col)` of the evaluating cell.
    fn current_cell(&self) -> (u32, u32);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellContext {
    pub row: u32,
    pub col: u32,
}

impl CellContext {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

impl FunctionContext for CellContext {
    fn current_cell(&self) -> (u32, u32) {
        (self.row, self.col)
    }
}

/* ────────────────────── ArgumentHandle ───────────────────── */

/// A function argument as handed over by the evaluator.
#[derive(Debug, Clone)]
pub enum ArgumentHandle<'a> {
    /// Already-evaluated scalar (including error values and `Missing`).
    Value(LiteralValue),
    /// Area reference or array constant.
    Range(&'a dyn Range),
    /// Single-cell reference spanning several sheets.
    SheetRef {
        volume: &'a dyn VolumeRange,
        row: usize,
        col: usize,
    },
}

impl<'a> ArgumentHandle<'a> {
    pub fn missing() -> Self {
        ArgumentHandle::Value(LiteralValue::Missing)
    }

    /// Collapse the argument to one value: ranges go through implicit
    /// intersection with the evaluating cell, 3-D references read their
    /// first sheet. Error values come back as `Ok(LiteralValue::Error)`.
    pub fn value(&self, ctx: &dyn FunctionContext) -> Result<LiteralValue, ExcelError> {
        match self {
            ArgumentHandle::Value(v) => Ok(v.clone()),
            ArgumentHandle::Range(r) => {
                let (row, col) = ctx.current_cell();
                coercion::implicit_intersection(*r, row, col)
            }
            ArgumentHandle::SheetRef { volume, row, col } => {
                Ok(volume.get(volume.first_sheet_index(), *row, *col))
            }
        }
    }

    pub fn range(&self) -> Option<&'a dyn Range> {
        match self {
            ArgumentHandle::Range(r) => Some(*r),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ArgumentHandle::Value(LiteralValue::Missing))
    }

    /// Whether the argument can fill a slot of the given kind. Only `Range`
    /// slots are structural; scalar kinds are coerced later.
    pub fn matches_kind(&self, k: ArgKind) -> bool {
        match k {
            ArgKind::Range => !matches!(self, ArgumentHandle::Value(_)),
            ArgKind::Any | ArgKind::Number | ArgKind::Text | ArgKind::Logical => true,
        }
    }
}

impl From<LiteralValue> for ArgumentHandle<'_> {
    fn from(v: LiteralValue) -> Self {
        ArgumentHandle::Value(v)
    }
}

impl<'a> From<&'a InMemoryRange> for ArgumentHandle<'a> {
    fn from(r: &'a InMemoryRange) -> Self {
        ArgumentHandle::Range(r)
    }
}

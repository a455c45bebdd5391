//! One-dimensional views over ranges.
//!
//! Lookups never touch a 2-D range directly: they search a [`ValueVector`]
//! taken from one row, one column, or one cell across several sheets.

use xlmatch_common::{ExcelError, LiteralValue};

use crate::traits::{Range, VolumeRange};

/// Fixed-length, zero-based sequence of cell values.
pub trait ValueVector {
    /// Value at `index`; callers stay within `0..size()`.
    fn item(&self, index: usize) -> LiteralValue;
    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Every index, front to back or back to front.
    fn indices(&self, reverse: bool) -> Indices {
        Indices::new(self.size(), reverse)
    }
}

/// Restartable index walk in either direction. Cloning gives a fresh cursor
/// at the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indices {
    front: usize,
    back: usize,
    reverse: bool,
}

impl Indices {
    pub fn new(size: usize, reverse: bool) -> Self {
        Self {
            front: 0,
            back: size,
            reverse,
        }
    }
}

impl Iterator for Indices {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.front >= self.back {
            return None;
        }
        if self.reverse {
            self.back -= 1;
            Some(self.back)
        } else {
            self.front += 1;
            Some(self.front - 1)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Indices {}

fn out_of_bounds(what: &str, index: usize, len: usize) -> ExcelError {
    let allowed = if len == 0 {
        "none".to_string()
    } else {
        format!("0..{}", len - 1)
    };
    ExcelError::new_ref().with_message(format!(
        "{what} index ({index}) is outside the allowed range ({allowed})"
    ))
}

/// One row of a range.
#[derive(Debug, Clone, Copy)]
pub struct RowVector<'a> {
    range: &'a dyn Range,
    row: usize,
}

impl<'a> RowVector<'a> {
    pub fn new(range: &'a dyn Range, row: usize) -> Result<Self, ExcelError> {
        if row >= range.height() {
            return Err(out_of_bounds("row", row, range.height()));
        }
        Ok(Self { range, row })
    }
}

impl ValueVector for RowVector<'_> {
    fn item(&self, index: usize) -> LiteralValue {
        self.range.get(self.row, index)
    }
    fn size(&self) -> usize {
        self.range.width()
    }
}

/// One column of a range.
#[derive(Debug, Clone, Copy)]
pub struct ColumnVector<'a> {
    range: &'a dyn Range,
    col: usize,
}

impl<'a> ColumnVector<'a> {
    pub fn new(range: &'a dyn Range, col: usize) -> Result<Self, ExcelError> {
        if col >= range.width() {
            return Err(out_of_bounds("column", col, range.width()));
        }
        Ok(Self { range, col })
    }
}

impl ValueVector for ColumnVector<'_> {
    fn item(&self, index: usize) -> LiteralValue {
        self.range.get(index, self.col)
    }
    fn size(&self) -> usize {
        self.range.height()
    }
}

/// The same cell read on each sheet of a 3-D reference. Item 0 is the
/// first sheet.
#[derive(Debug, Clone, Copy)]
pub struct SheetVector<'a> {
    volume: &'a dyn VolumeRange,
    row: usize,
    col: usize,
}

impl<'a> SheetVector<'a> {
    pub fn new(volume: &'a dyn VolumeRange, row: usize, col: usize) -> Result<Self, ExcelError> {
        let (height, width) = volume.dimensions();
        if row >= height {
            return Err(out_of_bounds("row", row, height));
        }
        if col >= width {
            return Err(out_of_bounds("column", col, width));
        }
        Ok(Self { volume, row, col })
    }
}

impl ValueVector for SheetVector<'_> {
    fn item(&self, index: usize) -> LiteralValue {
        self.volume
            .get(self.volume.first_sheet_index() + index, self.row, self.col)
    }
    fn size(&self) -> usize {
        self.volume.sheet_count()
    }
}

/* array constants and test fixtures */
impl ValueVector for [LiteralValue] {
    fn item(&self, index: usize) -> LiteralValue {
        self.get(index).cloned().unwrap_or(LiteralValue::Empty)
    }
    fn size(&self) -> usize {
        self.len()
    }
}

impl ValueVector for Vec<LiteralValue> {
    fn item(&self, index: usize) -> LiteralValue {
        self.as_slice().item(index)
    }
    fn size(&self) -> usize {
        self.len()
    }
}

/// Any vector a function argument can turn into.
#[derive(Debug, Clone)]
pub enum LineVector<'a> {
    Row(RowVector<'a>),
    Column(ColumnVector<'a>),
    Sheet(SheetVector<'a>),
    /// A scalar searched as a one-element vector.
    Single(LiteralValue),
}

impl ValueVector for LineVector<'_> {
    fn item(&self, index: usize) -> LiteralValue {
        match self {
            LineVector::Row(v) => v.item(index),
            LineVector::Column(v) => v.item(index),
            LineVector::Sheet(v) => v.item(index),
            LineVector::Single(v) if index == 0 => v.clone(),
            LineVector::Single(_) => LiteralValue::Empty,
        }
    }
    fn size(&self) -> usize {
        match self {
            LineVector::Row(v) => v.size(),
            LineVector::Column(v) => v.size(),
            LineVector::Sheet(v) => v.size(),
            LineVector::Single(_) => 1,
        }
    }
}

/// View a single-column or single-row range as a vector; `None` for a
/// 2-D block or an empty range. A 1x1 range reads as a column.
pub fn create_vector(range: &dyn Range) -> Option<LineVector<'_>> {
    let (height, width) = range.dimensions();
    if height == 0 || width == 0 {
        return None;
    }
    if width == 1 {
        return ColumnVector::new(range, 0).ok().map(LineVector::Column);
    }
    if height == 1 {
        return RowVector::new(range, 0).ok().map(LineVector::Row);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{InMemoryRange, InMemoryVolume};
    use xlmatch_common::ExcelErrorKind;

    fn n(v: f64) -> LiteralValue {
        LiteralValue::Number(v)
    }

    fn grid() -> InMemoryRange {
        InMemoryRange::new(vec![
            vec![n(1.0), n(2.0), n(3.0)],
            vec![n(4.0), n(5.0), n(6.0)],
        ])
    }

    #[test]
    fn row_and_column_views() {
        let g = grid();
        let row = RowVector::new(&g, 1).unwrap();
        assert_eq!(row.size(), 3);
        assert_eq!(row.item(2), n(6.0));
        let col = ColumnVector::new(&g, 1).unwrap();
        assert_eq!(col.size(), 2);
        assert_eq!(col.item(1), n(5.0));
    }

    #[test]
    fn out_of_range_index_is_ref_error() {
        let g = grid();
        let err = RowVector::new(&g, 2).unwrap_err();
        assert_eq!(err.kind, ExcelErrorKind::Ref);
        assert_eq!(
            err.message.as_deref(),
            Some("row index (2) is outside the allowed range (0..1)")
        );
        assert_eq!(ColumnVector::new(&g, 3).unwrap_err().kind, ExcelErrorKind::Ref);
    }

    #[test]
    fn sheet_vector_walks_sheets() {
        let vol = InMemoryVolume::new(
            4,
            vec![
                InMemoryRange::new(vec![vec![n(1.0), n(10.0)]]),
                InMemoryRange::new(vec![vec![n(2.0), n(20.0)]]),
                InMemoryRange::new(vec![vec![n(3.0), n(30.0)]]),
            ],
        );
        let v = SheetVector::new(&vol, 0, 1).unwrap();
        assert_eq!(v.size(), 3);
        assert_eq!(v.item(0), n(10.0));
        assert_eq!(v.item(2), n(30.0));
        assert!(SheetVector::new(&vol, 1, 0).is_err());
    }

    #[test]
    fn indices_both_directions() {
        let v = vec![n(1.0), n(2.0), n(3.0)];
        assert_eq!(v.indices(false).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(v.indices(true).collect::<Vec<_>>(), vec![2, 1, 0]);
        let mut it = v.indices(true);
        it.next();
        let resumed = it.clone();
        assert_eq!(resumed.len(), 2);
        assert_eq!(Vec::<LiteralValue>::new().indices(true).next(), None);
    }

    #[test]
    fn create_vector_orientation() {
        let col = InMemoryRange::column(vec![n(1.0), n(2.0)]);
        assert!(matches!(create_vector(&col), Some(LineVector::Column(_))));
        let row = InMemoryRange::row(vec![n(1.0), n(2.0)]);
        assert!(matches!(create_vector(&row), Some(LineVector::Row(_))));
        let one = InMemoryRange::new(vec![vec![n(1.0)]]);
        assert!(matches!(create_vector(&one), Some(LineVector::Column(_))));
        assert!(create_vector(&grid()).is_none());
        assert!(create_vector(&InMemoryRange::default()).is_none());
    }
}

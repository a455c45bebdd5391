//! Multi-criteria aggregation behind SUMIFS, COUNTIFS, AVERAGEIFS, MAXIFS
//! and MINIFS (and their single-criterion forms).

use xlmatch_common::{ExcelError, LiteralValue};

use crate::coercion::sanitize_numeric;
use crate::criteria::{CriteriaPredicate, parse_criteria};
use crate::traits::Range;

/// Which reduction to run over the matching cells. Holds no state; each
/// call gets a fresh [`Accumulator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateFn {
    Sum,
    Count,
    Average,
    Min,
    Max,
}

impl AggregateFn {
    pub fn accumulator(self) -> Accumulator {
        match self {
            AggregateFn::Sum => Accumulator::Sum(0.0),
            AggregateFn::Count => Accumulator::Count(0),
            AggregateFn::Average => Accumulator::Average { sum: 0.0, count: 0 },
            AggregateFn::Min => Accumulator::Min(None),
            AggregateFn::Max => Accumulator::Max(None),
        }
    }
}

/// Per-call running state.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    Sum(f64),
    Count(u64),
    Average { sum: f64, count: u64 },
    Min(Option<f64>),
    Max(Option<f64>),
}

impl Accumulator {
    /// Feed one matching value. Sum and Average only take numbers; Min and
    /// Max read anything else as `0`.
    pub fn add_value(&mut self, value: &LiteralValue) {
        let number = value.as_number();
        match self {
            Accumulator::Sum(total) => *total += number.unwrap_or(0.0),
            Accumulator::Count(count) => *count += 1,
            Accumulator::Average { sum, count } => {
                if let Some(n) = number {
                    *sum += n;
                    *count += 1;
                }
            }
            Accumulator::Min(current) => {
                let n = number.unwrap_or(0.0);
                *current = Some(current.map_or(n, |c| c.min(n)));
            }
            Accumulator::Max(current) => {
                let n = number.unwrap_or(0.0);
                *current = Some(current.map_or(n, |c| c.max(n)));
            }
        }
    }

    pub fn result(&self) -> Result<LiteralValue, ExcelError> {
        let n = match *self {
            Accumulator::Sum(total) => total,
            Accumulator::Count(count) => count as f64,
            Accumulator::Average { sum, count } => {
                if count == 0 {
                    return Err(ExcelError::new_div());
                }
                sum / count as f64
            }
            Accumulator::Min(current) | Accumulator::Max(current) => current.unwrap_or(0.0),
        };
        Ok(LiteralValue::Number(sanitize_numeric(n)?))
    }
}

fn validate_shapes(
    value_range: Option<&dyn Range>,
    criteria_ranges: &[&dyn Range],
    predicates: &[CriteriaPredicate],
) -> Result<(usize, usize), ExcelError> {
    let Some(first) = criteria_ranges.first() else {
        return Err(ExcelError::new_value().with_message("at least one criteria range is required"));
    };
    if criteria_ranges.len() != predicates.len() {
        return Err(ExcelError::new_value().with_message(format!(
            "{} criteria ranges but {} criteria",
            criteria_ranges.len(),
            predicates.len()
        )));
    }
    let dims = first.dimensions();
    let mismatched = criteria_ranges
        .iter()
        .map(|r| r.dimensions())
        .chain(value_range.map(|r| r.dimensions()))
        .find(|d| *d != dims);
    if let Some((rows, cols)) = mismatched {
        return Err(ExcelError::new_value().with_message(format!(
            "range is {rows}x{cols}, expected {}x{}",
            dims.0, dims.1
        )));
    }
    Ok(dims)
}

/// Run `func` over every coordinate where all predicates hold.
///
/// All ranges (the value range too, when given) must share one shape, else
/// `#VALUE!` before anything is read. Without a value range each match
/// counts as `1`. An error cell in the value range at a matching
/// coordinate aborts with that error.
pub fn aggregate(
    func: AggregateFn,
    value_range: Option<&dyn Range>,
    criteria_ranges: &[&dyn Range],
    predicates: &[CriteriaPredicate],
) -> Result<LiteralValue, ExcelError> {
    #[cfg(feature = "tracing")]
    let _span = tracing::info_span!("aggregate", ?func).entered();

    let (rows, cols) = validate_shapes(value_range, criteria_ranges, predicates)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(rows, cols, criteria = predicates.len(), "aggregate_dims");

    let mut acc = func.accumulator();
    for row in 0..rows {
        for col in 0..cols {
            let all_match = criteria_ranges
                .iter()
                .zip(predicates)
                .all(|(range, pred)| pred.matches(&range.get(row, col)));
            if !all_match {
                continue;
            }
            match value_range {
                Some(values) => match values.get(row, col) {
                    LiteralValue::Error(e) => return Err(e),
                    v => acc.add_value(&v),
                },
                None => acc.add_value(&LiteralValue::Number(1.0)),
            }
        }
    }
    acc.result()
}

/// Compile each `(range, criteria)` pair and [`aggregate`]. A criteria that
/// is an error value aborts with that error.
pub fn aggregate_ifs(
    func: AggregateFn,
    value_range: Option<&dyn Range>,
    criteria: &[(&dyn Range, LiteralValue)],
) -> Result<LiteralValue, ExcelError> {
    let predicates = criteria
        .iter()
        .map(|(_, c)| parse_criteria(c))
        .collect::<Result<Vec<_>, _>>()?;
    let ranges: Vec<&dyn Range> = criteria.iter().map(|(r, _)| *r).collect();
    aggregate(func, value_range, &ranges, &predicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::InMemoryRange;
    use xlmatch_common::ExcelErrorKind;

    fn n(v: f64) -> LiteralValue {
        LiteralValue::Number(v)
    }
    fn t(s: &str) -> LiteralValue {
        LiteralValue::Text(s.into())
    }
    fn crit(s: &str) -> CriteriaPredicate {
        parse_criteria(&t(s)).unwrap()
    }

    #[test]
    fn mismatched_shapes_are_value_errors() {
        let a = InMemoryRange::new(vec![vec![n(1.0); 3]; 2]);
        let b = InMemoryRange::new(vec![vec![n(1.0); 2]; 3]);
        let err = aggregate(
            AggregateFn::Sum,
            None,
            &[&a, &b],
            &[crit(">0"), crit(">0")],
        )
        .unwrap_err();
        assert_eq!(err.kind, ExcelErrorKind::Value);

        let values = InMemoryRange::column(vec![n(1.0), n(2.0)]);
        let col = InMemoryRange::column(vec![n(1.0), n(2.0), n(3.0)]);
        let err = aggregate(AggregateFn::Sum, Some(&values), &[&col], &[crit(">0")]).unwrap_err();
        assert_eq!(err.kind, ExcelErrorKind::Value);
    }

    #[test]
    fn shape_check_precedes_value_errors() {
        let values = InMemoryRange::column(vec![LiteralValue::Error(ExcelError::new_na())]);
        let col = InMemoryRange::column(vec![n(1.0), n(2.0)]);
        let err = aggregate(AggregateFn::Sum, Some(&values), &[&col], &[crit(">0")]).unwrap_err();
        assert_eq!(err.kind, ExcelErrorKind::Value);
    }

    #[test]
    fn criteria_are_anded() {
        let a = InMemoryRange::row(vec![n(1.0), n(2.0), n(3.0)]);
        let b = InMemoryRange::row(vec![t("x"), t("y"), t("x")]);
        let preds = [parse_criteria(&n(2.0)).unwrap(), crit("x")];
        let sum = aggregate(AggregateFn::Sum, Some(&a), &[&a, &b], &preds).unwrap();
        let count = aggregate(AggregateFn::Count, None, &[&a, &b], &preds).unwrap();
        assert_eq!(sum, n(0.0));
        assert_eq!(count, n(0.0));

        let preds = [crit(">1"), crit("x")];
        assert_eq!(
            aggregate(AggregateFn::Sum, Some(&a), &[&a, &b], &preds).unwrap(),
            n(3.0)
        );
    }

    #[test]
    fn accumulators() {
        let values = InMemoryRange::column(vec![n(4.0), t("skip"), n(-2.0), LiteralValue::Empty]);
        let keys = InMemoryRange::column(vec![t("k"), t("k"), t("k"), t("k")]);
        let run = |f| aggregate_ifs(f, Some(&values), &[(&keys, t("k"))]).unwrap();
        assert_eq!(run(AggregateFn::Sum), n(2.0));
        assert_eq!(run(AggregateFn::Count), n(4.0));
        assert_eq!(run(AggregateFn::Average), n(1.0));
        assert_eq!(run(AggregateFn::Min), n(-2.0));
        assert_eq!(run(AggregateFn::Max), n(4.0));
    }

    #[test]
    fn no_matches() {
        let col = InMemoryRange::column(vec![n(1.0), n(2.0)]);
        let run = |f| aggregate_ifs(f, Some(&col), &[(&col, t(">5"))]);
        assert_eq!(run(AggregateFn::Sum).unwrap(), n(0.0));
        assert_eq!(run(AggregateFn::Min).unwrap(), n(0.0));
        assert_eq!(run(AggregateFn::Max).unwrap(), n(0.0));
        assert_eq!(run(AggregateFn::Average).unwrap_err().kind, ExcelErrorKind::Div);
    }

    #[test]
    fn min_max_read_text_as_zero() {
        let values = InMemoryRange::column(vec![n(5.0), t("x")]);
        let keys = InMemoryRange::column(vec![n(1.0), n(1.0)]);
        let run = |f| aggregate_ifs(f, Some(&values), &[(&keys, n(1.0))]).unwrap();
        assert_eq!(run(AggregateFn::Min), n(0.0));
        assert_eq!(run(AggregateFn::Max), n(5.0));
    }

    #[test]
    fn errors_abort() {
        let col = InMemoryRange::column(vec![n(1.0), n(2.0)]);
        let err = aggregate_ifs(
            AggregateFn::Count,
            None,
            &[(&col, LiteralValue::Error(ExcelError::new_ref()))],
        )
        .unwrap_err();
        assert_eq!(err.kind, ExcelErrorKind::Ref);

        let values = InMemoryRange::column(vec![n(1.0), LiteralValue::Error(ExcelError::new_na())]);
        let err = aggregate_ifs(AggregateFn::Sum, Some(&values), &[(&col, t(">0"))]).unwrap_err();
        assert_eq!(err.kind, ExcelErrorKind::Na);

        // error cells outside the matching set are never read
        let ok = aggregate_ifs(AggregateFn::Sum, Some(&values), &[(&col, t("<2"))]).unwrap();
        assert_eq!(ok, n(1.0));
    }

    #[test]
    fn requires_criteria() {
        let col = InMemoryRange::column(vec![n(1.0)]);
        assert!(aggregate(AggregateFn::Sum, Some(&col), &[], &[]).is_err());
        assert!(aggregate(AggregateFn::Sum, Some(&col), &[&col], &[]).is_err());
    }

    #[test]
    fn row_major_over_blocks() {
        let block = InMemoryRange::new(vec![vec![n(1.0), n(2.0)], vec![n(3.0), n(4.0)]]);
        assert_eq!(
            aggregate_ifs(AggregateFn::Sum, None, &[(&block, t(">=2"))]).unwrap(),
            n(3.0)
        );
        assert_eq!(
            aggregate_ifs(AggregateFn::Sum, Some(&block), &[(&block, t(">=2"))]).unwrap(),
            n(9.0)
        );
    }

    #[test]
    fn repeated_calls_agree() {
        let block = InMemoryRange::new(vec![vec![n(1.0), t("a")], vec![n(3.0), n(4.0)]]);
        let first = aggregate_ifs(AggregateFn::Average, Some(&block), &[(&block, t("<>a"))]);
        let second = aggregate_ifs(AggregateFn::Average, Some(&block), &[(&block, t("<>a"))]);
        assert_eq!(first, second);
        assert_eq!(first.unwrap(), LiteralValue::Number(8.0 / 3.0));
    }
}

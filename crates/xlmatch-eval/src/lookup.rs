//! Index search over [`ValueVector`]s for VLOOKUP, HLOOKUP, MATCH and
//! XLOOKUP.
//!
//! Ranges handed to the approximate searches are assumed sorted but often
//! are not. The binary searches below reproduce the legacy behaviour on
//! such data rather than a textbook bisection:
//! - a candidate of the wrong type at the probe point is skipped by stepping
//!   forward to the next comparable value
//!   ([`handle_mid_value_type_mismatch`]);
//! - an equal hit in VLOOKUP's approximate mode resolves to the last index
//!   of the run of equal values.

use std::borrow::Cow;

use rustc_hash::FxHashSet;
use xlmatch_common::{ExcelError, LiteralValue};

use crate::compare::{CompareResult, LookupComparer};
use crate::vector::ValueVector;

/// What counts as found when no candidate is equal (XLOOKUP `match_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchMode {
    ExactMatch,
    ExactFallbackToSmaller,
    ExactFallbackToLarger,
    Wildcard,
}

impl MatchMode {
    pub fn code(self) -> i32 {
        match self {
            MatchMode::ExactMatch => 0,
            MatchMode::ExactFallbackToSmaller => -1,
            MatchMode::ExactFallbackToLarger => 1,
            MatchMode::Wildcard => 2,
        }
    }

    fn is_fallback(self) -> bool {
        matches!(
            self,
            MatchMode::ExactFallbackToSmaller | MatchMode::ExactFallbackToLarger
        )
    }
}

impl TryFrom<i32> for MatchMode {
    type Error = ExcelError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(MatchMode::ExactMatch),
            -1 => Ok(MatchMode::ExactFallbackToSmaller),
            1 => Ok(MatchMode::ExactFallbackToLarger),
            2 => Ok(MatchMode::Wildcard),
            _ => Err(ExcelError::new_value().with_message(format!("unknown match mode {code}"))),
        }
    }
}

/// Scan order and algorithm (XLOOKUP `search_mode`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchMode {
    LinearForward,
    LinearBackward,
    BinaryForward,
    BinaryBackward,
}

impl SearchMode {
    pub fn code(self) -> i32 {
        match self {
            SearchMode::LinearForward => 1,
            SearchMode::LinearBackward => -1,
            SearchMode::BinaryForward => 2,
            SearchMode::BinaryBackward => -2,
        }
    }
}

impl TryFrom<i32> for SearchMode {
    type Error = ExcelError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(SearchMode::LinearForward),
            -1 => Ok(SearchMode::LinearBackward),
            2 => Ok(SearchMode::BinaryForward),
            -2 => Ok(SearchMode::BinaryBackward),
            _ => Err(ExcelError::new_value().with_message(format!("unknown search mode {code}"))),
        }
    }
}

/// MATCH's `match_type`, reduced to its sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// `0`: first equal value, wildcards allowed.
    Exact,
    /// `1`: largest value not above the lookup value (ascending data).
    LargestNotAbove,
    /// `-1`: smallest value not below the lookup value (descending data).
    SmallestNotBelow,
}

impl MatchType {
    pub fn from_sign(n: f64) -> Self {
        if n > 0.0 {
            MatchType::LargestNotAbove
        } else if n < 0.0 {
            MatchType::SmallestNotBelow
        } else {
            MatchType::Exact
        }
    }
}

/// XLOOKUP search: index of `target` in `vector` under the given modes,
/// `#N/A` when nothing qualifies.
///
/// The fallback modes compare text lookup values only up to their first
/// `~`, `?` or `*`; wildcards are honoured only in [`MatchMode::Wildcard`].
pub fn lookup_index<V: ValueVector + ?Sized>(
    target: &LiteralValue,
    vector: &V,
    match_mode: MatchMode,
    search_mode: SearchMode,
) -> Result<usize, ExcelError> {
    let key = match target {
        LiteralValue::Text(s) if match_mode.is_fallback() => {
            match s.find(['~', '?', '*']) {
                Some(cut) => Cow::Owned(LiteralValue::Text(s[..cut].to_string())),
                None => Cow::Borrowed(target),
            }
        }
        _ => Cow::Borrowed(target),
    };
    // wildcards only in wildcard mode, unlike the legacy tolerant comparer
    // which honours them in every mode
    let comparer = LookupComparer::tolerant(
        &key,
        match_mode != MatchMode::Wildcard,
        match_mode == MatchMode::Wildcard,
    )?;
    let found = match search_mode {
        SearchMode::LinearForward => linear_index_of_value(&comparer, vector, match_mode, false),
        SearchMode::LinearBackward => linear_index_of_value(&comparer, vector, match_mode, true),
        SearchMode::BinaryForward => binary_index_of_value(&comparer, vector, match_mode, false),
        SearchMode::BinaryBackward => binary_index_of_value(&comparer, vector, match_mode, true),
    };
    found.ok_or_else(ExcelError::new_na)
}

/// VLOOKUP/HLOOKUP search over the first column/row of the table.
///
/// With `is_range_lookup` the vector is bisected (approximate match, last
/// of an equal run); otherwise it is scanned front to back for the first
/// equal value, with wildcards.
pub fn lookup_first_index_of_value<V: ValueVector + ?Sized>(
    target: &LiteralValue,
    vector: &V,
    is_range_lookup: bool,
) -> Result<usize, ExcelError> {
    let comparer = LookupComparer::new(target, !is_range_lookup)?;
    let found = if is_range_lookup {
        perform_binary_search(vector, &comparer)
    } else {
        linear_index_of_value(&comparer, vector, MatchMode::ExactMatch, false)
    };
    found.ok_or_else(ExcelError::new_na)
}

/// MATCH search. Both approximate types scan linearly and step over values
/// of another type.
pub fn match_index_of_value<V: ValueVector + ?Sized>(
    target: &LiteralValue,
    vector: &V,
    match_type: MatchType,
) -> Result<usize, ExcelError> {
    let comparer = LookupComparer::new(target, match_type == MatchType::Exact)?;
    let found = match match_type {
        MatchType::Exact => linear_index_of_value(&comparer, vector, MatchMode::ExactMatch, false),
        MatchType::LargestNotAbove => vector
            .indices(true)
            .find(|&i| {
                let cr = comparer.compare_to(&vector.item(i));
                !cr.is_type_mismatch() && !cr.is_less_than()
            }),
        MatchType::SmallestNotBelow => smallest_not_below(&comparer, vector),
    };
    found.ok_or_else(ExcelError::new_na)
}

fn smallest_not_below<V: ValueVector + ?Sized>(
    comparer: &LookupComparer,
    vector: &V,
) -> Option<usize> {
    for i in vector.indices(false) {
        match comparer.compare_to(&vector.item(i)) {
            CompareResult::Equal => return Some(i),
            CompareResult::GreaterThan => return i.checked_sub(1),
            _ => {}
        }
    }
    vector.size().checked_sub(1)
}

/// Running best candidate for the fallback match modes.
struct BestMatch {
    index: usize,
    value: LiteralValue,
}

fn track_fallback(
    best: &mut Option<BestMatch>,
    match_mode: MatchMode,
    result: CompareResult,
    index: usize,
    value: LiteralValue,
) {
    let qualifies = match match_mode {
        MatchMode::ExactFallbackToLarger => result.is_less_than(),
        MatchMode::ExactFallbackToSmaller => result.is_greater_than(),
        MatchMode::ExactMatch | MatchMode::Wildcard => false,
    };
    if !qualifies {
        return;
    }
    let closer = match best {
        None => true,
        Some(b) => match LookupComparer::tolerant(&value, true, false) {
            Ok(candidate) => {
                let cr = candidate.compare_to(&b.value);
                if match_mode == MatchMode::ExactFallbackToLarger {
                    cr.is_less_than()
                } else {
                    cr.is_greater_than()
                }
            }
            Err(_) => false,
        },
    };
    if closer {
        *best = Some(BestMatch { index, value });
    }
}

fn linear_index_of_value<V: ValueVector + ?Sized>(
    comparer: &LookupComparer,
    vector: &V,
    match_mode: MatchMode,
    reverse: bool,
) -> Option<usize> {
    let mut best = None;
    for i in vector.indices(reverse) {
        let value = vector.item(i);
        let result = comparer.compare_to(&value);
        if result.is_equal() {
            return Some(i);
        }
        track_fallback(&mut best, match_mode, result, i, value);
    }
    best.map(|b| b.index)
}

/// Search window `(low, high)`, both exclusive. `low == -1` means nothing
/// below has been ruled in yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BinarySearchIndexes {
    low: isize,
    high: isize,
}

impl BinarySearchIndexes {
    fn new(size: usize) -> Self {
        Self {
            low: -1,
            high: size as isize,
        }
    }

    /// `None` once fewer than one candidate is left.
    fn mid(&self) -> Option<usize> {
        let diff = self.high - self.low;
        if diff < 2 {
            return None;
        }
        Some((self.low + diff / 2) as usize)
    }

    fn low(&self) -> Option<usize> {
        usize::try_from(self.low).ok()
    }

    fn high(&self) -> usize {
        self.high as usize
    }

    fn narrow(&mut self, mid: usize, is_less_than: bool) {
        if is_less_than {
            self.high = mid as isize;
        } else {
            self.low = mid as isize;
        }
        #[cfg(feature = "tracing")]
        tracing::trace!(low = self.low, high = self.high, mid, "narrow");
    }
}

/// Approximate bisection used by VLOOKUP/HLOOKUP: index of the largest
/// value not above the lookup value, or the last of a run of equal values.
fn perform_binary_search<V: ValueVector + ?Sized>(
    vector: &V,
    comparer: &LookupComparer,
) -> Option<usize> {
    let mut bsi = BinarySearchIndexes::new(vector.size());
    loop {
        let Some(mut mid) = bsi.mid() else {
            return bsi.low();
        };
        let mut cr = comparer.compare_to(&vector.item(mid));
        if cr.is_type_mismatch() {
            match handle_mid_value_type_mismatch(comparer, vector, &mut bsi, mid, false) {
                None => continue,
                Some(new_mid) => {
                    mid = new_mid;
                    cr = comparer.compare_to(&vector.item(mid));
                }
            }
        }
        if cr.is_equal() {
            return Some(find_last_index_in_run_of_equal_values(
                comparer,
                vector,
                mid,
                bsi.high(),
            ));
        }
        bsi.narrow(mid, cr.is_less_than());
    }
}

/// XLOOKUP bisection. Each index is probed at most once; the fallback
/// candidates are tracked as in the linear scan.
fn binary_index_of_value<V: ValueVector + ?Sized>(
    comparer: &LookupComparer,
    vector: &V,
    match_mode: MatchMode,
    reverse: bool,
) -> Option<usize> {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("binary_lookup", size = vector.size(), reverse).entered();

    let mut best = None;
    let mut already_searched = FxHashSet::default();
    let mut bsi = BinarySearchIndexes::new(vector.size());
    loop {
        let i = match bsi.mid() {
            Some(i) if already_searched.insert(i) => i,
            _ => return best.map(|b: BestMatch| b.index),
        };
        let value = vector.item(i);
        let result = comparer.compare_to(&value);
        if result.is_equal() {
            return Some(i);
        }
        track_fallback(&mut best, match_mode, result, i, value);
        if result.is_type_mismatch() {
            if let Some(hit) = handle_mid_value_type_mismatch(comparer, vector, &mut bsi, i, reverse)
            {
                return Some(hit);
            }
        } else if reverse {
            bsi.narrow(i, result.is_greater_than());
        } else {
            bsi.narrow(i, result.is_less_than());
        }
    }
}

/// The candidate at `mid` has the wrong type: step forward to the next value
/// that compares. Returns the index of an equal value if that is where the
/// step lands; otherwise narrows `bsi` and returns `None`.
///
/// Running off the window, or landing on the last slot with a value the
/// lookup value sorts before (after, for `reverse`), drops everything from
/// `mid` upwards.
fn handle_mid_value_type_mismatch<V: ValueVector + ?Sized>(
    comparer: &LookupComparer,
    vector: &V,
    bsi: &mut BinarySearchIndexes,
    mid: usize,
    reverse: bool,
) -> Option<usize> {
    let high = bsi.high();
    let mut new_mid = mid;
    loop {
        new_mid += 1;
        if new_mid == high {
            bsi.narrow(mid, true);
            return None;
        }
        let cr = comparer.compare_to(&vector.item(new_mid));
        let at_last_slot = new_mid == high - 1;
        if at_last_slot && ((cr.is_less_than() && !reverse) || (cr.is_greater_than() && reverse)) {
            bsi.narrow(mid, true);
            return None;
        }
        if cr.is_type_mismatch() {
            continue;
        }
        if cr.is_equal() {
            return Some(new_mid);
        }
        if reverse {
            bsi.narrow(new_mid, cr.is_greater_than());
        } else {
            bsi.narrow(new_mid, cr.is_less_than());
        }
        return None;
    }
}

fn find_last_index_in_run_of_equal_values<V: ValueVector + ?Sized>(
    comparer: &LookupComparer,
    vector: &V,
    first: usize,
    max: usize,
) -> usize {
    (first + 1..max)
        .find(|&i| !comparer.compare_to(&vector.item(i)).is_equal())
        .map_or(max - 1, |i| i - 1)
}

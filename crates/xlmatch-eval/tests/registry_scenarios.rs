//! End-to-end calls through the function registry.

use xlmatch_common::{ExcelError, ExcelErrorKind, LiteralValue};
use xlmatch_eval::builtins::load_builtins;
use xlmatch_eval::function_registry;
use xlmatch_eval::{ArgumentHandle, CellContext, InMemoryRange, InMemoryVolume};

fn n(v: f64) -> LiteralValue {
    LiteralValue::Number(v)
}
fn t(s: &str) -> LiteralValue {
    LiteralValue::Text(s.into())
}
fn v(x: LiteralValue) -> ArgumentHandle<'static> {
    ArgumentHandle::Value(x)
}

fn call(name: &str, args: &[ArgumentHandle<'_>]) -> Result<LiteralValue, ExcelError> {
    load_builtins();
    let f = function_registry::get(name).expect("registered");
    f.dispatch(args, &CellContext::default())
}

#[test]
fn every_builtin_is_registered() {
    load_builtins();
    let names = function_registry::registered_names();
    for expected in [
        "AVERAGEIF",
        "AVERAGEIFS",
        "COUNTIF",
        "COUNTIFS",
        "HLOOKUP",
        "MATCH",
        "MAXIFS",
        "MINIFS",
        "SUMIF",
        "SUMIFS",
        "VLOOKUP",
        "XLOOKUP",
    ] {
        assert!(names.iter().any(|n| n == expected), "{expected} missing");
    }
    assert!(function_registry::get("vlookup").is_some());
    assert!(function_registry::get("NOSUCHFN").is_none());
}

#[test]
fn vlookup_table_scenario() {
    let table = InMemoryRange::new(vec![
        vec![n(1.0), t("a")],
        vec![n(2.0), t("b")],
        vec![n(3.0), t("c")],
    ]);
    let exact = |key: f64| {
        call(
            "VLOOKUP",
            &[v(n(key)), (&table).into(), v(n(2.0)), v(LiteralValue::Boolean(false))],
        )
    };
    assert_eq!(exact(2.0).unwrap(), t("b"));
    assert_eq!(exact(4.0).unwrap_err().kind, ExcelErrorKind::Na);
    let approx = call("VLOOKUP", &[v(n(2.5)), (&table).into(), v(n(2.0))]).unwrap();
    assert_eq!(approx, t("b"));
    let below = call("VLOOKUP", &[v(n(0.5)), (&table).into(), v(n(2.0))]).unwrap_err();
    assert_eq!(below.kind, ExcelErrorKind::Na);
}

#[test]
fn vlookup_approximate_on_unsorted_mixed_column() {
    // text in the probe position is stepped over, not compared
    let table = InMemoryRange::new(vec![
        vec![n(1.0), t("one")],
        vec![t("x"), t("text")],
        vec![n(5.0), t("five")],
        vec![n(9.0), t("nine")],
    ]);
    let got = call("VLOOKUP", &[v(n(6.0)), (&table).into(), v(n(2.0))]).unwrap();
    assert_eq!(got, t("five"));
}

#[test]
fn match_and_xlookup_agree_on_exact_hits() {
    let keys = InMemoryRange::column(vec![t("red"), t("green"), t("blue")]);
    let vals = InMemoryRange::column(vec![n(1.0), n(2.0), n(3.0)]);
    let pos = call("MATCH", &[v(t("BLUE")), (&keys).into(), v(n(0.0))]).unwrap();
    assert_eq!(pos, n(3.0));
    let got = call("XLOOKUP", &[v(t("BLUE")), (&keys).into(), (&vals).into()]).unwrap();
    assert_eq!(got, n(3.0));
}

#[test]
fn match_descending_type() {
    let col = InMemoryRange::column(vec![n(50.0), n(40.0), n(30.0), n(20.0)]);
    let got = call("MATCH", &[v(n(35.0)), (&col).into(), v(n(-1.0))]).unwrap();
    assert_eq!(got, n(2.0));
    let err = call("MATCH", &[v(n(60.0)), (&col).into(), v(n(-1.0))]).unwrap_err();
    assert_eq!(err.kind, ExcelErrorKind::Na);
}

#[test]
fn match_over_sheet_stack() {
    let vol = InMemoryVolume::new(
        1,
        vec![
            InMemoryRange::new(vec![vec![n(10.0)]]),
            InMemoryRange::new(vec![vec![n(20.0)]]),
        ],
    );
    let arg = ArgumentHandle::SheetRef {
        volume: &vol,
        row: 0,
        col: 0,
    };
    assert_eq!(call("MATCH", &[v(n(20.0)), arg, v(n(0.0))]).unwrap(), n(2.0));
}

#[test]
fn sumifs_scenario() {
    let amounts = InMemoryRange::column(vec![n(5.0), n(10.0), n(15.0), n(20.0)]);
    let kinds = InMemoryRange::column(vec![t("fruit"), t("veg"), t("fruit"), t("fruit")]);
    let names = InMemoryRange::column(vec![t("apple"), t("leek"), t("pear"), t("apricot")]);
    let args = [
        (&amounts).into(),
        (&kinds).into(),
        v(t("fruit")),
        (&names).into(),
        v(t("a*")),
    ];
    assert_eq!(call("SUMIFS", &args).unwrap(), n(25.0));
    assert_eq!(call("COUNTIFS", &args[1..]).unwrap(), n(2.0));
    assert_eq!(call("AVERAGEIFS", &args).unwrap(), n(12.5));
    assert_eq!(call("MAXIFS", &args).unwrap(), n(20.0));
    assert_eq!(call("MINIFS", &args).unwrap(), n(5.0));
}

#[test]
fn countif_criteria_forms() {
    let cells = InMemoryRange::column(vec![
        n(1.0),
        n(2.0),
        t("2"),
        LiteralValue::Boolean(true),
        LiteralValue::Error(ExcelError::new_div()),
        LiteralValue::Empty,
    ]);
    let count = |crit: LiteralValue| call("COUNTIF", &[(&cells).into(), v(crit)]).unwrap();
    assert_eq!(count(n(2.0)), n(1.0));
    assert_eq!(count(t(">=1")), n(2.0));
    assert_eq!(count(t("TRUE")), n(1.0));
    assert_eq!(count(t("#DIV/0!")), n(1.0));
    assert_eq!(count(t("<>#DIV/0!")), n(5.0));
}

#[test]
fn sumif_error_cells_only_matter_when_matched() {
    let keys = InMemoryRange::column(vec![t("a"), t("b")]);
    let vals = InMemoryRange::column(vec![n(1.0), LiteralValue::Error(ExcelError::new_na())]);
    assert_eq!(call("SUMIF", &[(&keys).into(), v(t("a")), (&vals).into()]).unwrap(), n(1.0));
    assert_eq!(
        call("SUMIF", &[(&keys).into(), v(t("b")), (&vals).into()])
            .unwrap_err()
            .kind,
        ExcelErrorKind::Na
    );
}

#[test]
fn arity_is_checked_before_evaluation() {
    let col = InMemoryRange::column(vec![n(1.0)]);
    assert_eq!(
        call("MATCH", &[v(n(1.0))]).unwrap_err().kind,
        ExcelErrorKind::Value
    );
    assert_eq!(
        call("COUNTIF", &[(&col).into(), v(n(1.0)), (&col).into()])
            .unwrap_err()
            .kind,
        ExcelErrorKind::Value
    );
}

#[test]
fn omitted_value_range_falls_back_to_criteria_range() {
    let range = InMemoryRange::row(vec![n(1.0), n(2.0)]);
    let omitted = |name: &str| {
        call(name, &[(&range).into(), v(t(">0")), ArgumentHandle::missing()])
    };
    assert_eq!(omitted("SUMIF").unwrap(), n(3.0));
    assert_eq!(omitted("AVERAGEIF").unwrap(), n(1.5));
}

#[test]
fn countif_counts_negative_zero_as_zero() {
    let range = InMemoryRange::column(vec![n(-0.0), n(0.0), n(1.0)]);
    assert_eq!(call("COUNTIF", &[(&range).into(), v(n(0.0))]).unwrap(), n(2.0));
    assert_eq!(call("COUNTIF", &[(&range).into(), v(t("=0"))]).unwrap(), n(2.0));
}

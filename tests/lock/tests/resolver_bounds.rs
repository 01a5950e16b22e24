//! Depth and step bounds: oversize input yields a partial result, never an
//! error or a panic.

use lock_tests::fixtures::{encode, hex_onion, int};
use metadecode_kernel::recovery::budget::{RecoveryBudget, RecoveryLimits};
use metadecode_kernel::recovery::diagnostics::{CollectingSink, DiagnosticLevel};
use metadecode_kernel::recovery::resolver::{resolve, RecursiveResolver};
use metadecode_kernel::value::model::Value;

// ---------------------------------------------------------------------------
// ACCEPTANCE: RESOLVE-DEPTH-BOUND
// ---------------------------------------------------------------------------

#[test]
fn nesting_beyond_max_depth_stops_at_the_limit() {
    let layers = hex_onion(15);
    let limits = RecoveryLimits {
        max_depth: 10,
        ..RecoveryLimits::default()
    };
    let mut sink = CollectingSink::new();
    let out = resolve(layers[15].clone(), &limits, &mut sink);

    // Depths 0..=10 each peel one layer; the layer reached at depth 11 is
    // returned untouched, still hex text.
    assert_eq!(out, layers[4]);
    assert!(matches!(out, Value::Text(_)));
    assert!(sink.has_stage("resolver"));
}

#[test]
fn nesting_within_max_depth_is_fully_recovered() {
    let layers = hex_onion(8);
    let out = resolve(
        layers[8].clone(),
        &RecoveryLimits::default(),
        &mut CollectingSink::new(),
    );
    assert_eq!(out, layers[0]);
}

// ---------------------------------------------------------------------------
// ACCEPTANCE: RESOLVE-STEP-BOUND
// ---------------------------------------------------------------------------

#[test]
fn step_budget_leaves_later_elements_unresolved() {
    let leaf = Value::Text(hex::encode(encode(&int(7))));
    let input = Value::Array(vec![leaf.clone(); 20]);
    let limits = RecoveryLimits {
        max_steps: 5,
        ..RecoveryLimits::default()
    };
    let mut sink = CollectingSink::new();
    let mut budget = RecoveryBudget::new(&limits);
    let out = RecursiveResolver::new(&mut budget, limits.decompress, &mut sink).resolve(input);
    assert!(budget.is_exhausted());

    let Value::Array(items) = out else {
        panic!("array shape must be preserved");
    };
    assert_eq!(items.len(), 20);
    // One step for the root, two per leaf (the text node and the integer it
    // decodes to): the first two leaves fit.
    assert_eq!(items[0], int(7));
    assert_eq!(items[1], int(7));
    assert!(items[2..].iter().all(|item| *item == leaf));

    let warnings: Vec<_> = sink.at_least(DiagnosticLevel::Warn).collect();
    assert_eq!(warnings.len(), 1, "exhaustion is reported once");
}

#[test]
fn zero_step_budget_returns_input_unchanged() {
    let input = Value::Array(vec![Value::Text("a0".into())]);
    let limits = RecoveryLimits {
        max_steps: 0,
        ..RecoveryLimits::default()
    };
    let out = resolve(input.clone(), &limits, &mut CollectingSink::new());
    assert_eq!(out, input);
}

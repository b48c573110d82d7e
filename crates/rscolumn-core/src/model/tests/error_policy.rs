//! Behaviour when a process fails part way through a step.

use super::fixtures::{child, zero_state, BrokenParent, ConstantTendency, Picky};
use crate::errors::ColumnError;
use crate::field::TS;
use crate::model::{ErrorPolicy, ModelBuilder};
use crate::process::CompositeProcess;
use ndarray::array;

#[test]
fn propagate_leaves_state_untouched() {
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_timestep(1.0)
        .with_process("warming", ConstantTendency::surface(1.0))
        .with_process("bad", Picky::always_failing())
        .build()
        .unwrap();

    let err = model.step_forward().unwrap_err();
    assert!(matches!(err, ColumnError::InvalidParameter { .. }));
    assert_eq!(model.values(TS).unwrap(), array![0.0]);
    assert_eq!(model.steps_taken(), 0);
    assert_eq!(model.stale_processes().count(), 0);
}

#[test]
fn mark_stale_skips_the_failing_process() {
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_timestep(1.0)
        .with_error_policy(ErrorPolicy::MarkStale)
        .with_process("warming", ConstantTendency::surface(1.0))
        .with_process("bad", Picky::always_failing())
        .build()
        .unwrap();

    model.step_forward().unwrap();
    assert_eq!(model.values(TS).unwrap(), array![1.0]);
    assert_eq!(model.stale_processes().collect::<Vec<_>>(), vec!["bad"]);
    assert!(model.is_stale("bad"));
}

#[test]
fn mark_stale_reports_nested_path() {
    let parent = CompositeProcess::new()
        .with_subprocess("good", ConstantTendency::surface(2.0))
        .unwrap()
        .with_subprocess("bad", Picky::always_failing())
        .unwrap();
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_timestep(1.0)
        .with_error_policy(ErrorPolicy::MarkStale)
        .with_process("parent", parent)
        .build()
        .unwrap();

    model.step_forward().unwrap();
    assert_eq!(model.values(TS).unwrap(), array![2.0]);
    assert!(model.is_stale("parent/bad"));
    assert!(!model.is_stale("parent"));
}

#[test]
fn failing_parent_marks_its_whole_subtree_stale() {
    let group = CompositeProcess::new()
        .with_subprocess("deep", ConstantTendency::surface(3.0))
        .unwrap();
    let parent = BrokenParent::new(vec![
        child("leaf", ConstantTendency::surface(5.0)),
        child("group", group),
    ]);
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_timestep(1.0)
        .with_error_policy(ErrorPolicy::MarkStale)
        .with_process("warming", ConstantTendency::surface(1.0))
        .with_process("parent", parent)
        .build()
        .unwrap();

    model.step_forward().unwrap();
    // Only the sibling contributes
    assert_eq!(model.values(TS).unwrap(), array![1.0]);
    assert_eq!(
        model.stale_processes().collect::<Vec<_>>(),
        vec!["parent", "parent/group", "parent/group/deep", "parent/leaf"]
    );
    assert!(!model.is_stale("warming"));
    assert!(model.diagnostic("parent/leaf/rate").is_none());
    assert_eq!(model.diagnostic("warming/rate").unwrap(), array![1.0]);
}

#[test]
fn stale_process_keeps_previous_diagnostics() {
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_timestep(1.0)
        .with_error_policy(ErrorPolicy::MarkStale)
        .with_process("warming", ConstantTendency::surface(1.0))
        .with_process("picky", Picky::new(-1.0, 0.5))
        .build()
        .unwrap();

    // Ts = 0 is accepted
    model.step_forward().unwrap();
    assert!(!model.is_stale("picky"));
    assert_eq!(model.diagnostic("picky/value").unwrap(), array![0.0]);

    // Ts = 1 is rejected, the old diagnostic survives
    model.step_forward().unwrap();
    assert!(model.is_stale("picky"));
    assert_eq!(model.diagnostic("picky/value").unwrap(), array![0.0]);
    assert_eq!(model.values(TS).unwrap(), array![2.0]);
}

#[test]
fn stale_marker_clears_after_success() {
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_timestep(1.0)
        .with_error_policy(ErrorPolicy::MarkStale)
        .with_process("warming", ConstantTendency::surface(1.0))
        .with_process("picky", Picky::new(0.5, 10.0))
        .build()
        .unwrap();

    model.step_forward().unwrap();
    assert!(model.is_stale("picky"));
    assert!(model.diagnostic("picky/value").is_none());

    model.step_forward().unwrap();
    assert!(!model.is_stale("picky"));
    assert_eq!(model.diagnostic("picky/value").unwrap(), array![1.0]);
}

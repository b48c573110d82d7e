//! Basic model tests: step, time keeping, lookup, dot, serialisation.

use super::fixtures::{zero_state, ConstantTendency, Relaxation};
use crate::constants::SECONDS_PER_DAY;
use crate::field::{TATM, TS};
use crate::model::{Model, ModelBuilder};
use crate::process::CompositeProcess;
use approx::assert_relative_eq;
use ndarray::array;

#[test]
fn step() {
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_timestep(10.0)
        .with_process("warming", ConstantTendency::surface(2.0))
        .build()
        .unwrap();

    assert_eq!(model.steps_taken(), 0);
    model.step_forward().unwrap();
    assert_eq!(model.values(TS).unwrap(), array![20.0]);
    assert_eq!(model.values(TATM).unwrap(), array![0.0, 0.0, 0.0]);
    assert_eq!(model.steps_taken(), 1);
    assert_relative_eq!(model.elapsed_seconds(), 10.0);
    assert_eq!(model.tendencies()[TS], array![2.0]);
}

#[test]
fn compute_does_not_advance() {
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_process("warming", ConstantTendency::surface(2.0))
        .build()
        .unwrap();

    model.compute().unwrap();
    assert_eq!(model.tendencies()[TS], array![2.0]);
    assert_eq!(model.values(TS).unwrap(), array![0.0]);
    assert_eq!(model.steps_taken(), 0);
}

#[test]
fn integrate_days_and_years() {
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_timestep(SECONDS_PER_DAY)
        .with_process("warming", ConstantTendency::surface(1.0 / SECONDS_PER_DAY))
        .build()
        .unwrap();

    model.integrate_days(3.0).unwrap();
    assert_eq!(model.steps_taken(), 3);
    assert_relative_eq!(model.values(TS).unwrap()[0], 3.0, epsilon = 1e-9);

    model.integrate_years(1.0).unwrap();
    assert_eq!(model.steps_taken(), 3 + 365);
    assert_relative_eq!(model.elapsed_days(), 368.0, epsilon = 1e-9);
    assert!(model.elapsed_years() > 1.0);

    assert!(model.integrate_days(-1.0).is_err());
}

#[test]
fn diagnostics_are_namespaced_by_path() {
    let parent = CompositeProcess::new()
        .with_subprocess("inner", ConstantTendency::new(TATM, vec![1.0, 2.0, 3.0]))
        .unwrap();
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_process("outer", parent)
        .with_process("inner", ConstantTendency::surface(4.0))
        .build()
        .unwrap();

    model.step_forward().unwrap();

    assert_eq!(model.diagnostic("outer/inner/rate").unwrap(), array![1.0, 2.0, 3.0]);
    assert_eq!(model.diagnostic("inner/rate").unwrap(), array![4.0]);
    assert!(model.diagnostic("outer/rate").is_none());
    assert!(model.diagnostics("outer").is_none());

    let names: Vec<String> = model.all_diagnostics().map(|(k, _)| k).collect();
    assert_eq!(names, vec!["inner/rate", "outer/inner/rate"]);
}

#[test]
fn process_paths_are_post_order() {
    let a = CompositeProcess::new()
        .with_subprocess("a1", ConstantTendency::surface(1.0))
        .unwrap()
        .with_subprocess("a2", Relaxation::new(TS, 1, 1.0, 10.0))
        .unwrap();
    let model = ModelBuilder::new()
        .with_state(zero_state())
        .with_process("A", a)
        .with_process("B", ConstantTendency::surface(1.0))
        .build()
        .unwrap();

    assert_eq!(model.process_paths(), vec!["A/a1", "A/a2", "A", "B"]);
    assert!(model.process("A/a2").is_some());
    assert_eq!(model.process("A/a1").unwrap().schema().tendencies()[0].name(), TS);
    assert!(model.process("A/a3").is_none());
    assert!(model.process("").is_none());
}

#[test]
fn dot() {
    let a = CompositeProcess::new()
        .with_subprocess("a1", ConstantTendency::surface(1.0))
        .unwrap();
    let model = ModelBuilder::new()
        .with_state(zero_state())
        .with_process("A", a)
        .build()
        .unwrap();

    let dot = model.as_dot();
    assert!(dot.starts_with("digraph {"));
    assert!(dot.contains("\"Model\""));
    assert!(dot.contains("\"A\""));
    assert!(dot.contains("\"a1\""));
    assert!(dot.contains("0 -> 1"));
    assert!(dot.contains("1 -> 2"));
}

#[test]
fn serialise_and_deserialise_model() {
    let mut model = ModelBuilder::new()
        .with_state(zero_state())
        .with_timestep(5.0)
        .with_process("relax", Relaxation::new(TATM, 3, 250.0, 100.0))
        .with_process("warming", ConstantTendency::surface(0.5))
        .build()
        .unwrap();
    model.step_forward().unwrap();

    let serialised = serde_json::to_string_pretty(&model).unwrap();
    let mut restored: Model = serde_json::from_str(&serialised).unwrap();

    assert_eq!(restored.steps_taken(), 1);
    assert_eq!(restored.state(), model.state());
    assert_eq!(restored.process_paths(), model.process_paths());

    model.integrate_steps(3).unwrap();
    restored.integrate_steps(3).unwrap();
    assert_eq!(restored.state(), model.state());
}

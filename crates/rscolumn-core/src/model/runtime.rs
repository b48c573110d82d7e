//! Model struct and runtime execution.

use crate::constants::{DAYS_PER_YEAR, SECONDS_PER_DAY};
use crate::errors::{ColumnError, ColumnResult};
use crate::field::{State, StateField};
use crate::process::{find_process, CompositeProcess, Process};
use log::{debug, info};
use ndarray::{Array1, ArrayView1};
use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use petgraph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::evaluation::{evaluate, WalkOptions};
use super::types::{child_path, ErrorPolicy, PATH_SEPARATOR};

/// A tree of processes sharing a single state, advanced with a fixed timestep.
///
/// The model is the only owner of the state values. Processes see the state
/// read-only while they compute; the summed tendencies are applied afterwards.
#[derive(Debug, Serialize, Deserialize)]
pub struct Model {
    state: State,
    root: CompositeProcess,
    /// Timestep in seconds
    timestep: f64,
    #[serde(default)]
    policy: ErrorPolicy,
    #[serde(default)]
    parallel_siblings: bool,
    #[serde(default)]
    steps_taken: u64,
    #[serde(default)]
    elapsed_seconds: f64,
    /// Latest diagnostics, keyed by process path then diagnostic name
    #[serde(skip)]
    diagnostics: BTreeMap<String, BTreeMap<String, Array1<f64>>>,
    /// Total tendencies from the latest evaluation
    #[serde(skip)]
    tendencies: BTreeMap<String, Array1<f64>>,
    #[serde(skip)]
    stale: BTreeSet<String>,
}

impl Model {
    pub(crate) fn new(
        state: State,
        root: CompositeProcess,
        timestep: f64,
        policy: ErrorPolicy,
        parallel_siblings: bool,
    ) -> Self {
        Self {
            state,
            root,
            timestep,
            policy,
            parallel_siblings,
            steps_taken: 0,
            elapsed_seconds: 0.0,
            diagnostics: BTreeMap::new(),
            tendencies: BTreeMap::new(),
            stale: BTreeSet::new(),
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn field(&self, name: &str) -> Option<&StateField> {
        self.state.get(name)
    }

    /// Current values of a state field
    pub fn values(&self, name: &str) -> ColumnResult<ArrayView1<'_, f64>> {
        self.state.values(name)
    }

    pub fn timestep(&self) -> f64 {
        self.timestep
    }

    pub fn error_policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps_taken
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn elapsed_days(&self) -> f64 {
        self.elapsed_seconds / SECONDS_PER_DAY
    }

    pub fn elapsed_years(&self) -> f64 {
        self.elapsed_days() / DAYS_PER_YEAR
    }

    /// Look up a process by its path, e.g. `"Radiation/LW"`
    pub fn process(&self, path: &str) -> Option<&dyn Process> {
        if path.is_empty() {
            return None;
        }
        find_process(&self.root, path)
    }

    /// Paths of every process in evaluation order
    pub fn process_paths(&self) -> Vec<String> {
        fn visit(process: &dyn Process, path: &str, paths: &mut Vec<String>) {
            for child in process.subprocesses() {
                let child_path = child_path(path, &child.name);
                visit(child.process.as_ref(), &child_path, paths);
                paths.push(child_path);
            }
        }
        let mut paths = vec![];
        visit(&self.root, "", &mut paths);
        paths
    }

    /// Total tendencies from the latest evaluation
    pub fn tendencies(&self) -> &BTreeMap<String, Array1<f64>> {
        &self.tendencies
    }

    /// Latest diagnostics published by the process at `path`
    pub fn diagnostics(&self, path: &str) -> Option<&BTreeMap<String, Array1<f64>>> {
        self.diagnostics.get(path)
    }

    /// A single diagnostic addressed by its full name, e.g. `"Radiation/OLR"`
    pub fn diagnostic(&self, key: &str) -> Option<&Array1<f64>> {
        let (path, name) = key.rsplit_once(PATH_SEPARATOR)?;
        self.diagnostics.get(path)?.get(name)
    }

    /// All diagnostics as `(full name, values)` pairs, sorted by name
    pub fn all_diagnostics(&self) -> impl Iterator<Item = (String, &Array1<f64>)> {
        self.diagnostics.iter().flat_map(|(path, diagnostics)| {
            diagnostics
                .iter()
                .map(move |(name, values)| (child_path(path, name), values))
        })
    }

    /// Paths of processes skipped during the latest evaluation
    pub fn stale_processes(&self) -> impl Iterator<Item = &str> {
        self.stale.iter().map(|s| s.as_str())
    }

    pub fn is_stale(&self, path: &str) -> bool {
        self.stale.contains(path)
    }

    /// Evaluate the process tree against the current state without advancing it
    ///
    /// The resulting tendencies and diagnostics are stored on the model.
    pub fn compute(&mut self) -> ColumnResult<()> {
        let options = WalkOptions {
            policy: self.policy,
            parallel_siblings: self.parallel_siblings,
        };
        let evaluation = evaluate(&self.root, "", &self.state, options)?;

        let stale: BTreeSet<String> = evaluation.stale.into_iter().collect();
        for path in self.stale.difference(&stale) {
            debug!("Process '{}' is no longer stale", path);
        }
        self.stale = stale;
        self.diagnostics.extend(evaluation.diagnostics);
        self.tendencies = evaluation.tendencies;
        Ok(())
    }

    /// Apply the stored tendencies over one timestep
    ///
    /// Every tendency is checked against the state before any field is modified.
    fn apply_tendencies(&mut self) -> ColumnResult<()> {
        for (name, tendency) in self.tendencies.iter() {
            let field = self
                .state
                .get(name)
                .ok_or_else(|| ColumnError::UnknownField(name.clone()))?;
            if field.len() != tendency.len() {
                return Err(ColumnError::shape_mismatch(
                    format!("tendency of {}", name),
                    field.len(),
                    tendency.len(),
                ));
            }
        }
        for (name, tendency) in self.tendencies.iter() {
            let field = self
                .state
                .get_mut(name)
                .ok_or_else(|| ColumnError::UnknownField(name.clone()))?;
            field.apply_tendency(tendency.view(), self.timestep)?;
        }
        Ok(())
    }

    /// Advance the model by a single timestep
    ///
    /// All processes are evaluated against the same pre-step state before any
    /// tendency is applied. On error the state is left untouched.
    pub fn step_forward(&mut self) -> ColumnResult<()> {
        self.compute()?;
        self.apply_tendencies()?;
        self.steps_taken += 1;
        self.elapsed_seconds += self.timestep;
        debug!(
            "Completed step {} ({} tendencies applied)",
            self.steps_taken,
            self.tendencies.len()
        );
        Ok(())
    }

    /// Advance the model by `num_steps` timesteps
    pub fn integrate_steps(&mut self, num_steps: u64) -> ColumnResult<()> {
        info!(
            "Integrating {} steps from {:.4} days",
            num_steps,
            self.elapsed_days()
        );
        for _ in 0..num_steps {
            self.step_forward()?;
        }
        Ok(())
    }

    /// Advance the model by (the nearest whole number of timesteps to) `days`
    pub fn integrate_days(&mut self, days: f64) -> ColumnResult<()> {
        if !(days.is_finite() && days >= 0.0) {
            return Err(ColumnError::invalid_parameter(
                "days",
                days,
                "must be non-negative and finite",
            ));
        }
        let num_steps = (days * SECONDS_PER_DAY / self.timestep).round() as u64;
        self.integrate_steps(num_steps)
    }

    /// Advance the model by `years`, each of 365.2422 days
    pub fn integrate_years(&mut self, years: f64) -> ColumnResult<()> {
        self.integrate_days(years * DAYS_PER_YEAR)
    }

    /// Create a diagram that represents the process tree.
    ///
    /// Useful for debugging.
    pub fn as_dot(&self) -> String {
        fn add_children(
            graph: &mut Graph<String, &'static str>,
            parent: NodeIndex,
            process: &dyn Process,
        ) {
            for child in process.subprocesses() {
                let node = graph.add_node(child.name.clone());
                graph.add_edge(parent, node, "");
                add_children(graph, node, child.process.as_ref());
            }
        }

        let mut graph = Graph::new();
        let root = graph.add_node("Model".to_string());
        add_children(&mut graph, root, &self.root);
        format!("{}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
    }
}

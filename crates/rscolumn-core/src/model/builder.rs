//! Model builder for assembling a state and a process tree.

use crate::constants::SECONDS_PER_DAY;
use crate::errors::{ColumnError, ColumnResult};
use crate::field::{State, StateField};
use crate::process::{CompositeProcess, Process};
use log::info;

use super::runtime::Model;
use super::types::ErrorPolicy;
use super::validation::{count_processes, verify_tree};

/// Build a new model from a set of state fields and processes.
///
/// Problems are collected while the builder is configured and reported by
/// [`ModelBuilder::build`], which also checks every process against the state.
/// The builder is left empty after a build.
pub struct ModelBuilder {
    state: State,
    root: CompositeProcess,
    timestep: f64,
    policy: ErrorPolicy,
    parallel_siblings: bool,
    errors: Vec<ColumnError>,
}

impl ModelBuilder {
    /// Create a new model builder with default settings.
    ///
    /// The default timestep is one day.
    pub fn new() -> Self {
        Self {
            state: State::new(),
            root: CompositeProcess::new(),
            timestep: SECONDS_PER_DAY,
            policy: ErrorPolicy::default(),
            parallel_siblings: false,
            errors: vec![],
        }
    }

    /// Register a state field
    pub fn with_field(&mut self, field: StateField) -> &mut Self {
        if let Err(err) = self.state.add_field(field) {
            self.errors.push(err);
        }
        self
    }

    /// Register every field of an existing state
    pub fn with_state(&mut self, state: State) -> &mut Self {
        for field in state.iter() {
            self.with_field(field.clone());
        }
        self
    }

    /// Add a named top-level process
    pub fn with_process(&mut self, name: &str, process: impl Process + 'static) -> &mut Self {
        self.with_boxed_process(name, Box::new(process))
    }

    /// Add an already boxed top-level process
    pub fn with_boxed_process(&mut self, name: &str, process: Box<dyn Process>) -> &mut Self {
        if let Err(err) = self.root.add_subprocess(name, process) {
            self.errors.push(err);
        }
        self
    }

    /// Timestep in seconds
    pub fn with_timestep(&mut self, timestep: f64) -> &mut Self {
        self.timestep = timestep;
        self
    }

    pub fn with_error_policy(&mut self, policy: ErrorPolicy) -> &mut Self {
        self.policy = policy;
        self
    }

    /// Evaluate sibling processes in parallel
    ///
    /// Results are combined in insertion order so the outcome does not depend on
    /// this setting.
    pub fn with_parallel_siblings(&mut self, parallel: bool) -> &mut Self {
        self.parallel_siblings = parallel;
        self
    }

    /// Builds the model
    pub fn build(&mut self) -> ColumnResult<Model> {
        if !self.errors.is_empty() {
            let err = self.errors.remove(0);
            self.errors.clear();
            return Err(err);
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(ColumnError::invalid_parameter(
                "timestep",
                self.timestep,
                "must be positive and finite",
            ));
        }

        verify_tree(&self.state, &self.root, "")?;

        let state = std::mem::take(&mut self.state);
        let root = std::mem::take(&mut self.root);
        info!(
            "Built model with {} fields and {} processes (timestep {} s, {:?})",
            state.len(),
            count_processes(&root) - 1,
            self.timestep,
            self.policy
        );

        Ok(Model::new(
            state,
            root,
            self.timestep,
            self.policy,
            self.parallel_siblings,
        ))
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//! Processes are the unit of composition.
//!
//! A process reads shared state fields, computes tendencies (rates of change in
//! `[field unit] / s`) for some of them, and publishes diagnostics. Processes may own
//! named child processes; the [`Model`](crate::model::Model) walks the whole tree and
//! sums the tendencies.
//!
//! Everything a process reads or writes is registered up front in its [`ProcessSchema`].
//! Registration hands back handles which the process uses inside [`Process::compute`].

use crate::errors::{ColumnError, ColumnResult};
use crate::field::{FieldHandle, State};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

/// Separator between process names in a path
pub const PATH_SEPARATOR: char = '/';

/// Check that `name` can be used as a single path segment
pub fn check_process_name(name: &str) -> ColumnResult<()> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.contains(PATH_SEPARATOR) {
        "must not contain the path separator '/'"
    } else {
        return Ok(());
    };
    Err(ColumnError::InvalidProcessName {
        name: name.to_string(),
        reason: reason.to_string(),
    })
}

/// A named diagnostic slot registered by a process
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiagnosticHandle {
    name: String,
    len: usize,
}

impl DiagnosticHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The declared inputs and outputs of a process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessSchema {
    inputs: Vec<FieldHandle>,
    tendencies: Vec<FieldHandle>,
    diagnostics: Vec<DiagnosticHandle>,
    overrides: BTreeSet<String>,
}

impl ProcessSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a state field the process reads
    pub fn add_input(&mut self, field: &str, len: usize) -> FieldHandle {
        let handle = FieldHandle::new(field, len);
        if !self.inputs.contains(&handle) {
            self.inputs.push(handle.clone());
        }
        handle
    }

    /// Declare a state field the process contributes a tendency to
    pub fn add_tendency(&mut self, field: &str, len: usize) -> FieldHandle {
        let handle = FieldHandle::new(field, len);
        if !self.tendencies.contains(&handle) {
            self.tendencies.push(handle.clone());
        }
        handle
    }

    /// Declare a diagnostic the process publishes
    pub fn add_diagnostic(&mut self, name: &str, len: usize) -> DiagnosticHandle {
        let handle = DiagnosticHandle {
            name: name.to_string(),
            len,
        };
        if !self.diagnostics.contains(&handle) {
            self.diagnostics.push(handle.clone());
        }
        handle
    }

    /// Declare that this process replaces, rather than adds to, its children's
    /// tendency for `field`
    pub fn add_override(&mut self, field: &str) {
        self.overrides.insert(field.to_string());
    }

    pub fn inputs(&self) -> &[FieldHandle] {
        &self.inputs
    }

    pub fn tendencies(&self) -> &[FieldHandle] {
        &self.tendencies
    }

    pub fn diagnostics(&self) -> &[DiagnosticHandle] {
        &self.diagnostics
    }

    pub fn overrides(&self, field: &str) -> bool {
        self.overrides.contains(field)
    }

    /// Check that `output` only contains registered tendencies and diagnostics
    pub fn check_output(&self, process: &str, output: &ProcessOutput) -> ColumnResult<()> {
        for (name, values) in output.tendencies.iter() {
            let handle = self
                .tendencies
                .iter()
                .find(|h| h.name() == name)
                .ok_or_else(|| ColumnError::UndeclaredOutput {
                    process: process.to_string(),
                    kind: "tendency".to_string(),
                    name: name.clone(),
                })?;
            if handle.len() != values.len() {
                return Err(ColumnError::shape_mismatch(
                    format!("tendency '{}' of '{}'", name, process),
                    handle.len(),
                    values.len(),
                ));
            }
        }
        for (name, values) in output.diagnostics.iter() {
            let handle = self
                .diagnostics
                .iter()
                .find(|h| h.name() == name)
                .ok_or_else(|| ColumnError::UndeclaredOutput {
                    process: process.to_string(),
                    kind: "diagnostic".to_string(),
                    name: name.clone(),
                })?;
            if handle.len() != values.len() {
                return Err(ColumnError::shape_mismatch(
                    format!("diagnostic '{}' of '{}'", name, process),
                    handle.len(),
                    values.len(),
                ));
            }
        }
        Ok(())
    }
}

/// The result of a single [`Process::compute`] call
///
/// Created fresh on every call and never carried between timesteps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessOutput {
    pub tendencies: BTreeMap<String, Array1<f64>>,
    pub diagnostics: BTreeMap<String, Array1<f64>>,
}

impl ProcessOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the tendency for a registered field
    pub fn set_tendency(&mut self, handle: &FieldHandle, values: Array1<f64>) -> ColumnResult<()> {
        if values.len() != handle.len() {
            return Err(ColumnError::shape_mismatch(
                format!("tendency of {}", handle.name()),
                handle.len(),
                values.len(),
            ));
        }
        self.tendencies.insert(handle.name().to_string(), values);
        Ok(())
    }

    /// Record a registered diagnostic
    pub fn set_diagnostic(
        &mut self,
        handle: &DiagnosticHandle,
        values: Array1<f64>,
    ) -> ColumnResult<()> {
        if values.len() != handle.len() {
            return Err(ColumnError::shape_mismatch(
                format!("diagnostic {}", handle.name()),
                handle.len(),
                values.len(),
            ));
        }
        self.diagnostics.insert(handle.name().to_string(), values);
        Ok(())
    }

    /// Record a scalar diagnostic
    pub fn set_scalar_diagnostic(
        &mut self,
        handle: &DiagnosticHandle,
        value: f64,
    ) -> ColumnResult<()> {
        self.set_diagnostic(handle, Array1::from_elem(1, value))
    }

    pub fn tendency(&self, field: &str) -> Option<&Array1<f64>> {
        self.tendencies.get(field)
    }

    pub fn diagnostic(&self, name: &str) -> Option<&Array1<f64>> {
        self.diagnostics.get(name)
    }
}

/// Add `values` into the tendency for `field`, creating it if absent
pub(crate) fn accumulate(
    totals: &mut BTreeMap<String, Array1<f64>>,
    field: &str,
    values: &Array1<f64>,
) -> ColumnResult<()> {
    match totals.get_mut(field) {
        Some(existing) => {
            if existing.len() != values.len() {
                return Err(ColumnError::shape_mismatch(
                    format!("tendency of {}", field),
                    existing.len(),
                    values.len(),
                ));
            }
            *existing += values;
        }
        None => {
            totals.insert(field.to_string(), values.clone());
        }
    }
    Ok(())
}

/// A physical submodel
///
/// `compute` must be deterministic for a given state and parameter set, must not
/// mutate state, and must only return the tendencies and diagnostics registered
/// in its schema. It only computes the process's *own* contribution: children are
/// evaluated by the model, which then sums each child's contribution into the parent.
#[typetag::serde(tag = "type")]
pub trait Process: Debug + Send + Sync {
    /// Declared inputs, tendencies and diagnostics
    fn schema(&self) -> &ProcessSchema;

    /// Compute this process's own tendencies and diagnostics from the current state
    fn compute(&self, state: &State) -> ColumnResult<ProcessOutput>;

    /// Named child processes, in evaluation order
    fn subprocesses(&self) -> &[Subprocess] {
        &[]
    }
}

/// A named child process, exclusively owned by its parent
#[derive(Debug, Serialize, Deserialize)]
pub struct Subprocess {
    pub name: String,
    pub process: Box<dyn Process>,
}

/// A process whose only role is to own and group child processes
///
/// It contributes no tendencies of its own, so its total tendency is the sum of
/// its children's.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CompositeProcess {
    schema: ProcessSchema,
    children: Vec<Subprocess>,
}

impl CompositeProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named child
    ///
    /// Names must be non-empty, free of `/` and unique among siblings.
    pub fn add_subprocess(
        &mut self,
        name: impl Into<String>,
        process: Box<dyn Process>,
    ) -> ColumnResult<()> {
        let name = name.into();
        check_process_name(&name)?;
        if self.children.iter().any(|c| c.name == name) {
            return Err(ColumnError::DuplicateProcess(name));
        }
        self.children.push(Subprocess { name, process });
        Ok(())
    }

    /// Builder-style variant of [`CompositeProcess::add_subprocess`]
    pub fn with_subprocess(
        mut self,
        name: impl Into<String>,
        process: impl Process + 'static,
    ) -> ColumnResult<Self> {
        self.add_subprocess(name, Box::new(process))?;
        Ok(self)
    }

    /// Remove a child, handing ownership back to the caller
    pub fn remove_subprocess(&mut self, name: &str) -> Option<Box<dyn Process>> {
        let idx = self.children.iter().position(|c| c.name == name)?;
        Some(self.children.remove(idx).process)
    }

    pub fn subprocess(&self, name: &str) -> Option<&dyn Process> {
        self.children
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.process.as_ref())
    }
}

#[typetag::serde]
impl Process for CompositeProcess {
    fn schema(&self) -> &ProcessSchema {
        &self.schema
    }

    fn compute(&self, _state: &State) -> ColumnResult<ProcessOutput> {
        Ok(ProcessOutput::new())
    }

    fn subprocesses(&self) -> &[Subprocess] {
        &self.children
    }
}

/// Look up a process in a tree by its `/`-separated path
pub fn find_process<'a>(root: &'a dyn Process, path: &str) -> Option<&'a dyn Process> {
    path.split(PATH_SEPARATOR)
        .filter(|s| !s.is_empty())
        .try_fold(root, |node, name| {
            node.subprocesses()
                .iter()
                .find(|c| c.name == name)
                .map(|c| c.process.as_ref())
        })
}

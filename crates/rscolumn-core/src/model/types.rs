//! Type definitions for the model module.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub(crate) use crate::process::PATH_SEPARATOR;

/// What to do when a process fails during a step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorPolicy {
    /// Abort the step and return the error. The state is left untouched.
    #[default]
    Propagate,
    /// Drop the failing subtree's tendencies for this step, keep its diagnostics from
    /// the last successful evaluation and carry on with the rest of the tree.
    ///
    /// The failing process and all of its descendants are reported as stale, even
    /// descendants which computed successfully before their ancestor failed.
    MarkStale,
}

/// Join a child name onto its parent's path
pub(crate) fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", parent, PATH_SEPARATOR, name)
    }
}

/// The result of evaluating a process and everything below it
#[derive(Debug, Default)]
pub(crate) struct SubtreeEvaluation {
    /// Total tendencies of the subtree root
    pub tendencies: BTreeMap<String, Array1<f64>>,
    /// Freshly computed diagnostics, keyed by process path
    pub diagnostics: BTreeMap<String, BTreeMap<String, Array1<f64>>>,
    /// Paths of processes that failed and were skipped
    pub stale: Vec<String>,
}

impl SubtreeEvaluation {
    /// Fold a child's diagnostics and stale markers into this evaluation
    pub fn absorb(&mut self, child: SubtreeEvaluation) {
        self.diagnostics.extend(child.diagnostics);
        self.stale.extend(child.stale);
    }
}

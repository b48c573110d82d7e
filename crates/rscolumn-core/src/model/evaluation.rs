//! Evaluation of a process tree against a fixed state.

use crate::errors::ColumnResult;
use crate::field::State;
use crate::process::{accumulate, Process, Subprocess};
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;

use super::types::{child_path, ErrorPolicy, SubtreeEvaluation};

/// Settings that apply to a whole tree walk
#[derive(Debug, Clone, Copy)]
pub(crate) struct WalkOptions {
    pub policy: ErrorPolicy,
    pub parallel_siblings: bool,
}

fn evaluate_children(
    children: &[Subprocess],
    path: &str,
    state: &State,
    options: WalkOptions,
) -> Vec<(String, ColumnResult<SubtreeEvaluation>)> {
    let run = |child: &Subprocess| {
        let child_path = child_path(path, &child.name);
        let result = evaluate(child.process.as_ref(), &child_path, state, options);
        (child_path, result)
    };

    // `collect` on an indexed parallel iterator keeps insertion order, so the
    // result is identical to the sequential walk.
    if options.parallel_siblings && children.len() > 1 {
        children.par_iter().map(run).collect()
    } else {
        children.iter().map(run).collect()
    }
}

/// Paths of every process below `process`, none of which contributed this step
fn push_descendant_paths(process: &dyn Process, path: &str, out: &mut Vec<String>) {
    for child in process.subprocesses() {
        let path = child_path(path, &child.name);
        push_descendant_paths(child.process.as_ref(), &path, out);
        out.push(path);
    }
}

/// Evaluate `process` and all of its descendants
///
/// Children are evaluated first, then the process itself. A tendency the process
/// marks as an override replaces the children's sum for that field, otherwise the
/// process's own contribution is added to it.
pub(crate) fn evaluate(
    process: &dyn Process,
    path: &str,
    state: &State,
    options: WalkOptions,
) -> ColumnResult<SubtreeEvaluation> {
    let mut evaluation = SubtreeEvaluation::default();
    let mut children_total = BTreeMap::new();

    let children = process.subprocesses();
    let results = evaluate_children(children, path, state, options);
    for (child, (child_path, result)) in children.iter().zip(results) {
        match result {
            Ok(child) => {
                for (field, tendency) in child.tendencies.iter() {
                    accumulate(&mut children_total, field, tendency)?;
                }
                evaluation.absorb(child);
            }
            Err(err) => match options.policy {
                ErrorPolicy::Propagate => return Err(err),
                ErrorPolicy::MarkStale => {
                    warn!(
                        "Process '{}' failed and is marked stale for this step: {}",
                        child_path, err
                    );
                    push_descendant_paths(
                        child.process.as_ref(),
                        &child_path,
                        &mut evaluation.stale,
                    );
                    evaluation.stale.push(child_path);
                }
            },
        }
    }

    let schema = process.schema();
    let own = process.compute(state)?;
    schema.check_output(path, &own)?;

    for (field, tendency) in children_total.iter() {
        if schema.overrides(field) && own.tendencies.contains_key(field) {
            debug!(
                "Process '{}' overrides the tendency of its children for '{}'",
                path, field
            );
            continue;
        }
        accumulate(&mut evaluation.tendencies, field, tendency)?;
    }
    for (field, tendency) in own.tendencies.iter() {
        accumulate(&mut evaluation.tendencies, field, tendency)?;
    }

    if !own.diagnostics.is_empty() {
        evaluation.diagnostics.insert(path.to_string(), own.diagnostics);
    }

    Ok(evaluation)
}

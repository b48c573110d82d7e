//! Validation of a process tree against the shared state.

use crate::errors::{ColumnError, ColumnResult};
use crate::field::{FieldHandle, State};
use crate::process::{check_process_name, Process};
use log::debug;

use super::types::child_path;

fn verify_handle(state: &State, process: &str, handle: &FieldHandle) -> ColumnResult<()> {
    let field = state
        .get(handle.name())
        .ok_or_else(|| ColumnError::UnknownField(handle.name().to_string()))?;
    if field.len() != handle.len() {
        return Err(ColumnError::shape_mismatch(
            format!("field '{}' as registered by '{}'", handle.name(), process),
            handle.len(),
            field.len(),
        ));
    }
    Ok(())
}

/// Check that every field a process (or any descendant) reads or updates exists in
/// `state` with the registered length, and that every descendant has a usable name
pub(crate) fn verify_tree(state: &State, process: &dyn Process, path: &str) -> ColumnResult<()> {
    let schema = process.schema();
    for handle in schema.inputs().iter().chain(schema.tendencies()) {
        verify_handle(state, path, handle)?;
    }
    debug!(
        "Verified process '{}' ({} inputs, {} tendencies, {} diagnostics)",
        path,
        schema.inputs().len(),
        schema.tendencies().len(),
        schema.diagnostics().len()
    );

    for child in process.subprocesses() {
        check_process_name(&child.name)?;
        verify_tree(state, child.process.as_ref(), &child_path(path, &child.name))?;
    }
    Ok(())
}

/// Count the processes in a tree, including the root
pub(crate) fn count_processes(process: &dyn Process) -> usize {
    1 + process
        .subprocesses()
        .iter()
        .map(|c| count_processes(c.process.as_ref()))
        .sum::<usize>()
}

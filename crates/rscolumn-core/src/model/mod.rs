//! A model owns the shared state and a tree of processes.
//!
//! Each step happens in two phases. First every process in the tree is evaluated
//! against the same, unmodified state. Children are evaluated before their parent
//! (post-order, in insertion order) and each parent's total tendency is its own
//! contribution plus the sum of its children's. Only once the whole tree has been
//! evaluated are the root's total tendencies applied to the state.
//!
//! Diagnostics are kept per process and are addressed by the process's path in the
//! tree, e.g. `"Radiation/LW"`.

mod builder;
mod evaluation;
mod runtime;
mod types;
mod validation;

#[cfg(test)]
mod tests;

// Public re-exports
pub use builder::ModelBuilder;
pub use runtime::Model;
pub use types::ErrorPolicy;

pub mod constants;
pub mod errors;
pub mod field;
pub mod grid;
pub mod heat_capacity;
pub mod model;
pub mod parameters;
pub mod process;
pub mod thermo;

pub use errors::{ColumnError, ColumnResult};
pub use field::{FieldHandle, FieldKind, State, StateField};
pub use grid::Grid;
pub use model::{ErrorPolicy, Model, ModelBuilder};
pub use parameters::{ParameterSet, ParameterValue};
pub use process::{CompositeProcess, DiagnosticHandle, Process, ProcessOutput, ProcessSchema, Subprocess};

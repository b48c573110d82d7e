//! State fields and the shared field registry
//!
//! A [`StateField`] is a named array attached to a [`Grid`].
//! Fields live in a single [`State`] owned by the model; processes never hold copies,
//! they resolve fields by name through a [`FieldHandle`] whenever they compute.

use crate::errors::{ColumnError, ColumnResult};
use crate::grid::Grid;
use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name of the canonical surface temperature field
pub const TS: &str = "Ts";
/// Name of the canonical atmospheric temperature field
pub const TATM: &str = "Tatm";

/// The physical domain a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldKind {
    /// A single value for the column (e.g. slab ocean temperature)
    Surface,
    /// One value per atmospheric layer
    Atmosphere,
}

impl FieldKind {
    /// Number of values a field of this kind holds on `grid`
    pub fn len_on(&self, grid: &Grid) -> usize {
        match self {
            FieldKind::Surface => 1,
            FieldKind::Atmosphere => grid.num_levels(),
        }
    }
}

/// A named, grid-attached array of values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateField {
    name: String,
    kind: FieldKind,
    grid: Arc<Grid>,
    values: Array1<f64>,
}

impl StateField {
    /// Create a new field, checking that `values` matches the shape implied by `kind`
    pub fn new(
        name: impl Into<String>,
        kind: FieldKind,
        grid: Arc<Grid>,
        values: Array1<f64>,
    ) -> ColumnResult<Self> {
        let name = name.into();
        let expected = kind.len_on(&grid);
        if values.len() != expected {
            return Err(ColumnError::shape_mismatch(&name, expected, values.len()));
        }
        Ok(Self {
            name,
            kind,
            grid,
            values,
        })
    }

    /// Surface field holding a single value
    pub fn surface(name: impl Into<String>, grid: Arc<Grid>, value: f64) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Surface,
            grid,
            values: Array1::from_elem(1, value),
        }
    }

    /// Atmospheric field with one value per layer
    pub fn atmosphere(
        name: impl Into<String>,
        grid: Arc<Grid>,
        values: Array1<f64>,
    ) -> ColumnResult<Self> {
        Self::new(name, FieldKind::Atmosphere, grid, values)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn grid(&self) -> &Arc<Grid> {
        &self.grid
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Add `tendency * timestep` to every value
    ///
    /// Only the model calls this, during the apply phase of a step.
    pub(crate) fn apply_tendency(
        &mut self,
        tendency: ArrayView1<f64>,
        timestep: f64,
    ) -> ColumnResult<()> {
        if tendency.len() != self.values.len() {
            return Err(ColumnError::shape_mismatch(
                format!("tendency of {}", self.name),
                self.values.len(),
                tendency.len(),
            ));
        }
        self.values.scaled_add(timestep, &tendency);
        Ok(())
    }
}

/// The shared registry of state fields, keyed by name
///
/// This is very similar to a map of fields, but it enforces unique names and
/// only hands out read access to processes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    fields: BTreeMap<String, StateField>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new field
    ///
    /// Fails if a field with the same name already exists.
    pub fn add_field(&mut self, field: StateField) -> ColumnResult<()> {
        if self.fields.contains_key(field.name()) {
            return Err(ColumnError::DuplicateField(field.name().to_string()));
        }
        self.fields.insert(field.name().to_string(), field);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&StateField> {
        self.fields.get(name)
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut StateField> {
        self.fields.get_mut(name)
    }

    /// Test if the state contains a field with the given name
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Values of a field
    pub fn values(&self, name: &str) -> ColumnResult<ArrayView1<'_, f64>> {
        self.get(name)
            .map(|f| f.values())
            .ok_or_else(|| ColumnError::UnknownField(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateField> {
        self.fields.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A reference to a state field by name, returned by schema registration
///
/// The handle remembers the length the process expects, which is checked every time
/// the field is read.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldHandle {
    name: String,
    len: usize,
}

impl FieldHandle {
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        Self {
            name: name.into(),
            len,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Resolve the handle against the shared state
    pub fn read<'a>(&self, state: &'a State) -> ColumnResult<ArrayView1<'a, f64>> {
        let values = state.values(&self.name)?;
        if values.len() != self.len {
            return Err(ColumnError::shape_mismatch(&self.name, self.len, values.len()));
        }
        Ok(values)
    }

    /// Read a surface handle as a single scalar
    pub fn read_scalar(&self, state: &State) -> ColumnResult<f64> {
        let values = self.read(state)?;
        if values.len() != 1 {
            return Err(ColumnError::shape_mismatch(&self.name, 1, values.len()));
        }
        Ok(values[0])
    }
}

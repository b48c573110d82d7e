//! Parameter sets
//!
//! A [`ParameterSet`] is an immutable-after-construction mapping of named scalars and
//! arrays attached to a process. Parameter sets are usually loaded from TOML:
//!
//! ```
//! use rscolumn_core::parameters::ParameterSet;
//!
//! let params = ParameterSet::from_toml_str(
//!     r#"
//!     water_depth = 1.0
//!     albedo = 0.3
//!     eps = [0.2, 0.4, 0.6]
//!     "#,
//! )
//! .unwrap();
//!
//! assert_eq!(params.get_scalar("albedo").unwrap(), 0.3);
//! assert_eq!(params.broadcast("eps", 3).unwrap().len(), 3);
//! ```

use crate::errors::{ColumnError, ColumnResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A scalar or per-layer parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Scalar(f64),
    Array(Vec<f64>),
}

impl ParameterValue {
    /// Broadcast the value to an array of length `len`
    ///
    /// Scalars are repeated; arrays must already have exactly `len` elements.
    /// Arrays are never truncated or padded.
    pub fn broadcast(&self, what: &str, len: usize) -> ColumnResult<Array1<f64>> {
        match self {
            ParameterValue::Scalar(v) => Ok(Array1::from_elem(len, *v)),
            ParameterValue::Array(values) => {
                if values.len() != len {
                    return Err(ColumnError::shape_mismatch(what, len, values.len()));
                }
                Ok(Array1::from_vec(values.clone()))
            }
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            ParameterValue::Scalar(v) => Some(*v),
            ParameterValue::Array(_) => None,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, ParameterValue::Scalar(_))
    }

    /// Iterate over every number held by the value
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        let slice: &[f64] = match self {
            ParameterValue::Scalar(v) => std::slice::from_ref(v),
            ParameterValue::Array(values) => values,
        };
        slice.iter().copied()
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Scalar(value)
    }
}

impl From<Vec<f64>> for ParameterValue {
    fn from(value: Vec<f64>) -> Self {
        ParameterValue::Array(value)
    }
}

/// Named physical parameters attached to a process
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, ParameterValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a parameter set from a TOML document of `name = value` pairs
    pub fn from_toml_str(s: &str) -> ColumnResult<Self> {
        toml::from_str(s).map_err(|e| ColumnError::Config(e.to_string()))
    }

    /// Add or replace a parameter, consuming the set
    pub fn with(mut self, name: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Combine two sets; values in `other` take precedence
    pub fn merged(mut self, other: &ParameterSet) -> Self {
        for (k, v) in other.values.iter() {
            self.values.insert(k.clone(), v.clone());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Get a required scalar parameter
    pub fn get_scalar(&self, name: &str) -> ColumnResult<f64> {
        match self.values.get(name) {
            Some(ParameterValue::Scalar(v)) => Ok(*v),
            Some(ParameterValue::Array(values)) => {
                Err(ColumnError::shape_mismatch(name, "a scalar", values.len()))
            }
            None => Err(ColumnError::MissingParameter(name.to_string())),
        }
    }

    /// Get an optional scalar parameter, falling back to `default` if absent
    pub fn scalar_or(&self, name: &str, default: f64) -> ColumnResult<f64> {
        match self.values.get(name) {
            None => Ok(default),
            Some(_) => self.get_scalar(name),
        }
    }

    /// Broadcast a required scalar-or-array parameter to length `len`
    pub fn broadcast(&self, name: &str, len: usize) -> ColumnResult<Array1<f64>> {
        self.values
            .get(name)
            .ok_or_else(|| ColumnError::MissingParameter(name.to_string()))?
            .broadcast(name, len)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

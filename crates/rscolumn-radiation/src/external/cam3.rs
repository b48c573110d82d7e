//! Array layout of CAM3-style radiation libraries
//!
//! The library works on `(level, latitude, longitude)` arrays with levels ordered
//! from the top of the atmosphere down, the same vertical order used by the
//! column. Only a single longitude is supported.
//!
//! | column side        | library side        |
//! |--------------------|---------------------|
//! | layers `(KM,)`     | `(KM, 1, 1)`        |
//! | layers `(JM, KM)`  | `(KM, JM, 1)`       |
//! | surface `(1,)`     | `(1, 1)`            |
//! | surface `(JM,)`    | `(JM, 1)`           |
//!
//! A single column is replicated across latitudes when `JM > 1`.

use super::{unsupported_shape, ColumnLayout};
use ndarray::{Array2, ArrayD, ArrayViewD, Axis, Ix2};
use rscolumn_core::errors::{ColumnError, ColumnResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cam3Layout {
    /// Number of layers (KM)
    pub num_levels: usize,
    /// Number of latitudes (JM)
    pub num_lat: usize,
}

impl Cam3Layout {
    pub fn new(num_levels: usize, num_lat: usize) -> Self {
        Self {
            num_levels,
            num_lat,
        }
    }

    /// Arrange a vertical field as `(JM, K)`
    fn by_latitude(&self, values: ArrayViewD<f64>, k: usize) -> ColumnResult<Array2<f64>> {
        let jm = self.num_lat;
        let expected = format!("({},) or ({}, {})", k, jm, k);
        let shape = values.shape().to_vec();
        match *shape.as_slice() {
            [n] if n == k => values
                .broadcast((jm, k))
                .map(|v| v.to_owned())
                .ok_or_else(|| unsupported_shape("CAM3 column", expected, &shape)),
            [j, n] if j == jm && n == k => values
                .into_dimensionality::<Ix2>()
                .map(|v| v.to_owned())
                .map_err(|e| ColumnError::shape_mismatch("CAM3 column", expected, e)),
            [_] | [_, _] => Err(unsupported_shape("CAM3 column", expected, &shape)),
            _ => Err(unsupported_shape(
                "CAM3 column (longitude is not supported)",
                expected,
                &shape,
            )),
        }
    }

    fn vertical_to_library(&self, values: ArrayViewD<f64>, k: usize) -> ColumnResult<ArrayD<f64>> {
        let by_lat = self.by_latitude(values, k)?;
        Ok(by_lat
            .reversed_axes()
            .insert_axis(Axis(2))
            .as_standard_layout()
            .into_owned()
            .into_dyn())
    }
}

impl ColumnLayout for Cam3Layout {
    fn num_levels(&self) -> usize {
        self.num_levels
    }

    fn layers_to_library(&self, values: ArrayViewD<f64>) -> ColumnResult<ArrayD<f64>> {
        self.vertical_to_library(values, self.num_levels)
    }

    fn boundaries_to_library(&self, values: ArrayViewD<f64>) -> ColumnResult<ArrayD<f64>> {
        self.vertical_to_library(values, self.num_levels + 1)
    }

    fn surface_to_library(&self, values: ArrayViewD<f64>) -> ColumnResult<ArrayD<f64>> {
        let jm = self.num_lat;
        let expected = format!("(1,) or ({},)", jm);
        let shape = values.shape().to_vec();
        match *shape.as_slice() {
            [n] if n == 1 || n == jm => values
                .broadcast(jm)
                .map(|v| v.to_owned().insert_axis(Axis(1)).into_dyn())
                .ok_or_else(|| unsupported_shape("CAM3 surface", expected, &shape)),
            _ => Err(unsupported_shape("CAM3 surface", expected, &shape)),
        }
    }

    fn from_library(&self, values: ArrayD<f64>) -> ColumnResult<ArrayD<f64>> {
        let jm = self.num_lat;
        let shape = values.shape().to_vec();
        match *shape.as_slice() {
            [_, j, 1] if j == jm => {
                let plane = values.index_axis(Axis(2), 0);
                if jm == 1 {
                    Ok(plane.index_axis(Axis(1), 0).to_owned())
                } else {
                    Ok(plane.reversed_axes().as_standard_layout().into_owned())
                }
            }
            _ => Err(unsupported_shape(
                "CAM3 output",
                format!("(K, {}, 1)", jm),
                &shape,
            )),
        }
    }
}

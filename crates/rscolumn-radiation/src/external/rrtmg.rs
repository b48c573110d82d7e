//! Array layout of RRTMG-style radiation libraries
//!
//! The library works on `(column, level)` arrays with levels ordered from the
//! surface upwards, so the vertical axis is flipped on the way in and out.
//!
//! | column side        | library side             |
//! |--------------------|--------------------------|
//! | layers `(K,)`      | `(1, K)`, flipped        |
//! | layers `(JM, K)`   | `(JM, K)`, flipped       |
//! | surface `(JM,)`    | `(JM,)`                  |

use super::{unsupported_shape, ColumnLayout};
use ndarray::{ArrayD, ArrayViewD, Axis, Slice};
use rscolumn_core::errors::ColumnResult;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RrtmgLayout {
    pub num_levels: usize,
}

impl RrtmgLayout {
    pub fn new(num_levels: usize) -> Self {
        Self { num_levels }
    }

    fn vertical_to_library(&self, values: ArrayViewD<f64>, k: usize) -> ColumnResult<ArrayD<f64>> {
        let expected = format!("({},) or (JM, {})", k, k);
        let shape = values.shape().to_vec();
        let columns = match *shape.as_slice() {
            [n] if n == k => values.insert_axis(Axis(0)),
            [_, n] if n == k => values,
            [_] | [_, _] => return Err(unsupported_shape("RRTMG column", expected, &shape)),
            _ => {
                return Err(unsupported_shape(
                    "RRTMG column (longitude is not supported)",
                    expected,
                    &shape,
                ))
            }
        };
        Ok(flip_vertical(columns))
    }
}

/// Reverse the last axis
fn flip_vertical(values: ArrayViewD<f64>) -> ArrayD<f64> {
    let last = Axis(values.ndim() - 1);
    values
        .slice_axis(last, Slice::new(0, None, -1))
        .as_standard_layout()
        .into_owned()
}

impl ColumnLayout for RrtmgLayout {
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
        if values.ndim() != 1 {
            return Err(unsupported_shape("RRTMG surface", "(JM,)", values.shape()));
        }
        Ok(values.to_owned())
    }

    fn from_library(&self, values: ArrayD<f64>) -> ColumnResult<ArrayD<f64>> {
        let shape = values.shape().to_vec();
        match *shape.as_slice() {
            [1, _] => Ok(flip_vertical(values.index_axis(Axis(0), 0))),
            [_, _] => Ok(flip_vertical(values.view())),
            _ => Err(unsupported_shape("RRTMG output", "(JM, K)", &shape)),
        }
    }
}

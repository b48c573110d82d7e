//! Vertical pressure grid
//!
//! Layers are numbered from the top of the atmosphere (index 0) down to the layer
//! nearest the surface (index `N - 1`). Boundaries are numbered `0..=N`, with
//! boundary 0 at the top of the atmosphere and boundary `N` at the surface.

use crate::errors::{ColumnError, ColumnResult};
use ndarray::{Array, Array1};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A column of pressure layers (mb)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridBounds", into = "GridBounds")]
pub struct Grid {
    lev: Array1<f64>,
    lev_bounds: Array1<f64>,
    delta: Array1<f64>,
}

#[derive(Serialize, Deserialize)]
struct GridBounds {
    lev_bounds: Vec<f64>,
}

impl TryFrom<GridBounds> for Grid {
    type Error = ColumnError;

    fn try_from(value: GridBounds) -> Result<Self, Self::Error> {
        Grid::from_bounds(Array1::from_vec(value.lev_bounds))
    }
}

impl From<Grid> for GridBounds {
    fn from(value: Grid) -> Self {
        GridBounds {
            lev_bounds: value.lev_bounds.to_vec(),
        }
    }
}

impl Grid {
    /// Build a grid from its layer boundaries
    ///
    /// The boundaries must be strictly increasing and contain at least two values.
    /// Layer midpoints are placed halfway between adjacent boundaries.
    pub fn from_bounds(lev_bounds: Array1<f64>) -> ColumnResult<Self> {
        if lev_bounds.len() < 2 {
            return Err(ColumnError::shape_mismatch(
                "lev_bounds",
                "at least 2 boundaries",
                lev_bounds.len(),
            ));
        }
        // NaN compares as unordered and is rejected along with repeated values
        let increasing =
            |i: usize| lev_bounds[i].partial_cmp(&lev_bounds[i - 1]) == Some(Ordering::Greater);
        if let Some(i) = (1..lev_bounds.len()).find(|&i| !increasing(i)) {
            return Err(ColumnError::invalid_parameter(
                "lev_bounds",
                lev_bounds[i],
                format!("boundaries must be strictly increasing (index {})", i),
            ));
        }

        let n = lev_bounds.len() - 1;
        let lev = Array1::from_iter((0..n).map(|i| 0.5 * (lev_bounds[i] + lev_bounds[i + 1])));
        let delta = Array1::from_iter((0..n).map(|i| lev_bounds[i + 1] - lev_bounds[i]));

        Ok(Self {
            lev,
            lev_bounds,
            delta,
        })
    }

    /// Evenly spaced layers between the top of the atmosphere (0 mb) and `surface_pressure`
    pub fn evenly_spaced(num_levels: usize, surface_pressure: f64) -> ColumnResult<Self> {
        if num_levels == 0 {
            return Err(ColumnError::shape_mismatch(
                "num_levels",
                "at least 1 layer",
                0,
            ));
        }
        if !(surface_pressure > 0.0) {
            return Err(ColumnError::invalid_parameter(
                "surface_pressure",
                surface_pressure,
                "must be positive",
            ));
        }
        Self::from_bounds(Array::linspace(0.0, surface_pressure, num_levels + 1))
    }

    /// Number of layers
    pub fn num_levels(&self) -> usize {
        self.lev.len()
    }

    /// Layer midpoint pressures
    pub fn lev(&self) -> &Array1<f64> {
        &self.lev
    }

    /// Layer boundary pressures
    pub fn lev_bounds(&self) -> &Array1<f64> {
        &self.lev_bounds
    }

    /// Layer thickness in pressure units
    pub fn delta(&self) -> &Array1<f64> {
        &self.delta
    }

    /// Pressure at the lowest boundary
    pub fn surface_pressure(&self) -> f64 {
        self.lev_bounds[self.lev_bounds.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn evenly_spaced_grid() {
        let grid = Grid::evenly_spaced(4, 1000.0).unwrap();
        assert_eq!(grid.num_levels(), 4);
        assert_eq!(grid.lev_bounds().len(), 5);
        assert_relative_eq!(grid.lev()[0], 125.0);
        assert_relative_eq!(grid.lev()[3], 875.0);
        assert!(grid.delta().iter().all(|d| (d - 250.0).abs() < 1e-10));
        assert_relative_eq!(grid.surface_pressure(), 1000.0);
    }

    #[test]
    fn midpoints_lie_within_bounds() {
        let grid = Grid::from_bounds(array![0.0, 10.0, 100.0, 500.0, 1000.0]).unwrap();
        for i in 0..grid.num_levels() {
            assert!(grid.lev()[i] > grid.lev_bounds()[i]);
            assert!(grid.lev()[i] < grid.lev_bounds()[i + 1]);
        }
        assert_relative_eq!(grid.delta()[2], 400.0);
    }

    #[test]
    fn rejects_non_increasing_bounds() {
        let res = Grid::from_bounds(array![0.0, 500.0, 500.0, 1000.0]);
        assert!(matches!(res, Err(ColumnError::InvalidParameter { .. })));

        for bounds in [
            array![0.0, f64::NAN, 1000.0],
            array![f64::NAN, 500.0, 1000.0],
            array![0.0, 500.0, f64::NAN],
        ] {
            let res = Grid::from_bounds(bounds);
            assert!(matches!(res, Err(ColumnError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn rejects_empty_grids() {
        assert!(matches!(
            Grid::from_bounds(array![1000.0]),
            Err(ColumnError::ShapeMismatch { .. })
        ));
        assert!(Grid::evenly_spaced(0, 1000.0).is_err());
        assert!(Grid::evenly_spaced(3, -1.0).is_err());
    }

    #[test]
    fn serialises_as_bounds() {
        let grid = Grid::evenly_spaced(2, 1000.0).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"{"lev_bounds":[0.0,500.0,1000.0]}"#);
        let parsed: Grid = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, grid);

        let invalid = serde_json::from_str::<Grid>(r#"{"lev_bounds":[1000.0,0.0]}"#);
        assert!(invalid.is_err());
    }
}

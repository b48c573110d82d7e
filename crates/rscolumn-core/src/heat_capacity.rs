//! Heat capacities (J / m^2 / K)
//!
//! Used to convert absorbed flux (W / m^2) into a temperature tendency (K / s).

use crate::constants::{CP, CW, G, MB_TO_PA, RHO_W};
use crate::errors::{ColumnError, ColumnResult};
use crate::field::{FieldKind, StateField};
use crate::parameters::ParameterSet;
use ndarray::Array1;

/// Parameter holding the slab ocean depth (m)
pub const WATER_DEPTH: &str = "water_depth";

/// Heat capacity of a slab of water `water_depth` metres deep
pub fn slab_ocean(water_depth: f64) -> f64 {
    RHO_W * CW * water_depth
}

/// Heat capacity of atmospheric layers with pressure thickness `delta` (mb)
pub fn atmosphere(delta: &Array1<f64>) -> Array1<f64> {
    delta.mapv(|dp| CP * dp * MB_TO_PA / G)
}

/// Heat capacity for each value of `field`
///
/// Surface fields are treated as a slab ocean whose depth is read from the
/// `water_depth` parameter. Atmospheric fields derive their capacity from the
/// pressure thickness of each layer.
pub fn capacity_for(field: &StateField, params: &ParameterSet) -> ColumnResult<Array1<f64>> {
    match field.kind() {
        FieldKind::Surface => {
            let depth = params.get_scalar(WATER_DEPTH)?;
            if !(depth > 0.0) {
                return Err(ColumnError::invalid_parameter(
                    WATER_DEPTH,
                    depth,
                    "must be positive",
                ));
            }
            Ok(Array1::from_elem(field.len(), slab_ocean(depth)))
        }
        FieldKind::Atmosphere => Ok(atmosphere(field.grid().delta())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{TATM, TS};
    use crate::grid::Grid;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    #[test]
    fn slab_ocean_capacity() {
        assert_relative_eq!(slab_ocean(1.0), 4.1813e6);
        assert_relative_eq!(slab_ocean(10.0), 10.0 * slab_ocean(1.0));
    }

    #[test]
    fn surface_requires_water_depth() {
        let grid = Arc::new(Grid::evenly_spaced(2, 1000.0).unwrap());
        let ts = StateField::surface(TS, grid, 288.0);

        assert_eq!(
            capacity_for(&ts, &ParameterSet::new()),
            Err(ColumnError::MissingParameter(WATER_DEPTH.to_string()))
        );
        assert!(capacity_for(&ts, &ParameterSet::new().with(WATER_DEPTH, 0.0)).is_err());

        let c = capacity_for(&ts, &ParameterSet::new().with(WATER_DEPTH, 2.5)).unwrap();
        assert_eq!(c.len(), 1);
        assert_relative_eq!(c[0], slab_ocean(2.5));
    }

    #[test]
    fn atmosphere_capacity_follows_layer_thickness() {
        let grid = Arc::new(Grid::from_bounds(ndarray::array![0.0, 200.0, 1000.0]).unwrap());
        let tatm =
            StateField::atmosphere(TATM, grid, ndarray::array![220.0, 270.0]).unwrap();
        let c = capacity_for(&tatm, &ParameterSet::new()).unwrap();
        assert_relative_eq!(c[0], CP * 200.0 * 100.0 / G);
        assert_relative_eq!(c[1] / c[0], 4.0);
    }
}

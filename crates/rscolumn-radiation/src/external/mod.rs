//! Adapters for compiled radiation libraries.
//!
//! The libraries themselves are opaque: an [`ExternalRadiationSolver`] receives
//! arrays already arranged the way the library expects and returns boundary fluxes
//! in that same arrangement. [`ExternalScheme`] does the marshalling in both
//! directions using a [`ColumnLayout`], and checks whatever comes back before it
//! reaches the rest of the model.

mod cam3;
mod data;
mod rrtmg;

pub use cam3::Cam3Layout;
pub use data::SolverData;
pub use rrtmg::RrtmgLayout;

use crate::transfer::{Band, BandFluxes, Column, FluxResult, RadiativeTransfer};
use ndarray::{Array1, ArrayD, ArrayView1, ArrayViewD, Ix1};
use rscolumn_core::errors::{check_unit_interval, ColumnError, ColumnResult};
use rscolumn_core::grid::Grid;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

pub(crate) fn unsupported_shape(what: &str, expected: impl Display, found: &[usize]) -> ColumnError {
    ColumnError::shape_mismatch(what, expected, format!("{:?}", found))
}

/// Conversion between column ordering and a library's array ordering
///
/// On the column side, vertical fields are `(K,)` for a single column or
/// `(JM, K)` for several, ordered from the top of the atmosphere down.
pub trait ColumnLayout {
    /// Number of layers in a column
    fn num_levels(&self) -> usize;

    /// Arrange a field with one value per layer
    fn layers_to_library(&self, values: ArrayViewD<f64>) -> ColumnResult<ArrayD<f64>>;

    /// Arrange a field with one value per layer boundary
    fn boundaries_to_library(&self, values: ArrayViewD<f64>) -> ColumnResult<ArrayD<f64>>;

    /// Arrange a surface field
    fn surface_to_library(&self, values: ArrayViewD<f64>) -> ColumnResult<ArrayD<f64>>;

    /// Bring a vertical field from the library back to column ordering
    fn from_library(&self, values: ArrayD<f64>) -> ColumnResult<ArrayD<f64>>;
}

/// The layouts supported by [`ExternalScheme`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibraryLayout {
    Cam3(Cam3Layout),
    Rrtmg(RrtmgLayout),
}

impl LibraryLayout {
    fn inner(&self) -> &dyn ColumnLayout {
        match self {
            LibraryLayout::Cam3(layout) => layout,
            LibraryLayout::Rrtmg(layout) => layout,
        }
    }
}

impl ColumnLayout for LibraryLayout {
    fn num_levels(&self) -> usize {
        self.inner().num_levels()
    }

    fn layers_to_library(&self, values: ArrayViewD<f64>) -> ColumnResult<ArrayD<f64>> {
        self.inner().layers_to_library(values)
    }

    fn boundaries_to_library(&self, values: ArrayViewD<f64>) -> ColumnResult<ArrayD<f64>> {
        self.inner().boundaries_to_library(values)
    }

    fn surface_to_library(&self, values: ArrayViewD<f64>) -> ColumnResult<ArrayD<f64>> {
        self.inner().surface_to_library(values)
    }

    fn from_library(&self, values: ArrayD<f64>) -> ColumnResult<ArrayD<f64>> {
        self.inner().from_library(values)
    }
}

/// Temperature on every layer boundary (K)
///
/// Interior boundaries are linearly interpolated in pressure between the adjacent
/// layer midpoints. The top boundary takes the temperature of the top layer and
/// the bottom boundary the surface temperature.
pub fn interface_temperature(ts: f64, tatm: ArrayView1<f64>, grid: &Grid) -> ColumnResult<Array1<f64>> {
    let n = grid.num_levels();
    if tatm.len() != n {
        return Err(ColumnError::shape_mismatch("atmospheric temperature", n, tatm.len()));
    }
    let lev = grid.lev();
    let bounds = grid.lev_bounds();
    Ok(Array1::from_shape_fn(n + 1, |j| {
        if j == 0 {
            tatm[0]
        } else if j == n {
            ts
        } else {
            let weight = (bounds[j] - lev[j - 1]) / (lev[j] - lev[j - 1]);
            tatm[j - 1] + weight * (tatm[j] - tatm[j - 1])
        }
    }))
}

/// Everything passed to a library, already in library ordering
#[derive(Debug, Clone, PartialEq)]
pub struct SolverInput {
    /// Layer temperature (K)
    pub tatm: ArrayD<f64>,
    /// Surface temperature (K)
    pub ts: ArrayD<f64>,
    /// Boundary temperature (K)
    pub t_interface: ArrayD<f64>,
    /// Layer midpoint pressure (mb)
    pub lev: ArrayD<f64>,
    /// Layer boundary pressure (mb)
    pub lev_bounds: ArrayD<f64>,
    pub albedo: f64,
    /// Insolation at the top of the atmosphere (W/m^2)
    pub insolation: f64,
    pub band: Band,
}

/// Boundary fluxes returned by a library, in library ordering
///
/// Bands that were not requested may be left empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolverOutput {
    pub lw_up: Option<ArrayD<f64>>,
    pub lw_down: Option<ArrayD<f64>>,
    pub sw_up: Option<ArrayD<f64>>,
    pub sw_down: Option<ArrayD<f64>>,
}

/// A compiled radiation library
///
/// Implementations should report library failures as
/// [`ColumnError::ExternalSolverFailure`] and must never fill in plausible values
/// for a failed call. Any timeout policy belongs to the implementation.
#[typetag::serde(tag = "solver")]
pub trait ExternalRadiationSolver: Debug + Send + Sync {
    /// Name used in error messages
    fn name(&self) -> &str;

    fn solve(&self, input: &SolverInput) -> ColumnResult<SolverOutput>;
}

/// A radiative transfer scheme backed by an external library
#[derive(Debug, Serialize, Deserialize)]
pub struct ExternalScheme {
    solver: Box<dyn ExternalRadiationSolver>,
    layout: LibraryLayout,
    albedo: f64,
    insolation: f64,
}

impl ExternalScheme {
    pub fn new(
        solver: Box<dyn ExternalRadiationSolver>,
        layout: LibraryLayout,
        albedo: f64,
        insolation: f64,
    ) -> ColumnResult<Self> {
        check_unit_interval("albedo", albedo)?;
        if !(insolation.is_finite() && insolation >= 0.0) {
            return Err(ColumnError::invalid_parameter(
                "insolation",
                insolation,
                "must be non-negative and finite",
            ));
        }
        Ok(Self {
            solver,
            layout,
            albedo,
            insolation,
        })
    }

    pub fn layout(&self) -> LibraryLayout {
        self.layout
    }

    fn failure(&self, reason: impl Into<String>) -> ColumnError {
        ColumnError::ExternalSolverFailure {
            solver: self.solver.name().to_string(),
            reason: reason.into(),
        }
    }

    /// Marshal a column into library ordering
    pub fn prepare(&self, column: &Column, band: Band) -> ColumnResult<SolverInput> {
        let n = self.layout.num_levels();
        if column.grid.num_levels() != n {
            return Err(ColumnError::shape_mismatch(
                "grid for external solver",
                n,
                column.grid.num_levels(),
            ));
        }
        let t_interface = interface_temperature(column.ts, column.tatm, column.grid)?;
        let ts = Array1::from_elem(1, column.ts);

        Ok(SolverInput {
            tatm: self.layout.layers_to_library(column.tatm.into_dyn())?,
            ts: self.layout.surface_to_library(ts.view().into_dyn())?,
            t_interface: self.layout.boundaries_to_library(t_interface.view().into_dyn())?,
            lev: self.layout.layers_to_library(column.grid.lev().view().into_dyn())?,
            lev_bounds: self
                .layout
                .boundaries_to_library(column.grid.lev_bounds().view().into_dyn())?,
            albedo: self.albedo,
            insolation: self.insolation,
            band,
        })
    }

    /// Bring one returned flux array back to column ordering and check it
    fn collect(&self, values: Option<ArrayD<f64>>, name: &str) -> ColumnResult<Array1<f64>> {
        let values = values.ok_or_else(|| self.failure(format!("no {} returned", name)))?;
        let values = self
            .layout
            .from_library(values)
            .map_err(|e| self.failure(format!("{} has an unexpected shape: {}", name, e)))?
            .into_dimensionality::<Ix1>()
            .map_err(|e| self.failure(format!("{} is not a single column: {}", name, e)))?;

        let expected = self.layout.num_levels() + 1;
        if values.len() != expected {
            return Err(self.failure(format!(
                "{} has {} boundaries, expected {}",
                name,
                values.len(),
                expected
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(self.failure(format!("{} contains non-finite values", name)));
        }
        Ok(values)
    }
}

#[typetag::serde]
impl RadiativeTransfer for ExternalScheme {
    fn compute_fluxes(&self, column: &Column, band: Band) -> ColumnResult<FluxResult> {
        let input = self.prepare(column, band)?;
        let output = self.solver.solve(&input)?;

        let mut result = FluxResult::default();
        if band.includes_longwave() {
            result.longwave = Some(BandFluxes::new(
                self.collect(output.lw_up, "lw_up")?,
                self.collect(output.lw_down, "lw_down")?,
            )?);
        }
        if band.includes_shortwave() {
            result.shortwave = Some(BandFluxes::new(
                self.collect(output.sw_up, "sw_up")?,
                self.collect(output.sw_down, "sw_down")?,
            )?);
        }
        Ok(result)
    }
}

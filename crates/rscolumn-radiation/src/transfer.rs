//! The radiative transfer capability
//!
//! A [`RadiativeTransfer`] scheme turns a column's temperatures into boundary fluxes.
//! The grey-gas closed form and the external-library adapters are independent
//! implementations; a radiation process holds whichever one it is given.

use crate::flux::{convergence, longwave_fluxes, shortwave_fluxes, LongwaveFluxes, ShortwaveFluxes};
use crate::parameters::GreyRadiationParameters;
use crate::transmissivity::Transmissivity;
use ndarray::{Array1, ArrayView1};
use rscolumn_core::errors::{check_unit_interval, ColumnError, ColumnResult};
use rscolumn_core::grid::Grid;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Spectral bands a radiation process is responsible for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    Longwave,
    Shortwave,
    #[default]
    Both,
}

impl Band {
    pub fn includes_longwave(&self) -> bool {
        matches!(self, Band::Longwave | Band::Both)
    }

    pub fn includes_shortwave(&self) -> bool {
        matches!(self, Band::Shortwave | Band::Both)
    }
}

/// The column a scheme computes fluxes for
#[derive(Debug, Clone, Copy)]
pub struct Column<'a> {
    /// Surface temperature (K)
    pub ts: f64,
    /// Layer temperatures (K), top of atmosphere first
    pub tatm: ArrayView1<'a, f64>,
    pub grid: &'a Grid,
}

/// Upward and downward flux on every boundary, top of atmosphere first
#[derive(Debug, Clone, PartialEq)]
pub struct BandFluxes {
    pub up: Array1<f64>,
    pub down: Array1<f64>,
}

impl BandFluxes {
    pub fn new(up: Array1<f64>, down: Array1<f64>) -> ColumnResult<Self> {
        if up.len() != down.len() || up.len() < 2 {
            return Err(ColumnError::shape_mismatch(
                "boundary fluxes",
                format!("two equal arrays of at least 2 boundaries (up has {})", up.len()),
                down.len(),
            ));
        }
        Ok(Self { up, down })
    }

    pub fn num_layers(&self) -> usize {
        self.up.len() - 1
    }

    /// Net flux convergence in each layer (W / m^2)
    pub fn absorbed_atm(&self) -> Array1<f64> {
        convergence(&self.up, &self.down)
    }

    /// Net flux into the surface (W / m^2)
    pub fn absorbed_sfc(&self) -> f64 {
        let n = self.num_layers();
        self.down[n] - self.up[n]
    }

    pub fn up_toa(&self) -> f64 {
        self.up[0]
    }

    pub fn down_toa(&self) -> f64 {
        self.down[0]
    }

    pub fn down_sfc(&self) -> f64 {
        self.down[self.num_layers()]
    }
}

impl From<LongwaveFluxes> for BandFluxes {
    fn from(value: LongwaveFluxes) -> Self {
        Self {
            up: value.up,
            down: value.down,
        }
    }
}

impl From<ShortwaveFluxes> for BandFluxes {
    fn from(value: ShortwaveFluxes) -> Self {
        Self {
            up: value.up,
            down: value.down,
        }
    }
}

/// Outgoing longwave radiation separated by source (W / m^2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OlrSplit {
    pub surface: f64,
    pub atmosphere: f64,
}

/// The output of a radiative transfer calculation
///
/// Bands that were not requested are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FluxResult {
    pub longwave: Option<BandFluxes>,
    pub shortwave: Option<BandFluxes>,
    /// Planetary albedo, if the scheme can report it without incoming sunlight
    pub planetary_albedo: Option<f64>,
    /// OLR split into surface and atmospheric emission, if the scheme tracks it
    pub olr_split: Option<OlrSplit>,
}

impl FluxResult {
    /// Planetary albedo as reported by the scheme, or from the shortwave fluxes
    ///
    /// Zero when neither is available.
    pub fn planetary_albedo(&self) -> f64 {
        match (self.planetary_albedo, &self.shortwave) {
            (Some(albedo), _) => albedo,
            (None, Some(sw)) if sw.down_toa() > 0.0 => sw.up_toa() / sw.down_toa(),
            _ => 0.0,
        }
    }
}

/// Capability to compute longwave and shortwave fluxes for a column
#[typetag::serde(tag = "scheme")]
pub trait RadiativeTransfer: Debug + Send + Sync {
    fn compute_fluxes(&self, column: &Column, band: Band) -> ColumnResult<FluxResult>;
}

/// Grey-gas radiation with independent longwave and shortwave absorptivity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreyGas {
    longwave: Transmissivity,
    shortwave: Transmissivity,
    albedo: f64,
    insolation: f64,
}

impl GreyGas {
    pub fn new(
        longwave: Transmissivity,
        shortwave: Transmissivity,
        albedo: f64,
        insolation: f64,
    ) -> ColumnResult<Self> {
        if longwave.num_layers() != shortwave.num_layers() {
            return Err(ColumnError::shape_mismatch(
                "shortwave absorptivity",
                longwave.num_layers(),
                shortwave.num_layers(),
            ));
        }
        check_unit_interval("albedo", albedo)?;
        if !(insolation.is_finite() && insolation >= 0.0) {
            return Err(ColumnError::invalid_parameter(
                "insolation",
                insolation,
                "must be non-negative and finite",
            ));
        }
        Ok(Self {
            longwave,
            shortwave,
            albedo,
            insolation,
        })
    }

    /// Build from parameters for a particular grid
    ///
    /// The longwave absorptivity falls back to the value implied by `abs_coeff`
    /// and the shortwave absorptivity to a transparent atmosphere.
    pub fn from_parameters(params: &GreyRadiationParameters, grid: &Grid) -> ColumnResult<Self> {
        let n = grid.num_levels();
        let longwave = match &params.eps {
            Some(eps) => Transmissivity::build(eps, n)?,
            None => Transmissivity::from_absorption_coefficient(params.abs_coeff, grid.delta())?,
        };
        let shortwave = match &params.absorptivity_sw {
            Some(absorb) => Transmissivity::build(absorb, n)?,
            None => Transmissivity::transparent(n),
        };
        Self::new(longwave, shortwave, params.albedo, params.insolation)
    }

    pub fn longwave_transmissivity(&self) -> &Transmissivity {
        &self.longwave
    }

    pub fn shortwave_transmissivity(&self) -> &Transmissivity {
        &self.shortwave
    }

    pub fn albedo(&self) -> f64 {
        self.albedo
    }

    pub fn insolation(&self) -> f64 {
        self.insolation
    }

    /// Full longwave solution, including emission and gross absorption
    pub fn longwave(&self, column: &Column) -> ColumnResult<LongwaveFluxes> {
        longwave_fluxes(column.ts, column.tatm, &self.longwave)
    }

    /// Full shortwave solution
    pub fn shortwave(&self) -> ColumnResult<ShortwaveFluxes> {
        shortwave_fluxes(self.insolation, self.albedo, &self.shortwave)
    }
}

#[typetag::serde]
impl RadiativeTransfer for GreyGas {
    fn compute_fluxes(&self, column: &Column, band: Band) -> ColumnResult<FluxResult> {
        let mut result = FluxResult::default();
        if band.includes_longwave() {
            let lw = self.longwave(column)?;
            result.olr_split = Some(OlrSplit {
                surface: lw.olr_sfc,
                atmosphere: lw.olr_atm,
            });
            result.longwave = Some(lw.into());
        }
        if band.includes_shortwave() {
            let sw = self.shortwave()?;
            result.planetary_albedo = Some(sw.planetary_albedo);
            result.shortwave = Some(sw.into());
        }
        Ok(result)
    }
}

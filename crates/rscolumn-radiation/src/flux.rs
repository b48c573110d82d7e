//! Grey-gas exchange solution for a plane-parallel, non-scattering column
//!
//! Boundaries are numbered `0..=N` from the top of the atmosphere to the surface and
//! layer `i` sits between boundaries `i` and `i + 1`. Flux emitted by a layer, or
//! reflected by the surface, reaches a boundary attenuated by the product of the
//! transmittances of every layer strictly in between. The whole solution is closed
//! form: there is no linear system to invert.
//!
//! Absorbed fluxes are reported as net convergence (W / m^2), positive when the layer
//! gains energy.

use crate::transmissivity::Transmissivity;
use ndarray::{Array1, ArrayView1};
use rscolumn_core::errors::{check_unit_interval, ColumnError, ColumnResult};
use rscolumn_core::thermo::blackbody_emission;

/// Cumulative transmission between every pair of boundaries
///
/// `table[a][b]` is the product of `trans[i]` for `min(a, b) <= i < max(a, b)`.
fn cumulative_transmission(transmissivity: &Transmissivity) -> Vec<Vec<f64>> {
    let trans = transmissivity.trans();
    let n = trans.len();
    let mut table = vec![vec![1.0; n + 1]; n + 1];
    for a in 0..=n {
        let mut product = 1.0;
        for b in (a + 1)..=n {
            product *= trans[b - 1];
            table[a][b] = product;
            table[b][a] = product;
        }
    }
    table
}

/// Net convergence of an up- and down-going flux pair within each layer
pub fn convergence(up: &Array1<f64>, down: &Array1<f64>) -> Array1<f64> {
    let n = up.len().saturating_sub(1);
    Array1::from_shape_fn(n, |i| (up[i + 1] - up[i]) + (down[i] - down[i + 1]))
}

/// Longwave fluxes on every boundary of a column
#[derive(Debug, Clone, PartialEq)]
pub struct LongwaveFluxes {
    /// Upward flux on boundaries `0..=N`
    pub up: Array1<f64>,
    /// Downward flux on boundaries `0..=N`
    pub down: Array1<f64>,
    /// Net flux convergence in each layer
    pub absorbed_atm: Array1<f64>,
    /// Net flux into the surface
    pub absorbed_sfc: f64,
    /// Flux emitted by each layer in each direction, `eps * sigma * T^4`
    pub layer_emission: Array1<f64>,
    /// Flux emitted by the surface, `sigma * Ts^4`
    pub surface_emission: f64,
    /// Part of the OLR emitted by the surface
    pub olr_sfc: f64,
    /// Part of the OLR emitted by the atmospheric layers
    pub olr_atm: f64,
}

impl LongwaveFluxes {
    /// Outgoing longwave radiation
    pub fn olr(&self) -> f64 {
        self.up[0]
    }

    /// Downwelling longwave flux at the surface
    pub fn down_sfc(&self) -> f64 {
        self.down[self.down.len() - 1]
    }

    /// Flux absorbed in each layer, ignoring what the layer emits itself
    pub fn gross_absorbed_atm(&self) -> Array1<f64> {
        &self.absorbed_atm + &(2.0 * &self.layer_emission)
    }

    /// Flux absorbed by the surface, ignoring what the surface emits itself
    pub fn gross_absorbed_sfc(&self) -> f64 {
        self.down_sfc()
    }

    /// Total flux emitted by the surface and every layer, in both directions
    pub fn total_emission(&self) -> f64 {
        self.surface_emission + 2.0 * self.layer_emission.sum()
    }
}

/// Exchange-formulation longwave solution for a grey column
///
/// The surface is a blackbody. `tatm` must have one value per layer of `transmissivity`.
pub fn longwave_fluxes(
    ts: f64,
    tatm: ArrayView1<f64>,
    transmissivity: &Transmissivity,
) -> ColumnResult<LongwaveFluxes> {
    let n = transmissivity.num_layers();
    if tatm.len() != n {
        return Err(ColumnError::shape_mismatch(
            "atmospheric temperature",
            n,
            tatm.len(),
        ));
    }

    let cum = cumulative_transmission(transmissivity);
    let eps = transmissivity.absorb();
    let layer_emission = Array1::from_shape_fn(n, |i| eps[i] * blackbody_emission(tatm[i]));
    let surface_emission = blackbody_emission(ts);

    let from_surface = |j: usize| surface_emission * cum[j][n];
    let from_layers = |j: usize| (j..n).map(|i| layer_emission[i] * cum[j][i]).sum::<f64>();
    let up = Array1::from_shape_fn(n + 1, |j| from_surface(j) + from_layers(j));
    let olr_sfc = from_surface(0);
    let olr_atm = from_layers(0);
    let down = Array1::from_shape_fn(n + 1, |j| {
        (0..j).map(|i| layer_emission[i] * cum[i + 1][j]).sum::<f64>()
    });

    let absorbed_atm = convergence(&up, &down);
    let absorbed_sfc = down[n] - surface_emission;

    Ok(LongwaveFluxes {
        up,
        down,
        absorbed_atm,
        absorbed_sfc,
        layer_emission,
        surface_emission,
        olr_sfc,
        olr_atm,
    })
}

/// Shortwave fluxes on every boundary of a column
#[derive(Debug, Clone, PartialEq)]
pub struct ShortwaveFluxes {
    pub up: Array1<f64>,
    pub down: Array1<f64>,
    pub absorbed_atm: Array1<f64>,
    pub absorbed_sfc: f64,
    /// Fraction of the incoming beam that returns to space
    pub planetary_albedo: f64,
}

impl ShortwaveFluxes {
    /// Incoming flux at the top of the atmosphere
    pub fn insolation(&self) -> f64 {
        self.down[0]
    }

    /// Absorbed solar radiation for the whole column
    pub fn asr(&self) -> f64 {
        self.down[0] - self.up[0]
    }

    pub fn down_sfc(&self) -> f64 {
        self.down[self.down.len() - 1]
    }

    pub fn up_toa(&self) -> f64 {
        self.up[0]
    }
}

/// Single beam from the top of the atmosphere, reflected once by the surface
pub fn shortwave_fluxes(
    insolation: f64,
    albedo: f64,
    transmissivity: &Transmissivity,
) -> ColumnResult<ShortwaveFluxes> {
    check_unit_interval("albedo", albedo)?;
    if !(insolation.is_finite() && insolation >= 0.0) {
        return Err(ColumnError::invalid_parameter(
            "insolation",
            insolation,
            "must be non-negative and finite",
        ));
    }

    let n = transmissivity.num_layers();
    let cum = cumulative_transmission(transmissivity);

    let down = Array1::from_shape_fn(n + 1, |j| insolation * cum[0][j]);
    let reflected = albedo * down[n];
    let up = Array1::from_shape_fn(n + 1, |j| reflected * cum[j][n]);

    let absorbed_atm = convergence(&up, &down);
    let absorbed_sfc = down[n] * (1.0 - albedo);
    let planetary_albedo = albedo * cum[0][n] * cum[0][n];

    Ok(ShortwaveFluxes {
        up,
        down,
        absorbed_atm,
        absorbed_sfc,
        planetary_albedo,
    })
}

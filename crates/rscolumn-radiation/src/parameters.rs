//! Radiation parameters
//!
//! Typed parameter structs for the radiation processes. Both can be deserialised
//! directly (missing fields take their defaults) or converted from a
//! [`ParameterSet`] loaded elsewhere.

use crate::transmissivity::DEFAULT_ABS_COEFF;
use log::warn;
use rscolumn_core::constants::S0;
use rscolumn_core::errors::{ColumnError, ColumnResult};
use rscolumn_core::heat_capacity::WATER_DEPTH;
use rscolumn_core::parameters::{ParameterSet, ParameterValue};
use serde::{Deserialize, Serialize};

/// Parameters for grey-gas radiation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreyRadiationParameters {
    /// Longwave absorptivity (emissivity), scalar or one value per layer.
    /// Derived from `abs_coeff` and the layer thickness when absent.
    /// Default: None
    pub eps: Option<ParameterValue>,

    /// Grey longwave absorption coefficient (m^2/kg).
    /// Only used when `eps` is absent.
    /// Default: 1.229e-4
    pub abs_coeff: f64,

    /// Shortwave absorptivity, scalar or one value per layer.
    /// Default: None (transparent)
    pub absorptivity_sw: Option<ParameterValue>,

    /// Surface albedo.
    /// Default: 0.299
    pub albedo: f64,

    /// Insolation at the top of the atmosphere (W/m^2).
    /// Default: 341.3 (a quarter of the solar constant)
    #[serde(rename = "Q")]
    pub insolation: f64,

    /// Depth of the surface slab ocean (m).
    /// Default: 1.0
    pub water_depth: f64,
}

impl Default for GreyRadiationParameters {
    fn default() -> Self {
        Self {
            eps: None,
            abs_coeff: DEFAULT_ABS_COEFF,
            absorptivity_sw: None,
            albedo: 0.299,
            insolation: S0 / 4.0,
            water_depth: 1.0,
        }
    }
}

impl GreyRadiationParameters {
    /// The subset of parameters the heat capacity model needs
    pub fn heat_capacity_parameters(&self) -> ParameterSet {
        ParameterSet::new().with(WATER_DEPTH, self.water_depth)
    }
}

fn warn_unused(params: &ParameterSet, known: &[&str], what: &str) {
    for (name, _) in params.iter() {
        if !known.contains(&name) {
            warn!("Ignoring unknown {} parameter '{}'", what, name);
        }
    }
}

impl TryFrom<&ParameterSet> for GreyRadiationParameters {
    type Error = ColumnError;

    fn try_from(params: &ParameterSet) -> ColumnResult<Self> {
        warn_unused(
            params,
            &["eps", "abs_coeff", "absorptivity_sw", "albedo", "Q", WATER_DEPTH],
            "grey radiation",
        );
        let defaults = Self::default();
        Ok(Self {
            eps: params.get("eps").cloned(),
            abs_coeff: params.scalar_or("abs_coeff", defaults.abs_coeff)?,
            absorptivity_sw: params.get("absorptivity_sw").cloned(),
            albedo: params.scalar_or("albedo", defaults.albedo)?,
            insolation: params.scalar_or("Q", defaults.insolation)?,
            water_depth: params.scalar_or(WATER_DEPTH, defaults.water_depth)?,
        })
    }
}

/// Parameters for the linear outgoing longwave radiation process.
///
/// `OLR = A + B * (Ts - 273.15)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearRadiationParameters {
    /// OLR at 0 degC (W/m^2).
    /// Default: 200.0
    #[serde(rename = "A")]
    pub a: f64,

    /// Increase in OLR per degree of warming (W/m^2/K).
    /// Default: 2.0
    #[serde(rename = "B")]
    pub b: f64,

    /// Depth of the surface slab ocean (m).
    /// Default: 1.0
    pub water_depth: f64,
}

impl Default for LinearRadiationParameters {
    fn default() -> Self {
        Self {
            a: 200.0,
            b: 2.0,
            water_depth: 1.0,
        }
    }
}

impl LinearRadiationParameters {
    pub fn heat_capacity_parameters(&self) -> ParameterSet {
        ParameterSet::new().with(WATER_DEPTH, self.water_depth)
    }
}

impl TryFrom<&ParameterSet> for LinearRadiationParameters {
    type Error = ColumnError;

    fn try_from(params: &ParameterSet) -> ColumnResult<Self> {
        warn_unused(params, &["A", "B", WATER_DEPTH], "linear radiation");
        let defaults = Self::default();
        Ok(Self {
            a: params.scalar_or("A", defaults.a)?,
            b: params.scalar_or("B", defaults.b)?,
            water_depth: params.scalar_or(WATER_DEPTH, defaults.water_depth)?,
        })
    }
}

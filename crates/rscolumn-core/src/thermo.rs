//! Thermodynamic helper functions
//!
//! Pure scalar functions of temperature and pressure, including the moist
//! thermodynamics used for parcel ascent and lower tropospheric stability.
//! Temperatures are in K and pressures in mb unless stated otherwise.

use crate::constants::{self, molecular_weight};
use serde::{Deserialize, Serialize};

/// Radiatively or chemically active gases with a known molecular weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gas {
    H2O,
    CO2,
    CH4,
    N2O,
    O3,
    O2,
}

impl Gas {
    /// Molecular weight in g / mol
    pub fn molecular_weight(&self) -> f64 {
        match self {
            Gas::H2O => molecular_weight::H2O,
            Gas::CO2 => molecular_weight::CO2,
            Gas::CH4 => molecular_weight::CH4,
            Gas::N2O => molecular_weight::N2O,
            Gas::O3 => molecular_weight::O3,
            Gas::O2 => molecular_weight::O2,
        }
    }
}

/// Blackbody emission following the Stefan-Boltzmann law (W / m^2)
pub fn blackbody_emission(temperature: f64) -> f64 {
    constants::SIGMA * temperature.powi(4)
}

/// Potential temperature of an air parcel at pressure `p`
pub fn potential_temperature(temperature: f64, p: f64) -> f64 {
    temperature * (constants::PS / p).powf(constants::KAPPA)
}

/// In-situ temperature from potential temperature `theta` at pressure `p`
pub fn temperature_from_potential(theta: f64, p: f64) -> f64 {
    theta / (constants::PS / p).powf(constants::KAPPA)
}

/// Saturation vapour pressure (mb)
///
/// Bolton (1980) fit, accurate to about 0.1% between -30 and 35 degC.
pub fn clausius_clapeyron(temperature: f64) -> f64 {
    let t_cel = temperature - constants::TEMP_C_TO_K;
    6.112 * (17.67 * t_cel / (t_cel + 243.5)).exp()
}

/// Saturation specific humidity (kg / kg)
pub fn qsat(temperature: f64, p: f64) -> f64 {
    let eps = constants::RD / constants::RV;
    let es = clausius_clapeyron(temperature);
    eps * es / (p - (1.0 - eps) * es)
}

/// Slope of the pseudoadiabat, `dT/dp` in K / mb
///
/// Temperature change of a saturated parcel whose condensate rains out immediately.
/// Pierrehumbert (2010) eq. 2.33, with `p` taken as the total pressure (dilute limit).
pub fn pseudoadiabat(temperature: f64, p: f64) -> f64 {
    let es_over_p = clausius_clapeyron(temperature) / p;
    let t_cel = temperature - constants::TEMP_C_TO_K;
    // Latent heat of vaporisation with its temperature dependence (J / kg)
    let latent = (2.501 - 0.00237 * t_cel) * 1.0e6;
    let ratio = latent / temperature / constants::RV;
    temperature / p * constants::KAPPA * (1.0 + es_over_p * ratio)
        / (1.0
            + constants::KAPPA * (constants::CPV / constants::RV + (ratio - 1.0) * ratio) * es_over_p)
}

/// Height (m) above a parcel at which dry adiabatic ascent saturates it
///
/// `rh` is the relative humidity as a fraction. Bolton (1980) approximation as given
/// by Romps (2017).
pub fn lifting_condensation_level(temperature: f64, rh: f64) -> f64 {
    let t_adj = temperature - 55.0;
    constants::CP / constants::G * (t_adj - 1.0 / (1.0 / t_adj - rh.ln() / 2840.0))
}

/// Estimated inversion strength (K) following Wood and Bretherton (2006)
///
/// `t0` is the surface temperature and `t700` the air temperature at 700 mb. The
/// 850 mb temperature is their mean and the boundary layer is assumed to be at 80%
/// relative humidity.
pub fn estimated_inversion_strength(t0: f64, t700: f64) -> f64 {
    let t850 = (t0 + t700) / 2.0;
    let lcl = lifting_condensation_level(t0, 0.8);
    let lts = potential_temperature(t700, 700.0) - t0;

    // Potential temperature lapse rate along the moist adiabat at 850 mb (K / m)
    let q850 = qsat(t850, 850.0);
    let gamma_m = constants::G / constants::CP
        * (1.0
            - (1.0 + constants::LHVAP * q850 / constants::RD / t850)
                / (1.0
                    + constants::LHVAP.powi(2) * q850
                        / constants::CP
                        / constants::RV
                        / t850.powi(2)));

    // Pressure decays exponentially with the surface scale height
    let z700 = constants::RD * t0 / constants::G * (constants::PS / 700.0).ln();
    lts - gamma_m * (z700 - lcl)
}

/// Planck function in frequency space
///
/// `nu` in 1/s, returns flux density in W / m^2 / Hz / sr.
pub fn planck_frequency(nu: f64, temperature: f64) -> f64 {
    let h = constants::H_PLANCK;
    let c = constants::C_LIGHT;
    let k = constants::K_BOLTZMANN;
    2.0 * h * nu.powi(3) / c.powi(2) / ((h * nu / k / temperature).exp() - 1.0)
}

/// Planck function in wavenumber space
///
/// `n` is the wavenumber in 1/cm.
pub fn planck_wavenumber(n: f64, temperature: f64) -> f64 {
    let c = constants::C_LIGHT;
    let n = n * 100.0;
    c * planck_frequency(n * c, temperature)
}

/// Planck function in wavelength space
///
/// `l` is the wavelength in m.
pub fn planck_wavelength(l: f64, temperature: f64) -> f64 {
    let h = constants::H_PLANCK;
    let c = constants::C_LIGHT;
    let k = constants::K_BOLTZMANN;
    let u = h * c / l / k / temperature;
    2.0 * k.powi(5) * temperature.powi(5) / h.powi(4) / c.powi(3) * u.powi(5) / (u.exp() - 1.0)
}

/// Convert a volume mixing ratio to a mass mixing ratio
pub fn vmr_to_mmr(vmr: f64, gas: Gas) -> f64 {
    vmr * gas.molecular_weight() / molecular_weight::DRY_AIR
}

/// Convert a mass mixing ratio to a volume mixing ratio
pub fn mmr_to_vmr(mmr: f64, gas: Gas) -> f64 {
    mmr * molecular_weight::DRY_AIR / gas.molecular_weight()
}

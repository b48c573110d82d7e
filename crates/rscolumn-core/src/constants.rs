//! Physical constants
//!
//! SI units unless stated otherwise. Pressures on the vertical grid are in mb (hPa).

/// Stefan-Boltzmann constant (W / m^2 / K^4)
pub const SIGMA: f64 = 5.67e-8;
/// Gravitational acceleration (m / s^2)
pub const G: f64 = 9.8;
/// Specific heat of dry air at constant pressure (J / kg / K)
pub const CP: f64 = 1004.0;
/// Gas constant for dry air (J / kg / K)
pub const RD: f64 = 287.0;
/// Gas constant for water vapour (J / kg / K)
pub const RV: f64 = 461.5;
/// Specific heat of water vapour at constant pressure (J / kg / K)
pub const CPV: f64 = 1875.0;
/// Poisson constant `Rd / cp`
pub const KAPPA: f64 = RD / CP;
/// Latent heat of vaporisation (J / kg)
pub const LHVAP: f64 = 2.5e6;
/// Reference surface pressure (mb)
pub const PS: f64 = 1000.0;
/// Conversion from mb to Pa
pub const MB_TO_PA: f64 = 100.0;
/// Density of liquid water (kg / m^3)
pub const RHO_W: f64 = 1000.0;
/// Specific heat of liquid water (J / kg / K)
pub const CW: f64 = 4181.3;
/// Offset between degrees Celsius and Kelvin
pub const TEMP_C_TO_K: f64 = 273.15;
/// Planck constant (J s)
pub const H_PLANCK: f64 = 6.626075510e-34;
/// Boltzmann constant (J / K)
pub const K_BOLTZMANN: f64 = 1.38065812e-23;
/// Speed of light (m / s)
pub const C_LIGHT: f64 = 2.99792458e8;
/// Seconds in a day
pub const SECONDS_PER_DAY: f64 = 86400.0;
/// Days in a (tropical) year
pub const DAYS_PER_YEAR: f64 = 365.2422;
/// Solar constant (W / m^2)
pub const S0: f64 = 1365.2;

/// Molecular weights (g / mol) used for mixing ratio conversions
pub mod molecular_weight {
    pub const DRY_AIR: f64 = 28.97;
    pub const H2O: f64 = 18.01528;
    pub const CO2: f64 = 44.0095;
    pub const CH4: f64 = 16.04;
    pub const N2O: f64 = 44.013;
    pub const O3: f64 = 47.9982;
    pub const O2: f64 = 31.998;
}

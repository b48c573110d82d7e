//! Layer transmissivity
//!
//! A [`Transmissivity`] holds the absorptivity (equal to the emissivity, by Kirchhoff's
//! law) of every layer in a column and the transmittance `1 - absorptivity` that
//! follows from it. Longwave and shortwave each get their own instance.

use ndarray::Array1;
use rscolumn_core::constants::{G, MB_TO_PA};
use rscolumn_core::errors::{check_unit_interval, ColumnError, ColumnResult};
use rscolumn_core::parameters::ParameterValue;
use serde::{Deserialize, Serialize};

/// Default grey absorption coefficient (m^2 / kg)
pub const DEFAULT_ABS_COEFF: f64 = 1.229e-4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Array1<f64>", into = "Array1<f64>")]
pub struct Transmissivity {
    absorb: Array1<f64>,
    trans: Array1<f64>,
}

impl TryFrom<Array1<f64>> for Transmissivity {
    type Error = ColumnError;

    fn try_from(absorb: Array1<f64>) -> Result<Self, Self::Error> {
        Transmissivity::from_absorptivity(absorb)
    }
}

impl From<Transmissivity> for Array1<f64> {
    fn from(value: Transmissivity) -> Self {
        value.absorb
    }
}

impl Transmissivity {
    /// Build from a scalar or per-layer absorptivity
    ///
    /// A scalar is broadcast to every layer. An array must have exactly
    /// `num_layers` values.
    pub fn build(absorb: &ParameterValue, num_layers: usize) -> ColumnResult<Self> {
        Self::from_absorptivity(absorb.broadcast("absorptivity", num_layers)?)
    }

    /// Build from per-layer absorptivities, each of which must lie within `[0, 1]`
    pub fn from_absorptivity(absorb: Array1<f64>) -> ColumnResult<Self> {
        for value in absorb.iter() {
            check_unit_interval("absorptivity", *value)?;
        }
        let trans = absorb.mapv(|a| 1.0 - a);
        Ok(Self { absorb, trans })
    }

    /// A column which absorbs nothing
    pub fn transparent(num_layers: usize) -> Self {
        Self {
            absorb: Array1::zeros(num_layers),
            trans: Array1::ones(num_layers),
        }
    }

    /// Longwave absorptivity implied by a grey absorption coefficient
    ///
    /// `eps = 2 / (1 + 2 g / (abs_coeff * dp))` for each layer of pressure
    /// thickness `dp` (mb).
    pub fn from_absorption_coefficient(abs_coeff: f64, delta: &Array1<f64>) -> ColumnResult<Self> {
        if !(abs_coeff.is_finite() && abs_coeff >= 0.0) {
            return Err(ColumnError::invalid_parameter(
                "abs_coeff",
                abs_coeff,
                "must be non-negative and finite",
            ));
        }
        let absorb = delta.mapv(|dp| 2.0 / (1.0 + 2.0 * G / (abs_coeff * dp * MB_TO_PA)));
        Self::from_absorptivity(absorb)
    }

    pub fn absorb(&self) -> &Array1<f64> {
        &self.absorb
    }

    pub fn trans(&self) -> &Array1<f64> {
        &self.trans
    }

    pub fn num_layers(&self) -> usize {
        self.absorb.len()
    }

    /// Product of the transmittance of layers `a..b`
    ///
    /// This is the fraction of flux that survives travelling between boundaries `a`
    /// and `b` in either direction. Equal to one when `a == b`.
    pub fn between(&self, a: usize, b: usize) -> f64 {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        self.trans.slice(ndarray::s![lo..hi]).product()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn scalar_is_broadcast() {
        let t = Transmissivity::build(&ParameterValue::Scalar(0.25), 4).unwrap();
        assert_eq!(t.absorb(), &array![0.25, 0.25, 0.25, 0.25]);
        assert_eq!(t.trans(), &array![0.75, 0.75, 0.75, 0.75]);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let res = Transmissivity::build(&ParameterValue::Array(vec![0.1, 0.2]), 3);
        assert!(matches!(res, Err(ColumnError::ShapeMismatch { .. })));
    }

    #[test]
    fn out_of_range_is_rejected() {
        for bad in [-0.1, 1.5, f64::NAN] {
            let res = Transmissivity::build(&ParameterValue::Scalar(bad), 2);
            assert!(matches!(res, Err(ColumnError::InvalidParameter { .. })));
        }
    }

    #[test]
    fn absorption_coefficient() {
        let delta = array![250.0, 250.0, 500.0];
        let t = Transmissivity::from_absorption_coefficient(DEFAULT_ABS_COEFF, &delta).unwrap();
        let expected = 2.0 / (1.0 + 2.0 * 9.8 / (1.229e-4 * 25000.0));
        assert_relative_eq!(t.absorb()[0], expected);
        assert!(t.absorb()[2] > t.absorb()[1]);

        let none = Transmissivity::from_absorption_coefficient(0.0, &delta).unwrap();
        assert_eq!(none, Transmissivity::transparent(3));
    }

    #[test]
    fn cumulative_transmission() {
        let t = Transmissivity::build(&ParameterValue::Array(vec![0.5, 0.0, 0.75]), 3).unwrap();
        assert_relative_eq!(t.between(0, 0), 1.0);
        assert_relative_eq!(t.between(0, 1), 0.5);
        assert_relative_eq!(t.between(0, 3), 0.5 * 0.25);
        assert_relative_eq!(t.between(3, 1), 0.25);
    }

    #[test]
    fn serialises_as_absorptivity() {
        let t = Transmissivity::build(&ParameterValue::Array(vec![0.5, 0.25]), 2).unwrap();
        let json = serde_json::to_string(&t).unwrap();
        let parsed: Transmissivity = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, t);
    }
}

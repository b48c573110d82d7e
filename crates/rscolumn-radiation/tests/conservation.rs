//! Conservation tests for the grey-gas solver.
//!
//! These tests verify that radiative energy is neither created nor destroyed:
//! - Longwave emission is absorbed somewhere or escapes to space
//! - Shortwave insolation is absorbed or reflected back to space
//! - The radiation process heats the column by exactly ASR - OLR

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::{Array1, ArrayView1};
use rscolumn_core::constants::SIGMA;
use rscolumn_core::parameters::ParameterValue;
use rscolumn_radiation::flux::{longwave_fluxes, shortwave_fluxes};
use rscolumn_radiation::Transmissivity;

/// Deterministic values in `[lo, hi)`
fn sequence(n: usize, seed: u64, lo: f64, hi: f64) -> Array1<f64> {
    let mut state = seed;
    Array1::from_shape_fn(n, |_| {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
        lo + (hi - lo) * unit
    })
}

fn transmissivity(eps: Array1<f64>) -> Transmissivity {
    Transmissivity::from_absorptivity(eps).unwrap()
}

fn emission(t: ArrayView1<f64>) -> Array1<f64> {
    t.mapv(|t| SIGMA * t.powi(4))
}

mod longwave_conservation {
    use super::*;

    /// Test the net form: everything the column loses goes to space.
    #[test]
    fn test_net_flux_balance() {
        for (seed, n) in [(1, 1), (2, 2), (3, 5), (4, 17), (5, 30)] {
            let eps = sequence(n, seed, 0.0, 1.0);
            let tatm = sequence(n, seed + 100, 180.0, 300.0);
            let fluxes = longwave_fluxes(290.0, tatm.view(), &transmissivity(eps)).unwrap();

            let total = fluxes.absorbed_atm.sum() + fluxes.absorbed_sfc + fluxes.olr();
            assert_abs_diff_eq!(total, 0.0, epsilon = 1e-9);
        }
    }

    /// Test the gross form: OLR plus everything absorbed equals everything emitted.
    #[test]
    fn test_gross_flux_balance() {
        for (seed, n) in [(11, 1), (12, 3), (13, 10), (14, 26)] {
            let eps = sequence(n, seed, 0.0, 1.0);
            let tatm = sequence(n, seed + 100, 180.0, 300.0);
            let ts = 250.0 + seed as f64;
            let fluxes = longwave_fluxes(ts, tatm.view(), &transmissivity(eps.clone())).unwrap();

            let emitted = SIGMA * ts.powi(4) + 2.0 * (&eps * &emission(tatm.view())).sum();
            let absorbed = fluxes.gross_absorbed_atm().sum() + fluxes.gross_absorbed_sfc();
            assert_relative_eq!(fluxes.olr() + absorbed, emitted, max_relative = 1e-12);
            assert_relative_eq!(fluxes.total_emission(), emitted, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_zero_absorption_limit() {
        let tatm = sequence(8, 21, 200.0, 280.0);
        let fluxes = longwave_fluxes(288.0, tatm.view(), &Transmissivity::transparent(8)).unwrap();

        assert_relative_eq!(fluxes.olr(), SIGMA * 288.0_f64.powi(4), max_relative = 1e-12);
        assert!(fluxes.absorbed_atm.iter().all(|a| *a == 0.0));
        assert!(fluxes.down.iter().all(|d| *d == 0.0));
    }

    #[test]
    fn test_opaque_limit() {
        let tatm = sequence(6, 31, 200.0, 280.0);
        let opaque = transmissivity(Array1::ones(6));

        let fluxes = longwave_fluxes(288.0, tatm.view(), &opaque).unwrap();
        assert_relative_eq!(fluxes.olr(), SIGMA * tatm[0].powi(4), max_relative = 1e-12);

        // The surface contributes nothing to the OLR
        let warmer = longwave_fluxes(350.0, tatm.view(), &opaque).unwrap();
        assert_eq!(warmer.olr(), fluxes.olr());
    }

    /// Single grey layer with eps = 0.5: half the surface flux escapes, and the
    /// layer emits half a blackbody flux in each direction.
    #[test]
    fn test_single_layer_scenario() {
        let eps = 0.5;
        let t = Transmissivity::build(&ParameterValue::Scalar(eps), 1).unwrap();
        let fluxes = longwave_fluxes(288.0, ndarray::array![260.0].view(), &t).unwrap();

        let expected = SIGMA * 260.0_f64.powi(4) * 0.5 + SIGMA * 288.0_f64.powi(4) * 0.5;
        assert_relative_eq!(fluxes.olr(), expected, max_relative = 1e-12);
        assert_relative_eq!(
            fluxes.olr(),
            eps * SIGMA * 260.0_f64.powi(4) + (1.0 - eps) * SIGMA * 288.0_f64.powi(4),
            max_relative = 1e-12
        );
    }

    /// More absorber means less OLR when the atmosphere is colder than the surface.
    #[test]
    fn test_greenhouse_effect() {
        let tatm = Array1::linspace(200.0, 278.0, 10);
        let mut previous = f64::INFINITY;
        for eps in [0.0, 0.1, 0.2, 0.4, 0.8] {
            let t = Transmissivity::build(&ParameterValue::Scalar(eps), 10).unwrap();
            let olr = longwave_fluxes(288.0, tatm.view(), &t).unwrap().olr();
            assert!(olr < previous);
            previous = olr;
        }
    }
}

mod shortwave_conservation {
    use super::*;

    #[test]
    fn test_transparent_albedo() {
        for albedo in [0.0, 0.1, 0.299, 0.7, 1.0] {
            let fluxes = shortwave_fluxes(341.3, albedo, &Transmissivity::transparent(4)).unwrap();
            assert_eq!(fluxes.up_toa() / fluxes.insolation(), albedo);
            assert_eq!(fluxes.planetary_albedo, albedo);
        }
    }

    #[test]
    fn test_insolation_balance() {
        for (seed, n) in [(41, 1), (42, 4), (43, 20)] {
            let absorb = sequence(n, seed, 0.0, 0.3);
            let fluxes = shortwave_fluxes(341.3, 0.3, &transmissivity(absorb)).unwrap();

            let total = fluxes.absorbed_atm.sum() + fluxes.absorbed_sfc + fluxes.up_toa();
            assert_relative_eq!(total, 341.3, max_relative = 1e-12);
            assert!(fluxes.absorbed_atm.iter().all(|a| *a >= 0.0));
            assert_relative_eq!(
                fluxes.planetary_albedo,
                fluxes.up_toa() / 341.3,
                max_relative = 1e-12
            );
        }
    }
}

mod process_conservation {
    use super::*;
    use rscolumn_core::field::{State, StateField, TATM, TS};
    use rscolumn_core::grid::Grid;
    use rscolumn_core::heat_capacity::{atmosphere, slab_ocean};
    use rscolumn_core::model::ModelBuilder;
    use rscolumn_core::process::{CompositeProcess, Process};
    use rscolumn_radiation::{Band, GreyRadiationParameters, Radiation};
    use std::sync::Arc;

    fn state(num_levels: usize) -> State {
        let grid = Arc::new(Grid::evenly_spaced(num_levels, 1000.0).unwrap());
        let mut state = State::new();
        state
            .add_field(StateField::surface(TS, grid.clone(), 288.0))
            .unwrap();
        state
            .add_field(
                StateField::atmosphere(TATM, grid, Array1::linspace(200.0, 278.0, num_levels))
                    .unwrap(),
            )
            .unwrap();
        state
    }

    fn params() -> GreyRadiationParameters {
        GreyRadiationParameters {
            absorptivity_sw: Some(ParameterValue::Scalar(0.02)),
            water_depth: 5.0,
            ..Default::default()
        }
    }

    /// The energy added to the column equals ASR - OLR.
    #[test]
    fn test_column_energy_budget() {
        let state = state(10);
        let radiation = Radiation::grey(&state, &params(), Band::Both).unwrap();
        let output = radiation.compute(&state).unwrap();

        let grid = state.get(TATM).unwrap().grid();
        let c_atm = atmosphere(grid.delta());
        let heating = output.tendency(TS).unwrap()[0] * slab_ocean(5.0)
            + (output.tendency(TATM).unwrap() * &c_atm).sum();

        let asr = output.diagnostic("ASR").unwrap()[0];
        let olr = output.diagnostic("OLR").unwrap()[0];
        assert_relative_eq!(heating, asr - olr, max_relative = 1e-9);
    }

    /// Separate longwave and shortwave processes add up to a single combined one.
    #[test]
    fn test_band_split_matches_combined() {
        let state = state(6);

        let split = CompositeProcess::new()
            .with_subprocess("LW", Radiation::grey(&state, &params(), Band::Longwave).unwrap())
            .unwrap()
            .with_subprocess("SW", Radiation::grey(&state, &params(), Band::Shortwave).unwrap())
            .unwrap();
        let mut split_model = ModelBuilder::new()
            .with_state(state.clone())
            .with_process("Radiation", split)
            .build()
            .unwrap();

        let mut combined_model = ModelBuilder::new()
            .with_state(state.clone())
            .with_process(
                "Radiation",
                Radiation::grey(&state, &params(), Band::Both).unwrap(),
            )
            .build()
            .unwrap();

        split_model.step_forward().unwrap();
        combined_model.step_forward().unwrap();

        for field in [TS, TATM] {
            let a = &split_model.tendencies()[field];
            let b = &combined_model.tendencies()[field];
            for (x, y) in a.iter().zip(b.iter()) {
                assert_relative_eq!(x, y, max_relative = 1e-12, epsilon = 1e-18);
            }
        }
        assert_eq!(
            split_model.diagnostic("Radiation/LW/OLR"),
            combined_model.diagnostic("Radiation/OLR")
        );
        assert_eq!(
            split_model.diagnostic("Radiation/SW/ASR"),
            combined_model.diagnostic("Radiation/ASR")
        );
    }
}

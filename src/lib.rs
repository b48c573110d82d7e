//! Single-column climate models built from composable physical processes.
//!
//! The framework lives in [`core`] and the radiative transfer in [`radiation`].
//! This crate re-exports both and adds a few shortcuts for the common case of
//! one surface temperature under a column of atmospheric layers.
//!
//! ```no_run
//! use rscolumn::{grey_radiation_model, GreyRadiationParameters};
//!
//! let mut model = grey_radiation_model(30, &GreyRadiationParameters::default()).unwrap();
//! model.integrate_years(1.0).unwrap();
//! println!("{}", model.values("Ts").unwrap()[0]);
//! ```

pub use rscolumn_core as core;
pub use rscolumn_radiation as radiation;

pub use rscolumn_core::{
    ColumnError, ColumnResult, CompositeProcess, ErrorPolicy, Grid, Model, ModelBuilder,
    ParameterSet, ParameterValue, Process, ProcessOutput, ProcessSchema, State, StateField,
};
pub use rscolumn_radiation::{
    Band, GreyGas, GreyRadiationParameters, LinearRadiation, LinearRadiationParameters,
    Radiation, RadiativeTransfer,
};

use log::info;
use ndarray::Array1;
use rscolumn_core::constants::PS;
use rscolumn_core::field::{TATM, TS};
use std::sync::Arc;

/// Surface temperature of [`column_state`] (K)
pub const DEFAULT_TS: f64 = 288.0;
/// Temperature of the top layer of [`column_state`] (K)
pub const DEFAULT_TATM_TOP: f64 = 200.0;
/// Temperature of the bottom layer of [`column_state`] (K)
pub const DEFAULT_TATM_BOTTOM: f64 = 278.0;

/// A state with `Ts` and `Tatm` on evenly spaced pressure layers
///
/// The atmosphere warms linearly from the top layer down. A single layer takes
/// the top temperature.
pub fn column_state(num_levels: usize) -> ColumnResult<State> {
    let grid = Arc::new(Grid::evenly_spaced(num_levels, PS)?);
    let tatm = Array1::linspace(DEFAULT_TATM_TOP, DEFAULT_TATM_BOTTOM, num_levels);

    let mut state = State::new();
    state.add_field(StateField::surface(TS, grid.clone(), DEFAULT_TS))?;
    state.add_field(StateField::atmosphere(TATM, grid, tatm)?)?;
    Ok(state)
}

/// A model with a single grey-gas radiation process named `Radiation`
///
/// The model steps one day at a time.
pub fn grey_radiation_model(
    num_levels: usize,
    params: &GreyRadiationParameters,
) -> ColumnResult<Model> {
    let state = column_state(num_levels)?;
    let radiation = Radiation::grey(&state, params, Band::Both)?;
    info!(
        "Grey radiation column with {} layers (albedo {}, Q {})",
        num_levels, params.albedo, params.insolation
    );
    ModelBuilder::new()
        .with_state(state)
        .with_process("Radiation", radiation)
        .build()
}

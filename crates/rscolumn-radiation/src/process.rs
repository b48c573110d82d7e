//! Radiation as a process
//!
//! [`Radiation`] asks its [`RadiativeTransfer`] scheme for boundary fluxes, turns the
//! flux convergence in every layer (and at the surface) into a heating rate, and
//! divides by the heat capacity to get temperature tendencies for `Ts` and `Tatm`.

use crate::parameters::GreyRadiationParameters;
use crate::transfer::{Band, BandFluxes, Column, GreyGas, RadiativeTransfer};
use ndarray::Array1;
use rscolumn_core::constants::SECONDS_PER_DAY;
use rscolumn_core::errors::{ColumnError, ColumnResult};
use rscolumn_core::field::{FieldHandle, State, TATM, TS};
use rscolumn_core::grid::Grid;
use rscolumn_core::heat_capacity::capacity_for;
use rscolumn_core::parameters::ParameterSet;
use rscolumn_core::process::{DiagnosticHandle, Process, ProcessOutput, ProcessSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LongwaveDiagnostics {
    olr: DiagnosticHandle,
    olr_sfc: DiagnosticHandle,
    olr_atm: DiagnosticHandle,
    down_sfc: DiagnosticHandle,
    absorbed_atm: DiagnosticHandle,
    absorbed_sfc: DiagnosticHandle,
    tdot: DiagnosticHandle,
    flux_up: DiagnosticHandle,
    flux_down: DiagnosticHandle,
}

impl LongwaveDiagnostics {
    fn register(schema: &mut ProcessSchema, num_levels: usize) -> Self {
        Self {
            olr: schema.add_diagnostic("OLR", 1),
            olr_sfc: schema.add_diagnostic("OLR_sfc", 1),
            olr_atm: schema.add_diagnostic("OLR_atm", 1),
            down_sfc: schema.add_diagnostic("LW_down_sfc", 1),
            absorbed_atm: schema.add_diagnostic("LW_absorbed_atm", num_levels),
            absorbed_sfc: schema.add_diagnostic("LW_absorbed_sfc", 1),
            tdot: schema.add_diagnostic("TdotLW", num_levels),
            flux_up: schema.add_diagnostic("LW_flux_up", num_levels + 1),
            flux_down: schema.add_diagnostic("LW_flux_down", num_levels + 1),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ShortwaveDiagnostics {
    asr: DiagnosticHandle,
    down_sfc: DiagnosticHandle,
    up_toa: DiagnosticHandle,
    planetary_albedo: DiagnosticHandle,
    absorbed_atm: DiagnosticHandle,
    absorbed_sfc: DiagnosticHandle,
    tdot: DiagnosticHandle,
    flux_up: DiagnosticHandle,
    flux_down: DiagnosticHandle,
}

impl ShortwaveDiagnostics {
    fn register(schema: &mut ProcessSchema, num_levels: usize) -> Self {
        Self {
            asr: schema.add_diagnostic("ASR", 1),
            down_sfc: schema.add_diagnostic("SW_down_sfc", 1),
            up_toa: schema.add_diagnostic("SW_up_TOA", 1),
            planetary_albedo: schema.add_diagnostic("planetary_albedo", 1),
            absorbed_atm: schema.add_diagnostic("SW_absorbed_atm", num_levels),
            absorbed_sfc: schema.add_diagnostic("SW_absorbed_sfc", 1),
            tdot: schema.add_diagnostic("TdotSW", num_levels),
            flux_up: schema.add_diagnostic("SW_flux_up", num_levels + 1),
            flux_down: schema.add_diagnostic("SW_flux_down", num_levels + 1),
        }
    }
}

/// Radiative heating of the surface and atmosphere
#[derive(Debug, Serialize, Deserialize)]
pub struct Radiation {
    scheme: Box<dyn RadiativeTransfer>,
    band: Band,
    grid: Arc<Grid>,
    surface_capacity: f64,
    atmosphere_capacity: Array1<f64>,
    schema: ProcessSchema,
    ts: FieldHandle,
    tatm: FieldHandle,
    longwave: Option<LongwaveDiagnostics>,
    shortwave: Option<ShortwaveDiagnostics>,
}

impl Radiation {
    /// Bind a radiation scheme to the `Ts` and `Tatm` fields of `state`
    ///
    /// `params` must provide whatever the heat capacity model needs (`water_depth`).
    pub fn new(
        state: &State,
        scheme: Box<dyn RadiativeTransfer>,
        band: Band,
        params: &ParameterSet,
    ) -> ColumnResult<Self> {
        let ts_field = state
            .get(TS)
            .ok_or_else(|| ColumnError::UnknownField(TS.to_string()))?;
        let tatm_field = state
            .get(TATM)
            .ok_or_else(|| ColumnError::UnknownField(TATM.to_string()))?;
        let grid = tatm_field.grid().clone();
        let num_levels = grid.num_levels();

        let surface_capacity = capacity_for(ts_field, params)?[0];
        let atmosphere_capacity = capacity_for(tatm_field, params)?;

        let mut schema = ProcessSchema::new();
        let ts = schema.add_input(TS, ts_field.len());
        let tatm = schema.add_input(TATM, num_levels);
        schema.add_tendency(TS, ts_field.len());
        schema.add_tendency(TATM, num_levels);
        let longwave = band
            .includes_longwave()
            .then(|| LongwaveDiagnostics::register(&mut schema, num_levels));
        let shortwave = band
            .includes_shortwave()
            .then(|| ShortwaveDiagnostics::register(&mut schema, num_levels));

        Ok(Self {
            scheme,
            band,
            grid,
            surface_capacity,
            atmosphere_capacity,
            schema,
            ts,
            tatm,
            longwave,
            shortwave,
        })
    }

    /// Grey-gas radiation for the grid of the `Tatm` field in `state`
    pub fn grey(state: &State, params: &GreyRadiationParameters, band: Band) -> ColumnResult<Self> {
        let grid = state
            .get(TATM)
            .ok_or_else(|| ColumnError::UnknownField(TATM.to_string()))?
            .grid()
            .clone();
        let scheme = GreyGas::from_parameters(params, &grid)?;
        Self::new(
            state,
            Box::new(scheme),
            band,
            &params.heat_capacity_parameters(),
        )
    }

    pub fn band(&self) -> Band {
        self.band
    }

    pub fn scheme(&self) -> &dyn RadiativeTransfer {
        self.scheme.as_ref()
    }

    fn check_boundaries(&self, fluxes: &BandFluxes) -> ColumnResult<()> {
        if fluxes.num_layers() != self.grid.num_levels() {
            return Err(ColumnError::shape_mismatch(
                "boundary fluxes",
                self.grid.num_levels() + 1,
                fluxes.up.len(),
            ));
        }
        Ok(())
    }

    /// Heating rate in K / day for each layer
    fn tdot(&self, absorbed_atm: &Array1<f64>) -> Array1<f64> {
        absorbed_atm / &self.atmosphere_capacity * SECONDS_PER_DAY
    }
}

#[typetag::serde]
impl Process for Radiation {
    fn schema(&self) -> &ProcessSchema {
        &self.schema
    }

    fn compute(&self, state: &State) -> ColumnResult<ProcessOutput> {
        let column = Column {
            ts: self.ts.read_scalar(state)?,
            tatm: self.tatm.read(state)?,
            grid: &self.grid,
        };
        let fluxes = self.scheme.compute_fluxes(&column, self.band)?;

        let num_levels = self.grid.num_levels();
        let mut heating_atm = Array1::<f64>::zeros(num_levels);
        let mut heating_sfc = 0.0;
        let mut output = ProcessOutput::new();

        if let Some(handles) = &self.longwave {
            let lw = fluxes.longwave.as_ref().ok_or_else(|| {
                ColumnError::shape_mismatch("longwave fluxes", "a longwave result", "none")
            })?;
            self.check_boundaries(lw)?;
            let absorbed_atm = lw.absorbed_atm();
            let absorbed_sfc = lw.absorbed_sfc();

            output.set_scalar_diagnostic(&handles.olr, lw.up_toa())?;
            // Only published by schemes which track where the OLR was emitted
            if let Some(split) = fluxes.olr_split {
                output.set_scalar_diagnostic(&handles.olr_sfc, split.surface)?;
                output.set_scalar_diagnostic(&handles.olr_atm, split.atmosphere)?;
            }
            output.set_scalar_diagnostic(&handles.down_sfc, lw.down_sfc())?;
            output.set_scalar_diagnostic(&handles.absorbed_sfc, absorbed_sfc)?;
            output.set_diagnostic(&handles.tdot, self.tdot(&absorbed_atm))?;
            output.set_diagnostic(&handles.flux_up, lw.up.clone())?;
            output.set_diagnostic(&handles.flux_down, lw.down.clone())?;
            heating_atm += &absorbed_atm;
            heating_sfc += absorbed_sfc;
            output.set_diagnostic(&handles.absorbed_atm, absorbed_atm)?;
        }

        if let Some(handles) = &self.shortwave {
            let sw = fluxes.shortwave.as_ref().ok_or_else(|| {
                ColumnError::shape_mismatch("shortwave fluxes", "a shortwave result", "none")
            })?;
            self.check_boundaries(sw)?;
            let absorbed_atm = sw.absorbed_atm();
            let absorbed_sfc = sw.absorbed_sfc();

            output.set_scalar_diagnostic(&handles.asr, sw.down_toa() - sw.up_toa())?;
            output.set_scalar_diagnostic(&handles.down_sfc, sw.down_sfc())?;
            output.set_scalar_diagnostic(&handles.up_toa, sw.up_toa())?;
            output.set_scalar_diagnostic(&handles.planetary_albedo, fluxes.planetary_albedo())?;
            output.set_scalar_diagnostic(&handles.absorbed_sfc, absorbed_sfc)?;
            output.set_diagnostic(&handles.tdot, self.tdot(&absorbed_atm))?;
            output.set_diagnostic(&handles.flux_up, sw.up.clone())?;
            output.set_diagnostic(&handles.flux_down, sw.down.clone())?;
            heating_atm += &absorbed_atm;
            heating_sfc += absorbed_sfc;
            output.set_diagnostic(&handles.absorbed_atm, absorbed_atm)?;
        }

        output.set_tendency(
            &self.ts,
            Array1::from_elem(self.ts.len(), heating_sfc / self.surface_capacity),
        )?;
        output.set_tendency(&self.tatm, heating_atm / &self.atmosphere_capacity)?;
        Ok(output)
    }
}

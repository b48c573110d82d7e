//! Outgoing longwave radiation as a linear function of surface temperature.

use crate::parameters::LinearRadiationParameters;
use rscolumn_core::constants::TEMP_C_TO_K;
use rscolumn_core::errors::{ColumnError, ColumnResult};
use rscolumn_core::field::{FieldHandle, State, TS};
use rscolumn_core::heat_capacity::capacity_for;
use rscolumn_core::process::{DiagnosticHandle, Process, ProcessOutput, ProcessSchema};
use serde::{Deserialize, Serialize};

/// Surface cooling by `OLR = A + B * (Ts - 273.15)`
#[derive(Debug, Serialize, Deserialize)]
pub struct LinearRadiation {
    parameters: LinearRadiationParameters,
    heat_capacity: f64,
    schema: ProcessSchema,
    ts: FieldHandle,
    olr: DiagnosticHandle,
}

impl LinearRadiation {
    pub fn new(state: &State, parameters: LinearRadiationParameters) -> ColumnResult<Self> {
        let field = state
            .get(TS)
            .ok_or_else(|| ColumnError::UnknownField(TS.to_string()))?;
        let heat_capacity = capacity_for(field, &parameters.heat_capacity_parameters())?[0];

        let mut schema = ProcessSchema::new();
        let ts = schema.add_input(TS, field.len());
        schema.add_tendency(TS, field.len());
        let olr = schema.add_diagnostic("OLR", field.len());

        Ok(Self {
            parameters,
            heat_capacity,
            schema,
            ts,
            olr,
        })
    }

    pub fn parameters(&self) -> &LinearRadiationParameters {
        &self.parameters
    }

    /// Outgoing longwave radiation for a surface temperature (K)
    pub fn olr(&self, ts: f64) -> f64 {
        self.parameters.a + self.parameters.b * (ts - TEMP_C_TO_K)
    }
}

#[typetag::serde]
impl Process for LinearRadiation {
    fn schema(&self) -> &ProcessSchema {
        &self.schema
    }

    fn compute(&self, state: &State) -> ColumnResult<ProcessOutput> {
        let olr = self.ts.read(state)?.mapv(|ts| self.olr(ts));
        let mut output = ProcessOutput::new();
        output.set_tendency(&self.ts, olr.mapv(|f| -f / self.heat_capacity))?;
        output.set_diagnostic(&self.olr, olr)?;
        Ok(output)
    }
}

/// Equilibrium surface temperature (K) when `OLR` balances `asr`
pub fn equilibrium_temperature(parameters: &LinearRadiationParameters, asr: f64) -> f64 {
    TEMP_C_TO_K + (asr - parameters.a) / parameters.b
}

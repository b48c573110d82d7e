//! Radiative transfer for single-column models.
//!
//! The grey-gas solver in [`flux`] is a closed-form exchange solution for a
//! non-scattering column. [`Radiation`] wraps any [`RadiativeTransfer`] scheme as a
//! process, and [`external`] adapts compiled radiation libraries to the same
//! interface.

pub mod external;
pub mod flux;
pub mod linear;
pub mod parameters;
pub mod process;
pub mod transfer;
pub mod transmissivity;

pub use linear::LinearRadiation;
pub use parameters::{GreyRadiationParameters, LinearRadiationParameters};
pub use process::Radiation;
pub use transfer::{Band, BandFluxes, Column, FluxResult, GreyGas, OlrSplit, RadiativeTransfer};
pub use transmissivity::Transmissivity;

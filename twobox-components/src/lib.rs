//! Physics of the two-box energy-balance climate model.
//!
//! [`diagnostics`] holds the flux and moisture calculations, [`model`] the
//! time integration and [`analysis`] the quantities derived from a finished run.

pub mod analysis;
pub mod diagnostics;
pub mod model;

pub use model::{ModelState, TwoBoxModel};

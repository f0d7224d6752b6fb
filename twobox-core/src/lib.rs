//! Core data structures of the two-box energy-balance climate model.
//!
//! This crate holds everything that is not physics: the constants table,
//! run configuration, the prescribed CO2 trajectory, the per-box and global
//! series, and their tabular persistence. The diagnostics and the time
//! integration live in `twobox-components`.

pub mod calendar;
pub mod co2;
pub mod constants;
pub mod parameters;
pub mod persistence;
pub mod state;
pub mod timeseries;

pub mod errors;

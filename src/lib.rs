//! Two-box (tropics / extra-tropics) energy-balance climate model.
//!
//! The model itself lives in [`twobox_components`], its configuration, state
//! and persistence in [`twobox_core`]. This crate adds the [`driver`] which
//! runs a configured model end to end and the `twobox` command line tool.

pub mod driver;

pub use twobox_components;
pub use twobox_core;

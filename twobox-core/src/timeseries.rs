//! Numeric types shared by every series in the model.
//!
//! All series are one-dimensional [`ndarray`] arrays indexed by timestep,
//! with index 0 holding the initial conditions.

use ndarray::Array1;

pub type FloatValue = f64;
/// Simulation time in seconds since the start of the run.
pub type Time = f64;
/// A per-timestep series of length `N + 1`.
pub type Series = Array1<FloatValue>;

/// Allocate a zero-filled series for a run of `n_steps` timesteps.
pub fn zeros(n_steps: usize) -> Series {
    Series::zeros(n_steps + 1)
}

/// Index of the first non-finite value within the first `rows` entries, if any.
pub fn first_non_finite(series: &Series, rows: usize) -> Option<usize> {
    series
        .iter()
        .take(rows)
        .position(|value| !value.is_finite())
}

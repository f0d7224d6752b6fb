//! Model calendar: 30-day months and 12-month years.

use crate::constants::{DAY, MONTH, YEAR};
use crate::timeseries::{FloatValue, Time};
use std::fmt;

/// Elapsed simulation time split into whole years, months and days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationTime {
    pub years: u64,
    pub months: u64,
    pub days: u64,
}

impl SimulationTime {
    /// Elapsed time at the start of timestep `n`.
    pub fn from_step(n: usize, dt: Time) -> Self {
        Self::from_seconds(n as FloatValue * dt)
    }

    pub fn from_seconds(t: Time) -> Self {
        let years = (t / YEAR).floor();
        let months = ((t - years * YEAR) / MONTH).floor();
        let days = ((t - years * YEAR - months * MONTH) / DAY).floor();
        Self {
            years: years as u64,
            months: months as u64,
            days: days as u64,
        }
    }
}

impl fmt::Display for SimulationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}y, {}m, {}d", self.years, self.months, self.days)
    }
}

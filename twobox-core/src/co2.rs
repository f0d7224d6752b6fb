//! Prescribed CO2 trajectories
//!
//! CO2 is exogenous: the whole trajectory is computed once at initialisation
//! and is never fed back from the simulated temperatures.

use crate::constants::YEAR;
use crate::errors::{TwoBoxError, TwoBoxResult};
use crate::timeseries::{FloatValue, Series, Time};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Law followed by the CO2 concentration between its initial and final values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Co2Scenario {
    /// Remain at the initial concentration throughout the run.
    #[default]
    #[serde(alias = "none")]
    Constant,
    /// Increase linearly from the initial value at t = 0 to the final value at the end of the run.
    Linear,
    /// Approach the final value as $1 - e^{-t/\tau}$.
    #[serde(alias = "exp")]
    Exponential,
}

impl FromStr for Co2Scenario {
    type Err = TwoBoxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "constant" => Ok(Co2Scenario::Constant),
            "linear" => Ok(Co2Scenario::Linear),
            "exp" | "exponential" => Ok(Co2Scenario::Exponential),
            _ => Err(TwoBoxError::UnknownScenario(s.to_string())),
        }
    }
}

impl fmt::Display for Co2Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Co2Scenario::Constant => "none",
            Co2Scenario::Linear => "linear",
            Co2Scenario::Exponential => "exp",
        };
        write!(f, "{}", name)
    }
}

/// Parameters of the prescribed CO2 trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Co2Parameters {
    /// Trajectory law.
    /// Default: constant
    pub scenario: Co2Scenario,

    /// Concentration at t = 0 (ppm).
    /// Default: 280
    pub initial: FloatValue,

    /// Target concentration (ppm).
    /// Default: 560
    #[serde(rename = "final")]
    pub target: FloatValue,

    /// Time constant of the exponential law (model years).
    /// Default: 100
    pub tau_years: FloatValue,
}

impl Default for Co2Parameters {
    fn default() -> Self {
        Self {
            scenario: Co2Scenario::Constant,
            initial: 280.0,
            target: 560.0,
            tau_years: 100.0,
        }
    }
}

impl Co2Parameters {
    /// Check the parameters needed by the selected law.
    pub fn validate(&self) -> TwoBoxResult<()> {
        if !(self.initial.is_finite() && self.initial >= 0.0) {
            return Err(TwoBoxError::InvalidConfiguration(format!(
                "initial CO2 concentration must be finite and non-negative, got {}",
                self.initial
            )));
        }
        if self.scenario != Co2Scenario::Constant
            && !(self.target.is_finite() && self.target >= 0.0)
        {
            return Err(TwoBoxError::InvalidConfiguration(format!(
                "final CO2 concentration must be finite and non-negative, got {}",
                self.target
            )));
        }
        if self.scenario == Co2Scenario::Exponential
            && !(self.tau_years.is_finite() && self.tau_years > 0.0)
        {
            return Err(TwoBoxError::InvalidConfiguration(format!(
                "CO2 time constant must be positive, got {} years",
                self.tau_years
            )));
        }
        Ok(())
    }

    /// Concentration at simulation time `t` (s) of a run lasting `duration` (s).
    pub fn concentration_at(&self, t: Time, duration: Time) -> FloatValue {
        match self.scenario {
            Co2Scenario::Constant => self.initial,
            Co2Scenario::Linear => {
                if duration > 0.0 {
                    self.initial + (self.target - self.initial) * t / duration
                } else {
                    self.initial
                }
            }
            Co2Scenario::Exponential => {
                self.target - (self.target - self.initial) * (-t / (self.tau_years * YEAR)).exp()
            }
        }
    }

    /// Full trajectory for `n_steps` timesteps of length `dt`, one value per index `0..=n_steps`.
    pub fn trajectory(&self, n_steps: usize, dt: Time) -> Series {
        match self.scenario {
            Co2Scenario::Constant => Series::from_elem(n_steps + 1, self.initial),
            Co2Scenario::Linear => Series::linspace(self.initial, self.target, n_steps + 1),
            Co2Scenario::Exponential => {
                let duration = n_steps as FloatValue * dt;
                Series::from_shape_fn(n_steps + 1, |n| {
                    self.concentration_at(n as FloatValue * dt, duration)
                })
            }
        }
    }
}

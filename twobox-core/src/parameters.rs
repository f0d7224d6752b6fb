//! Run configuration
//!
//! Everything the model consumes at start-up: run length, timestep, initial
//! conditions, noise, the CO2 scenario, the moisture feedback switch, the
//! physical constants table and output settings.
//!
//! Every section carries `#[serde(default)]` so a TOML file only needs to
//! name the values it changes:
//!
//! ```toml
//! water_vapour_feedback = true
//!
//! [time]
//! years = 50.0
//!
//! [co2]
//! scenario = "exp"
//! final = 560.0
//! ```

use crate::co2::Co2Parameters;
use crate::constants::{PhysicalConstants, DAY, YEAR};
use crate::errors::{TwoBoxError, TwoBoxResult};
use crate::state::Region;
use crate::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Longest run accepted, in timesteps.
pub const MAX_STEPS: usize = 10_000_000;

/// Timestep and run length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeParameters {
    /// Timestep (s). Values above 2 days are prone to instability.
    /// Default: 1 day
    pub dt: Time,

    /// Run length in model years (360 days).
    /// Default: 500
    pub years: FloatValue,

    /// Explicit number of timesteps, overriding `years` when set.
    pub n_steps: Option<usize>,
}

impl Default for TimeParameters {
    fn default() -> Self {
        Self {
            dt: DAY,
            years: 500.0,
            n_steps: None,
        }
    }
}

impl TimeParameters {
    /// Number of timesteps `N`; series have `N + 1` entries.
    pub fn n_steps(&self) -> usize {
        match self.n_steps {
            Some(n) => n,
            None => (self.years * YEAR / self.dt).round().max(0.0) as usize,
        }
    }

    /// Simulated duration of the run (s).
    pub fn duration(&self) -> Time {
        self.n_steps() as FloatValue * self.dt
    }

    /// Convert an interval in model years to a whole number of timesteps (at least one).
    pub fn steps_in(&self, years: FloatValue) -> usize {
        ((years * YEAR / self.dt).round() as usize).max(1)
    }
}

/// Initial temperatures of a single box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxInitialConditions {
    /// Atmospheric temperature (K).
    pub ta: FloatValue,
    /// Surface (mixed layer) temperature (K).
    pub ts: FloatValue,
    /// Ocean thermocline temperature (K).
    pub to: FloatValue,
    /// Emission temperature override (K); derived from the constants when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub te: Option<FloatValue>,
}

/// Initial conditions and the random perturbation applied to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialConditions {
    /// Tropical box.
    /// Default: Ta = 260 K, Ts = 300 K, To = 280 K
    pub tropics: BoxInitialConditions,

    /// Extra-tropical box.
    /// Default: Ta = 240 K, Ts = 280 K, To = 280 K
    pub extratropics: BoxInitialConditions,

    /// Amplitude of the Gaussian noise added to each initial temperature (K).
    /// Default: 0
    pub ic: FloatValue,

    /// Seed of the random source used for initial noise and evaporation noise.
    /// Default: 0
    pub seed: u64,
}

impl Default for InitialConditions {
    fn default() -> Self {
        Self {
            tropics: BoxInitialConditions {
                ta: 260.0,
                ts: 300.0,
                to: 280.0,
                te: None,
            },
            extratropics: BoxInitialConditions {
                ta: 240.0,
                ts: 280.0,
                to: 280.0,
                te: None,
            },
            ic: 0.0,
            seed: 0,
        }
    }
}

impl InitialConditions {
    pub fn for_region(&self, region: Region) -> &BoxInitialConditions {
        match region {
            Region::Tropics => &self.tropics,
            Region::ExtraTropics => &self.extratropics,
        }
    }
}

/// Where and how often the driver reports and saves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputParameters {
    /// Directory receiving `box1.out`, `box2.out` and `global.out`.
    /// Default: `control/`
    pub directory: PathBuf,

    /// Progress is logged every this many model years.
    /// Default: 10
    pub print_interval_years: FloatValue,

    /// Checkpoints are written every this many model years.
    /// Default: 1000
    pub save_interval_years: FloatValue,
}

impl Default for OutputParameters {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("control/"),
            print_interval_years: 10.0,
            save_interval_years: 1000.0,
        }
    }
}

/// Complete configuration of a model run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    pub time: TimeParameters,
    pub initial: InitialConditions,
    pub co2: Co2Parameters,
    /// Recompute the humidity used for emissivity every step instead of
    /// freezing it at its initial value.
    /// Default: false
    pub water_vapour_feedback: bool,
    pub constants: PhysicalConstants,
    pub output: OutputParameters,
}

impl ModelParameters {
    /// Parse a TOML document.
    pub fn from_toml_str(contents: &str) -> TwoBoxResult<Self> {
        let parameters: ModelParameters = toml::from_str(contents)?;
        Ok(parameters)
    }

    /// Read a TOML configuration file.
    pub fn from_file(path: &Path) -> TwoBoxResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| TwoBoxError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Emission temperature of a box: the configured override or the derived value.
    pub fn emission_temperature(&self, region: Region) -> FloatValue {
        self.initial.for_region(region).te.unwrap_or(match region {
            Region::Tropics => self.constants.tropics_emission_temperature(),
            Region::ExtraTropics => self.constants.extratropics_emission_temperature(),
        })
    }

    /// Reject configurations the model cannot run.
    pub fn validate(&self) -> TwoBoxResult<()> {
        let time = &self.time;
        if !(time.dt.is_finite() && time.dt > 0.0) {
            return Err(invalid(format!("timestep must be positive, got {}", time.dt)));
        }
        if time.n_steps.is_none() && !(time.years.is_finite() && time.years > 0.0) {
            return Err(invalid(format!(
                "run length must be positive, got {} years",
                time.years
            )));
        }
        match time.n_steps() {
            0 => return Err(invalid("run length must contain at least one timestep")),
            n if n > MAX_STEPS => {
                return Err(invalid(format!(
                    "run length of {} timesteps exceeds the limit of {}",
                    n, MAX_STEPS
                )))
            }
            _ => {}
        }

        let initial = &self.initial;
        if !(initial.ic.is_finite() && initial.ic >= 0.0) {
            return Err(invalid(format!(
                "noise amplitude must be finite and non-negative, got {}",
                initial.ic
            )));
        }
        for region in Region::ALL {
            let conditions = initial.for_region(region);
            let temperatures = [conditions.ta, conditions.ts, conditions.to];
            if temperatures.iter().any(|t| !(t.is_finite() && *t > 0.0)) {
                return Err(invalid(format!(
                    "initial temperatures of the {} box must be positive, got {:?}",
                    region, temperatures
                )));
            }
        }

        self.co2.validate()?;

        let output = &self.output;
        for (name, interval) in [
            ("print", output.print_interval_years),
            ("save", output.save_interval_years),
        ] {
            if !(interval.is_finite() && interval > 0.0) {
                return Err(invalid(format!(
                    "{} interval must be positive, got {} years",
                    name, interval
                )));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> TwoBoxError {
    TwoBoxError::InvalidConfiguration(message.into())
}

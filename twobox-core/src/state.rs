//! Box and global state
//!
//! Every series has length `N + 1`. Index 0 holds the (possibly perturbed)
//! initial conditions; index `n + 1` is written only by the temperature
//! advance from values at index `n`.
//!
//! Columns are exposed in a fixed order which is also the on-disk layout of
//! the persisted tables (see [`crate::persistence`]).

use crate::errors::{TwoBoxError, TwoBoxResult};
use crate::timeseries::{self, FloatValue, Series, Time};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two boxes of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// Box 1
    Tropics,
    /// Box 2
    ExtraTropics,
}

impl Region {
    pub const ALL: [Region; 2] = [Region::Tropics, Region::ExtraTropics];

    /// Position of the box (0 for the tropics, 1 for the extra-tropics).
    pub fn index(self) -> usize {
        match self {
            Region::Tropics => 0,
            Region::ExtraTropics => 1,
        }
    }

    /// File stem of the persisted table for this box.
    pub fn file_stem(self) -> &'static str {
        match self {
            Region::Tropics => "box1",
            Region::ExtraTropics => "box2",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Tropics => write!(f, "tropics"),
            Region::ExtraTropics => write!(f, "extra-tropics"),
        }
    }
}

/// Column names of a box table, in persisted order.
pub const BOX_COLUMNS: [&str; 7] = ["Ta", "Ts", "To", "Ft", "Fs", "Feva", "MSE"];

/// Column names of the global table, in persisted order.
pub const GLOBAL_COLUMNS: [&str; 7] = ["time", "Fa", "Fo", "Psia", "Psio", "MTspt", "CO2"];

/// Time series of a single box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxState {
    pub region: Region,
    /// Emission temperature (K), fixed for the whole run.
    pub te: FloatValue,
    /// Atmospheric temperature (K).
    pub ta: Series,
    /// Surface (mixed layer) temperature (K).
    pub ts: Series,
    /// Ocean thermocline temperature (K).
    pub to: Series,
    /// Net top-of-atmosphere flux ($\text{W m}^{-2}$), positive downward.
    pub ft: Series,
    /// Net surface heat flux ($\text{W m}^{-2}$).
    pub fs: Series,
    /// Evaporative flux ($\text{W m}^{-2}$).
    pub feva: Series,
    /// Low-level moist static energy ($\text{J kg}^{-1}$).
    pub mse: Series,
}

impl BoxState {
    /// Allocate zero-filled series for a run of `n_steps` timesteps.
    pub fn new(region: Region, te: FloatValue, n_steps: usize) -> Self {
        Self {
            region,
            te,
            ta: timeseries::zeros(n_steps),
            ts: timeseries::zeros(n_steps),
            to: timeseries::zeros(n_steps),
            ft: timeseries::zeros(n_steps),
            fs: timeseries::zeros(n_steps),
            feva: timeseries::zeros(n_steps),
            mse: timeseries::zeros(n_steps),
        }
    }

    /// Build a box from columns in [`BOX_COLUMNS`] order.
    pub fn from_columns(
        region: Region,
        te: FloatValue,
        columns: [Series; 7],
    ) -> TwoBoxResult<Self> {
        check_lengths(&columns, &BOX_COLUMNS)?;
        let [ta, ts, to, ft, fs, feva, mse] = columns;
        Ok(Self {
            region,
            te,
            ta,
            ts,
            to,
            ft,
            fs,
            feva,
            mse,
        })
    }

    /// Series in [`BOX_COLUMNS`] order.
    pub fn columns(&self) -> [&Series; 7] {
        [
            &self.ta, &self.ts, &self.to, &self.ft, &self.fs, &self.feva, &self.mse,
        ]
    }

    /// Look up a series by its column name.
    pub fn column(&self, name: &str) -> Option<&Series> {
        BOX_COLUMNS
            .iter()
            .position(|column| *column == name)
            .map(|i| self.columns()[i])
    }

    pub fn len(&self) -> usize {
        self.ta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ta.is_empty()
    }
}

/// Series shared by both boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalState {
    /// Simulation time (s), `time[n] = n dt`.
    pub time: Series,
    /// Atmospheric heat transport from box 1 to box 2 ($\text{W m}^{-2}$).
    pub fa: Series,
    /// Oceanic heat transport ($\text{W m}^{-2}$).
    pub fo: Series,
    /// Atmospheric circulation strength (kg/s).
    pub psia: Series,
    /// Oceanic circulation strength (kg/s).
    pub psio: Series,
    /// Moisture transport (kg/s).
    pub mtspt: Series,
    /// Prescribed CO2 concentration (ppm).
    pub co2: Series,
}

impl GlobalState {
    /// Allocate the global series; `time` is filled, `co2` is the precomputed trajectory.
    pub fn new(n_steps: usize, dt: Time, co2: Series) -> TwoBoxResult<Self> {
        if co2.len() != n_steps + 1 {
            return Err(TwoBoxError::LengthMismatch {
                name: "CO2".to_string(),
                expected: n_steps + 1,
                actual: co2.len(),
            });
        }
        Ok(Self {
            time: Series::from_shape_fn(n_steps + 1, |n| n as FloatValue * dt),
            fa: timeseries::zeros(n_steps),
            fo: timeseries::zeros(n_steps),
            psia: timeseries::zeros(n_steps),
            psio: timeseries::zeros(n_steps),
            mtspt: timeseries::zeros(n_steps),
            co2,
        })
    }

    /// Build the global state from columns in [`GLOBAL_COLUMNS`] order.
    pub fn from_columns(columns: [Series; 7]) -> TwoBoxResult<Self> {
        check_lengths(&columns, &GLOBAL_COLUMNS)?;
        let [time, fa, fo, psia, psio, mtspt, co2] = columns;
        Ok(Self {
            time,
            fa,
            fo,
            psia,
            psio,
            mtspt,
            co2,
        })
    }

    /// Series in [`GLOBAL_COLUMNS`] order.
    pub fn columns(&self) -> [&Series; 7] {
        [
            &self.time, &self.fa, &self.fo, &self.psia, &self.psio, &self.mtspt, &self.co2,
        ]
    }

    /// Look up a series by its column name.
    pub fn column(&self, name: &str) -> Option<&Series> {
        GLOBAL_COLUMNS
            .iter()
            .position(|column| *column == name)
            .map(|i| self.columns()[i])
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

fn check_lengths(columns: &[Series; 7], names: &[&str; 7]) -> TwoBoxResult<()> {
    let expected = columns[0].len();
    for (series, name) in columns.iter().zip(names) {
        if series.len() != expected {
            return Err(TwoBoxError::LengthMismatch {
                name: name.to_string(),
                expected,
                actual: series.len(),
            });
        }
    }
    Ok(())
}

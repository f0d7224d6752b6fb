//! Derived quantities of a completed or reloaded run.
//!
//! Everything here is computed after the fact from the recorded series, the
//! same way for a model still in memory and for tables read back from disk.

use ndarray::s;
use serde::{Deserialize, Serialize};
use std::fmt;
use twobox_core::constants::{PhysicalConstants, DAY, PW, YEAR};
use twobox_core::state::{BoxState, GlobalState, Region};
use twobox_core::timeseries::{first_non_finite, FloatValue, Series};

/// Model time converted from seconds to years.
pub fn time_in_years(global: &GlobalState) -> Series {
    global.time.mapv(|t| t / YEAR)
}

/// Meridional heat transport (PW).
#[derive(Debug, Clone, PartialEq)]
pub struct HeatTransport {
    pub atmosphere: Series,
    pub ocean: Series,
    pub total: Series,
}

pub fn heat_transport(global: &GlobalState, constants: &PhysicalConstants) -> HeatTransport {
    let scale = constants.box_area() / PW;
    let atmosphere = &global.fa * scale;
    let ocean = &global.fo * scale;
    let total = (&global.fa + &global.fo) * scale;
    HeatTransport {
        atmosphere,
        ocean,
        total,
    }
}

/// Water budget of one box.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydrology {
    /// Evaporation (kg/s).
    pub evaporation: Series,
    /// Precipitation (kg/s): local evaporation corrected for moisture transport.
    pub precipitation: Series,
    /// Precipitation spread over the box (mm/day).
    pub precipitation_mm_day: Series,
    /// Low-level specific humidity recovered from the moist static energy (kg/kg).
    pub specific_humidity: Series,
}

/// Water budget of a box.
///
/// Moisture exported by the circulation rains out in box 2, so it is
/// subtracted from the tropical precipitation and added to the extra-tropical
/// precipitation.
pub fn hydrology(
    state: &BoxState,
    global: &GlobalState,
    constants: &PhysicalConstants,
) -> Hydrology {
    let area = constants.box_area();
    let evaporation = &state.feva * (area / constants.latent_heat);
    let precipitation = match state.region {
        Region::Tropics => &evaporation - &global.mtspt,
        Region::ExtraTropics => &evaporation + &global.mtspt,
    };
    let precipitation_mm_day =
        precipitation.mapv(|p| 1000.0 * p * DAY / (constants.water_density * area));

    let sensible = (&state.ta + &state.ts) * (0.5 * constants.air_specific_heat);
    let specific_humidity = (&state.mse - &sensible) / constants.latent_heat;

    Hydrology {
        evaporation,
        precipitation,
        precipitation_mm_day,
        specific_humidity,
    }
}

/// Heat content of one box ($\text{J m}^{-2}$).
#[derive(Debug, Clone, PartialEq)]
pub struct HeatContent {
    /// $HC_A T_a$. Uses the pseudo heat capacity of the atmosphere.
    pub atmosphere: Series,
    pub mixed_layer: Series,
    pub thermocline: Series,
    /// Mixed layer plus thermocline.
    pub ocean: Series,
}

pub fn heat_content(state: &BoxState, constants: &PhysicalConstants) -> HeatContent {
    let atmosphere = &state.ta * constants.atmosphere_heat_capacity();
    let mixed_layer = &state.ts * constants.mixed_layer_heat_capacity();
    let thermocline = &state.to * constants.thermocline_heat_capacity();
    let ocean = &mixed_layer + &thermocline;
    HeatContent {
        atmosphere,
        mixed_layer,
        thermocline,
        ocean,
    }
}

impl HeatContent {
    /// Heat content relative to the first entry of each series.
    pub fn change_from_initial(&self) -> HeatContent {
        HeatContent {
            atmosphere: change_from_initial(&self.atmosphere),
            mixed_layer: change_from_initial(&self.mixed_layer),
            thermocline: change_from_initial(&self.thermocline),
            ocean: change_from_initial(&self.ocean),
        }
    }
}

/// Subtract the first entry from every entry. Empty series are returned as is.
pub fn change_from_initial(series: &Series) -> Series {
    match series.first() {
        Some(initial) => series.mapv(|v| v - initial),
        None => series.clone(),
    }
}

/// Two-box averages of each temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanTemperatures {
    pub atmosphere: Series,
    pub surface: Series,
    pub ocean: Series,
}

pub fn mean_temperatures(tropics: &BoxState, extratropics: &BoxState) -> MeanTemperatures {
    MeanTemperatures {
        atmosphere: (&tropics.ta + &extratropics.ta) * 0.5,
        surface: (&tropics.ts + &extratropics.ts) * 0.5,
        ocean: (&tropics.to + &extratropics.to) * 0.5,
    }
}

/// First row holding a NaN or infinite value in any column, if any.
pub fn first_non_finite_row(
    tropics: &BoxState,
    extratropics: &BoxState,
    global: &GlobalState,
) -> Option<usize> {
    let rows = global.len();
    tropics
        .columns()
        .into_iter()
        .chain(extratropics.columns())
        .chain(global.columns())
        .filter_map(|series| first_non_finite(series, rows))
        .min()
}

/// Per-box values of the final row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub ta: FloatValue,
    pub ts: FloatValue,
    pub to: FloatValue,
    pub evaporation: FloatValue,
    pub precipitation_mm_day: FloatValue,
    pub specific_humidity: FloatValue,
    pub ocean_heat_content_change: FloatValue,
}

/// The final state of a run and its derived quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub years: FloatValue,
    pub co2: FloatValue,
    pub tropics: BoxSummary,
    pub extratropics: BoxSummary,
    pub mean_atmosphere: FloatValue,
    pub mean_surface: FloatValue,
    pub mean_ocean: FloatValue,
    pub atmospheric_transport: FloatValue,
    pub oceanic_transport: FloatValue,
    pub total_transport: FloatValue,
}

impl RunSummary {
    /// Summarise the last of `rows` rows. Returns `None` when `rows` is zero
    /// or exceeds the recorded series.
    pub fn from_states(
        tropics: &BoxState,
        extratropics: &BoxState,
        global: &GlobalState,
        constants: &PhysicalConstants,
        rows: usize,
    ) -> Option<Self> {
        if rows == 0 || rows > global.len() || rows > tropics.len() || rows > extratropics.len()
        {
            return None;
        }
        let last = rows - 1;
        let global = &slice_global(global, rows);

        let box_summary = |state: &BoxState| {
            let state = slice_box(state, rows);
            let hydrology = hydrology(&state, global, constants);
            let heat = heat_content(&state, constants).change_from_initial();
            BoxSummary {
                ta: state.ta[last],
                ts: state.ts[last],
                to: state.to[last],
                evaporation: hydrology.evaporation[last],
                precipitation_mm_day: hydrology.precipitation_mm_day[last],
                specific_humidity: hydrology.specific_humidity[last],
                ocean_heat_content_change: heat.ocean[last],
            }
        };
        let tropics_summary = box_summary(tropics);
        let extratropics_summary = box_summary(extratropics);

        let transport = heat_transport(global, constants);
        let means = mean_temperatures(&slice_box(tropics, rows), &slice_box(extratropics, rows));
        Some(Self {
            years: time_in_years(global)[last],
            co2: global.co2[last],
            mean_atmosphere: means.atmosphere[last],
            mean_surface: means.surface[last],
            mean_ocean: means.ocean[last],
            tropics: tropics_summary,
            extratropics: extratropics_summary,
            atmospheric_transport: transport.atmosphere[last],
            oceanic_transport: transport.ocean[last],
            total_transport: transport.total[last],
        })
    }
}

fn slice_box(state: &BoxState, rows: usize) -> BoxState {
    let prefix = |series: &Series| series.slice(s![..rows]).to_owned();
    BoxState {
        region: state.region,
        te: state.te,
        ta: prefix(&state.ta),
        ts: prefix(&state.ts),
        to: prefix(&state.to),
        ft: prefix(&state.ft),
        fs: prefix(&state.fs),
        feva: prefix(&state.feva),
        mse: prefix(&state.mse),
    }
}

fn slice_global(global: &GlobalState, rows: usize) -> GlobalState {
    let prefix = |series: &Series| series.slice(s![..rows]).to_owned();
    GlobalState {
        time: prefix(&global.time),
        fa: prefix(&global.fa),
        fo: prefix(&global.fo),
        psia: prefix(&global.psia),
        psio: prefix(&global.psio),
        mtspt: prefix(&global.mtspt),
        co2: prefix(&global.co2),
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation time: {:.2} years (CO2 {:.1} ppm)", self.years, self.co2)?;
        writeln!(
            f,
            "Mean temperatures (K): atmosphere {:.3}, surface {:.3}, ocean {:.3}",
            self.mean_atmosphere, self.mean_surface, self.mean_ocean
        )?;
        writeln!(
            f,
            "Heat transport (PW): atmosphere {:.4}, ocean {:.4}, total {:.4}",
            self.atmospheric_transport, self.oceanic_transport, self.total_transport
        )?;
        for (name, summary) in [("Tropics", &self.tropics), ("Extra-tropics", &self.extratropics)]
        {
            writeln!(
                f,
                "{}: Ta {:.3} K, Ts {:.3} K, To {:.3} K, precipitation {:.3} mm/day, \
                 q {:.5} kg/kg, ocean heat content change {:.4e} J/m^2",
                name,
                summary.ta,
                summary.ts,
                summary.to,
                summary.precipitation_mm_day,
                summary.specific_humidity,
                summary.ocean_heat_content_change
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn box_state(region: Region) -> BoxState {
        BoxState {
            region,
            te: 255.0,
            ta: array![260.0, 261.0, 262.0],
            ts: array![300.0, 300.5, 301.0],
            to: array![280.0, 280.0, 280.1],
            ft: array![0.0, 0.0, 0.0],
            fs: array![0.0, 0.0, 0.0],
            feva: array![0.0, 50.0, 100.0],
            mse: array![295_000.0, 295_800.0, 296_500.0],
        }
    }

    fn global_state() -> GlobalState {
        GlobalState {
            time: array![0.0, YEAR, 2.0 * YEAR],
            fa: array![30.0, 31.0, 32.0],
            fo: array![5.0, 5.5, 6.0],
            psia: array![1.0e11, 1.0e11, 1.0e11],
            psio: array![1.0e10, 1.0e10, 1.0e10],
            mtspt: array![1.0e8, 2.0e8, 3.0e8],
            co2: array![280.0, 280.0, 280.0],
        }
    }

    #[test]
    fn test_time_in_years() {
        assert_eq!(time_in_years(&global_state()), array![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_heat_transport_in_petawatts() {
        let constants = PhysicalConstants::default();
        let transport = heat_transport(&global_state(), &constants);

        // 30 W/m^2 over pi * (6371 km)^2 ~= 3.83 PW
        assert_relative_eq!(
            transport.atmosphere[0],
            30.0 * constants.box_area() / 1.0e15,
            max_relative = 1e-12
        );
        assert!((transport.atmosphere[0] - 3.825).abs() < 1e-2);
        for n in 0..3 {
            assert_relative_eq!(
                transport.total[n],
                transport.atmosphere[n] + transport.ocean[n],
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn test_precipitation_sign_by_region() {
        let constants = PhysicalConstants::default();
        let global = global_state();
        let tropics = hydrology(&box_state(Region::Tropics), &global, &constants);
        let extratropics = hydrology(&box_state(Region::ExtraTropics), &global, &constants);

        assert_eq!(tropics.evaporation, extratropics.evaporation);
        assert_relative_eq!(
            tropics.precipitation[2],
            tropics.evaporation[2] - 3.0e8,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            extratropics.precipitation[2],
            extratropics.evaporation[2] + 3.0e8,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_precipitation_units() {
        let constants = PhysicalConstants::default();
        let hydrology = hydrology(&box_state(Region::ExtraTropics), &global_state(), &constants);

        // 1 W/m^2 of latent heat is 1/L kg/m^2/s, i.e. 86400/2.5e6 mm/day
        let evaporation_only = &hydrology.precipitation - &global_state().mtspt;
        let mm_day = 1000.0 * evaporation_only[1] * DAY
            / (constants.water_density * constants.box_area());
        assert_relative_eq!(mm_day, 50.0 * DAY / 2.5e6, max_relative = 1e-9);
    }

    #[test]
    fn test_specific_humidity_from_mse() {
        let constants = PhysicalConstants::default();
        let hydrology = hydrology(&box_state(Region::Tropics), &global_state(), &constants);

        // (295000 - 1000 * 280) / 2.5e6
        assert_relative_eq!(hydrology.specific_humidity[0], 0.006, max_relative = 1e-12);
    }

    #[test]
    fn test_heat_content_change() {
        let constants = PhysicalConstants::default();
        let heat = heat_content(&box_state(Region::Tropics), &constants);
        let change = heat.change_from_initial();

        assert_eq!(change.atmosphere[0], 0.0);
        assert_eq!(change.ocean[0], 0.0);
        assert_relative_eq!(
            change.mixed_layer[2],
            1.0 * constants.mixed_layer_heat_capacity(),
            max_relative = 1e-9
        );
        assert_relative_eq!(
            heat.ocean[1],
            heat.mixed_layer[1] + heat.thermocline[1],
            max_relative = 1e-12
        );
        assert!(change_from_initial(&Series::zeros(0)).is_empty());
    }

    #[test]
    fn test_mean_temperatures() {
        let tropics = box_state(Region::Tropics);
        let mut extratropics = box_state(Region::ExtraTropics);
        extratropics.ta -= 20.0;

        let means = mean_temperatures(&tropics, &extratropics);
        assert_eq!(means.atmosphere, array![250.0, 251.0, 252.0]);
        assert_eq!(means.surface, tropics.ts);
    }

    #[test]
    fn test_first_non_finite_row() {
        let tropics = box_state(Region::Tropics);
        let mut extratropics = box_state(Region::ExtraTropics);
        let mut global = global_state();
        assert_eq!(first_non_finite_row(&tropics, &extratropics, &global), None);

        global.fa[2] = FloatValue::INFINITY;
        extratropics.mse[1] = FloatValue::NAN;
        assert_eq!(first_non_finite_row(&tropics, &extratropics, &global), Some(1));
    }

    #[test]
    fn test_summary_of_prefix() {
        let constants = PhysicalConstants::default();
        let tropics = box_state(Region::Tropics);
        let extratropics = box_state(Region::ExtraTropics);
        let global = global_state();

        let summary =
            RunSummary::from_states(&tropics, &extratropics, &global, &constants, 2).unwrap();
        assert_eq!(summary.years, 1.0);
        assert_eq!(summary.tropics.ta, 261.0);
        assert_eq!(summary.mean_surface, 300.5);

        let full =
            RunSummary::from_states(&tropics, &extratropics, &global, &constants, 3).unwrap();
        assert_eq!(full.years, 2.0);
        assert!(full.to_string().contains("Simulation time: 2.00 years"));
        let json = serde_json::to_value(&full).unwrap();
        assert_eq!(json["tropics"]["ta"], 262.0);

        assert!(RunSummary::from_states(&tropics, &extratropics, &global, &constants, 0).is_none());
        assert!(RunSummary::from_states(&tropics, &extratropics, &global, &constants, 4).is_none());
    }
}

//! Physical constants
//!
//! Units, planetary constants and the radiative, convective and circulation
//! parameterisations shared by every diagnostic calculation.
//!
//! The [`PhysicalConstants`] table is part of the run configuration so each
//! value may be overridden, but it is fixed once a model has been initialised.

use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Kilometre (m).
pub const KM: FloatValue = 1000.0;
/// Petawatt (W).
pub const PW: FloatValue = 1.0e15;
/// Day (s).
pub const DAY: FloatValue = 24.0 * 3600.0;
/// Model month of 30 days (s).
pub const MONTH: FloatValue = 30.0 * DAY;
/// Model year of 12 months (s).
pub const YEAR: FloatValue = 12.0 * MONTH;
/// Millibar (Pa).
pub const MB: FloatValue = 100.0;
/// Mass transport unit used for circulation strengths (kg/s).
pub const SV: FloatValue = 1.0e9;

/// Constants used by the two-box model.
///
/// # Derived quantities
///
/// Heat capacities and emission temperatures are derived from the table:
///
/// - $HC_M = \rho c_{p,o} h_m$, $HC_O = \rho c_{p,o} h_o$
/// - $HC_A = 2 c_{p,a} p_{atm} / g$ (a pseudo-heat capacity including moisture)
/// - $T_e = \left(\frac{S_0 (1-\alpha_p)}{4\sigma}\right)^{1/4}$ globally
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    // Planetary
    /// Planetary radius (m).
    /// Default: 6371 km
    pub radius: FloatValue,

    /// Gravitational acceleration ($\text{m s}^{-2}$).
    /// Default: 9.81
    pub gravity: FloatValue,

    /// Stefan-Boltzmann constant ($\text{W m}^{-2}\text{ K}^{-4}$).
    /// Default: 5.67e-8
    pub stefan_boltzmann: FloatValue,

    /// Solar constant ($\text{W m}^{-2}$).
    /// Default: 1367
    pub solar_constant: FloatValue,

    /// Planetary albedo.
    /// Default: 0.3
    pub planetary_albedo: FloatValue,

    // Ocean
    /// Density of water ($\text{kg m}^{-3}$).
    /// Default: 1000
    pub water_density: FloatValue,

    /// Specific heat capacity of water ($\text{J kg}^{-1}\text{ K}^{-1}$).
    /// Default: 4000
    pub ocean_specific_heat: FloatValue,

    /// Mixed layer thickness (m).
    /// Default: 50
    pub mixed_layer_depth: FloatValue,

    /// Thermocline thickness (m).
    /// Default: 500
    pub thermocline_depth: FloatValue,

    // Atmosphere
    /// Low-level ambient pressure at which humidity is evaluated (mb).
    /// Default: 750
    pub ambient_pressure: FloatValue,

    /// Relative humidity at the ambient pressure level.
    /// Default: 0.6
    pub relative_humidity: FloatValue,

    /// Specific heat capacity of dry air ($\text{J kg}^{-1}\text{ K}^{-1}$).
    /// Default: 1000
    pub air_specific_heat: FloatValue,

    /// Surface atmospheric pressure (Pa).
    /// Default: 1000 mb
    pub surface_pressure: FloatValue,

    /// Latent heat of vaporisation ($\text{J kg}^{-1}$).
    /// Default: 2.5e6
    pub latent_heat: FloatValue,

    // Convection and circulation
    /// Surface-atmosphere temperature difference above which evaporation starts (K).
    /// Default: 40
    pub convective_threshold: FloatValue,

    /// Ratio of oceanic to atmospheric circulation strength.
    /// Default: 0.1
    pub circulation_ratio: FloatValue,

    /// Evaporative flux per kelvin above the convective threshold ($\text{W m}^{-2}\text{ K}^{-1}$).
    /// Default: 100
    pub evaporation_coefficient: FloatValue,

    /// Atmospheric mass flux per kelvin of inter-box surface temperature difference ($\text{kg s}^{-1}\text{ K}^{-1}$).
    /// Default: 100 Sv / 15
    pub circulation_coefficient: FloatValue,

    // Radiation
    /// Water vapour factor in the optical depth (per g/kg).
    /// Default: 1.25
    pub water_vapour_emissivity: FloatValue,

    /// CO2 factor in the optical depth (per ppm).
    /// Default: 0.0012
    pub co2_emissivity: FloatValue,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            // Planetary
            radius: 6371.0 * KM,
            gravity: 9.81,
            stefan_boltzmann: 5.67e-8,
            solar_constant: 1367.0,
            planetary_albedo: 0.3,

            // Ocean
            water_density: 1000.0,
            ocean_specific_heat: 4000.0,
            mixed_layer_depth: 50.0,
            thermocline_depth: 500.0,

            // Atmosphere
            ambient_pressure: 750.0,
            relative_humidity: 0.6,
            air_specific_heat: 1000.0,
            surface_pressure: 1000.0 * MB,
            latent_heat: 2.5e6,

            // Convection and circulation
            convective_threshold: 40.0,
            circulation_ratio: 0.1,
            evaporation_coefficient: 100.0,
            circulation_coefficient: 100.0 * SV / 15.0,

            // Radiation
            water_vapour_emissivity: 1.25,
            co2_emissivity: 0.0012,
        }
    }
}

impl PhysicalConstants {
    /// Heat capacity of the mixed layer ($\text{J K}^{-1}\text{ m}^{-2}$).
    pub fn mixed_layer_heat_capacity(&self) -> FloatValue {
        self.water_density * self.ocean_specific_heat * self.mixed_layer_depth
    }

    /// Heat capacity of the thermocline ($\text{J K}^{-1}\text{ m}^{-2}$).
    pub fn thermocline_heat_capacity(&self) -> FloatValue {
        self.water_density * self.ocean_specific_heat * self.thermocline_depth
    }

    /// Atmospheric pseudo-heat capacity ($\text{J K}^{-1}\text{ m}^{-2}$).
    ///
    /// Twice the dry-air specific heat stands in for moisture effects.
    pub fn atmosphere_heat_capacity(&self) -> FloatValue {
        2.0 * self.air_specific_heat * self.surface_pressure / self.gravity
    }

    /// Area used to normalise inter-box transports, $\pi R^2$ ($\text{m}^2$).
    pub fn box_area(&self) -> FloatValue {
        PI * self.radius.powi(2)
    }

    fn absorbed_solar(&self) -> FloatValue {
        self.solar_constant * (1.0 - self.planetary_albedo)
    }

    /// Global mean emission temperature (K).
    pub fn global_emission_temperature(&self) -> FloatValue {
        (self.absorbed_solar() / (4.0 * self.stefan_boltzmann)).powf(0.25)
    }

    /// Emission temperature of the tropical box (K).
    pub fn tropics_emission_temperature(&self) -> FloatValue {
        let weight = PI / 3.0 + 0.5 * 3.0_f64.sqrt();
        (self.absorbed_solar() * weight / (2.0 * PI * self.stefan_boltzmann)).powf(0.25)
    }

    /// Emission temperature of the extra-tropical box (K).
    pub fn extratropics_emission_temperature(&self) -> FloatValue {
        let weight = 2.0 * PI / 3.0 - 0.5 * 3.0_f64.sqrt();
        (self.absorbed_solar() * weight / (2.0 * PI * self.stefan_boltzmann)).powf(0.25)
    }
}

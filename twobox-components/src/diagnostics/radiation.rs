//! Longwave radiation: atmospheric emissivity and top-of-atmosphere flux.

use super::humidity::Humidity;
use twobox_core::constants::PhysicalConstants;
use twobox_core::timeseries::FloatValue;

/// Emissivity of the atmospheric column.
///
/// The optical depth is linear in CO2 (ppm) and in the low-level specific
/// humidity $q_a = 1000\, RH\, q_{sat}$ (g/kg):
///
/// $$\tau = \alpha\, CO_2 + \gamma\, q_a, \qquad \epsilon_a = 1 - e^{-\tau}$$
///
/// Increasing in both CO2 and humidity, bounded in $[0, 1)$ for finite input.
pub fn atmospheric_emissivity(
    humidity: Humidity,
    co2: FloatValue,
    constants: &PhysicalConstants,
) -> FloatValue {
    let qa = 1000.0 * constants.relative_humidity * humidity.qsat;
    let optical_depth = constants.co2_emissivity * co2 + constants.water_vapour_emissivity * qa;
    1.0 - (-optical_depth).exp()
}

/// Net top-of-atmosphere flux ($\text{W m}^{-2}$), positive downward.
///
/// $$F_t = \sigma T_e^4 - \sigma\left(\epsilon_a T_a^4 + (1 - \epsilon_a) T_s^4\right)$$
pub fn top_of_atmosphere_flux(
    ts: FloatValue,
    ta: FloatValue,
    te: FloatValue,
    epsa: FloatValue,
    constants: &PhysicalConstants,
) -> FloatValue {
    let sigma = constants.stefan_boltzmann;
    let down = sigma * te.powi(4);
    let up = sigma * (epsa * ta.powi(4) + (1.0 - epsa) * ts.powi(4));
    down - up
}

//! Saturation humidity, moist static energy and moisture transport.

use serde::{Deserialize, Serialize};
use twobox_core::constants::PhysicalConstants;
use twobox_core::timeseries::FloatValue;

/// Ratio of the gas constants of dry air and water vapour, $R_d / R_v$.
pub const EPSILON: FloatValue = 0.62197;

/// Lowest temperature (K) fed to the ice-phase vapour pressure formula.
const ICE_TEMPERATURE_FLOOR: FloatValue = 35.0;

/// Saturation state of low-level air.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Humidity {
    /// Saturation water vapour pressure (mb).
    pub esat: FloatValue,
    /// Saturation specific humidity (kg/kg).
    pub qsat: FloatValue,
}

/// Saturation vapour pressure and specific humidity.
///
/// Evaluated at the average of the surface and atmospheric temperatures,
/// $T_{sa} = (T_s + T_a)/2$, which also selects the phase: a Tetens-type
/// formula over liquid water when $T_{sa} \ge 0\,^\circ\text{C}$, an ice
/// formula otherwise. Specific humidity follows from
///
/// $$q_{sat} = \frac{\epsilon\, e_{sat}}{p - e_{sat}(1 - \epsilon)}$$
///
/// with `pressure` in mb. When the denominator reaches zero the result is
/// infinite and is passed on unchanged.
pub fn saturation_humidity(ts: FloatValue, ta: FloatValue, pressure: FloatValue) -> Humidity {
    let tsa = 0.5 * (ts + ta);
    let tc = tsa - 273.15;

    let esat = if tc >= 0.0 {
        6.112 * (17.67 * tc / (243.5 + tc)).exp()
    } else {
        // Written out rather than `f64::max` so a NaN temperature stays NaN
        let t = if tsa < ICE_TEMPERATURE_FLOOR {
            ICE_TEMPERATURE_FLOOR
        } else {
            tsa
        };
        (23.33086 - 6111.72784 / t + 0.15215 * t.ln()).exp()
    };

    let qsat = EPSILON * esat / (pressure - esat * (1.0 - EPSILON));
    Humidity { esat, qsat }
}

/// Low-level moist static energy ($\text{J kg}^{-1}$), geopotential omitted.
///
/// $$MSE = L_v \, RH \, q_{sat} + c_{p,a} \frac{T_s + T_a}{2}$$
pub fn moist_static_energy(
    ts: FloatValue,
    ta: FloatValue,
    qsat: FloatValue,
    constants: &PhysicalConstants,
) -> FloatValue {
    let qa = constants.relative_humidity * qsat;
    constants.latent_heat * qa + constants.air_specific_heat * 0.5 * (ts + ta)
}

/// Moisture carried from box 1 to box 2 by the atmospheric circulation (kg/s).
pub fn moisture_transport(
    psia: FloatValue,
    qsat_a: FloatValue,
    qsat_b: FloatValue,
    constants: &PhysicalConstants,
) -> FloatValue {
    let qa_a = constants.relative_humidity * qsat_a;
    let qa_b = constants.relative_humidity * qsat_b;
    psia * (qa_a - qa_b)
}

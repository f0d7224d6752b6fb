//! Inter-box circulation and the heat it carries.

use serde::{Deserialize, Serialize};
use twobox_core::constants::PhysicalConstants;
use twobox_core::timeseries::FloatValue;

/// Circulation strengths between the two boxes (kg/s).
///
/// Positive when box 1 is the warmer box, i.e. flow runs from the warmer to
/// the colder box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circulation {
    pub atmosphere: FloatValue,
    pub ocean: FloatValue,
}

/// Circulation strength, linear in the surface temperature difference.
///
/// $$\Psi_a = k\,(T_{s,a} - T_{s,b}), \qquad \Psi_o = f\,\Psi_a$$
pub fn circulation_strength(
    ts_a: FloatValue,
    ts_b: FloatValue,
    constants: &PhysicalConstants,
) -> Circulation {
    let atmosphere = constants.circulation_coefficient * (ts_a - ts_b);
    Circulation {
        atmosphere,
        ocean: atmosphere * constants.circulation_ratio,
    }
}

/// Atmospheric heat transport from box a to box b ($\text{W m}^{-2}$).
///
/// $$F_a = \Psi_a (MSE_a - MSE_b) / \pi R^2$$
pub fn atmospheric_flux(
    psia: FloatValue,
    mse_a: FloatValue,
    mse_b: FloatValue,
    constants: &PhysicalConstants,
) -> FloatValue {
    psia * (mse_a - mse_b) / constants.box_area()
}

/// Oceanic heat transport ($\text{W m}^{-2}$), carried by water leaving the
/// surface of box a and returning through the thermocline of box b.
///
/// $$F_o = \Psi_o c_{p,o} (T_{s,a} - T_{o,b}) / \pi R^2$$
pub fn oceanic_flux(
    psio: FloatValue,
    ts_a: FloatValue,
    to_b: FloatValue,
    constants: &PhysicalConstants,
) -> FloatValue {
    psio * constants.ocean_specific_heat * (ts_a - to_b) / constants.box_area()
}

/// Oceanic circulation rescaled from kg/s to a heat exchange coefficient
/// ($\text{W m}^{-2}\text{ K}^{-1}$).
pub fn ocean_exchange_coefficient(psio: FloatValue, constants: &PhysicalConstants) -> FloatValue {
    psio * constants.ocean_specific_heat / constants.box_area()
}

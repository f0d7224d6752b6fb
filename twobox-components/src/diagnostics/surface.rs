//! Net surface heat flux, including stochastic convective evaporation.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use twobox_core::constants::PhysicalConstants;
use twobox_core::timeseries::FloatValue;

/// Relative amplitude of the noise applied to evaporation.
pub const EVAPORATION_NOISE: FloatValue = 0.05;

/// Surface heat fluxes of a box ($\text{W m}^{-2}$).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceFlux {
    /// Net surface flux, radiative plus evaporative.
    pub net: FloatValue,
    /// Evaporative part of the net flux.
    pub evaporation: FloatValue,
}

/// Net surface heat flux.
///
/// The radiative part is $\sigma(T_s^4 - T_e^4 - \epsilon_a T_a^4)$.
/// Evaporation is zero unless $T_s - T_a$ exceeds the convective threshold
/// $\Delta T_c$, in which case
///
/// $$F_{eva} = B\,(1 + 0.05\,\xi)\,(T_s - T_a - \Delta T_c), \qquad \xi \sim \mathcal{N}(0, 1)$$
///
/// One normal deviate is drawn from `rng` per call, and only when the
/// threshold is exceeded.
pub fn surface_flux<R: Rng + ?Sized>(
    ts: FloatValue,
    ta: FloatValue,
    te: FloatValue,
    epsa: FloatValue,
    constants: &PhysicalConstants,
    rng: &mut R,
) -> SurfaceFlux {
    let radiative = constants.stefan_boltzmann * (ts.powi(4) - te.powi(4) - epsa * ta.powi(4));

    let excess = ts - ta - constants.convective_threshold;
    let evaporation = if excess > 0.0 {
        let xi: FloatValue = StandardNormal.sample(rng);
        constants.evaporation_coefficient * (1.0 + EVAPORATION_NOISE * xi) * excess
    } else {
        0.0
    };

    SurfaceFlux {
        net: radiative + evaporation,
        evaporation,
    }
}

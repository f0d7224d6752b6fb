//! Diagnostic calculations
//!
//! Pure functions of the instantaneous state of one or both boxes. Apart from
//! [`surface_flux`], which draws evaporation noise from the supplied
//! generator, none of them hold state.
//!
//! Units follow the model's conventions: temperatures in K, pressures in mb,
//! fluxes in $\text{W m}^{-2}$ per box area $\pi R^2$, circulation in kg/s.

mod circulation;
mod humidity;
mod radiation;
mod surface;

pub use circulation::{
    atmospheric_flux, circulation_strength, ocean_exchange_coefficient, oceanic_flux, Circulation,
};
pub use humidity::{
    moist_static_energy, moisture_transport, saturation_humidity, Humidity, EPSILON,
};
pub use radiation::{atmospheric_emissivity, top_of_atmosphere_flux};
pub use surface::{surface_flux, SurfaceFlux, EVAPORATION_NOISE};

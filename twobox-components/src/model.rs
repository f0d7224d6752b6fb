//! Two-box integrator
//!
//! # What This Component Does
//!
//! Owns the full time series of a run and advances six temperatures with a
//! forward-Euler scheme:
//!
//! | Index | Variable | Reservoir |
//! |-------|----------|-----------|
//! | 0 | $T_{a,1}$ | tropical atmosphere |
//! | 1 | $T_{a,2}$ | extra-tropical atmosphere |
//! | 2 | $T_{s,1}$ | tropical mixed layer |
//! | 3 | $T_{s,2}$ | extra-tropical mixed layer |
//! | 4 | $T_{o,1}$ | tropical thermocline |
//! | 5 | $T_{o,2}$ | extra-tropical thermocline |
//!
//! Each timestep is split in two:
//!
//! 1. [`TwoBoxModel::update`] evaluates every diagnostic at index `n` from the
//!    temperatures at index `n` (and consumes evaporation noise).
//! 2. [`TwoBoxModel::step`] writes the temperatures at index `n + 1` from the
//!    fluxes at index `n`.
//!
//! # Governing Equations
//!
//! With $\Psi_r = \Psi_o c_{p,o} / \pi R^2$:
//!
//! $$HC_A \frac{dT_{a,1}}{dt} = F_{s,1} + F_{t,1} - F_a \qquad HC_A \frac{dT_{a,2}}{dt} = F_{s,2} + F_{t,2} + F_a$$
//!
//! $$HC_M \frac{dT_{s,1}}{dt} = -F_{s,1} + \Psi_r (T_{o,1} - T_{s,1}) \qquad HC_M \frac{dT_{s,2}}{dt} = -F_{s,2} + \Psi_r (T_{s,1} - T_{s,2})$$
//!
//! $$HC_O \frac{dT_{o,1}}{dt} = \Psi_r (T_{o,2} - T_{o,1}) \qquad HC_O \frac{dT_{o,2}}{dt} = \Psi_r (T_{s,2} - T_{o,2})$$
//!
//! The atmospheric transport $F_a$ cancels between the two atmosphere
//! equations. The ocean terms describe a loop: surface water flows from the
//! tropics to the extra-tropics, sinks, and returns through the thermocline.
//!
//! # Randomness
//!
//! All noise comes from a single generator owned by the model. At
//! initialisation six normal deviates are drawn in the order
//! $T_{a,1}, T_{a,2}, T_{o,1}, T_{o,2}, T_{s,1}, T_{s,2}$ (also when the
//! amplitude is zero), then each [`update`](TwoBoxModel::update) draws for
//! box 1 before box 2, and only for boxes above the convective threshold.

use ode_solvers::{System, Vector6};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use twobox_core::constants::PhysicalConstants;
use twobox_core::errors::{TwoBoxError, TwoBoxResult};
use twobox_core::parameters::ModelParameters;
use twobox_core::state::{BoxState, GlobalState, Region};
use twobox_core::timeseries::{FloatValue, Time};

use crate::diagnostics::{
    atmospheric_emissivity, atmospheric_flux, circulation_strength, moist_static_energy,
    moisture_transport, ocean_exchange_coefficient, oceanic_flux, saturation_humidity,
    surface_flux, top_of_atmosphere_flux, Humidity,
};

/// Temperatures in the order `[Ta1, Ta2, Ts1, Ts2, To1, To2]`.
pub type ModelState = Vector6<FloatValue>;

/// Fluxes at a single timestep which drive the temperature tendencies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepFluxes {
    /// Net surface flux per box.
    pub fs: [FloatValue; 2],
    /// Net top-of-atmosphere flux per box.
    pub ft: [FloatValue; 2],
    /// Atmospheric heat transport from box 1 to box 2.
    pub fa: FloatValue,
    /// Oceanic circulation strength (kg/s).
    pub psio: FloatValue,
}

/// Temperature tendencies for fixed fluxes.
///
/// The fluxes are held constant over a timestep, so the right hand side only
/// depends on the temperatures through the ocean exchange terms.
#[derive(Debug, Clone)]
pub struct Tendencies {
    fluxes: StepFluxes,
    hca: FloatValue,
    hcm: FloatValue,
    hco: FloatValue,
    psi_res: FloatValue,
}

impl Tendencies {
    pub fn new(fluxes: StepFluxes, constants: &PhysicalConstants) -> Self {
        Self {
            fluxes,
            hca: constants.atmosphere_heat_capacity(),
            hcm: constants.mixed_layer_heat_capacity(),
            hco: constants.thermocline_heat_capacity(),
            psi_res: ocean_exchange_coefficient(fluxes.psio, constants),
        }
    }
}

impl System<Time, ModelState> for Tendencies {
    fn system(&self, _t: Time, y: &ModelState, dy: &mut ModelState) {
        let (ts1, ts2, to1, to2) = (y[2], y[3], y[4], y[5]);
        let StepFluxes { fs, ft, fa, .. } = self.fluxes;
        let psi_res = self.psi_res;

        // Atmosphere
        dy[0] = (fs[0] + ft[0] - fa) / self.hca;
        dy[1] = (fs[1] + ft[1] + fa) / self.hca;

        // Mixed layer
        dy[2] = -(fs[0] - psi_res * (to1 - ts1)) / self.hcm;
        dy[3] = -(fs[1] - psi_res * (ts1 - ts2)) / self.hcm;

        // Thermocline
        dy[4] = psi_res * (to2 - to1) / self.hco;
        dy[5] = psi_res * (ts2 - to2) / self.hco;
    }
}

/// Advance `y` by one explicit Euler step of length `dt`.
pub fn forward_euler<S: System<Time, ModelState>>(
    system: &S,
    t: Time,
    y: &ModelState,
    dt: Time,
) -> ModelState {
    let mut dy = ModelState::zeros();
    system.system(t, y, &mut dy);
    y + dy * dt
}

/// The two-box model and the complete record of its run.
#[derive(Debug, Clone)]
pub struct TwoBoxModel<R = ChaCha8Rng> {
    parameters: ModelParameters,
    n_steps: usize,
    tropics: BoxState,
    extratropics: BoxState,
    global: GlobalState,
    /// Humidity at index 0, used for emissivity when water vapour feedback is off.
    initial_humidity: [Humidity; 2],
    rng: R,
    time_index: usize,
    /// Whether the diagnostics at index `N` have been evaluated.
    finalised: bool,
}

impl TwoBoxModel<ChaCha8Rng> {
    /// Initialise a model using a generator seeded from `initial.seed`.
    pub fn initialise(parameters: ModelParameters) -> TwoBoxResult<Self> {
        let rng = ChaCha8Rng::seed_from_u64(parameters.initial.seed);
        Self::with_rng(parameters, rng)
    }
}

impl<R: Rng> TwoBoxModel<R> {
    /// Initialise a model drawing all of its noise from `rng`.
    ///
    /// Allocates `N + 1` entries for every series, precomputes the CO2
    /// trajectory, perturbs the initial temperatures and freezes the initial
    /// humidity of each box.
    pub fn with_rng(parameters: ModelParameters, mut rng: R) -> TwoBoxResult<Self> {
        parameters.validate()?;

        let n_steps = parameters.time.n_steps();
        let dt = parameters.time.dt;
        let co2 = parameters.co2.trajectory(n_steps, dt);
        let global = GlobalState::new(n_steps, dt, co2)?;

        let mut tropics = BoxState::new(
            Region::Tropics,
            parameters.emission_temperature(Region::Tropics),
            n_steps,
        );
        let mut extratropics = BoxState::new(
            Region::ExtraTropics,
            parameters.emission_temperature(Region::ExtraTropics),
            n_steps,
        );

        let initial = &parameters.initial;
        let mut perturb = |value: FloatValue| {
            let xi: FloatValue = StandardNormal.sample(&mut rng);
            value + initial.ic * xi
        };
        tropics.ta[0] = perturb(initial.tropics.ta);
        extratropics.ta[0] = perturb(initial.extratropics.ta);
        tropics.to[0] = perturb(initial.tropics.to);
        extratropics.to[0] = perturb(initial.extratropics.to);
        tropics.ts[0] = perturb(initial.tropics.ts);
        extratropics.ts[0] = perturb(initial.extratropics.ts);

        let pressure = parameters.constants.ambient_pressure;
        let initial_humidity = [
            saturation_humidity(tropics.ts[0], tropics.ta[0], pressure),
            saturation_humidity(extratropics.ts[0], extratropics.ta[0], pressure),
        ];

        info!(
            n_steps,
            dt,
            co2_scenario = %parameters.co2.scenario,
            water_vapour_feedback = parameters.water_vapour_feedback,
            te1 = tropics.te,
            te2 = extratropics.te,
            "Initialised two-box model"
        );

        Ok(Self {
            parameters,
            n_steps,
            tropics,
            extratropics,
            global,
            initial_humidity,
            rng,
            time_index: 0,
            finalised: false,
        })
    }

    /// Evaluate every diagnostic at index `n` from the temperatures at index `n`.
    ///
    /// Consumes one normal deviate per box whose surface-atmosphere contrast
    /// exceeds the convective threshold, box 1 first.
    ///
    /// # Panics
    ///
    /// Panics if `n > N`.
    pub fn update(&mut self, n: usize) {
        let constants = &self.parameters.constants;
        let co2 = self.global.co2[n];
        let (ts1, ta1) = (self.tropics.ts[n], self.tropics.ta[n]);
        let (ts2, ta2) = (self.extratropics.ts[n], self.extratropics.ta[n]);

        let humidity1 = saturation_humidity(ts1, ta1, constants.ambient_pressure);
        let humidity2 = saturation_humidity(ts2, ta2, constants.ambient_pressure);

        let (radiative1, radiative2) = if self.parameters.water_vapour_feedback {
            (humidity1, humidity2)
        } else {
            (self.initial_humidity[0], self.initial_humidity[1])
        };
        let epsa1 = atmospheric_emissivity(radiative1, co2, constants);
        let epsa2 = atmospheric_emissivity(radiative2, co2, constants);

        let circulation = circulation_strength(ts1, ts2, constants);
        self.global.psia[n] = circulation.atmosphere;
        self.global.psio[n] = circulation.ocean;

        self.tropics.mse[n] = moist_static_energy(ts1, ta1, humidity1.qsat, constants);
        self.extratropics.mse[n] = moist_static_energy(ts2, ta2, humidity2.qsat, constants);
        self.global.mtspt[n] =
            moisture_transport(circulation.atmosphere, humidity1.qsat, humidity2.qsat, constants);

        let surface1 = surface_flux(ts1, ta1, self.tropics.te, epsa1, constants, &mut self.rng);
        let surface2 = surface_flux(
            ts2,
            ta2,
            self.extratropics.te,
            epsa2,
            constants,
            &mut self.rng,
        );
        self.tropics.fs[n] = surface1.net;
        self.tropics.feva[n] = surface1.evaporation;
        self.extratropics.fs[n] = surface2.net;
        self.extratropics.feva[n] = surface2.evaporation;

        self.tropics.ft[n] = top_of_atmosphere_flux(ts1, ta1, self.tropics.te, epsa1, constants);
        self.extratropics.ft[n] =
            top_of_atmosphere_flux(ts2, ta2, self.extratropics.te, epsa2, constants);

        self.global.fa[n] = atmospheric_flux(
            circulation.atmosphere,
            self.tropics.mse[n],
            self.extratropics.mse[n],
            constants,
        );
        self.global.fo[n] = oceanic_flux(
            circulation.ocean,
            ts1,
            self.extratropics.to[n],
            constants,
        );
    }

    /// Write the temperatures at index `n + 1` from the state and fluxes at index `n`.
    ///
    /// [`update`](Self::update) must have been called for `n` first.
    ///
    /// # Panics
    ///
    /// Panics if `n >= N`.
    pub fn step(&mut self, n: usize) {
        let tendencies = Tendencies::new(self.fluxes(n), &self.parameters.constants);
        let next = forward_euler(
            &tendencies,
            self.global.time[n],
            &self.temperatures(n),
            self.parameters.time.dt,
        );

        self.tropics.ta[n + 1] = next[0];
        self.extratropics.ta[n + 1] = next[1];
        self.tropics.ts[n + 1] = next[2];
        self.extratropics.ts[n + 1] = next[3];
        self.tropics.to[n + 1] = next[4];
        self.extratropics.to[n + 1] = next[5];
    }

    /// Update and step at the current index, then advance the cursor.
    pub fn step_forward(&mut self) -> TwoBoxResult<()> {
        if self.finished() {
            return Err(TwoBoxError::Error(format!(
                "cannot step beyond the final timestep ({})",
                self.n_steps
            )));
        }
        let n = self.time_index;
        self.update(n);
        self.step(n);
        self.time_index += 1;
        Ok(())
    }

    /// Integrate the remaining timesteps and evaluate the final diagnostics.
    pub fn run(&mut self) {
        while !self.finished() {
            let n = self.time_index;
            self.update(n);
            self.step(n);
            self.time_index += 1;
        }
        self.finalise();
    }

    /// Evaluate the diagnostics at the final index `N`.
    ///
    /// The temperatures at `N` are never stepped, but their fluxes are still
    /// recorded so every row of the output is complete. Only the first call
    /// evaluates anything, so the final evaporation noise is drawn once.
    pub fn finalise(&mut self) {
        if self.finalised {
            return;
        }
        debug!(n = self.n_steps, "Evaluating final diagnostics");
        self.update(self.n_steps);
        self.finalised = true;
    }
}

impl<R> TwoBoxModel<R> {
    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    pub fn constants(&self) -> &PhysicalConstants {
        &self.parameters.constants
    }

    /// Number of timesteps `N`; every series has `N + 1` entries.
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    pub fn tropics(&self) -> &BoxState {
        &self.tropics
    }

    pub fn extratropics(&self) -> &BoxState {
        &self.extratropics
    }

    pub fn box_state(&self, region: Region) -> &BoxState {
        match region {
            Region::Tropics => &self.tropics,
            Region::ExtraTropics => &self.extratropics,
        }
    }

    pub fn global(&self) -> &GlobalState {
        &self.global
    }

    /// Humidity frozen at initialisation, per box.
    pub fn initial_humidity(&self, region: Region) -> Humidity {
        self.initial_humidity[region.index()]
    }

    /// Index of the next timestep to be integrated.
    pub fn current_index(&self) -> usize {
        self.time_index
    }

    /// Model time (s) at the current index.
    pub fn current_time(&self) -> Time {
        self.global.time[self.time_index]
    }

    pub fn finished(&self) -> bool {
        self.time_index >= self.n_steps
    }

    /// Temperatures at index `n`.
    pub fn temperatures(&self, n: usize) -> ModelState {
        ModelState::new(
            self.tropics.ta[n],
            self.extratropics.ta[n],
            self.tropics.ts[n],
            self.extratropics.ts[n],
            self.tropics.to[n],
            self.extratropics.to[n],
        )
    }

    /// Fluxes recorded at index `n`.
    pub fn fluxes(&self, n: usize) -> StepFluxes {
        StepFluxes {
            fs: [self.tropics.fs[n], self.extratropics.fs[n]],
            ft: [self.tropics.ft[n], self.extratropics.ft[n]],
            fa: self.global.fa[n],
            psio: self.global.psio[n],
        }
    }
}

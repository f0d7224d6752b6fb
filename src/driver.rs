//! Run driver: integrates a configured model to completion, reporting
//! progress and writing checkpoints along the way.

use std::path::PathBuf;
use tracing::{debug, info, warn};
use twobox_components::model::TwoBoxModel;
use twobox_core::calendar::SimulationTime;
use twobox_core::errors::TwoBoxResult;
use twobox_core::parameters::ModelParameters;
use twobox_core::persistence;
use twobox_core::state::{Region, BOX_COLUMNS};

/// First temperature that stopped being finite during a run.
#[derive(Debug, Clone, PartialEq)]
pub struct NonFinite {
    pub region: Region,
    pub variable: &'static str,
    pub index: usize,
}

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunOutcome {
    pub model: TwoBoxModel,
    /// Number of intermediate checkpoints written.
    pub checkpoints: usize,
    /// Directory holding the final tables.
    pub output: PathBuf,
    pub non_finite: Option<NonFinite>,
}

/// Intervals, in timesteps, between progress messages and checkpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cadence {
    pub print: usize,
    pub save: usize,
}

impl Cadence {
    pub fn from_parameters(parameters: &ModelParameters) -> Self {
        let time = &parameters.time;
        Self {
            print: time.steps_in(parameters.output.print_interval_years),
            save: time.steps_in(parameters.output.save_interval_years),
        }
    }
}

/// Initialise a model from `parameters` and integrate it to the final timestep.
///
/// For every timestep `n` the diagnostics are updated and the temperatures
/// stepped. Progress is logged every `print` steps and the completed prefix
/// (`n + 1` rows) is saved every `save` steps. Once the loop finishes the
/// diagnostics of the final row are evaluated and all `N + 1` rows written.
///
/// Values that become NaN or infinite are not an error; they are carried
/// through to the output and a single warning is emitted.
pub fn run(parameters: ModelParameters) -> TwoBoxResult<RunOutcome> {
    let cadence = Cadence::from_parameters(&parameters);
    let output = parameters.output.directory.clone();
    let dt = parameters.time.dt;

    let mut model = TwoBoxModel::initialise(parameters)?;
    let n_steps = model.n_steps();
    info!(
        n_steps,
        print_every = cadence.print,
        save_every = cadence.save,
        output = %output.display(),
        "Starting integration"
    );

    let mut checkpoints = 0;
    let mut non_finite = None;
    for n in 0..n_steps {
        model.update(n);
        model.step(n);

        if non_finite.is_none() {
            non_finite = find_non_finite(&model, n + 1);
            if let Some(found) = &non_finite {
                warn!(
                    region = %found.region,
                    variable = found.variable,
                    index = found.index,
                    time = %SimulationTime::from_step(found.index, dt),
                    "Temperature is no longer finite, continuing"
                );
            }
        }

        if n % cadence.print == 0 {
            info!("Simulation time: {}", SimulationTime::from_step(n, dt));
        }

        if (n + 1) % cadence.save == 0 {
            debug!(
                "Saving time series at simulation time: {}",
                SimulationTime::from_step(n, dt)
            );
            persistence::save(
                &output,
                n + 1,
                model.tropics(),
                model.extratropics(),
                model.global(),
            )?;
            checkpoints += 1;
        }
    }

    model.finalise();
    info!(
        "Final simulation time: {}",
        SimulationTime::from_step(n_steps, dt)
    );

    persistence::save(
        &output,
        n_steps + 1,
        model.tropics(),
        model.extratropics(),
        model.global(),
    )?;
    info!(directory = %output.display(), rows = n_steps + 1, "Saved time series");

    Ok(RunOutcome {
        model,
        checkpoints,
        output,
        non_finite,
    })
}

/// Look for a non-finite temperature at index `n`.
fn find_non_finite(model: &TwoBoxModel, n: usize) -> Option<NonFinite> {
    for region in Region::ALL {
        let state = model.box_state(region);
        for (variable, series) in BOX_COLUMNS.iter().zip([&state.ta, &state.ts, &state.to]) {
            if !series[n].is_finite() {
                return Some(NonFinite {
                    region,
                    variable: *variable,
                    index: n,
                });
            }
        }
    }
    None
}

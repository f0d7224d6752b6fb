use approx::assert_relative_eq;
use twobox::driver;
use twobox_components::analysis::RunSummary;
use twobox_components::diagnostics::{saturation_humidity, EPSILON};
use twobox_core::constants::{DAY, YEAR};
use twobox_core::parameters::ModelParameters;
use twobox_core::persistence;
use twobox_core::state::Region;

fn parameters(dir: &std::path::Path, n_steps: usize) -> ModelParameters {
    let mut parameters = ModelParameters::default();
    parameters.time.dt = DAY;
    parameters.time.n_steps = Some(n_steps);
    parameters.output.directory = dir.to_path_buf();
    parameters
}

fn emission_temperatures(parameters: &ModelParameters) -> [f64; 2] {
    [
        parameters.emission_temperature(Region::Tropics),
        parameters.emission_temperature(Region::ExtraTropics),
    ]
}

#[test]
fn test_saved_run_matches_memory() {
    let dir = tempfile::tempdir().unwrap();
    let mut configured = parameters(dir.path(), 40);
    configured.initial.ic = 0.5;
    configured.initial.seed = 3;
    let te = emission_temperatures(&configured);

    let outcome = driver::run(configured).unwrap();
    assert!(outcome.non_finite.is_none());
    assert_eq!(outcome.checkpoints, 0);

    let saved = persistence::load(dir.path(), te).unwrap();
    assert_eq!(saved.len(), 41);
    assert_eq!(&saved.tropics, outcome.model.tropics());
    assert_eq!(&saved.extratropics, outcome.model.extratropics());
    assert_eq!(&saved.global, outcome.model.global());

    // The final row carries its diagnostics
    assert!(saved.tropics.mse[40] > 0.0);
    assert!(saved.global.psia[40] > 0.0);
}

#[test]
fn test_checkpoints_follow_save_interval() {
    let dir = tempfile::tempdir().unwrap();
    let mut configured = parameters(dir.path(), 25);
    configured.output.save_interval_years = 10.0 * DAY / YEAR;
    configured.output.print_interval_years = 5.0 * DAY / YEAR;

    let outcome = driver::run(configured.clone()).unwrap();
    assert_eq!(outcome.checkpoints, 2);

    // The closing save replaces the checkpoints with all rows
    let saved = persistence::load(dir.path(), emission_temperatures(&configured)).unwrap();
    assert_eq!(saved.len(), 26);
}

#[test]
fn test_degenerate_run_is_saved_not_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut configured = parameters(dir.path(), 10);
    let esat = saturation_humidity(300.0, 260.0, 750.0).esat;
    configured.constants.ambient_pressure = esat * (1.0 - EPSILON);
    let te = emission_temperatures(&configured);

    let outcome = driver::run(configured).unwrap();
    let found = outcome.non_finite.expect("a non-finite temperature");
    assert_eq!(found.index, 1);
    assert_eq!(found.region, Region::Tropics);
    assert_eq!(found.variable, "Ta");

    let saved = persistence::load(dir.path(), te).unwrap();
    assert!(saved.tropics.mse[0].is_infinite());
    assert!(!saved.tropics.ta[1].is_finite());
}

#[test]
fn test_run_from_toml_configuration() {
    let dir = tempfile::tempdir().unwrap();
    let toml = format!(
        r#"
water_vapour_feedback = true

[time]
n_steps = 30

[initial]
seed = 42

[co2]
scenario = "linear"
final = 560.0

[output]
directory = "{}"
"#,
        dir.path().display()
    );
    let configured = ModelParameters::from_toml_str(&toml).unwrap();
    let te = emission_temperatures(&configured);

    let outcome = driver::run(configured.clone()).unwrap();
    assert_relative_eq!(outcome.model.global().co2[30], 560.0, max_relative = 1e-12);

    let saved = persistence::load(dir.path(), te).unwrap();
    let summary = RunSummary::from_states(
        &saved.tropics,
        &saved.extratropics,
        &saved.global,
        &configured.constants,
        saved.len(),
    )
    .unwrap();
    assert_relative_eq!(summary.co2, 560.0, max_relative = 1e-12);
    assert!(summary.total_transport > 0.0);
    assert!(summary.mean_surface > 280.0 && summary.mean_surface < 300.0);
}

#[test]
fn test_invalid_configuration_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("never");
    let mut configured = parameters(&output, 10);
    configured.time.dt = -1.0;

    assert!(driver::run(configured).is_err());
    assert!(!output.exists());
}

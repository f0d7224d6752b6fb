use approx::{assert_relative_eq, relative_eq};
use ode_solvers::System;
use twobox_components::diagnostics::{saturation_humidity, EPSILON};
use twobox_components::model::{forward_euler, StepFluxes, Tendencies};
use twobox_components::{ModelState, TwoBoxModel};
use twobox_core::co2::Co2Scenario;
use twobox_core::constants::{PhysicalConstants, DAY};
use twobox_core::parameters::ModelParameters;
use twobox_core::timeseries::first_non_finite;

fn parameters(n_steps: usize) -> ModelParameters {
    let mut parameters = ModelParameters::default();
    parameters.time.dt = DAY;
    parameters.time.n_steps = Some(n_steps);
    parameters
}

#[test]
fn test_atmospheric_transport_cancels_in_tendencies() {
    let constants = PhysicalConstants::default();
    let y = ModelState::new(258.0, 241.0, 299.0, 281.0, 279.0, 278.0);
    let hca = constants.atmosphere_heat_capacity();

    for fa in [-50.0, 0.0, 12.5, 31.3, 400.0] {
        let fluxes = StepFluxes {
            fs: [-90.8, 13.1],
            ft: [32.0, -35.0],
            fa,
            psio: 2.0e10,
        };
        let mut dy = ModelState::zeros();
        Tendencies::new(fluxes, &constants).system(0.0, &y, &mut dy);

        // Only the local surface and top-of-atmosphere fluxes remain
        let net = hca * (dy[0] + dy[1]);
        assert!(
            relative_eq!(net, -90.8 + 13.1 + 32.0 - 35.0, epsilon = 1e-9, max_relative = 1e-9),
            "Fa = {} leaked into the column total: {}",
            fa,
            net
        );
    }
}

#[test]
fn test_atmospheric_transport_cancels_over_a_run() {
    let mut model = TwoBoxModel::initialise(parameters(360)).unwrap();
    model.run();

    let hca = model.constants().atmosphere_heat_capacity();
    let dt = model.parameters().time.dt;
    let tropics = model.tropics();
    let extratropics = model.extratropics();

    for n in 0..model.n_steps() {
        let stored = hca
            * ((tropics.ta[n + 1] - tropics.ta[n]) + (extratropics.ta[n + 1] - extratropics.ta[n]))
            / dt;
        let local = tropics.fs[n] + tropics.ft[n] + extratropics.fs[n] + extratropics.ft[n];
        assert!(
            relative_eq!(stored, local, epsilon = 1e-6, max_relative = 1e-6),
            "step {}: atmospheric storage {} differs from local forcing {}",
            n,
            stored,
            local
        );
    }
}

#[test]
fn test_forward_euler_matches_stored_step() {
    let mut model = TwoBoxModel::initialise(parameters(10)).unwrap();
    model.update(0);
    model.step(0);

    let tendencies = Tendencies::new(model.fluxes(0), model.constants());
    let expected = forward_euler(&tendencies, 0.0, &model.temperatures(0), DAY);
    assert_eq!(model.temperatures(1), expected);
}

#[test]
fn test_identical_runs_are_bit_identical() {
    let mut configured = parameters(720);
    configured.initial.seed = 1234;

    let mut first = TwoBoxModel::initialise(configured.clone()).unwrap();
    let mut second = TwoBoxModel::initialise(configured).unwrap();
    first.run();
    second.run();

    assert_eq!(first.tropics(), second.tropics());
    assert_eq!(first.extratropics(), second.extratropics());
    assert_eq!(first.global(), second.global());

    // Evaporation noise was actually exercised
    assert!(first.tropics().feva.iter().any(|f| *f > 0.0));
}

#[test]
fn test_different_seeds_diverge() {
    let mut a = parameters(360);
    a.initial.seed = 1;
    let mut b = parameters(360);
    b.initial.seed = 2;

    let mut first = TwoBoxModel::initialise(a).unwrap();
    let mut second = TwoBoxModel::initialise(b).unwrap();
    first.run();
    second.run();

    assert_eq!(first.temperatures(0), second.temperatures(0));
    assert_ne!(first.tropics().feva, second.tropics().feva);
}

#[test]
fn test_default_configuration_stays_finite() {
    let mut model = TwoBoxModel::initialise(parameters(3600)).unwrap();
    model.run();

    let rows = model.n_steps() + 1;
    for state in [model.tropics(), model.extratropics()] {
        for series in state.columns() {
            assert_eq!(first_non_finite(series, rows), None);
        }
    }
    for series in model.global().columns() {
        assert_eq!(first_non_finite(series, rows), None);
    }

    // Circulation runs from the warm tropics towards the extra-tropics
    assert!(model.global().psia.iter().all(|p| *p > 0.0));
    assert!(model.global().fa.iter().all(|f| *f > 0.0));
}

#[test]
fn test_degenerate_humidity_propagates_without_panic() {
    let mut configured = parameters(20);
    let esat = saturation_humidity(300.0, 260.0, 750.0).esat;
    configured.constants.ambient_pressure = esat * (1.0 - EPSILON);

    let mut model = TwoBoxModel::initialise(configured).unwrap();
    model.run();

    assert!(model.tropics().mse[0].is_infinite());
    assert!(model.global().fa[0].is_infinite());

    let rows = model.n_steps() + 1;
    assert!(first_non_finite(&model.tropics().ta, rows).is_some());
    assert!(first_non_finite(&model.extratropics().ta, rows).is_some());
}

#[test]
fn test_constant_co2_is_invariant() {
    let mut configured = parameters(100);
    configured.co2.scenario = Co2Scenario::Constant;
    configured.co2.initial = 350.0;

    let mut model = TwoBoxModel::initialise(configured).unwrap();
    model.run();
    assert!(model.global().co2.iter().all(|c| *c == 350.0));
}

#[test]
fn test_rising_co2_warms_the_surface() {
    let mut control = parameters(3600);
    control.initial.seed = 9;
    let mut forced = control.clone();
    forced.co2.scenario = Co2Scenario::Linear;
    forced.co2.target = 1120.0;

    let mut control_model = TwoBoxModel::initialise(control).unwrap();
    let mut forced_model = TwoBoxModel::initialise(forced).unwrap();
    control_model.run();
    forced_model.run();

    let n = control_model.n_steps();
    assert_relative_eq!(forced_model.global().co2[n], 1120.0, max_relative = 1e-12);
    assert!(
        forced_model.extratropics().ts[n] > control_model.extratropics().ts[n],
        "forced {} should be warmer than control {}",
        forced_model.extratropics().ts[n],
        control_model.extratropics().ts[n]
    );
    assert_relative_eq!(
        forced_model.global().co2[n / 2],
        280.0 + 0.5 * 840.0,
        max_relative = 1e-12
    );
}

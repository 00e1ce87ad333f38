use approx::assert_relative_eq;
use climb_simulation::{
    errors::SimulationError, AtmosphereModel, ClimbConfig, ClimbIntegrator, EnvelopeGrid, Engine,
    PropulsionOracle, StrategyKind, StrategyProfile, SyntheticTurbofan,
};

const TARGET_ALTITUDE: f64 = 4267.2;

fn create_test_config() -> ClimbConfig {
    let mut config = ClimbConfig::default();
    config.mission.initial_altitude_m = 0.0;
    config.mission.initial_speed_mps = 75.0;
    config.mission.target_altitude_m = TARGET_ALTITUDE;
    config.mission.time_step_s = 0.2;
    config
}

fn linear_profile(target: f64) -> StrategyProfile {
    StrategyProfile::new(StrategyKind::Linear, Some(0.5), target)
}

fn fly<O: PropulsionOracle>(
    config: ClimbConfig,
    engine: O,
    profile: &StrategyProfile,
) -> Result<climb_simulation::SimulationTrace, SimulationError> {
    ClimbIntegrator::new(config, engine)?.run(profile)
}

#[test]
fn test_reference_climb_scenario() {
    let config = create_test_config();
    let initial_mass = config.aircraft.initial_mass_kg;
    let profile = linear_profile(TARGET_ALTITUDE);
    let trace = fly(config, SyntheticTurbofan::default(), &profile).unwrap();
    let summary = trace.summary();

    assert_eq!(summary.final_altitude, TARGET_ALTITUDE);
    assert!(summary.final_mass_kg < initial_mass);
    assert_eq!(summary.total_fuel_burned_kg, initial_mass - summary.final_mass_kg);
    assert_eq!(summary.lever_failures, 0);
    assert_eq!(summary.thrust_limited_steps, 0);
    assert_eq!(summary.engines, 2);

    // 5 m/s of climb all the way up.
    assert_relative_eq!(summary.total_climb_time, TARGET_ALTITUDE / 5.0, max_relative = 1e-6);

    let samples = trace.samples();
    assert_eq!(samples.len(), summary.steps + 1);
    assert!(samples.windows(2).all(|w| w[1].time > w[0].time));
    assert!(samples.windows(2).all(|w| w[1].altitude > w[0].altitude));
    assert!(samples.windows(2).all(|w| w[1].mass <= w[0].mass));
    assert!(samples.iter().all(|s| s.mass >= 0.0));
    assert!(samples[1..].iter().all(|s| s.lever.is_some() && s.fuel_flow > 0.0));
    assert!(trace.velocities().last().unwrap() > &75.0);
}

#[test]
fn test_every_strategy_kind_reaches_target() {
    let mut config = create_test_config();
    config.mission.target_altitude_m = 1_000.0;
    let mut integrator = ClimbIntegrator::new(config, SyntheticTurbofan::default()).unwrap();

    let profiles: Vec<StrategyProfile> = StrategyKind::ALL
        .iter()
        .flat_map(|&kind| StrategyProfile::sweep(kind, 1_000.0, &[0.5]))
        .collect();
    assert_eq!(profiles.len(), 7);

    for result in integrator.run_sweep(&profiles) {
        let trace = result.unwrap();
        assert_eq!(trace.summary().final_altitude, 1_000.0);
        assert!(trace.summary().total_fuel_burned_kg > 0.0);
    }
}

#[test]
fn test_climb_through_noisy_engine() {
    let engine = SyntheticTurbofan::default()
        .with_seed(11)
        .with_jitter(0.05)
        .with_dropout(0.1);
    let config = create_test_config();
    let initial_mass = config.aircraft.initial_mass_kg;
    let trace = fly(config, engine, &linear_profile(TARGET_ALTITUDE)).unwrap();
    let summary = trace.summary();

    assert_eq!(summary.final_altitude, TARGET_ALTITUDE);
    assert!(summary.final_mass_kg < initial_mass);
    assert_eq!(summary.total_fuel_burned_kg, initial_mass - summary.final_mass_kg);
    assert!(trace.masses().windows(2).all(|w| w[1] <= w[0]));
}

#[test]
fn test_no_climb_share_does_not_converge() {
    let mut config = create_test_config();
    config.mission.max_steps = 1_000;
    let profile = StrategyProfile::new(StrategyKind::Linear, Some(0.0), TARGET_ALTITUDE);

    match fly(config, SyntheticTurbofan::default(), &profile) {
        Err(SimulationError::DidNotConverge { steps, altitude, target }) => {
            assert_eq!(steps, 1_000);
            assert_eq!(altitude, 0.0);
            assert_eq!(target, TARGET_ALTITUDE);
        }
        other => panic!(
            "expected DidNotConverge, got {:?}",
            other.map(|t| t.summary().clone())
        ),
    }
}

#[test]
fn test_config_from_toml_drives_run() {
    let config = ClimbConfig::from_toml_str(
        r#"
        [aircraft]
        engine_count = 4
        initial_mass_kg = 70000.0

        [mission]
        target_altitude_m = 800.0
        time_step_s = 0.5
        "#,
    )
    .unwrap();
    let profile: StrategyKind = "constant_speed".parse().unwrap();
    let profile = StrategyProfile::new(profile, None, 800.0);
    let trace = fly(config, SyntheticTurbofan::default(), &profile).unwrap();
    let summary = trace.summary();

    assert_eq!(summary.engines, 4);
    assert_eq!(summary.profile, "constant_speed");
    assert_eq!(summary.altitude_fraction, None);
    assert_eq!(summary.final_velocity, 75.0);
    assert_relative_eq!(summary.total_climb_time, 80.0, max_relative = 1e-9);
    assert!(trace.report().contains("Engines: 4"));
}

#[test]
fn test_scanned_envelope_keeps_queries_valid() {
    let narrow_deck = || {
        let mut deck = SyntheticTurbofan::default();
        deck.mach_limit = 0.6;
        deck
    };

    let mut scanner = Engine::new(narrow_deck());
    let bounds = EnvelopeGrid::default().scan(&mut scanner).bounds.unwrap();
    assert_relative_eq!(bounds.mach.max, 0.6, epsilon = 1e-12);

    let profile = linear_profile(TARGET_ALTITUDE);
    let unclipped = fly(create_test_config(), narrow_deck(), &profile).unwrap();
    assert!(unclipped.summary().lever_failures > 0);

    let mut config = create_test_config();
    config.envelope = bounds.to_query_envelope();
    let clipped = fly(config, narrow_deck(), &profile).unwrap();
    assert_eq!(clipped.summary().lever_failures, 0);

    let atmosphere = AtmosphereModel::new();
    let last = clipped.samples().last().unwrap();
    assert!(last.velocity / atmosphere.speed_of_sound(last.altitude) > 0.6);
}

use std::env;

use climb_simulation::logging::init_logging;
use climb_simulation::*;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => ClimbConfig::load(&path)?,
        None => ClimbConfig::default(),
    };
    let kind: StrategyKind = match args.next() {
        Some(name) => name.parse()?,
        None => StrategyKind::Linear,
    };

    let target = config.mission.target_altitude_m;
    let profiles = StrategyProfile::sweep(kind, target, &default_altitude_fractions());
    info!(profile = %kind, runs = profiles.len(), "starting strategy sweep");

    let mut integrator = ClimbIntegrator::new(config, SyntheticTurbofan::default())?;
    let results = integrator.run_sweep(&profiles);

    let mut best: Option<&ClimbSummary> = None;
    for (profile, result) in profiles.iter().zip(&results) {
        match result {
            Ok(trace) => {
                println!("{}", trace.report());
                let summary = trace.summary();
                if best.map_or(true, |b| summary.total_fuel_burned_kg < b.total_fuel_burned_kg) {
                    best = Some(summary);
                }
            }
            Err(e) => println!("{}: {}", profile.label(), e),
        }
    }

    if let Some(summary) = best {
        println!(
            "Lowest fuel burn: {:.2} kg in {} (AF={})",
            summary.total_fuel_burned_kg,
            format_time(summary.total_climb_time),
            summary
                .altitude_fraction
                .map_or_else(|| "-".to_string(), |af| format!("{:.2}", af)),
        );
    }

    Ok(())
}

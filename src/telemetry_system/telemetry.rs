use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::Serialize;

use crate::control::guidance::StrategyProfile;

/// One row of the climb time history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceSample {
    pub time: f64,
    pub altitude: f64,
    pub velocity: f64,
    /// Lever used over the step that ended here; absent for the initial row
    /// and for steps without a lever solution.
    pub lever: Option<f64>,
    /// kg/s, total over all engines.
    pub fuel_flow: f64,
    pub mass: f64,
}

/// End-of-run totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimbSummary {
    pub profile: String,
    pub altitude_fraction: Option<f64>,
    pub final_altitude: f64,
    pub final_velocity: f64,
    pub total_climb_time: f64,
    pub final_lever: Option<f64>,
    pub final_mass_kg: f64,
    pub total_fuel_burned_kg: f64,
    pub engines: u32,
    pub steps: usize,
    pub lever_failures: usize,
    pub thrust_limited_steps: usize,
}

impl ClimbSummary {
    /// Named summary values; absent quantities are NaN.
    pub fn as_table(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            ("Final Altitude", self.final_altitude),
            ("Final Velocity", self.final_velocity),
            ("Total Climb Time", self.total_climb_time),
            ("Final Lever", self.final_lever.unwrap_or(f64::NAN)),
            ("Final Mass (kg)", self.final_mass_kg),
            ("Total Fuel Burned (kg)", self.total_fuel_burned_kg),
            ("Engines", f64::from(self.engines)),
        ])
    }
}

/// Complete record of one climb run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationTrace {
    samples: Vec<TraceSample>,
    lever_failure_times: Vec<f64>,
    thrust_limited_times: Vec<f64>,
    summary: ClimbSummary,
}

impl SimulationTrace {
    pub fn samples(&self) -> &[TraceSample] {
        &self.samples
    }

    pub fn lever_failure_times(&self) -> &[f64] {
        &self.lever_failure_times
    }

    pub fn thrust_limited_times(&self) -> &[f64] {
        &self.thrust_limited_times
    }

    pub fn summary(&self) -> &ClimbSummary {
        &self.summary
    }

    pub fn altitudes(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.altitude).collect()
    }

    pub fn velocities(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.velocity).collect()
    }

    pub fn masses(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.mass).collect()
    }

    /// Human-readable run report.
    pub fn report(&self) -> String {
        let summary = &self.summary;
        let mut out = String::new();

        let _ = writeln!(out, "--- Climb Summary: {} ---", summary.profile);
        if let Some(fraction) = summary.altitude_fraction {
            let _ = writeln!(out, "Altitude Fraction: {:.2}", fraction);
        }
        let _ = writeln!(out, "Final Altitude: {}", format_altitude(summary.final_altitude));
        let _ = writeln!(out, "Final Velocity: {:.2} m/s", summary.final_velocity);
        let _ = writeln!(out, "Total Climb Time: {}", format_time(summary.total_climb_time));
        match summary.final_lever {
            Some(lever) => {
                let _ = writeln!(out, "Final Lever: {:.3}", lever);
            }
            None => {
                let _ = writeln!(out, "Final Lever: n/a");
            }
        }
        let _ = writeln!(out, "Final Mass: {:.2} kg", summary.final_mass_kg);
        let _ = writeln!(out, "Total Fuel Burned: {:.2} kg", summary.total_fuel_burned_kg);
        let _ = writeln!(out, "Engines: {}", summary.engines);
        let _ = writeln!(out, "Steps: {}", summary.steps);

        write_events(&mut out, "Lever solution failures", &self.lever_failure_times);
        write_events(&mut out, "Thrust-limited steps", &self.thrust_limited_times);
        out
    }
}

fn write_events(out: &mut String, title: &str, times: &[f64]) {
    let _ = writeln!(out, "{}: {}", title, times.len());
    if let (Some(first), Some(last)) = (times.first(), times.last()) {
        let _ = writeln!(out, "  first at {}, last at {}", format_time(*first), format_time(*last));
    }
}

/// Accumulates samples and diagnostics while a climb is flown.
#[derive(Debug, Default)]
pub struct Telemetry {
    samples: Vec<TraceSample>,
    lever_failure_times: Vec<f64>,
    thrust_limited_times: Vec<f64>,
}

impl Telemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn collect_data(&mut self, sample: TraceSample) {
        self.samples.push(sample);
    }

    pub fn record_lever_failure(&mut self, time: f64) {
        self.lever_failure_times.push(time);
    }

    pub fn record_thrust_limited(&mut self, time: f64) {
        self.thrust_limited_times.push(time);
    }

    pub fn step_count(&self) -> usize {
        self.samples.len().saturating_sub(1)
    }

    /// Closes the record. Fuel burned is the difference between the first
    /// and last recorded mass.
    pub fn finish(self, profile: &StrategyProfile, engines: u32) -> SimulationTrace {
        let first = self.samples.first().copied();
        let last = self.samples.last().copied();
        let initial_mass = first.map_or(0.0, |s| s.mass);
        let final_mass = last.map_or(initial_mass, |s| s.mass);

        let summary = ClimbSummary {
            profile: profile.kind.to_string(),
            altitude_fraction: profile.altitude_fraction,
            final_altitude: last.map_or(f64::NAN, |s| s.altitude),
            final_velocity: last.map_or(f64::NAN, |s| s.velocity),
            total_climb_time: match (first, last) {
                (Some(first), Some(last)) => last.time - first.time,
                _ => 0.0,
            },
            final_lever: last.and_then(|s| s.lever),
            final_mass_kg: final_mass,
            total_fuel_burned_kg: initial_mass - final_mass,
            engines,
            steps: self.step_count(),
            lever_failures: self.lever_failure_times.len(),
            thrust_limited_steps: self.thrust_limited_times.len(),
        };

        SimulationTrace {
            samples: self.samples,
            lever_failure_times: self.lever_failure_times,
            thrust_limited_times: self.thrust_limited_times,
            summary,
        }
    }
}

pub fn format_time(elapsed_time: f64) -> String {
    if elapsed_time >= 3600.0 {
        let hours = (elapsed_time / 3600.0).floor();
        let minutes = ((elapsed_time % 3600.0) / 60.0).floor();
        let seconds = elapsed_time % 60.0;
        format!("{:.0}h {:.0}m {:.2}s", hours, minutes, seconds)
    } else if elapsed_time >= 60.0 {
        let minutes = (elapsed_time / 60.0).floor();
        let seconds = elapsed_time % 60.0;
        format!("{:.0}m {:.2}s", minutes, seconds)
    } else {
        format!("{:.2}s", elapsed_time)
    }
}

pub fn format_altitude(altitude: f64) -> String {
    if altitude >= 1000.0 {
        format!("{:.2} km", altitude / 1000.0)
    } else {
        format!("{:.2} m", altitude)
    }
}

//! Throttle inversion: find the lever position that yields a requested thrust.
//!
//! The engine deck is sampled on a fixed lever grid, the samples are forced to
//! be non-decreasing in lever, and the demand is located between two grid
//! points by linear interpolation. One direct query at the interpolated lever
//! refines the thrust estimate when the deck answers it.

use serde::Serialize;
use tracing::trace;

use super::propulsion::{Engine, PropulsionOracle};
use crate::constants::DEFAULT_LEVER_GRID_POINTS;

/// One lever grid point and its thrust, absent if the deck had no answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleSample {
    pub lever: f64,
    pub thrust: Option<f64>,
}

/// How a [`LeverSolution`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SolveMethod {
    Idle,
    MaxThrust,
    Interpolated,
    Refined,
    BracketEndpoint,
    ClosestSample,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LeverSolution {
    pub lever: f64,
    pub thrust_per_engine: f64,
    /// Demand exceeded the highest thrust available at this condition.
    pub thrust_limited: bool,
    pub method: SolveMethod,
}

#[derive(Debug, Clone)]
pub struct LeverSolver {
    grid: Vec<f64>,
    refine: bool,
}

impl Default for LeverSolver {
    fn default() -> Self {
        Self::new(DEFAULT_LEVER_GRID_POINTS, true)
    }
}

impl LeverSolver {
    /// `points` evenly spaced levers over [0, 1]; at least two.
    pub fn new(points: usize, refine: bool) -> Self {
        let points = points.max(2);
        let last = (points - 1) as f64;
        LeverSolver {
            grid: (0..points).map(|i| i as f64 / last).collect(),
            refine,
        }
    }

    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    /// Samples the deck over the lever grid.
    pub fn sample<O: PropulsionOracle>(
        &self,
        engine: &mut Engine<O>,
        mach: f64,
        altitude_ft: f64,
    ) -> Vec<ThrottleSample> {
        self.grid
            .iter()
            .map(|&lever| ThrottleSample {
                lever,
                thrust: engine.thrust(lever, mach, altitude_ft).ok(),
            })
            .collect()
    }

    /// Lever for `required_thrust` newtons on one engine, or `None` when no
    /// grid point produced a valid sample.
    pub fn solve<O: PropulsionOracle>(
        &self,
        engine: &mut Engine<O>,
        required_thrust: f64,
        mach: f64,
        altitude_ft: f64,
    ) -> Option<LeverSolution> {
        let samples = self.sample(engine, mach, altitude_ft);
        let (levers, mut thrusts): (Vec<f64>, Vec<f64>) = samples
            .iter()
            .filter_map(|sample| sample.thrust.map(|thrust| (sample.lever, thrust)))
            .unzip();
        if thrusts.is_empty() {
            return None;
        }
        enforce_monotonic(&mut thrusts);

        let solution = self.invert(engine, &levers, &thrusts, required_thrust, mach, altitude_ft);
        trace!(
            required_thrust,
            mach,
            altitude_ft,
            lever = solution.lever,
            method = ?solution.method,
            "lever solved"
        );
        Some(solution)
    }

    fn invert<O: PropulsionOracle>(
        &self,
        engine: &mut Engine<O>,
        levers: &[f64],
        thrusts: &[f64],
        required: f64,
        mach: f64,
        altitude_ft: f64,
    ) -> LeverSolution {
        let last = thrusts.len() - 1;

        if thrusts[0] >= required {
            return LeverSolution {
                lever: levers[0],
                thrust_per_engine: thrusts[0],
                thrust_limited: false,
                method: SolveMethod::Idle,
            };
        }
        if thrusts[last] < required {
            return LeverSolution {
                lever: levers[last],
                thrust_per_engine: thrusts[last],
                thrust_limited: true,
                method: SolveMethod::MaxThrust,
            };
        }

        for i in 0..last {
            let (l0, t0) = (levers[i], thrusts[i]);
            let (l1, t1) = (levers[i + 1], thrusts[i + 1]);
            if !(t0 <= required && required <= t1) {
                continue;
            }

            let lever = if t1 > t0 {
                l0 + (required - t0) / (t1 - t0) * (l1 - l0)
            } else {
                l0
            };
            if !self.refine {
                return unlimited(lever, required, SolveMethod::Interpolated);
            }

            return match engine.thrust(lever, mach, altitude_ft) {
                Ok(thrust) => unlimited(lever, thrust, SolveMethod::Refined),
                Err(_) if (t0 - required).abs() <= (t1 - required).abs() => {
                    unlimited(l0, t0, SolveMethod::BracketEndpoint)
                }
                Err(_) => unlimited(l1, t1, SolveMethod::BracketEndpoint),
            };
        }

        // No bracket: fall back to the sample closest to the demand.
        let (lever, thrust) = levers
            .iter()
            .zip(thrusts)
            .map(|(&lever, &thrust)| (lever, thrust))
            .min_by(|a, b| (a.1 - required).abs().total_cmp(&(b.1 - required).abs()))
            .unwrap_or((levers[0], thrusts[0]));
        unlimited(lever, thrust, SolveMethod::ClosestSample)
    }
}

fn unlimited(lever: f64, thrust_per_engine: f64, method: SolveMethod) -> LeverSolution {
    LeverSolution {
        lever,
        thrust_per_engine,
        thrust_limited: false,
        method,
    }
}

/// Raises every sample that falls below its predecessor to the predecessor's value.
pub fn enforce_monotonic(thrusts: &mut [f64]) {
    for i in 1..thrusts.len() {
        if thrusts[i] < thrusts[i - 1] {
            thrusts[i] = thrusts[i - 1];
        }
    }
}

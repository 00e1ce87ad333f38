//! Forward-Euler climb integration under a commanded specific-energy rate.
//!
//! The strategy profile splits the energy rate between climbing and
//! accelerating, which fixes the kinematics outright. The engine only decides
//! how much fuel that costs: each step asks the lever solver for the thrust
//! that balances drag plus the energy demand, then burns fuel at the TSFC of
//! that lever.

use serde::Serialize;
use tracing::{debug, info, warn};

use super::aerodynamics::Aerodynamics;
use crate::config::ClimbConfig;
use crate::constants::{CLIMB_RATE_FLOOR, GRAVITY_FLOOR, SOUND_SPEED_FLOOR, VELOCITY_FLOOR};
use crate::control::environment::AtmosphereModel;
use crate::control::fadec::LeverSolver;
use crate::control::guidance::{KinematicLaw, StrategyProfile};
use crate::control::propulsion::{Engine, PropulsionOracle};
use crate::errors::SimulationError;
use crate::telemetry_system::telemetry::{SimulationTrace, Telemetry, TraceSample};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlightState {
    pub time: f64,
    pub altitude: f64,
    pub velocity: f64,
    pub mass: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClimbPhase {
    Flying,
    TargetReached,
}

/// Rates and engine setting held constant over one step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRates {
    pub climb_rate: f64,
    pub acceleration: f64,
    pub required_thrust: f64,
    pub lever: Option<f64>,
    /// kg/s over all engines.
    pub fuel_flow: f64,
}

pub struct ClimbIntegrator<O> {
    config: ClimbConfig,
    atmosphere: AtmosphereModel,
    aerodynamics: Aerodynamics,
    solver: LeverSolver,
    engine: Engine<O>,
}

impl<O: PropulsionOracle> ClimbIntegrator<O> {
    pub fn new(config: ClimbConfig, oracle: O) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(ClimbIntegrator {
            atmosphere: AtmosphereModel::new(),
            aerodynamics: config.aircraft.aerodynamics(),
            solver: config.solver.lever_solver(),
            engine: Engine::new(oracle).with_tsfc_policy(config.policy.tsfc_policy()),
            config,
        })
    }

    /// Flies one climb from the configured initial state to the target altitude.
    ///
    /// The last step is shortened so the trace ends exactly on the target.
    /// Steps without a lever solution keep flying the prescribed kinematics
    /// and burn no fuel.
    pub fn run(&mut self, profile: &StrategyProfile) -> Result<SimulationTrace, SimulationError> {
        profile.validate()?;
        let mission = self.config.mission.clone();
        let engines = self.config.aircraft.engine_count;
        let target = mission.target_altitude_m;

        let mut state = FlightState {
            time: 0.0,
            altitude: mission.initial_altitude_m,
            velocity: mission.initial_speed_mps,
            mass: self.config.aircraft.initial_mass_kg,
        };
        let mut telemetry = Telemetry::new();
        telemetry.collect_data(trace_sample(&state, None, 0.0));

        info!(
            profile = %profile.label(),
            initial_altitude = state.altitude,
            target,
            "climb started"
        );

        if mission.specific_energy_rate <= 0.0 && state.altitude < target {
            warn!(
                specific_energy_rate = mission.specific_energy_rate,
                "no positive energy rate, target is unreachable"
            );
            return Err(SimulationError::DidNotConverge {
                steps: 0,
                altitude: state.altitude,
                target,
            });
        }

        let mut phase = if state.altitude >= target {
            ClimbPhase::TargetReached
        } else {
            ClimbPhase::Flying
        };
        let mut steps = 0;

        while phase == ClimbPhase::Flying {
            if steps >= mission.max_steps {
                warn!(steps, altitude = state.altitude, target, "step limit reached");
                return Err(SimulationError::DidNotConverge {
                    steps,
                    altitude: state.altitude,
                    target,
                });
            }

            let rates = self.step_rates(&state, profile, &mut telemetry);

            let mut dt = mission.time_step_s;
            let mut next_altitude = state.altitude + rates.climb_rate * dt;
            if next_altitude >= target {
                dt = (target - state.altitude) / rates.climb_rate.max(CLIMB_RATE_FLOOR);
                next_altitude = target;
                phase = ClimbPhase::TargetReached;
            }

            state = FlightState {
                time: state.time + dt,
                altitude: next_altitude,
                velocity: state.velocity + rates.acceleration * dt,
                mass: (state.mass - rates.fuel_flow * dt).max(0.0),
            };
            steps += 1;
            telemetry.collect_data(trace_sample(&state, rates.lever, rates.fuel_flow));
        }

        let trace = telemetry.finish(profile, engines);
        let summary = trace.summary();
        if summary.lever_failures > 0 || summary.thrust_limited_steps > 0 {
            warn!(
                profile = %profile.label(),
                lever_failures = summary.lever_failures,
                thrust_limited_steps = summary.thrust_limited_steps,
                "climb finished with engine shortfalls"
            );
        }
        info!(
            profile = %profile.label(),
            time = summary.total_climb_time,
            fuel_burned = summary.total_fuel_burned_kg,
            steps = summary.steps,
            "climb finished"
        );
        Ok(trace)
    }

    /// Flies every profile in turn. A failed run does not stop the others.
    pub fn run_sweep(
        &mut self,
        profiles: &[StrategyProfile],
    ) -> Vec<Result<SimulationTrace, SimulationError>> {
        profiles
            .iter()
            .map(|profile| {
                let result = self.run(profile);
                if let Err(error) = &result {
                    warn!(profile = %profile.label(), %error, "climb failed");
                }
                result
            })
            .collect()
    }

    /// Climb rate, acceleration and fuel flow at `state`.
    pub fn step_rates(
        &mut self,
        state: &FlightState,
        profile: &StrategyProfile,
        telemetry: &mut Telemetry,
    ) -> StepRates {
        let engines = f64::from(self.config.aircraft.engine_count);
        let energy_rate = self.config.mission.specific_energy_rate;
        let velocity = state.velocity;
        let safe_velocity = velocity.max(VELOCITY_FLOOR);

        let gravity = AtmosphereModel::gravity(state.altitude).max(GRAVITY_FLOOR);
        let weight = state.mass * gravity;
        let air = self.atmosphere.state(state.altitude);
        let sound_speed = air.speed_of_sound.max(SOUND_SPEED_FLOOR);
        let mach = velocity / sound_speed;
        let (query_mach, query_altitude_ft) = self.config.envelope.clip(mach, state.altitude);

        let weights = profile.weights(state.altitude, velocity).normalized();
        let climb_rate = weights.climb_weight * energy_rate;
        let acceleration = match profile.kinematic_law() {
            KinematicLaw::EnergySplit => {
                gravity / safe_velocity * weights.speed_weight * energy_rate
            }
            KinematicLaw::ConstantMach => {
                let gradient = self
                    .atmosphere
                    .speed_of_sound_gradient(state.altitude, self.config.policy.sound_speed_step_m);
                mach * gradient * climb_rate
            }
        };

        let forces = self.aerodynamics.evaluate(weight, air.density, velocity);
        let total_energy_rate = climb_rate + velocity / gravity * acceleration;
        let required_thrust = forces.drag + total_energy_rate * weight / safe_velocity;
        let per_engine = required_thrust / engines;

        let (lever, fuel_flow) = match self.solver.solve(
            &mut self.engine,
            per_engine,
            query_mach,
            query_altitude_ft,
        ) {
            None => {
                debug!(time = state.time, altitude = state.altitude, "no lever solution");
                telemetry.record_lever_failure(state.time);
                (None, 0.0)
            }
            Some(solution) => {
                if solution.thrust_limited {
                    debug!(
                        time = state.time,
                        required = per_engine,
                        available = solution.thrust_per_engine,
                        "thrust limited"
                    );
                    telemetry.record_thrust_limited(state.time);
                }
                let evaluated = self.engine.evaluate(solution.lever, query_mach, query_altitude_ft);
                let fuel_flow = match evaluated {
                    Ok(point) => point.tsfc * solution.thrust_per_engine * engines,
                    Err(error) => {
                        warn!(
                            time = state.time,
                            lever = solution.lever,
                            %error,
                            "fuel consumption unavailable"
                        );
                        0.0
                    }
                };
                (Some(solution.lever), fuel_flow)
            }
        };

        debug!(
            time = state.time,
            altitude = state.altitude,
            velocity,
            mach,
            required_thrust,
            fuel_flow,
            "step"
        );

        StepRates {
            climb_rate,
            acceleration,
            required_thrust,
            lever,
            fuel_flow,
        }
    }
}

fn trace_sample(state: &FlightState, lever: Option<f64>, fuel_flow: f64) -> TraceSample {
    TraceSample {
        time: state.time,
        altitude: state.altitude,
        velocity: state.velocity,
        lever,
        fuel_flow,
        mass: state.mass,
    }
}

//! Run configuration loaded from TOML.
//!
//! Every section and field has a default, so a file only needs to name what it
//! changes:
//!
//! ```toml
//! [aircraft]
//! initial_mass_kg = 62000.0
//!
//! [mission]
//! target_altitude_m = 6000.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LEVER_GRID_POINTS, MAX_SIMULATION_STEPS, SOUND_SPEED_PERTURBATION,
    SPECIFIC_ENERGY_RATE, TIME_STEP, TSFC_PER_HOUR_THRESHOLD,
};
use crate::control::fadec::LeverSolver;
use crate::control::propulsion::{QueryEnvelope, TsfcUnitPolicy};
use crate::errors::{ConfigError, SimulationError};
use crate::trajectory_system::aerodynamics::Aerodynamics;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbConfig {
    pub aircraft: AircraftConfig,
    pub mission: MissionConfig,
    pub envelope: QueryEnvelope,
    pub solver: SolverConfig,
    pub policy: PolicyConfig,
}

/// Airframe and powerplant constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AircraftConfig {
    pub wing_area_m2: f64,
    pub aspect_ratio: f64,
    pub oswald_efficiency: f64,
    pub zero_lift_drag: f64,
    pub engine_count: u32,
    pub initial_mass_kg: f64,
}

impl Default for AircraftConfig {
    fn default() -> Self {
        AircraftConfig {
            wing_area_m2: 122.6,
            aspect_ratio: 9.5,
            oswald_efficiency: 0.8,
            zero_lift_drag: 0.02,
            engine_count: 2,
            initial_mass_kg: 60_000.0,
        }
    }
}

impl AircraftConfig {
    pub fn aerodynamics(&self) -> Aerodynamics {
        Aerodynamics::new(
            self.zero_lift_drag,
            self.wing_area_m2,
            self.aspect_ratio,
            self.oswald_efficiency,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MissionConfig {
    pub initial_altitude_m: f64,
    pub initial_speed_mps: f64,
    pub target_altitude_m: f64,
    pub time_step_s: f64,
    /// Commanded specific-energy rate, m/s.
    pub specific_energy_rate: f64,
    pub max_steps: usize,
}

impl Default for MissionConfig {
    fn default() -> Self {
        MissionConfig {
            initial_altitude_m: 0.0,
            initial_speed_mps: 75.0,
            target_altitude_m: 4267.2,
            time_step_s: TIME_STEP,
            specific_energy_rate: SPECIFIC_ENERGY_RATE,
            max_steps: MAX_SIMULATION_STEPS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub lever_grid_points: usize,
    pub refine: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            lever_grid_points: DEFAULT_LEVER_GRID_POINTS,
            refine: true,
        }
    }
}

impl SolverConfig {
    pub fn lever_solver(&self) -> LeverSolver {
        LeverSolver::new(self.lever_grid_points, self.refine)
    }
}

/// Tunable heuristics for engine data and numerical derivatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub tsfc_per_hour_threshold: f64,
    pub sound_speed_step_m: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            tsfc_per_hour_threshold: TSFC_PER_HOUR_THRESHOLD,
            sound_speed_step_m: SOUND_SPEED_PERTURBATION,
        }
    }
}

impl PolicyConfig {
    pub fn tsfc_policy(&self) -> TsfcUnitPolicy {
        TsfcUnitPolicy {
            per_hour_threshold: self.tsfc_per_hour_threshold,
        }
    }
}

impl ClimbConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let aircraft = &self.aircraft;
        let mission = &self.mission;

        require(aircraft.wing_area_m2 > 0.0, "wing area must be positive")?;
        require(aircraft.aspect_ratio > 0.0, "aspect ratio must be positive")?;
        require(aircraft.oswald_efficiency > 0.0, "Oswald efficiency must be positive")?;
        require(aircraft.zero_lift_drag >= 0.0, "zero-lift drag must not be negative")?;
        require(aircraft.engine_count > 0, "at least one engine is required")?;
        require(aircraft.initial_mass_kg > 0.0, "initial mass must be positive")?;
        require(mission.initial_speed_mps > 0.0, "initial speed must be positive")?;
        require(mission.time_step_s > 0.0, "time step must be positive")?;
        require(mission.max_steps > 0, "step limit must be positive")?;
        require(
            mission.initial_altitude_m.is_finite() && mission.target_altitude_m.is_finite(),
            "altitudes must be finite",
        )?;
        require(self.envelope.is_ordered(), "engine query envelope bounds are inverted")?;
        require(
            self.solver.lever_grid_points >= 2,
            "lever grid needs at least two points",
        )?;
        require(
            self.policy.tsfc_per_hour_threshold > 0.0,
            "TSFC unit threshold must be positive",
        )?;
        require(
            self.policy.sound_speed_step_m > 0.0,
            "speed of sound difference step must be positive",
        )?;
        Ok(())
    }
}

fn require(condition: bool, message: &str) -> Result<(), SimulationError> {
    if condition {
        Ok(())
    } else {
        Err(SimulationError::InvalidConfig(message.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ClimbConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.aircraft.engine_count, 2);
        assert_eq!(config.solver.lever_grid_points, 21);
        assert_eq!(config.mission.target_altitude_m, 4267.2);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ClimbConfig::from_toml_str(
            r#"
            [aircraft]
            initial_mass_kg = 62000.0
            engine_count = 4

            [mission]
            target_altitude_m = 6000.0

            [envelope]
            mach_max = 0.9
            "#,
        )
        .unwrap();

        assert_eq!(config.aircraft.initial_mass_kg, 62_000.0);
        assert_eq!(config.aircraft.engine_count, 4);
        assert_eq!(config.aircraft.wing_area_m2, 122.6);
        assert_eq!(config.mission.target_altitude_m, 6000.0);
        assert_eq!(config.mission.time_step_s, 0.2);
        assert_eq!(config.envelope.mach_max, 0.9);
        assert_eq!(config.envelope.altitude_ft_max, 40_000.0);
        assert_eq!(config.policy.tsfc_per_hour_threshold, 1e-3);
    }

    #[test]
    fn test_malformed_toml_is_reported() {
        let result = ClimbConfig::from_toml_str("[mission]\ntime_step_s = \"fast\"");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = ClimbConfig::load("/nonexistent/climb.toml");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ClimbConfig::default();
        config.aircraft.engine_count = 0;
        assert!(matches!(config.validate(), Err(SimulationError::InvalidConfig(_))));

        let mut config = ClimbConfig::default();
        config.mission.time_step_s = 0.0;
        assert!(config.validate().is_err());

        let mut config = ClimbConfig::default();
        config.envelope.mach_min = 1.2;
        assert!(config.validate().is_err());

        let mut config = ClimbConfig::default();
        config.solver.lever_grid_points = 1;
        assert!(config.validate().is_err());
    }
}

pub mod config;
pub mod constants;
pub mod control;
pub mod errors;
pub mod logging;
pub mod telemetry_system;
pub mod trajectory_system;

pub use config::ClimbConfig;
pub use constants::*;
pub use errors::{ConfigError, EngineQueryError, LoggingError, SimulationError};

pub use control::envelope_scan::{scan_envelope, EnvelopeBounds, EnvelopeGrid, EnvelopeScan};
pub use control::environment::{AtmosphereModel, AtmosphericState};
pub use control::fadec::{LeverSolution, LeverSolver, SolveMethod};
pub use control::guidance::{
    default_altitude_fractions, StrategyKind, StrategyProfile, StrategyWeights,
};
pub use control::propulsion::{Engine, EnginePoint, PropulsionOracle, QueryEnvelope, TsfcUnitPolicy};
pub use control::synthetic_engine::SyntheticTurbofan;

// Re-export commonly used items from trajectory_system
pub use trajectory_system::aerodynamics::Aerodynamics;
pub use trajectory_system::kinematics::{ClimbIntegrator, FlightState};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::telemetry::{
    format_altitude, format_time, ClimbSummary, SimulationTrace, Telemetry, TraceSample,
};

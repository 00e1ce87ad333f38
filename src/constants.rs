// Physical Constants
pub const STANDARD_GRAVITY: f64 = 9.80665; // m/s²
pub const EARTH_RADIUS: f64 = 6_371_000.0; // meters
pub const GAS_CONSTANT_AIR: f64 = 287.05; // J/(kg·K)
pub const HEAT_CAPACITY_RATIO: f64 = 1.4;

// Sea-level reference atmosphere
pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15; // K
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0; // Pa
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m³

// Layer structure
pub const TROPOSPHERE_TEMP_GRADIENT: f64 = -0.0065; // K per meter
pub const UPPER_STRATOSPHERE_TEMP_GRADIENT: f64 = 0.001; // K per meter
pub const TROPOSPHERE_HEIGHT: f64 = 11_000.0; // m
pub const LOWER_STRATOSPHERE_HEIGHT: f64 = 20_000.0; // m
pub const TROPOSPHERE_POLYTROPIC_INDEX: f64 = 1.235;
pub const UPPER_STRATOSPHERE_POLYTROPIC_INDEX: f64 = 0.001;

// Units
pub const METERS_PER_FOOT: f64 = 0.3048;
pub const SECONDS_PER_HOUR: f64 = 3600.0;

// Lever solver
pub const DEFAULT_LEVER_GRID_POINTS: usize = 21;

// Engine data policies
pub const TSFC_PER_HOUR_THRESHOLD: f64 = 1e-3; // above this a TSFC is read as kg/(N·h)
pub const SOUND_SPEED_PERTURBATION: f64 = 1.0; // m, forward difference for da/dh

// Numerical floors
pub const VELOCITY_FLOOR: f64 = 1e-3; // m/s
pub const SOUND_SPEED_FLOOR: f64 = 1e-6; // m/s
pub const CLIMB_RATE_FLOOR: f64 = 1e-3; // m/s
pub const WEIGHT_SUM_FLOOR: f64 = 1e-12;
pub const GRAVITY_FLOOR: f64 = 1e-6; // m/s²

// Strategy sweep
pub const ALTITUDE_FRACTION_MIN: f64 = 0.1;
pub const ALTITUDE_FRACTION_MAX: f64 = 0.9;
pub const ALTITUDE_FRACTION_COUNT: usize = 15;

// Simulation Parameters
pub const TIME_STEP: f64 = 0.2; // s
pub const SPECIFIC_ENERGY_RATE: f64 = 10.0; // m/s
pub const MAX_SIMULATION_STEPS: usize = 1_000_000;

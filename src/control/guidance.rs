use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    ALTITUDE_FRACTION_COUNT, ALTITUDE_FRACTION_MAX, ALTITUDE_FRACTION_MIN, WEIGHT_SUM_FLOOR,
};
use crate::errors::{ConfigError, SimulationError};

/// Split of the commanded specific-energy rate between climb and acceleration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyWeights {
    pub climb_weight: f64,
    pub speed_weight: f64,
}

impl StrategyWeights {
    pub fn new(climb_weight: f64, speed_weight: f64) -> Self {
        StrategyWeights {
            climb_weight,
            speed_weight,
        }
    }

    /// Scales the pair so that it sums to one. A pair summing to zero puts
    /// everything into acceleration.
    pub fn normalized(self) -> Self {
        let total = (self.climb_weight + self.speed_weight).max(WEIGHT_SUM_FLOOR);
        let climb_weight = self.climb_weight / total;
        StrategyWeights {
            climb_weight,
            speed_weight: 1.0 - climb_weight,
        }
    }
}

/// How the speed derivative is obtained from the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KinematicLaw {
    /// dv/dt = (g/V)·speed_weight·Ė
    EnergySplit,
    /// dv/dt keeps V/a constant while climbing.
    ConstantMach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Linear,
    ExponentialIncreasingClimb,
    ExponentialDecreasingClimb,
    ExponentialIncreasingSpeed,
    ExponentialDecreasingSpeed,
    ConstantSpeed,
    ConstantMach,
}

/// Inputs to a weighting function.
#[derive(Debug, Clone, Copy)]
pub struct WeightInputs {
    pub altitude: f64,
    pub velocity: f64,
    pub altitude_fraction: f64,
    pub target_altitude: f64,
}

pub type WeightFn = fn(&WeightInputs) -> StrategyWeights;

static PROFILE_TABLE: [(StrategyKind, &str, WeightFn); 7] = [
    (StrategyKind::Linear, "linear", linear),
    (
        StrategyKind::ExponentialIncreasingClimb,
        "exponential_increasing_climb",
        exponential_increasing_climb,
    ),
    (
        StrategyKind::ExponentialDecreasingClimb,
        "exponential_decreasing_climb",
        exponential_decreasing_climb,
    ),
    (
        StrategyKind::ExponentialIncreasingSpeed,
        "exponential_increasing_speed",
        exponential_increasing_speed,
    ),
    (
        StrategyKind::ExponentialDecreasingSpeed,
        "exponential_decreasing_speed",
        exponential_decreasing_speed,
    ),
    (StrategyKind::ConstantSpeed, "constant_speed", all_climb),
    (StrategyKind::ConstantMach, "constant_mach", all_climb),
];

impl StrategyKind {
    pub const ALL: [StrategyKind; 7] = [
        StrategyKind::Linear,
        StrategyKind::ExponentialIncreasingClimb,
        StrategyKind::ExponentialDecreasingClimb,
        StrategyKind::ExponentialIncreasingSpeed,
        StrategyKind::ExponentialDecreasingSpeed,
        StrategyKind::ConstantSpeed,
        StrategyKind::ConstantMach,
    ];

    fn entry(self) -> &'static (StrategyKind, &'static str, WeightFn) {
        &PROFILE_TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.entry().1
    }

    pub fn weighting(self) -> WeightFn {
        self.entry().2
    }

    pub fn kinematic_law(self) -> KinematicLaw {
        match self {
            StrategyKind::ConstantMach => KinematicLaw::ConstantMach,
            _ => KinematicLaw::EnergySplit,
        }
    }

    /// Constant-rate kinds ignore the altitude fraction.
    pub fn uses_altitude_fraction(self) -> bool {
        !matches!(self, StrategyKind::ConstantSpeed | StrategyKind::ConstantMach)
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PROFILE_TABLE
            .iter()
            .find(|(_, name, _)| *name == s)
            .map(|(kind, _, _)| *kind)
            .ok_or_else(|| ConfigError::UnknownProfile(s.to_string()))
    }
}

/// One immutable climb strategy: a kind bound to its altitude fraction and target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyProfile {
    pub kind: StrategyKind,
    pub altitude_fraction: Option<f64>,
    pub target_altitude: f64,
}

impl StrategyProfile {
    pub fn new(kind: StrategyKind, altitude_fraction: Option<f64>, target_altitude: f64) -> Self {
        StrategyProfile {
            kind,
            altitude_fraction: if kind.uses_altitude_fraction() {
                altitude_fraction
            } else {
                None
            },
            target_altitude,
        }
    }

    /// One profile per fraction, or a single profile for the constant-rate kinds.
    pub fn sweep(kind: StrategyKind, target_altitude: f64, fractions: &[f64]) -> Vec<Self> {
        if kind.uses_altitude_fraction() {
            fractions
                .iter()
                .map(|&fraction| Self::new(kind, Some(fraction), target_altitude))
                .collect()
        } else {
            vec![Self::new(kind, None, target_altitude)]
        }
    }

    /// Rejects altitude fractions outside [0, 1] and non-finite targets, which
    /// would produce negative or undefined weights.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if let Some(fraction) = self.altitude_fraction {
            if !(0.0..=1.0).contains(&fraction) {
                return Err(SimulationError::InvalidConfig(format!(
                    "altitude fraction {fraction} is outside [0, 1]"
                )));
            }
        }
        if !self.target_altitude.is_finite() {
            return Err(SimulationError::InvalidConfig(
                "profile target altitude must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Unnormalized weights at the given flight condition.
    pub fn weights(&self, altitude: f64, velocity: f64) -> StrategyWeights {
        let inputs = WeightInputs {
            altitude,
            velocity,
            altitude_fraction: self.altitude_fraction.unwrap_or(1.0),
            target_altitude: self.target_altitude,
        };
        (self.kind.weighting())(&inputs)
    }

    pub fn kinematic_law(&self) -> KinematicLaw {
        self.kind.kinematic_law()
    }

    pub fn label(&self) -> String {
        match self.altitude_fraction {
            Some(fraction) => format!("{} | AF={:.2}", self.kind, fraction),
            None => format!("{} | AF=-", self.kind),
        }
    }
}

/// Evenly spaced altitude fractions from 0.1 to 0.9.
pub fn default_altitude_fractions() -> Vec<f64> {
    let span = ALTITUDE_FRACTION_MAX - ALTITUDE_FRACTION_MIN;
    let last = (ALTITUDE_FRACTION_COUNT - 1) as f64;
    (0..ALTITUDE_FRACTION_COUNT)
        .map(|i| ALTITUDE_FRACTION_MIN + span * i as f64 / last)
        .collect()
}

fn altitude_ratio(inputs: &WeightInputs) -> f64 {
    if inputs.target_altitude.abs() > 0.0 {
        inputs.altitude / inputs.target_altitude
    } else {
        0.0
    }
}

fn linear(inputs: &WeightInputs) -> StrategyWeights {
    StrategyWeights::new(inputs.altitude_fraction, 1.0 - inputs.altitude_fraction)
}

fn exponential_increasing_climb(inputs: &WeightInputs) -> StrategyWeights {
    let ratio = altitude_ratio(inputs);
    let fraction = inputs.altitude_fraction;
    StrategyWeights::new(fraction * ratio.exp(), (1.0 - fraction) * (-ratio).exp())
}

fn exponential_decreasing_climb(inputs: &WeightInputs) -> StrategyWeights {
    let ratio = altitude_ratio(inputs);
    let fraction = inputs.altitude_fraction;
    StrategyWeights::new(fraction * (-ratio).exp(), (1.0 - fraction) * ratio.exp())
}

fn exponential_increasing_speed(inputs: &WeightInputs) -> StrategyWeights {
    let ratio = altitude_ratio(inputs);
    let fraction = inputs.altitude_fraction;
    StrategyWeights::new((1.0 - fraction) * (-ratio).exp(), fraction * ratio.exp())
}

fn exponential_decreasing_speed(inputs: &WeightInputs) -> StrategyWeights {
    let ratio = altitude_ratio(inputs);
    let fraction = inputs.altitude_fraction;
    StrategyWeights::new((1.0 - fraction) * ratio.exp(), fraction * (-ratio).exp())
}

fn all_climb(_inputs: &WeightInputs) -> StrategyWeights {
    StrategyWeights::new(1.0, 0.0)
}

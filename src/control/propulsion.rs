use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::{METERS_PER_FOOT, SECONDS_PER_HOUR, TSFC_PER_HOUR_THRESHOLD};
use crate::errors::EngineQueryError;

/// An engine performance deck queried one operating point at a time.
///
/// `get_tsfc` reports the fuel consumption of the most recent `get_thrust`
/// call, so the two must be issued back to back. Go through [`Engine`], which
/// only exposes the pair as a single operation.
pub trait PropulsionOracle {
    /// Thrust in newtons for one engine.
    fn get_thrust(
        &mut self,
        lever: f64,
        mach: f64,
        altitude_ft: f64,
    ) -> Result<f64, EngineQueryError>;

    /// Thrust-specific fuel consumption at the last evaluated operating point.
    fn get_tsfc(&mut self) -> Result<f64, EngineQueryError>;
}

impl<T: PropulsionOracle + ?Sized> PropulsionOracle for &mut T {
    fn get_thrust(
        &mut self,
        lever: f64,
        mach: f64,
        altitude_ft: f64,
    ) -> Result<f64, EngineQueryError> {
        (**self).get_thrust(lever, mach, altitude_ft)
    }

    fn get_tsfc(&mut self) -> Result<f64, EngineQueryError> {
        (**self).get_tsfc()
    }
}

/// Mach and altitude bounds the performance deck accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryEnvelope {
    pub mach_min: f64,
    pub mach_max: f64,
    pub altitude_ft_min: f64,
    pub altitude_ft_max: f64,
}

impl Default for QueryEnvelope {
    fn default() -> Self {
        QueryEnvelope {
            mach_min: 0.0,
            mach_max: 1.0,
            altitude_ft_min: 0.0,
            altitude_ft_max: 40_000.0,
        }
    }
}

impl QueryEnvelope {
    pub fn clip_mach(&self, mach: f64) -> f64 {
        mach.clamp(self.mach_min, self.mach_max)
    }

    pub fn clip_altitude_ft(&self, altitude_ft: f64) -> f64 {
        altitude_ft.clamp(self.altitude_ft_min, self.altitude_ft_max)
    }

    /// Clipped (Mach, altitude in feet) for an altitude given in meters.
    pub fn clip(&self, mach: f64, altitude_m: f64) -> (f64, f64) {
        (
            self.clip_mach(mach),
            self.clip_altitude_ft(altitude_m / METERS_PER_FOOT),
        )
    }

    pub fn is_ordered(&self) -> bool {
        self.mach_min <= self.mach_max && self.altitude_ft_min <= self.altitude_ft_max
    }
}

/// Unit detection for TSFC values of unknown provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TsfcUnitPolicy {
    /// Values above this are taken as kg/(N·h).
    pub per_hour_threshold: f64,
}

impl Default for TsfcUnitPolicy {
    fn default() -> Self {
        TsfcUnitPolicy {
            per_hour_threshold: TSFC_PER_HOUR_THRESHOLD,
        }
    }
}

impl TsfcUnitPolicy {
    /// Returns the TSFC in kg/(N·s) and whether a per-hour conversion was applied.
    pub fn normalize(&self, raw: f64) -> (f64, bool) {
        if raw > self.per_hour_threshold {
            (raw / SECONDS_PER_HOUR, true)
        } else {
            (raw, false)
        }
    }
}

/// Thrust and fuel consumption evaluated together at one operating point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnginePoint {
    pub thrust: f64,
    /// kg/(N·s)
    pub tsfc: f64,
    pub converted_from_per_hour: bool,
}

/// Validating wrapper around a [`PropulsionOracle`].
pub struct Engine<O> {
    oracle: O,
    tsfc_policy: TsfcUnitPolicy,
}

impl<O: PropulsionOracle> Engine<O> {
    pub fn new(oracle: O) -> Self {
        Engine {
            oracle,
            tsfc_policy: TsfcUnitPolicy::default(),
        }
    }

    pub fn with_tsfc_policy(mut self, tsfc_policy: TsfcUnitPolicy) -> Self {
        self.tsfc_policy = tsfc_policy;
        self
    }

    /// Thrust at one operating point. Non-finite and negative results count as failures.
    pub fn thrust(
        &mut self,
        lever: f64,
        mach: f64,
        altitude_ft: f64,
    ) -> Result<f64, EngineQueryError> {
        let result = self
            .oracle
            .get_thrust(lever, mach, altitude_ft)
            .and_then(validate);
        if let Err(error) = &result {
            trace!(lever, mach, altitude_ft, %error, "thrust query failed");
        }
        result
    }

    /// Thrust and TSFC from one uninterrupted pair of oracle calls.
    pub fn evaluate(
        &mut self,
        lever: f64,
        mach: f64,
        altitude_ft: f64,
    ) -> Result<EnginePoint, EngineQueryError> {
        let thrust = self.thrust(lever, mach, altitude_ft)?;
        let raw_tsfc = self.oracle.get_tsfc().and_then(validate)?;
        let (tsfc, converted_from_per_hour) = self.tsfc_policy.normalize(raw_tsfc);

        Ok(EnginePoint {
            thrust,
            tsfc,
            converted_from_per_hour,
        })
    }

    pub fn into_inner(self) -> O {
        self.oracle
    }
}

fn validate(value: f64) -> Result<f64, EngineQueryError> {
    if !value.is_finite() {
        Err(EngineQueryError::NonFinite(value))
    } else if value < 0.0 {
        Err(EngineQueryError::Negative(value))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct ScriptedOracle {
        thrust: f64,
        tsfc: f64,
        calls: Vec<&'static str>,
    }

    impl PropulsionOracle for ScriptedOracle {
        fn get_thrust(
            &mut self,
            _lever: f64,
            _mach: f64,
            _altitude_ft: f64,
        ) -> Result<f64, EngineQueryError> {
            self.calls.push("thrust");
            Ok(self.thrust)
        }

        fn get_tsfc(&mut self) -> Result<f64, EngineQueryError> {
            self.calls.push("tsfc");
            Ok(self.tsfc)
        }
    }

    fn oracle(thrust: f64, tsfc: f64) -> ScriptedOracle {
        ScriptedOracle {
            thrust,
            tsfc,
            calls: Vec::new(),
        }
    }

    #[test]
    fn test_non_finite_thrust_is_rejected() {
        let mut engine = Engine::new(oracle(f64::NAN, 1e-5));
        assert!(matches!(
            engine.thrust(0.5, 0.3, 1000.0),
            Err(EngineQueryError::NonFinite(_))
        ));

        let mut engine = Engine::new(oracle(f64::INFINITY, 1e-5));
        assert!(engine.thrust(0.5, 0.3, 1000.0).is_err());
    }

    #[test]
    fn test_negative_thrust_is_rejected() {
        let mut engine = Engine::new(oracle(-10.0, 1e-5));
        assert_eq!(
            engine.thrust(0.5, 0.3, 1000.0),
            Err(EngineQueryError::Negative(-10.0))
        );
    }

    #[test]
    fn test_evaluate_pairs_thrust_and_tsfc() {
        let mut engine = Engine::new(oracle(20_000.0, 1.6e-5));
        let point = engine.evaluate(0.7, 0.4, 5000.0).unwrap();

        assert_eq!(point.thrust, 20_000.0);
        assert_eq!(point.tsfc, 1.6e-5);
        assert!(!point.converted_from_per_hour);
        assert_eq!(engine.into_inner().calls, vec!["thrust", "tsfc"]);
    }

    #[test]
    fn test_per_hour_tsfc_is_converted() {
        let mut engine = Engine::new(oracle(20_000.0, 0.0576));
        let point = engine.evaluate(0.7, 0.4, 5000.0).unwrap();

        assert_relative_eq!(point.tsfc, 0.0576 / 3600.0, max_relative = 1e-12);
        assert!(point.converted_from_per_hour);
    }

    #[test]
    fn test_tsfc_threshold_is_configurable() {
        let policy = TsfcUnitPolicy {
            per_hour_threshold: 0.1,
        };
        let mut engine = Engine::new(oracle(20_000.0, 0.0576)).with_tsfc_policy(policy);
        let point = engine.evaluate(0.7, 0.4, 5000.0).unwrap();

        assert_eq!(point.tsfc, 0.0576);
        assert!(!point.converted_from_per_hour);
    }

    #[test]
    fn test_failed_thrust_skips_tsfc_query() {
        let mut engine = Engine::new(oracle(f64::NAN, 1e-5));
        assert!(engine.evaluate(0.7, 0.4, 5000.0).is_err());
        assert_eq!(engine.into_inner().calls, vec!["thrust"]);
    }

    #[test]
    fn test_envelope_clipping() {
        let envelope = QueryEnvelope::default();

        assert_eq!(envelope.clip_mach(1.4), 1.0);
        assert_eq!(envelope.clip_mach(-0.1), 0.0);
        assert_eq!(envelope.clip_altitude_ft(50_000.0), 40_000.0);

        let (mach, altitude_ft) = envelope.clip(0.3, 3048.0);
        assert_eq!(mach, 0.3);
        assert_relative_eq!(altitude_ft, 10_000.0, max_relative = 1e-12);
    }
}

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::environment::AtmosphereModel;
use super::propulsion::PropulsionOracle;
use crate::constants::METERS_PER_FOOT;
use crate::errors::EngineQueryError;

#[derive(Debug, Clone, Copy)]
struct OperatingPoint {
    lever: f64,
    mach: f64,
}

/// Analytic high-bypass turbofan deck.
///
/// Thrust scales with density ratio to the 0.7 power, falls off linearly with
/// Mach, and follows a convex lever schedule above an idle floor. TSFC is
/// reported in kg/(N·h), like many legacy decks. Optional seeded jitter and
/// dropout make the deck noisy and unreliable on purpose.
#[derive(Debug, Clone)]
pub struct SyntheticTurbofan {
    pub max_static_thrust: f64,
    pub idle_fraction: f64,
    pub tsfc_per_hour: f64,
    pub mach_limit: f64,
    pub altitude_ft_limit: f64,
    atmosphere: AtmosphereModel,
    last_point: Option<OperatingPoint>,
    rng: StdRng,
    jitter: f64,
    dropout: f64,
}

impl Default for SyntheticTurbofan {
    fn default() -> Self {
        Self::new(120_000.0)
    }
}

impl SyntheticTurbofan {
    pub fn new(max_static_thrust: f64) -> Self {
        SyntheticTurbofan {
            max_static_thrust,
            idle_fraction: 0.05,
            tsfc_per_hour: 0.0576,
            mach_limit: 1.0,
            altitude_ft_limit: 45_000.0,
            atmosphere: AtmosphereModel::new(),
            last_point: None,
            rng: StdRng::seed_from_u64(0),
            jitter: 0.0,
            dropout: 0.0,
        }
    }

    /// Seeds the generator shared by jitter and dropout.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Multiplies every thrust answer by a factor drawn from `1 ± amplitude`.
    pub fn with_jitter(mut self, amplitude: f64) -> Self {
        self.jitter = amplitude.abs();
        self
    }

    /// Rejects each thrust query with the given probability.
    pub fn with_dropout(mut self, probability: f64) -> Self {
        self.dropout = probability.clamp(0.0, 1.0);
        self
    }

    /// Noise-free thrust at an operating point.
    pub fn nominal_thrust(&self, lever: f64, mach: f64, altitude_ft: f64) -> f64 {
        let sigma = self.atmosphere.density_ratio(altitude_ft * METERS_PER_FOOT);
        let schedule = self.idle_fraction + (1.0 - self.idle_fraction) * lever.powf(1.5);
        self.max_static_thrust * sigma.powf(0.7) * (1.0 - 0.25 * mach) * schedule
    }

    fn in_envelope(&self, lever: f64, mach: f64, altitude_ft: f64) -> bool {
        (0.0..=1.0).contains(&lever)
            && (0.0..=self.mach_limit).contains(&mach)
            && (0.0..=self.altitude_ft_limit).contains(&altitude_ft)
    }
}

impl PropulsionOracle for SyntheticTurbofan {
    fn get_thrust(
        &mut self,
        lever: f64,
        mach: f64,
        altitude_ft: f64,
    ) -> Result<f64, EngineQueryError> {
        self.last_point = None;
        if !self.in_envelope(lever, mach, altitude_ft) {
            return Err(EngineQueryError::Rejected(format!(
                "lever {lever:.3}, Mach {mach:.3}, {altitude_ft:.0} ft is outside the deck"
            )));
        }
        if self.dropout > 0.0 && self.rng.gen_bool(self.dropout) {
            return Err(EngineQueryError::Rejected("deck did not converge".to_string()));
        }

        let mut thrust = self.nominal_thrust(lever, mach, altitude_ft);
        if self.jitter > 0.0 {
            thrust *= 1.0 + self.rng.gen_range(-self.jitter..=self.jitter);
        }
        self.last_point = Some(OperatingPoint { lever, mach });
        Ok(thrust)
    }

    fn get_tsfc(&mut self) -> Result<f64, EngineQueryError> {
        let point = self.last_point.ok_or(EngineQueryError::NoOperatingPoint)?;
        let part_power = 1.0 + 0.4 * (1.0 - point.lever).powi(2);
        Ok(self.tsfc_per_hour * part_power * (1.0 + 0.15 * point.mach))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::fadec::enforce_monotonic;
    use approx::assert_relative_eq;

    #[test]
    fn test_thrust_rises_with_lever() {
        let mut engine = SyntheticTurbofan::default();
        let mut previous = 0.0;
        for i in 0..=20 {
            let thrust = engine.get_thrust(i as f64 / 20.0, 0.3, 5_000.0).unwrap();
            assert!(thrust > previous);
            previous = thrust;
        }
    }

    #[test]
    fn test_static_sea_level_thrust() {
        let mut engine = SyntheticTurbofan::default();
        let full = engine.get_thrust(1.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(full, 120_000.0, max_relative = 1e-12);
        let idle = engine.get_thrust(0.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(idle, 6_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_thrust_lapses_with_altitude() {
        let engine = SyntheticTurbofan::default();
        assert!(engine.nominal_thrust(1.0, 0.5, 30_000.0) < engine.nominal_thrust(1.0, 0.5, 0.0));
    }

    #[test]
    fn test_outside_envelope_is_rejected() {
        let mut engine = SyntheticTurbofan::default();
        assert!(engine.get_thrust(0.5, 1.2, 10_000.0).is_err());
        assert!(engine.get_thrust(0.5, 0.5, 50_000.0).is_err());
        assert!(engine.get_thrust(1.1, 0.5, 10_000.0).is_err());
    }

    #[test]
    fn test_tsfc_requires_prior_thrust_query() {
        let mut engine = SyntheticTurbofan::default();
        assert_eq!(engine.get_tsfc(), Err(EngineQueryError::NoOperatingPoint));

        engine.get_thrust(1.0, 0.0, 0.0).unwrap();
        assert_relative_eq!(engine.get_tsfc().unwrap(), 0.0576, max_relative = 1e-12);

        assert!(engine.get_thrust(0.5, 2.0, 0.0).is_err());
        assert_eq!(engine.get_tsfc(), Err(EngineQueryError::NoOperatingPoint));
    }

    #[test]
    fn test_jitter_is_reproducible_and_breaks_monotonicity() {
        let sample = |seed| {
            let mut engine = SyntheticTurbofan::default().with_seed(seed).with_jitter(0.2);
            (0..=20)
                .map(|i| engine.get_thrust(0.5 + i as f64 * 0.001, 0.3, 5_000.0).unwrap())
                .collect::<Vec<_>>()
        };

        let first = sample(7);
        assert_eq!(first, sample(7));
        assert!(first.windows(2).any(|pair| pair[1] < pair[0]));

        let mut clamped = first.clone();
        enforce_monotonic(&mut clamped);
        assert!(clamped.windows(2).all(|pair| pair[1] >= pair[0]));
    }

    #[test]
    fn test_full_dropout_rejects_everything() {
        let mut engine = SyntheticTurbofan::default().with_dropout(1.0);
        assert!((0..10).all(|_| engine.get_thrust(0.5, 0.3, 5_000.0).is_err()));
    }

    #[test]
    fn test_builder_order_does_not_change_noise() {
        let answers = |mut engine: SyntheticTurbofan| {
            (0..50)
                .map(|i| engine.get_thrust(i as f64 / 49.0, 0.4, 8_000.0).ok())
                .collect::<Vec<_>>()
        };

        let seed_first = SyntheticTurbofan::default()
            .with_seed(21)
            .with_jitter(0.1)
            .with_dropout(0.3);
        let seed_last = SyntheticTurbofan::default()
            .with_dropout(0.3)
            .with_jitter(0.1)
            .with_seed(21);
        let other_seed = SyntheticTurbofan::default()
            .with_seed(22)
            .with_jitter(0.1)
            .with_dropout(0.3);

        let reference = answers(seed_first);
        assert_eq!(reference, answers(seed_last));
        assert_ne!(reference, answers(other_seed));
        assert!(reference.iter().any(Option::is_none));
        assert!(reference.iter().any(Option::is_some));
    }
}

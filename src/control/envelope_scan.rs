//! Brute-force survey of where an engine deck gives usable answers.

use serde::Serialize;
use tracing::{debug, info};

use super::propulsion::{Engine, PropulsionOracle, QueryEnvelope};

/// Lever, altitude and Mach grids swept by [`scan_envelope`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeGrid {
    pub levers: Vec<f64>,
    pub altitudes_ft: Vec<f64>,
    pub machs: Vec<f64>,
}

impl Default for EnvelopeGrid {
    fn default() -> Self {
        EnvelopeGrid {
            levers: linspace(0.0, 1.0, 6),
            altitudes_ft: stepped(0.0, 40_000.0, 2_000.0),
            machs: stepped(0.0, 1.0, 0.02),
        }
    }
}

impl EnvelopeGrid {
    pub fn scan<O: PropulsionOracle>(&self, engine: &mut Engine<O>) -> EnvelopeScan {
        scan_envelope(engine, &self.levers, &self.altitudes_ft, &self.machs)
    }
}

/// `count` evenly spaced values from `start` to `end` inclusive.
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let last = (count - 1) as f64;
            (0..count)
                .map(|i| start + (end - start) * (i as f64 / last))
                .collect()
        }
    }
}

/// Values from `start` to `end` inclusive, `step` apart, without accumulating drift.
fn stepped(start: f64, end: f64, step: f64) -> Vec<f64> {
    let count = ((end - start) / step).round() as usize + 1;
    linspace(start, end, count)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopePoint {
    pub lever: f64,
    pub altitude_ft: f64,
    pub mach: f64,
    pub thrust: Option<f64>,
    /// kg/(N·s)
    pub tsfc: Option<f64>,
    pub converted_from_per_hour: bool,
    pub error: Option<String>,
}

impl EnvelopePoint {
    pub fn is_valid(&self) -> bool {
        self.thrust.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    fn of<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |range, value| {
            Some(match range {
                None => ValueRange { min: value, max: value },
                Some(ValueRange { min, max }) => ValueRange {
                    min: min.min(value),
                    max: max.max(value),
                },
            })
        })
    }
}

/// Extent of the valid region over the whole grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvelopeBounds {
    pub mach: ValueRange,
    pub altitude_ft: ValueRange,
    pub lever: ValueRange,
    pub tsfc: ValueRange,
    pub valid_points: usize,
    pub total_points: usize,
}

impl EnvelopeBounds {
    /// Clipping box for the climb integrator's engine queries.
    pub fn to_query_envelope(&self) -> QueryEnvelope {
        QueryEnvelope {
            mach_min: self.mach.min,
            mach_max: self.mach.max,
            altitude_ft_min: self.altitude_ft.min,
            altitude_ft_max: self.altitude_ft.max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AltitudeSummary {
    pub altitude_ft: f64,
    pub points: usize,
    pub valid_points: usize,
    /// Mach span over which every lever gave a valid answer.
    pub full_valid_mach: Option<ValueRange>,
    pub tsfc: Option<ValueRange>,
    pub any_valid: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeverSummary {
    pub lever: f64,
    pub mach: ValueRange,
    pub altitude_ft: ValueRange,
    pub tsfc: ValueRange,
    pub valid_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeScan {
    pub points: Vec<EnvelopePoint>,
    pub bounds: Option<EnvelopeBounds>,
    pub by_altitude: Vec<AltitudeSummary>,
    pub by_lever: Vec<LeverSummary>,
}

/// Evaluates thrust and TSFC at every (lever, altitude, Mach) combination.
///
/// Points are ordered lever-major, then altitude, then Mach. Levers without a
/// single valid point are left out of the per-lever summary.
pub fn scan_envelope<O: PropulsionOracle>(
    engine: &mut Engine<O>,
    levers: &[f64],
    altitudes_ft: &[f64],
    machs: &[f64],
) -> EnvelopeScan {
    let mut points = Vec::with_capacity(levers.len() * altitudes_ft.len() * machs.len());
    for &lever in levers {
        for &altitude_ft in altitudes_ft {
            for &mach in machs {
                let point = match engine.evaluate(lever, mach, altitude_ft) {
                    Ok(evaluated) => EnvelopePoint {
                        lever,
                        altitude_ft,
                        mach,
                        thrust: Some(evaluated.thrust),
                        tsfc: Some(evaluated.tsfc),
                        converted_from_per_hour: evaluated.converted_from_per_hour,
                        error: None,
                    },
                    Err(error) => EnvelopePoint {
                        lever,
                        altitude_ft,
                        mach,
                        thrust: None,
                        tsfc: None,
                        converted_from_per_hour: false,
                        error: Some(error.to_string()),
                    },
                };
                points.push(point);
            }
        }
    }

    let index = |lever: usize, altitude: usize, mach: usize| {
        (lever * altitudes_ft.len() + altitude) * machs.len() + mach
    };
    let all: &[EnvelopePoint] = &points;
    let valid = move || all.iter().filter(|point| point.is_valid());

    let bounds = ValueRange::of(valid().map(|p| p.mach)).and_then(|mach| {
        Some(EnvelopeBounds {
            mach,
            altitude_ft: ValueRange::of(valid().map(|p| p.altitude_ft))?,
            lever: ValueRange::of(valid().map(|p| p.lever))?,
            tsfc: ValueRange::of(valid().filter_map(|p| p.tsfc))?,
            valid_points: valid().count(),
            total_points: all.len(),
        })
    });

    let by_altitude = altitudes_ft
        .iter()
        .enumerate()
        .map(|(a, &altitude_ft)| {
            let at_altitude = move || {
                (0..levers.len())
                    .flat_map(move |l| (0..machs.len()).map(move |m| index(l, a, m)))
                    .map(move |i| &all[i])
            };
            let full_valid = machs.iter().enumerate().filter_map(|(m, &mach)| {
                (0..levers.len())
                    .all(|l| all[index(l, a, m)].is_valid())
                    .then_some(mach)
            });
            let valid_points = at_altitude().filter(|p| p.is_valid()).count();
            AltitudeSummary {
                altitude_ft,
                points: levers.len() * machs.len(),
                valid_points,
                full_valid_mach: ValueRange::of(full_valid),
                tsfc: ValueRange::of(at_altitude().filter_map(|p| p.tsfc)),
                any_valid: valid_points > 0,
            }
        })
        .collect();

    let by_lever = levers
        .iter()
        .enumerate()
        .filter_map(|(l, &lever)| {
            let start = index(l, 0, 0);
            let at_lever = &all[start..start + altitudes_ft.len() * machs.len()];
            let valid_at_lever = || at_lever.iter().filter(|p| p.is_valid());
            Some(LeverSummary {
                lever,
                mach: ValueRange::of(valid_at_lever().map(|p| p.mach))?,
                altitude_ft: ValueRange::of(valid_at_lever().map(|p| p.altitude_ft))?,
                tsfc: ValueRange::of(valid_at_lever().filter_map(|p| p.tsfc))?,
                valid_points: valid_at_lever().count(),
            })
        })
        .collect();

    match &bounds {
        Some(b) => info!(
            valid = b.valid_points,
            total = b.total_points,
            mach_min = b.mach.min,
            mach_max = b.mach.max,
            altitude_ft_min = b.altitude_ft.min,
            altitude_ft_max = b.altitude_ft.max,
            "engine envelope scanned"
        ),
        None => info!(total = points.len(), "engine envelope scanned, no valid points"),
    }
    debug!(levers = levers.len(), altitudes = altitudes_ft.len(), machs = machs.len(), "scan grid");

    EnvelopeScan {
        points,
        bounds,
        by_altitude,
        by_lever,
    }
}

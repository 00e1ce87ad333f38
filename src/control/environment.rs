use serde::Serialize;

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, EARTH_RADIUS, GAS_CONSTANT_AIR, HEAT_CAPACITY_RATIO,
    LOWER_STRATOSPHERE_HEIGHT, SEA_LEVEL_PRESSURE, SEA_LEVEL_TEMPERATURE, STANDARD_GRAVITY,
    TROPOSPHERE_HEIGHT, TROPOSPHERE_POLYTROPIC_INDEX, TROPOSPHERE_TEMP_GRADIENT,
    UPPER_STRATOSPHERE_POLYTROPIC_INDEX, UPPER_STRATOSPHERE_TEMP_GRADIENT,
};

/// Air properties and local gravity at one altitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtmosphericState {
    pub altitude: f64,
    pub temperature: f64,
    pub pressure: f64,
    pub density: f64,
    pub speed_of_sound: f64,
    pub gravity: f64,
}

#[derive(Debug, Clone, Copy)]
struct LayerBase {
    altitude: f64,
    temperature: f64,
    pressure: f64,
    density: f64,
}

/// Three-layer International Standard Atmosphere.
///
/// * up to 11 km: polytropic troposphere, lapse rate -6.5 K/km
/// * 11 km to 20 km: isothermal lower stratosphere
/// * above 20 km: polytropic upper stratosphere, lapse rate +1 K/km
///
/// The base values of each upper layer are evaluated from the layer below, so
/// every property is continuous across the seams. Negative altitudes follow
/// the troposphere formula and altitudes beyond 20 km keep following the upper
/// stratosphere formula without limit.
#[derive(Debug, Clone, Copy)]
pub struct AtmosphereModel {
    tropopause: LayerBase,
    stratosphere_top: LayerBase,
}

impl Default for AtmosphereModel {
    fn default() -> Self {
        Self::new()
    }
}

impl AtmosphereModel {
    pub fn new() -> Self {
        let tropopause = polytropic_layer(
            &SEA_LEVEL,
            TROPOSPHERE_TEMP_GRADIENT,
            TROPOSPHERE_POLYTROPIC_INDEX,
            TROPOSPHERE_HEIGHT,
        );
        let stratosphere_top = isothermal_layer(&tropopause, LOWER_STRATOSPHERE_HEIGHT);

        AtmosphereModel {
            tropopause,
            stratosphere_top,
        }
    }

    pub fn state(&self, altitude: f64) -> AtmosphericState {
        let layer = self.layer_values(altitude);
        AtmosphericState {
            altitude,
            temperature: layer.temperature,
            pressure: layer.pressure,
            density: layer.density,
            speed_of_sound: speed_of_sound(layer.temperature),
            gravity: Self::gravity(altitude),
        }
    }

    pub fn temperature(&self, altitude: f64) -> f64 {
        self.layer_values(altitude).temperature
    }

    pub fn density(&self, altitude: f64) -> f64 {
        self.layer_values(altitude).density
    }

    pub fn speed_of_sound(&self, altitude: f64) -> f64 {
        speed_of_sound(self.temperature(altitude))
    }

    /// Local density over sea-level density.
    pub fn density_ratio(&self, altitude: f64) -> f64 {
        self.density(altitude) / AIR_DENSITY_SEA_LEVEL
    }

    /// Forward-difference estimate of d(speed of sound)/d(altitude).
    pub fn speed_of_sound_gradient(&self, altitude: f64, step: f64) -> f64 {
        (self.speed_of_sound(altitude + step) - self.speed_of_sound(altitude)) / step
    }

    /// Inverse-square gravity above the mean Earth radius.
    pub fn gravity(altitude: f64) -> f64 {
        STANDARD_GRAVITY * (EARTH_RADIUS / (EARTH_RADIUS + altitude)).powi(2)
    }

    fn layer_values(&self, altitude: f64) -> LayerBase {
        if altitude <= TROPOSPHERE_HEIGHT {
            polytropic_layer(
                &SEA_LEVEL,
                TROPOSPHERE_TEMP_GRADIENT,
                TROPOSPHERE_POLYTROPIC_INDEX,
                altitude,
            )
        } else if altitude <= LOWER_STRATOSPHERE_HEIGHT {
            isothermal_layer(&self.tropopause, altitude)
        } else {
            polytropic_layer(
                &self.stratosphere_top,
                UPPER_STRATOSPHERE_TEMP_GRADIENT,
                UPPER_STRATOSPHERE_POLYTROPIC_INDEX,
                altitude,
            )
        }
    }
}

const SEA_LEVEL: LayerBase = LayerBase {
    altitude: 0.0,
    temperature: SEA_LEVEL_TEMPERATURE,
    pressure: SEA_LEVEL_PRESSURE,
    density: AIR_DENSITY_SEA_LEVEL,
};

fn speed_of_sound(temperature: f64) -> f64 {
    (HEAT_CAPACITY_RATIO * GAS_CONSTANT_AIR * temperature).sqrt()
}

// T = T_b·θ, p = p_b·θ^(n/(n-1)), ρ = ρ_b·θ^(1/(n-1)) with θ = 1 + (λ/T_b)(h - h_b)
fn polytropic_layer(base: &LayerBase, lapse_rate: f64, index: f64, altitude: f64) -> LayerBase {
    let theta = 1.0 + (lapse_rate / base.temperature) * (altitude - base.altitude);
    LayerBase {
        altitude,
        temperature: base.temperature * theta,
        pressure: base.pressure * theta.powf(index / (index - 1.0)),
        density: base.density * theta.powf(1.0 / (index - 1.0)),
    }
}

fn isothermal_layer(base: &LayerBase, altitude: f64) -> LayerBase {
    let decay = (-STANDARD_GRAVITY / (GAS_CONSTANT_AIR * base.temperature)
        * (altitude - base.altitude))
        .exp();
    LayerBase {
        altitude,
        temperature: base.temperature,
        pressure: base.pressure * decay,
        density: base.density * decay,
    }
}

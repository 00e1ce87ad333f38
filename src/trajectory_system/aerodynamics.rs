use std::f64::consts::PI;

use crate::constants::VELOCITY_FLOOR;

/// Lift and drag of the airframe in trimmed, wings-level flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AeroForces {
    pub lift_coefficient: f64,
    pub drag_coefficient: f64,
    pub drag: f64,
}

/// Parabolic drag polar `CD = CD0 + CL²/(π·AR·e)`.
#[derive(Debug, Clone, Copy)]
pub struct Aerodynamics {
    pub zero_lift_drag: f64,
    pub wing_area: f64,
    pub aspect_ratio: f64,
    pub oswald_efficiency: f64,
}

impl Aerodynamics {
    pub fn new(
        zero_lift_drag: f64,
        wing_area: f64,
        aspect_ratio: f64,
        oswald_efficiency: f64,
    ) -> Self {
        Aerodynamics {
            zero_lift_drag,
            wing_area,
            aspect_ratio,
            oswald_efficiency,
        }
    }

    /// Lift coefficient that balances `weight` (N) at the given density and speed.
    pub fn lift_coefficient(&self, weight: f64, air_density: f64, velocity: f64) -> f64 {
        2.0 * weight / (air_density * velocity.max(VELOCITY_FLOOR).powi(2) * self.wing_area)
    }

    pub fn drag_coefficient(&self, lift_coefficient: f64) -> f64 {
        self.zero_lift_drag + lift_coefficient.powi(2) / self.induced_drag_factor()
    }

    pub fn calculate_drag(&self, air_density: f64, velocity: f64, drag_coefficient: f64) -> f64 {
        self.calculate_dynamic_pressure(air_density, velocity) * self.wing_area * drag_coefficient
    }

    /// Coefficients and drag force for level lift equal to `weight`.
    pub fn evaluate(&self, weight: f64, air_density: f64, velocity: f64) -> AeroForces {
        let lift_coefficient = self.lift_coefficient(weight, air_density, velocity);
        let drag_coefficient = self.drag_coefficient(lift_coefficient);
        AeroForces {
            lift_coefficient,
            drag_coefficient,
            drag: self.calculate_drag(air_density, velocity, drag_coefficient),
        }
    }

    fn calculate_dynamic_pressure(&self, air_density: f64, velocity: f64) -> f64 {
        0.5 * air_density * velocity.powi(2)
    }

    fn induced_drag_factor(&self) -> f64 {
        PI * self.aspect_ratio * self.oswald_efficiency
    }
}

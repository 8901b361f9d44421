//! Physical constants of the double pendulum.

use crate::config::ConfigError;

/// Masses, arm lengths, and gravitational acceleration.
///
/// Immutable once constructed and shared read-only by every component that
/// evaluates dynamics. Validation happens at construction so the derivative
/// denominators are guaranteed positive everywhere downstream: for
/// `m1, m2 > 0` the Lagrangian denominator
/// `l * (m1 - m2*cos(Δ)² + m2) = l * (m1 + m2*sin(Δ)²) >= l * m1 > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    /// Mass of the inner bob (kg).
    pub m1: f64,
    /// Mass of the outer bob (kg).
    pub m2: f64,
    /// Length of the inner arm (m).
    pub l1: f64,
    /// Length of the outer arm (m).
    pub l2: f64,
    /// Gravitational acceleration (m/s²).
    pub g: f64,
}

impl Params {
    /// Create a validated parameter set.
    ///
    /// All five values must be positive and finite.
    pub fn new(m1: f64, m2: f64, l1: f64, l2: f64, g: f64) -> Result<Self, ConfigError> {
        for (name, value) in [("m1", m1), ("m2", m2), ("l1", l1), ("l2", l2), ("g", g)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        Ok(Self { m1, m2, l1, l2, g })
    }
}

impl Default for Params {
    /// Unit masses and arms, g = 9.81 m/s².
    fn default() -> Self {
        Self {
            m1: 1.0,
            m2: 1.0,
            l1: 1.0,
            l2: 1.0,
            g: 9.81,
        }
    }
}

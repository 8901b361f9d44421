//! Recognized simulation configuration options.
//!
//! The engine exposes exactly two dynamics formulations and three integrator
//! methods. Selection happens by name (typically from a CLI or config file
//! owned by the caller) and unrecognized names are configuration errors,
//! reported before any integration is attempted.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Which set of equations of motion drives the simulation.
///
/// The two formulations describe the same physical system but use different
/// state coordinates:
///
/// - `Lagrangian`: state is `[theta1, theta2, omega1, omega2]`
///   (angles and angular velocities)
/// - `Hamiltonian`: state is `[theta1, theta2, p1, p2]`
///   (angles and generalized momenta)
///
/// States produced under one formulation are **not** interchangeable with the
/// other; every [`Trajectory`](crate::trajectory::Trajectory) records the
/// formulation that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formulation {
    /// Angle / angular-velocity state.
    Lagrangian,
    /// Angle / generalized-momentum state.
    Hamiltonian,
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formulation::Lagrangian => write!(f, "lagrangian"),
            Formulation::Hamiltonian => write!(f, "hamiltonian"),
        }
    }
}

impl FromStr for Formulation {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "lagrangian" | "Lagrangian" => Ok(Formulation::Lagrangian),
            "hamiltonian" | "Hamiltonian" => Ok(Formulation::Hamiltonian),
            other => Err(ConfigError::UnknownFormulation {
                name: other.to_string(),
            }),
        }
    }
}

/// Which integrator advances the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Classical 4th-order Runge-Kutta at a fixed step per output interval.
    FixedRk4,
    /// Dormand-Prince 5(4) embedded pair with adaptive step control.
    AdaptiveOrder5,
    /// Fehlberg 7(8) embedded pair, for long-horizon accuracy.
    AdaptiveOrder8,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::FixedRk4 => write!(f, "fixed-rk4"),
            Method::AdaptiveOrder5 => write!(f, "adaptive-order5"),
            Method::AdaptiveOrder8 => write!(f, "adaptive-order8"),
        }
    }
}

impl FromStr for Method {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "fixed-rk4" => Ok(Method::FixedRk4),
            "adaptive-order5" => Ok(Method::AdaptiveOrder5),
            "adaptive-order8" => Ok(Method::AdaptiveOrder8),
            other => Err(ConfigError::UnknownMethod {
                name: other.to_string(),
            }),
        }
    }
}

/// Configuration errors, surfaced before any integration and never retried.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    /// The requested dynamics formulation is not one of the recognized names.
    #[error("unknown dynamics formulation {name:?} (expected \"lagrangian\" or \"hamiltonian\")")]
    UnknownFormulation {
        /// The unrecognized selection.
        name: String,
    },
    /// The requested integrator method is not one of the recognized names.
    #[error(
        "unknown integrator method {name:?} (expected \"fixed-rk4\", \"adaptive-order5\", or \"adaptive-order8\")"
    )]
    UnknownMethod {
        /// The unrecognized selection.
        name: String,
    },
    /// A physical parameter was zero, negative, or non-finite.
    #[error("invalid parameter {name}: {value} (must be positive and finite)")]
    InvalidParameter {
        /// Which parameter failed validation.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },
}

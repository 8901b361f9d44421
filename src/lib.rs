//! # dpend: Planar Double-Pendulum Simulation
//!
//! A deterministic simulation engine for the planar double pendulum, the
//! textbook example of a low-dimensional chaotic system.
//!
//! ## Features
//!
//! - Two interchangeable dynamics formulations: Lagrangian (angular
//!   velocities) and Hamiltonian (canonical momenta), both conserving the
//!   same mechanical energy
//! - Fixed-step classical RK4 for animation-style stepping
//! - Adaptive embedded Runge-Kutta pairs: Dormand-Prince 5(4) and
//!   Fehlberg 7(8) (NASA TR R-287), sampled onto a caller grid at full accuracy
//! - Chaos diagnostics: Poincaré sections and Lyapunov-exponent estimates,
//!   with a rayon-parallel sweep over initial conditions
//!
//! ## Basic Usage
//!
//! ```rust
//! use dpend::config::{Formulation, Method};
//! use dpend::model::Model;
//! use dpend::params::Params;
//! use dpend::simulate::{linspace, simulate};
//! use dpend::solver::Tolerances;
//!
//! let model = Model::new(Formulation::Hamiltonian, Params::default());
//! let y0 = [1.0, 0.5, 0.0, 0.0]; // [θ1, θ2, p1, p2]
//!
//! let t_eval = linspace(0.0, 10.0, 1001);
//! let traj = simulate(
//!     &model,
//!     y0,
//!     (0.0, 10.0),
//!     &t_eval,
//!     Method::AdaptiveOrder8,
//!     &Tolerances::new(1e-10, 1e-10),
//! )
//! .unwrap();
//!
//! // Mechanical energy is conserved up to integration error
//! assert!(traj.max_energy_drift().unwrap() < 1e-7);
//! ```
//!
//! ## Formulations
//!
//! Both formulations share the angle components `[θ1, θ2]` but differ in
//! the last two state components: the Lagrangian form evolves angular
//! velocities `[ω1, ω2]`, the Hamiltonian form canonical momenta
//! `[p1, p2]`. [`model::Model::momenta_from_velocities`] converts between
//! them, so the same physical initial condition can be fed to either.
//!
//! ## Tolerance Selection
//!
//! For adaptive runs, `atol = rtol = 1e-9` keeps the energy drift of a
//! moderate-energy run below `1e-6` over tens of seconds; `1e-12` with the
//! 7(8) pair approaches round-off. Chaotic runs diverge from the true
//! trajectory regardless of tolerance — tighter tolerances delay, never
//! prevent, the divergence, which is exactly what the Lyapunov diagnostic
//! measures.
//!
//! ## References
//!
//! 1. Fehlberg, E. (1968). "Classical Fifth-, Sixth-, Seventh-, and
//!    Eighth-Order Runge-Kutta Formulas with Stepsize Control".
//!    NASA TR R-287.
//!
//! 2. Dormand, J.R. & Prince, P.J. (1980). "A family of embedded
//!    Runge-Kutta formulae". J. Comput. Appl. Math. 6(1).
//!
//! 3. Hairer, E., Nørsett, S.P., & Wanner, G. (1993). "Solving
//!    Ordinary Differential Equations I: Nonstiff Problems". Springer.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod coefficients;
pub mod config;
pub mod diagnostics;
pub mod fixed;
pub mod model;
pub mod params;
pub mod simulate;
pub mod solver;
pub mod trajectory;

pub use config::{ConfigError, Formulation, Method};
pub use diagnostics::{
    lyapunov_exponent, lyapunov_sweep, perturbed_state, poincare_section, DiagnosticError,
    LyapunovEstimate, SectionPoint, SectionPolicy, SeparationMetric, SweepError,
    DEFAULT_PERTURBATION,
};
pub use model::{Model, State};
pub use params::Params;
pub use simulate::{linspace, simulate, SimulationFailure};
pub use solver::{
    EmbeddedRk, Failed, OdeSystem, Solution, SolverError, Stats, StepController, StepResult,
    Tolerances,
};
pub use trajectory::{Energy, Sample, Trajectory};

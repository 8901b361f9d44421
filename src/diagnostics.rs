//! Chaos diagnostics: Poincaré sections and Lyapunov-exponent estimation.
//!
//! Both diagnostics are post-processing passes over trajectories: they never
//! re-integrate. A Poincaré section reduces a trajectory to the discrete set
//! of (θ1, third component) pairs where a sampling condition fires, turning
//! quasi-periodic motion into closed curves and chaotic motion into scattered
//! clouds. The Lyapunov estimate compares a reference trajectory against a
//! perturbed twin and measures the mean exponential separation rate:
//! positive means nearby states diverge (chaos), non-positive means they
//! stay together (regular motion).

use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::config::Method;
use crate::model::{Model, State};
use crate::simulate::{simulate, SimulationFailure};
use crate::solver::Tolerances;
use crate::trajectory::Trajectory;

/// Default perturbation applied to a state component for twin runs.
pub const DEFAULT_PERTURBATION: f64 = 1e-8;

/// Default time tolerance for the fixed-interval section test.
pub const DEFAULT_SECTION_TOL: f64 = 1e-3;

/// How section points are selected from a trajectory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionPolicy {
    /// Take the sample whenever `t` is within `tol` of a multiple of
    /// `interval`. Ties the section to the sampling grid, so it is only as
    /// sharp as the grid spacing. The first sample counts: a grid starting
    /// at `t = 0` contributes a strobe there.
    FixedInterval {
        /// Strobe period.
        interval: f64,
        /// Absolute time tolerance for the multiple test.
        tol: f64,
    },
    /// Take the sample where θ1 crosses zero from below
    /// (`θ1[i-1] < 0` and `θ1[i] >= 0`). Every adjacent sample pair is
    /// examined, so a crossing completed at the final sample is emitted.
    ZeroCrossing,
}

impl SectionPolicy {
    /// Fixed-interval strobing with the default time tolerance.
    pub fn fixed_interval(interval: f64) -> Self {
        SectionPolicy::FixedInterval {
            interval,
            tol: DEFAULT_SECTION_TOL,
        }
    }
}

/// One point of a Poincaré section: (θ1, third state component).
///
/// The second coordinate is ω1 for Lagrangian trajectories and p1 for
/// Hamiltonian ones; the trajectory's formulation tag says which.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectionPoint {
    /// Inner-arm angle θ1 at the section.
    pub angle: f64,
    /// Conjugate coordinate: ω1 or p1 depending on the formulation.
    pub momentum: f64,
}

/// How the separation between twin trajectories is measured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeparationMetric {
    /// |θ1_perturbed − θ1_reference|, the observable the plots use.
    Theta1,
    /// Euclidean norm over the full state vector.
    StateNorm,
}

/// Result of a Lyapunov estimation over a trajectory pair.
#[derive(Debug, Clone)]
pub struct LyapunovEstimate {
    /// Mean exponential separation rate (1/time units).
    pub exponent: f64,
    /// Separation at each shared sample time, for plotting.
    pub separations: Vec<f64>,
}

/// Preconditions a diagnostic found violated.
#[derive(Debug, Clone, Error)]
pub enum DiagnosticError {
    /// The trajectory holds no samples.
    #[error("trajectory is empty")]
    EmptyTrajectory,
    /// The strobe interval is not positive and finite.
    #[error("section interval {interval} must be positive and finite")]
    InvalidInterval {
        /// The offending interval.
        interval: f64,
    },
    /// The two trajectories are not sampled on the same time grid.
    #[error("trajectories are sampled on different time grids")]
    MismatchedSampling,
    /// The two trajectories use different formulations.
    #[error("trajectories use different formulations")]
    FormulationMismatch,
    /// The initial separation is zero, so no ratio can be formed.
    #[error("initial separation is zero; perturb the initial state")]
    ZeroInitialSeparation,
    /// A later separation collapsed to zero or below.
    #[error("separation vanished at sample {index}")]
    NonPositiveSeparation {
        /// Index of the offending sample.
        index: usize,
    },
}

/// Extract a Poincaré section from a trajectory.
///
/// Returns the section points in time order. An empty result is valid (the
/// condition simply never fired); an empty input trajectory is not.
pub fn poincare_section(
    traj: &Trajectory,
    policy: SectionPolicy,
) -> Result<Vec<SectionPoint>, DiagnosticError> {
    if traj.is_empty() {
        return Err(DiagnosticError::EmptyTrajectory);
    }

    let points: Vec<SectionPoint> = match policy {
        SectionPolicy::FixedInterval { interval, tol } => {
            if !interval.is_finite() || interval <= 0.0 {
                return Err(DiagnosticError::InvalidInterval { interval });
            }
            traj.iter()
                .filter(|s| {
                    let r = s.t.rem_euclid(interval);
                    r <= tol || interval - r <= tol
                })
                .map(|s| SectionPoint {
                    angle: s.state[0],
                    momentum: s.state[2],
                })
                .collect()
        }
        SectionPolicy::ZeroCrossing => {
            let samples = traj.samples();
            samples
                .windows(2)
                .filter(|w| w[0].state[0] < 0.0 && w[1].state[0] >= 0.0)
                .map(|w| SectionPoint {
                    angle: w[1].state[0],
                    momentum: w[1].state[2],
                })
                .collect()
        }
    };

    debug!(points = points.len(), samples = traj.len(), "section extracted");
    Ok(points)
}

/// Copy `y` with `delta` added to component `index`.
pub fn perturbed_state(y: &State, index: usize, delta: f64) -> State {
    let mut p = *y;
    p[index] += delta;
    p
}

/// Estimate the largest Lyapunov exponent from a trajectory pair.
///
/// The two trajectories must share the formulation and the exact sample
/// grid. The estimate is the mean of `ln(sep(tᵢ)/sep(t₀))` over all
/// samples (the t₀ term contributing zero), divided by the elapsed time —
/// a positive value means the twins separate exponentially.
pub fn lyapunov_exponent(
    reference: &Trajectory,
    perturbed: &Trajectory,
    metric: SeparationMetric,
) -> Result<LyapunovEstimate, DiagnosticError> {
    if reference.is_empty() || perturbed.is_empty() {
        return Err(DiagnosticError::EmptyTrajectory);
    }
    if reference.formulation() != perturbed.formulation() {
        return Err(DiagnosticError::FormulationMismatch);
    }
    if reference.len() != perturbed.len()
        || reference
            .iter()
            .zip(perturbed.iter())
            .any(|(a, b)| a.t != b.t)
    {
        return Err(DiagnosticError::MismatchedSampling);
    }

    let separations: Vec<f64> = reference
        .iter()
        .zip(perturbed.iter())
        .map(|(a, b)| match metric {
            SeparationMetric::Theta1 => (b.state[0] - a.state[0]).abs(),
            SeparationMetric::StateNorm => a
                .state
                .iter()
                .zip(b.state.iter())
                .map(|(x, y)| (y - x) * (y - x))
                .sum::<f64>()
                .sqrt(),
        })
        .collect();

    let sep0 = separations[0];
    if sep0 <= 0.0 {
        return Err(DiagnosticError::ZeroInitialSeparation);
    }
    for (i, &s) in separations.iter().enumerate().skip(1) {
        if s <= 0.0 {
            return Err(DiagnosticError::NonPositiveSeparation { index: i });
        }
    }

    let samples = reference.samples();
    let t0 = samples[0].t;
    let t_end = samples[samples.len() - 1].t;
    if samples.len() < 2 || t_end <= t0 {
        return Err(DiagnosticError::MismatchedSampling);
    }

    // The t0 term contributes ln(1) = 0 but still counts toward the mean
    let mean_log: f64 = separations
        .iter()
        .map(|&s| (s / sep0).ln())
        .sum::<f64>()
        / separations.len() as f64;
    let exponent = mean_log / (t_end - t0);

    debug!(exponent, samples = separations.len(), "lyapunov estimated");
    Ok(LyapunovEstimate {
        exponent,
        separations,
    })
}

/// A run of a Lyapunov sweep that could not produce an estimate.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The reference or twin simulation failed.
    #[error(transparent)]
    Simulation(#[from] SimulationFailure),
    /// The estimate preconditions were violated.
    #[error(transparent)]
    Diagnostic(#[from] DiagnosticError),
}

/// Estimate Lyapunov exponents for many initial states in parallel.
///
/// For each initial state this runs a reference simulation and a twin with
/// θ1 perturbed by [`DEFAULT_PERTURBATION`], then forms the estimate with
/// the θ1 separation metric. Per-state results come back in input order;
/// one failed state does not abort the rest.
pub fn lyapunov_sweep(
    model: &Model,
    initial_states: &[State],
    t_span: (f64, f64),
    t_eval: &[f64],
    method: Method,
    tol: &Tolerances<4>,
) -> Vec<Result<LyapunovEstimate, SweepError>> {
    initial_states
        .par_iter()
        .map(|&y0| -> Result<LyapunovEstimate, SweepError> {
            let reference = simulate(model, y0, t_span, t_eval, method, tol)?;
            let twin = simulate(
                model,
                perturbed_state(&y0, 0, DEFAULT_PERTURBATION),
                t_span,
                t_eval,
                method,
                tol,
            )?;
            Ok(lyapunov_exponent(&reference, &twin, SeparationMetric::Theta1)?)
        })
        .collect()
}

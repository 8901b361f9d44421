//! Simulation driver: one entry point over all formulations and methods.
//!
//! [`simulate`] takes a [`Model`], an initial state, a time span, and an
//! output grid, dispatches on the requested [`Method`], and returns a
//! [`Trajectory`] with per-sample energy attached. The fixed-step path takes
//! exactly one RK4 step per output interval (the animation-loop convention);
//! the adaptive paths run the embedded-pair solver and resample onto the
//! grid. A failed adaptive run comes back as a [`SimulationFailure`] that
//! still carries the trajectory up to the last reached time.

use thiserror::Error;
use tracing::debug;

use crate::coefficients::{DOPRI5, FEHLBERG78};
use crate::config::Method;
use crate::model::{Model, State};
use crate::solver::{EmbeddedRk, SolverError, Tolerances};
use crate::trajectory::{Sample, Trajectory};

/// A failed run and the trajectory reached before the failure.
#[derive(Debug, Error)]
#[error("{error} ({} samples produced before failure)", .partial.len())]
pub struct SimulationFailure {
    /// The underlying integration error.
    #[source]
    pub error: SolverError,
    /// Trajectory truncated at the last successfully produced sample.
    pub partial: Trajectory,
}

/// `n` evenly spaced points from `a` to `b` inclusive.
///
/// The endpoints are exact; interior points are computed from the index to
/// avoid accumulated summation error.
pub fn linspace(a: f64, b: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![a],
        _ => (0..n)
            .map(|i| {
                if i == n - 1 {
                    b
                } else {
                    a + (b - a) * i as f64 / (n - 1) as f64
                }
            })
            .collect(),
    }
}

/// Run a simulation and sample it on `t_eval`.
///
/// # Arguments
/// * `model` - Formulation plus physical parameters
/// * `y0` - Initial state in the model's state layout
/// * `t_span` - Integration span `(t0, tf)` with `tf > t0`
/// * `t_eval` - Output times, strictly increasing, inside the span
/// * `method` - Integration method to dispatch on
/// * `tol` - Error tolerances (ignored by the fixed-step method)
///
/// The fixed-step method advances with one RK4 step per consecutive
/// `t_eval` interval, so the grid spacing IS the step size. A non-finite
/// state under fixed stepping propagates through the remaining samples
/// rather than aborting; adaptive methods stop and report instead.
pub fn simulate(
    model: &Model,
    y0: State,
    t_span: (f64, f64),
    t_eval: &[f64],
    method: Method,
    tol: &Tolerances<4>,
) -> Result<Trajectory, SimulationFailure> {
    let (t0, tf) = t_span;
    validate_span(t0, tf, y0)
        .and_then(|()| crate::solver::validate_grid(t0, tf, t_eval))
        .map_err(|error| SimulationFailure {
            error,
            partial: Trajectory::new(model.formulation()),
        })?;

    debug!(
        formulation = %model.formulation(),
        method = %method,
        t0,
        tf,
        points = t_eval.len(),
        "simulation started"
    );

    match method {
        Method::FixedRk4 => Ok(run_fixed(model, y0, t0, t_eval)),
        Method::AdaptiveOrder5 => run_adaptive(model, y0, t0, tf, t_eval, &DOPRI5, tol),
        Method::AdaptiveOrder8 => run_adaptive(model, y0, t0, tf, t_eval, &FEHLBERG78, tol),
    }
}

fn validate_span(t0: f64, tf: f64, y0: State) -> Result<(), SolverError> {
    if !t0.is_finite() || !tf.is_finite() || tf <= t0 {
        return Err(SolverError::InvalidInput {
            message: format!("t_span ({}, {}) must be finite with tf > t0", t0, tf),
        });
    }
    for (i, &v) in y0.iter().enumerate() {
        if !v.is_finite() {
            return Err(SolverError::InvalidInput {
                message: format!("y0[{}] is not finite", i),
            });
        }
    }
    Ok(())
}

/// One RK4 step per output interval, dt set by the grid spacing.
fn run_fixed(model: &Model, y0: State, t0: f64, t_eval: &[f64]) -> Trajectory {
    let mut traj = Trajectory::with_capacity(model.formulation(), t_eval.len());

    let mut t = t0;
    let mut y = y0;
    for &te in t_eval {
        if te > t {
            y = crate::fixed::step(model, t, &y, te - t);
            t = te;
        }
        traj.push(Sample {
            t: te,
            state: y,
            energy: model.energy(&y),
        });
    }
    traj
}

fn run_adaptive(
    model: &Model,
    y0: State,
    t0: f64,
    tf: f64,
    t_eval: &[f64],
    tableau: &'static crate::coefficients::Tableau,
    tol: &Tolerances<4>,
) -> Result<Trajectory, SimulationFailure> {
    let mut solver = EmbeddedRk::new(tableau, tol.clone());
    let h0 = (tf - t0) / 100.0;

    let to_trajectory = |t: &[f64], y: &[State]| {
        let mut traj = Trajectory::with_capacity(model.formulation(), t.len());
        for (&te, state) in t.iter().zip(y) {
            traj.push(Sample {
                t: te,
                state: *state,
                energy: model.energy(state),
            });
        }
        traj
    };

    match solver.solve(model, t0, &y0, tf, t_eval, h0) {
        Ok(sol) => Ok(to_trajectory(&sol.t, &sol.y)),
        Err(failed) => Err(SimulationFailure {
            error: failed.error,
            partial: to_trajectory(&failed.partial.t, &failed.partial.y),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Formulation;
    use crate::params::Params;

    fn small_swing() -> State {
        [5.0_f64.to_radians(), 0.0, 0.0, 0.0]
    }

    #[test]
    fn test_linspace() {
        let g = linspace(0.0, 1.0, 5);
        assert_eq!(g, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(0.0, 1.0, 1), vec![0.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());

        // Endpoints exact even when the spacing is not representable
        let g = linspace(0.0, 0.3, 4);
        assert_eq!(g[0], 0.0);
        assert_eq!(g[3], 0.3);
    }

    #[test]
    fn test_fixed_and_adaptive_agree_on_regular_motion() {
        let model = Model::new(Formulation::Lagrangian, Params::default());
        let t_eval = linspace(0.0, 2.0, 2001);
        let tol = Tolerances::new(1e-10, 1e-10);

        let fixed = simulate(
            &model,
            small_swing(),
            (0.0, 2.0),
            &t_eval,
            Method::FixedRk4,
            &tol,
        )
        .unwrap();
        let adaptive = simulate(
            &model,
            small_swing(),
            (0.0, 2.0),
            &t_eval,
            Method::AdaptiveOrder5,
            &tol,
        )
        .unwrap();

        assert_eq!(fixed.len(), adaptive.len());
        let a = fixed.last().unwrap().state[0];
        let b = adaptive.last().unwrap().state[0];
        assert!((a - b).abs() < 1e-6, "θ1 endpoint mismatch: {} vs {}", a, b);
    }

    #[test]
    fn test_energy_attached_and_conserved() {
        let model = Model::new(Formulation::Hamiltonian, Params::default());
        let t_eval = linspace(0.0, 5.0, 501);
        let tol = Tolerances::new(1e-11, 1e-11);

        let traj = simulate(
            &model,
            small_swing(),
            (0.0, 5.0),
            &t_eval,
            Method::AdaptiveOrder8,
            &tol,
        )
        .unwrap();

        assert_eq!(traj.len(), t_eval.len());
        let drift = traj.max_energy_drift().unwrap();
        assert!(drift < 1e-8, "energy drift {} too large", drift);
    }

    #[test]
    fn test_invalid_span_rejected() {
        let model = Model::new(Formulation::Lagrangian, Params::default());
        let tol = Tolerances::new(1e-9, 1e-9);

        let err = simulate(
            &model,
            small_swing(),
            (1.0, 1.0),
            &[1.0],
            Method::FixedRk4,
            &tol,
        )
        .unwrap_err();
        assert!(matches!(err.error, SolverError::InvalidInput { .. }));
        assert!(err.partial.is_empty());
    }

    #[test]
    fn test_fixed_step_matches_manual_loop() {
        // One RK4 step per interval: the grid spacing is the step size
        let model = Model::new(Formulation::Lagrangian, Params::default());
        let t_eval = linspace(0.0, 0.1, 5);
        let tol = Tolerances::new(1e-9, 1e-9);

        let traj = simulate(
            &model,
            small_swing(),
            (0.0, 0.1),
            &t_eval,
            Method::FixedRk4,
            &tol,
        )
        .unwrap();

        let mut y = small_swing();
        for i in 1..t_eval.len() {
            y = crate::fixed::step(&model, t_eval[i - 1], &y, t_eval[i] - t_eval[i - 1]);
        }
        assert_eq!(traj.last().unwrap().state, y);
    }
}

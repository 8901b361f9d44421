//! Adaptive embedded-pair Runge-Kutta integration.
//!
//! One stepper drives both supported pairs ([`DOPRI5`] and [`FEHLBERG78`]):
//! it evaluates the stages of the selected tableau, forms the propagating
//! solution, estimates the local truncation error from the embedded solution,
//! and adjusts the step size with an I-controller to keep the scaled error at
//! or below 1.
//!
//! [`EmbeddedRk::solve`] additionally samples the solution onto a
//! caller-supplied output grid (`t_eval`) by capping each step at the next
//! requested output time, so every emitted state is an accepted step
//! endpoint and carries the same local error control as the integration
//! itself. When step-size control cannot make progress above the
//! minimum-step floor, the run fails with the partial solution truncated at
//! the last reached time; nothing is dropped silently.
//!
//! [`DOPRI5`]: crate::coefficients::DOPRI5
//! [`FEHLBERG78`]: crate::coefficients::FEHLBERG78

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::coefficients::Tableau;

/// System of ordinary differential equations: dy/dt = f(t, y)
pub trait OdeSystem<const N: usize> {
    /// Evaluate the right-hand side of the ODE system.
    ///
    /// # Arguments
    /// * `t` - Current time
    /// * `y` - Current state vector
    /// * `dydt` - Output: derivative dy/dt
    fn rhs(&self, t: f64, y: &[f64; N], dydt: &mut [f64; N]);
}

/// Integration result from a single step
#[derive(Debug, Clone)]
pub struct StepResult<const N: usize> {
    /// New state after the step (propagating-order solution)
    pub y: [f64; N],
    /// New time value
    pub t: f64,
    /// Normalized error estimate (should be ≤ 1.0 for acceptance)
    pub error: f64,
    /// Suggested step size for next step
    pub h_next: f64,
    /// Whether the step was accepted
    pub accepted: bool,
}

/// Integration statistics for diagnostics
#[derive(Debug, Clone, Default)]
pub struct Stats {
    /// Total number of function evaluations
    pub fn_evals: u64,
    /// Number of accepted steps
    pub accepted_steps: u64,
    /// Number of rejected steps
    pub rejected_steps: u64,
}

/// Step-size controller using an I-controller
///
/// h_new = safety * h * error^(-1/(p+1))
/// where p is the order of the embedded error estimate.
#[derive(Clone)]
pub struct StepController {
    /// Safety factor (0.8-0.9 typical)
    pub safety: f64,
    /// Maximum growth factor per step
    pub max_factor: f64,
    /// Minimum reduction factor per step
    pub min_factor: f64,
    /// Exponent 1/(p + 1) for the I-controller
    exponent: f64,
}

impl StepController {
    /// Controller tuned to an embedded error estimate of order `p`.
    pub fn for_embedded_order(p: u8) -> Self {
        Self {
            safety: 0.9,
            max_factor: 5.0,
            min_factor: 0.2,
            exponent: 1.0 / (f64::from(p) + 1.0),
        }
    }

    /// Compute the step size adjustment factor
    pub fn compute_factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }

        let factor = self.safety * error.powf(-self.exponent);
        factor.clamp(self.min_factor, self.max_factor)
    }
}

/// Tolerance specification for error control
///
/// Error is computed as: |y_high - y_low| / (atol + rtol * |y_high|)
#[derive(Debug, Clone)]
pub struct Tolerances<const N: usize> {
    /// Absolute tolerance per component
    pub atol: [f64; N],
    /// Relative tolerance per component
    pub rtol: [f64; N],
}

impl<const N: usize> Tolerances<N> {
    /// Create tolerances with uniform values
    pub fn new(atol: f64, rtol: f64) -> Self {
        Self {
            atol: [atol; N],
            rtol: [rtol; N],
        }
    }

    /// Create tolerances with per-component values
    pub fn with_components(atol: [f64; N], rtol: [f64; N]) -> Self {
        Self { atol, rtol }
    }
}

/// Dense integration output: states at the requested `t_eval` points.
#[derive(Debug, Clone, Default)]
pub struct Solution<const N: usize> {
    /// Output times (a prefix of the requested grid on failure).
    pub t: Vec<f64>,
    /// State at each output time.
    pub y: Vec<[f64; N]>,
    /// Work counters for the run.
    pub stats: Stats,
}

/// Errors that can occur during integration
#[derive(Debug, Clone, Error)]
pub enum SolverError {
    /// Invalid input parameters
    #[error("invalid input: {message}")]
    InvalidInput {
        /// Description of the invalid input
        message: String,
    },
    /// Step-size control hit the minimum-step floor without meeting tolerance
    #[error("tolerance not met: step size {h:.3e} at the floor at t = {t}")]
    ToleranceFloor {
        /// Last successfully reached time
        t: f64,
        /// Step size at the floor
        h: f64,
    },
    /// Maximum number of steps exceeded
    #[error("maximum number of integration steps exceeded at t = {t}")]
    MaxStepsExceeded {
        /// Last successfully reached time
        t: f64,
    },
    /// Non-finite state detected during integration
    #[error("non-finite state detected at t = {t}")]
    NonFiniteState {
        /// Time at which the non-finite state was detected
        t: f64,
    },
}

/// A failed run together with the partial solution reached before failure.
///
/// The partial solution holds every `t_eval` point up to the last
/// successfully reached time, so callers can still inspect how the
/// trajectory evolved before the failure.
#[derive(Debug)]
pub struct Failed<const N: usize> {
    /// What went wrong.
    pub error: SolverError,
    /// Output truncated at the last successfully reached time.
    pub partial: Solution<N>,
}

impl<const N: usize> std::fmt::Display for Failed<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} of the requested output points reached)",
            self.error,
            self.partial.t.len()
        )
    }
}

impl<const N: usize> std::error::Error for Failed<N> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Adaptive embedded-pair Runge-Kutta integrator.
///
/// # Type Parameters
/// * `N` - Dimension of the state vector
///
/// # Example
/// ```
/// use dpend::coefficients::DOPRI5;
/// use dpend::solver::{EmbeddedRk, OdeSystem, Tolerances};
///
/// struct HarmonicOscillator { omega: f64 }
///
/// impl OdeSystem<2> for HarmonicOscillator {
///     fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
///         dydt[0] = y[1];
///         dydt[1] = -self.omega * self.omega * y[0];
///     }
/// }
///
/// let sys = HarmonicOscillator { omega: 1.0 };
/// let mut solver = EmbeddedRk::new(&DOPRI5, Tolerances::new(1e-10, 1e-10));
/// let (tf, yf) = solver.integrate(&sys, 0.0, &[1.0, 0.0], 10.0, 0.1).unwrap();
/// assert!((yf[0] - tf.cos()).abs() < 1e-8);
/// ```
#[derive(Clone)]
pub struct EmbeddedRk<const N: usize> {
    /// The embedded pair in use
    tableau: &'static Tableau,
    /// Tolerance specification
    tol: Tolerances<N>,
    /// Step-size controller
    controller: StepController,
    /// Minimum step size
    pub h_min: f64,
    /// Maximum step size
    pub h_max: f64,
    /// Maximum number of integration steps before error
    pub max_steps: u64,
    /// Stage evaluations (pre-allocated workspace)
    k: Vec<[f64; N]>,
    /// Integration statistics
    pub stats: Stats,
}

impl<const N: usize> EmbeddedRk<N> {
    /// Create a solver for the given embedded pair and tolerances.
    pub fn new(tableau: &'static Tableau, tol: Tolerances<N>) -> Self {
        Self {
            tableau,
            tol,
            controller: StepController::for_embedded_order(tableau.embedded_order),
            h_min: 1e-14,
            h_max: f64::INFINITY,
            max_steps: 10_000_000,
            k: vec![[0.0; N]; tableau.stages],
            stats: Stats::default(),
        }
    }

    /// Set minimum and maximum step sizes
    pub fn set_step_limits(&mut self, h_min: f64, h_max: f64) {
        self.h_min = h_min;
        self.h_max = h_max;
    }

    /// The embedded pair this solver advances with.
    pub fn tableau(&self) -> &'static Tableau {
        self.tableau
    }

    /// Reset statistics
    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    /// Perform a single integration step
    ///
    /// Computes the stages of the tableau, forms the propagating solution,
    /// estimates the error, and determines if the step should be accepted.
    pub fn step<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t: f64,
        y: &[f64; N],
        h: f64,
    ) -> StepResult<N> {
        let h = h.signum() * h.abs().clamp(self.h_min, self.h_max);

        self.compute_stages(sys, t, y, h);

        let y_new = self.compute_solution(y, h);

        // A NaN error estimate (diverging state) must reject the step, so
        // map it to infinity before the acceptance comparison.
        let mut error = self.compute_error(&y_new, h);
        if error.is_nan() {
            error = f64::INFINITY;
        }

        let accepted = error <= 1.0;

        let factor = self.controller.compute_factor(error);
        let h_next = (h.abs() * factor).clamp(self.h_min, self.h_max);

        self.stats.fn_evals += self.tableau.stages as u64;
        if accepted {
            self.stats.accepted_steps += 1;
        } else {
            self.stats.rejected_steps += 1;
            trace!(t, h, error, "step rejected");
        }

        StepResult {
            y: y_new,
            t: t + h,
            error,
            h_next,
            accepted,
        }
    }

    /// Integrate from t0 to tf, returning only the endpoint.
    ///
    /// # Arguments
    /// * `sys` - The ODE system to integrate
    /// * `t0` - Initial time
    /// * `y0` - Initial state
    /// * `tf` - Final time
    /// * `h0` - Initial step size guess
    ///
    /// # Returns
    /// * `Ok((t_final, y_final))` on success
    /// * `Err(SolverError)` on failure
    pub fn integrate<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<(f64, [f64; N]), SolverError> {
        if t0 == tf {
            return Ok((t0, *y0));
        }
        self.validate_inputs(t0, y0, tf, h0)?;

        let mut t = t0;
        let mut y = *y0;
        let mut h = h0;

        let direction = (tf - t0).signum();
        let mut step_count = 0u64;

        while (tf - t) * direction > self.h_min {
            // Don't overshoot the endpoint
            if (t + h - tf) * direction > 0.0 {
                h = tf - t;
            }

            let result = self.step(sys, t, &y, h);

            if result.accepted {
                t = result.t;
                y = result.y;
                if !y.iter().all(|v| v.is_finite()) {
                    return Err(SolverError::NonFiniteState { t });
                }
            }

            h = result.h_next * direction;

            step_count += 1;
            if step_count > self.max_steps {
                return Err(SolverError::MaxStepsExceeded { t });
            }

            // If the step was rejected and the next step size is already at
            // h_min, no further progress is possible
            if !result.accepted && result.h_next <= self.h_min && (tf - t) * direction > self.h_min
            {
                return Err(SolverError::ToleranceFloor {
                    t,
                    h: result.h_next,
                });
            }
        }

        Ok((t, y))
    }

    /// Integrate from `t0` to `tf` and sample onto `t_eval`.
    ///
    /// The error controller chooses the step sequence, but each step is
    /// additionally capped at the next requested output time, so every
    /// emitted state is an accepted step endpoint. Output accuracy is
    /// therefore the step tolerance itself, at the cost of at least one
    /// step per grid point on dense grids.
    ///
    /// `t_eval` must be strictly monotone in the integration direction and
    /// contained in the span between `t0` and `tf`.
    ///
    /// On failure the returned [`Failed`] carries the partial [`Solution`]
    /// truncated at the last successfully reached time.
    pub fn solve<S: OdeSystem<N>>(
        &mut self,
        sys: &S,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        t_eval: &[f64],
        h0: f64,
    ) -> Result<Solution<N>, Failed<N>> {
        let fail = |error: SolverError, partial: Solution<N>| Failed { error, partial };

        if let Err(e) = self
            .validate_inputs(t0, y0, tf, h0)
            .and_then(|()| validate_grid(t0, tf, t_eval))
        {
            return Err(fail(e, Solution::default()));
        }

        debug!(
            method = self.tableau.name,
            t0,
            tf,
            points = t_eval.len(),
            "adaptive integration started"
        );

        let mut out = Solution {
            t: Vec::with_capacity(t_eval.len()),
            y: Vec::with_capacity(t_eval.len()),
            stats: Stats::default(),
        };

        let direction = if tf >= t0 { 1.0 } else { -1.0 };
        let mut eval_idx = 0;

        // The grid may start at t0 itself
        if eval_idx < t_eval.len() && t_eval[eval_idx] == t0 {
            out.t.push(t0);
            out.y.push(*y0);
            eval_idx += 1;
        }

        let mut t = t0;
        let mut y = *y0;
        let mut h = h0;
        let mut step_count = 0u64;

        while eval_idx < t_eval.len() && (tf - t) * direction > self.h_min {
            // Cap the step at the next requested output time so that the
            // emitted state is the accepted step endpoint, not an
            // interpolant of lower order than the pair.
            let t_target = t_eval[eval_idx];
            if (t + h - t_target) * direction > 0.0 {
                h = t_target - t;
            }

            let result = self.step(sys, t, &y, h);

            if result.accepted {
                if !result.y.iter().all(|v| v.is_finite()) {
                    out.stats = self.stats.clone();
                    return Err(fail(SolverError::NonFiniteState { t: result.t }, out));
                }

                if (t_target - result.t) * direction <= 0.0 {
                    out.t.push(t_target);
                    out.y.push(result.y);
                    eval_idx += 1;
                }

                t = result.t;
                y = result.y;
            }

            h = result.h_next * direction;

            step_count += 1;
            if step_count > self.max_steps {
                out.stats = self.stats.clone();
                return Err(fail(SolverError::MaxStepsExceeded { t }, out));
            }

            if !result.accepted && result.h_next <= self.h_min && (tf - t) * direction > self.h_min
            {
                warn!(
                    method = self.tableau.name,
                    t,
                    h = result.h_next,
                    "step-size control hit the floor; truncating output"
                );
                out.stats = self.stats.clone();
                return Err(fail(
                    SolverError::ToleranceFloor {
                        t,
                        h: result.h_next,
                    },
                    out,
                ));
            }
        }

        // Grid points within h_min of the reached time are the endpoint
        while eval_idx < t_eval.len() && (t_eval[eval_idx] - t) * direction <= self.h_min {
            out.t.push(t_eval[eval_idx]);
            out.y.push(y);
            eval_idx += 1;
        }

        debug!(
            method = self.tableau.name,
            accepted = self.stats.accepted_steps,
            rejected = self.stats.rejected_steps,
            fn_evals = self.stats.fn_evals,
            "adaptive integration finished"
        );
        out.stats = self.stats.clone();
        Ok(out)
    }

    /// Compute all stages of the tableau
    #[allow(clippy::needless_range_loop)]
    fn compute_stages<S: OdeSystem<N>>(&mut self, sys: &S, t: f64, y: &[f64; N], h: f64) {
        let mut y_temp = [0.0; N];

        // Stage 0: k[0] = f(t, y)
        sys.rhs(t, y, &mut self.k[0]);

        for i in 1..self.tableau.stages {
            let a_row = self.tableau.a[i];
            // y_temp = y + h * sum_{j<i} a[i][j] * k[j]
            for n in 0..N {
                let mut sum = 0.0;
                for j in 0..i {
                    sum += a_row[j] * self.k[j][n];
                }
                y_temp[n] = y[n] + h * sum;
            }

            let (_, tail) = self.k.split_at_mut(i);
            sys.rhs(t + self.tableau.c[i] * h, &y_temp, &mut tail[0]);
        }
    }

    /// Combine the stages into the propagating-order solution
    #[allow(clippy::needless_range_loop)]
    fn compute_solution(&self, y: &[f64; N], h: f64) -> [f64; N] {
        let mut y_new = [0.0; N];

        for n in 0..N {
            let mut sum = 0.0;
            for i in 0..self.tableau.stages {
                sum += self.tableau.b[i] * self.k[i][n];
            }
            y_new[n] = y[n] + h * sum;
        }

        y_new
    }

    /// Compute the normalized error estimate
    ///
    /// Uses the infinity norm of the scaled error:
    /// error = max_n( |h * sum_i b_err[i] * k[i][n]| / scale[n] )
    /// where scale[n] = atol[n] + rtol[n] * |y_new[n]|
    #[allow(clippy::needless_range_loop)]
    fn compute_error(&self, y_new: &[f64; N], h: f64) -> f64 {
        let mut max_err: f64 = 0.0;

        for n in 0..N {
            let mut err_n = 0.0;
            for i in 0..self.tableau.stages {
                err_n += self.tableau.b_err[i] * self.k[i][n];
            }
            err_n *= h;

            let scale = self.tol.atol[n] + self.tol.rtol[n] * y_new[n].abs();
            let scaled_err = err_n.abs() / scale;

            max_err = max_err.max(scaled_err);
        }

        max_err
    }

    /// Validate integration inputs
    fn validate_inputs(
        &self,
        t0: f64,
        y0: &[f64; N],
        tf: f64,
        h0: f64,
    ) -> Result<(), SolverError> {
        if !t0.is_finite() || !tf.is_finite() || !h0.is_finite() {
            return Err(SolverError::InvalidInput {
                message: "t0, tf, and h0 must be finite".to_string(),
            });
        }
        if h0 == 0.0 {
            return Err(SolverError::InvalidInput {
                message: "h0 must be non-zero".to_string(),
            });
        }
        let direction = tf - t0;
        if direction != 0.0 && h0.signum() != direction.signum() {
            return Err(SolverError::InvalidInput {
                message: "h0 sign must match integration direction (tf - t0)".to_string(),
            });
        }
        for (i, &val) in y0.iter().enumerate() {
            if !val.is_finite() {
                return Err(SolverError::InvalidInput {
                    message: format!("y0[{}] is not finite", i),
                });
            }
        }
        for (i, (&a, &r)) in self.tol.atol.iter().zip(self.tol.rtol.iter()).enumerate() {
            if !a.is_finite() || a <= 0.0 {
                return Err(SolverError::InvalidInput {
                    message: format!("atol[{}] must be positive and finite", i),
                });
            }
            if !r.is_finite() || r < 0.0 {
                return Err(SolverError::InvalidInput {
                    message: format!("rtol[{}] must be non-negative and finite", i),
                });
            }
        }
        Ok(())
    }
}

/// Check that the output grid is monotone and inside the span.
pub(crate) fn validate_grid(t0: f64, tf: f64, t_eval: &[f64]) -> Result<(), SolverError> {
    let direction = if tf >= t0 { 1.0 } else { -1.0 };
    let lo = t0.min(tf);
    let hi = t0.max(tf);
    for (i, &te) in t_eval.iter().enumerate() {
        if !te.is_finite() || te < lo || te > hi {
            return Err(SolverError::InvalidInput {
                message: format!("t_eval[{}] = {} is outside the span [{}, {}]", i, te, lo, hi),
            });
        }
        if i > 0 && (te - t_eval[i - 1]) * direction <= 0.0 {
            return Err(SolverError::InvalidInput {
                message: format!("t_eval must be strictly monotone (violated at index {})", i),
            });
        }
    }
    Ok(())
}

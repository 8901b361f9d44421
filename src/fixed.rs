//! Classical fixed-step fourth-order Runge-Kutta.
//!
//! No error estimate and no step control: the caller picks `dt` and owns the
//! accuracy/cost trade. Useful as a baseline against the adaptive pairs and
//! for animation loops that want exactly one state per frame.

use crate::solver::OdeSystem;

/// Advance the state by one RK4 step of size `dt`.
///
/// Four slope evaluations combined with the 1/6, 2/6, 2/6, 1/6 weights.
/// Local truncation error is O(dt⁵); no acceptance test is applied, so a
/// diverging state simply propagates (check for finiteness at a level that
/// can report it).
pub fn step<S: OdeSystem<N>, const N: usize>(
    sys: &S,
    t: f64,
    y: &[f64; N],
    dt: f64,
) -> [f64; N] {
    let mut k1 = [0.0; N];
    let mut k2 = [0.0; N];
    let mut k3 = [0.0; N];
    let mut k4 = [0.0; N];
    let mut y_temp = [0.0; N];

    sys.rhs(t, y, &mut k1);

    for n in 0..N {
        y_temp[n] = y[n] + 0.5 * dt * k1[n];
    }
    sys.rhs(t + 0.5 * dt, &y_temp, &mut k2);

    for n in 0..N {
        y_temp[n] = y[n] + 0.5 * dt * k2[n];
    }
    sys.rhs(t + 0.5 * dt, &y_temp, &mut k3);

    for n in 0..N {
        y_temp[n] = y[n] + dt * k3[n];
    }
    sys.rhs(t + dt, &y_temp, &mut k4);

    let mut y_new = [0.0; N];
    for n in 0..N {
        y_new[n] = y[n] + dt / 6.0 * (k1[n] + 2.0 * k2[n] + 2.0 * k3[n] + k4[n]);
    }
    y_new
}

/// Integrate from `t0` to `tf` with `steps` equal RK4 steps, returning the
/// endpoint state.
pub fn propagate<S: OdeSystem<N>, const N: usize>(
    sys: &S,
    t0: f64,
    y0: &[f64; N],
    tf: f64,
    steps: usize,
) -> [f64; N] {
    let dt = (tf - t0) / steps as f64;
    let mut y = *y0;
    for i in 0..steps {
        let t = t0 + i as f64 * dt;
        y = step(sys, t, &y, dt);
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;

    struct HarmonicOscillator;

    impl OdeSystem<2> for HarmonicOscillator {
        fn rhs(&self, _t: f64, y: &[f64; 2], dydt: &mut [f64; 2]) {
            dydt[0] = y[1];
            dydt[1] = -y[0];
        }
    }

    #[test]
    fn test_harmonic_oscillator_period() {
        let tf = 2.0 * std::f64::consts::PI;
        let y = propagate(&HarmonicOscillator, 0.0, &[1.0, 0.0], tf, 10_000);
        assert!((y[0] - 1.0).abs() < 1e-10, "y(2π) = {}", y[0]);
        assert!(y[1].abs() < 1e-10, "y'(2π) = {}", y[1]);
    }

    #[test]
    fn test_fourth_order_convergence() {
        // Global error should drop by ~2^4 = 16 when dt halves
        let tf = 1.0_f64;
        let exact = tf.cos();

        let err = |steps: usize| {
            let y = propagate(&HarmonicOscillator, 0.0, &[1.0, 0.0], tf, steps);
            (y[0] - exact).abs()
        };

        let e1 = err(50);
        let e2 = err(100);
        let ratio = e1 / e2;
        assert!(
            ratio > 12.0 && ratio < 20.0,
            "convergence ratio {:.2} not ~16",
            ratio
        );
    }

    #[test]
    fn test_quadrature() {
        // y' = t² integrates exactly (RK4 is exact for polynomials up to t⁴)
        struct Quad;
        impl OdeSystem<1> for Quad {
            fn rhs(&self, t: f64, _y: &[f64; 1], dydt: &mut [f64; 1]) {
                dydt[0] = t * t;
            }
        }

        let y = step(&Quad, 0.0, &[0.0], 3.0);
        assert!((y[0] - 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_nan_propagates() {
        let y = step(&HarmonicOscillator, 0.0, &[f64::NAN, 0.0], 0.1);
        assert!(y[0].is_nan());
        assert!(y[1].is_nan());
    }
}

//! Butcher tableaux for the embedded Runge-Kutta pairs.
//!
//! Two pairs are provided:
//!
//! - [`DOPRI5`]: Dormand-Prince 5(4), seven stages. The industry-standard
//!   adaptive explicit method (MATLAB's `ode45`, SciPy's `RK45`).
//! - [`FEHLBERG78`]: Fehlberg 7(8), thirteen stages, from NASA TR R-287,
//!   Table X. Higher cost per step but far larger steps at tight tolerances,
//!   which is what long-horizon chaos studies need.
//!
//! References:
//! 1. Dormand, J. R., & Prince, P. J. (1980). "A family of embedded
//!    Runge-Kutta formulae". J. Comp. Appl. Math., 6(1), 19-26.
//! 2. Fehlberg, E. (1968). "Classical Fifth-, Sixth-, Seventh-, and
//!    Eighth-Order Runge-Kutta Formulas with Stepsize Control". NASA TR R-287.

/// An explicit embedded Runge-Kutta pair.
///
/// `a` is the lower-triangular stage matrix stored as ragged rows (row `i`
/// holds the `i` coefficients for stage `i`), `b` the weights of the
/// propagating solution, and `b_err` the difference `b - b_hat` against the
/// embedded solution, so the local truncation error estimate is
/// `err ≈ h * Σ b_err[i] * k_i`.
#[derive(Debug)]
pub struct Tableau {
    /// Human-readable method name, used in logs and error messages.
    pub name: &'static str,
    /// Number of stages.
    pub stages: usize,
    /// Order of the propagating solution.
    pub order: u8,
    /// Order of the embedded error-estimate solution.
    pub embedded_order: u8,
    /// Node coefficients: stage `i` evaluates the RHS at `t + c[i]*h`.
    pub c: &'static [f64],
    /// Stage matrix rows.
    pub a: &'static [&'static [f64]],
    /// Propagating-solution weights.
    pub b: &'static [f64],
    /// Error weights `b[i] - b_hat[i]`.
    pub b_err: &'static [f64],
}

/// Dormand-Prince 5(4) pair.
pub const DOPRI5: Tableau = Tableau {
    name: "dormand-prince-5(4)",
    stages: 7,
    order: 5,
    embedded_order: 4,
    c: &[0.0, 1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0],
    a: &[
        &[],
        &[1.0 / 5.0],
        &[3.0 / 40.0, 9.0 / 40.0],
        &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
        &[
            19372.0 / 6561.0,
            -25360.0 / 2187.0,
            64448.0 / 6561.0,
            -212.0 / 729.0,
        ],
        &[
            9017.0 / 3168.0,
            -355.0 / 33.0,
            46732.0 / 5247.0,
            49.0 / 176.0,
            -5103.0 / 18656.0,
        ],
        // Last row equals b: the FSAL property (not exploited by the stepper).
        &[
            35.0 / 384.0,
            0.0,
            500.0 / 1113.0,
            125.0 / 192.0,
            -2187.0 / 6784.0,
            11.0 / 84.0,
        ],
    ],
    b: &[
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
        0.0,
    ],
    b_err: &[
        71.0 / 57600.0,
        0.0,
        -71.0 / 16695.0,
        71.0 / 1920.0,
        -17253.0 / 339200.0,
        22.0 / 525.0,
        -1.0 / 40.0,
    ],
};

/// Fehlberg 7(8) pair, NASA TR R-287 Table X.
///
/// The 8th-order weights use stages 0-10; stages 11 and 12 exist only for the
/// 7th-order error estimate, which collapses to
/// `TE = (41/840) * (k_0 + k_10 - k_11 - k_12) * h`.
pub const FEHLBERG78: Tableau = Tableau {
    name: "fehlberg-7(8)",
    stages: 13,
    order: 8,
    embedded_order: 7,
    c: &[
        0.0,
        2.0 / 27.0,
        1.0 / 9.0,
        1.0 / 6.0,
        5.0 / 12.0,
        0.5,
        5.0 / 6.0,
        1.0 / 6.0,
        2.0 / 3.0,
        1.0 / 3.0,
        1.0,
        0.0,
        1.0,
    ],
    a: &[
        &[],
        &[2.0 / 27.0],
        &[1.0 / 36.0, 1.0 / 12.0],
        &[1.0 / 24.0, 0.0, 1.0 / 8.0],
        &[5.0 / 12.0, 0.0, -25.0 / 16.0, 25.0 / 16.0],
        &[1.0 / 20.0, 0.0, 0.0, 1.0 / 4.0, 1.0 / 5.0],
        &[
            -25.0 / 108.0,
            0.0,
            0.0,
            125.0 / 108.0,
            -65.0 / 27.0,
            125.0 / 54.0,
        ],
        &[
            31.0 / 300.0,
            0.0,
            0.0,
            0.0,
            61.0 / 225.0,
            -2.0 / 9.0,
            13.0 / 900.0,
        ],
        &[
            2.0,
            0.0,
            0.0,
            -53.0 / 6.0,
            704.0 / 45.0,
            -107.0 / 9.0,
            67.0 / 90.0,
            3.0,
        ],
        &[
            -91.0 / 108.0,
            0.0,
            0.0,
            23.0 / 108.0,
            -976.0 / 135.0,
            311.0 / 54.0,
            -19.0 / 60.0,
            17.0 / 6.0,
            -1.0 / 12.0,
        ],
        &[
            2383.0 / 4100.0,
            0.0,
            0.0,
            -341.0 / 164.0,
            4496.0 / 1025.0,
            -301.0 / 82.0,
            2133.0 / 4100.0,
            45.0 / 82.0,
            45.0 / 164.0,
            18.0 / 41.0,
        ],
        &[
            3.0 / 205.0,
            0.0,
            0.0,
            0.0,
            0.0,
            -6.0 / 41.0,
            -3.0 / 205.0,
            -3.0 / 41.0,
            3.0 / 41.0,
            6.0 / 41.0,
            0.0,
        ],
        &[
            -1777.0 / 4100.0,
            0.0,
            0.0,
            -341.0 / 164.0,
            4496.0 / 1025.0,
            -289.0 / 82.0,
            2193.0 / 4100.0,
            51.0 / 82.0,
            33.0 / 164.0,
            12.0 / 41.0,
            0.0,
            1.0,
        ],
    ],
    b: &[
        41.0 / 840.0,
        0.0,
        0.0,
        0.0,
        0.0,
        34.0 / 105.0,
        9.0 / 35.0,
        9.0 / 35.0,
        9.0 / 280.0,
        9.0 / 280.0,
        41.0 / 840.0,
        0.0,
        0.0,
    ],
    b_err: &[
        41.0 / 840.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        0.0,
        41.0 / 840.0,
        -41.0 / 840.0,
        -41.0 / 840.0,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    // Summation of ~13 f64 terms accumulates ~O(n*eps) roundoff
    const TOL: f64 = 1e-14;

    fn check(tab: &Tableau) {
        assert_eq!(tab.c.len(), tab.stages, "{}", tab.name);
        assert_eq!(tab.a.len(), tab.stages, "{}", tab.name);
        assert_eq!(tab.b.len(), tab.stages, "{}", tab.name);
        assert_eq!(tab.b_err.len(), tab.stages, "{}", tab.name);

        // Row-sum condition: sum_j a[i][j] = c[i]
        for i in 0..tab.stages {
            assert_eq!(tab.a[i].len(), i, "{} row {}", tab.name, i);
            let row_sum: f64 = tab.a[i].iter().sum();
            assert!(
                (row_sum - tab.c[i]).abs() < TOL,
                "{} row {} sum = {}, expected c = {}",
                tab.name,
                i,
                row_sum,
                tab.c[i]
            );
        }

        // Propagating weights are a quadrature rule: they sum to one
        let b_sum: f64 = tab.b.iter().sum();
        assert!(
            (b_sum - 1.0).abs() < TOL,
            "{} weights sum to {}",
            tab.name,
            b_sum
        );

        // Error weights are a difference of two such rules: they sum to zero
        let err_sum: f64 = tab.b_err.iter().sum();
        assert!(
            err_sum.abs() < TOL,
            "{} error weights sum to {}",
            tab.name,
            err_sum
        );
    }

    #[test]
    fn test_dopri5_consistency() {
        check(&DOPRI5);
    }

    #[test]
    fn test_fehlberg78_consistency() {
        check(&FEHLBERG78);
    }

    #[test]
    fn test_specific_coefficients() {
        assert!((DOPRI5.c[4] - 8.0 / 9.0).abs() < TOL);
        assert!((DOPRI5.b[0] - 35.0 / 384.0).abs() < TOL);
        assert!((FEHLBERG78.c[1] - 2.0 / 27.0).abs() < TOL);
        assert!((FEHLBERG78.b[5] - 34.0 / 105.0).abs() < TOL);
    }
}

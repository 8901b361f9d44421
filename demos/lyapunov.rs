//! Lyapunov-exponent sweep over release angles.
//!
//! Releases the pendulum from rest at a range of symmetric arm angles,
//! estimates the largest Lyapunov exponent for each via twin trajectories,
//! and prints one line per angle. The transition from regular (λ ≈ 0) to
//! chaotic (λ > 0) motion appears as the release angle grows.
//!
//! The per-angle runs are independent, so the sweep fans out across cores.
//!
//! Run with:
//!   cargo run --release --example lyapunov

use dpend::config::{Formulation, Method};
use dpend::diagnostics::lyapunov_sweep;
use dpend::model::{Model, State};
use dpend::params::Params;
use dpend::simulate::linspace;
use dpend::solver::Tolerances;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let model = Model::new(Formulation::Lagrangian, Params::default());

    let angles_deg: Vec<f64> = (1..=17).map(|i| 10.0 * i as f64).collect();
    let states: Vec<State> = angles_deg
        .iter()
        .map(|&a| {
            let rad = a.to_radians();
            [rad, rad, 0.0, 0.0]
        })
        .collect();

    let t_end = 20.0;
    let t_eval = linspace(0.0, t_end, 2001);
    let tol = Tolerances::new(1e-10, 1e-10);

    let results = lyapunov_sweep(
        &model,
        &states,
        (0.0, t_end),
        &t_eval,
        Method::AdaptiveOrder8,
        &tol,
    );

    println!("{:>10} {:>12}", "angle [°]", "lambda [1/s]");
    for (angle, result) in angles_deg.iter().zip(results) {
        match result {
            Ok(est) => println!("{:>10.1} {:>12.4}", angle, est.exponent),
            Err(e) => println!("{:>10.1} failed: {}", angle, e),
        }
    }
}

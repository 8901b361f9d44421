//! Energy drift comparison — fixed RK4 vs the adaptive pairs.
//!
//! Runs the same high-energy initial condition under all three methods and
//! prints the mechanical-energy drift over time, the standard accuracy probe
//! for a conservative system.
//!
//! Run with:
//!   cargo run --example energy_drift

use dpend::config::{Formulation, Method};
use dpend::model::Model;
use dpend::params::Params;
use dpend::simulate::{linspace, simulate};
use dpend::solver::Tolerances;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let model = Model::new(Formulation::Hamiltonian, Params::default());
    let y0 = [
        170.0_f64.to_radians(),
        170.0_f64.to_radians(),
        0.0,
        0.0,
    ];

    let t_end = 20.0;
    // 0.025 s spacing: the classic animation frame interval, which is also
    // the fixed method's step size
    let t_eval = linspace(0.0, t_end, 801);
    let tol = Tolerances::new(1e-10, 1e-10);

    println!("Double pendulum, both arms raised to 170°, {} s run", t_end);
    println!(
        "m1 = m2 = 1 kg, l1 = l2 = 1 m, g = {} m/s²\n",
        model.params().g
    );
    println!(
        "{:<18} {:>14} {:>14}",
        "method", "E(0) [J]", "max |ΔE| [J]"
    );

    for method in [
        Method::FixedRk4,
        Method::AdaptiveOrder5,
        Method::AdaptiveOrder8,
    ] {
        match simulate(&model, y0, (0.0, t_end), &t_eval, method, &tol) {
            Ok(traj) => {
                let e0 = traj.samples()[0].energy.mechanical;
                let drift = traj.max_energy_drift().unwrap_or(0.0);
                println!("{:<18} {:>14.6} {:>14.3e}", method, e0, drift);
            }
            Err(failure) => {
                println!("{:<18} failed: {}", method, failure);
            }
        }
    }

    println!("\nThe fixed method's drift is set by the 0.025 s frame step;");
    println!("the adaptive pairs hold the drift at the requested tolerance.");
}

//! Poincaré section of a chaotic double-pendulum run.
//!
//! Prints (θ1, p1) section points under the zero-crossing policy as
//! whitespace-separated columns, ready for gnuplot or a plotting script:
//!
//!   cargo run --example poincare > section.dat
//!
//! Regular motion draws closed curves; chaotic motion scatters.

use dpend::config::{Formulation, Method};
use dpend::diagnostics::{poincare_section, SectionPolicy};
use dpend::model::Model;
use dpend::params::Params;
use dpend::simulate::{linspace, simulate};
use dpend::solver::Tolerances;

fn main() {
    let model = Model::new(Formulation::Hamiltonian, Params::default());
    let y0 = [
        120.0_f64.to_radians(),
        -10.0_f64.to_radians(),
        0.0,
        0.0,
    ];

    let t_end = 200.0;
    let t_eval = linspace(0.0, t_end, 20_001);
    let tol = Tolerances::new(1e-10, 1e-10);

    let traj = match simulate(
        &model,
        y0,
        (0.0, t_end),
        &t_eval,
        Method::AdaptiveOrder8,
        &tol,
    ) {
        Ok(traj) => traj,
        Err(failure) => {
            eprintln!("simulation failed: {}", failure);
            std::process::exit(1);
        }
    };

    let points = match poincare_section(&traj, SectionPolicy::ZeroCrossing) {
        Ok(points) => points,
        Err(e) => {
            eprintln!("section failed: {}", e);
            std::process::exit(1);
        }
    };

    eprintln!(
        "{} section points from {} samples over {} s",
        points.len(),
        traj.len(),
        t_end
    );
    println!("# theta1  p1");
    for p in &points {
        println!("{:.12e} {:.12e}", p.angle, p.momentum);
    }
}

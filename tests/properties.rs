//! End-to-end physical properties of the simulation engine.
//!
//! These tests exercise the public API the way a consumer would: build a
//! model, run it, and check physics (energy conservation, formulation
//! agreement, chaos indicators) rather than implementation details.

use approx::assert_relative_eq;

use dpend::config::{Formulation, Method};
use dpend::diagnostics::{
    lyapunov_exponent, perturbed_state, poincare_section, SectionPolicy, SeparationMetric,
    DEFAULT_PERTURBATION,
};
use dpend::model::{Model, State};
use dpend::params::Params;
use dpend::simulate::{linspace, simulate};
use dpend::solver::Tolerances;

fn small_swing() -> State {
    [5.0_f64.to_radians(), 0.0, 0.0, 0.0]
}

fn high_energy() -> State {
    [170.0_f64.to_radians(), 170.0_f64.to_radians(), 0.0, 0.0]
}

#[test]
fn energy_is_conserved_over_long_hamiltonian_run() {
    let model = Model::new(Formulation::Hamiltonian, Params::default());
    let t_eval = linspace(0.0, 20.0, 2001);
    let tol = Tolerances::new(1e-10, 1e-10);

    let traj = simulate(
        &model,
        small_swing(),
        (0.0, 20.0),
        &t_eval,
        Method::AdaptiveOrder8,
        &tol,
    )
    .unwrap();

    let drift = traj.max_energy_drift().unwrap();
    assert!(drift < 1e-6, "energy drift {} exceeds 1e-6", drift);
}

#[test]
fn energy_is_conserved_for_chaotic_lagrangian_run() {
    // Chaos amplifies trajectory error but not energy error: the adaptive
    // controller still holds the drift down on a high-energy run.
    let model = Model::new(Formulation::Lagrangian, Params::default());
    let t_eval = linspace(0.0, 10.0, 1001);
    let tol = Tolerances::new(1e-11, 1e-11);

    let traj = simulate(
        &model,
        high_energy(),
        (0.0, 10.0),
        &t_eval,
        Method::AdaptiveOrder8,
        &tol,
    )
    .unwrap();

    let drift = traj.max_energy_drift().unwrap();
    assert!(drift < 1e-6, "energy drift {} exceeds 1e-6", drift);
}

#[test]
fn formulations_agree_on_regular_motion() {
    // The same physical initial condition, expressed in both coordinate
    // systems, must give the same angle history while the motion is regular.
    let params = Params::default();
    let lag = Model::new(Formulation::Lagrangian, params);
    let ham = Model::new(Formulation::Hamiltonian, params);

    let y_lag = small_swing();
    let (p1, p2) = ham.momenta_from_velocities((y_lag[0], y_lag[1]), (y_lag[2], y_lag[3]));
    let y_ham = [y_lag[0], y_lag[1], p1, p2];

    let t_eval = linspace(0.0, 5.0, 501);
    let tol = Tolerances::new(1e-11, 1e-11);

    let a = simulate(&lag, y_lag, (0.0, 5.0), &t_eval, Method::AdaptiveOrder8, &tol).unwrap();
    let b = simulate(&ham, y_ham, (0.0, 5.0), &t_eval, Method::AdaptiveOrder8, &tol).unwrap();

    for (sa, sb) in a.iter().zip(b.iter()) {
        assert_relative_eq!(sa.state[0], sb.state[0], epsilon = 1e-7);
        assert_relative_eq!(sa.state[1], sb.state[1], epsilon = 1e-7);
    }
}

#[test]
fn fixed_and_adaptive_agree_at_small_step() {
    // dt = 0.001 puts fixed RK4 well inside its convergence regime for
    // regular motion; the adaptive reference is much tighter.
    let model = Model::new(Formulation::Lagrangian, Params::default());
    let t_eval = linspace(0.0, 1.0, 1001);
    let tol = Tolerances::new(1e-11, 1e-11);

    let fixed = simulate(
        &model,
        small_swing(),
        (0.0, 1.0),
        &t_eval,
        Method::FixedRk4,
        &tol,
    )
    .unwrap();
    let adaptive = simulate(
        &model,
        small_swing(),
        (0.0, 1.0),
        &t_eval,
        Method::AdaptiveOrder5,
        &tol,
    )
    .unwrap();

    let a = fixed.last().unwrap().state[0];
    let b = adaptive.last().unwrap().state[0];
    assert!(
        (a - b).abs() < 1e-4,
        "θ1(1.0) disagrees: fixed {} vs adaptive {}",
        a,
        b
    );
}

#[test]
fn simulation_is_bit_identical_across_runs() {
    let model = Model::new(Formulation::Hamiltonian, Params::default());
    let t_eval = linspace(0.0, 10.0, 401);
    let tol = Tolerances::new(1e-9, 1e-9);

    let run = || {
        simulate(
            &model,
            high_energy(),
            (0.0, 10.0),
            &t_eval,
            Method::AdaptiveOrder5,
            &tol,
        )
        .unwrap()
    };

    let a = run();
    let b = run();
    assert_eq!(a.len(), b.len());
    for (sa, sb) in a.iter().zip(b.iter()) {
        assert_eq!(sa.t, sb.t);
        assert_eq!(sa.state, sb.state);
    }
}

#[test]
fn lyapunov_separates_chaotic_from_regular() {
    let model = Model::new(Formulation::Lagrangian, Params::default());
    let t_eval = linspace(0.0, 20.0, 2001);
    let tol = Tolerances::new(1e-10, 1e-10);

    let estimate = |y0: State| {
        let reference = simulate(
            &model,
            y0,
            (0.0, 20.0),
            &t_eval,
            Method::AdaptiveOrder8,
            &tol,
        )
        .unwrap();
        let twin = simulate(
            &model,
            perturbed_state(&y0, 0, DEFAULT_PERTURBATION),
            (0.0, 20.0),
            &t_eval,
            Method::AdaptiveOrder8,
            &tol,
        )
        .unwrap();
        lyapunov_exponent(&reference, &twin, SeparationMetric::Theta1)
            .unwrap()
            .exponent
    };

    let chaotic = estimate(high_energy());
    let regular = estimate(small_swing());

    assert!(chaotic > 0.1, "chaotic exponent {} not positive", chaotic);
    assert!(regular < 0.1, "regular exponent {} too large", regular);
    assert!(
        chaotic > 5.0 * regular.max(1e-3),
        "chaotic {} does not dominate regular {}",
        chaotic,
        regular
    );
}

#[test]
fn zero_crossing_section_points_satisfy_the_condition() {
    let model = Model::new(Formulation::Hamiltonian, Params::default());
    let t_eval = linspace(0.0, 30.0, 3001);
    let tol = Tolerances::new(1e-10, 1e-10);

    let traj = simulate(
        &model,
        high_energy(),
        (0.0, 30.0),
        &t_eval,
        Method::AdaptiveOrder8,
        &tol,
    )
    .unwrap();

    let points = poincare_section(&traj, SectionPolicy::ZeroCrossing).unwrap();
    assert!(!points.is_empty(), "a 30 s chaotic run should cross θ1 = 0");
    for p in &points {
        assert!(p.angle >= 0.0, "emitted point with θ1 = {} < 0", p.angle);
    }
}

#[test]
fn fixed_interval_section_matches_grid_strobes() {
    let model = Model::new(Formulation::Hamiltonian, Params::default());
    // Grid spacing 0.01 divides the strobe interval 0.5 exactly
    let t_eval = linspace(0.0, 10.0, 1001);
    let tol = Tolerances::new(1e-9, 1e-9);

    let traj = simulate(
        &model,
        small_swing(),
        (0.0, 10.0),
        &t_eval,
        Method::AdaptiveOrder5,
        &tol,
    )
    .unwrap();

    let points = poincare_section(
        &traj,
        SectionPolicy::FixedInterval {
            interval: 0.5,
            tol: 1e-3,
        },
    )
    .unwrap();
    // Strobes at t = 0.0, 0.5, ..., 10.0
    assert_eq!(points.len(), 21);
}

#[test]
fn aligned_arms_are_not_degenerate() {
    // θ1 == θ2 is a removable point of the naive denominator; the closed
    // forms stay finite there and the run proceeds normally.
    let model = Model::new(Formulation::Lagrangian, Params::default());
    let y0 = [1.0, 1.0, 0.0, 0.0];
    let t_eval = linspace(0.0, 5.0, 501);
    let tol = Tolerances::new(1e-9, 1e-9);

    let traj = simulate(
        &model,
        y0,
        (0.0, 5.0),
        &t_eval,
        Method::AdaptiveOrder5,
        &tol,
    )
    .unwrap();

    assert_eq!(traj.len(), t_eval.len());
    for s in &traj {
        assert!(s.state.iter().all(|v| v.is_finite()), "at t = {}", s.t);
    }
}

#[test]
fn unequal_masses_and_lengths_conserve_energy() {
    let params = Params::new(2.5, 0.7, 1.4, 0.6, 9.81).unwrap();
    let model = Model::new(Formulation::Lagrangian, params);
    let y0 = [2.0, -1.0, 0.5, -0.3];
    let t_eval = linspace(0.0, 10.0, 1001);
    let tol = Tolerances::new(1e-11, 1e-11);

    let traj = simulate(
        &model,
        y0,
        (0.0, 10.0),
        &t_eval,
        Method::AdaptiveOrder8,
        &tol,
    )
    .unwrap();

    let drift = traj.max_energy_drift().unwrap();
    assert!(drift < 1e-6, "energy drift {} exceeds 1e-6", drift);
}

#[test]
fn method_and_formulation_names_round_trip() {
    for m in [
        Method::FixedRk4,
        Method::AdaptiveOrder5,
        Method::AdaptiveOrder8,
    ] {
        assert_eq!(m.to_string().parse::<Method>().unwrap(), m);
    }
    for f in [Formulation::Lagrangian, Formulation::Hamiltonian] {
        assert_eq!(f.to_string().parse::<Formulation>().unwrap(), f);
    }
    assert!("rk4".parse::<Method>().is_err());
    assert!("newtonian".parse::<Formulation>().is_err());
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dpend::coefficients::{DOPRI5, FEHLBERG78};
use dpend::config::{Formulation, Method};
use dpend::model::Model;
use dpend::params::Params;
use dpend::simulate::{linspace, simulate};
use dpend::solver::{EmbeddedRk, Tolerances};

/// High-energy chaotic initial condition: both arms near the top.
fn chaotic_state() -> [f64; 4] {
    [170.0_f64.to_radians(), 170.0_f64.to_radians(), 0.0, 0.0]
}

fn bench_endpoint_10s(c: &mut Criterion) {
    let model = Model::new(Formulation::Hamiltonian, Params::default());
    let y0 = chaotic_state();

    let mut group = c.benchmark_group("endpoint_10s");
    for (name, tableau) in [("dopri5", &DOPRI5), ("fehlberg78", &FEHLBERG78)] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let mut solver = EmbeddedRk::new(tableau, Tolerances::new(1e-10, 1e-10));
                solver
                    .integrate(&model, 0.0, black_box(&y0), 10.0, 0.01)
                    .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_sampled_10s(c: &mut Criterion) {
    let model = Model::new(Formulation::Lagrangian, Params::default());
    let y0 = chaotic_state();
    let t_eval = linspace(0.0, 10.0, 401);
    let tol = Tolerances::new(1e-10, 1e-10);

    let mut group = c.benchmark_group("sampled_10s");
    for method in [
        Method::FixedRk4,
        Method::AdaptiveOrder5,
        Method::AdaptiveOrder8,
    ] {
        group.bench_function(method.to_string(), |b| {
            b.iter(|| {
                simulate(&model, black_box(y0), (0.0, 10.0), &t_eval, method, &tol).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_endpoint_10s, bench_sampled_10s);
criterion_main!(benches);

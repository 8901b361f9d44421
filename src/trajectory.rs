//! Trajectory storage: time-ordered samples with per-sample energy.
//!
//! A [`Trajectory`] is the product of a simulation run. Each [`Sample`]
//! carries the time, the raw state in the formulation the run used, and the
//! energy decomposition at that state. The trajectory remembers which
//! formulation produced it so downstream consumers can interpret the last
//! two state components correctly (angular velocities vs canonical momenta).

use crate::config::Formulation;
use crate::model::State;

/// Energy decomposition of a single state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Energy {
    /// Kinetic energy T
    pub kinetic: f64,
    /// Potential energy V (zero at the pivot)
    pub potential: f64,
    /// Mechanical energy T + V
    pub mechanical: f64,
}

/// One time point of a simulation run.
#[derive(Debug, Clone, Copy)]
pub struct Sample {
    /// Sample time
    pub t: f64,
    /// State vector in the formulation the run used
    pub state: State,
    /// Energy decomposition at this state
    pub energy: Energy,
}

/// Time-ordered simulation output.
///
/// Sample times are strictly increasing; construction goes through
/// [`Trajectory::push`], which enforces the ordering in debug builds.
#[derive(Debug, Clone)]
pub struct Trajectory {
    formulation: Formulation,
    samples: Vec<Sample>,
}

impl Trajectory {
    /// Create an empty trajectory for the given formulation.
    pub fn new(formulation: Formulation) -> Self {
        Self {
            formulation,
            samples: Vec::new(),
        }
    }

    /// Create an empty trajectory with room for `capacity` samples.
    pub fn with_capacity(formulation: Formulation, capacity: usize) -> Self {
        Self {
            formulation,
            samples: Vec::with_capacity(capacity),
        }
    }

    /// The formulation whose state layout the samples use.
    pub fn formulation(&self) -> Formulation {
        self.formulation
    }

    /// Append a sample. Sample times must arrive in strictly increasing order.
    pub fn push(&mut self, sample: Sample) {
        debug_assert!(
            self.samples.last().map_or(true, |prev| sample.t > prev.t),
            "sample times must be strictly increasing"
        );
        self.samples.push(sample);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the trajectory holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All samples in time order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterate over the samples in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// Last sample, if any.
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    /// Sample times as a column.
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.t).collect()
    }

    /// Inner-arm angle θ1 as a column.
    pub fn theta1(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.state[0]).collect()
    }

    /// Outer-arm angle θ2 as a column.
    pub fn theta2(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.state[1]).collect()
    }

    /// Third state component as a column: ω1 for the Lagrangian layout,
    /// p1 for the Hamiltonian layout.
    pub fn velocity1(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.state[2]).collect()
    }

    /// Fourth state component as a column: ω2 for the Lagrangian layout,
    /// p2 for the Hamiltonian layout.
    pub fn velocity2(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.state[3]).collect()
    }

    /// Mechanical energy T + V as a column.
    pub fn mechanical_energy(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.energy.mechanical).collect()
    }

    /// Largest |E(t) - E(t0)| over the run, or `None` if empty.
    ///
    /// The standard accuracy check for a conservative system: with no
    /// dissipation in the model, all drift is integration error.
    pub fn max_energy_drift(&self) -> Option<f64> {
        let e0 = self.samples.first()?.energy.mechanical;
        self.samples
            .iter()
            .map(|s| (s.energy.mechanical - e0).abs())
            .fold(None, |acc, d| Some(acc.map_or(d, |m: f64| m.max(d))))
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

//! Double pendulum equations of motion.
//!
//! Two equivalent formulations of the same physical system are provided as a
//! closed set of variants. The Lagrangian variant evolves angles and angular
//! velocities; the Hamiltonian variant evolves angles and generalized
//! momenta. Making the choice a tagged variant (rather than two free-floating
//! derivative functions) ties every state vector to the formulation that
//! produced it, so a momentum state can never be fed through the velocity
//! energy formulas.
//!
//! The closed forms are written exactly as they fall out of the
//! Euler-Lagrange / Hamilton derivations. In particular the Lagrangian
//! denominator is `l * (m1 - m2*cos(Δ)² + m2)`, which equals
//! `l * (m1 + m2*sin(Δ)²)` and is strictly positive for valid parameters.
//!
//! Non-finite states are not an error here: `rhs` and the energy functions
//! propagate NaN/Inf so downstream diagnostics can treat divergence as data.

use crate::config::Formulation;
use crate::params::Params;
use crate::solver::OdeSystem;
use crate::trajectory::Energy;

/// Instantaneous configuration of the pendulum.
///
/// Layout depends on the formulation:
/// `[theta1, theta2, omega1, omega2]` (Lagrangian) or
/// `[theta1, theta2, p1, p2]` (Hamiltonian). Angles in radians.
pub type State = [f64; 4];

/// A dynamics formulation bound to a parameter set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Model {
    /// Angle / angular-velocity equations of motion.
    Lagrangian(Params),
    /// Angle / generalized-momentum equations of motion.
    Hamiltonian(Params),
}

impl Model {
    /// Bind a formulation selection to a parameter set.
    pub fn new(formulation: Formulation, params: Params) -> Self {
        match formulation {
            Formulation::Lagrangian => Model::Lagrangian(params),
            Formulation::Hamiltonian => Model::Hamiltonian(params),
        }
    }

    /// The formulation tag for this model.
    pub fn formulation(&self) -> Formulation {
        match self {
            Model::Lagrangian(_) => Formulation::Lagrangian,
            Model::Hamiltonian(_) => Formulation::Hamiltonian,
        }
    }

    /// The physical constants this model evaluates with.
    pub fn params(&self) -> &Params {
        match self {
            Model::Lagrangian(p) | Model::Hamiltonian(p) => p,
        }
    }

    /// Angular velocities `(omega1, omega2)` of the two arms.
    ///
    /// For the Lagrangian variant these are read directly from the state; for
    /// the Hamiltonian variant they are recovered from the momenta via the
    /// inverse mass matrix (the same relations as the first two derivative
    /// components).
    pub fn angular_velocities(&self, y: &State) -> (f64, f64) {
        match self {
            Model::Lagrangian(_) => (y[2], y[3]),
            Model::Hamiltonian(p) => {
                let Params { m1, m2, l1, l2, .. } = *p;
                let [t1, t2, p1, p2] = *y;
                let d = t1 - t2;
                let c0 = l1 * l2 * (m1 + m2 * d.sin().powi(2));
                let omega1 = (l2 * p1 - l1 * p2 * d.cos()) / (l1 * c0);
                let omega2 = (l1 * (m1 + m2) * p2 - l2 * m2 * p1 * d.cos()) / (l2 * m2 * c0);
                (omega1, omega2)
            }
        }
    }

    /// Generalized momenta `(p1, p2)` for given angles and angular velocities.
    ///
    /// Exact inverse of [`angular_velocities`](Model::angular_velocities):
    /// `p = M(theta) * omega` with the pendulum mass matrix `M`. Useful for
    /// constructing a Hamiltonian initial state from the more intuitive
    /// velocity coordinates.
    pub fn momenta_from_velocities(&self, theta: (f64, f64), omega: (f64, f64)) -> (f64, f64) {
        let Params { m1, m2, l1, l2, .. } = *self.params();
        let cd = (theta.0 - theta.1).cos();
        let p1 = (m1 + m2) * l1 * l1 * omega.0 + m2 * l1 * l2 * omega.1 * cd;
        let p2 = m2 * l2 * l2 * omega.1 + m2 * l1 * l2 * omega.0 * cd;
        (p1, p2)
    }

    /// Kinetic energy of the current state.
    ///
    /// Both variants share one closed form in the angular velocities; the
    /// Hamiltonian variant first recovers them from the momenta.
    pub fn kinetic_energy(&self, y: &State) -> f64 {
        let Params { m1, m2, l1, l2, .. } = *self.params();
        let (omega1, omega2) = self.angular_velocities(y);
        let d = y[0] - y[1];
        let t1 = 0.5 * m1 * (l1 * omega1).powi(2);
        let t2 = 0.5
            * m2
            * ((l1 * omega1).powi(2)
                + (l2 * omega2).powi(2)
                + 2.0 * l1 * l2 * omega1 * omega2 * d.cos());
        t1 + t2
    }

    /// Potential energy of the current state (zero at the pivot height).
    ///
    /// Identical expression for both variants: it depends only on the angles.
    pub fn potential_energy(&self, y: &State) -> f64 {
        let Params {
            m1, m2, l1, l2, g, ..
        } = *self.params();
        let v1 = -m1 * g * l1 * y[0].cos();
        let v2 = -m2 * g * (l1 * y[0].cos() + l2 * y[1].cos());
        v1 + v2
    }

    /// Kinetic, potential, and mechanical energy of the current state.
    pub fn energy(&self, y: &State) -> Energy {
        let kinetic = self.kinetic_energy(y);
        let potential = self.potential_energy(y);
        Energy {
            kinetic,
            potential,
            mechanical: kinetic + potential,
        }
    }

    /// Cartesian bob positions `[[x1, y1], [x2, y2]]`, pivot at the origin,
    /// y-axis pointing up. This is what animation/plotting consumers read.
    pub fn bob_positions(&self, y: &State) -> [[f64; 2]; 2] {
        let Params { l1, l2, .. } = *self.params();
        let x1 = l1 * y[0].sin();
        let y1 = -l1 * y[0].cos();
        let x2 = x1 + l2 * y[1].sin();
        let y2 = y1 - l2 * y[1].cos();
        [[x1, y1], [x2, y2]]
    }
}

impl OdeSystem<4> for Model {
    fn rhs(&self, _t: f64, y: &State, dydt: &mut State) {
        match self {
            Model::Lagrangian(p) => {
                let Params { m1, m2, l1, l2, g } = *p;
                let [t1, t2, w1, w2] = *y;
                let d = t1 - t2;
                // Positive for all valid parameters: equals l*(m1 + m2*sin(d)^2)
                let den1 = l1 * (m1 - m2 * d.cos().powi(2) + m2);
                let den2 = l2 * (m1 - m2 * d.cos().powi(2) + m2);

                dydt[0] = w1;
                dydt[1] = w2;
                dydt[2] = (-0.5 * l1 * m2 * (2.0 * t1 - 2.0 * t2).sin() * w1 * w1
                    - l2 * m2 * d.sin() * w2 * w2
                    - g * m1 * t1.sin()
                    - 0.5 * g * m2 * (t1 - 2.0 * t2).sin()
                    - 0.5 * g * m2 * t1.sin())
                    / den1;
                dydt[3] = (l1 * m1 * d.sin() * w1 * w1
                    + l1 * m2 * d.sin() * w1 * w1
                    + 0.5 * l2 * m2 * (2.0 * t1 - 2.0 * t2).sin() * w2 * w2
                    + 0.5 * g * m1 * (2.0 * t1 - t2).sin()
                    - 0.5 * g * m1 * t2.sin()
                    + 0.5 * g * m2 * (2.0 * t1 - t2).sin()
                    - 0.5 * g * m2 * t2.sin())
                    / den2;
            }
            Model::Hamiltonian(p) => {
                let Params { m1, m2, l1, l2, g } = *p;
                let [t1, t2, p1, p2] = *y;
                let d = t1 - t2;
                let c0 = l1 * l2 * (m1 + m2 * d.sin().powi(2));
                let c1 = p1 * p2 * d.sin() / c0;
                let c2 = (m2 * (l2 * p1).powi(2) + (m1 + m2) * (l1 * p2).powi(2)
                    - 2.0 * l1 * l2 * m2 * p1 * p2 * d.cos())
                    * (2.0 * d).sin()
                    / (2.0 * c0 * c0);

                dydt[0] = (l2 * p1 - l1 * p2 * d.cos()) / (l1 * c0);
                dydt[1] = (l1 * (m1 + m2) * p2 - l2 * m2 * p1 * d.cos()) / (l2 * m2 * c0);
                dydt[2] = -(m1 + m2) * g * l1 * t1.sin() - c1 + c2;
                dydt[3] = -m2 * g * l2 * t2.sin() + c1 - c2;
            }
        }
    }
}

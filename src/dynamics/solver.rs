use std::collections::HashMap;

use glam::{Mat3, Vec3};

use crate::config::SINGULAR_EPSILON;
use crate::core::rigidbody::RigidBody;
use crate::utils::allocator::{BodyHandle, ContactHandle, JointHandle};

/// Velocity state of one body inside an island job. Non-dynamic bodies carry zero inverse mass.
#[derive(Debug, Clone, Copy)]
pub struct SolverBody {
    pub linear: Vec3,
    pub angular: Vec3,
    /// World centre of mass; lever arms are measured from here.
    pub center: Vec3,
    pub inverse_mass: f32,
    pub inverse_inertia: Mat3,
}

impl SolverBody {
    pub fn from_body(body: &RigidBody) -> Self {
        let movable = body.is_dynamic() && !body.is_sleeping();
        Self {
            linear: body.velocity.linear,
            angular: body.velocity.angular,
            center: body.center_of_mass(),
            inverse_mass: if movable { body.inverse_mass } else { 0.0 },
            inverse_inertia: if movable { body.inverse_inertia } else { Mat3::ZERO },
        }
    }
}

/// One row of the constraint Jacobian.
/// Velocity error is `linear·(v2 − v1) + angular2·w2 − angular1·w1`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Jacobian {
    pub linear: Vec3,
    pub angular1: Vec3,
    pub angular2: Vec3,
}

impl Jacobian {
    pub fn rotational(axis: Vec3) -> Self {
        Self {
            linear: Vec3::ZERO,
            angular1: axis,
            angular2: axis,
        }
    }

    /// Point-to-point row along `axis` with lever arms from each centre of mass.
    pub fn translational(axis: Vec3, arm1: Vec3, arm2: Vec3) -> Self {
        Self {
            linear: axis,
            angular1: arm1.cross(axis),
            angular2: arm2.cross(axis),
        }
    }
}

/// Which accumulated impulse a contact row writes back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactDirection {
    Normal,
    Tangent,
    Binormal,
}

/// Owner of a row's accumulated impulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowSource {
    Contact {
        contact: ContactHandle,
        point: usize,
        direction: ContactDirection,
    },
    Joint {
        joint: JointHandle,
        slot: usize,
    },
}

/// A single scalar sequential-impulse row, shared by contacts and joints.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintRow {
    pub body1: usize,
    pub body2: usize,
    pub jacobian: Jacobian,
    pub effective_mass: f32,
    /// Desired velocity error.
    pub target: f32,
    /// Constraint force mixing of soft rows.
    pub cfm: f32,
    pub lower: f32,
    pub upper: f32,
    pub impulse: f32,
    /// Friction rows track the normal row they are bounded by, and the coefficient.
    pub friction: Option<(usize, f32)>,
    pub source: RowSource,
}

impl ConstraintRow {
    pub fn new(body1: usize, body2: usize, jacobian: Jacobian, source: RowSource) -> Self {
        Self {
            body1,
            body2,
            jacobian,
            effective_mass: 0.0,
            target: 0.0,
            cfm: 0.0,
            lower: f32::NEG_INFINITY,
            upper: f32::INFINITY,
            impulse: 0.0,
            friction: None,
            source,
        }
    }

    pub fn with_target(mut self, target: f32) -> Self {
        self.target = target;
        self
    }

    pub fn with_bounds(mut self, lower: f32, upper: f32) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    pub fn with_impulse(mut self, impulse: f32) -> Self {
        self.impulse = impulse;
        self
    }

    /// `J M⁻¹ Jᵀ` for the current body set.
    pub fn inverse_effective_mass(&self, bodies: &[SolverBody]) -> f32 {
        let b1 = &bodies[self.body1];
        let b2 = &bodies[self.body2];
        let j = &self.jacobian;
        let linear = j.linear.length_squared() * (b1.inverse_mass + b2.inverse_mass);
        let angular1 = j.angular1.dot(b1.inverse_inertia * j.angular1);
        let angular2 = j.angular2.dot(b2.inverse_inertia * j.angular2);
        linear + angular1 + angular2
    }

    pub fn velocity_error(&self, bodies: &[SolverBody]) -> f32 {
        let b1 = &bodies[self.body1];
        let b2 = &bodies[self.body2];
        let j = &self.jacobian;
        j.linear.dot(b2.linear - b1.linear) + j.angular2.dot(b2.angular) - j.angular1.dot(b1.angular)
    }

    /// Caches the effective mass. Returns `false` for a singular row, which must then be skipped.
    pub fn prepare(&mut self, bodies: &[SolverBody]) -> bool {
        let k = self.inverse_effective_mass(bodies);
        if !(k.is_finite() && k > SINGULAR_EPSILON) {
            return false;
        }
        self.effective_mass = 1.0 / (k + self.cfm);
        self.effective_mass.is_finite() && self.target.is_finite()
    }

    /// Turns the row into a soft constraint with spring `frequency` (Hz) and `damping_ratio`
    /// for position error `error`. Must be called before [`prepare`](Self::prepare).
    pub fn soften(&mut self, bodies: &[SolverBody], frequency: f32, damping_ratio: f32, error: f32, dt: f32) {
        let k = self.inverse_effective_mass(bodies);
        let omega = std::f32::consts::TAU * frequency;
        let denom = 2.0 * damping_ratio * omega + dt * omega * omega;
        if denom <= 0.0 || k <= SINGULAR_EPSILON {
            return;
        }
        self.cfm = k / (dt * denom);
        let beta = dt * omega * omega / denom;
        self.target = -beta / dt * error;
    }
}

fn apply_impulse(bodies: &mut [SolverBody], row: &ConstraintRow, lambda: f32) {
    let j = row.jacobian;
    let b1 = &mut bodies[row.body1];
    b1.linear -= j.linear * (b1.inverse_mass * lambda);
    b1.angular -= b1.inverse_inertia * j.angular1 * lambda;
    let b2 = &mut bodies[row.body2];
    b2.linear += j.linear * (b2.inverse_mass * lambda);
    b2.angular += b2.inverse_inertia * j.angular2 * lambda;
}

/// Self-contained solver state for one island, safe to solve on another thread.
#[derive(Debug, Default)]
pub struct IslandSolver {
    pub bodies: Vec<SolverBody>,
    pub handles: Vec<BodyHandle>,
    pub rows: Vec<ConstraintRow>,
    /// Rows dropped this step because their effective mass was singular.
    pub skipped: usize,
    index: HashMap<BodyHandle, usize>,
}

impl IslandSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Local index of `handle`, registering the body on first use.
    pub fn body_index(&mut self, handle: BodyHandle, body: &RigidBody) -> usize {
        if let Some(&index) = self.index.get(&handle) {
            return index;
        }
        let index = self.bodies.len();
        self.bodies.push(SolverBody::from_body(body));
        self.handles.push(handle);
        self.index.insert(handle, index);
        index
    }

    /// Prepares and appends a row, or counts it as skipped when degenerate.
    pub fn push_row(&mut self, mut row: ConstraintRow) -> Option<usize> {
        if row.prepare(&self.bodies) {
            self.rows.push(row);
            Some(self.rows.len() - 1)
        } else {
            self.skipped += 1;
            log::debug!("skipping singular constraint row from {:?}", row.source);
            None
        }
    }

    /// PRE_SOLVE: applies last step's accumulated impulses.
    pub fn warm_start(&mut self) {
        for row in &self.rows {
            if row.impulse != 0.0 {
                apply_impulse(&mut self.bodies, row, row.impulse);
            }
        }
    }

    /// SOLVE: projected Gauss-Seidel sweeps over all rows in insertion order.
    pub fn solve(&mut self, iterations: u32) {
        for _ in 0..iterations {
            for i in 0..self.rows.len() {
                if let Some((normal, mu)) = self.rows[i].friction {
                    let bound = mu * self.rows[normal].impulse;
                    self.rows[i].lower = -bound;
                    self.rows[i].upper = bound;
                }

                let row = self.rows[i];
                let error = row.velocity_error(&self.bodies);
                let lambda = -(error - row.target + row.cfm * row.impulse) * row.effective_mass;
                let accumulated = (row.impulse + lambda).clamp(row.lower, row.upper);
                let applied = accumulated - row.impulse;
                self.rows[i].impulse = accumulated;
                if applied != 0.0 {
                    apply_impulse(&mut self.bodies, &row, applied);
                }
            }
        }
    }

    pub fn run(&mut self, iterations: u32) {
        self.warm_start();
        self.solve(iterations);
    }
}

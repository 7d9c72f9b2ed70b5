//! Impulse Physics – a rigid-body simulation core for Rust.
//!
//! Bodies carry convex shapes (sphere, box, cylinder, tetrahedron, convex polyhedron,
//! particle, plane). Each [`World::step`] runs a padded-AABB broad phase, a table-dispatched
//! narrow phase feeding persistent four-point manifolds, and a sequential-impulse solver
//! shared by contacts and joints, then integrates and puts quiet islands to sleep.

pub mod collision;
pub mod config;
pub mod core;
pub mod dynamics;
pub mod error;
pub mod utils;
pub mod world;

pub use glam::{Mat3, Quat, Vec3};

pub use collision::{Aabb, ContactManifold, ManifoldPoint};
pub use config::{BroadPhaseType, ContactConfig, SleepConfig, WorldConfig};
pub use core::{
    mix_friction, mix_restitution, BodyType, CollisionFilter, MassInfo, RigidBody, Shape,
    ShapeConfig, ShapeDesc, ShapeGeometry, ShapeType, Transform, Velocity,
};
pub use dynamics::{AxisState, Contact, Joint, JointConfig, JointDesc, LimitMotor};
pub use error::{PhysicsError, Result};
pub use utils::allocator::{BodyHandle, ContactHandle, JointHandle, ShapeHandle};
pub use utils::profiling::StepProfile;
pub use world::{
    BodyPose, ContactEvent, ContactListener, SnapshotReader, TransformSnapshot, World,
};

/// High-level convenience wrapper that owns a [`World`] and drives it at a fixed timestep.
pub struct PhysicsEngine {
    world: World,
    time_step: f32,
    time_accumulated: f32,
    max_substeps: u32,
}

impl PhysicsEngine {
    /// Creates an engine stepping `world` in increments of `time_step` seconds.
    pub fn new(config: WorldConfig, time_step: f32) -> Result<Self> {
        if !(time_step.is_finite() && time_step > 0.0) {
            return Err(PhysicsError::InvalidTimeStep(time_step));
        }
        Ok(Self {
            world: World::new(config),
            time_step,
            time_accumulated: 0.0,
            max_substeps: 8,
        })
    }

    /// Caps the number of fixed steps one [`advance`](Self::advance) call may run.
    pub fn with_max_substeps(mut self, max_substeps: u32) -> Self {
        self.max_substeps = max_substeps.max(1);
        self
    }

    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Adds a rigid body to the world and returns its handle.
    pub fn add_body(&mut self, body: RigidBody) -> Result<BodyHandle> {
        self.world.add_rigid_body(body)
    }

    /// Accumulates `elapsed` seconds and runs as many fixed steps as fit.
    /// Returns the number of steps taken; time beyond `max_substeps` is dropped.
    pub fn advance(&mut self, elapsed: f32) -> Result<u32> {
        if !(elapsed.is_finite() && elapsed >= 0.0) {
            return Err(PhysicsError::InvalidTimeStep(elapsed));
        }
        self.time_accumulated += elapsed;

        let mut steps = 0;
        while self.time_accumulated >= self.time_step {
            if steps == self.max_substeps {
                log::debug!(
                    "dropping {:.4} s of simulation time after {steps} substeps",
                    self.time_accumulated
                );
                self.time_accumulated = 0.0;
                break;
            }
            self.time_accumulated -= self.time_step;
            self.world.step(self.time_step)?;
            steps += 1;
        }
        Ok(steps)
    }

    /// Immutable access to a rigid body by handle.
    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.world.body(handle)
    }

    /// Mutable access to a rigid body by handle.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.world.body_mut(handle)
    }
}

use glam::{Mat3, Quat, Vec3};

use super::shape::ShapeDesc;
use super::types::{BodyType, MassInfo, Transform, Velocity};
use crate::error::{PhysicsError, Result};
use crate::utils::allocator::{ContactHandle, JointHandle, ShapeHandle};
use crate::utils::math::{integrate_rotation, parallel_axis, rotate_tensor, safe_inverse};

/// Rigid body state. Build one with the `with_*` methods, attach shapes,
/// then register it with `World::add_rigid_body`.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub(crate) body_type: BodyType,
    /// Pose of the body origin (not necessarily the centre of mass).
    pub(crate) transform: Transform,
    pub(crate) velocity: Velocity,
    pub(crate) force: Vec3,
    pub(crate) torque: Vec3,
    pub(crate) mass: f32,
    pub(crate) inverse_mass: f32,
    pub(crate) local_center: Vec3,
    pub(crate) local_inertia: Mat3,
    pub(crate) inverse_local_inertia: Mat3,
    /// World-space inverse inertia, refreshed whenever the rotation changes.
    pub(crate) inverse_inertia: Mat3,
    pub gravity_scale: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub allow_sleep: bool,
    pub(crate) sleeping: bool,
    pub(crate) sleep_time: f32,
    pub(crate) shapes: Vec<ShapeHandle>,
    pub(crate) joints: Vec<JointHandle>,
    pub(crate) contacts: Vec<ContactHandle>,
    pub(crate) pending_shapes: Vec<ShapeDesc>,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new(BodyType::Dynamic)
    }
}

impl RigidBody {
    pub fn new(body_type: BodyType) -> Self {
        Self {
            body_type,
            transform: Transform::default(),
            velocity: Velocity::default(),
            force: Vec3::ZERO,
            torque: Vec3::ZERO,
            mass: 0.0,
            inverse_mass: 0.0,
            local_center: Vec3::ZERO,
            local_inertia: Mat3::ZERO,
            inverse_local_inertia: Mat3::ZERO,
            inverse_inertia: Mat3::ZERO,
            gravity_scale: 1.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            allow_sleep: true,
            sleeping: false,
            sleep_time: 0.0,
            shapes: Vec::new(),
            joints: Vec::new(),
            contacts: Vec::new(),
            pending_shapes: Vec::new(),
        }
    }

    pub fn dynamic() -> Self {
        Self::new(BodyType::Dynamic)
    }

    pub fn fixed() -> Self {
        Self::new(BodyType::Static)
    }

    pub fn kinematic() -> Self {
        Self::new(BodyType::Kinematic)
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.transform.rotation = rotation.normalize();
        self
    }

    pub fn with_linear_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity.linear = velocity;
        self
    }

    pub fn with_angular_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity.angular = velocity;
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = scale;
        self
    }

    pub fn with_damping(mut self, linear: f32, angular: f32) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn with_allow_sleep(mut self, allow: bool) -> Self {
        self.allow_sleep = allow;
        self
    }

    /// Attaches a shape before registration. Registered bodies take more
    /// shapes through `World::add_shape`.
    pub fn with_shape(mut self, shape: ShapeDesc) -> Self {
        self.pending_shapes.push(shape);
        self
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn is_dynamic(&self) -> bool {
        self.body_type == BodyType::Dynamic
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    pub fn is_kinematic(&self) -> bool {
        self.body_type == BodyType::Kinematic
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// World-space centre of mass.
    pub fn center_of_mass(&self) -> Vec3 {
        self.transform.transform_point(self.local_center)
    }

    pub fn local_center_of_mass(&self) -> Vec3 {
        self.local_center
    }

    pub fn linear_velocity(&self) -> Vec3 {
        self.velocity.linear
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.velocity.angular
    }

    /// Velocity of a world point rigidly attached to the body.
    pub fn velocity_at_point(&self, point: Vec3) -> Vec3 {
        self.velocity.linear + self.velocity.angular.cross(point - self.center_of_mass())
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn inverse_mass(&self) -> f32 {
        self.inverse_mass
    }

    pub fn local_inertia(&self) -> Mat3 {
        self.local_inertia
    }

    pub fn inverse_inertia(&self) -> Mat3 {
        self.inverse_inertia
    }

    pub fn kinetic_energy(&self) -> f32 {
        if !self.is_dynamic() {
            return 0.0;
        }
        let rotation = self.transform.rotation_matrix();
        let world_inertia = rotate_tensor(self.local_inertia, rotation);
        0.5 * self.mass * self.velocity.linear.length_squared()
            + 0.5 * self.velocity.angular.dot(world_inertia * self.velocity.angular)
    }

    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    pub fn sleep_time(&self) -> f32 {
        self.sleep_time
    }

    pub fn shapes(&self) -> &[ShapeHandle] {
        &self.shapes
    }

    pub fn joints(&self) -> &[JointHandle] {
        &self.joints
    }

    pub fn contacts(&self) -> &[ContactHandle] {
        &self.contacts
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec3) {
        if self.is_static() {
            return;
        }
        self.velocity.linear = velocity;
        self.wake_up();
    }

    pub fn set_angular_velocity(&mut self, velocity: Vec3) {
        if self.is_static() {
            return;
        }
        self.velocity.angular = velocity;
        self.wake_up();
    }

    /// Teleports the body. Shapes follow at the next proxy update.
    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.wake_up();
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.rotation = rotation.normalize();
        self.update_inertia();
        self.wake_up();
    }

    pub fn apply_force(&mut self, force: Vec3) {
        if !self.is_dynamic() {
            return;
        }
        self.force += force;
        self.wake_up();
    }

    pub fn apply_force_at(&mut self, force: Vec3, point: Vec3) {
        if !self.is_dynamic() {
            return;
        }
        self.force += force;
        self.torque += (point - self.center_of_mass()).cross(force);
        self.wake_up();
    }

    pub fn apply_torque(&mut self, torque: Vec3) {
        if !self.is_dynamic() {
            return;
        }
        self.torque += torque;
        self.wake_up();
    }

    /// Instant velocity change from an impulse applied at a world point.
    pub fn apply_impulse(&mut self, impulse: Vec3, point: Vec3) {
        if !self.is_dynamic() {
            return;
        }
        self.velocity.linear += impulse * self.inverse_mass;
        let torque = (point - self.center_of_mass()).cross(impulse);
        self.velocity.angular += self.inverse_inertia * torque;
        self.wake_up();
    }

    pub fn wake_up(&mut self) {
        self.sleeping = false;
        self.sleep_time = 0.0;
    }

    /// Puts the body to sleep and clears its motion. Only dynamic bodies sleep.
    pub fn sleep(&mut self) {
        if !self.is_dynamic() {
            return;
        }
        self.velocity = Velocity::default();
        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
        self.sleeping = true;
        self.sleep_time = 0.0;
    }

    /// Aggregates shape mass infos (each given with its body-relative transform)
    /// into total mass, centre of mass and inertia about it.
    pub(crate) fn setup_mass(&mut self, shapes: &[(MassInfo, Transform)]) -> Result<()> {
        let mut mass = 0.0;
        let mut weighted_center = Vec3::ZERO;
        for (info, local) in shapes {
            mass += info.mass;
            weighted_center += local.transform_point(info.center) * info.mass;
        }

        if self.is_dynamic() && !(mass.is_finite() && mass > 0.0) {
            return Err(PhysicsError::config(
                "rigid body",
                "a dynamic body needs at least one shape with positive mass",
            ));
        }

        let local_center = if mass > 0.0 {
            weighted_center / mass
        } else {
            Vec3::ZERO
        };

        let mut inertia = Mat3::ZERO;
        for (info, local) in shapes {
            let rotated = rotate_tensor(info.inertia, local.rotation_matrix());
            let offset = local.transform_point(info.center) - local_center;
            inertia += parallel_axis(rotated, info.mass, offset);
        }

        self.mass = mass;
        self.local_center = local_center;
        self.local_inertia = inertia;

        match self.body_type {
            BodyType::Dynamic => {
                self.inverse_mass = 1.0 / mass;
                self.inverse_local_inertia = safe_inverse(inertia);
            }
            BodyType::Static | BodyType::Kinematic => {
                self.inverse_mass = 0.0;
                self.inverse_local_inertia = Mat3::ZERO;
            }
        }
        self.update_inertia();
        Ok(())
    }

    pub(crate) fn update_inertia(&mut self) {
        let rotation = self.transform.rotation_matrix();
        self.inverse_inertia = rotate_tensor(self.inverse_local_inertia, rotation);
    }

    /// Semi-implicit Euler, velocity half: v += invM·F·dt, then damping.
    pub(crate) fn integrate_velocity(&mut self, gravity: Vec3, dt: f32) {
        if !self.is_dynamic() {
            return;
        }
        let acceleration = gravity * self.gravity_scale + self.force * self.inverse_mass;
        self.velocity.linear += acceleration * dt;
        self.velocity.angular += self.inverse_inertia * self.torque * dt;

        self.velocity.linear *= (1.0 - self.linear_damping * dt).max(0.0);
        self.velocity.angular *= (1.0 - self.angular_damping * dt).max(0.0);

        self.force = Vec3::ZERO;
        self.torque = Vec3::ZERO;
    }

    /// Position half: the centre of mass moves by v·dt and the origin follows the rotation.
    pub(crate) fn integrate_position(&mut self, dt: f32) {
        if self.is_static() {
            return;
        }
        let center = self.center_of_mass() + self.velocity.linear * dt;
        self.transform.rotation = integrate_rotation(self.transform.rotation, self.velocity.angular, dt);
        self.transform.position = center - self.transform.rotation * self.local_center;
        self.update_inertia();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn offset_shapes_shift_center_of_mass() {
        let info = MassInfo {
            mass: 1.0,
            center: Vec3::ZERO,
            inertia: Mat3::from_diagonal(Vec3::splat(0.4)),
        };
        let mut body = RigidBody::dynamic();
        body.setup_mass(&[
            (info, Transform::from_position(Vec3::new(-1.0, 0.0, 0.0))),
            (info, Transform::from_position(Vec3::new(3.0, 0.0, 0.0))),
        ])
        .expect("positive mass");

        assert_abs_diff_eq!(body.mass(), 2.0);
        assert_abs_diff_eq!(body.local_center_of_mass().x, 1.0);
        // Each sphere sits 2 units from the centre: 0.4 + 1 * 4 on the perpendicular axes.
        assert_abs_diff_eq!(body.local_inertia().y_axis.y, 2.0 * 4.4, epsilon = 1e-5);
        assert_abs_diff_eq!(body.local_inertia().x_axis.x, 0.8, epsilon = 1e-5);
    }

    #[test]
    fn massless_dynamic_body_is_a_configuration_error() {
        let info = MassInfo {
            mass: 2.0,
            center: Vec3::ZERO,
            inertia: Mat3::IDENTITY,
        };
        let mut body = RigidBody::dynamic();
        assert!(body.setup_mass(&[]).is_err());
        body.setup_mass(&[(info, Transform::default())]).expect("positive mass");
        // A rejected update keeps the previous mass.
        assert!(body.setup_mass(&[]).is_err());
        assert_abs_diff_eq!(body.mass(), 2.0);
        assert_abs_diff_eq!(body.inverse_mass(), 0.5);

        let mut ground = RigidBody::fixed();
        assert!(ground.setup_mass(&[]).is_ok());
        assert_eq!(ground.inverse_mass(), 0.0);
    }

    #[test]
    fn velocity_setters_wake_the_body() {
        let mut body = RigidBody::dynamic();
        body.sleep();
        assert!(body.is_sleeping());
        body.set_linear_velocity(Vec3::X);
        assert!(!body.is_sleeping());
    }

    #[test]
    fn only_dynamic_bodies_sleep() {
        let mut mover = RigidBody::kinematic().with_linear_velocity(Vec3::X);
        mover.sleep();
        assert!(!mover.is_sleeping());
        assert_eq!(mover.linear_velocity(), Vec3::X);

        let mut ground = RigidBody::fixed();
        ground.sleep();
        assert!(!ground.is_sleeping());
    }

    #[test]
    fn position_integration_rotates_about_center_of_mass() {
        let info = MassInfo {
            mass: 1.0,
            center: Vec3::ZERO,
            inertia: Mat3::IDENTITY,
        };
        let mut body = RigidBody::dynamic();
        body.setup_mass(&[(info, Transform::from_position(Vec3::new(1.0, 0.0, 0.0)))])
            .expect("positive mass");
        body.velocity.angular = Vec3::new(0.0, 0.0, std::f32::consts::PI);
        body.integrate_position(1.0);

        let com = body.center_of_mass();
        assert_abs_diff_eq!(com.x, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(com.y, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(body.position().x, 2.0, epsilon = 1e-4);
    }
}

use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a body or shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Applies another transform on top of this one, returning the composition.
    pub fn combine(&self, other: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * other.position,
            rotation: (self.rotation * other.rotation).normalize(),
        }
    }

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    pub fn inverse_transform_vector(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * world
    }

    pub fn rotation_matrix(&self) -> Mat3 {
        Mat3::from_quat(self.rotation)
    }
}

/// Linear and angular velocity of a rigid body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub linear: Vec3,
    pub angular: Vec3,
}

/// Mass, shape-local centroid and inertia about that centroid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassInfo {
    pub mass: f32,
    pub center: Vec3,
    pub inertia: Mat3,
}

impl Default for MassInfo {
    fn default() -> Self {
        Self {
            mass: 0.0,
            center: Vec3::ZERO,
            inertia: Mat3::ZERO,
        }
    }
}

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BodyType {
    /// Never moves; infinite mass.
    Static,
    #[default]
    Dynamic,
    /// Moves by its velocity only; infinite mass, never sleeps.
    Kinematic,
}

/// Friction of a shape pair: geometric mean of both coefficients.
pub fn mix_friction(a: f32, b: f32) -> f32 {
    (a * b).sqrt()
}

/// Restitution of a shape pair: the bouncier of the two.
pub fn mix_restitution(a: f32, b: f32) -> f32 {
    a.max(b)
}

/// Helper methods for inertia calculations.
pub trait InertiaTensorExt {
    fn for_solid_box(half_extents: Vec3, mass: f32) -> Mat3;
    fn for_solid_sphere(radius: f32, mass: f32) -> Mat3;
    /// Solid cylinder aligned with the local Y axis.
    fn for_solid_cylinder(radius: f32, half_height: f32, mass: f32) -> Mat3;
}

impl InertiaTensorExt for Mat3 {
    fn for_solid_box(half_extents: Vec3, mass: f32) -> Mat3 {
        let lx = half_extents.x * 2.0;
        let ly = half_extents.y * 2.0;
        let lz = half_extents.z * 2.0;
        let factor = mass / 12.0;
        Mat3::from_diagonal(Vec3::new(
            factor * (ly * ly + lz * lz),
            factor * (lx * lx + lz * lz),
            factor * (lx * lx + ly * ly),
        ))
    }

    fn for_solid_sphere(radius: f32, mass: f32) -> Mat3 {
        let value = 0.4 * mass * radius * radius;
        Mat3::from_diagonal(Vec3::splat(value))
    }

    fn for_solid_cylinder(radius: f32, half_height: f32, mass: f32) -> Mat3 {
        let height = half_height * 2.0;
        let side = mass * (3.0 * radius * radius + height * height) / 12.0;
        Mat3::from_diagonal(Vec3::new(side, 0.5 * mass * radius * radius, side))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixing_rules_are_symmetric() {
        let samples = [0.0_f32, 0.1, 0.35, 0.5, 0.9, 1.0, 2.5];
        for &a in &samples {
            for &b in &samples {
                assert_eq!(mix_friction(a, b), mix_friction(b, a));
                assert_eq!(mix_restitution(a, b), mix_restitution(b, a));
            }
        }
        assert!((mix_friction(0.6, 0.2) - (0.12_f32).sqrt()).abs() < 1e-5);
        assert!((mix_restitution(0.6, 0.2) - 0.6).abs() < 1e-5);
    }

    #[test]
    fn transform_round_trips_points() {
        let t = Transform::new(
            Vec3::new(1.0, 2.0, 3.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let local = Vec3::new(0.5, -1.0, 2.0);
        let back = t.inverse_transform_point(t.transform_point(local));
        assert!((back - local).length() < 1e-5);
    }

    #[test]
    fn cylinder_inertia_about_axis_is_half_mr2() {
        let inertia = Mat3::for_solid_cylinder(2.0, 1.0, 3.0);
        assert!((inertia.y_axis.y - 6.0).abs() < 1e-5);
        assert!((inertia.x_axis.x - 4.0).abs() < 1e-5);
    }
}

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::axis::{AxisRows, JOINT_SLOTS, ROTATION_SLOT};
use super::limit_motor::LimitMotor;
use super::solver::{IslandSolver, Jacobian};
use crate::core::rigidbody::RigidBody;
use crate::core::types::Transform;
use crate::error::{PhysicsError, Result};
use crate::utils::allocator::{BodyHandle, JointHandle};
use crate::utils::math::{rotation_vector, signed_angle};

/// Anchors and axes of a joint, in each body's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JointConfig {
    /// Default: body origin.
    pub local_anchor1: Vec3,
    /// Default: body origin.
    pub local_anchor2: Vec3,
    /// Default: +X.
    pub local_axis1: Vec3,
    /// Default: +X.
    pub local_axis2: Vec3,
    /// Let the two bodies collide with each other. Default: false.
    pub allow_collision: bool,
}

impl Default for JointConfig {
    fn default() -> Self {
        Self {
            local_anchor1: Vec3::ZERO,
            local_anchor2: Vec3::ZERO,
            local_axis1: Vec3::X,
            local_axis2: Vec3::X,
            allow_collision: false,
        }
    }
}

impl JointConfig {
    /// Builds local anchors and axes from one world anchor and one world axis.
    pub fn from_world(body1: &RigidBody, body2: &RigidBody, anchor: Vec3, axis: Vec3) -> Self {
        Self {
            local_anchor1: body1.transform().inverse_transform_point(anchor),
            local_anchor2: body2.transform().inverse_transform_point(anchor),
            local_axis1: body1.transform().inverse_transform_vector(axis),
            local_axis2: body2.transform().inverse_transform_vector(axis),
            allow_collision: false,
        }
    }

    pub fn with_anchors(mut self, local_anchor1: Vec3, local_anchor2: Vec3) -> Self {
        self.local_anchor1 = local_anchor1;
        self.local_anchor2 = local_anchor2;
        self
    }

    pub fn with_axes(mut self, local_axis1: Vec3, local_axis2: Vec3) -> Self {
        self.local_axis1 = local_axis1;
        self.local_axis2 = local_axis2;
        self
    }

    pub fn with_allow_collision(mut self, allow: bool) -> Self {
        self.allow_collision = allow;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.local_anchor1.is_finite() && self.local_anchor2.is_finite()) {
            return Err(PhysicsError::config("joint config", "anchors must be finite"));
        }
        for axis in [self.local_axis1, self.local_axis2] {
            if !axis.is_finite() || axis.length_squared() < 1e-12 {
                return Err(PhysicsError::config(
                    "joint config",
                    format!("axis must be finite and non-zero, got {axis}"),
                ));
            }
        }
        Ok(())
    }
}

/// Joint kind together with the limit motors of its free axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JointDesc {
    /// Keeps the anchor distance within the limit's range.
    Distance { limit: LimitMotor },
    BallAndSocket,
    /// Rotation about the hinge axis only.
    Hinge { rotation: LimitMotor },
    /// Suspension along axis 1, steering about axis 1, spin about axis 2.
    Wheel {
        suspension: LimitMotor,
        steering: LimitMotor,
        spin: LimitMotor,
    },
    /// Rotation about and translation along one axis.
    Slider {
        rotation: LimitMotor,
        translation: LimitMotor,
    },
    /// Translation along one axis only.
    Prismatic { translation: LimitMotor },
}

impl JointDesc {
    pub fn distance(min: f32, max: f32) -> Self {
        Self::Distance {
            limit: LimitMotor::limited(min, max),
        }
    }

    pub fn ball_and_socket() -> Self {
        Self::BallAndSocket
    }

    pub fn hinge(rotation: LimitMotor) -> Self {
        Self::Hinge { rotation }
    }

    /// Free spin, locked steering and a rigid suspension unless overridden.
    pub fn wheel() -> Self {
        Self::Wheel {
            suspension: LimitMotor::locked(),
            steering: LimitMotor::locked(),
            spin: LimitMotor::free(),
        }
    }

    pub fn slider(rotation: LimitMotor, translation: LimitMotor) -> Self {
        Self::Slider {
            rotation,
            translation,
        }
    }

    pub fn prismatic(translation: LimitMotor) -> Self {
        Self::Prismatic { translation }
    }

    pub fn name(&self) -> &'static str {
        match self {
            JointDesc::Distance { .. } => "distance joint",
            JointDesc::BallAndSocket => "ball-and-socket joint",
            JointDesc::Hinge { .. } => "hinge joint",
            JointDesc::Wheel { .. } => "wheel joint",
            JointDesc::Slider { .. } => "slider joint",
            JointDesc::Prismatic { .. } => "prismatic joint",
        }
    }

    fn validate(&self) -> Result<()> {
        let what = self.name();
        match self {
            JointDesc::Distance { limit } => {
                limit.validate(what)?;
                if limit.lower_limit <= limit.upper_limit && limit.lower_limit < 0.0 {
                    return Err(PhysicsError::config(
                        what,
                        format!("minimum distance must be non-negative, got {}", limit.lower_limit),
                    ));
                }
                Ok(())
            }
            JointDesc::BallAndSocket => Ok(()),
            JointDesc::Hinge { rotation } => rotation.validate(what),
            JointDesc::Wheel {
                suspension,
                steering,
                spin,
            } => {
                suspension.validate(what)?;
                steering.validate(what)?;
                spin.validate(what)
            }
            JointDesc::Slider {
                rotation,
                translation,
            } => {
                rotation.validate(what)?;
                translation.validate(what)
            }
            JointDesc::Prismatic { translation } => translation.validate(what),
        }
    }
}

/// Reference directions captured when the joint is created.
#[derive(Debug, Clone, Copy, Default)]
struct JointFrame {
    /// Angle reference perpendicular to axis 1, body 1 local.
    reference1: Vec3,
    /// Same reference expressed in body 2's frame at creation.
    reference2: Vec3,
    /// `q1⁻¹ q2` at creation.
    relative_rotation: Quat,
    /// Angle between the two axes at creation.
    axis_angle: f32,
}

/// A constraint between two bodies, composed of translational and rotational axes.
#[derive(Debug, Clone)]
pub struct Joint {
    pub(crate) body1: BodyHandle,
    pub(crate) body2: BodyHandle,
    pub(crate) config: JointConfig,
    pub(crate) desc: JointDesc,
    pub(crate) anchor1: Vec3,
    pub(crate) anchor2: Vec3,
    pub(crate) impulses: [f32; JOINT_SLOTS],
    frame: JointFrame,
}

impl Joint {
    pub(crate) fn new(
        body1: (BodyHandle, &RigidBody),
        body2: (BodyHandle, &RigidBody),
        config: JointConfig,
        desc: JointDesc,
    ) -> Result<Self> {
        config.validate()?;
        desc.validate()?;
        let config = JointConfig {
            local_axis1: config.local_axis1.normalize(),
            local_axis2: config.local_axis2.normalize(),
            ..config
        };

        let t1 = body1.1.transform();
        let t2 = body2.1.transform();
        let n1 = t1.transform_vector(config.local_axis1);
        let n2 = t2.transform_vector(config.local_axis2);

        let frame = match desc {
            JointDesc::Wheel { .. } => {
                let cross = n1.cross(n2);
                if cross.length() < 1e-3 {
                    return Err(PhysicsError::config(
                        "wheel joint",
                        "suspension and spin axes must not be parallel",
                    ));
                }
                let spin_reference = cross.normalize();
                let steering = (n2 - n1 * n1.dot(n2)).normalize();
                JointFrame {
                    reference1: t1.inverse_transform_vector(steering),
                    reference2: t2.inverse_transform_vector(spin_reference),
                    relative_rotation: Quat::IDENTITY,
                    axis_angle: n1.dot(n2).clamp(-1.0, 1.0).acos(),
                }
            }
            _ => {
                let reference1 = config.local_axis1.any_orthonormal_vector();
                let world = t1.transform_vector(reference1);
                JointFrame {
                    reference1,
                    reference2: t2.inverse_transform_vector(world),
                    relative_rotation: (t1.rotation.inverse() * t2.rotation).normalize(),
                    axis_angle: 0.0,
                }
            }
        };

        Ok(Self {
            body1: body1.0,
            body2: body2.0,
            config,
            desc,
            anchor1: t1.transform_point(config.local_anchor1),
            anchor2: t2.transform_point(config.local_anchor2),
            impulses: [0.0; JOINT_SLOTS],
            frame,
        })
    }

    pub fn bodies(&self) -> (BodyHandle, BodyHandle) {
        (self.body1, self.body2)
    }

    pub fn config(&self) -> &JointConfig {
        &self.config
    }

    pub fn desc(&self) -> &JointDesc {
        &self.desc
    }

    /// Replaces the limit motors; the joint kind must stay the same.
    pub fn set_desc(&mut self, desc: JointDesc) -> Result<()> {
        if std::mem::discriminant(&desc) != std::mem::discriminant(&self.desc) {
            return Err(PhysicsError::config(
                "joint",
                format!("cannot turn a {} into a {}", self.desc.name(), desc.name()),
            ));
        }
        desc.validate()?;
        self.desc = desc;
        Ok(())
    }

    pub fn allow_collision(&self) -> bool {
        self.config.allow_collision
    }

    /// World anchors as of the last step.
    pub fn anchors(&self) -> (Vec3, Vec3) {
        (self.anchor1, self.anchor2)
    }

    /// Rotational limit motor position (hinge, slider) or the spin angle (wheel).
    pub fn angle(&self) -> Option<f32> {
        match &self.desc {
            JointDesc::Hinge { rotation } | JointDesc::Slider { rotation, .. } => Some(rotation.position()),
            JointDesc::Wheel { spin, .. } => Some(spin.position()),
            _ => None,
        }
    }

    /// Translational limit motor position (slider, prismatic, wheel suspension, distance).
    pub fn translation(&self) -> Option<f32> {
        match &self.desc {
            JointDesc::Slider { translation, .. } | JointDesc::Prismatic { translation } => {
                Some(translation.position())
            }
            JointDesc::Wheel { suspension, .. } => Some(suspension.position()),
            JointDesc::Distance { limit } => Some(limit.position()),
            JointDesc::BallAndSocket | JointDesc::Hinge { .. } => None,
        }
    }

    pub(crate) fn other_body(&self, body: BodyHandle) -> BodyHandle {
        if self.body1 == body {
            self.body2
        } else {
            self.body1
        }
    }

    /// Recomputes world anchors and axis positions, then emits this step's rows.
    pub(crate) fn build_rows(
        &mut self,
        handle: JointHandle,
        bodies: (&RigidBody, &RigidBody),
        indices: (usize, usize),
        job: &mut IslandSolver,
        dt: f32,
        baumgarte: f32,
    ) {
        let (t1, t2) = (*bodies.0.transform(), *bodies.1.transform());
        self.anchor1 = t1.transform_point(self.config.local_anchor1);
        self.anchor2 = t2.transform_point(self.config.local_anchor2);
        let (a1, a2) = (self.anchor1, self.anchor2);
        let c1 = job.bodies[indices.0].center;
        let c2 = job.bodies[indices.1].center;
        let n1 = t1.transform_vector(self.config.local_axis1);
        let n2 = t2.transform_vector(self.config.local_axis2);
        let delta = a2 - a1;
        let frame = self.frame;

        let impulses = self.impulses;
        let mut rows = AxisRows {
            job,
            body1: indices.0,
            body2: indices.1,
            joint: handle,
            impulses: &impulses,
            dt,
            baumgarte,
        };
        let locked = LimitMotor::locked();
        let world_axes = [Vec3::X, Vec3::Y, Vec3::Z];

        match &mut self.desc {
            JointDesc::Distance { limit } => {
                let length = delta.length();
                let axis = if length > 1e-6 { delta / length } else { n1 };
                limit.record(axis, length);
                rows.add(0, Jacobian::translational(axis, a1 - c1, a2 - c2), length, limit);
            }
            JointDesc::BallAndSocket => {
                rows.translational3(0, world_axes, delta.to_array(), a1 - c1, a2 - c2, [&locked; 3]);
            }
            JointDesc::Hinge { rotation } => {
                rows.translational3(0, world_axes, delta.to_array(), a1 - c1, a2 - c2, [&locked; 3]);
                let (axes, positions) = hinge_axes(n1, n2, &t1, &t2, &frame);
                rotation.record(axes[0], positions[0]);
                rows.rotational3(ROTATION_SLOT, axes, positions, [&*rotation, &locked, &locked]);
            }
            JointDesc::Slider {
                rotation,
                translation,
            } => {
                let (axes, positions) = slide_axes(n1, delta);
                translation.record(axes[0], positions[0]);
                rows.translational3(0, axes, positions, a2 - c1, a2 - c2, [&*translation, &locked, &locked]);
                let (axes, positions) = hinge_axes(n1, n2, &t1, &t2, &frame);
                rotation.record(axes[0], positions[0]);
                rows.rotational3(ROTATION_SLOT, axes, positions, [&*rotation, &locked, &locked]);
            }
            JointDesc::Prismatic { translation } => {
                let (axes, positions) = slide_axes(n1, delta);
                translation.record(axes[0], positions[0]);
                rows.translational3(0, axes, positions, a2 - c1, a2 - c2, [&*translation, &locked, &locked]);
                let error = t2.rotation * frame.relative_rotation.inverse() * t1.rotation.inverse();
                let drift = rotation_vector(error.normalize());
                rows.rotational3(ROTATION_SLOT, world_axes, drift.to_array(), [&locked; 3]);
            }
            JointDesc::Wheel {
                suspension,
                steering,
                spin,
            } => {
                let (axes, positions) = slide_axes(n1, delta);
                suspension.record(axes[0], positions[0]);
                rows.translational3(0, axes, positions, a2 - c1, a2 - c2, [&*suspension, &locked, &locked]);

                let twist_axis = n1.cross(n2).normalize_or_zero();
                let steer_angle = signed_angle(t1.transform_vector(frame.reference1), n2, n1);
                let spin_angle = signed_angle(twist_axis, t2.transform_vector(frame.reference2), n2);
                let twist = n1.dot(n2).clamp(-1.0, 1.0).acos() - frame.axis_angle;
                steering.record(n1, steer_angle);
                spin.record(n2, spin_angle);
                rows.rotational3(
                    ROTATION_SLOT,
                    [n1, n2, twist_axis],
                    [steer_angle, spin_angle, twist],
                    [&*steering, &*spin, &locked],
                );
            }
        }
    }
}

/// Hinge axis between both body axes, its angle, and the two swing errors.
fn hinge_axes(
    n1: Vec3,
    n2: Vec3,
    t1: &Transform,
    t2: &Transform,
    frame: &JointFrame,
) -> ([Vec3; 3], [f32; 3]) {
    let axis = (n1 + n2).try_normalize().unwrap_or(n1);
    let angle = signed_angle(
        t1.transform_vector(frame.reference1),
        t2.transform_vector(frame.reference2),
        axis,
    );
    let (tangent, binormal) = axis.any_orthonormal_pair();
    let swing = n1.cross(n2);
    (
        [axis, tangent, binormal],
        [angle, swing.dot(tangent), swing.dot(binormal)],
    )
}

/// Slide axis with its two perpendiculars, and the anchor offset along each.
fn slide_axes(axis: Vec3, delta: Vec3) -> ([Vec3; 3], [f32; 3]) {
    let (tangent, binormal) = axis.any_orthonormal_pair();
    (
        [axis, tangent, binormal],
        [delta.dot(axis), delta.dot(tangent), delta.dot(binormal)],
    )
}

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::LIMIT_ACTIVATION_BAND;
use crate::error::{PhysicsError, Result};

/// Limits closer than this are treated as one locked value.
const LOCK_EPSILON: f32 = 1.0e-6;

/// Per-step state of a constrained axis, derived from its position and limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisState {
    Free,
    AtLower,
    Locked,
    AtUpper,
}

/// Limits, motor and spring of one joint axis.
///
/// `lower_limit > upper_limit` leaves the axis free; equal limits lock it.
/// A zero `max_motor_force` disables the motor and a zero `frequency` keeps limits rigid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitMotor {
    pub lower_limit: f32,
    pub upper_limit: f32,
    pub motor_speed: f32,
    pub max_motor_force: f32,
    pub frequency: f32,
    pub damping_ratio: f32,
    /// World direction of the axis as of the last step.
    #[serde(skip)]
    axis: Vec3,
    /// Angle or translation along the axis as of the last step.
    #[serde(skip)]
    position: f32,
}

impl Default for LimitMotor {
    fn default() -> Self {
        Self::free()
    }
}

impl LimitMotor {
    pub fn free() -> Self {
        Self {
            lower_limit: 1.0,
            upper_limit: 0.0,
            motor_speed: 0.0,
            max_motor_force: 0.0,
            frequency: 0.0,
            damping_ratio: 0.0,
            axis: Vec3::ZERO,
            position: 0.0,
        }
    }

    pub fn locked() -> Self {
        Self::limited(0.0, 0.0)
    }

    pub fn limited(lower: f32, upper: f32) -> Self {
        Self {
            lower_limit: lower,
            upper_limit: upper,
            ..Self::free()
        }
    }

    pub fn with_motor(mut self, speed: f32, max_force: f32) -> Self {
        self.motor_speed = speed;
        self.max_motor_force = max_force;
        self
    }

    pub fn with_spring(mut self, frequency: f32, damping_ratio: f32) -> Self {
        self.frequency = frequency;
        self.damping_ratio = damping_ratio;
        self
    }

    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn has_spring(&self) -> bool {
        self.frequency > 0.0
    }

    pub fn state(&self) -> AxisState {
        self.state_at(self.position)
    }

    pub fn state_at(&self, position: f32) -> AxisState {
        if self.lower_limit > self.upper_limit {
            AxisState::Free
        } else if (self.upper_limit - self.lower_limit).abs() < LOCK_EPSILON {
            AxisState::Locked
        } else if position < self.lower_limit + LIMIT_ACTIVATION_BAND {
            AxisState::AtLower
        } else if position > self.upper_limit - LIMIT_ACTIVATION_BAND {
            AxisState::AtUpper
        } else {
            AxisState::Free
        }
    }

    /// Motors do nothing on a rigidly locked axis.
    pub fn motor_active(&self) -> bool {
        self.max_motor_force > 0.0 && (self.state() != AxisState::Locked || self.has_spring())
    }

    pub(crate) fn record(&mut self, axis: Vec3, position: f32) {
        self.axis = axis;
        self.position = position;
    }

    pub(crate) fn validate(&self, what: &'static str) -> Result<()> {
        let values = [
            self.lower_limit,
            self.upper_limit,
            self.motor_speed,
            self.max_motor_force,
            self.frequency,
            self.damping_ratio,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PhysicsError::config(what, "limit motor values must be finite"));
        }
        if self.max_motor_force < 0.0 {
            return Err(PhysicsError::config(
                what,
                format!("max motor force must be non-negative, got {}", self.max_motor_force),
            ));
        }
        if self.frequency < 0.0 || self.damping_ratio < 0.0 {
            return Err(PhysicsError::config(
                what,
                "spring frequency and damping ratio must be non-negative",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_ordering_selects_state() {
        assert_eq!(LimitMotor::free().state_at(100.0), AxisState::Free);
        assert_eq!(LimitMotor::locked().state_at(0.3), AxisState::Locked);
        let limited = LimitMotor::limited(-1.0, 1.0);
        assert_eq!(limited.state_at(0.0), AxisState::Free);
        assert_eq!(limited.state_at(-0.97), AxisState::AtLower);
        assert_eq!(limited.state_at(-3.0), AxisState::AtLower);
        assert_eq!(limited.state_at(0.99), AxisState::AtUpper);
    }

    #[test]
    fn locked_axis_disables_rigid_motor() {
        let motor = LimitMotor::locked().with_motor(1.0, 10.0);
        assert!(!motor.motor_active());
        assert!(motor.with_spring(4.0, 0.7).motor_active());
        assert!(LimitMotor::free().with_motor(1.0, 10.0).motor_active());
        assert!(!LimitMotor::free().with_motor(1.0, 0.0).motor_active());
    }

    #[test]
    fn negative_force_is_rejected() {
        let motor = LimitMotor::free().with_motor(1.0, -2.0);
        assert!(motor.validate("hinge").is_err());
        assert!(LimitMotor::limited(-1.0, 1.0).with_spring(2.0, 0.3).validate("slider").is_ok());
    }
}

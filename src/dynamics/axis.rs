//! Generic one-to-three axis constraints shared by every joint kind.
//!
//! Each axis becomes at most two solver rows: an optional motor row followed by
//! a limit row whose bounds depend on the axis state.

use glam::Vec3;

use super::limit_motor::{AxisState, LimitMotor};
use super::solver::{ConstraintRow, IslandSolver, Jacobian, RowSource};
use crate::config::JOINT_SLOP;
use crate::utils::allocator::JointHandle;

/// Accumulated-impulse slots per joint: six axes, each with a limit and a motor row.
pub const JOINT_SLOTS: usize = 12;

/// First axis slot of the rotational block; translational axes use `0..3`.
pub const ROTATION_SLOT: usize = 3;

/// Row builder for the axes of one joint within an island job.
pub(crate) struct AxisRows<'a> {
    pub job: &'a mut IslandSolver,
    pub body1: usize,
    pub body2: usize,
    pub joint: JointHandle,
    pub impulses: &'a [f32; JOINT_SLOTS],
    pub dt: f32,
    pub baumgarte: f32,
}

impl<'a> AxisRows<'a> {
    /// Adds the rows of one axis. `axis_slot` in `0..6` keeps warm-start identity across steps.
    pub fn add(&mut self, axis_slot: usize, jacobian: Jacobian, position: f32, motor: &LimitMotor) {
        let limit_slot = axis_slot * 2;
        let motor_slot = limit_slot + 1;
        let state = motor.state_at(position);

        if motor.max_motor_force > 0.0 && (state != AxisState::Locked || motor.has_spring()) {
            let max_impulse = motor.max_motor_force * self.dt;
            let row = ConstraintRow::new(self.body1, self.body2, jacobian, self.source(motor_slot))
                .with_target(motor.motor_speed)
                .with_bounds(-max_impulse, max_impulse)
                .with_impulse(self.impulses[motor_slot].clamp(-max_impulse, max_impulse));
            self.job.push_row(row);
        }

        let (error, lower, upper) = match state {
            AxisState::Free => return,
            AxisState::Locked => (position - motor.lower_limit, f32::NEG_INFINITY, f32::INFINITY),
            AxisState::AtLower => (position - motor.lower_limit, 0.0, f32::INFINITY),
            AxisState::AtUpper => (position - motor.upper_limit, f32::NEG_INFINITY, 0.0),
        };

        let mut row = ConstraintRow::new(self.body1, self.body2, jacobian, self.source(limit_slot))
            .with_bounds(lower, upper)
            .with_impulse(self.impulses[limit_slot].clamp(lower, upper));

        let approaching = match state {
            AxisState::AtLower => error > 0.0,
            AxisState::AtUpper => error < 0.0,
            _ => false,
        };
        if approaching {
            // Not yet at the limit: only forbid crossing it within this step.
            row.target = -error / self.dt;
        } else if motor.has_spring() {
            row.soften(&self.job.bodies, motor.frequency, motor.damping_ratio, error, self.dt);
        } else {
            row.target = -self.baumgarte * deadband(error, JOINT_SLOP) / self.dt;
        }
        self.job.push_row(row);
    }

    /// Three angular rows starting at `first_slot`.
    pub fn rotational3(&mut self, first_slot: usize, axes: [Vec3; 3], positions: [f32; 3], motors: [&LimitMotor; 3]) {
        for i in 0..3 {
            self.add(first_slot + i, Jacobian::rotational(axes[i]), positions[i], motors[i]);
        }
    }

    /// Three linear rows starting at `first_slot`, with lever arms from each centre of mass.
    pub fn translational3(
        &mut self,
        first_slot: usize,
        axes: [Vec3; 3],
        positions: [f32; 3],
        arm1: Vec3,
        arm2: Vec3,
        motors: [&LimitMotor; 3],
    ) {
        for i in 0..3 {
            self.add(
                first_slot + i,
                Jacobian::translational(axes[i], arm1, arm2),
                positions[i],
                motors[i],
            );
        }
    }

    fn source(&self, slot: usize) -> RowSource {
        RowSource::Joint {
            joint: self.joint,
            slot,
        }
    }
}

/// Shrinks `error` towards zero by `slop`.
fn deadband(error: f32, slop: f32) -> f32 {
    if error > slop {
        error - slop
    } else if error < -slop {
        error + slop
    } else {
        0.0
    }
}

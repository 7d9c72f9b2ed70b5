//! Global configuration constants and the serializable world configuration.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Default gravity vector applied in the physics world (Y-up).
pub const DEFAULT_GRAVITY: [f32; 3] = [0.0, -9.80665, 0.0];

/// Number of velocity-iteration sweeps performed per step.
pub const DEFAULT_VELOCITY_ITERATIONS: u32 = 10;

/// Padding added on every axis around a shape's tight bound.
pub const AABB_MARGIN: f32 = 0.005;

/// Extent used in place of infinity for unbounded shapes (planes).
pub const AABB_INFINITY: f32 = 1.0e6;

/// Penetration tolerated before position correction kicks in.
pub const LINEAR_SLOP: f32 = 0.005;

/// Fraction of the positional error corrected per step.
pub const BAUMGARTE: f32 = 0.2;

/// Approach speed under which restitution is ignored.
pub const BOUNCE_THRESHOLD: f32 = 1.0;

/// Distance within which a new manifold point inherits an old point's impulses.
pub const CONTACT_MATCHING_RADIUS: f32 = 0.04;

/// Separation or tangential drift after which a persisted point is dropped.
pub const CONTACT_BREAKING_DISTANCE: f32 = 0.04;

/// Separation still considered touching.
pub const CONTACT_TOUCH_TOLERANCE: f32 = 1.0e-3;

/// Angular slop for joint limits (radians), also used as the translational band.
pub const JOINT_SLOP: f32 = 0.005;

/// Band beyond a limit in which the limit row is already active.
pub const LIMIT_ACTIVATION_BAND: f32 = 0.05;

/// Linear speed under which a body accumulates sleep time.
pub const SLEEP_LINEAR_THRESHOLD: f32 = 0.2;

/// Angular speed under which a body accumulates sleep time.
pub const SLEEP_ANGULAR_THRESHOLD: f32 = 0.5;

/// Seconds an island must stay quiet before it is put to sleep.
pub const TIME_TO_SLEEP: f32 = 0.5;

/// Effective-mass denominators below this value are treated as singular.
pub const SINGULAR_EPSILON: f32 = 1.0e-9;

/// Broad-phase algorithm used to shortlist proxy pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum BroadPhaseType {
    BruteForce,
    #[default]
    SweepAndPrune,
}

/// Contact generation and stabilization tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    pub linear_slop: f32,
    pub baumgarte: f32,
    pub bounce_threshold: f32,
    pub matching_radius: f32,
    pub breaking_distance: f32,
    pub touch_tolerance: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            linear_slop: LINEAR_SLOP,
            baumgarte: BAUMGARTE,
            bounce_threshold: BOUNCE_THRESHOLD,
            matching_radius: CONTACT_MATCHING_RADIUS,
            breaking_distance: CONTACT_BREAKING_DISTANCE,
            touch_tolerance: CONTACT_TOUCH_TOLERANCE,
        }
    }
}

/// Thresholds driving island sleep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepConfig {
    pub enabled: bool,
    pub linear_threshold: f32,
    pub angular_threshold: f32,
    pub time_to_sleep: f32,
}

impl Default for SleepConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            linear_threshold: SLEEP_LINEAR_THRESHOLD,
            angular_threshold: SLEEP_ANGULAR_THRESHOLD,
            time_to_sleep: TIME_TO_SLEEP,
        }
    }
}

/// World-level configuration value object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub gravity: Vec3,
    pub velocity_iterations: u32,
    pub broad_phase: BroadPhaseType,
    pub aabb_margin: f32,
    pub joint_baumgarte: f32,
    pub contact: ContactConfig,
    pub sleep: SleepConfig,
    /// Solve islands concurrently when the `parallel` feature is enabled.
    pub parallel_islands: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::from_array(DEFAULT_GRAVITY),
            velocity_iterations: DEFAULT_VELOCITY_ITERATIONS,
            broad_phase: BroadPhaseType::default(),
            aabb_margin: AABB_MARGIN,
            joint_baumgarte: BAUMGARTE,
            contact: ContactConfig::default(),
            sleep: SleepConfig::default(),
            parallel_islands: false,
        }
    }
}

impl WorldConfig {
    pub fn with_gravity(mut self, gravity: Vec3) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_velocity_iterations(mut self, iterations: u32) -> Self {
        self.velocity_iterations = iterations.max(1);
        self
    }

    pub fn with_broad_phase(mut self, broad_phase: BroadPhaseType) -> Self {
        self.broad_phase = broad_phase;
        self
    }

    pub fn with_sleep(mut self, sleep: SleepConfig) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn with_parallel_islands(mut self, enabled: bool) -> Self {
        self.parallel_islands = enabled;
        self
    }
}

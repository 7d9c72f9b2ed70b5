//! Simulation dynamics: contact and joint constraints, the impulse solver and islands.

pub mod axis;
pub mod contact;
pub mod island;
pub mod joint;
pub mod limit_motor;
pub mod solver;

pub use contact::Contact;
pub use island::{Island, IslandManager};
pub use joint::{Joint, JointConfig, JointDesc};
pub use limit_motor::{AxisState, LimitMotor};
pub use solver::{ConstraintRow, IslandSolver, Jacobian};

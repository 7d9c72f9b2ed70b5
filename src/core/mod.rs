//! Core types describing bodies, shapes and their shared data.

pub mod rigidbody;
pub mod shape;
pub mod types;

pub use rigidbody::RigidBody;
pub use shape::{CollisionFilter, Shape, ShapeConfig, ShapeDesc, ShapeGeometry, ShapeType};
pub use types::{mix_friction, mix_restitution, BodyType, MassInfo, Transform, Velocity};

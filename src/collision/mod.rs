//! Collision detection modules: bounds, broad-phase, narrow-phase and contact manifolds.

pub mod aabb;
pub mod broadphase;
pub mod clipping;
pub mod gjk;
pub mod manifold;
pub mod narrowphase;

pub use aabb::Aabb;
pub use broadphase::BroadPhase;
pub use manifold::{ContactManifold, ManifoldPoint, MAX_MANIFOLD_POINTS};
pub use narrowphase::{Detector, DetectorTable};

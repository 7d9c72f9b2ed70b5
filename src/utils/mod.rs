//! Utility helpers: math extensions, the generational allocator and step profiling.

pub mod allocator;
pub mod math;
pub mod profiling;

pub use allocator::{
    Arena, ArenaHandle, BodyHandle, ContactHandle, GenerationalId, JointHandle, ProxyHandle,
    ShapeHandle,
};
pub use profiling::{ScopedTimer, StepProfile};

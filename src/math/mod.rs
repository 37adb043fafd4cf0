//! Math utilities module
//!
//! Provides convenient re-exports from glam and the transform helpers the chain
//! uses to stand in for a host scene graph.

mod transform;

pub use transform::{look_rotation, Transform};

// Re-export commonly used glam types
pub use glam::{Mat3, Quat, Vec3};

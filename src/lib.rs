//! # ik-negotiation
//!
//! A per-frame heuristic inverse kinematics solver for a single chain of bones.
//! Instead of solving the whole chain, every bone rotates toward a shared
//! target on its own and negotiates with its parent through a pair of signals:
//! *restrict* (hold still) and *retract* (turn away to free up range).
//!
//! ## Features
//! - Index-based chain: parent and child are neighbours, one root, one tip
//! - Per-bone range of motion measured from the rest pose
//! - Signals climb one link per frame, from the tip toward the root
//! - TOML chain descriptions assembled from parent references
//! - Debug gizmo hook for external renderers
//!
//! ## Example
//! ```rust,ignore
//! use ik_negotiation::ik::{BoneSettings, Chain, NegotiationSolver};
//! use glam::Vec3;
//!
//! let mut chain = Chain::builder()
//!     .bone(BoneSettings::new(Vec3::ZERO).name("shoulder").max_rotation_angle(90.0))
//!     .bone(BoneSettings::new(Vec3::NEG_Z).name("elbow"))
//!     .target(Vec3::new(1.0, 0.0, -1.5))
//!     .build()?;
//!
//! for _ in 0..120 {
//!     let result = NegotiationSolver::step(&mut chain, 1.0 / 60.0);
//!     if result.tip_reached {
//!         break;
//!     }
//! }
//! ```

pub mod config;
pub mod error;
pub mod ik;
pub mod math;

pub use config::{BoneConfig, Config, LoggingConfig, SimulationConfig};
pub use error::{ChainError, ConfigError};
pub use ik::{
    Bone, BoneSettings, Chain, ChainBuilder, GizmoSink, LogGizmos, NegotiationSolver,
    ParentSignal, RotationOutcome, SignalState, StepResult, Thresholds,
};
pub use math::Transform;

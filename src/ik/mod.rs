//! Inverse Kinematics module
//!
//! This module contains the bone chain and the per-frame negotiation step in
//! which every bone decides, from its child's signals, whether to rotate.

pub mod bone;
pub mod chain;
pub mod gizmo;
pub mod signal;
pub mod solver;

pub use bone::{Bone, BoneSettings};
pub use chain::{Chain, ChainBuilder, Thresholds};
pub use gizmo::{GizmoSink, LogGizmos};
pub use signal::{ParentSignal, SignalState};
pub use solver::{NegotiationSolver, RotationOutcome, StepResult};

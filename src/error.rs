//! Error types for chain assembly and configuration loading.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = ChainError> = std::result::Result<T, E>;

/// Problems found while building or addressing a [`Chain`](crate::ik::Chain).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChainError {
    #[error("chain has no bones")]
    Empty,

    #[error("bone `{name}`: rotation speed {value} is outside [0, 1]")]
    InvalidRotationSpeed { name: String, value: f32 },

    #[error("bone `{name}`: max rotation angle {value} must be a non-negative number of degrees")]
    InvalidMaxRotationAngle { name: String, value: f32 },

    #[error("bone `{name}`: extent point must lie a positive distance from the bone origin")]
    InvalidExtent { name: String },

    #[error("bone `{name}`: forward direction is zero or not finite")]
    DegenerateForward { name: String },

    #[error("threshold `{field}` has invalid value {value}")]
    InvalidThreshold { field: String, value: f32 },

    #[error("no bone at index {index} (chain has {len})")]
    BoneIndexOutOfRange { index: usize, len: usize },

    #[error("bone name `{0}` is used more than once")]
    DuplicateName(String),

    #[error("bone `{bone}` names unknown parent `{parent}`")]
    UnknownParent { bone: String, parent: String },

    #[error("no root bone: every bone names a parent")]
    NoRoot,

    #[error("chain has several root bones: {}", .0.join(", "))]
    MultipleRoots(Vec<String>),

    #[error("bone `{parent}` has several children ({}); chains must not branch", .children.join(", "))]
    Branching { parent: String, children: Vec<String> },

    #[error("bones not reachable from the root (parent cycle): {}", .0.join(", "))]
    Unreachable(Vec<String>),
}

/// Failures while loading a [`Config`](crate::config::Config).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error(transparent)]
    Chain(#[from] ChainError),
}

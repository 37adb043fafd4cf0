use super::signal::ParentSignal;
use crate::math::{look_rotation, Transform};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Authoring data for one link of a chain.
///
/// `offset` and `forward` are expressed in the parent's frame (world frame for
/// the root). `extent`, when given, is a local-space point that replaces the
/// default `forward * extent_offset` tip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoneSettings {
    pub name: String,
    pub offset: Vec3,
    pub forward: Vec3,
    pub rotation_speed: f32,
    pub max_rotation_angle: f32,
    pub extent_offset: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<Vec3>,
}

impl Default for BoneSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            offset: Vec3::ZERO,
            forward: Vec3::NEG_Z,
            rotation_speed: 0.5,
            max_rotation_angle: 160.0,
            extent_offset: 1.0,
            extent: None,
        }
    }
}

impl BoneSettings {
    pub fn new(offset: Vec3) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn forward(mut self, forward: Vec3) -> Self {
        self.forward = forward;
        self
    }

    pub fn rotation_speed(mut self, rotation_speed: f32) -> Self {
        self.rotation_speed = rotation_speed;
        self
    }

    pub fn max_rotation_angle(mut self, degrees: f32) -> Self {
        self.max_rotation_angle = degrees;
        self
    }

    pub fn extent_offset(mut self, extent_offset: f32) -> Self {
        self.extent_offset = extent_offset;
        self
    }

    pub fn extent(mut self, extent: Vec3) -> Self {
        self.extent = Some(extent);
        self
    }

    pub(crate) fn extent_anchor(&self) -> Vec3 {
        self.extent.unwrap_or(Vec3::NEG_Z * self.extent_offset)
    }
}

/// One link of a [`Chain`](super::Chain).
///
/// Spatial state is kept twice: `local` relative to the parent bone and a
/// cached `world` transform the chain refreshes root to tip.
#[derive(Debug, Clone)]
pub struct Bone {
    pub(crate) name: String,
    pub(crate) local: Transform,
    pub(crate) world: Transform,
    pub(crate) rotation_speed: f32,
    pub(crate) max_rotation_angle: f32,
    pub(crate) rest_rotation: Quat,
    pub(crate) extent_anchor: Vec3,
    pub(crate) extent_point: Vec3,
    pub(crate) target: Option<Vec3>,
    pub(crate) target_reached: bool,
    pub(crate) signal: ParentSignal,
}

impl Bone {
    /// Local pose from authoring data. `rest_rotation` and the world pose are
    /// filled in when the chain is built.
    pub(crate) fn from_settings(settings: &BoneSettings) -> Option<Self> {
        let rotation = look_rotation(settings.forward, Vec3::Y)?;
        let local = Transform::from_position_rotation(settings.offset, rotation);

        Some(Self {
            name: settings.name.clone(),
            local,
            world: local,
            rotation_speed: settings.rotation_speed,
            max_rotation_angle: settings.max_rotation_angle,
            rest_rotation: rotation,
            extent_anchor: settings.extent_anchor(),
            extent_point: local.transform_point(settings.extent_anchor()),
            target: None,
            target_reached: false,
            signal: ParentSignal::FREE,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Vec3 {
        self.world.position
    }

    pub fn rotation(&self) -> Quat {
        self.world.rotation
    }

    pub fn forward(&self) -> Vec3 {
        self.world.forward()
    }

    pub fn world_transform(&self) -> Transform {
        self.world
    }

    pub fn local_transform(&self) -> Transform {
        self.local
    }

    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    /// Degrees of total deviation allowed from `rest_rotation`.
    pub fn max_rotation_angle(&self) -> f32 {
        self.max_rotation_angle
    }

    /// World orientation captured when the chain was built.
    pub fn rest_rotation(&self) -> Quat {
        self.rest_rotation
    }

    /// Degrees between the live orientation and the rest orientation.
    pub fn rotation_from_rest(&self) -> f32 {
        let dot = self.rest_rotation.dot(self.world.rotation).abs().min(1.0);
        (2.0 * dot.acos()).to_degrees()
    }

    pub fn extent_point(&self) -> Vec3 {
        self.extent_point
    }

    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    pub fn target_reached(&self) -> bool {
        self.target_reached
    }

    /// Signal pair last written into this bone by its child.
    pub fn signal(&self) -> ParentSignal {
        self.signal
    }

    pub fn restrict_parent(&self) -> bool {
        self.signal.restrict
    }

    pub fn retract_arm(&self) -> bool {
        self.signal.retract
    }

    pub(crate) fn live_extent_point(&self) -> Vec3 {
        self.world.transform_point(self.extent_anchor)
    }
}

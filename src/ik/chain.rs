use super::bone::{Bone, BoneSettings};
use crate::error::{ChainError, Result};
use crate::math::Transform;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Geometric thresholds used by the negotiation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Extent-to-target distance at or below which a target counts as reached.
    pub reach_distance: f32,
    /// A tip is aligned with its target when `dot(forward, dir) >= alignment_dot`.
    pub alignment_dot: f32,
    /// Target and extent are collinear from the bone origin at or above this dot.
    pub collinear_dot: f32,
}

impl Thresholds {
    /// Distances must be finite and non-negative, dot products within [-1, 1].
    pub fn validate(&self) -> Result<()> {
        let invalid = |field: &str, value: f32| ChainError::InvalidThreshold {
            field: field.to_string(),
            value,
        };

        if !self.reach_distance.is_finite() || self.reach_distance < 0.0 {
            return Err(invalid("reach_distance", self.reach_distance));
        }
        if !(-1.0..=1.0).contains(&self.alignment_dot) {
            return Err(invalid("alignment_dot", self.alignment_dot));
        }
        if !(-1.0..=1.0).contains(&self.collinear_dot) {
            return Err(invalid("collinear_dot", self.collinear_dot));
        }
        Ok(())
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            reach_distance: 0.5,
            alignment_dot: 0.97,
            collinear_dot: 0.98,
        }
    }
}

/// A single linear chain of bones ordered root to tip.
///
/// The parent of bone `i` is `i - 1` and its child is `i + 1`, so the shape is
/// linear with exactly one root and one tip by construction.
#[derive(Debug, Clone)]
pub struct Chain {
    pub(crate) bones: Vec<Bone>,
    pub(crate) thresholds: Thresholds,
    pub(crate) frame: u64,
}

impl Chain {
    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    pub fn bone(&self, index: usize) -> Result<&Bone> {
        self.bones.get(index).ok_or(ChainError::BoneIndexOutOfRange {
            index,
            len: self.bones.len(),
        })
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn root(&self) -> &Bone {
        &self.bones[0]
    }

    pub fn tip(&self) -> &Bone {
        &self.bones[self.bones.len() - 1]
    }

    pub fn tip_index(&self) -> usize {
        self.bones.len() - 1
    }

    pub fn parent_of(&self, index: usize) -> Option<usize> {
        index.checked_sub(1).filter(|&i| i < self.bones.len())
    }

    pub fn child_of(&self, index: usize) -> Option<usize> {
        Some(index + 1).filter(|&i| i < self.bones.len())
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Number of completed negotiation steps.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.bones.iter().map(|b| b.position())
    }

    pub fn find(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    /// Points every bone at the same shared target.
    pub fn set_target(&mut self, target: Option<Vec3>) {
        for bone in &mut self.bones {
            bone.target = target;
        }
    }

    pub fn set_bone_target(&mut self, index: usize, target: Option<Vec3>) -> Result<()> {
        self.check_index(index)?;
        self.bones[index].target = target;
        Ok(())
    }

    /// Host-side pose edit: sets a bone's world orientation and carries its
    /// descendants along. The rest orientation is left untouched.
    pub fn set_bone_rotation(&mut self, index: usize, rotation: Quat) -> Result<()> {
        self.check_index(index)?;
        self.apply_world_rotation(index, rotation);
        self.refresh_from(index + 1);
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.bones.len() {
            Ok(())
        } else {
            Err(ChainError::BoneIndexOutOfRange {
                index,
                len: self.bones.len(),
            })
        }
    }

    fn parent_world(&self, index: usize) -> Transform {
        match self.parent_of(index) {
            Some(parent) => self.bones[parent].world,
            None => Transform::IDENTITY,
        }
    }

    /// Recomputes one bone's world transform from its parent's live transform.
    pub(crate) fn refresh_world(&mut self, index: usize) {
        let parent = self.parent_world(index);
        let bone = &mut self.bones[index];
        bone.world = parent.mul_transform(&bone.local);
        bone.extent_point = bone.live_extent_point();
    }

    pub(crate) fn refresh_from(&mut self, start: usize) {
        for index in start..self.bones.len() {
            self.refresh_world(index);
        }
    }

    /// Writes a world orientation back into the bone's local transform.
    pub(crate) fn apply_world_rotation(&mut self, index: usize, rotation: Quat) {
        let parent = self.parent_world(index);
        let bone = &mut self.bones[index];
        bone.local.rotation = parent.local_rotation_for(rotation);
        bone.world = parent.mul_transform(&bone.local);
        bone.extent_point = bone.live_extent_point();
    }
}

pub struct ChainBuilder {
    bones: Vec<BoneSettings>,
    target: Option<Vec3>,
    thresholds: Thresholds,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self {
            bones: Vec::new(),
            target: None,
            thresholds: Thresholds::default(),
        }
    }

    /// Appends a bone; the previous bone becomes its parent.
    pub fn bone(mut self, settings: BoneSettings) -> Self {
        self.bones.push(settings);
        self
    }

    pub fn bones(mut self, settings: impl IntoIterator<Item = BoneSettings>) -> Self {
        self.bones.extend(settings);
        self
    }

    pub fn target(mut self, target: Vec3) -> Self {
        self.target = Some(target);
        self
    }

    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn reach_distance(mut self, reach_distance: f32) -> Self {
        self.thresholds.reach_distance = reach_distance;
        self
    }

    /// Validates the bones, computes world poses and captures each bone's rest
    /// orientation and extent anchor.
    pub fn build(self) -> Result<Chain> {
        if self.bones.is_empty() {
            return Err(ChainError::Empty);
        }
        self.thresholds.validate()?;

        let mut bones = Vec::with_capacity(self.bones.len());
        for (index, settings) in self.bones.iter().enumerate() {
            let mut settings = settings.clone();
            if settings.name.is_empty() {
                settings.name = format!("bone{index}");
            }
            Self::validate(&settings)?;

            let mut bone = Bone::from_settings(&settings).ok_or_else(|| {
                ChainError::DegenerateForward {
                    name: settings.name.clone(),
                }
            })?;
            bone.target = self.target;
            bones.push(bone);
        }

        let mut chain = Chain {
            bones,
            thresholds: self.thresholds,
            frame: 0,
        };
        chain.refresh_from(0);

        for bone in &mut chain.bones {
            bone.rest_rotation = bone.world.rotation;
        }

        log::debug!(
            "built chain of {} bones: {}",
            chain.bones.len(),
            chain.bones.iter().map(|b| b.name.as_str()).collect::<Vec<_>>().join(" -> ")
        );

        Ok(chain)
    }

    fn validate(settings: &BoneSettings) -> Result<()> {
        let name = || settings.name.clone();

        if !(0.0..=1.0).contains(&settings.rotation_speed) {
            return Err(ChainError::InvalidRotationSpeed {
                name: name(),
                value: settings.rotation_speed,
            });
        }

        if !settings.max_rotation_angle.is_finite() || settings.max_rotation_angle < 0.0 {
            return Err(ChainError::InvalidMaxRotationAngle {
                name: name(),
                value: settings.max_rotation_angle,
            });
        }

        let extent_ok = match settings.extent {
            Some(extent) => extent.is_finite() && extent.length_squared() > 0.0,
            None => settings.extent_offset.is_finite() && settings.extent_offset > 0.0,
        };
        if !extent_ok {
            return Err(ChainError::InvalidExtent { name: name() });
        }

        if !settings.forward.is_finite() || !settings.offset.is_finite() {
            return Err(ChainError::DegenerateForward { name: name() });
        }

        Ok(())
    }
}

impl Default for ChainBuilder {
    fn default() -> Self {
        Self::new()
    }
}

use super::bone::Bone;
use super::chain::Chain;
use super::signal::{ParentSignal, SignalState};
use crate::error::Result;
use crate::math::look_rotation;
use glam::Vec3;

/// Which gate decided a bone's rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationOutcome {
    /// The child already reached the target.
    HeldForChild,
    /// The child asked this bone to hold still.
    Restricted,
    NoTarget,
    /// The bone has used up its range of motion since the rest pose.
    RangeExhausted,
    Approached,
    Retracted,
    /// Target coincides with the bone origin; no direction to look along.
    Degenerate,
}

impl RotationOutcome {
    pub fn rotated(self) -> bool {
        matches!(self, Self::Approached | Self::Retracted)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub frame: u64,
    pub outcomes: Vec<RotationOutcome>,
    pub tip_reached: bool,
}

pub struct NegotiationSolver;

impl NegotiationSolver {
    /// Advances the chain by one frame.
    ///
    /// Bones are visited root to tip. A parent therefore always runs before the
    /// child that writes into it, so every read of a neighbour sees the value
    /// committed on the previous frame and signals climb one link per frame.
    pub fn step(chain: &mut Chain, delta_time: f32) -> StepResult {
        let mut outcomes = Vec::with_capacity(chain.bones.len());

        for index in 0..chain.bones.len() {
            chain.refresh_world(index);
            Self::check_target_at(chain, index);
            Self::notify_parent_at(chain, index);
            outcomes.push(Self::rotate_toward_target_at(chain, index, delta_time));
        }

        chain.frame += 1;
        StepResult {
            frame: chain.frame,
            outcomes,
            tip_reached: chain.tip().target_reached,
        }
    }

    /// Refreshes the extent point and the target-reached flag of one bone.
    pub fn check_target(chain: &mut Chain, index: usize) -> Result<bool> {
        chain.bone(index)?;
        Ok(Self::check_target_at(chain, index))
    }

    /// Writes this bone's signal pair into its parent. Returns the pair written,
    /// or `None` when the parent was left untouched.
    pub fn notify_parent(chain: &mut Chain, index: usize) -> Result<Option<ParentSignal>> {
        chain.bone(index)?;
        Ok(Self::notify_parent_at(chain, index))
    }

    pub fn rotate_toward_target(
        chain: &mut Chain,
        index: usize,
        delta_time: f32,
    ) -> Result<RotationOutcome> {
        chain.bone(index)?;
        Ok(Self::rotate_toward_target_at(chain, index, delta_time))
    }

    /// True once the bone has turned `max_rotation_angle` degrees away from its
    /// rest orientation, in any direction. The rest orientation never resets.
    pub fn is_rotation_restricted(bone: &Bone) -> bool {
        bone.rotation_from_rest() >= bone.max_rotation_angle
    }

    /// True when a childless bone points at the target but the target lies
    /// closer than its own extent, so the extent can never touch it.
    pub fn missed_target(chain: &Chain, index: usize) -> Result<bool> {
        chain.bone(index)?;
        Ok(Self::missed_target_at(chain, index))
    }

    fn check_target_at(chain: &mut Chain, index: usize) -> bool {
        let reach_distance = chain.thresholds.reach_distance;
        let bone = &mut chain.bones[index];
        bone.extent_point = bone.live_extent_point();

        let Some(target) = bone.target else {
            return bone.target_reached;
        };

        let reached = bone.extent_point.distance(target) <= reach_distance;
        if reached {
            log::debug!("{}: target reached", bone.name);
        }
        bone.target_reached = reached;
        reached
    }

    fn notify_parent_at(chain: &mut Chain, index: usize) -> Option<ParentSignal> {
        let parent = chain.parent_of(index)?;

        let signal = match chain.child_of(index) {
            Some(child) => Some(Self::relay_child_signal(
                chain.bones[child].target_reached,
                chain.bones[index].signal,
            )),
            None => Self::tip_signal(chain, index),
        };

        if let Some(signal) = signal {
            log::debug!(
                "{} -> {}: restrict={} retract={}",
                chain.bones[index].name,
                chain.bones[parent].name,
                signal.restrict,
                signal.retract
            );
            chain.bones[parent].signal = signal;
        }
        signal
    }

    /// A bone with a child forwards what its child asked of it.
    fn relay_child_signal(child_reached: bool, incoming: ParentSignal) -> ParentSignal {
        if child_reached || incoming.restrict {
            if incoming.retract {
                ParentSignal::RETRACT
            } else {
                ParentSignal::RESTRICT
            }
        } else {
            ParentSignal::new(false, incoming.retract)
        }
    }

    /// The tip decides from geometry. The two guards are checked separately; a
    /// state matching neither leaves the parent's signals as they were.
    fn tip_signal(chain: &Chain, index: usize) -> Option<ParentSignal> {
        let thresholds = chain.thresholds;
        let bone = &chain.bones[index];
        let target = bone.target?;

        let dir_to_target = (target - bone.position()).normalize_or_zero();
        let alignment = bone.forward().dot(dir_to_target);
        let restricted = Self::is_rotation_restricted(bone);
        let misaligned = alignment < thresholds.alignment_dot;
        let retract = Self::missed_target_at(chain, index);

        log::trace!(
            "{}: alignment={alignment:.3} restricted={restricted} reached={}",
            bone.name,
            bone.target_reached
        );

        if bone.target_reached || restricted || misaligned {
            Some(ParentSignal::new(true, retract))
        } else if !bone.target_reached && (restricted || !misaligned) {
            Some(ParentSignal::new(false, retract))
        } else {
            log::trace!("{}: no tip guard matched, parent signals left as is", bone.name);
            None
        }
    }

    fn missed_target_at(chain: &Chain, index: usize) -> bool {
        if chain.child_of(index).is_some() {
            return false;
        }

        let bone = &chain.bones[index];
        let Some(target) = bone.target else {
            return false;
        };

        let origin = bone.position();
        let target_distance = origin.distance(target);
        let extent_distance = origin.distance(bone.extent_point);

        let to_target = (target - origin).normalize_or_zero();
        let to_extent = (bone.extent_point - origin).normalize_or_zero();
        let dot = to_target.dot(to_extent);

        if dot < chain.thresholds.collinear_dot {
            log::trace!("{}: not looking at target", bone.name);
            return false;
        }

        let missed = target_distance < extent_distance;
        if missed {
            log::debug!("{}: missed target", bone.name);
        }
        missed
    }

    fn rotate_toward_target_at(chain: &mut Chain, index: usize, delta_time: f32) -> RotationOutcome {
        if let Some(child) = chain.child_of(index) {
            if chain.bones[child].target_reached {
                log::debug!("{}: target reached by child, holding", chain.bones[index].name);
                return RotationOutcome::HeldForChild;
            }
        }

        let bone = &chain.bones[index];
        let state = bone.signal.state();
        if state == SignalState::Restricted {
            log::debug!("{}: restricted by child", bone.name);
            return RotationOutcome::Restricted;
        }

        let Some(target) = bone.target else {
            return RotationOutcome::NoTarget;
        };

        if Self::is_rotation_restricted(bone) {
            log::debug!(
                "{}: rotation restricted ({:.1} of {:.1} degrees)",
                bone.name,
                bone.rotation_from_rest(),
                bone.max_rotation_angle
            );
            return RotationOutcome::RangeExhausted;
        }

        let (direction, outcome) = match state {
            SignalState::Retracting => {
                log::debug!("{}: retracting", bone.name);
                (bone.position() - target, RotationOutcome::Retracted)
            }
            _ => (target - bone.position(), RotationOutcome::Approached),
        };

        let Some(look) = look_rotation(direction, Vec3::Y) else {
            return RotationOutcome::Degenerate;
        };

        let t = (bone.rotation_speed * delta_time).clamp(0.0, 1.0);
        if t > 0.0 {
            let rotation = bone.world.rotation.slerp(look, t);
            chain.apply_world_rotation(index, rotation);
        }
        outcome
    }
}

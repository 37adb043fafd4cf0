use glam::{Mat3, Quat, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Forward axis in world space. Bones look down `-Z`.
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation * point + self.position
    }

    /// Composes this (parent, world space) transform with a child's local one.
    pub fn mul_transform(&self, local: &Self) -> Self {
        Self {
            position: self.transform_point(local.position),
            rotation: (self.rotation * local.rotation).normalize(),
        }
    }

    /// Rotation that, applied under this transform, yields `world_rotation`.
    pub fn local_rotation_for(&self, world_rotation: Quat) -> Quat {
        (self.rotation.inverse() * world_rotation).normalize()
    }
}

/// Orientation whose forward axis (`-Z`) points along `direction`.
///
/// Returns `None` for a zero-length direction. When `direction` is parallel to
/// `up` another world axis is used to build the basis.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Option<Quat> {
    let forward = direction.try_normalize()?;

    let mut right = forward.cross(up);
    if right.length_squared() < 1e-6 {
        right = forward.cross(Vec3::X);
        if right.length_squared() < 1e-6 {
            right = forward.cross(Vec3::Z);
        }
    }
    let right = right.normalize();
    let corrected_up = right.cross(forward);

    Some(Quat::from_mat3(&Mat3::from_cols(right, corrected_up, -forward)).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_look_rotation_points_forward_axis() {
        for dir in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::new(1.0, 2.0, -3.0)] {
            let rotation = look_rotation(dir, Vec3::Y).unwrap();
            let forward = Transform::from_position_rotation(Vec3::ZERO, rotation).forward();
            assert!(forward.abs_diff_eq(dir.normalize(), 1e-5), "{dir:?} -> {forward:?}");
        }
    }

    #[test]
    fn test_look_rotation_parallel_to_up() {
        let rotation = look_rotation(Vec3::Y, Vec3::Y).unwrap();
        assert!((rotation * Vec3::NEG_Z).abs_diff_eq(Vec3::Y, 1e-5));
    }

    #[test]
    fn test_look_rotation_zero_direction() {
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_compose_and_local_rotation() {
        let parent = Transform::from_position_rotation(
            Vec3::new(1.0, 0.0, 0.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        );
        let local = Transform::from_position(Vec3::new(0.0, 0.0, -1.0));
        let world = parent.mul_transform(&local);

        // -Z rotated a quarter turn about +Y is -X
        assert!(world.position.abs_diff_eq(Vec3::ZERO, 1e-5));
        assert!(world.forward().abs_diff_eq(Vec3::NEG_X, 1e-5));

        let wanted = Quat::from_rotation_x(0.3);
        let local_rot = parent.local_rotation_for(wanted);
        assert!((parent.rotation * local_rot).abs_diff_eq(wanted, 1e-5));
    }
}

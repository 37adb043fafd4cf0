use super::chain::Chain;
use glam::Vec3;

/// Radius of the wire sphere drawn at each extent point.
pub const EXTENT_GIZMO_RADIUS: f32 = 0.2;

/// Destination for debug primitives. Rendering backends live outside the crate.
pub trait GizmoSink {
    fn line(&mut self, from: Vec3, to: Vec3);
    fn wire_sphere(&mut self, center: Vec3, radius: f32);
}

/// Writes gizmo primitives to the log at trace level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogGizmos;

impl GizmoSink for LogGizmos {
    fn line(&mut self, from: Vec3, to: Vec3) {
        log::trace!("gizmo line {from} -> {to}");
    }

    fn wire_sphere(&mut self, center: Vec3, radius: f32) {
        log::trace!("gizmo sphere {center} r={radius}");
    }
}

impl Chain {
    /// Draws each bone's reach: a line to its extent point and a sphere on it.
    pub fn draw_gizmos<S: GizmoSink + ?Sized>(&self, sink: &mut S) {
        for bone in &self.bones {
            let extent = bone.live_extent_point();
            sink.line(bone.position(), extent);
            sink.wire_sphere(extent, EXTENT_GIZMO_RADIUS);
        }
    }
}

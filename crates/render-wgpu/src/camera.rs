use antler_render::CameraContext;
use glam::Mat4;

/// Perspective projection parameters owned by the host window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov: 60.0_f32.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    /// Track the surface size; a zero height keeps the previous aspect.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    /// Camera context for one frame seen through `view`.
    pub fn camera_context(&self, view: Mat4) -> CameraContext {
        CameraContext::new(self.matrix(), view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    #[test]
    fn default_projection_is_finite() {
        let m = Projection::default().matrix();
        assert!(m.is_finite());
    }

    #[test]
    fn viewport_sets_aspect() {
        let mut p = Projection::default();
        p.set_viewport(800, 400);
        assert_eq!(p.aspect, 2.0);
        p.set_viewport(800, 0);
        assert_eq!(p.aspect, 2.0);
    }

    #[test]
    fn near_plane_maps_to_zero_depth() {
        let p = Projection::default();
        let clip = p.matrix() * Vec4::new(0.0, 0.0, -p.near, 1.0);
        assert!((clip.z / clip.w).abs() < 1e-5);
        let clip = p.matrix() * Vec4::new(0.0, 0.0, -p.far, 1.0);
        assert!((clip.z / clip.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn camera_context_carries_view() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, -5.0, 1.0), Vec3::ZERO, Vec3::Z);
        let ctx = Projection::default().camera_context(view);
        assert_eq!(ctx.view, view);
        assert_eq!(ctx.projection, Projection::default().matrix());
    }
}

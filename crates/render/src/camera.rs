use crate::gpu::GpuContext;
use glam::Mat4;

/// Externally maintained projection and view matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraContext {
    pub projection: Mat4,
    pub view: Mat4,
}

impl Default for CameraContext {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
        }
    }
}

impl CameraContext {
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        Self { projection, view }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Everything a material needs besides the entity being drawn.
///
/// Threaded through the whole render traversal so the camera and the
/// shared GPU state are explicit parameters rather than ambient globals.
pub struct RenderContext<'a> {
    pub camera: &'a CameraContext,
    pub gpu: &'a mut dyn GpuContext,
}

impl<'a> RenderContext<'a> {
    pub fn new(camera: &'a CameraContext, gpu: &'a mut dyn GpuContext) -> Self {
        Self { camera, gpu }
    }
}

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::math::{perspective_rh, OrbitCamera};

/// Perspective parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_y_degrees: 65.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        perspective_rh(self.fov_y_degrees.to_radians(), aspect, self.near, self.far)
    }
}

/// Camera-derived values shared by every draw path in one frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameUniforms {
    pub view_projection: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
    pub inverse_projection: Mat4,
    pub inverse_view: Mat4,
    pub camera_position: Vec3,
    /// Surface size in physical pixels.
    pub viewport: Vec2,
}

impl FrameUniforms {
    /// Derives all matrices from the camera and the current surface size.
    ///
    /// `viewport` must be non-zero in both dimensions.
    pub fn new(camera: &OrbitCamera, projection: &Projection, viewport: Vec2) -> Self {
        let aspect = viewport.x / viewport.y;
        let projection = projection.matrix(aspect);
        let view = camera.view();

        Self {
            view_projection: projection * view,
            view,
            projection,
            inverse_projection: projection.inverse(),
            inverse_view: view.inverse(),
            camera_position: camera.eye(),
            viewport,
        }
    }

    pub fn to_gpu(&self) -> FrameUniformsGpu {
        FrameUniformsGpu {
            view_projection: self.view_projection.to_cols_array_2d(),
            view: self.view.to_cols_array_2d(),
            projection: self.projection.to_cols_array_2d(),
            inverse_projection: self.inverse_projection.to_cols_array_2d(),
            inverse_view: self.inverse_view.to_cols_array_2d(),
            camera_position: self.camera_position.extend(1.0).to_array(),
            viewport: [
                self.viewport.x,
                self.viewport.y,
                1.0 / self.viewport.x,
                1.0 / self.viewport.y,
            ],
        }
    }
}

/// GPU layout of [`FrameUniforms`] (352 bytes, `FrameUniforms` in the shaders).
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct FrameUniformsGpu {
    pub view_projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub inverse_projection: [[f32; 4]; 4],
    pub inverse_view: [[f32; 4]; 4],
    pub camera_position: [f32; 4],
    /// `(width, height, 1/width, 1/height)`.
    pub viewport: [f32; 4],
}

impl FrameUniformsGpu {
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn gpu_layout_is_352_bytes() {
        assert_eq!(FrameUniformsGpu::SIZE, 352);
        assert_eq!(FrameUniformsGpu::SIZE % 16, 0);
    }

    #[test]
    fn view_projection_is_projection_times_view() {
        let mut cam = OrbitCamera::new(15.0);
        cam.advance(0.7);
        let u = FrameUniforms::new(&cam, &Projection::default(), Vec2::new(1920.0, 1080.0));
        assert!(u.view_projection.abs_diff_eq(u.projection * u.view, 1e-6));
        assert!((u.inverse_view * u.view).abs_diff_eq(Mat4::IDENTITY, 1e-4));
        assert!((u.inverse_projection * u.projection).abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    fn aspect_comes_from_viewport() {
        let cam = OrbitCamera::new(15.0);
        let u = FrameUniforms::new(&cam, &Projection::default(), Vec2::new(1600.0, 900.0));
        // x scale = y scale / aspect
        assert_abs_diff_eq!(
            u.projection.x_axis.x,
            u.projection.y_axis.y * 900.0 / 1600.0,
            epsilon = 1e-6
        );
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let mut cam = OrbitCamera::new(15.0);
        cam.advance(1.234);
        let u = FrameUniforms::new(&cam, &Projection::default(), Vec2::new(800.0, 600.0));
        let ndc = u.view_projection.project_point3(Vec3::ZERO);
        assert_abs_diff_eq!(ndc.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ndc.y, 0.0, epsilon = 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn gpu_copy_carries_reciprocal_viewport() {
        let cam = OrbitCamera::new(15.0);
        let u = FrameUniforms::new(&cam, &Projection::default(), Vec2::new(200.0, 100.0));
        let g = u.to_gpu();
        assert_eq!(g.viewport, [200.0, 100.0, 0.005, 0.01]);
        assert_eq!(g.camera_position, [0.0, 0.0, 15.0, 1.0]);
    }
}

use bytemuck::{Pod, Zeroable};

use crate::math::normal_matrix;
use crate::scene::Scene;

/// Per-object record consumed by the instanced and mesh-shader paths.
///
/// Layout (144 bytes, `InstanceRecord` in the shaders):
///
///  offset   0  model   mat4x4<f32>   vertex locs 2..=5
///  offset  64  normal  mat4x4<f32>   vertex locs 6..=9
///  offset 128  color   vec4<f32>     vertex loc 10
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceRecord {
    pub model: [[f32; 4]; 4],
    /// `transpose(inverse(model))`.
    pub normal: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl InstanceRecord {
    pub const STRIDE: u64 = std::mem::size_of::<Self>() as u64;

    const ATTRS: [wgpu::VertexAttribute; 9] = wgpu::vertex_attr_array![
        2 => Float32x4, 3 => Float32x4, 4 => Float32x4, 5 => Float32x4,   // model
        6 => Float32x4, 7 => Float32x4, 8 => Float32x4, 9 => Float32x4,   // normal
        10 => Float32x4                                                   // color
    ];

    /// Per-instance vertex buffer layout for the instanced path (slot 1).
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: Self::STRIDE,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

/// Flattened per-sphere arrays for the ray-intersect path.
///
/// Positions are padded to `vec4` to match WGSL's `array<vec3<f32>>` stride.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SphereArrays {
    pub positions: Vec<[f32; 4]>,
    pub radii: Vec<f32>,
    pub colors: Vec<[f32; 4]>,
}

/// Everything uploaded to the GPU once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceData {
    pub records: Vec<InstanceRecord>,
    pub spheres: SphereArrays,
}

impl InstanceData {
    /// Derives GPU records from the scene's objects.
    ///
    /// Pure and deterministic: the same scene always produces identical bytes.
    pub fn build(scene: &Scene) -> Self {
        let count = scene.object_count();
        let mut records = Vec::with_capacity(count);
        let mut spheres = SphereArrays {
            positions: Vec::with_capacity(count),
            radii: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
        };

        for obj in scene.objects() {
            let color = obj.material.color.to_array();

            records.push(InstanceRecord {
                model: obj.transform.to_cols_array_2d(),
                normal: normal_matrix(obj.transform).to_cols_array_2d(),
                color,
            });

            spheres.positions.push(obj.position().extend(1.0).to_array());
            spheres.radii.push(obj.radius());
            spheres.colors.push(color);
        }

        Self { records, spheres }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }

    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.spheres.positions)
    }

    pub fn radius_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.spheres.radii)
    }

    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.spheres.colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{GridConfig, Renderable, SceneConfig};
    use glam::{Mat4, Quat, Vec3, Vec4};

    fn grid_scene(n: u32) -> Scene {
        grid_scene_with_radius(n, 1.0)
    }

    fn grid_scene_with_radius(n: u32, radius: f32) -> Scene {
        Scene::sphere_grid(&SceneConfig {
            grid: GridConfig { per_axis: n, radius, padding: 1.0 },
            ..SceneConfig::default()
        })
    }

    #[test]
    fn record_stride_is_144() {
        assert_eq!(InstanceRecord::STRIDE, 144);
    }

    #[test]
    fn two_per_axis_grid_buffers() {
        let data = InstanceData::build(&grid_scene(2));
        assert_eq!(data.len(), 8);
        assert_eq!(data.records.len(), 8);
        assert_eq!(data.spheres.positions.len(), 8);
        assert_eq!(data.spheres.radii.len(), 8);
        assert_eq!(data.spheres.colors.len(), 8);

        assert_eq!(data.record_bytes().len(), 8 * 144);
        assert_eq!(data.position_bytes().len(), 8 * 16);
        assert_eq!(data.radius_bytes().len(), 8 * 4);
        assert_eq!(data.color_bytes().len(), 8 * 16);
    }

    #[test]
    fn building_twice_is_byte_identical() {
        let scene = grid_scene(3);
        let a = InstanceData::build(&scene);
        let b = InstanceData::build(&scene);
        assert_eq!(a.record_bytes(), b.record_bytes());
        assert_eq!(a.position_bytes(), b.position_bytes());
        assert_eq!(a.radius_bytes(), b.radius_bytes());
        assert_eq!(a.color_bytes(), b.color_bytes());
    }

    #[test]
    fn normal_matrix_is_inverse_transpose_for_every_record() {
        let transforms = [
            Mat4::from_translation(Vec3::new(1.5, -1.5, 4.5)),
            Mat4::from_scale_rotation_translation(
                Vec3::new(2.0, 0.5, 3.0),
                Quat::from_euler(glam::EulerRot::XYZ, 0.3, -1.1, 2.0),
                Vec3::new(-7.0, 2.0, 0.25),
            ),
            Mat4::from_rotation_y(0.9) * Mat4::from_scale(Vec3::splat(4.0)),
        ];
        let objects = transforms
            .iter()
            .map(|t| Renderable::new(*t, Vec4::ONE))
            .collect();
        let data = InstanceData::build(&Scene::new(15.0, 0.01, objects));

        for rec in &data.records {
            let model = Mat4::from_cols_array_2d(&rec.model);
            let normal = Mat4::from_cols_array_2d(&rec.normal);
            assert!(normal.abs_diff_eq(model.inverse().transpose(), 1e-5));
            // transpose(normal) * model == identity on the linear part
            let check = normal.transpose() * model;
            let lin = glam::Mat3::from_mat4(check);
            assert!(lin.abs_diff_eq(glam::Mat3::IDENTITY, 1e-4), "{lin:?}");
        }
    }

    #[test]
    fn arrays_mirror_object_positions_and_colors() {
        let scene = grid_scene_with_radius(2, 0.75);
        let data = InstanceData::build(&scene);
        for (i, obj) in scene.objects().iter().enumerate() {
            let p = obj.position();
            assert_eq!(data.spheres.positions[i], [p.x, p.y, p.z, 1.0]);
            assert!((data.spheres.radii[i] - 0.75).abs() < 1e-6);
            assert_eq!(data.spheres.colors[i], obj.material.color.to_array());
            assert_eq!(data.records[i].color, obj.material.color.to_array());
        }
    }

    #[test]
    fn empty_scene_builds_empty_buffers() {
        let data = InstanceData::build(&Scene::new(15.0, 0.01, Vec::new()));
        assert!(data.is_empty());
        assert!(data.record_bytes().is_empty());
    }
}

use std::f32::consts::{PI, TAU};

use bytemuck::{Pod, Zeroable};

/// Interleaved sphere vertex (24 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl SphereVertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // normal
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// Indexed UV sphere centered on the origin.
///
/// Triangles wind counter-clockwise seen from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Builds a sphere with `segments` rings and `segments` slices.
    ///
    /// Each ring repeats its seam vertex so every quad has its own texture-free
    /// corner set; `(segments + 1)²` vertices, `segments² · 6` indices.
    /// `segments` is raised to at least 3.
    pub fn uv(segments: u32, radius: f32) -> Self {
        let seg = segments.max(3);
        let mut vertices = Vec::with_capacity(((seg + 1) * (seg + 1)) as usize);

        for ring in 0..=seg {
            // Polar angle from +Y (north pole) down to -Y.
            let theta = ring as f32 / seg as f32 * PI;
            let (st, ct) = theta.sin_cos();
            for slice in 0..=seg {
                let phi = slice as f32 / seg as f32 * TAU;
                let (sp, cp) = phi.sin_cos();
                let n = [st * sp, ct, st * cp];
                vertices.push(SphereVertex {
                    position: [n[0] * radius, n[1] * radius, n[2] * radius],
                    normal: n,
                });
            }
        }

        let row = seg + 1;
        let mut indices = Vec::with_capacity((seg * seg * 6) as usize);
        for ring in 0..seg {
            for slice in 0..seg {
                let a = ring * row + slice;
                let b = a + row;
                // a ── a+1
                // │     │
                // b ── b+1
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }

        Self { vertices, indices }
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::Vec3;

    #[test]
    fn counts_for_lod_14() {
        let m = SphereMesh::uv(14, 1.0);
        assert_eq!(m.vertices.len(), 15 * 15);
        assert_eq!(m.index_count(), 14 * 14 * 6);
        assert!(m.indices.iter().all(|&i| (i as usize) < m.vertices.len()));
    }

    #[test]
    fn vertices_lie_on_radius_with_unit_normals() {
        let m = SphereMesh::uv(14, 2.5);
        for v in &m.vertices {
            let p = Vec3::from_array(v.position);
            let n = Vec3::from_array(v.normal);
            assert_abs_diff_eq!(p.length(), 2.5, epsilon = 1e-5);
            assert_abs_diff_eq!(n.length(), 1.0, epsilon = 1e-5);
            assert!(p.normalize().abs_diff_eq(n, 1e-5));
        }
    }

    #[test]
    fn non_degenerate_triangles_face_outward() {
        let m = SphereMesh::uv(8, 1.0);
        let mut checked = 0;
        for tri in m.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(m.vertices[i as usize].position));
            let n = (b - a).cross(c - a);
            if n.length() < 1e-6 {
                continue; // pole fan collapses one edge
            }
            let centroid = (a + b + c) / 3.0;
            assert!(n.dot(centroid) > 0.0, "inward triangle {tri:?}");
            checked += 1;
        }
        assert!(checked > 0);
    }

    #[test]
    fn low_segment_counts_are_raised() {
        let m = SphereMesh::uv(1, 1.0);
        assert_eq!(m.vertices.len(), 16);
    }

    #[test]
    fn vertex_layout_stride() {
        assert_eq!(SphereVertex::layout().array_stride, 24);
    }
}

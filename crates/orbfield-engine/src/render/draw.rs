use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};

use super::pipelines::PipelineKind;
use super::uniforms::FrameUniforms;

/// Which sphere renderer a frame uses. Exactly one runs per frame.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum DrawPath {
    Instanced,
    RayIntersect,
    #[default]
    MeshShader,
}

impl DrawPath {
    pub fn pipeline(self) -> PipelineKind {
        match self {
            DrawPath::Instanced => PipelineKind::Instanced,
            DrawPath::RayIntersect => PipelineKind::RayIntersect,
            DrawPath::MeshShader => PipelineKind::MeshShader,
        }
    }
}

impl fmt::Display for DrawPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DrawPath::Instanced => "instanced",
            DrawPath::RayIntersect => "ray",
            DrawPath::MeshShader => "mesh",
        };
        f.write_str(s)
    }
}

impl FromStr for DrawPath {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mesh" | "mesh-shader" => Ok(DrawPath::MeshShader),
            "instanced" => Ok(DrawPath::Instanced),
            "ray" | "ray-intersect" => Ok(DrawPath::RayIntersect),
            other => bail!("unknown draw path `{other}` (expected mesh, instanced or ray)"),
        }
    }
}

/// Device limits on a single `draw_mesh_tasks` dispatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MeshDispatchLimits {
    /// Largest group count along any one dimension.
    pub per_dimension: u32,
    /// Largest product of the three group counts.
    pub total_groups: u32,
}

impl MeshDispatchLimits {
    pub fn from_limits(limits: &wgpu::Limits) -> Self {
        Self {
            per_dimension: limits.max_task_mesh_workgroups_per_dimension,
            total_groups: limits.max_task_mesh_workgroup_total_count,
        }
    }
}

/// Task-stage dispatch dimensions for the mesh-shader path.
///
/// One task group per object, laid out row-major; groups past the object
/// count (the tail of the last row) exit without spawning mesh work.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TaskGrid {
    pub groups: [u32; 3],
}

impl TaskGrid {
    /// Task threads per task group.
    pub const THREADS_PER_OBJECT_GROUP: u32 = 1;
    /// Mesh threads per mesh group: one per vertex of an 11×11 sphere lattice.
    pub const THREADS_PER_MESH_GROUP: u32 = 121;

    /// Folds `count` groups into rows no wider than `limits.per_dimension`.
    ///
    /// The result is not checked against the limits; see [`TaskGrid::checked`].
    pub fn for_objects(count: u32, limits: MeshDispatchLimits) -> Self {
        if count == 0 {
            return Self { groups: [0, 1, 1] };
        }
        let width = count.min(limits.per_dimension.max(1));
        let height = count.div_ceil(width);
        Self {
            groups: [width, height, 1],
        }
    }

    /// Like [`TaskGrid::for_objects`], but fails when the grid cannot be
    /// dispatched on a device with `limits`.
    pub fn checked(count: u32, limits: MeshDispatchLimits) -> Result<Self> {
        let grid = Self::for_objects(count, limits);
        let [x, y, z] = grid.groups;

        if x.max(y).max(z) > limits.per_dimension {
            bail!(
                "{count} objects need a {x}x{y}x{z} task grid; \
                 device allows {} groups per dimension",
                limits.per_dimension
            );
        }
        if grid.total_groups() > u64::from(limits.total_groups) {
            bail!(
                "{count} objects need {} task groups; device allows {} per dispatch",
                grid.total_groups(),
                limits.total_groups
            );
        }
        Ok(grid)
    }

    pub fn total_groups(&self) -> u64 {
        self.groups.iter().map(|&g| u64::from(g)).product()
    }
}

/// Static counts a draw strategy needs besides the per-frame uniforms.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawInputs {
    pub object_count: u32,
    pub sphere_index_count: u32,
    pub mesh_limits: MeshDispatchLimits,
}

/// Command sink for one render pass.
///
/// Resource-binding calls refer to buffers uploaded once at startup; only the
/// frame uniforms change from frame to frame.
pub trait DrawEncoder {
    fn set_pipeline(&mut self, kind: PipelineKind);
    fn bind_frame_uniforms(&mut self, uniforms: &FrameUniforms);
    /// Sphere mesh vertex + index buffers (instanced path).
    fn bind_sphere_mesh(&mut self);
    /// Instance records as a per-instance vertex buffer (instanced path).
    fn bind_instance_vertices(&mut self);
    /// Instance records as a storage buffer (mesh path).
    fn bind_instance_storage(&mut self);
    /// Flattened position / radius / color arrays (ray path).
    fn bind_sphere_arrays(&mut self);
    fn draw_indexed(&mut self, index_count: u32, instance_count: u32);
    fn draw(&mut self, vertex_count: u32, instance_count: u32);
    fn draw_mesh_tasks(&mut self, grid: TaskGrid);
}

/// Records `path`'s command sequence into `enc`.
pub fn encode(
    path: DrawPath,
    inputs: &DrawInputs,
    uniforms: &FrameUniforms,
    enc: &mut dyn DrawEncoder,
) {
    enc.set_pipeline(path.pipeline());
    enc.bind_frame_uniforms(uniforms);

    match path {
        DrawPath::Instanced => {
            enc.bind_sphere_mesh();
            enc.bind_instance_vertices();
            enc.draw_indexed(inputs.sphere_index_count, inputs.object_count);
        }
        DrawPath::RayIntersect => {
            enc.bind_sphere_arrays();
            // Billboard quad as a 4-vertex strip.
            enc.draw(4, inputs.object_count);
        }
        DrawPath::MeshShader => {
            enc.bind_instance_storage();
            enc.draw_mesh_tasks(TaskGrid::for_objects(inputs.object_count, inputs.mesh_limits));
        }
    }
}

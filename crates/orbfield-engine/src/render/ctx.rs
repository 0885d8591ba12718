use crate::device::Gpu;

use super::draw::MeshDispatchLimits;
use super::pipelines::TargetFormats;

/// Renderer-facing context (device/queue + attachment formats + dispatch limits).
///
/// This is intentionally small and stable.
pub struct RenderCtx<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub formats: TargetFormats,
    pub mesh_limits: MeshDispatchLimits,
}

impl<'a> RenderCtx<'a> {
    #[inline]
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        formats: TargetFormats,
        mesh_limits: MeshDispatchLimits,
    ) -> Self {
        Self {
            device,
            queue,
            formats,
            mesh_limits,
        }
    }

    pub fn from_gpu(gpu: &'a Gpu<'_>) -> Self {
        let targets = gpu.targets();
        Self::new(
            gpu.device(),
            gpu.queue(),
            TargetFormats {
                color: gpu.surface_format(),
                depth: targets.depth_format(),
                sample_count: targets.sample_count(),
            },
            MeshDispatchLimits::from_limits(&gpu.device().limits()),
        )
    }
}

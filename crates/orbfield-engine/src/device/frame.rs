/// Represents a single acquired frame.
///
/// This object is short-lived and must be finalized promptly. Holding the surface
/// texture prevents acquisition of subsequent frames. Dropping it without
/// [`Gpu::submit`](super::Gpu::submit) discards the frame.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    /// Single-sample swapchain view; the MSAA target resolves into it.
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

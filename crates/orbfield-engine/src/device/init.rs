/// Initialization parameters for the GPU layer.
///
/// Defaults match the sphere renderer: mesh shading on, 4× MSAA, 32-bit float
/// depth and a non-sRGB BGRA swapchain.
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Surface format to use when the surface supports it.
    ///
    /// Falls back to the first non-sRGB format, then to whatever comes first.
    pub preferred_format: Option<wgpu::TextureFormat>,

    /// Present mode (swap behavior).
    pub present_mode: wgpu::PresentMode,

    /// Optional alpha mode preference for the surface.
    ///
    /// If provided but unsupported on the current surface, a supported mode is selected.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    /// Required wgpu features.
    pub required_features: wgpu::Features,

    /// Limits requested from the device. `None` requests everything the adapter offers,
    /// which includes its mesh-shader output limits.
    pub required_limits: Option<wgpu::Limits>,

    /// Opt into wgpu's experimental features (mesh shading is one).
    pub experimental: bool,

    /// MSAA sample count of the color and depth targets.
    pub sample_count: u32,

    /// Depth buffer format.
    pub depth_format: wgpu::TextureFormat,

    /// Desired maximum frame latency for the surface.
    ///
    /// This value is a hint; support depends on platform/backend.
    pub desired_maximum_frame_latency: u32,
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            preferred_format: Some(wgpu::TextureFormat::Bgra8Unorm),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::EXPERIMENTAL_MESH_SHADER,
            required_limits: None,
            experimental: true,
            sample_count: 4,
            depth_format: wgpu::TextureFormat::Depth32Float,
            desired_maximum_frame_latency: 2,
        }
    }
}

/// Multisampled color + depth attachments sized to the surface.
///
/// The color target resolves into the swapchain image each frame. With a
/// sample count of 1 there is no separate color target and passes render
/// straight into the swapchain view.
pub struct RenderTargets {
    msaa_color: Option<wgpu::TextureView>,
    depth: wgpu::TextureView,
    color_format: wgpu::TextureFormat,
    depth_format: wgpu::TextureFormat,
    sample_count: u32,
    size: (u32, u32),
}

impl RenderTargets {
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        depth_format: wgpu::TextureFormat,
        sample_count: u32,
        width: u32,
        height: u32,
    ) -> Self {
        let size = (width.max(1), height.max(1));
        let sample_count = sample_count.max(1);

        let msaa_color = (sample_count > 1).then(|| {
            attachment(device, "orbfield msaa color", color_format, sample_count, size)
        });
        let depth = attachment(device, "orbfield depth", depth_format, sample_count, size);

        Self {
            msaa_color,
            depth,
            color_format,
            depth_format,
            sample_count,
            size,
        }
    }

    /// Recreates both attachments at the new size. Zero sizes are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size {
            return;
        }
        *self = Self::new(
            device,
            self.color_format,
            self.depth_format,
            self.sample_count,
            width,
            height,
        );
    }

    /// `(view, resolve_target)` for a color attachment drawing into `surface_view`.
    pub fn color_attachment<'a>(
        &'a self,
        surface_view: &'a wgpu::TextureView,
    ) -> (&'a wgpu::TextureView, Option<&'a wgpu::TextureView>) {
        match &self.msaa_color {
            Some(msaa) => (msaa, Some(surface_view)),
            None => (surface_view, None),
        }
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth_format
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }
}

fn attachment(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    sample_count: u32,
    (width, height): (u32, u32),
) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

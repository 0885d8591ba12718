use winit::window::Window;

use crate::device::{Gpu, GpuFrame, SurfaceErrorAction};

use super::controller::{FrameBackend, FrameSkip};
use super::draw::{DrawEncoder, TaskGrid};
use super::pipelines::{PipelineKind, PipelineRegistry};
use super::resources::GpuScene;
use super::uniforms::FrameUniforms;

/// [`FrameBackend`] over a live wgpu surface.
///
/// Borrowed for the duration of one draw; holds nothing across frames.
pub struct WgpuBackend<'a, 'w> {
    gpu: &'a mut Gpu<'w>,
    window: &'a Window,
    registry: &'a PipelineRegistry,
    resources: &'a GpuScene,
    clear_color: wgpu::Color,
}

impl<'a, 'w> WgpuBackend<'a, 'w> {
    pub fn new(
        gpu: &'a mut Gpu<'w>,
        window: &'a Window,
        registry: &'a PipelineRegistry,
        resources: &'a GpuScene,
        clear_color: wgpu::Color,
    ) -> Self {
        Self {
            gpu,
            window,
            registry,
            resources,
            clear_color,
        }
    }
}

impl FrameBackend for WgpuBackend<'_, '_> {
    type Frame = GpuFrame;

    fn surface_size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }

    fn begin_frame(&mut self) -> Result<GpuFrame, FrameSkip> {
        self.gpu.begin_frame().map_err(|err| {
            log::debug!("surface error: {err}");
            match self.gpu.handle_surface_error(err) {
                SurfaceErrorAction::Reconfigured => FrameSkip::SurfaceReconfigured,
                SurfaceErrorAction::SkipFrame => FrameSkip::DrawableUnavailable,
                SurfaceErrorAction::Fatal => FrameSkip::Fatal,
            }
        })
    }

    fn record(
        &mut self,
        frame: &mut GpuFrame,
        slot: usize,
        commands: &mut dyn FnMut(&mut dyn DrawEncoder),
    ) {
        let targets = self.gpu.targets();
        let (view, resolve_target) = targets.color_attachment(&frame.view);

        // Only the resolved image outlives the pass.
        let color_store = if resolve_target.is_some() {
            wgpu::StoreOp::Discard
        } else {
            wgpu::StoreOp::Store
        };

        let mut pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("orbfield spheres"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(self.clear_color),
                    store: color_store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: targets.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        let mut encoder = WgpuEncoder {
            pass: &mut pass,
            registry: self.registry,
            resources: self.resources,
            queue: self.gpu.queue(),
            slot,
        };
        commands(&mut encoder);
    }

    fn submit(&mut self, frame: GpuFrame, on_complete: Box<dyn FnOnce() + Send + 'static>) {
        self.window.pre_present_notify();
        self.gpu.submit(frame, on_complete);
    }

    fn poll_completions(&mut self) {
        self.gpu.poll();
    }
}

/// [`DrawEncoder`] writing into an open render pass.
struct WgpuEncoder<'a, 'p> {
    pass: &'a mut wgpu::RenderPass<'p>,
    registry: &'a PipelineRegistry,
    resources: &'a GpuScene,
    queue: &'a wgpu::Queue,
    slot: usize,
}

impl DrawEncoder for WgpuEncoder<'_, '_> {
    fn set_pipeline(&mut self, kind: PipelineKind) {
        self.pass.set_pipeline(self.registry.pipeline(kind));
    }

    fn bind_frame_uniforms(&mut self, uniforms: &FrameUniforms) {
        let group = self.resources.write_uniforms(self.queue, self.slot, uniforms);
        self.pass.set_bind_group(0, group, &[]);
    }

    fn bind_sphere_mesh(&mut self) {
        self.pass
            .set_vertex_buffer(0, self.resources.sphere_vertices().slice(..));
        self.pass.set_index_buffer(
            self.resources.sphere_indices().slice(..),
            wgpu::IndexFormat::Uint32,
        );
    }

    fn bind_instance_vertices(&mut self) {
        self.pass
            .set_vertex_buffer(1, self.resources.instances().slice(..));
    }

    fn bind_instance_storage(&mut self) {
        self.pass
            .set_bind_group(1, self.resources.instances_group(), &[]);
    }

    fn bind_sphere_arrays(&mut self) {
        self.pass
            .set_bind_group(1, self.resources.spheres_group(), &[]);
    }

    fn draw_indexed(&mut self, index_count: u32, instance_count: u32) {
        self.pass
            .draw_indexed(0..index_count, 0, 0..instance_count);
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32) {
        self.pass.draw(0..vertex_count, 0..instance_count);
    }

    fn draw_mesh_tasks(&mut self, grid: TaskGrid) {
        let [x, y, z] = grid.groups;
        self.pass.draw_mesh_tasks(x, y, z);
    }
}

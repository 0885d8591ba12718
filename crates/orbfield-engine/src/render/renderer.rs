use anyhow::{Context, Result};
use winit::window::Window;

use crate::device::Gpu;
use crate::scene::Scene;

use super::controller::{DrawOutcome, FrameController, RenderConfig};
use super::ctx::RenderCtx;
use super::draw::{DrawInputs, TaskGrid};
use super::instances::InstanceData;
use super::pipelines::{PipelineRegistry, ShaderSet};
use super::resources::GpuScene;
use super::sphere_mesh::SphereMesh;
use super::wgpu_backend::WgpuBackend;

/// Pipelines, uploaded buffers and the frame controller for one surface.
pub struct SphereRenderer {
    registry: PipelineRegistry,
    resources: GpuScene,
    controller: FrameController,
}

impl SphereRenderer {
    /// Compiles all pipelines and uploads the scene. Any failure here is fatal.
    pub fn new(gpu: &Gpu<'_>, scene: Scene, config: RenderConfig) -> Result<Self> {
        let ctx = RenderCtx::from_gpu(gpu);

        let shaders = ShaderSet::builtin().context("failed to load sphere shaders")?;
        let registry = PipelineRegistry::build(ctx.device, &shaders, ctx.formats)
            .context("failed to build sphere pipelines")?;

        let data = InstanceData::build(&scene);
        // Unit sphere: each model matrix carries the grid radius.
        let mesh = SphereMesh::uv(config.sphere_segments, 1.0);
        let resources = GpuScene::upload(
            &ctx,
            registry.layouts(),
            &data,
            &mesh,
            config.max_frames_in_flight,
        );

        let grid = TaskGrid::checked(resources.object_count(), ctx.mesh_limits)
            .context("scene does not fit one mesh-shader dispatch")?;
        log::info!("mesh task grid {:?}", grid.groups);

        let inputs = DrawInputs {
            object_count: resources.object_count(),
            sphere_index_count: resources.sphere_index_count(),
            mesh_limits: ctx.mesh_limits,
        };

        Ok(Self {
            registry,
            resources,
            controller: FrameController::new(scene, inputs, config),
        })
    }

    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.controller.on_resize(width, height);
    }

    pub fn draw(&mut self, gpu: &mut Gpu<'_>, window: &Window) -> DrawOutcome {
        let clear = self.controller.config().clear_color;
        let mut backend = WgpuBackend::new(gpu, window, &self.registry, &self.resources, clear);
        self.controller.on_draw(&mut backend)
    }

    pub fn controller(&self) -> &FrameController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut FrameController {
        &mut self.controller
    }
}

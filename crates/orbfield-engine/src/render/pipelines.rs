use std::fmt;
use std::num::NonZeroU64;

use anyhow::{Context, Result};

use super::instances::InstanceRecord;
use super::shader_library::{ShaderLibrary, ShaderStage};
use super::sphere_mesh::SphereVertex;
use super::uniforms::FrameUniformsGpu;

/// The three interchangeable sphere renderers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Pre-baked sphere mesh drawn once per instance record.
    Instanced,
    /// One screen-space quad per sphere, analytically hit-tested per fragment.
    RayIntersect,
    /// Task + mesh stages generating each sphere on the GPU.
    MeshShader,
}

impl PipelineKind {
    pub const ALL: [PipelineKind; 3] = [
        PipelineKind::Instanced,
        PipelineKind::RayIntersect,
        PipelineKind::MeshShader,
    ];

    /// Stage entry points this kind needs, in pipeline order.
    pub fn entry_points(self) -> &'static [(ShaderStage, &'static str)] {
        match self {
            PipelineKind::Instanced => &[
                (ShaderStage::Vertex, "vs_instanced"),
                (ShaderStage::Fragment, "fs_instanced"),
            ],
            PipelineKind::RayIntersect => &[
                (ShaderStage::Vertex, "vs_ray"),
                (ShaderStage::Fragment, "fs_ray"),
            ],
            PipelineKind::MeshShader => &[
                (ShaderStage::Task, "ts_sphere"),
                (ShaderStage::Mesh, "ms_sphere"),
                (ShaderStage::Fragment, "fs_mesh"),
            ],
        }
    }

    fn index(self) -> usize {
        match self {
            PipelineKind::Instanced => 0,
            PipelineKind::RayIntersect => 1,
            PipelineKind::MeshShader => 2,
        }
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineKind::Instanced => "instanced",
            PipelineKind::RayIntersect => "ray-intersect",
            PipelineKind::MeshShader => "mesh-shader",
        };
        f.write_str(s)
    }
}

/// Attachment formats shared by every pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TargetFormats {
    pub color: wgpu::TextureFormat,
    pub depth: wgpu::TextureFormat,
    pub sample_count: u32,
}

/// Bundled WGSL programs, one library per pipeline kind.
#[derive(Debug, Clone)]
pub struct ShaderSet {
    libraries: [ShaderLibrary; 3],
}

impl ShaderSet {
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            libraries: [
                ShaderLibrary::parse("instanced", include_str!("shaders/instanced.wgsl"))?,
                ShaderLibrary::parse("ray_sphere", include_str!("shaders/ray_sphere.wgsl"))?,
                ShaderLibrary::parse("mesh_sphere", include_str!("shaders/mesh_sphere.wgsl"))?,
            ],
        })
    }

    pub fn library(&self, kind: PipelineKind) -> &ShaderLibrary {
        &self.libraries[kind.index()]
    }
}

/// Immutable description of one pipeline, fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub kind: PipelineKind,
    pub entry_points: &'static [(ShaderStage, &'static str)],
    pub targets: TargetFormats,
    pub topology: wgpu::PrimitiveTopology,
    pub cull_mode: Option<wgpu::Face>,
    pub front_face: wgpu::FrontFace,
}

impl PipelineConfig {
    pub fn for_kind(kind: PipelineKind, targets: TargetFormats) -> Self {
        let (topology, cull_mode) = match kind {
            PipelineKind::Instanced | PipelineKind::MeshShader => {
                (wgpu::PrimitiveTopology::TriangleList, Some(wgpu::Face::Back))
            }
            // Billboards face the camera by construction.
            PipelineKind::RayIntersect => (wgpu::PrimitiveTopology::TriangleStrip, None),
        };

        Self {
            kind,
            entry_points: kind.entry_points(),
            targets,
            topology,
            cull_mode,
            front_face: wgpu::FrontFace::Ccw,
        }
    }

    /// Checks every required entry point against `library`.
    pub fn resolve(&self, library: &ShaderLibrary) -> Result<()> {
        for &(stage, name) in self.entry_points {
            library
                .resolve(stage, name)
                .with_context(|| format!("{} pipeline", self.kind))?;
        }
        Ok(())
    }

    pub fn entry_point(&self, stage: ShaderStage) -> Option<&'static str> {
        self.entry_points
            .iter()
            .find(|(s, _)| *s == stage)
            .map(|(_, name)| *name)
    }

    pub fn primitive(&self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: self.topology,
            strip_index_format: None,
            front_face: self.front_face,
            cull_mode: self.cull_mode,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        }
    }

    /// Less-than depth test with writes, identical for every kind.
    pub fn depth_stencil(&self) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format: self.targets.depth,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    pub fn multisample(&self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.targets.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }

    fn color_targets(&self) -> [Option<wgpu::ColorTargetState>; 1] {
        [Some(wgpu::ColorTargetState {
            format: self.targets.color,
            blend: None,
            write_mask: wgpu::ColorWrites::ALL,
        })]
    }
}

/// Bind group layouts shared between pipelines and the resources bound to them.
///
/// - group 0 `frame`: per-slot [`FrameUniformsGpu`] (all stages)
/// - group 1 `instances`: instance records as storage (task + mesh)
/// - group 1 `spheres`: positions / radii / colors as storage (vertex + fragment)
pub struct BindGroupLayouts {
    pub frame: wgpu::BindGroupLayout,
    pub instances: wgpu::BindGroupLayout,
    pub spheres: wgpu::BindGroupLayout,
}

impl BindGroupLayouts {
    fn new(device: &wgpu::Device) -> Self {
        let frame = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orbfield frame bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX
                    | wgpu::ShaderStages::FRAGMENT
                    | wgpu::ShaderStages::TASK
                    | wgpu::ShaderStages::MESH,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(FrameUniformsGpu::SIZE),
                },
                count: None,
            }],
        });

        let instances = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orbfield instances bgl"),
            entries: &[storage_entry(
                0,
                wgpu::ShaderStages::TASK | wgpu::ShaderStages::MESH,
                NonZeroU64::new(InstanceRecord::STRIDE),
            )],
        });

        let sphere_stages = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let spheres = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orbfield spheres bgl"),
            entries: &[
                storage_entry(0, sphere_stages, NonZeroU64::new(16)),
                storage_entry(1, sphere_stages, NonZeroU64::new(4)),
                storage_entry(2, sphere_stages, NonZeroU64::new(16)),
            ],
        });

        Self {
            frame,
            instances,
            spheres,
        }
    }
}

fn storage_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    min_binding_size: Option<NonZeroU64>,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only: true },
            has_dynamic_offset: false,
            min_binding_size,
        },
        count: None,
    }
}

/// Compiled pipelines for every [`PipelineKind`], built once at startup.
pub struct PipelineRegistry {
    configs: [PipelineConfig; 3],
    pipelines: [wgpu::RenderPipeline; 3],
    layouts: BindGroupLayouts,
}

impl PipelineRegistry {
    /// Resolves all entry points, then compiles all three pipelines.
    ///
    /// `shaders` were already parsed and validated by naga, so a bad entry
    /// point is the only shader problem left to report here. Pipeline-state
    /// mismatches are device validation errors, which wgpu reports through its
    /// uncaptured-error handler (a panic by default).
    pub fn build(device: &wgpu::Device, shaders: &ShaderSet, targets: TargetFormats) -> Result<Self> {
        let configs = PipelineKind::ALL.map(|kind| PipelineConfig::for_kind(kind, targets));
        for config in &configs {
            config.resolve(shaders.library(config.kind))?;
        }

        let layouts = BindGroupLayouts::new(device);

        let instanced = build_instanced(device, shaders, &configs[0], &layouts);
        let ray = build_ray_intersect(device, shaders, &configs[1], &layouts);
        let mesh = build_mesh_shader(device, shaders, &configs[2], &layouts);

        log::info!(
            "pipelines ready: color {:?}, depth {:?}, {}x MSAA",
            targets.color,
            targets.depth,
            targets.sample_count
        );

        Ok(Self {
            configs,
            pipelines: [instanced, ray, mesh],
            layouts,
        })
    }

    pub fn pipeline(&self, kind: PipelineKind) -> &wgpu::RenderPipeline {
        &self.pipelines[kind.index()]
    }

    pub fn config(&self, kind: PipelineKind) -> &PipelineConfig {
        &self.configs[kind.index()]
    }

    pub fn layouts(&self) -> &BindGroupLayouts {
        &self.layouts
    }
}

fn shader_module(device: &wgpu::Device, library: &ShaderLibrary) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(library.label()),
        source: wgpu::ShaderSource::Wgsl(library.source().into()),
    })
}

fn pipeline_layout(
    device: &wgpu::Device,
    label: &str,
    groups: &[&wgpu::BindGroupLayout],
) -> wgpu::PipelineLayout {
    device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(label),
        bind_group_layouts: groups,
        immediate_size: 0,
    })
}

fn build_instanced(
    device: &wgpu::Device,
    shaders: &ShaderSet,
    config: &PipelineConfig,
    layouts: &BindGroupLayouts,
) -> wgpu::RenderPipeline {
    let module = shader_module(device, shaders.library(config.kind));
    let layout = pipeline_layout(device, "orbfield instanced layout", &[&layouts.frame]);
    let targets = config.color_targets();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("orbfield instanced pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: config.entry_point(ShaderStage::Vertex),
            compilation_options: Default::default(),
            buffers: &[SphereVertex::layout(), InstanceRecord::layout()],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: config.entry_point(ShaderStage::Fragment),
            compilation_options: Default::default(),
            targets: &targets,
        }),
        primitive: config.primitive(),
        depth_stencil: Some(config.depth_stencil()),
        multisample: config.multisample(),
        multiview_mask: None,
        cache: None,
    })
}

fn build_ray_intersect(
    device: &wgpu::Device,
    shaders: &ShaderSet,
    config: &PipelineConfig,
    layouts: &BindGroupLayouts,
) -> wgpu::RenderPipeline {
    let module = shader_module(device, shaders.library(config.kind));
    let layout = pipeline_layout(
        device,
        "orbfield ray layout",
        &[&layouts.frame, &layouts.spheres],
    );
    let targets = config.color_targets();

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("orbfield ray pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &module,
            entry_point: config.entry_point(ShaderStage::Vertex),
            compilation_options: Default::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: config.entry_point(ShaderStage::Fragment),
            compilation_options: Default::default(),
            targets: &targets,
        }),
        primitive: config.primitive(),
        depth_stencil: Some(config.depth_stencil()),
        multisample: config.multisample(),
        multiview_mask: None,
        cache: None,
    })
}

fn build_mesh_shader(
    device: &wgpu::Device,
    shaders: &ShaderSet,
    config: &PipelineConfig,
    layouts: &BindGroupLayouts,
) -> wgpu::RenderPipeline {
    let module = shader_module(device, shaders.library(config.kind));
    let layout = pipeline_layout(
        device,
        "orbfield mesh layout",
        &[&layouts.frame, &layouts.instances],
    );
    let targets = config.color_targets();

    device.create_mesh_pipeline(&wgpu::MeshPipelineDescriptor {
        label: Some("orbfield mesh pipeline"),
        layout: Some(&layout),
        task: Some(wgpu::TaskState {
            module: &module,
            entry_point: config.entry_point(ShaderStage::Task),
            compilation_options: Default::default(),
        }),
        mesh: wgpu::MeshState {
            module: &module,
            entry_point: config.entry_point(ShaderStage::Mesh),
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &module,
            entry_point: config.entry_point(ShaderStage::Fragment),
            compilation_options: Default::default(),
            targets: &targets,
        }),
        primitive: config.primitive(),
        depth_stencil: Some(config.depth_stencil()),
        multisample: config.multisample(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> TargetFormats {
        TargetFormats {
            color: wgpu::TextureFormat::Bgra8Unorm,
            depth: wgpu::TextureFormat::Depth32Float,
            sample_count: 4,
        }
    }

    #[test]
    fn bundled_shaders_provide_every_entry_point() {
        let shaders = ShaderSet::builtin().unwrap();
        for kind in PipelineKind::ALL {
            PipelineConfig::for_kind(kind, targets())
                .resolve(shaders.library(kind))
                .unwrap_or_else(|e| panic!("{kind}: {e:#}"));
        }
    }

    #[test]
    fn resolve_fails_fast_on_foreign_library() {
        let shaders = ShaderSet::builtin().unwrap();
        let config = PipelineConfig::for_kind(PipelineKind::MeshShader, targets());
        let err = config
            .resolve(shaders.library(PipelineKind::Instanced))
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("mesh-shader pipeline"), "{msg}");
        assert!(msg.contains("ts_sphere"), "{msg}");
    }

    #[test]
    fn mesh_kind_needs_object_mesh_and_fragment_stages() {
        let stages: Vec<_> = PipelineKind::MeshShader
            .entry_points()
            .iter()
            .map(|(s, _)| *s)
            .collect();
        assert_eq!(stages, vec![ShaderStage::Task, ShaderStage::Mesh, ShaderStage::Fragment]);
    }

    #[test]
    fn shared_depth_and_multisample_state() {
        for kind in PipelineKind::ALL {
            let c = PipelineConfig::for_kind(kind, targets());
            let d = c.depth_stencil();
            assert_eq!(d.depth_compare, wgpu::CompareFunction::Less);
            assert!(d.depth_write_enabled);
            assert_eq!(d.format, wgpu::TextureFormat::Depth32Float);
            assert_eq!(c.multisample().count, 4);
            assert_eq!(c.front_face, wgpu::FrontFace::Ccw);
        }
    }

    #[test]
    fn culling_rules() {
        let inst = PipelineConfig::for_kind(PipelineKind::Instanced, targets());
        let mesh = PipelineConfig::for_kind(PipelineKind::MeshShader, targets());
        let ray = PipelineConfig::for_kind(PipelineKind::RayIntersect, targets());
        assert_eq!(inst.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(mesh.cull_mode, Some(wgpu::Face::Back));
        assert_eq!(ray.cull_mode, None);
        assert_eq!(ray.topology, wgpu::PrimitiveTopology::TriangleStrip);
    }

    #[test]
    fn entry_point_lookup_by_stage() {
        let c = PipelineConfig::for_kind(PipelineKind::RayIntersect, targets());
        assert_eq!(c.entry_point(ShaderStage::Vertex), Some("vs_ray"));
        assert_eq!(c.entry_point(ShaderStage::Fragment), Some("fs_ray"));
        assert_eq!(c.entry_point(ShaderStage::Mesh), None);
    }
}

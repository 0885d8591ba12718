//! Sphere rendering core.
//!
//! Data flows one way:
//! - `instances` / `sphere_mesh` turn the scene into GPU-ready bytes once
//! - `pipelines` compiles the three sphere pipelines once
//! - `controller` produces one frame per draw event through a [`FrameBackend`]
//! - `draw` holds the three interchangeable command sequences
//!
//! Everything except `wgpu_backend`, `resources` and `renderer` runs without a GPU.

mod controller;
mod ctx;
mod draw;
mod instances;
mod pipelines;
mod renderer;
mod resources;
mod shader_library;
mod sphere_mesh;
mod uniforms;
mod wgpu_backend;

pub use controller::{
    DrawOutcome, FrameBackend, FrameController, FrameSkip, FrameStats, RenderConfig,
};
pub use ctx::RenderCtx;
pub use draw::{encode, DrawEncoder, DrawInputs, DrawPath, MeshDispatchLimits, TaskGrid};
pub use instances::{InstanceData, InstanceRecord, SphereArrays};
pub use pipelines::{
    BindGroupLayouts, PipelineConfig, PipelineKind, PipelineRegistry, ShaderSet, TargetFormats,
};
pub use renderer::SphereRenderer;
pub use resources::GpuScene;
pub use shader_library::{ShaderLibrary, ShaderStage};
pub use sphere_mesh::{SphereMesh, SphereVertex};
pub use uniforms::{FrameUniforms, FrameUniformsGpu, Projection};
pub use wgpu_backend::WgpuBackend;

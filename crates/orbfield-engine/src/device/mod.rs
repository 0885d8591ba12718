//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue with mesh shading enabled
//! - creating & configuring the Surface (swapchain)
//! - owning the multisampled color and depth targets that track the surface size
//! - acquiring frames and submitting them with a completion callback

mod error;
mod frame;
mod gpu;
mod init;
mod surface;
mod targets;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use targets::RenderTargets;

use wgpu::util::DeviceExt;

use super::ctx::RenderCtx;
use super::instances::InstanceData;
use super::pipelines::BindGroupLayouts;
use super::sphere_mesh::SphereMesh;
use super::uniforms::{FrameUniforms, FrameUniformsGpu};

/// Uniform buffer + bind group owned by one in-flight slot.
struct SlotUniforms {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Every GPU buffer the sphere paths read.
///
/// Geometry and instance data are uploaded once and never written again.
/// Frame uniforms get one buffer per in-flight slot, so a frame only ever
/// overwrites the copy its own slot guards.
pub struct GpuScene {
    sphere_vertices: wgpu::Buffer,
    sphere_indices: wgpu::Buffer,
    sphere_index_count: u32,

    instances: wgpu::Buffer,
    instances_group: wgpu::BindGroup,

    // Kept alive for `spheres_group`.
    _sphere_arrays: [wgpu::Buffer; 3],
    spheres_group: wgpu::BindGroup,

    slots: Vec<SlotUniforms>,
    object_count: u32,
}

impl GpuScene {
    pub fn upload(
        ctx: &RenderCtx<'_>,
        layouts: &BindGroupLayouts,
        data: &InstanceData,
        mesh: &SphereMesh,
        slot_count: usize,
    ) -> Self {
        let device = ctx.device;

        let sphere_vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orbfield sphere vertices"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let sphere_indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orbfield sphere indices"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        // Records double as a vertex stream (instanced) and storage (mesh).
        let instances = storage_buffer(
            device,
            "orbfield instance records",
            data.record_bytes(),
            wgpu::BufferUsages::VERTEX,
        );
        let instances_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orbfield instances bg"),
            layout: &layouts.instances,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: instances.as_entire_binding(),
            }],
        });

        let positions = storage_buffer(
            device,
            "orbfield sphere positions",
            data.position_bytes(),
            wgpu::BufferUsages::empty(),
        );
        let radii = storage_buffer(
            device,
            "orbfield sphere radii",
            data.radius_bytes(),
            wgpu::BufferUsages::empty(),
        );
        let colors = storage_buffer(
            device,
            "orbfield sphere colors",
            data.color_bytes(),
            wgpu::BufferUsages::empty(),
        );
        let spheres_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orbfield spheres bg"),
            layout: &layouts.spheres,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: positions.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: radii.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: colors.as_entire_binding(),
                },
            ],
        });

        let slots = (0..slot_count.max(1))
            .map(|i| {
                let buffer = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some("orbfield frame uniforms"),
                    size: FrameUniformsGpu::SIZE,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });
                let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("orbfield frame bg"),
                    layout: &layouts.frame,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });
                log::trace!("frame uniforms for slot {i} created");
                SlotUniforms { buffer, bind_group }
            })
            .collect();

        log::info!(
            "uploaded {} instance records ({} KiB), sphere mesh {} indices",
            data.len(),
            data.record_bytes().len() / 1024,
            mesh.index_count()
        );

        Self {
            sphere_vertices,
            sphere_indices,
            sphere_index_count: mesh.index_count(),
            instances,
            instances_group,
            _sphere_arrays: [positions, radii, colors],
            spheres_group,
            slots,
            object_count: data.len() as u32,
        }
    }

    /// Writes `uniforms` into the buffer owned by `slot` and returns its bind group.
    pub fn write_uniforms(
        &self,
        queue: &wgpu::Queue,
        slot: usize,
        uniforms: &FrameUniforms,
    ) -> &wgpu::BindGroup {
        let slot = &self.slots[slot % self.slots.len()];
        queue.write_buffer(&slot.buffer, 0, bytemuck::bytes_of(&uniforms.to_gpu()));
        &slot.bind_group
    }

    pub fn sphere_vertices(&self) -> &wgpu::Buffer {
        &self.sphere_vertices
    }

    pub fn sphere_indices(&self) -> &wgpu::Buffer {
        &self.sphere_indices
    }

    pub fn sphere_index_count(&self) -> u32 {
        self.sphere_index_count
    }

    pub fn instances(&self) -> &wgpu::Buffer {
        &self.instances
    }

    pub fn instances_group(&self) -> &wgpu::BindGroup {
        &self.instances_group
    }

    pub fn spheres_group(&self) -> &wgpu::BindGroup {
        &self.spheres_group
    }

    pub fn object_count(&self) -> u32 {
        self.object_count
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

/// Read-only storage buffer; an empty scene still gets a zeroed buffer large
/// enough for every binding's minimum size, since zero-sized bindings are invalid.
fn storage_buffer(
    device: &wgpu::Device,
    label: &str,
    bytes: &[u8],
    extra: wgpu::BufferUsages,
) -> wgpu::Buffer {
    const EMPTY: [u8; 256] = [0; 256];
    let contents = if bytes.is_empty() { &EMPTY[..] } else { bytes };

    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(label),
        contents,
        usage: wgpu::BufferUsages::STORAGE | extra,
    })
}

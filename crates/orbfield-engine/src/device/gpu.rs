use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface;
use super::{GpuFrame, GpuInit, RenderTargets, SurfaceErrorAction};

/// Owns wgpu core objects, the surface configuration and the render targets.
///
/// This type is the low-level rendering context:
/// - creates the Instance/Adapter and stores the Device/Queue
/// - creates and configures the Surface (swapchain)
/// - keeps the MSAA color and depth attachments in step with the surface size
/// - acquires frames and submits them with a completion callback
pub struct Gpu<'w> {
    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; architecture must ensure the window
    /// outlives the `Gpu` instance.
    surface: wgpu::Surface<'w>,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Multisampled color + depth attachments.
    targets: RenderTargets,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let GpuInit {
            preferred_format,
            present_mode,
            alpha_mode,
            required_features,
            required_limits,
            experimental,
            sample_count,
            depth_format,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("adapter: {} ({:?})", info.name, info.backend);

        let missing = required_features - adapter.features();
        anyhow::ensure!(
            missing.is_empty(),
            "adapter `{}` lacks required features: {missing:?}",
            info.name
        );

        let experimental_features = if experimental {
            // SAFETY: the only experimental feature requested is mesh shading,
            // and every mesh pipeline is validated by wgpu before use.
            unsafe { wgpu::ExperimentalFeatures::enabled() }
        } else {
            wgpu::ExperimentalFeatures::disabled()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("orbfield device"),
                required_features,
                required_limits: required_limits.unwrap_or_else(|| adapter.limits()),
                experimental_features,
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps.formats, preferred_format)
            .context("no supported surface formats")?;

        let alpha_mode = surface::choose_alpha_mode(&surface_caps.alpha_modes, alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };

        surface.configure(&device, &config);

        let targets = RenderTargets::new(
            &device,
            format,
            depth_format,
            sample_count,
            config.width,
            config.height,
        );

        log::info!(
            "surface {}x{} {format:?}, depth {depth_format:?}, {sample_count}x MSAA",
            config.width,
            config.height
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            targets,
            size,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn targets(&self) -> &RenderTargets {
        &self.targets
    }

    /// Reconfigures the surface and recreates the render targets after a resize.
    ///
    /// wgpu does not support configuring a surface with a 0x0 size; in that case,
    /// only internal state is updated and configuration is deferred.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let configured = surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );
        if configured {
            self.targets
                .resize(&self.device, new_size.width, new_size.height);
        }
    }

    /// Acquires the next surface texture and creates an encoder.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("orbfield frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the frame.
    ///
    /// `on_complete` runs once the GPU has finished this submission. wgpu only
    /// fires it from [`poll`](Self::poll) or a later submit.
    pub fn submit(&self, frame: GpuFrame, on_complete: impl FnOnce() + Send + 'static) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        submit_then_track(
            || {
                self.queue.submit(std::iter::once(encoder.finish()));
            },
            || self.queue.on_submitted_work_done(on_complete),
        );
        drop(view);
        surface_texture.present();
    }

    /// Non-blocking device poll; fires completion callbacks that are due.
    pub fn poll(&self) {
        if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
            log::trace!("device poll: {e}");
        }
    }

    /// Converts a `SurfaceError` into a higher-level action, reconfiguring the
    /// surface when it was lost or went stale.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        surface::recover_surface_error(&self.surface, &self.device, &self.config, self.size, &err)
    }
}

/// Runs `submit`, then `track`.
///
/// `Queue::on_submitted_work_done` attaches its callback to the most recent
/// submission, so a frame's completion callback must be registered after the
/// submit that carries the frame. Registered earlier, it would fire when the
/// previous frame finishes.
fn submit_then_track(submit: impl FnOnce(), track: impl FnOnce()) {
    submit();
    track();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Callback = Box<dyn FnOnce()>;

    /// Queue model with wgpu's attachment rule: a work-done callback belongs
    /// to the latest submission made before it was registered.
    #[derive(Default)]
    struct QueueModel {
        submissions: Vec<Vec<Callback>>,
    }

    impl QueueModel {
        fn submit(&mut self) {
            self.submissions.push(Vec::new());
        }

        fn on_submitted_work_done(&mut self, cb: Callback) {
            match self.submissions.last_mut() {
                Some(latest) => latest.push(cb),
                // Idle queue: fires on the next maintain.
                None => cb(),
            }
        }

        fn complete(&mut self, index: usize) {
            for cb in self.submissions[index].drain(..) {
                cb();
            }
        }
    }

    // ── submission ordering ────────────────────────────────────────────────

    #[test]
    fn completion_is_tied_to_its_own_submission() {
        let queue = RefCell::new(QueueModel::default());
        let done = Rc::new(RefCell::new(Vec::new()));

        for frame in 0..3 {
            let done = Rc::clone(&done);
            submit_then_track(
                || queue.borrow_mut().submit(),
                || {
                    queue
                        .borrow_mut()
                        .on_submitted_work_done(Box::new(move || done.borrow_mut().push(frame)))
                },
            );
        }
        assert!(done.borrow().is_empty(), "nothing completed yet");

        queue.borrow_mut().complete(0);
        assert_eq!(*done.borrow(), vec![0]);

        queue.borrow_mut().complete(2);
        assert_eq!(*done.borrow(), vec![0, 2]);

        queue.borrow_mut().complete(1);
        assert_eq!(*done.borrow(), vec![0, 2, 1]);
    }

    #[test]
    fn first_frame_does_not_complete_on_an_idle_queue() {
        let queue = RefCell::new(QueueModel::default());
        let done = Rc::new(RefCell::new(false));

        let flag = Rc::clone(&done);
        submit_then_track(
            || queue.borrow_mut().submit(),
            || {
                queue
                    .borrow_mut()
                    .on_submitted_work_done(Box::new(move || *flag.borrow_mut() = true))
            },
        );
        assert!(!*done.borrow());

        queue.borrow_mut().complete(0);
        assert!(*done.borrow());
    }
}

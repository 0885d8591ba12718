use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use glam::Vec2;

use crate::scene::Scene;
use crate::sync::{FramePool, FrameSlot};

use super::draw::{self, DrawEncoder, DrawInputs, DrawPath};
use super::uniforms::{FrameUniforms, Projection};

/// How long one wait on the slot pool lasts before completions are pumped again.
const COMPLETION_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Startup parameters of the render core.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Frames that may be submitted but not yet completed.
    pub max_frames_in_flight: usize,
    /// Subdivisions of the instanced path's UV sphere.
    pub sphere_segments: u32,
    pub draw_path: DrawPath,
    pub clear_color: wgpu::Color,
    pub projection: Projection,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_frames_in_flight: 3,
            sphere_segments: 14,
            draw_path: DrawPath::default(),
            clear_color: wgpu::Color {
                r: 0.02,
                g: 0.02,
                b: 0.03,
                a: 1.0,
            },
            projection: Projection::default(),
        }
    }
}

/// Reason a draw produced no submission.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameSkip {
    /// Window minimised or not yet sized.
    ZeroSizedSurface,
    /// No drawable this frame (timeout or other transient surface error).
    DrawableUnavailable,
    /// Surface was lost or outdated and has been reconfigured.
    SurfaceReconfigured,
    /// The surface reported an unrecoverable error.
    Fatal,
}

impl FrameSkip {
    pub fn is_fatal(self) -> bool {
        self == FrameSkip::Fatal
    }
}

impl fmt::Display for FrameSkip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameSkip::ZeroSizedSurface => "surface has zero size",
            FrameSkip::DrawableUnavailable => "no drawable available",
            FrameSkip::SurfaceReconfigured => "surface reconfigured",
            FrameSkip::Fatal => "surface out of memory",
        };
        f.write_str(s)
    }
}

impl std::error::Error for FrameSkip {}

/// Result of one [`FrameController::on_draw`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DrawOutcome {
    Submitted { slot: usize },
    Skipped(FrameSkip),
}

impl DrawOutcome {
    pub fn is_fatal(self) -> bool {
        matches!(self, DrawOutcome::Skipped(skip) if skip.is_fatal())
    }
}

/// Frame counters. `completed` is bumped from completion callbacks.
#[derive(Debug, Default)]
pub struct FrameStats {
    pub submitted: u64,
    pub skipped: u64,
    completed: Arc<AtomicU64>,
}

impl FrameStats {
    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

/// Everything the controller needs from the GPU side of a frame.
///
/// Implemented by the wgpu backend and by recording backends in tests.
pub trait FrameBackend {
    type Frame;

    /// Current drawable size in physical pixels.
    fn surface_size(&self) -> (u32, u32);

    fn begin_frame(&mut self) -> Result<Self::Frame, FrameSkip>;

    /// Opens the frame's render pass and hands its encoder to `commands`.
    /// `slot` selects the per-slot transient buffers.
    fn record(
        &mut self,
        frame: &mut Self::Frame,
        slot: usize,
        commands: &mut dyn FnMut(&mut dyn DrawEncoder),
    );

    /// Submits and presents `frame`; `on_complete` runs once the GPU is done with it.
    ///
    /// `on_complete` must be tied to this frame's own submission, not to
    /// whatever was submitted before it: the controller releases the frame's
    /// slot, and with it the slot's uniform buffer, from that callback.
    fn submit(&mut self, frame: Self::Frame, on_complete: Box<dyn FnOnce() + Send + 'static>);

    /// Gives pending completion callbacks a chance to run.
    fn poll_completions(&mut self);
}

/// Drives one frame per draw event: admission, camera, matrices, dispatch, submit.
pub struct FrameController {
    scene: Scene,
    pool: FramePool,
    inputs: DrawInputs,
    config: RenderConfig,
    stats: FrameStats,
    last_uniforms: Option<FrameUniforms>,
}

impl FrameController {
    pub fn new(scene: Scene, inputs: DrawInputs, config: RenderConfig) -> Self {
        log::info!(
            "frame controller: {} objects, {} frames in flight, {} path",
            inputs.object_count,
            config.max_frames_in_flight,
            config.draw_path
        );
        Self {
            scene,
            pool: FramePool::new(config.max_frames_in_flight),
            inputs,
            config,
            stats: FrameStats::default(),
            last_uniforms: None,
        }
    }

    /// Size changes need no bookkeeping: the aspect ratio is read from the
    /// surface on every draw.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        log::debug!("surface resized to {width}x{height}");
    }

    /// Produces at most one frame.
    ///
    /// Blocks while every in-flight slot is taken. A skipped frame releases
    /// its slot and leaves the camera where it was.
    pub fn on_draw<B: FrameBackend>(&mut self, backend: &mut B) -> DrawOutcome {
        let slot = self.acquire_slot(backend);

        let (width, height) = backend.surface_size();
        if width == 0 || height == 0 {
            return self.skip(FrameSkip::ZeroSizedSurface);
        }

        let mut frame = match backend.begin_frame() {
            Ok(frame) => frame,
            Err(skip) => return self.skip(skip),
        };

        self.scene.advance_camera();
        let uniforms = FrameUniforms::new(
            &self.scene.camera,
            &self.config.projection,
            Vec2::new(width as f32, height as f32),
        );

        let path = self.config.draw_path;
        let inputs = self.inputs;
        let index = slot.index();
        backend.record(&mut frame, index, &mut |enc| {
            draw::encode(path, &inputs, &uniforms, enc)
        });

        let completed = Arc::clone(&self.stats.completed);
        backend.submit(
            frame,
            Box::new(move || {
                drop(slot);
                completed.fetch_add(1, Ordering::Relaxed);
            }),
        );

        self.stats.submitted += 1;
        self.last_uniforms = Some(uniforms);
        log::trace!(
            "frame {} submitted on slot {index}, angle {:.3}",
            self.stats.submitted,
            self.scene.camera_angle()
        );

        DrawOutcome::Submitted { slot: index }
    }

    fn acquire_slot<B: FrameBackend>(&self, backend: &mut B) -> FrameSlot {
        if let Some(slot) = self.pool.try_acquire() {
            return slot;
        }

        log::trace!("all {} frame slots in flight, waiting", self.pool.capacity());
        loop {
            backend.poll_completions();
            if let Some(slot) = self.pool.acquire_timeout(COMPLETION_POLL_INTERVAL) {
                return slot;
            }
        }
    }

    fn skip(&mut self, reason: FrameSkip) -> DrawOutcome {
        self.stats.skipped += 1;
        if reason.is_fatal() {
            log::error!("frame skipped: {reason}");
        } else {
            log::warn!("frame skipped: {reason}");
        }
        DrawOutcome::Skipped(reason)
    }

    pub fn set_draw_path(&mut self, path: DrawPath) {
        if path != self.config.draw_path {
            log::info!("draw path: {} -> {path}", self.config.draw_path);
            self.config.draw_path = path;
        }
    }

    pub fn draw_path(&self) -> DrawPath {
        self.config.draw_path
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn pool(&self) -> &FramePool {
        &self.pool
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Uniforms of the most recently submitted frame.
    pub fn last_uniforms(&self) -> Option<&FrameUniforms> {
        self.last_uniforms.as_ref()
    }
}

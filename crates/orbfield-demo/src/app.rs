use std::time::Duration;

use anyhow::Result;
use orbfield_engine::core::{App, AppControl, FrameCtx};
use orbfield_engine::device::Gpu;
use orbfield_engine::render::{DrawOutcome, DrawPath, RenderConfig, SphereRenderer};
use orbfield_engine::scene::{Scene, SceneConfig};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

const REPORT_INTERVAL: Duration = Duration::from_secs(2);

/// The sphere-grid demo: one renderer, created once the GPU exists.
pub struct OrbfieldApp {
    scene_config: SceneConfig,
    render_config: RenderConfig,
    renderer: Option<SphereRenderer>,
    fps: FpsCounter,
}

impl OrbfieldApp {
    pub fn new(scene_config: SceneConfig, render_config: RenderConfig) -> Self {
        Self {
            scene_config,
            render_config,
            renderer: None,
            fps: FpsCounter::new(REPORT_INTERVAL),
        }
    }
}

impl App for OrbfieldApp {
    fn on_start(&mut self, gpu: &Gpu<'_>) -> Result<()> {
        let scene = Scene::sphere_grid(&self.scene_config);
        self.renderer = Some(SphereRenderer::new(gpu, scene, self.render_config.clone())?);
        Ok(())
    }

    fn on_resize(&mut self, width: u32, height: u32) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.on_resize(width, height);
        }
    }

    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: ElementState::Pressed,
                    repeat: false,
                    ..
                },
            ..
        } = event
        else {
            return AppControl::Continue;
        };

        let path = match code {
            KeyCode::Escape => return AppControl::Exit,
            KeyCode::Digit1 => DrawPath::MeshShader,
            KeyCode::Digit2 => DrawPath::Instanced,
            KeyCode::Digit3 => DrawPath::RayIntersect,
            _ => return AppControl::Continue,
        };
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.controller_mut().set_draw_path(path);
        }
        AppControl::Continue
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let Some(renderer) = self.renderer.as_mut() else {
            return AppControl::Continue;
        };

        if let DrawOutcome::Skipped(skip) = renderer.draw(ctx.gpu, ctx.window) {
            if skip.is_fatal() {
                ctx.runtime
                    .fail(anyhow::Error::new(skip).context("rendering stopped"));
                return AppControl::Exit;
            }
        }

        if let Some(fps) = self.fps.record(ctx.time.dt) {
            let controller = renderer.controller();
            let stats = controller.stats();
            log::info!(
                "{fps:.1} fps | {} path | {} in flight | {} submitted, {} completed, {} skipped",
                controller.draw_path(),
                controller.pool().in_flight(),
                stats.submitted,
                stats.completed(),
                stats.skipped
            );
        }

        AppControl::Continue
    }
}

/// Averages frame rate over a fixed reporting window.
#[derive(Debug)]
struct FpsCounter {
    window: f32,
    elapsed: f32,
    frames: u32,
}

impl FpsCounter {
    fn new(window: Duration) -> Self {
        Self {
            window: window.as_secs_f32(),
            elapsed: 0.0,
            frames: 0,
        }
    }

    /// Returns the average rate once per window.
    fn record(&mut self, dt: f32) -> Option<f32> {
        self.elapsed += dt;
        self.frames += 1;
        if self.elapsed < self.window {
            return None;
        }
        let fps = self.frames as f32 / self.elapsed;
        self.elapsed = 0.0;
        self.frames = 0;
        Some(fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fps_reported_once_per_window() {
        let mut c = FpsCounter::new(Duration::from_secs(1));
        let reports: Vec<f32> = (0..12).filter_map(|_| c.record(0.25)).collect();
        assert_eq!(reports, vec![4.0, 4.0, 4.0]);
    }

    #[test]
    fn nothing_before_the_window_closes() {
        let mut c = FpsCounter::new(Duration::from_secs(2));
        assert_eq!(c.record(0.5), None);
        assert_eq!(c.record(0.5), None);
    }
}

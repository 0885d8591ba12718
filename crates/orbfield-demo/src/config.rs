use anyhow::{Context, Result};
use orbfield_engine::device::GpuInit;
use orbfield_engine::render::{DrawPath, RenderConfig};
use orbfield_engine::scene::SceneConfig;
use orbfield_engine::window::RuntimeConfig;

/// Environment variable selecting the draw path (`mesh`, `instanced`, `ray`).
pub const DRAW_PATH_VAR: &str = "ORBFIELD_DRAW_PATH";

/// Everything fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct DemoConfig {
    pub runtime: RuntimeConfig,
    pub gpu: GpuInit,
    pub scene: SceneConfig,
    pub render: RenderConfig,
}

impl DemoConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup(DRAW_PATH_VAR) {
            config.render.draw_path = raw
                .parse::<DrawPath>()
                .with_context(|| format!("invalid {DRAW_PATH_VAR}"))?;
        }

        // Same counts everywhere: one uniform buffer per in-flight frame.
        config.gpu.desired_maximum_frame_latency = config.render.max_frames_in_flight as u32;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_environment() {
        let c = DemoConfig::from_lookup(|_| None).unwrap();
        assert_eq!(c.render.draw_path, DrawPath::MeshShader);
        assert_eq!(c.runtime.target_fps, 60);
        assert_eq!(c.gpu.sample_count, 4);
        assert_eq!(c.scene.grid.per_axis, 60);
        assert_eq!(c.gpu.desired_maximum_frame_latency, 3);
    }

    #[test]
    fn draw_path_from_environment() {
        let c = DemoConfig::from_lookup(|k| (k == DRAW_PATH_VAR).then(|| "ray".to_string())).unwrap();
        assert_eq!(c.render.draw_path, DrawPath::RayIntersect);
    }

    #[test]
    fn unknown_draw_path_is_an_error() {
        let err = DemoConfig::from_lookup(|_| Some("voxels".to_string())).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains(DRAW_PATH_VAR), "{msg}");
        assert!(msg.contains("voxels"), "{msg}");
    }
}

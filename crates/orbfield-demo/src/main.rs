mod app;
mod config;

use anyhow::Result;
use orbfield_engine::logging::{init_logging, LoggingConfig};
use orbfield_engine::window::Runtime;

use crate::app::OrbfieldApp;
use crate::config::DemoConfig;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = DemoConfig::from_env()?;
    log::info!(
        "starting: {0}x{0}x{0} grid, {1} path, {2} fps target",
        config.scene.grid.per_axis,
        config.render.draw_path,
        config.runtime.target_fps
    );

    let app = OrbfieldApp::new(config.scene, config.render);
    Runtime::run(config.runtime, config.gpu, app)
}

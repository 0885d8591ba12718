//! World model: camera state plus the list of renderables.
//!
//! The scene is plain data. The frame controller owns it and is its only
//! writer.

mod grid;
mod world;

pub use grid::GridConfig;
pub use world::{Material, Renderable, Scene, SceneConfig};

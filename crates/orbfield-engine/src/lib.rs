//! Orbfield engine crate.
//!
//! Platform + GPU runtime pieces and the sphere-grid render core: scene model,
//! instance data, pipelines, the three draw paths and the in-flight frame
//! controller.

pub mod core;
pub mod device;
pub mod time;
pub mod window;

pub mod logging;
pub mod math;
pub mod render;
pub mod scene;
pub mod sync;

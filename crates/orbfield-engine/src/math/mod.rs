//! Math helpers on top of `glam`.
//!
//! Conventions:
//! - right-handed world, +Y up
//! - column-major matrices, column vectors (`clip = proj * view * model * p`)
//! - clip-space depth in `[0, 1]` (wgpu)

mod camera;
mod color;
mod ray;

pub use camera::{look_at_rh, normal_matrix, perspective_rh, OrbitCamera};
pub use color::hsv_to_rgba;
pub use ray::ray_sphere_intersect;

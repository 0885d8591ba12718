use glam::{Mat4, Quat, Vec3, Vec4};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::math::{hsv_to_rgba, OrbitCamera};

use super::GridConfig;

/// Surface description of a renderable.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Material {
    /// Straight-alpha RGBA.
    pub color: Vec4,
    /// Selection highlight. No draw path reads it yet.
    pub highlighted: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            highlighted: false,
        }
    }
}

/// One object in the world.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Renderable {
    /// Affine model transform.
    pub transform: Mat4,
    pub material: Material,
}

impl Renderable {
    pub fn new(transform: Mat4, color: Vec4) -> Self {
        Self {
            transform,
            material: Material {
                color,
                ..Material::default()
            },
        }
    }

    /// World-space origin of the object (translation column).
    pub fn position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// Bounding radius of a unit sphere under `transform`.
    pub fn radius(&self) -> f32 {
        self.transform
            .x_axis
            .truncate()
            .length()
            .max(self.transform.y_axis.truncate().length())
            .max(self.transform.z_axis.truncate().length())
    }
}

/// Startup parameters for the world.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub grid: GridConfig,
    /// Orbit radius of the camera around the origin.
    pub camera_distance: f32,
    /// Radians added to the camera angle per drawn frame.
    pub camera_step: f32,
    /// Seed for the per-sphere hue generator.
    pub color_seed: u64,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            camera_distance: 15.0,
            camera_step: 0.01,
            color_seed: 0x5eed_0f_5fe2e5,
        }
    }
}

/// World state: the orbiting camera and the static object list.
///
/// Objects never change after construction; only the camera moves.
#[derive(Debug, Clone)]
pub struct Scene {
    pub camera: OrbitCamera,
    pub camera_step: f32,
    objects: Vec<Renderable>,
}

impl Scene {
    pub fn new(camera_distance: f32, camera_step: f32, objects: Vec<Renderable>) -> Self {
        Self {
            camera: OrbitCamera::new(camera_distance),
            camera_step,
            objects,
        }
    }

    /// Builds the sphere grid, each sphere tinted with a random fully
    /// saturated hue.
    ///
    /// Every transform maps the unit sphere onto a grid sphere, so the
    /// configured radius lives in the model matrix.
    pub fn sphere_grid(config: &SceneConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.color_seed);
        let scale = Vec3::splat(config.grid.radius);

        let objects: Vec<Renderable> = config
            .grid
            .positions()
            .map(|p| {
                let hue: f32 = rng.random();
                Renderable::new(
                    Mat4::from_scale_rotation_translation(scale, Quat::IDENTITY, p),
                    hsv_to_rgba(hue, 1.0, 1.0),
                )
            })
            .collect();

        let n = config.grid.per_axis;
        log::info!("{n}x{n}x{n} | total {} spheres", objects.len());

        Self::new(config.camera_distance, config.camera_step, objects)
    }

    pub fn objects(&self) -> &[Renderable] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn camera_angle(&self) -> f32 {
        self.camera.angle
    }

    /// Moves the camera one step along its orbit.
    pub fn advance_camera(&mut self) {
        self.camera.advance(self.camera_step);
    }
}

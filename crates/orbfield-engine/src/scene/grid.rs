use glam::Vec3;

/// Cubic grid of equally sized spheres centered on the origin.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GridConfig {
    /// Spheres per axis; the grid holds `per_axis³` spheres.
    pub per_axis: u32,
    pub radius: f32,
    /// Gap between neighbouring sphere surfaces.
    pub padding: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            per_axis: 60,
            radius: 1.0,
            padding: 1.0,
        }
    }
}

impl GridConfig {
    pub fn count(&self) -> usize {
        (self.per_axis as usize).pow(3)
    }

    /// Distance between neighbouring centers.
    pub fn pitch(&self) -> f32 {
        2.0 * self.radius + self.padding
    }

    /// Edge length of the grid's bounding cube.
    pub fn side_length(&self) -> f32 {
        let n = self.per_axis as f32;
        if self.per_axis == 0 {
            return 0.0;
        }
        2.0 * self.radius * n + self.padding * (n - 1.0)
    }

    /// Center coordinate of cell `index` along one axis.
    pub fn axis_offset(&self, index: u32) -> f32 {
        self.radius + index as f32 * self.pitch() - self.side_length() / 2.0
    }

    /// Sphere centers in generation order: y outermost, then x, then z.
    pub fn positions(&self) -> impl Iterator<Item = Vec3> + '_ {
        let n = self.per_axis;
        (0..n).flat_map(move |j| {
            (0..n).flat_map(move |i| {
                (0..n).map(move |k| {
                    Vec3::new(self.axis_offset(i), self.axis_offset(j), self.axis_offset(k))
                })
            })
        })
    }
}

use glam::{Mat4, Vec3};

/// Right-handed perspective projection with a `[0, 1]` depth range.
///
/// Column layout:
/// ```text
/// | ys/aspect  0   0          0          |
/// | 0          ys  0          0          |
/// | 0          0   f/(n-f)    n*f/(n-f)  |
/// | 0          0  -1          0          |
/// ```
/// with `ys = 1 / tan(fov_y / 2)`.
pub fn perspective_rh(fov_y_radians: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh(fov_y_radians, aspect, near, far)
}

/// View matrix looking from `eye` at `target`.
pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    Mat4::look_at_rh(eye, target, up)
}

/// Inverse-transpose of `model`, used to transform normals.
///
/// Keeps normals perpendicular to surfaces under non-uniform scale. For a
/// singular matrix the result is not finite; callers only build this from
/// invertible model transforms.
pub fn normal_matrix(model: Mat4) -> Mat4 {
    model.inverse().transpose()
}

/// Camera that circles the world origin in the horizontal plane.
///
/// The angle only ever grows; trig handles the wrap.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OrbitCamera {
    pub angle: f32,
    pub distance: f32,
}

impl OrbitCamera {
    pub const UP: Vec3 = Vec3::Y;
    pub const TARGET: Vec3 = Vec3::ZERO;

    pub const fn new(distance: f32) -> Self {
        Self { angle: 0.0, distance }
    }

    pub fn advance(&mut self, step: f32) {
        self.angle += step;
    }

    /// `(d·sin θ, 0, d·cos θ)`.
    pub fn eye(&self) -> Vec3 {
        Vec3::new(
            self.distance * self.angle.sin(),
            0.0,
            self.distance * self.angle.cos(),
        )
    }

    pub fn view(&self) -> Mat4 {
        look_at_rh(self.eye(), Self::TARGET, Self::UP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::Vec4;

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn perspective_matches_closed_form() {
        let fov = 65.0_f32.to_radians();
        let aspect = 16.0 / 9.0;
        let (n, f) = (0.1_f32, 100.0_f32);
        let m = perspective_rh(fov, aspect, n, f);

        let ys = 1.0 / (fov * 0.5).tan();
        let xs = ys / aspect;
        let zs = f / (n - f);

        let expected = Mat4::from_cols(
            Vec4::new(xs, 0.0, 0.0, 0.0),
            Vec4::new(0.0, ys, 0.0, 0.0),
            Vec4::new(0.0, 0.0, zs, -1.0),
            Vec4::new(0.0, 0.0, zs * n, 0.0),
        );
        assert!(m.abs_diff_eq(expected, 1e-6), "got {m:?}");
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth_range() {
        let m = perspective_rh(65.0_f32.to_radians(), 1.5, 0.1, 100.0);
        let near = m.project_point3(Vec3::new(0.0, 0.0, -0.1));
        let far = m.project_point3(Vec3::new(0.0, 0.0, -100.0));
        assert_abs_diff_eq!(near.z, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(far.z, 1.0, epsilon = 1e-5);
    }

    // ── look-at ───────────────────────────────────────────────────────────

    #[test]
    fn look_at_puts_target_on_negative_z() {
        let eye = Vec3::new(0.0, 0.0, 15.0);
        let v = look_at_rh(eye, Vec3::ZERO, Vec3::Y);
        let p = v.transform_point3(Vec3::ZERO);
        assert_abs_diff_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(p.z, -15.0, epsilon = 1e-5);
    }

    // ── normal matrix ─────────────────────────────────────────────────────

    #[test]
    fn normal_matrix_of_translation_keeps_rotation_part() {
        let model = Mat4::from_translation(Vec3::new(3.0, -2.0, 7.0));
        let n = normal_matrix(model);
        let dir = n.transform_vector3(Vec3::X);
        assert!(dir.abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn normal_matrix_keeps_normals_perpendicular_under_scale() {
        let model = Mat4::from_scale(Vec3::new(4.0, 1.0, 1.0))
            * Mat4::from_rotation_z(0.3);
        let n = normal_matrix(model);

        // Plane through the origin with normal (1,1,0)/√2 contains tangent (1,-1,0).
        let tangent = model.transform_vector3(Vec3::new(1.0, -1.0, 0.0));
        let normal = n.transform_vector3(Vec3::new(1.0, 1.0, 0.0));
        assert_abs_diff_eq!(tangent.dot(normal), 0.0, epsilon = 1e-4);
    }

    // ── orbit ─────────────────────────────────────────────────────────────

    #[test]
    fn orbit_eye_stays_on_circle() {
        let mut cam = OrbitCamera::new(15.0);
        for _ in 0..500 {
            cam.advance(0.01);
            let eye = cam.eye();
            assert_abs_diff_eq!(eye.length(), 15.0, epsilon = 1e-4);
            assert_eq!(eye.y, 0.0);
        }
    }

    #[test]
    fn orbit_starts_on_positive_z() {
        let cam = OrbitCamera::new(15.0);
        assert!(cam.eye().abs_diff_eq(Vec3::new(0.0, 0.0, 15.0), 1e-6));
    }
}

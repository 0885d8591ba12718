use glam::Vec3;

/// Nearest non-negative hit distance of a ray against a sphere.
///
/// `dir` must be normalized. Solves `|o + t·d − c|² = r²` with the half-b form:
/// `b = d·(o − c)`, `disc = b² − (|o − c|² − r²)`, `t = −b ∓ √disc`.
/// Returns the exit distance when the origin is inside the sphere, and `None`
/// on a miss or when the sphere lies entirely behind the origin.
///
/// `ray_sphere.wgsl` evaluates the same expression per fragment.
pub fn ray_sphere_intersect(origin: Vec3, dir: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let b = dir.dot(oc);
    let c = oc.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }

    let sq = disc.sqrt();
    let near = -b - sq;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + sq;
    (far >= 0.0).then_some(far)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn head_on_hit_returns_front_surface() {
        let t = ray_sphere_intersect(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z, Vec3::ZERO, 1.0);
        assert_abs_diff_eq!(t.unwrap(), 9.0, epsilon = 1e-5);
    }

    #[test]
    fn offset_miss() {
        let t = ray_sphere_intersect(Vec3::new(2.0, 0.0, 10.0), -Vec3::Z, Vec3::ZERO, 1.0);
        assert!(t.is_none());
    }

    #[test]
    fn grazing_hit() {
        let t = ray_sphere_intersect(Vec3::new(1.0, 0.0, 10.0), -Vec3::Z, Vec3::ZERO, 1.0);
        assert_abs_diff_eq!(t.unwrap(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn sphere_behind_origin_is_missed() {
        let t = ray_sphere_intersect(Vec3::new(0.0, 0.0, 10.0), Vec3::Z, Vec3::ZERO, 1.0);
        assert!(t.is_none());
    }

    #[test]
    fn origin_inside_returns_exit() {
        let t = ray_sphere_intersect(Vec3::ZERO, Vec3::X, Vec3::ZERO, 2.0);
        assert_abs_diff_eq!(t.unwrap(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn hit_point_lies_on_surface() {
        let origin = Vec3::new(-3.0, 4.0, 12.0);
        let center = Vec3::new(1.5, 1.5, -1.5);
        let dir = (center - origin).normalize();
        let t = ray_sphere_intersect(origin, dir, center, 1.0).unwrap();
        let hit = origin + dir * t;
        assert_abs_diff_eq!((hit - center).length(), 1.0, epsilon = 1e-4);
    }
}

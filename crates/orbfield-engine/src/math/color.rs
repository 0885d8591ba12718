use glam::Vec4;

/// Converts HSV (all components in `[0, 1]`) to opaque straight-alpha RGBA.
///
/// Hue wraps; saturation and value are clamped.
pub fn hsv_to_rgba(hue: f32, saturation: f32, value: f32) -> Vec4 {
    let h = hue.rem_euclid(1.0) * 6.0;
    let s = saturation.clamp(0.0, 1.0);
    let v = value.clamp(0.0, 1.0);

    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    Vec4::new(r + m, g + m, b + m, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec4, b: Vec4) -> bool {
        a.abs_diff_eq(b, 1e-5)
    }

    #[test]
    fn primary_hues() {
        assert!(close(hsv_to_rgba(0.0, 1.0, 1.0), Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert!(close(hsv_to_rgba(1.0 / 3.0, 1.0, 1.0), Vec4::new(0.0, 1.0, 0.0, 1.0)));
        assert!(close(hsv_to_rgba(2.0 / 3.0, 1.0, 1.0), Vec4::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn secondary_hues() {
        assert!(close(hsv_to_rgba(1.0 / 6.0, 1.0, 1.0), Vec4::new(1.0, 1.0, 0.0, 1.0)));
        assert!(close(hsv_to_rgba(0.5, 1.0, 1.0), Vec4::new(0.0, 1.0, 1.0, 1.0)));
        assert!(close(hsv_to_rgba(5.0 / 6.0, 1.0, 1.0), Vec4::new(1.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn zero_saturation_is_grey() {
        let c = hsv_to_rgba(0.42, 0.0, 0.5);
        assert!(close(c, Vec4::new(0.5, 0.5, 0.5, 1.0)));
    }

    #[test]
    fn hue_one_wraps_to_red() {
        assert!(close(hsv_to_rgba(1.0, 1.0, 1.0), hsv_to_rgba(0.0, 1.0, 1.0)));
    }

    #[test]
    fn channels_stay_in_unit_range() {
        for i in 0..=100 {
            let c = hsv_to_rgba(i as f32 / 100.0, 1.0, 1.0);
            for ch in c.to_array() {
                assert!((0.0..=1.0).contains(&ch), "{c:?}");
            }
        }
    }
}

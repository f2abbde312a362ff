//! Vector helpers on top of [`glam::Vec3`].
//!
//! `glam` already provides addition, subtraction, scaling, componentwise
//! multiplication, `dot`, `cross` (right-hand rule) and `length`. The helpers
//! here pin down the two operations whose edge cases matter to the tracer.

pub use glam::Vec3;

/// Normalize `v`, returning it unchanged when its length is zero.
#[inline]
pub fn normalize(v: Vec3) -> Vec3 {
    let len = v.length();
    if len > 0.0 {
        v / len
    } else {
        v
    }
}

/// Reflect `v` about the normal `n`.
///
/// Callers pass the *incident* direction, so Phong shading negates the
/// direction towards the light before calling this.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - n * (2.0 * v.dot(n))
}

/// Component-wise `c^(1/gamma)`.
#[inline]
pub fn gamma_correct(c: Vec3, gamma: f32) -> Vec3 {
    let inv = 1.0 / gamma;
    Vec3::new(c.x.powf(inv), c.y.powf(inv), c.z.powf(inv))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_normalize_unit_length() {
        for v in [
            Vec3::new(3.0, 4.0, 0.0),
            Vec3::new(-1.0, 2.0, -7.5),
            Vec3::new(1e-3, 0.0, 2e-3),
            Vec3::new(100.0, -250.0, 12.0),
        ] {
            assert!((normalize(v).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_normalize_zero_is_identity() {
        assert_eq!(normalize(Vec3::ZERO), Vec3::ZERO);
    }

    #[test]
    fn test_reflect() {
        // Straight down onto an upward normal bounces straight up
        let r = reflect(Vec3::new(0.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(r, Vec3::new(0.0, 1.0, 0.0));

        // 45 degree incidence keeps the tangential component
        let r = reflect(Vec3::new(1.0, -1.0, 0.0), Vec3::Y);
        assert_eq!(r, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_cross_right_handed() {
        assert_eq!(Vec3::X.cross(Vec3::Y), Vec3::Z);
    }

    #[test]
    fn test_gamma_correct() {
        let c = gamma_correct(Vec3::new(0.0, 1.0, 0.25), 2.0);
        assert!(c.abs_diff_eq(Vec3::new(0.0, 1.0, 0.5), 1e-6));
    }
}

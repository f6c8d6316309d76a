//! Vector/matrix kernel used by the transform engine.
//!
//! Thin, named operations over glam types. Matrix composition always
//! right-multiplies (`m * op`), so a chain of `translate`, `rotate`, `scale`
//! calls builds a conventional model matrix in call order.

use glam::{Mat4, Vec3};

pub const WORLD_X: Vec3 = Vec3::X;
pub const WORLD_Y: Vec3 = Vec3::Y;
pub const WORLD_Z: Vec3 = Vec3::Z;

/// Axis used by the composite world-transform rotation.
pub const DIAGONAL_AXIS: Vec3 = Vec3::ONE;

pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    a + b
}

pub fn subtract(a: Vec3, b: Vec3) -> Vec3 {
    a - b
}

/// `base + dir * scalar`.
pub fn scale_and_add(base: Vec3, dir: Vec3, scalar: f32) -> Vec3 {
    base + dir * scalar
}

pub fn cross(a: Vec3, b: Vec3) -> Vec3 {
    a.cross(b)
}

pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a.dot(b)
}

pub fn length(v: Vec3) -> f32 {
    v.length()
}

/// Unit vector in the direction of `v`, or the zero vector when `v` has no length.
///
/// Any non-zero length is normalized, however short.
pub fn normalize(v: Vec3) -> Vec3 {
    v.normalize_or_zero()
}

/// Unsigned angle between two vectors in radians.
///
/// The cosine is clamped to `[-1, 1]` before `acos`. A zero-length operand
/// yields `0.0`, which turns any rotation built from the result into a no-op.
pub fn angle_between(a: Vec3, b: Vec3) -> f32 {
    let mag = a.length() * b.length();
    if mag == 0.0 || !mag.is_finite() {
        return 0.0;
    }
    (a.dot(b) / mag).clamp(-1.0, 1.0).acos()
}

pub fn identity() -> Mat4 {
    Mat4::IDENTITY
}

/// `m * T(v)`.
pub fn translate(m: Mat4, v: Vec3) -> Mat4 {
    m * Mat4::from_translation(v)
}

/// `m * R(axis, rad)`. The axis is normalized first; a zero axis leaves `m` unchanged.
pub fn rotate(m: Mat4, rad: f32, axis: Vec3) -> Mat4 {
    let axis = normalize(axis);
    if axis == Vec3::ZERO {
        return m;
    }
    m * Mat4::from_axis_angle(axis, rad)
}

/// `m * S(v)`.
pub fn scale(m: Mat4, v: Vec3) -> Mat4 {
    m * Mat4::from_scale(v)
}

/// Right-handed view matrix looking from `eye` towards `target`.
///
/// Returns the identity when `eye` and `target` coincide.
pub fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    if eye == target {
        return Mat4::IDENTITY;
    }
    let f = normalize(target - eye);
    let s = normalize(f.cross(up));
    let u = s.cross(f);
    Mat4::from_cols(
        glam::Vec4::new(s.x, u.x, -f.x, 0.0),
        glam::Vec4::new(s.y, u.y, -f.y, 0.0),
        glam::Vec4::new(s.z, u.z, -f.z, 0.0),
        glam::Vec4::new(-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0),
    )
}

/// Transform `v` as a point (`w = 1`).
pub fn transform_point(m: Mat4, v: Vec3) -> Vec3 {
    m.transform_point3(v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn scale_and_add_moves_along_direction() {
        let p = scale_and_add(Vec3::new(1.0, 2.0, 3.0), Vec3::X, 2.5);
        assert_eq!(p, Vec3::new(3.5, 2.0, 3.0));
    }

    #[test]
    fn add_subtract_cross() {
        assert_eq!(add(Vec3::X, Vec3::Y), Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(subtract(Vec3::X, Vec3::Y), Vec3::new(1.0, -1.0, 0.0));
        assert_eq!(cross(Vec3::X, Vec3::Y), Vec3::Z);
    }

    #[test]
    fn normalize_zero_is_zero() {
        let n = normalize(Vec3::ZERO);
        assert_eq!(n, Vec3::ZERO);
        assert!(!n.is_nan());
    }

    #[test]
    fn normalize_unit_length() {
        let n = normalize(Vec3::new(3.0, 4.0, 0.0));
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!(n.abs_diff_eq(Vec3::new(0.6, 0.8, 0.0), 1e-6));
    }

    #[test]
    fn normalize_short_vector_is_unit() {
        let n = normalize(Vec3::new(0.0, 5.4e-8, 0.0));
        assert!(n.abs_diff_eq(Vec3::Y, 1e-6));
        let n = normalize(Vec3::new(1e-9, 0.0, 1e-9));
        assert!((n.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn angle_between_short_vectors() {
        let angle = angle_between(Vec3::new(3e-7, 0.0, 0.0), Vec3::new(0.0, 2e-7, 0.0));
        assert!((angle - FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn look_at_nearby_target_is_finite() {
        let eye = Vec3::new(1.0, 1.0, 1.0);
        let m = look_at(eye, eye + Vec3::new(0.0, 1e-6, 0.0), WORLD_Z);
        assert!(m.is_finite());
        assert_ne!(m, Mat4::IDENTITY);
    }

    #[test]
    fn angle_between_basic() {
        assert!((angle_between(Vec3::X, Vec3::Y) - FRAC_PI_2).abs() < 1e-6);
        assert!((angle_between(Vec3::X, -Vec3::X) - PI).abs() < 1e-6);
        assert_eq!(angle_between(Vec3::X, Vec3::X * 5.0), 0.0);
    }

    #[test]
    fn angle_between_clamps_overshoot() {
        // Nearly parallel vectors whose cosine can overshoot 1.0 in f32.
        let a = Vec3::new(0.577_350_3, 0.577_350_3, 0.577_350_3);
        let angle = angle_between(a, a);
        assert!(!angle.is_nan());
        assert!(angle.abs() < 1e-3);
    }

    #[test]
    fn angle_between_zero_vector_is_zero() {
        assert_eq!(angle_between(Vec3::ZERO, Vec3::X), 0.0);
    }

    #[test]
    fn translate_rotate_scale_compose_in_call_order() {
        let m = translate(identity(), Vec3::new(1.0, 0.0, 0.0));
        let m = rotate(m, FRAC_PI_2, WORLD_Z);
        let m = scale(m, Vec3::splat(2.0));
        // Scale first, then rotate X onto Y, then translate.
        let p = transform_point(m, Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-5));
    }

    #[test]
    fn rotate_normalizes_axis() {
        let a = rotate(identity(), 0.7, Vec3::new(0.0, 0.0, 10.0));
        let b = rotate(identity(), 0.7, WORLD_Z);
        assert!(a.abs_diff_eq(b, 1e-6));
    }

    #[test]
    fn rotate_zero_axis_is_noop() {
        let m = translate(identity(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(rotate(m, 1.0, Vec3::ZERO), m);
    }

    #[test]
    fn look_at_matches_glam() {
        let eye = Vec3::new(-1.7, 3.22, 3.0);
        let target = Vec3::new(0.0, -1.0, 1.85);
        let ours = look_at(eye, target, WORLD_Z);
        let theirs = Mat4::look_at_rh(eye, target, WORLD_Z);
        assert!(ours.abs_diff_eq(theirs, 1e-5));
    }

    #[test]
    fn look_at_degenerate_is_identity() {
        let p = Vec3::new(1.0, 1.0, 1.0);
        assert_eq!(look_at(p, p, WORLD_Z), Mat4::IDENTITY);
    }
}

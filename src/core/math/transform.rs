use crate::core::math::numeric::Real;
use crate::core::math::vector::to_f64_vector;
use nalgebra::{Matrix3, Point3, Vector3};

//=================================
// Rotation Matrix Factory
//=================================

/// Factory for the rotation matrices used to turn the camera.
///
/// Rotations are built in `f64` (they need `sin`/`cos`) and applied to any
/// [`Real`] backend, so a rotated rational viewport is exact with respect to the
/// rounded matrix, not to the ideal rotation.
pub struct TransformFactory;

#[rustfmt::skip]
impl TransformFactory {
    /// Rotation around an arbitrary axis using Rodrigues' rotation formula.
    /// Returns `None` for a zero axis.
    pub fn rotation(axis: &Vector3<f64>, angle_rad: f64) -> Option<Matrix3<f64>> {
        let norm = axis.norm();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        let axis_unit = axis / norm;
        let x = axis_unit.x;
        let y = axis_unit.y;
        let z = axis_unit.z;
        let c = angle_rad.cos();
        let s = angle_rad.sin();
        let t = 1.0 - c;

        Some(Matrix3::new(
            t * x * x + c,     t * x * y - z * s, t * x * z + y * s,
            t * x * y + z * s, t * y * y + c,     t * y * z - x * s,
            t * x * z - y * s, t * y * z + x * s, t * z * z + c,
        ))
    }
}

/// Applies an `f64` rotation matrix to a vector of any backend.
pub fn rotate_vector<T: Real>(m: &Matrix3<f64>, v: &Vector3<T>) -> Vector3<T> {
    let row = |r: usize| {
        T::from_f64(m[(r, 0)]) * v.x.clone()
            + T::from_f64(m[(r, 1)]) * v.y.clone()
            + T::from_f64(m[(r, 2)]) * v.z.clone()
    };
    Vector3::new(row(0), row(1), row(2))
}

/// Rotates `point` around the line through `pivot` along `axis`.
pub fn rotate_about<T: Real>(
    point: &Point3<T>,
    pivot: &Point3<T>,
    axis: &Vector3<T>,
    angle_rad: f64,
) -> Option<Point3<T>> {
    let m = TransformFactory::rotation(&to_f64_vector(axis), angle_rad)?;
    let offset = point - pivot;
    Some(pivot + rotate_vector(&m, &offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn quarter_turn_about_z() {
        let p = rotate_about(
            &Point3::new(2.0, 1.0, 0.0),
            &Point3::new(1.0, 1.0, 0.0),
            &Vector3::new(0.0, 0.0, 1.0),
            FRAC_PI_2,
        )
        .unwrap();
        assert!((p.x - 1.0).abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
        assert!(p.z.abs() < 1e-12);
    }

    #[test]
    fn zero_axis_is_rejected() {
        assert!(TransformFactory::rotation(&Vector3::zeros(), 1.0).is_none());
    }
}

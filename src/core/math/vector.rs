use crate::core::math::numeric::Real;
use nalgebra::{Point3, Vector3};

//=================================
// Vector/Point kernel helpers
//=================================

#[inline]
pub fn length_squared<T: Real>(v: &Vector3<T>) -> T {
    v.dot(v)
}

#[inline]
pub fn distance_squared<T: Real>(a: &Point3<T>, b: &Point3<T>) -> T {
    let d = b - a;
    d.dot(&d)
}

/// Unit vector in the direction of `v`, or `None` for the zero vector.
/// Uses [`Real::sqrt`], so the result is approximate for rationals.
pub fn normalized<T: Real>(v: &Vector3<T>) -> Option<Vector3<T>> {
    let length = length_squared(v).sqrt();
    if length.is_zero() {
        None
    } else {
        Some(v / length)
    }
}

#[inline]
pub fn reversed<T: Real>(v: &Vector3<T>) -> Vector3<T> {
    -v
}

/// Lossy conversion used by shading, which always runs in `f64`.
pub fn to_f64_vector<T: Real>(v: &Vector3<T>) -> Vector3<f64> {
    Vector3::new(v.x.to_f64(), v.y.to_f64(), v.z.to_f64())
}

pub fn vector_from_f64<T: Real>(v: &Vector3<f64>) -> Vector3<T> {
    Vector3::new(T::from_f64(v.x), T::from_f64(v.y), T::from_f64(v.z))
}

pub fn point_from_array<T: Real>(p: [f64; 3]) -> Point3<T> {
    Point3::new(T::from_f64(p[0]), T::from_f64(p[1]), T::from_f64(p[2]))
}

pub fn vector_from_array<T: Real>(v: [f64; 3]) -> Vector3<T> {
    Vector3::new(T::from_f64(v[0]), T::from_f64(v[1]), T::from_f64(v[2]))
}

/// True when `a` and `b` are parallel, i.e. `|a x b|^2 <= tol^2 |a|^2 |b|^2`.
pub fn is_parallel<T: Real>(a: &Vector3<T>, b: &Vector3<T>, tolerance: &T) -> bool {
    let cross = a.cross(b);
    length_squared(&cross)
        <= tolerance.clone() * tolerance.clone() * length_squared(a) * length_squared(b)
}

/// Arithmetic mean of a non-empty point set.
pub fn centroid<T: Real>(points: &[Point3<T>]) -> Option<Point3<T>> {
    if points.is_empty() {
        return None;
    }
    let mut sum = Vector3::<T>::zeros();
    for p in points {
        sum += &p.coords;
    }
    Some(Point3::from(sum / T::from_usize(points.len())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::numeric::Exact;

    #[test]
    fn distances_are_squared() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 6.0, 3.0);
        assert_eq!(distance_squared(&a, &b), 25.0);
        assert_eq!(length_squared(&(b - a)), 25.0);
    }

    #[test]
    fn normalize_rejects_zero() {
        assert!(normalized(&Vector3::<f64>::zeros()).is_none());
        let n = normalized(&Vector3::new(0.0, 3.0, 4.0)).unwrap();
        assert!((n.y - 0.6).abs() < 1e-12);
        assert!((n.z - 0.8).abs() < 1e-12);
    }

    #[test]
    fn reverse_and_parallel() {
        let v = Vector3::new(1.0, -2.0, 0.5);
        assert_eq!(reversed(&v), Vector3::new(-1.0, 2.0, -0.5));
        assert!(is_parallel(&v, &(v * -3.0), &1e-12));
        assert!(!is_parallel(&v, &Vector3::new(0.0, 0.0, 1.0), &1e-12));
    }

    #[test]
    fn rational_centroid_is_exact() {
        let pts: Vec<Point3<Exact>> = vec![
            point_from_array([0.0, 0.0, 0.0]),
            point_from_array([1.0, 0.0, 0.0]),
            point_from_array([0.0, 1.0, 0.0]),
        ];
        let c = centroid(&pts).unwrap();
        let third = <Exact as Real>::from_usize(1) / <Exact as Real>::from_usize(3);
        assert_eq!(c.x, third);
        assert_eq!(c.y, third);
        assert!(centroid::<f64>(&[]).is_none());
    }
}

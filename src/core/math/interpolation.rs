use crate::core::math::numeric::Real;
use crate::core::math::vector::length_squared;
use nalgebra::{Point2, Point3, Vector3};

/// Calculates the barycentric coordinates (alpha, beta, gamma) of `p` with
/// respect to triangle (a, b, c). `p` is assumed to lie in the triangle's plane.
///
/// Returns `None` if the triangle is degenerate (zero area).
///
/// # Returns
/// A Vector3 where:
/// - x: alpha (weight for a)
/// - y: beta  (weight for b)
/// - z: gamma (weight for c)
pub fn barycentric_coordinates<T: Real>(
    p: &Point3<T>,
    a: &Point3<T>,
    b: &Point3<T>,
    c: &Point3<T>,
) -> Option<Vector3<T>> {
    let n = (b - a).cross(&(c - a));
    let area_x2_sq = length_squared(&n);
    if area_x2_sq.is_zero() {
        return None;
    }

    // Signed sub-areas projected on the normal, all scaled by |n|^2.
    let alpha = n.dot(&(c - b).cross(&(p - b))) / area_x2_sq.clone();
    let beta = n.dot(&(a - c).cross(&(p - c))) / area_x2_sq;
    let gamma = T::one() - alpha.clone() - beta.clone();

    Some(Vector3::new(alpha, beta, gamma))
}

/// Checks whether barycentric coordinates describe a point inside the triangle,
/// boundary included. A non-zero tolerance widens the test so that adjacent
/// triangles leave no cracks under floating-point rounding.
#[inline]
pub fn is_inside_triangle<T: Real>(bary: &Vector3<T>, tolerance: &T) -> bool {
    let floor = -tolerance.clone();
    bary.x >= floor && bary.y >= floor && bary.z >= floor
}

/// Index of the axis along which `normal` is largest in magnitude.
/// Dropping it projects a planar ring to 2D without collapsing it.
pub fn dominant_axis<T: Real>(normal: &Vector3<T>) -> usize {
    let (x, y, z) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    if x >= y && x >= z {
        0
    } else if y >= z {
        1
    } else {
        2
    }
}

/// Projects a 3D point onto the coordinate plane orthogonal to `drop_axis`.
pub fn project_to_2d<T: Real>(p: &Point3<T>, drop_axis: usize) -> Point2<T> {
    match drop_axis {
        0 => Point2::new(p.y.clone(), p.z.clone()),
        1 => Point2::new(p.z.clone(), p.x.clone()),
        _ => Point2::new(p.x.clone(), p.y.clone()),
    }
}

/// True if `p` lies on segment `ab` within `tolerance` (a distance).
pub fn is_on_segment_2d<T: Real>(p: &Point2<T>, a: &Point2<T>, b: &Point2<T>, tolerance: &T) -> bool {
    let e = b - a;
    let w = p - a;
    let len_sq = e.dot(&e);
    let tol_sq = tolerance.clone() * tolerance.clone();
    if len_sq.is_zero() {
        return w.dot(&w) <= tol_sq;
    }
    let cross = e.x.clone() * w.y.clone() - e.y.clone() * w.x.clone();
    if cross.clone() * cross > tol_sq * len_sq.clone() {
        return false;
    }
    let along = e.dot(&w);
    let slack = tolerance.clone() * len_sq.sqrt();
    along >= -slack.clone() && along <= len_sq + slack
}

/// Crossing-number point-in-ring test with the boundary counted as inside.
pub fn ring_contains_2d<T: Real>(ring: &[Point2<T>], p: &Point2<T>, tolerance: &T) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    for i in 0..n {
        if is_on_segment_2d(p, &ring[i], &ring[(i + 1) % n], tolerance) {
            return true;
        }
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (&ring[i], &ring[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            // pi.y != pj.y here, so the division is safe
            let x_cross = pi.x.clone()
                + (p.y.clone() - pi.y.clone()) * (pj.x.clone() - pi.x.clone())
                    / (pj.y.clone() - pi.y.clone());
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

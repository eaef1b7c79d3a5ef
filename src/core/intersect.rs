use crate::core::geometry::{LineSegment, Plane, Ray, RayPlane};
use crate::core::math::interpolation::{
    barycentric_coordinates, dominant_axis, is_inside_triangle, project_to_2d, ring_contains_2d,
};
use crate::core::math::numeric::{Real, max_of, min_of};
use crate::core::math::vector::distance_squared;
use nalgebra::{Point2, Point3};

/// Outcome of a ray/surface test.
///
/// `Indeterminate` is an expected result for degenerate or numerically
/// unresolvable input; the renderer skips it rather than treating it as an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Intersection<T: Real> {
    Miss,
    Point(Point3<T>),
    /// The ray runs inside the surface's plane and overlaps it along a segment.
    Segment(Point3<T>, Point3<T>),
    Indeterminate(&'static str),
}

impl<T: Real> Intersection<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Intersection::Point(_) | Intersection::Segment(..))
    }
}

/// Intersects a ray with a planar area given by its ordered vertices.
///
/// Only hits strictly in front of the origin (`t > tolerance`) count.
/// Triangles use barycentric coordinates; larger rings use a crossing-number
/// test in the plane's dominant projection. Boundaries are inclusive.
pub fn intersect_ray_area<T: Real>(
    ray: &Ray<T>,
    vertices: &[Point3<T>],
    plane: &Plane<T>,
    tolerance: &T,
) -> Intersection<T> {
    if vertices.len() < 3 {
        return Intersection::Indeterminate("fewer than three vertices");
    }
    if plane.is_degenerate(vertices, tolerance) {
        return Intersection::Indeterminate("zero-area surface");
    }
    if ray.is_degenerate() {
        return Intersection::Indeterminate("zero-length ray direction");
    }

    match plane.intersect_ray(ray, tolerance) {
        RayPlane::Parallel => Intersection::Miss,
        RayPlane::Contained => edge_on_overlap(ray, vertices, plane, tolerance),
        RayPlane::Hit(t) => {
            if t <= *tolerance {
                return Intersection::Miss;
            }
            let p = ray.at(&t);
            if area_contains(vertices, plane, &p, tolerance) {
                Intersection::Point(p)
            } else {
                Intersection::Miss
            }
        }
    }
}

/// Whether a point already known to lie in `plane` falls inside the area.
pub fn area_contains<T: Real>(
    vertices: &[Point3<T>],
    plane: &Plane<T>,
    p: &Point3<T>,
    tolerance: &T,
) -> bool {
    if vertices.len() == 3 {
        return match barycentric_coordinates(p, &vertices[0], &vertices[1], &vertices[2]) {
            Some(bary) => is_inside_triangle(&bary, tolerance),
            None => false,
        };
    }
    let axis = dominant_axis(&plane.normal);
    let ring: Vec<Point2<T>> = vertices.iter().map(|v| project_to_2d(v, axis)).collect();
    ring_contains_2d(&ring, &project_to_2d(p, axis), tolerance)
}

/// Exact squared distance from `p` to a planar area.
///
/// If the orthogonal projection of `p` falls inside the area the plane distance
/// is returned, otherwise the distance to the nearest edge. Degenerate areas
/// fall back to their edges, so the result is always a sound lower bound on
/// the distance from `p` to any point of the area.
pub fn distance_squared_to_area<T: Real>(
    p: &Point3<T>,
    vertices: &[Point3<T>],
    plane: &Plane<T>,
) -> Option<T> {
    if vertices.is_empty() {
        return None;
    }
    if let Some(q) = plane.project_point(p)
        && area_contains(vertices, plane, &q, &T::zero())
    {
        return Some(distance_squared(p, &q));
    }

    let n = vertices.len();
    let mut best: Option<T> = None;
    for i in 0..n {
        let edge = LineSegment::new(vertices[i].clone(), vertices[(i + 1) % n].clone());
        let d = edge.distance_squared_to(p);
        best = Some(match best {
            Some(b) => min_of(b, d),
            None => d,
        });
    }
    best
}

/// Overlap of a ray lying in the area's plane, found from edge crossings.
fn edge_on_overlap<T: Real>(
    ray: &Ray<T>,
    vertices: &[Point3<T>],
    plane: &Plane<T>,
    tolerance: &T,
) -> Intersection<T> {
    let axis = dominant_axis(&plane.normal);
    let o = project_to_2d(&ray.origin, axis);
    let tip = project_to_2d(&ray.at(&T::one()), axis);
    let d = &tip - &o;

    let mut params: Vec<T> = Vec::new();
    let ring: Vec<Point2<T>> = vertices.iter().map(|v| project_to_2d(v, axis)).collect();
    if ring_contains_2d(&ring, &o, tolerance) {
        params.push(T::zero());
    }

    let n = ring.len();
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        let e = b - a;
        let denom = d.x.clone() * e.y.clone() - d.y.clone() * e.x.clone();
        if denom.is_zero() {
            continue;
        }
        let w = a - &o;
        let t = (w.x.clone() * e.y.clone() - w.y.clone() * e.x.clone()) / denom.clone();
        let s = (w.x.clone() * d.y.clone() - w.y.clone() * d.x.clone()) / denom;
        if t >= T::zero() && s >= T::zero() && s <= T::one() {
            params.push(t);
        }
    }

    let mut iter = params.into_iter();
    let Some(first) = iter.next() else {
        return Intersection::Miss;
    };
    let (lo, hi) = iter.fold((first.clone(), first), |(lo, hi), t| {
        (min_of(lo, t.clone()), max_of(hi, t))
    });
    Intersection::Segment(ray.at(&lo), ray.at(&hi))
}

/// Clips segment `ab` to the axis-aligned rectangle `[min, max]` (Liang–Barsky).
/// Boundaries are inclusive; returns the clipped endpoints or `None`.
pub fn clip_segment_to_rect<T: Real>(
    a: &Point2<T>,
    b: &Point2<T>,
    min: &Point2<T>,
    max: &Point2<T>,
) -> Option<(Point2<T>, Point2<T>)> {
    let d = b - a;
    let mut t0 = T::zero();
    let mut t1 = T::one();

    let checks = [
        (-d.x.clone(), a.x.clone() - min.x.clone()),
        (d.x.clone(), max.x.clone() - a.x.clone()),
        (-d.y.clone(), a.y.clone() - min.y.clone()),
        (d.y.clone(), max.y.clone() - a.y.clone()),
    ];
    for (p, q) in checks {
        if p.is_zero() {
            if q < T::zero() {
                return None;
            }
            continue;
        }
        let r = q / p.clone();
        if p < T::zero() {
            if r > t1 {
                return None;
            }
            if r > t0 {
                t0 = r;
            }
        } else {
            if r < t0 {
                return None;
            }
            if r < t1 {
                t1 = r;
            }
        }
    }
    Some((a + &d * t0, a + &d * t1))
}

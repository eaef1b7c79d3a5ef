use crate::core::math::numeric::{Real, max_of};
use crate::core::math::vector::{distance_squared, length_squared};
use nalgebra::{Point3, Vector3};

/// A semi-infinite line `origin + t * direction`, `t >= 0`.
///
/// The direction is kept unnormalized so that rays stay exact for rational
/// backends; `t` is therefore measured in multiples of `direction`.
#[derive(Debug, Clone, PartialEq)]
pub struct Ray<T: Real> {
    pub origin: Point3<T>,
    pub direction: Vector3<T>,
}

impl<T: Real> Ray<T> {
    pub fn new(origin: Point3<T>, direction: Vector3<T>) -> Self {
        Self { origin, direction }
    }

    /// Ray from `origin` passing through `target` at `t = 1`.
    pub fn through(origin: Point3<T>, target: &Point3<T>) -> Self {
        let direction = target - &origin;
        Self { origin, direction }
    }

    #[inline]
    pub fn at(&self, t: &T) -> Point3<T> {
        &self.origin + &self.direction * t.clone()
    }

    pub fn is_degenerate(&self) -> bool {
        length_squared(&self.direction).is_zero()
    }
}

/// How a ray meets a plane.
#[derive(Debug, Clone, PartialEq)]
pub enum RayPlane<T: Real> {
    /// Parallel and off the plane.
    Parallel,
    /// The ray lies in the plane.
    Contained,
    /// Crosses the plane at parameter `t` (may be negative).
    Hit(T),
}

/// An infinite plane through `point` with (unnormalized) `normal`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane<T: Real> {
    pub point: Point3<T>,
    pub normal: Vector3<T>,
}

impl<T: Real> Plane<T> {
    pub fn new(point: Point3<T>, normal: Vector3<T>) -> Self {
        Self { point, normal }
    }

    /// Plane through three points; the normal follows the right-hand rule.
    pub fn from_points(a: &Point3<T>, b: &Point3<T>, c: &Point3<T>) -> Self {
        let normal = (b - a).cross(&(c - a));
        Self {
            point: a.clone(),
            normal,
        }
    }

    /// Plane of an ordered ring using Newell's method, which stays well
    /// defined for non-convex rings. The normal has twice the ring's area as
    /// its length, so it is zero for degenerate rings.
    pub fn from_ring(points: &[Point3<T>]) -> Option<Self> {
        let first = points.first()?;
        let n = points.len();
        let mut normal = Vector3::<T>::zeros();
        for i in 0..n {
            let cur = &points[i];
            let next = &points[(i + 1) % n];
            normal.x += (cur.y.clone() - next.y.clone()) * (cur.z.clone() + next.z.clone());
            normal.y += (cur.z.clone() - next.z.clone()) * (cur.x.clone() + next.x.clone());
            normal.z += (cur.x.clone() - next.x.clone()) * (cur.y.clone() + next.y.clone());
        }
        Some(Self {
            point: first.clone(),
            normal,
        })
    }

    /// True when the normal vanishes relative to the size of the ring it was
    /// built from: `|normal|^2 <= tolerance^2 * (longest edge^2)^2`. The
    /// normal scales with area, so the test gives the same answer for a ring
    /// and any uniformly scaled copy of it.
    pub fn is_degenerate(&self, ring: &[Point3<T>], tolerance: &T) -> bool {
        let normal_sq = length_squared(&self.normal);
        if normal_sq.is_zero() {
            return true;
        }
        let n = ring.len();
        let edge_sq = (0..n)
            .map(|i| distance_squared(&ring[i], &ring[(i + 1) % n]))
            .fold(T::zero(), max_of);
        normal_sq <= tolerance.clone() * tolerance.clone() * edge_sq.clone() * edge_sq
    }

    /// `normal . (p - point)`: zero on the plane, sign tells the side.
    /// Scaled by `|normal|`.
    pub fn signed_offset(&self, p: &Point3<T>) -> T {
        self.normal.dot(&(p - &self.point))
    }

    /// Orthogonal projection of `p` onto the plane, `None` for a zero normal.
    pub fn project_point(&self, p: &Point3<T>) -> Option<Point3<T>> {
        let nn = length_squared(&self.normal);
        if nn.is_zero() {
            return None;
        }
        let k = self.signed_offset(p) / nn;
        Some(p - &self.normal * k)
    }

    /// Same plane with the normal flipped.
    pub fn flipped(&self) -> Self {
        Self {
            point: self.point.clone(),
            normal: -&self.normal,
        }
    }

    /// Classifies how `ray` meets the plane. `tolerance` is an angular slack
    /// used to call near-parallel rays parallel (zero for exact arithmetic).
    pub fn intersect_ray(&self, ray: &Ray<T>, tolerance: &T) -> RayPlane<T> {
        let denom = self.normal.dot(&ray.direction);
        let offset = self.normal.dot(&(&self.point - &ray.origin));
        let scale_sq = length_squared(&self.normal) * length_squared(&ray.direction);
        let tol_sq = tolerance.clone() * tolerance.clone();

        if denom.is_zero() || denom.clone() * denom.clone() <= tol_sq.clone() * scale_sq {
            let origin_sq = offset.clone() * offset;
            return if origin_sq <= tol_sq * length_squared(&self.normal) {
                RayPlane::Contained
            } else {
                RayPlane::Parallel
            };
        }
        RayPlane::Hit(offset / denom)
    }
}

/// A finite straight segment between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment<T: Real> {
    pub start: Point3<T>,
    pub end: Point3<T>,
}

impl<T: Real> LineSegment<T> {
    pub fn new(start: Point3<T>, end: Point3<T>) -> Self {
        Self { start, end }
    }

    pub fn direction(&self) -> Vector3<T> {
        &self.end - &self.start
    }

    pub fn length_squared(&self) -> T {
        distance_squared(&self.start, &self.end)
    }

    pub fn is_degenerate(&self) -> bool {
        self.length_squared().is_zero()
    }

    /// Point at parameter `s` in `[0, 1]`.
    pub fn at(&self, s: &T) -> Point3<T> {
        &self.start + self.direction() * s.clone()
    }

    /// Closest point of the segment to `p`. A zero-length segment returns `start`.
    pub fn closest_point_to(&self, p: &Point3<T>) -> Point3<T> {
        let d = self.direction();
        let len_sq = length_squared(&d);
        if len_sq.is_zero() {
            return self.start.clone();
        }
        let s = clamp_unit(d.dot(&(p - &self.start)) / len_sq);
        self.at(&s)
    }

    pub fn distance_squared_to(&self, p: &Point3<T>) -> T {
        distance_squared(&self.closest_point_to(p), p)
    }

    /// Point of the segment closest to the line carrying `ray`.
    ///
    /// Parallel configurations fall back to the endpoint nearer the ray origin.
    pub fn closest_point_to_ray(&self, ray: &Ray<T>) -> Point3<T> {
        let u = self.direction();
        let v = &ray.direction;
        let w0 = &self.start - &ray.origin;
        let a = u.dot(&u);
        let b = u.dot(v);
        let c = v.dot(v);
        let d = u.dot(&w0);
        let e = v.dot(&w0);
        if a.is_zero() {
            return self.start.clone();
        }
        let denom = a.clone() * c.clone() - b.clone() * b.clone();
        if denom.is_zero() || c.is_zero() {
            return if distance_squared(&self.start, &ray.origin)
                <= distance_squared(&self.end, &ray.origin)
            {
                self.start.clone()
            } else {
                self.end.clone()
            };
        }
        let s = clamp_unit((b * e - c * d) / denom);
        self.at(&s)
    }
}

#[inline]
fn clamp_unit<T: Real>(s: T) -> T {
    if s < T::zero() {
        T::zero()
    } else if s > T::one() {
        T::one()
    } else {
        s
    }
}

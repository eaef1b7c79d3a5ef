use crate::core::math::numeric::{Real, max_of, min_of};
use crate::core::math::vector::length_squared;
use nalgebra::{Point3, Vector3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct Aabb<T: Real> {
    pub min: Point3<T>,
    pub max: Point3<T>,
}

impl<T: Real> Aabb<T> {
    /// Box spanning two arbitrary corners (re-sorted per axis).
    pub fn new(a: Point3<T>, b: Point3<T>) -> Self {
        let mut aabb = Self::from_point(a);
        aabb.include(&b);
        aabb
    }

    pub fn from_point(p: Point3<T>) -> Self {
        Self {
            min: p.clone(),
            max: p,
        }
    }

    /// Box around a point set, `None` when the set is empty.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<T>>,
        T: 'a,
    {
        let mut iter = points.into_iter();
        let mut aabb = Self::from_point(iter.next()?.clone());
        for p in iter {
            aabb.include(p);
        }
        Some(aabb)
    }

    /// Grows the box to contain `p`.
    pub fn include(&mut self, p: &Point3<T>) {
        for axis in 0..3 {
            if p[axis] < self.min[axis] {
                self.min[axis] = p[axis].clone();
            }
            if p[axis] > self.max[axis] {
                self.max[axis] = p[axis].clone();
            }
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        let pick = |f: fn(T, T) -> T, a: &Point3<T>, b: &Point3<T>| {
            Point3::new(
                f(a.x.clone(), b.x.clone()),
                f(a.y.clone(), b.y.clone()),
                f(a.z.clone(), b.z.clone()),
            )
        };
        Self {
            min: pick(min_of, &self.min, &other.min),
            max: pick(max_of, &self.max, &other.max),
        }
    }

    /// Optional-aware union, used while a container grows from nothing.
    pub fn merge(current: Option<Self>, other: &Self) -> Self {
        match current {
            Some(aabb) => aabb.union(other),
            None => other.clone(),
        }
    }

    pub fn centroid(&self) -> Point3<T> {
        Point3::from((&self.min.coords + &self.max.coords) * T::half())
    }

    pub fn extent(&self) -> Vector3<T> {
        &self.max - &self.min
    }

    pub fn diagonal_length_squared(&self) -> T {
        length_squared(&self.extent())
    }

    pub fn contains(&self, p: &Point3<T>) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }

    pub fn corners(&self) -> [Point3<T>; 8] {
        let (lo, hi) = (&self.min, &self.max);
        let corner = |x: &T, y: &T, z: &T| Point3::new(x.clone(), y.clone(), z.clone());
        [
            corner(&lo.x, &lo.y, &lo.z),
            corner(&hi.x, &lo.y, &lo.z),
            corner(&lo.x, &hi.y, &lo.z),
            corner(&hi.x, &hi.y, &lo.z),
            corner(&lo.x, &lo.y, &hi.z),
            corner(&hi.x, &lo.y, &hi.z),
            corner(&lo.x, &hi.y, &hi.z),
            corner(&hi.x, &hi.y, &hi.z),
        ]
    }
}

use crate::core::color::Color;
use crate::core::geometry::{LineSegment, Plane, Ray};
use crate::core::intersect::{Intersection, distance_squared_to_area, intersect_ray_area};
use crate::core::math::aabb::Aabb;
use crate::core::math::numeric::Real;
use crate::core::math::vector::{centroid, length_squared, to_f64_vector};
use crate::error::SceneError;
use crate::scene::light::Lighting;
use crate::scene::material::Material;
use nalgebra::{Point3, Vector3};

//=================================
// Facet (triangle or planar area)
//=================================

/// A flat renderable surface: a triangle or a planar ring of three or more
/// vertices.
#[derive(Debug, Clone)]
pub struct Facet<T: Real> {
    vertices: Vec<Point3<T>>,
    plane: Plane<T>,
    /// Explicit normal supplied by a mesh file; takes priority for shading.
    normal: Option<Vector3<T>>,
    /// Per-facet attribute carried by binary mesh formats.
    pub attribute: Option<u16>,
    pub material: Material,
}

impl<T: Real> Facet<T> {
    pub fn triangle(a: Point3<T>, b: Point3<T>, c: Point3<T>, color: Color) -> Self {
        let plane = Plane::from_points(&a, &b, &c);
        Self {
            vertices: vec![a, b, c],
            plane,
            normal: None,
            attribute: None,
            material: Material::new(color),
        }
    }

    /// Facet from an ordered ring. The plane normal follows the ring's winding.
    pub fn new(vertices: Vec<Point3<T>>, color: Color) -> Result<Self, SceneError> {
        if vertices.len() < 3 {
            return Err(SceneError::MalformedPrimitive(format!(
                "a facet needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        let plane = Plane::from_ring(&vertices).ok_or_else(|| {
            SceneError::MalformedPrimitive("facet has no vertices".to_string())
        })?;
        Ok(Self {
            vertices,
            plane,
            normal: None,
            attribute: None,
            material: Material::new(color),
        })
    }

    pub fn with_normal(mut self, normal: Vector3<T>) -> Self {
        self.normal = Some(normal);
        self
    }

    pub fn with_attribute(mut self, attribute: u16) -> Self {
        self.attribute = Some(attribute);
        self
    }

    pub fn vertices(&self) -> &[Point3<T>] {
        &self.vertices
    }

    pub fn plane(&self) -> &Plane<T> {
        &self.plane
    }

    pub fn explicit_normal(&self) -> Option<&Vector3<T>> {
        self.normal.as_ref()
    }

    pub fn bounds(&self) -> Option<Aabb<T>> {
        Aabb::from_points(self.vertices.iter())
    }

    /// Normal used for shading: the explicit one when present and non-zero,
    /// otherwise the winding normal of the plane.
    pub fn shading_normal(&self) -> Vector3<f64> {
        match &self.normal {
            Some(n) if !length_squared(n).is_zero() => to_f64_vector(n),
            _ => to_f64_vector(&self.plane.normal),
        }
    }

    /// Reverses the winding if needed so the plane normal points away from
    /// `reference`. A reference in the plane leaves the facet unchanged.
    pub fn orient_away_from(&mut self, reference: &Point3<T>) {
        if self.plane.signed_offset(reference) > T::zero() {
            self.vertices.reverse();
            self.plane = self.plane.flipped();
        }
    }

    pub fn is_degenerate(&self, tolerance: &T) -> bool {
        self.plane.is_degenerate(&self.vertices, tolerance)
    }

    pub fn relight(&mut self, lighting: &Lighting) {
        let normal = self.shading_normal();
        self.material.relight(&normal, lighting);
    }

    pub fn lighting_color(&self) -> &Color {
        self.material.lighting_color()
    }

    pub fn ambient_color(&self) -> &Color {
        self.material.ambient_color()
    }

    pub fn intersect(&self, ray: &Ray<T>, tolerance: &T) -> Intersection<T> {
        intersect_ray_area(ray, &self.vertices, &self.plane, tolerance)
    }

    /// Exact squared distance from `p` to the closest point of the facet.
    pub fn distance_squared_from(&self, p: &Point3<T>) -> Option<T> {
        distance_squared_to_area(p, &self.vertices, &self.plane)
    }
}

//=================================
// Polygon
//=================================

/// A flat region bounded by a single ring (no holes), rendered as a facet.
#[derive(Debug, Clone)]
pub struct Polygon<T: Real> {
    facet: Facet<T>,
}

impl<T: Real> Polygon<T> {
    /// Builds a polygon, rejecting rings with fewer than three points or
    /// vertices off the ring's plane (beyond `tolerance`, relative to the
    /// ring's extent). Zero-area rings are accepted and simply never drawn.
    pub fn new(ring: Vec<Point3<T>>, color: Color, tolerance: &T) -> Result<Self, SceneError> {
        let count = ring.len();
        let facet = Facet::new(ring, color)?;
        let plane = facet.plane();
        if !plane.is_degenerate(facet.vertices(), &T::zero()) {
            let extent = facet
                .bounds()
                .map(|b| b.diagonal_length_squared())
                .unwrap_or_else(T::zero);
            let limit =
                tolerance.clone() * tolerance.clone() * length_squared(&plane.normal) * extent;
            for v in facet.vertices() {
                let offset = plane.signed_offset(v);
                if offset.clone() * offset > limit {
                    return Err(SceneError::NonPlanarPolygon(count));
                }
            }
        }
        Ok(Self { facet })
    }

    pub fn ring(&self) -> &[Point3<T>] {
        self.facet.vertices()
    }

    pub fn facet(&self) -> &Facet<T> {
        &self.facet
    }

    pub fn facet_mut(&mut self) -> &mut Facet<T> {
        &mut self.facet
    }
}

//=================================
// Tetrahedron
//=================================

/// A solid with four triangular faces, each wound so its normal points away
/// from the solid's centroid.
#[derive(Debug, Clone)]
pub struct Tetrahedron<T: Real> {
    vertices: [Point3<T>; 4],
    faces: [Facet<T>; 4],
}

impl<T: Real> Tetrahedron<T> {
    pub fn new(vertices: [Point3<T>; 4], color: Color) -> Self {
        let [a, b, c, d] = &vertices;
        let face = |p: &Point3<T>, q: &Point3<T>, r: &Point3<T>| {
            Facet::triangle(p.clone(), q.clone(), r.clone(), color)
        };
        let mut faces = [face(a, b, c), face(a, b, d), face(a, c, d), face(b, c, d)];
        if let Some(center) = centroid(&vertices) {
            for f in faces.iter_mut() {
                f.orient_away_from(&center);
            }
        }
        Self { vertices, faces }
    }

    pub fn vertices(&self) -> &[Point3<T>; 4] {
        &self.vertices
    }

    pub fn faces(&self) -> &[Facet<T>; 4] {
        &self.faces
    }

    pub fn faces_mut(&mut self) -> &mut [Facet<T>; 4] {
        &mut self.faces
    }
}

//=================================
// Lines and points
//=================================

#[derive(Debug, Clone)]
pub struct Line<T: Real> {
    pub segment: LineSegment<T>,
    pub color: Color,
}

impl<T: Real> Line<T> {
    pub fn new(start: Point3<T>, end: Point3<T>, color: Color) -> Self {
        Self {
            segment: LineSegment::new(start, end),
            color,
        }
    }
}

/// A single colored point.
#[derive(Debug, Clone)]
pub struct Marker<T: Real> {
    pub position: Point3<T>,
    pub color: Color,
}

impl<T: Real> Marker<T> {
    pub fn new(position: Point3<T>, color: Color) -> Self {
        Self { position, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::numeric::Exact;
    use crate::core::math::vector::point_from_array;

    fn gray() -> Color {
        Vector3::new(0.5, 0.5, 0.5)
    }

    #[test]
    fn facet_needs_three_vertices() {
        let pts = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        assert!(Facet::new(pts, gray()).is_err());
    }

    #[test]
    fn explicit_normal_wins_unless_zero() {
        let f = Facet::triangle(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            gray(),
        );
        assert_eq!(f.shading_normal(), Vector3::new(0.0, 0.0, 1.0));
        let g = f.clone().with_normal(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(g.shading_normal(), Vector3::new(1.0, 0.0, 0.0));
        let h = f.with_normal(Vector3::zeros());
        assert_eq!(h.shading_normal(), Vector3::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn tetrahedron_faces_point_outwards() {
        let verts: [Point3<Exact>; 4] = [
            point_from_array([0.0, 0.0, 0.0]),
            point_from_array([1.0, 0.0, 0.0]),
            point_from_array([0.0, 1.0, 0.0]),
            point_from_array([0.0, 0.0, 1.0]),
        ];
        let tet = Tetrahedron::new(verts, gray());
        let center = centroid(tet.vertices()).unwrap();
        for face in tet.faces() {
            assert!(face.plane().signed_offset(&center) < <Exact as Real>::from_f64(0.0));
        }
    }

    #[test]
    fn polygon_planarity() {
        let flat = vec![
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(2.0, 0.0, 1.0),
            Point3::new(2.0, 2.0, 1.0),
            Point3::new(0.0, 2.0, 1.0),
        ];
        assert!(Polygon::new(flat, gray(), &1e-9).is_ok());

        let warped = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 2.0, 1.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        assert!(matches!(
            Polygon::new(warped, gray(), &1e-9),
            Err(SceneError::NonPlanarPolygon(4))
        ));
    }

    #[test]
    fn facet_distance_is_exact_for_rationals() {
        let f: Facet<Exact> = Facet::triangle(
            point_from_array([0.0, 0.0, 0.0]),
            point_from_array([4.0, 0.0, 0.0]),
            point_from_array([0.0, 4.0, 0.0]),
            gray(),
        );
        let d = f.distance_squared_from(&point_from_array([1.0, 1.0, 3.0])).unwrap();
        assert_eq!(d, <Exact as Real>::from_usize(9));
    }
}

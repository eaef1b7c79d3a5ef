use crate::core::color::Color;
use crate::core::math::aabb::Aabb;
use crate::core::math::numeric::Real;
use crate::scene::primitive::Facet;
use nalgebra::{Point3, Vector3};

/// One triangle as delivered by a mesh loader.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshTriangle<T: Real> {
    /// Vertices in file order; the winding defines the fallback normal.
    pub vertices: [Point3<T>; 3],
    pub normal: Option<Vector3<T>>,
    pub attribute: Option<u16>,
}

/// The reduced mesh form the renderer consumes: a flat triangle list plus
/// the overall bounds.
#[derive(Debug, Clone)]
pub struct MeshData<T: Real> {
    pub triangles: Vec<MeshTriangle<T>>,
    bounds: Option<Aabb<T>>,
}

impl<T: Real> Default for MeshData<T> {
    fn default() -> Self {
        Self {
            triangles: Vec::new(),
            bounds: None,
        }
    }
}

impl<T: Real> MeshData<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, triangle: MeshTriangle<T>) {
        if let Some(tri_bounds) = Aabb::from_points(triangle.vertices.iter()) {
            self.bounds = Some(Aabb::merge(self.bounds.take(), &tri_bounds));
        }
        self.triangles.push(triangle);
    }

    pub fn bounds(&self) -> Option<&Aabb<T>> {
        self.bounds.as_ref()
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Converts every triangle into a facet of the given color.
    pub fn to_facets(&self, color: Color) -> Vec<Facet<T>> {
        self.triangles
            .iter()
            .map(|tri| {
                let [a, b, c] = tri.vertices.clone();
                let mut facet = Facet::triangle(a, b, c, color);
                if let Some(n) = &tri.normal {
                    facet = facet.with_normal(n.clone());
                }
                if let Some(attr) = tri.attribute {
                    facet = facet.with_attribute(attr);
                }
                facet
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_grows_bounds_and_keeps_attributes() {
        let mut mesh = MeshData::new();
        assert!(mesh.bounds().is_none());
        mesh.push(MeshTriangle {
            vertices: [
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            normal: Some(Vector3::new(0.0, 0.0, 1.0)),
            attribute: Some(7),
        });
        mesh.push(MeshTriangle {
            vertices: [
                Point3::new(0.0, 0.0, -2.0),
                Point3::new(3.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            normal: None,
            attribute: None,
        });
        let b = mesh.bounds().unwrap();
        assert_eq!(b.min, Point3::new(0.0, 0.0, -2.0));
        assert_eq!(b.max, Point3::new(3.0, 1.0, 0.0));

        let facets = mesh.to_facets(Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(facets.len(), 2);
        assert_eq!(facets[0].attribute, Some(7));
        assert!(facets[1].explicit_normal().is_none());
    }
}

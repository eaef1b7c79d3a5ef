use crate::core::color::Color;
use crate::core::math::aabb::Aabb;
use crate::core::math::numeric::Real;
use crate::scene::light::Lighting;
use crate::scene::mesh::MeshData;
use crate::scene::primitive::{Facet, Line, Marker, Polygon, Tetrahedron};
use crate::scene::utils::{axis_overlay, graticule};
use log::debug;

/// Everything that can be rendered, plus the bounds of all of it.
#[derive(Debug, Clone)]
pub struct Universe<T: Real> {
    points: Vec<Marker<T>>,
    lines: Vec<Line<T>>,
    facets: Vec<Facet<T>>,
    tetrahedra: Vec<Tetrahedron<T>>,
    polygons: Vec<Polygon<T>>,
    bounds: Option<Aabb<T>>,
}

impl<T: Real> Default for Universe<T> {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            lines: Vec::new(),
            facets: Vec::new(),
            tetrahedra: Vec::new(),
            polygons: Vec::new(),
            bounds: None,
        }
    }
}

impl<T: Real> Universe<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn grow(&mut self, other: Option<Aabb<T>>) {
        if let Some(b) = other {
            self.bounds = Some(Aabb::merge(self.bounds.take(), &b));
        }
    }

    pub fn add_point(&mut self, point: Marker<T>) {
        self.grow(Some(Aabb::from_point(point.position.clone())));
        self.points.push(point);
    }

    pub fn add_line(&mut self, line: Line<T>) {
        self.grow(Some(Aabb::new(
            line.segment.start.clone(),
            line.segment.end.clone(),
        )));
        self.lines.push(line);
    }

    pub fn add_facet(&mut self, facet: Facet<T>) {
        self.grow(facet.bounds());
        self.facets.push(facet);
    }

    pub fn add_polygon(&mut self, polygon: Polygon<T>) {
        self.grow(polygon.facet().bounds());
        self.polygons.push(polygon);
    }

    pub fn add_tetrahedron(&mut self, tetrahedron: Tetrahedron<T>) {
        self.grow(Aabb::from_points(tetrahedron.vertices().iter()));
        self.tetrahedra.push(tetrahedron);
    }

    /// Adds every triangle of a loaded mesh as a facet of `color`.
    pub fn add_mesh(&mut self, mesh: &MeshData<T>, color: Color) {
        debug!("Adding mesh with {} triangles", mesh.len());
        self.grow(mesh.bounds().cloned());
        self.facets.extend(mesh.to_facets(color));
    }

    pub fn bounds(&self) -> Option<&Aabb<T>> {
        self.bounds.as_ref()
    }

    pub fn points(&self) -> &[Marker<T>] {
        &self.points
    }

    pub fn lines(&self) -> &[Line<T>] {
        &self.lines
    }

    pub fn facets(&self) -> &[Facet<T>] {
        &self.facets
    }

    pub fn tetrahedra(&self) -> &[Tetrahedron<T>] {
        &self.tetrahedra
    }

    pub fn polygons(&self) -> &[Polygon<T>] {
        &self.polygons
    }

    /// All opaque surfaces in a stable order: facets, tetrahedron faces,
    /// then polygons. Render indices refer to this order.
    pub fn surfaces(&self) -> Vec<&Facet<T>> {
        self.facets
            .iter()
            .chain(self.tetrahedra.iter().flat_map(|t| t.faces().iter()))
            .chain(self.polygons.iter().map(|p| p.facet()))
            .collect()
    }

    pub fn surface_count(&self) -> usize {
        self.facets.len() + 4 * self.tetrahedra.len() + self.polygons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.lines.is_empty() && self.surface_count() == 0
    }

    /// Recomputes the lit and ambient colors of every surface.
    pub fn relight(&mut self, lighting: &Lighting) {
        for facet in self.facets.iter_mut() {
            facet.relight(lighting);
        }
        for tet in self.tetrahedra.iter_mut() {
            for face in tet.faces_mut().iter_mut() {
                face.relight(lighting);
            }
        }
        for polygon in self.polygons.iter_mut() {
            polygon.facet_mut().relight(lighting);
        }
    }

    /// Coordinate axes through the origin spanning the scene bounds.
    pub fn axis_overlay(&self) -> Vec<Line<T>> {
        axis_overlay(self.bounds())
    }

    /// Grid on the `z = 0` plane spanning the scene bounds.
    pub fn graticule(&self, divisions: usize) -> Vec<Line<T>> {
        graticule(self.bounds(), divisions)
    }
}
